//! Fixtures shared by unit tests.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{
    domain::{JobState, JobStatus, MediaKind, Post, StatsSummary},
    gateway::{GatewayError, RemoteGateway},
};

pub(crate) fn post(id: &str, category: Option<&str>) -> Post {
    Post {
        id: id.to_string(),
        username: "alice".to_string(),
        permalink: None,
        caption: Some(format!("caption {id}")),
        media_type: MediaKind::Image,
        media_url: Some(format!("https://cdn.example/{id}.jpg")),
        created_at: None,
        ai_category: None,
        ai_summary: None,
        category: category.map(str::to_string),
    }
}

pub(crate) fn stats_for(subject: &str, posts: &[Post]) -> StatsSummary {
    StatsSummary::from_posts(subject, posts)
}

/// `Err` replies surface as a 503 service error carrying the message.
pub(crate) type Reply<T> = Result<T, String>;

/// In-memory gateway that replays scripted replies.
///
/// Each queue hands out replies front to back; the last entry repeats once
/// the queue is down to one. Counters record how often each call was made.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    statuses: Mutex<VecDeque<Reply<JobState>>>,
    posts: Mutex<VecDeque<Reply<Vec<Post>>>>,
    stats: Mutex<VecDeque<Reply<StatsSummary>>>,
    posts_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    status_delay: Mutex<Option<Duration>>,
    pub status_calls: AtomicUsize,
    pub posts_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    status_in_flight: AtomicUsize,
    pub max_status_in_flight: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statuses(self, statuses: impl IntoIterator<Item = Reply<JobState>>) -> Self {
        self.statuses.lock().extend(statuses);
        self
    }

    pub fn with_status_delay(self, delay: Duration) -> Self {
        *self.status_delay.lock() = Some(delay);
        self
    }

    pub fn push_posts(&self, reply: Reply<Vec<Post>>) {
        self.posts.lock().push_back(reply);
    }

    pub fn push_stats(&self, reply: Reply<StatsSummary>) {
        self.stats.lock().push_back(reply);
    }

    /// Holds the next `fetch_posts` call until the returned sender fires or drops.
    pub fn gate_next_posts(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.posts_gates.lock().push_back(rx);
        tx
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn next_reply<T: Clone>(queue: &Mutex<VecDeque<Reply<T>>>, fallback: T) -> Reply<T> {
    let mut queue = queue.lock();
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(Ok(fallback))
    } else {
        queue.front().cloned().unwrap_or(Ok(fallback))
    }
}

fn into_result<T>(reply: Reply<T>) -> Result<T, GatewayError> {
    reply.map_err(|message| GatewayError::Service {
        status: 503,
        message,
    })
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn submit_analysis(&self, _profile_reference: &str) -> Result<Vec<Post>, GatewayError> {
        Ok(Vec::new())
    }

    async fn fetch_posts(&self, _subject: &str) -> Result<Vec<Post>, GatewayError> {
        self.posts_calls.fetch_add(1, Ordering::SeqCst);
        let reply = next_reply(&self.posts, Vec::new());
        let gate = self.posts_gates.lock().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        into_result(reply)
    }

    async fn fetch_stats(&self, subject: &str) -> Result<StatsSummary, GatewayError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        into_result(next_reply(&self.stats, StatsSummary::from_posts(subject, &[])))
    }

    async fn fetch_job_status(&self, subject: &str) -> Result<JobStatus, GatewayError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.status_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_status_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.status_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = next_reply(&self.statuses, JobState::Pending);
        self.status_in_flight.fetch_sub(1, Ordering::SeqCst);

        into_result(reply).map(|status| JobStatus {
            username: subject.to_string(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_leaves_scripted_posts_in_place() {
        let gateway = ScriptedGateway::new();
        gateway.push_posts(Ok(vec![post("1", Some("Wine"))]));
        gateway.push_posts(Ok(vec![post("2", Some("Beer"))]));

        let first_page = gateway.submit_analysis("https://www.instagram.com/alice/").await;
        assert!(first_page.unwrap().is_empty());

        let posts = gateway.fetch_posts("alice").await.unwrap();
        assert_eq!(posts[0].id, "1");
        assert_eq!(ScriptedGateway::calls(&gateway.posts_calls), 1);
    }
}
