use serde::{Deserialize, Serialize};

use super::post::Post;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "drink_category")]
    pub label: Option<String>,
    pub count: u64,
}

/// Per-subject aggregate served alongside the posts. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub username: String,
    pub total_posts: u64,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
}

impl StatsSummary {
    /// Recomputes the aggregate from raw posts, keeping first-seen label order.
    pub fn from_posts(username: &str, posts: &[Post]) -> Self {
        let mut categories: Vec<CategoryCount> = Vec::new();
        for post in posts {
            match categories.iter_mut().find(|c| c.label == post.category) {
                Some(entry) => entry.count += 1,
                None => categories.push(CategoryCount {
                    label: post.category.clone(),
                    count: 1,
                }),
            }
        }
        Self {
            username: username.to_string(),
            total_posts: posts.len() as u64,
            categories,
        }
    }

    /// Same total and same per-label counts, regardless of listing order.
    pub fn agrees_with(&self, other: &StatsSummary) -> bool {
        if self.total_posts != other.total_posts {
            return false;
        }
        let breakdown = |summary: &StatsSummary| {
            let mut pairs: Vec<(Option<String>, u64)> = summary
                .categories
                .iter()
                .filter(|entry| entry.count > 0)
                .map(|entry| (entry.label.clone(), entry.count))
                .collect();
            pairs.sort();
            pairs
        };
        breakdown(self) == breakdown(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_completed(self) -> bool {
        matches!(self, JobState::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub username: String,
    pub status: JobState,
}
