use crate::domain::{Post, StatsSummary};

use super::{category_index, filter_posts, CategorySelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Everything a results screen needs for one subject.
///
/// `filtered` and `categories` are derived from `posts` and are rebuilt
/// whenever either the posts or the selection change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub subject: String,
    pub phase: SyncPhase,
    pub posts: Vec<Post>,
    pub stats: Option<StatsSummary>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected: CategorySelection,
    pub filtered: Vec<Post>,
    pub categories: Vec<String>,
    /// Set once a load has succeeded for this subject.
    pub has_loaded: bool,
    /// Set when the analysis job reported completion for this subject.
    pub analysis_complete: bool,
}

impl ViewState {
    pub fn for_subject(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            phase: SyncPhase::Loading,
            loading: true,
            ..Self::default()
        }
    }

    pub(crate) fn replace_data(
        &mut self,
        posts: Vec<Post>,
        stats: StatsSummary,
        uncategorized: &[String],
    ) {
        self.posts = posts;
        self.stats = Some(stats);
        self.categories = category_index(&self.posts, uncategorized);
        if let CategorySelection::Label(label) = &self.selected {
            if !self.categories.contains(label) {
                self.selected = CategorySelection::All;
            }
        }
        self.filtered = filter_posts(&self.posts, &self.selected);
        self.error = None;
        self.has_loaded = true;
        self.phase = SyncPhase::Ready;
    }

    pub(crate) fn record_failure(&mut self, message: String) {
        self.error = Some(message);
        self.phase = SyncPhase::Error;
    }

    pub(crate) fn select(&mut self, selection: CategorySelection) {
        self.filtered = filter_posts(&self.posts, &selection);
        self.selected = selection;
    }
}
