use std::fmt;

use crate::domain::Post;

/// The category a viewer has narrowed the results to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Label(String),
}

impl CategorySelection {
    pub const ALL_TOKEN: &'static str = "all";

    /// Parses a selection token. Only the exact token `all` means no filter.
    pub fn from_token(token: &str) -> Self {
        if token == Self::ALL_TOKEN {
            CategorySelection::All
        } else {
            CategorySelection::Label(token.to_string())
        }
    }

    pub fn as_token(&self) -> &str {
        match self {
            CategorySelection::All => Self::ALL_TOKEN,
            CategorySelection::Label(label) => label,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Label(label) => post.category() == Some(label.as_str()),
        }
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

pub fn filter_posts(posts: &[Post], selection: &CategorySelection) -> Vec<Post> {
    match selection {
        CategorySelection::All => posts.to_vec(),
        CategorySelection::Label(_) => posts
            .iter()
            .filter(|post| selection.matches(post))
            .cloned()
            .collect(),
    }
}
