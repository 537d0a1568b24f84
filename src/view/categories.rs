use crate::domain::Post;

/// Distinct category labels present in `posts`, ordinal-sorted.
///
/// Missing, blank and `uncategorized` sentinel labels are never returned.
pub fn category_index(posts: &[Post], uncategorized: &[String]) -> Vec<String> {
    let mut labels: Vec<String> = posts
        .iter()
        .filter_map(Post::category)
        .filter(|label| !label.trim().is_empty())
        .filter(|label| !uncategorized.iter().any(|sentinel| sentinel == label))
        .map(str::to_string)
        .collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}
