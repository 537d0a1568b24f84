use std::fmt::Write;

use crate::{
    domain::Post,
    view::{SyncPhase, ViewState},
};

const CAPTION_PREVIEW_CHARS: usize = 80;

/// Plain-text rendering of a results view for the terminal.
pub fn render(view: &ViewState) -> String {
    let mut out = String::new();
    let status = match view.phase {
        SyncPhase::Idle => "idle",
        SyncPhase::Loading => "loading",
        SyncPhase::Ready => "ready",
        SyncPhase::Error => "error",
    };
    let _ = writeln!(
        out,
        "Results for @{}: {} posts ({status})",
        view.subject,
        view.posts.len()
    );

    if let Some(error) = &view.error {
        let _ = writeln!(out, "Error: {error}");
    }

    if let Some(stats) = &view.stats {
        let breakdown: Vec<String> = stats
            .categories
            .iter()
            .map(|entry| {
                format!(
                    "{} {}",
                    entry.label.as_deref().unwrap_or("uncategorized"),
                    entry.count
                )
            })
            .collect();
        let _ = writeln!(
            out,
            "Stats: {} total; {}",
            stats.total_posts,
            if breakdown.is_empty() {
                "no categories".to_string()
            } else {
                breakdown.join(", ")
            }
        );
    }

    if !view.categories.is_empty() {
        let _ = writeln!(out, "Categories: {}", view.categories.join(", "));
    }
    let _ = writeln!(
        out,
        "Showing {} of {} posts in \"{}\"",
        view.filtered.len(),
        view.posts.len(),
        view.selected
    );

    for post in &view.filtered {
        render_post(&mut out, post);
    }
    out
}

fn render_post(out: &mut String, post: &Post) {
    let date = post
        .created_at
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let _ = writeln!(
        out,
        "- {date} [{}] {} {}",
        post.media_type.as_str(),
        post.category().unwrap_or("-"),
        post.link()
    );
    if let Some(caption) = post.caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        let preview: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
        let ellipsis = if caption.chars().count() > CAPTION_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        let _ = writeln!(out, "    {}{ellipsis}", preview.replace('\n', " "));
    }
    if let Some(summary) = post.ai_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "    summary: {}", summary.trim());
    }
}
