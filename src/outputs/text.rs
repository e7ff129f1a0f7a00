//! Plain-text rendering of a [`FeedView`] for the terminal.

use crate::controller::FeedView;
use crate::models::Article;
use std::fmt::Write;

/// Render the article list followed by the facets and a paging footer.
pub fn render_view(view: &FeedView) -> String {
    let mut out = String::new();

    if let Some(message) = &view.empty_message {
        let _ = writeln!(out, "{message}");
    }
    for (i, article) in view.articles.iter().enumerate() {
        render_article(&mut out, i + 1, article);
    }

    let _ = writeln!(out, "Categories: {}", view.categories.join(" | "));
    let _ = writeln!(out, "Authors: {}", view.authors.join(" | "));
    let footer = if view.loading || view.loading_more {
        "Loading…"
    } else if view.has_more {
        "More articles available."
    } else {
        "No more articles to load."
    };
    let _ = writeln!(out, "Page {}. {footer}", view.page);
    out
}

fn render_article(out: &mut String, n: usize, article: &Article) {
    let _ = writeln!(
        out,
        "{n:>3}. [{}] {}",
        article.source(),
        article.title()
    );
    let _ = writeln!(
        out,
        "     {} · {} · {}",
        article.published_at().format("%Y-%m-%d %H:%M UTC"),
        article.category(),
        article.author()
    );
    if !article.description().is_empty() {
        let _ = writeln!(out, "     {}", article.description());
    }
    let _ = writeln!(out, "     {}", article.url());
    if let Some(video) = article.video_url() {
        let _ = writeln!(out, "     ▶ {video}");
    }
}
