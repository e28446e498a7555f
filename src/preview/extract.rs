//! Open Graph extraction from fetched HTML.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:title']").expect("Invalid og:title selector"));
static OG_DESCRIPTION: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:description']").expect("Invalid og:description selector")
});
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:image']").expect("Invalid og:image selector"));
static TITLE_TAG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Invalid title selector"));

/// Width of `link_previews.title`, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// The mutable part of a preview, as scraped from a page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewFields {
    pub title: String,
    pub description: String,
    pub image: String,
}

/// Extract `og:title`, `og:description` and `og:image` from a document.
///
/// Only the first tag of each property is considered. A missing or blank
/// `og:title` falls back to the document `<title>`. Anything else missing
/// stays empty. Titles are cut to [`MAX_TITLE_LENGTH`] characters.
pub fn extract_preview(html: &str) -> PreviewFields {
    let document = Html::parse_document(html);

    let mut title = og_content(&document, &OG_TITLE);
    if title.is_empty() {
        title = document
            .select(&TITLE_TAG)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        title = title.chars().take(MAX_TITLE_LENGTH).collect();
    }

    PreviewFields {
        title,
        description: og_content(&document, &OG_DESCRIPTION),
        image: og_content(&document, &OG_IMAGE),
    }
}

fn og_content(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
