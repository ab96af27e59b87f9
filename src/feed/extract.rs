//! Image and text extraction from a post capture.
//!
//! Both extractors are ordered strategy lists: the first strategy that yields
//! something wins, later ones are fallbacks for older or partial captures.

use super::html::Document;
use super::select::Selector;
use crate::utils::text::{char_len, collapse_whitespace};
use regex::Regex;
use std::sync::LazyLock;

type ImageStrategy = fn(&Document) -> Option<String>;

/// Image strategies in priority order.
const IMAGE_STRATEGIES: &[(&str, ImageStrategy)] = &[
    ("video poster", video_poster),
    ("poster background", poster_background),
    ("feed media", feed_media),
    ("celebration", celebration_image),
];

static VIDEO_POSTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video[poster]").unwrap());

static POSTER_BACKGROUND: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".vjs-poster, .vjs-poster-background").unwrap());

static FEED_MEDIA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"img[src*="feedshare"], img[src*="media.licdn.com"]:not([src*="profile-displayphoto"])"#,
    )
    .unwrap()
});

static CELEBRATION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".feed-shared-celebration-image img").unwrap());

static TEXT_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".update-components-text, .feed-shared-update-v2__description, \
         .update-components-update-v2__commentary, .feed-shared-text",
    )
    .unwrap()
});

static GENERIC_TEXT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, span, div, li, h1, h2, h3, h4, h5, h6, article").unwrap()
});

static BACKGROUND_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background-image\s*:\s*url\(\s*["']?([^"')]+)["']?\s*\)"#).unwrap()
});

/// Marker of hashtag link text, never post body.
const HASHTAG_MARKER: &str = "hashtag";

// ============================================================================
// Image
// ============================================================================

/// Representative image of the post, if any.
pub fn extract_image(doc: &Document) -> Option<String> {
    IMAGE_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(doc))
}

fn video_poster(doc: &Document) -> Option<String> {
    doc.select_all(&VIDEO_POSTER)
        .filter_map(|el| el.attr("poster"))
        .find(|src| !src.trim().is_empty())
        .map(|src| src.trim().to_owned())
}

fn poster_background(doc: &Document) -> Option<String> {
    doc.select_all(&POSTER_BACKGROUND)
        .filter_map(|el| el.attr("style"))
        .find_map(|style| BACKGROUND_URL.captures(style))
        .map(|caps| caps[1].trim().to_owned())
}

fn feed_media(doc: &Document) -> Option<String> {
    doc.select_first(&FEED_MEDIA)
        .and_then(|el| el.attr("src"))
        .map(str::to_owned)
}

fn celebration_image(doc: &Document) -> Option<String> {
    doc.select_first(&CELEBRATION)
        .and_then(|el| el.attr("src"))
        .map(str::to_owned)
}

// ============================================================================
// Text
// ============================================================================

/// Body text of the post, whitespace-collapsed.
///
/// Known text containers are searched first, taking the first usable text
/// node. Otherwise the longest usable text node under a generic text element
/// wins.
pub fn extract_text(doc: &Document, min_chars: usize) -> Option<String> {
    from_containers(doc, min_chars).or_else(|| longest_generic(doc, min_chars))
}

fn usable(text: &str, min_chars: usize) -> Option<String> {
    let text = collapse_whitespace(text);
    (char_len(&text) > min_chars && !text.contains(HASHTAG_MARKER)).then_some(text)
}

fn from_containers(doc: &Document, min_chars: usize) -> Option<String> {
    doc.select_all(&TEXT_CONTAINERS)
        .flat_map(|container| container.text_nodes())
        .find_map(|text| usable(text, min_chars))
}

fn longest_generic(doc: &Document, min_chars: usize) -> Option<String> {
    doc.text_nodes()
        .filter(|(parent, _)| GENERIC_TEXT.matches(parent))
        .filter_map(|(_, text)| usable(text, min_chars))
        .fold(None, |best: Option<String>, text| match best {
            Some(best) if char_len(&best) >= char_len(&text) => Some(best),
            _ => Some(text),
        })
}
