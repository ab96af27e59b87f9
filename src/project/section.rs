//! Typed detail-view blocks declared in `metadata.json` under `sections`.
//!
//! ```json
//! { "type": "slider", "slides": [{ "title": "Research", "text": "…", "image": "interviews.png" }] }
//! { "type": "textCarousel", "heading": "Outcome", "text": "a<br>b", "images": ["1.png", "2.png"] }
//! ```
//!
//! Unknown types are kept verbatim as [`Section::Raw`].

use super::cover::{Match, resolve_image};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

/// Images shown by one text carousel.
pub const MAX_CAROUSEL_IMAGES: usize = 6;

/// Default text-carousel rotation period.
pub const DEFAULT_INTERVAL_MS: u64 = 3000;

/// `<br>`, `<br/>`, `<br />` or a blank line.
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|\r?\n\r?\n").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Section {
    Slider {
        slides: Vec<Slide>,
    },
    TextCarousel {
        heading: Option<String>,
        paragraphs: Vec<String>,
        /// Resolved image URLs, at most [`MAX_CAROUSEL_IMAGES`].
        images: Vec<String>,
        text_position: TextPosition,
        interval_ms: u64,
    },
    #[serde(untagged)]
    Raw(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub title: Option<String>,
    pub text: Option<String>,
    /// Resolved image URL.
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    #[default]
    Left,
    Right,
}

#[derive(Deserialize)]
struct RawSlider {
    #[serde(default)]
    slides: Vec<RawSlide>,
}

#[derive(Deserialize)]
struct RawSlide {
    title: Option<String>,
    text: Option<String>,
    image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTextCarousel {
    heading: Option<String>,
    text: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    text_position: TextPosition,
    interval_ms: Option<u64>,
}

impl Section {
    /// Type a raw section against the project's image URLs.
    ///
    /// Returns `None` for blocks that would render nothing (a slider with no
    /// slides, a text carousel with neither text nor images). A known type
    /// with a malformed body is kept as [`Section::Raw`].
    pub fn from_value(value: Value, images: &[String]) -> Option<Self> {
        let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "slider" => match RawSlider::deserialize(&value) {
                Ok(raw) => Self::slider(raw, images),
                Err(_) => Some(Self::Raw(value)),
            },
            "textCarousel" | "text-carousel" | "text_carousel" => {
                match RawTextCarousel::deserialize(&value) {
                    Ok(raw) => Self::text_carousel(raw, images),
                    Err(_) => Some(Self::Raw(value)),
                }
            }
            _ => Some(Self::Raw(value)),
        }
    }

    fn slider(raw: RawSlider, images: &[String]) -> Option<Self> {
        if raw.slides.is_empty() {
            return None;
        }
        let slides = raw
            .slides
            .into_iter()
            .map(|slide| Slide {
                image: resolve_image(images, slide.image.as_deref(), Match::Exact).map(str::to_owned),
                title: slide.title,
                text: slide.text,
            })
            .collect();
        Some(Self::Slider { slides })
    }

    fn text_carousel(raw: RawTextCarousel, images: &[String]) -> Option<Self> {
        let picked: Vec<String> = raw
            .images
            .iter()
            .take(MAX_CAROUSEL_IMAGES)
            .filter_map(|name| resolve_image(images, Some(name), Match::Exact))
            .map(str::to_owned)
            .collect();
        let paragraphs = raw.text.as_deref().map(split_paragraphs).unwrap_or_default();

        if paragraphs.is_empty() && raw.images.is_empty() {
            return None;
        }
        Some(Self::TextCarousel {
            heading: raw.heading,
            paragraphs,
            images: picked,
            text_position: raw.text_position,
            interval_ms: raw.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS),
        })
    }
}

fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}
