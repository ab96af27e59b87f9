//! `[feed]` section configuration.
//!
//! Tunes how saved post captures become post records.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[feed]` section in folio.toml - post ingestion settings.
///
/// # Example
/// ```toml
/// [feed]
/// min_text_chars = 20     # shorter texts are not a usable post
/// max_text_chars = 300    # card text is cut here, with "..."
/// placeholders = true     # demo posts when nothing could be ingested
/// skip_marker = "no-posts"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// A text candidate must be longer than this many characters.
    #[serde(default = "defaults::feed::min_text_chars")]
    #[educe(Default = defaults::feed::min_text_chars())]
    pub min_text_chars: usize,

    /// Card text limit in characters, ellipsis included.
    #[serde(default = "defaults::feed::max_text_chars")]
    #[educe(Default = defaults::feed::max_text_chars())]
    pub max_text_chars: usize,

    /// Substitute the demo posts when ingestion yields nothing.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub placeholders: bool,

    /// Files whose name contains this marker are scraper leftovers, not posts.
    #[serde(default = "defaults::feed::skip_marker")]
    #[educe(Default = defaults::feed::skip_marker())]
    pub skip_marker: String,
}
