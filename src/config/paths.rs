//! `[paths]` section configuration.
//!
//! Locations of the built site and the content folders it serves.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[paths]` section in folio.toml.
///
/// All paths are relative to the project root until
/// [`SiteConfig::update_with_cli`](super::SiteConfig::update_with_cli)
/// makes them absolute.
///
/// # Example
/// ```toml
/// [paths]
/// dist = "dist"          # built single-page app
/// posts = "posts"        # saved post captures (*.html)
/// projects = "projects"  # one folder per project
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::paths::root")]
    #[educe(Default = defaults::paths::root())]
    pub root: Option<PathBuf>,

    /// Built site directory served as the SPA.
    #[serde(default = "defaults::paths::dist")]
    #[educe(Default = defaults::paths::dist())]
    pub dist: PathBuf,

    /// Saved post captures, served under `/posts/`.
    #[serde(default = "defaults::paths::posts")]
    #[educe(Default = defaults::paths::posts())]
    pub posts: PathBuf,

    /// Project folders, served under `/projects/`.
    #[serde(default = "defaults::paths::projects")]
    #[educe(Default = defaults::paths::projects())]
    pub projects: PathBuf,
}
