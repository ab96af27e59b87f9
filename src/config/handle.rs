//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads. `main` loads `folio.toml` once and
//! stores it with [`init_config`]; request handlers and commands read it
//! through [`cfg`].
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! let posts = PostStore::new(&c.paths.posts);  // Arc auto-derefs to &SiteConfig
//! ```

use super::SiteConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage with atomic replacement support.
///
/// Initialized with default config, then replaced with loaded config in main.
pub static CONFIG: LazyLock<ArcSwap<SiteConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SiteConfig::default()));

/// Get current config as `Arc<SiteConfig>`.
///
/// Wait-free atomic load; the `Arc` keeps this snapshot alive even if the
/// config is replaced meanwhile.
#[inline]
pub fn cfg() -> Arc<SiteConfig> {
    CONFIG.load_full()
}

/// Install the loaded config (called once at startup).
#[inline]
pub fn init_config(config: SiteConfig) {
    CONFIG.store(Arc::new(config));
}
