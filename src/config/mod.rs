//! Site configuration management for `folio.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[base]`     | Site metadata (title, author, url)               |
//! | `[paths]`    | Built site and content folders                   |
//! | `[serve]`    | Server (interface, port, cors)                   |
//! | `[feed]`     | Post ingestion limits                            |
//! | `[video]`    | Background video timeline and scrub feel         |
//! | `[contact]`  | Contact form endpoint                            |
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "Portfolio"
//!
//! [paths]
//! dist = "dist"
//! posts = "posts"
//!
//! [serve]
//! port = 3001
//!
//! [feed]
//! max_text_chars = 300
//! ```

mod base;
mod contact;
pub mod defaults;
mod error;
mod feed;
mod handle;
mod paths;
mod serve;
mod video;

pub use base::BaseConfig;
pub use contact::ContactConfig;
pub use error::ConfigError;
pub use feed::FeedConfig;
pub use handle::{cfg, init_config};
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use video::VideoConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing folio.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: BaseConfig,

    /// Content and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Post ingestion settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Background video settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Contact form settings
    #[serde(default)]
    pub contact: ContactConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load `folio.toml` for the given CLI, falling back to defaults when absent.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.paths.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.paths.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.paths.dist, cli.dist.as_ref());
        Self::update_option(&mut self.paths.posts, cli.posts.as_ref());
        Self::update_option(&mut self.paths.projects, cli.projects.as_ref());
        self.update_path_with_root(&root, &cli.config);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths against the root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_name));
        self.paths.dist = Self::normalize_path(&root.join(&self.paths.dist));
        self.paths.posts = Self::normalize_path(&root.join(&self.paths.posts));
        self.paths.projects = Self::normalize_path(&root.join(&self.paths.projects));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let video = &self.video;
        if video.total_frames == 0 {
            bail!(ConfigError::Validation(
                "[video.total_frames] must be greater than 0".into()
            ));
        }
        if !(video.fallback_fps > 1.0 && video.fallback_fps < 120.0) {
            bail!(ConfigError::Validation(
                "[video.fallback_fps] must be between 1 and 120".into()
            ));
        }
        if !(video.smoothing > 0.0 && video.smoothing <= 1.0) {
            bail!(ConfigError::Validation(
                "[video.smoothing] must be in (0, 1]".into()
            ));
        }
        if !(video.visibility_threshold > 0.0 && video.visibility_threshold <= 1.0) {
            bail!(ConfigError::Validation(
                "[video.visibility_threshold] must be in (0, 1]".into()
            ));
        }

        let feed = &self.feed;
        if feed.max_text_chars <= 3 {
            bail!(ConfigError::Validation(
                "[feed.max_text_chars] must leave room for the ellipsis".into()
            ));
        }
        if feed.min_text_chars >= feed.max_text_chars {
            bail!(ConfigError::Validation(
                "[feed.min_text_chars] must be smaller than [feed.max_text_chars]".into()
            ));
        }

        if !self.contact.relay_url.starts_with("http") {
            bail!(ConfigError::Validation(
                "[contact.relay_url] must start with http:// or https://".into()
            ));
        }

        if let Some(url) = &self.base.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
