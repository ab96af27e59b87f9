//! `[video]` section configuration.
//!
//! Timeline and feel of the scroll-driven background video.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[video]` section in folio.toml.
///
/// # Example
/// ```toml
/// [video]
/// total_frames = 1199
/// fallback_fps = 30.0
/// smoothing = 0.25       # share of the remaining gap closed per tick
/// snap_seconds = 0.5     # larger gaps are jumped instead of eased
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct VideoConfig {
    /// Frame count of the background video asset.
    #[serde(default = "defaults::video::total_frames")]
    #[educe(Default = defaults::video::total_frames())]
    pub total_frames: u32,

    /// Frame rate used until (or unless) the real one can be estimated.
    #[serde(default = "defaults::video::fallback_fps")]
    #[educe(Default = defaults::video::fallback_fps())]
    pub fallback_fps: f64,

    /// Visible share of a section that counts as "entered".
    #[serde(default = "defaults::video::visibility_threshold")]
    #[educe(Default = defaults::video::visibility_threshold())]
    pub visibility_threshold: f64,

    /// Easing factor applied per animation tick while scrubbing forward.
    #[serde(default = "defaults::video::smoothing")]
    #[educe(Default = defaults::video::smoothing())]
    pub smoothing: f64,

    /// Gap in seconds above which a scrub target is reached in one jump.
    #[serde(default = "defaults::video::snap_seconds")]
    #[educe(Default = defaults::video::snap_seconds())]
    pub snap_seconds: f64,

    /// Gap in seconds below which easing finishes on the target.
    #[serde(default = "defaults::video::settle_seconds")]
    #[educe(Default = defaults::video::settle_seconds())]
    pub settle_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_video_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.video.total_frames, 1199);
        assert_eq!(config.video.fallback_fps, 30.0);
        assert_eq!(config.video.visibility_threshold, 0.6);
        assert_eq!(config.video.smoothing, 0.25);
        assert_eq!(config.video.snap_seconds, 0.5);
        assert_eq!(config.video.settle_seconds, 0.02);
    }

    #[test]
    fn test_video_config_override() {
        let config: SiteConfig = toml::from_str(
            r#"
            [video]
            total_frames = 600
            smoothing = 0.5
        "#,
        )
        .unwrap();

        assert_eq!(config.video.total_frames, 600);
        assert_eq!(config.video.smoothing, 0.5);
        assert_eq!(config.video.fallback_fps, 30.0);
    }
}
