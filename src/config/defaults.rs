//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Portfolio".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn url() -> Option<String> {
        None
    }
}

// ============================================================================
// [paths] Section Defaults
// ============================================================================

pub mod paths {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn dist() -> PathBuf {
        "dist".into()
    }

    pub fn posts() -> PathBuf {
        "posts".into()
    }

    pub fn projects() -> PathBuf {
        "projects".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        3001
    }
}

// ============================================================================
// [feed] Section Defaults
// ============================================================================

pub mod feed {
    pub fn min_text_chars() -> usize {
        20
    }

    pub fn max_text_chars() -> usize {
        300
    }

    pub fn skip_marker() -> String {
        "no-posts".into()
    }
}

// ============================================================================
// [video] Section Defaults
// ============================================================================

pub mod video {
    pub fn total_frames() -> u32 {
        1199
    }

    pub fn fallback_fps() -> f64 {
        30.
    }

    pub fn visibility_threshold() -> f64 {
        0.6
    }

    pub fn smoothing() -> f64 {
        0.25
    }

    pub fn snap_seconds() -> f64 {
        0.5
    }

    pub fn settle_seconds() -> f64 {
        0.02
    }
}

// ============================================================================
// [contact] Section Defaults
// ============================================================================

pub mod contact {
    pub fn relay_url() -> String {
        "https://formspree.io/f/mdkznpbz".into()
    }

    pub fn max_body_bytes() -> usize {
        64 * 1024
    }
}
