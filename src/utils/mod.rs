//! Utility modules shared across the site toolkit.

pub mod path;
pub mod text;
