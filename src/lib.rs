//! folio - portfolio site toolkit.
//!
//! - [`video`]: frame table and the scroll-driven playback controller
//! - [`feed`]: post ingestion from saved HTML captures
//! - [`project`]: project folders, cover resolution and gallery filters
//! - [`carousel`]: pager, swipe, autoplay and overlay state for the UI
//! - [`serve`] / [`api`]: static and JSON server for the built site

pub mod api;
pub mod carousel;
pub mod cli;
pub mod config;
pub mod contact;
pub mod feed;
pub mod logger;
pub mod project;
pub mod serve;
pub mod utils;
pub mod video;
