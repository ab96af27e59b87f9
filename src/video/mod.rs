//! Scroll-driven background video.
//!
//! - [`frames`]: frame table and frame/time arithmetic
//! - [`markup`]: `data-vs-*` section contract of the built page
//! - [`surface`]: traits the host implements (video, scheduler, layout)
//! - [`controller`]: the playback state machine

pub mod controller;
pub mod frames;
pub mod markup;
pub mod surface;

pub use controller::{FrameController, PlaybackState};
pub use frames::{FrameMode, FrameRange, FrameTable};
pub use markup::SectionSpec;
