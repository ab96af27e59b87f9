//! Host seams of the frame controller.
//!
//! The controller never touches a browser directly. A host provides the
//! video element, an animation-frame scheduler and the page geometry.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("video metadata not loaded")]
    NotReady,

    #[error("seek to {0:.3}s rejected")]
    SeekRejected(f64),

    #[error("playback refused: {0}")]
    PlaybackRefused(String),
}

/// One video element's playback clock.
pub trait VideoSurface {
    fn current_time(&self) -> f64;
    fn seek(&mut self, time: f64) -> Result<(), SurfaceError>;
    fn play(&mut self) -> Result<(), SurfaceError>;
    fn pause(&mut self) -> Result<(), SurfaceError>;
    /// Duration in seconds once metadata is known.
    fn duration(&self) -> Option<f64>;
}

/// Ticket for one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// `requestAnimationFrame` / `cancelAnimationFrame`.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Section bounds relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRect {
    pub top: f64,
    pub height: f64,
}

impl SectionRect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Strictly inside, edges excluded.
    pub fn straddles(&self, y: f64) -> bool {
        self.top < y && self.bottom() > y
    }
}

/// Page geometry as seen from the viewport.
pub trait PageLayout {
    fn viewport_height(&self) -> f64;
    fn scroll_y(&self) -> f64;
    /// Rect of the section at `index`, if it is laid out.
    fn section_rect(&self, index: usize) -> Option<SectionRect>;

    fn viewport_center(&self) -> f64 {
        self.viewport_height() / 2.0
    }
}
