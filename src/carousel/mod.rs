//! UI state for the post carousel, project slider and overlays.

mod modal;
mod pager;

pub use modal::{DetailModal, Overlay, OverlayStack};
pub use pager::{Autoplay, NavPolicy, Pager, SWIPE_THRESHOLD_PX, Swipe, SwipeDirection};

/// Breakpoints (inclusive max width) and the cards shown up to them.
const BREAKPOINTS: [(u32, usize); 2] = [(480, 1), (768, 2)];

/// Cards shown on wider viewports.
const WIDE_COUNT: usize = 3;

/// Cards per page for a viewport `width` in CSS pixels.
pub fn visible_count(width: u32) -> usize {
    BREAKPOINTS
        .iter()
        .find(|&&(max, _)| width <= max)
        .map_or(WIDE_COUNT, |&(_, count)| count)
}
