//! Page arithmetic for card carousels and slide shows.

use super::visible_count;
use std::ops::Range;

/// Horizontal drag distance that counts as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// What happens at either end of the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPolicy {
    /// Moves past an end are no-ops; `go_to` clamps.
    Saturate,
    /// Moves and `go_to` wrap around.
    Wrap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    items: usize,
    visible: usize,
    current: usize,
    policy: NavPolicy,
}

impl Pager {
    pub fn new(items: usize, visible: usize, policy: NavPolicy) -> Self {
        Self {
            items,
            visible: visible.max(1),
            current: 0,
            policy,
        }
    }

    /// One item per page, as used by slide shows.
    pub fn single(items: usize, policy: NavPolicy) -> Self {
        Self::new(items, 1, policy)
    }

    /// `ceil(items / visible)`; zero only when there are no items.
    pub fn page_count(&self) -> usize {
        self.items.div_ceil(self.visible)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn policy(&self) -> NavPolicy {
        self.policy
    }

    fn last_page(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    pub fn can_prev(&self) -> bool {
        match self.policy {
            NavPolicy::Saturate => self.current > 0,
            NavPolicy::Wrap => self.page_count() > 1,
        }
    }

    pub fn can_next(&self) -> bool {
        match self.policy {
            NavPolicy::Saturate => self.current < self.last_page(),
            NavPolicy::Wrap => self.page_count() > 1,
        }
    }

    pub fn next(&mut self) -> usize {
        let pages = self.page_count();
        if pages > 0 {
            self.current = match self.policy {
                NavPolicy::Saturate => (self.current + 1).min(pages - 1),
                NavPolicy::Wrap => (self.current + 1) % pages,
            };
        }
        self.current
    }

    pub fn prev(&mut self) -> usize {
        let pages = self.page_count();
        if pages > 0 {
            self.current = match self.policy {
                NavPolicy::Saturate => self.current.saturating_sub(1),
                NavPolicy::Wrap => (self.current + pages - 1) % pages,
            };
        }
        self.current
    }

    /// Dot click.
    pub fn go_to(&mut self, page: usize) -> usize {
        let pages = self.page_count();
        if pages > 0 {
            self.current = match self.policy {
                NavPolicy::Saturate => page.min(pages - 1),
                NavPolicy::Wrap => page % pages,
            };
        }
        self.current
    }

    /// Viewport resized: recompute cards per page and keep `current` valid.
    pub fn resize(&mut self, width: u32) {
        self.set_visible(visible_count(width));
    }

    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible.max(1);
        self.current = self.current.min(self.last_page());
    }

    /// Item list changed (e.g. posts reloaded).
    pub fn set_items(&mut self, items: usize) {
        self.items = items;
        self.current = self.current.min(self.last_page());
    }

    /// Item indices shown on the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.current * self.visible).min(self.items);
        let end = (start + self.visible).min(self.items);
        start..end
    }

    pub fn apply_swipe(&mut self, direction: SwipeDirection) -> usize {
        match direction {
            SwipeDirection::Next => self.next(),
            SwipeDirection::Prev => self.prev(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Next,
    Prev,
}

/// Touch/pointer drag tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Swipe {
    start_x: Option<f64>,
}

impl Swipe {
    pub fn begin(&mut self, x: f64) {
        self.start_x = Some(x);
    }

    /// Drag left means next, drag right means previous.
    pub fn end(&mut self, x: f64) -> Option<SwipeDirection> {
        let dx = x - self.start_x.take()?;
        if dx <= -SWIPE_THRESHOLD_PX {
            Some(SwipeDirection::Next)
        } else if dx >= SWIPE_THRESHOLD_PX {
            Some(SwipeDirection::Prev)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }
}

/// Timer-driven rotation of a wrapping single-item pager (text carousel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autoplay {
    pager: Pager,
    interval_ms: u64,
    since_last_ms: u64,
}

impl Autoplay {
    pub fn new(items: usize, interval_ms: u64) -> Self {
        Self {
            pager: Pager::single(items, NavPolicy::Wrap),
            interval_ms: interval_ms.max(1),
            since_last_ms: 0,
        }
    }

    /// Rotation runs only when there is something to rotate to.
    pub fn is_running(&self) -> bool {
        self.pager.page_count() > 1
    }

    pub fn current(&self) -> usize {
        self.pager.current()
    }

    /// Advance the clock; returns the index now shown.
    pub fn tick(&mut self, elapsed_ms: u64) -> usize {
        if !self.is_running() {
            return self.pager.current();
        }
        self.since_last_ms += elapsed_ms;
        while self.since_last_ms >= self.interval_ms {
            self.since_last_ms -= self.interval_ms;
            self.pager.next();
        }
        self.pager.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(Pager::new(7, 3, NavPolicy::Saturate).page_count(), 3);
        assert_eq!(Pager::new(6, 3, NavPolicy::Saturate).page_count(), 2);
        assert_eq!(Pager::new(1, 3, NavPolicy::Saturate).page_count(), 1);
        assert_eq!(Pager::new(0, 3, NavPolicy::Saturate).page_count(), 0);
        // zero visible is treated as one
        assert_eq!(Pager::new(2, 0, NavPolicy::Saturate).page_count(), 2);
    }

    #[test]
    fn test_saturate_next_and_dots_agree() {
        let mut pager = Pager::new(7, 3, NavPolicy::Saturate);
        assert!(!pager.can_prev());
        assert_eq!(pager.prev(), 0);

        assert_eq!(pager.next(), 1);
        assert_eq!(pager.next(), 2);
        assert!(!pager.can_next());
        assert_eq!(pager.next(), 2);

        assert_eq!(pager.go_to(9), 2);
        assert_eq!(pager.go_to(0), 0);
        assert_eq!(pager.page_range(), 0..3);
        pager.go_to(2);
        assert_eq!(pager.page_range(), 6..7);
    }

    #[test]
    fn test_wrap_next_and_dots_agree() {
        let mut pager = Pager::new(7, 3, NavPolicy::Wrap);
        assert_eq!(pager.prev(), 2);
        assert_eq!(pager.next(), 0);
        assert_eq!(pager.go_to(4), 1);
        assert!(pager.can_prev());

        let mut single = Pager::single(1, NavPolicy::Wrap);
        assert!(!single.can_next());
        assert_eq!(single.next(), 0);
    }

    #[test]
    fn test_empty_pager() {
        let mut pager = Pager::new(0, 3, NavPolicy::Wrap);
        assert_eq!(pager.next(), 0);
        assert_eq!(pager.prev(), 0);
        assert_eq!(pager.go_to(3), 0);
        assert_eq!(pager.page_range(), 0..0);
        assert!(!pager.can_next());
    }

    #[test]
    fn test_resize_clamps_current() {
        let mut pager = Pager::new(7, 1, NavPolicy::Saturate);
        pager.go_to(6);
        pager.resize(1280);
        assert_eq!(pager.visible(), 3);
        assert_eq!(pager.current(), 2);
        pager.resize(700);
        assert_eq!(pager.visible(), 2);
        assert_eq!(pager.current(), 2);
        assert_eq!(pager.page_range(), 4..6);
    }

    #[test]
    fn test_set_items_clamps_current() {
        let mut pager = Pager::new(9, 3, NavPolicy::Saturate);
        pager.go_to(2);
        pager.set_items(4);
        assert_eq!(pager.current(), 1);
        pager.set_items(0);
        assert_eq!(pager.current(), 0);
    }

    #[test]
    fn test_swipe() {
        let mut swipe = Swipe::default();
        assert_eq!(swipe.end(10.0), None);

        swipe.begin(300.0);
        assert_eq!(swipe.end(200.0), Some(SwipeDirection::Next));
        swipe.begin(100.0);
        assert_eq!(swipe.end(160.0), Some(SwipeDirection::Prev));
        swipe.begin(100.0);
        assert_eq!(swipe.end(130.0), None);
        swipe.begin(100.0);
        swipe.cancel();
        assert_eq!(swipe.end(0.0), None);

        let mut pager = Pager::new(7, 3, NavPolicy::Saturate);
        assert_eq!(pager.apply_swipe(SwipeDirection::Next), 1);
        assert_eq!(pager.apply_swipe(SwipeDirection::Prev), 0);
        assert_eq!(pager.apply_swipe(SwipeDirection::Prev), 0);
    }

    #[test]
    fn test_autoplay() {
        let mut auto = Autoplay::new(3, 3000);
        assert!(auto.is_running());
        assert_eq!(auto.tick(2999), 0);
        assert_eq!(auto.tick(1), 1);
        assert_eq!(auto.tick(6000), 0);

        let mut still = Autoplay::new(1, 3000);
        assert!(!still.is_running());
        assert_eq!(still.tick(10_000), 0);
    }
}
