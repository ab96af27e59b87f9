//! Detail modal and the Escape-closes-topmost overlay stack.

/// Full-text view of one item, opened from a card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailModal {
    open: Option<OpenModal>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenModal {
    index: usize,
    items: usize,
    /// Page scroll position to restore on close.
    scroll_y: f64,
}

impl DetailModal {
    /// Open on item `index` of the full list. Out-of-range indices are refused.
    pub fn open(&mut self, index: usize, items: usize, scroll_y: f64) -> bool {
        if index >= items {
            return false;
        }
        self.open = Some(OpenModal {
            index,
            items,
            scroll_y,
        });
        true
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.open.map(|m| m.index)
    }

    pub fn next(&mut self) -> Option<usize> {
        let modal = self.open.as_mut()?;
        modal.index = (modal.index + 1).min(modal.items - 1);
        Some(modal.index)
    }

    pub fn prev(&mut self) -> Option<usize> {
        let modal = self.open.as_mut()?;
        modal.index = modal.index.saturating_sub(1);
        Some(modal.index)
    }

    /// Close; returns the scroll position to restore.
    pub fn close(&mut self) -> Option<f64> {
        self.open.take().map(|m| m.scroll_y)
    }
}

/// Layers that Escape can close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Gallery,
    ProjectModal,
    PostModal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayStack {
    layers: Vec<Overlay>,
}

impl OverlayStack {
    /// Open `overlay` on top. Re-opening an open layer moves it to the top.
    pub fn push(&mut self, overlay: Overlay) {
        self.layers.retain(|&l| l != overlay);
        self.layers.push(overlay);
    }

    /// Escape: close only the topmost layer.
    pub fn on_escape(&mut self) -> Option<Overlay> {
        self.layers.pop()
    }

    /// Close a specific layer (close button, backdrop click).
    pub fn close(&mut self, overlay: Overlay) -> bool {
        let before = self.layers.len();
        self.layers.retain(|&l| l != overlay);
        self.layers.len() != before
    }

    pub fn top(&self) -> Option<Overlay> {
        self.layers.last().copied()
    }

    pub fn is_open(&self, overlay: Overlay) -> bool {
        self.layers.contains(&overlay)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_bounds_and_saturation() {
        let mut modal = DetailModal::default();
        assert!(!modal.open(5, 5, 0.0));
        assert!(!modal.is_open());
        assert_eq!(modal.next(), None);

        assert!(modal.open(3, 5, 1200.0));
        assert_eq!(modal.next(), Some(4));
        assert_eq!(modal.next(), Some(4));
        assert_eq!(modal.prev(), Some(3));

        assert_eq!(modal.close(), Some(1200.0));
        assert_eq!(modal.close(), None);
        assert_eq!(modal.index(), None);
    }

    #[test]
    fn test_modal_opens_past_carousel_page() {
        // index is checked against the whole list, not the visible page
        let mut modal = DetailModal::default();
        assert!(modal.open(6, 7, 0.0));
        assert_eq!(modal.prev(), Some(5));
    }

    #[test]
    fn test_escape_closes_topmost_only() {
        let mut stack = OverlayStack::default();
        stack.push(Overlay::Gallery);
        stack.push(Overlay::ProjectModal);

        assert_eq!(stack.on_escape(), Some(Overlay::ProjectModal));
        assert!(stack.is_open(Overlay::Gallery));
        assert_eq!(stack.on_escape(), Some(Overlay::Gallery));
        assert_eq!(stack.on_escape(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_existing_moves_to_top_and_close() {
        let mut stack = OverlayStack::default();
        stack.push(Overlay::PostModal);
        stack.push(Overlay::Gallery);
        stack.push(Overlay::PostModal);
        assert_eq!(stack.top(), Some(Overlay::PostModal));

        assert!(stack.close(Overlay::Gallery));
        assert!(!stack.close(Overlay::Gallery));
        assert_eq!(stack.top(), Some(Overlay::PostModal));
    }
}
