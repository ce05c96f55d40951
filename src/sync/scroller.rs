//! Scrollable regions and ratio mirroring

/// Geometry of a vertically scrollable region
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Current offset from the top
    pub scroll_top: f32,
    /// Full height of the scrolled content
    pub scroll_height: f32,
    /// Height of the visible viewport
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f32, scroll_height: f32, client_height: f32) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Largest reachable offset
    pub fn max_scroll(&self) -> f32 {
        self.scroll_height - self.client_height
    }

    /// Offset as a fraction of the scrollable distance, or `None` without overflow
    pub fn ratio(&self) -> Option<f32> {
        let max = self.max_scroll();
        if max <= 0.0 {
            return None;
        }
        Some((self.scroll_top / max).clamp(0.0, 1.0))
    }
}

/// Anything whose vertical scroll position can be read and written
pub trait Scroller {
    fn metrics(&self) -> ScrollMetrics;
    fn set_scroll_top(&mut self, offset: f32);
}

/// Copy the scroll ratio of `from` onto `to`
///
/// Returns the offset written, or `None` when either side has nothing to
/// scroll.
pub fn mirror_scroll(from: &dyn Scroller, to: &mut dyn Scroller) -> Option<f32> {
    let source = from.metrics();
    let target = to.metrics();

    let target_max = target.max_scroll();
    if target_max <= 0.0 {
        return None;
    }
    let ratio = source.ratio()?;

    let offset = ratio * target_max;
    to.set_scroll_top(offset);
    Some(offset)
}

/// Scroll state of a widget that is laid out once per frame
///
/// `observe` is fed the geometry after each frame. Writes made through
/// `Scroller::set_scroll_top` take effect immediately for readers and are
/// handed to the widget on the next frame through `take_pending`.
#[derive(Debug, Clone, Default)]
pub struct ScrollPane {
    metrics: ScrollMetrics,
    rendered_top: f32,
    pending: Option<f32>,
}

impl ScrollPane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the geometry of the last frame. Returns true if the offset moved.
    pub fn observe(&mut self, scroll_top: f32, scroll_height: f32, client_height: f32) -> bool {
        let moved = (scroll_top - self.rendered_top).abs() > 0.5;
        self.rendered_top = scroll_top;
        self.metrics = ScrollMetrics::new(scroll_top, scroll_height, client_height);
        moved
    }

    /// Offset to apply on the next frame, if one was requested
    pub fn take_pending(&mut self) -> Option<f32> {
        self.pending.take()
    }

    /// Jump back to the top, e.g. when new content replaces the old
    pub fn reset(&mut self) {
        self.metrics = ScrollMetrics::default();
        self.rendered_top = 0.0;
        self.pending = Some(0.0);
    }
}

impl Scroller for ScrollPane {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn set_scroll_top(&mut self, offset: f32) {
        let clamped = offset.clamp(0.0, self.metrics.max_scroll().max(0.0));
        self.metrics.scroll_top = clamped;
        self.pending = Some(clamped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(top: f32, height: f32, client: f32) -> ScrollPane {
        let mut pane = ScrollPane::new();
        pane.observe(top, height, client);
        pane
    }

    #[test]
    fn test_ratio_without_overflow_is_none() {
        assert_eq!(ScrollMetrics::new(0.0, 300.0, 300.0).ratio(), None);
        assert_eq!(ScrollMetrics::new(0.0, 100.0, 300.0).ratio(), None);
        assert_eq!(ScrollMetrics::new(50.0, 300.0, 200.0).ratio(), Some(0.5));
    }

    #[test]
    fn test_mirror_scales_to_target_range() {
        let editor = pane(150.0, 800.0, 200.0);
        let mut reference = pane(0.0, 2200.0, 200.0);

        assert_eq!(mirror_scroll(&editor, &mut reference), Some(500.0));
        assert_eq!(reference.metrics().scroll_top, 500.0);
        assert_eq!(reference.take_pending(), Some(500.0));
        assert_eq!(reference.take_pending(), None);
    }

    #[test]
    fn test_mirror_is_noop_without_overflow() {
        let short = pane(0.0, 100.0, 200.0);
        let mut long = pane(40.0, 1000.0, 200.0);
        assert_eq!(mirror_scroll(&short, &mut long), None);
        assert_eq!(long.metrics().scroll_top, 40.0);

        let mut short = short;
        assert_eq!(mirror_scroll(&long, &mut short), None);
        assert_eq!(short.take_pending(), None);
    }

    #[test]
    fn test_observe_reports_movement_from_last_frame() {
        let mut pane = pane(0.0, 1000.0, 200.0);
        assert!(!pane.observe(0.0, 1000.0, 200.0));
        assert!(pane.observe(120.0, 1000.0, 200.0));

        // A programmatic write is seen as movement once it is rendered
        pane.set_scroll_top(300.0);
        assert!(pane.observe(300.0, 1000.0, 200.0));
        assert!(!pane.observe(300.0, 1000.0, 200.0));
    }

    #[test]
    fn test_set_scroll_top_clamps() {
        let mut pane = pane(0.0, 1000.0, 200.0);
        pane.set_scroll_top(5000.0);
        assert_eq!(pane.metrics().scroll_top, 800.0);
        pane.set_scroll_top(-10.0);
        assert_eq!(pane.metrics().scroll_top, 0.0);
    }
}
