//! Toolkit-neutral scrollbar state.

/// Range model mirrored by whatever scrollbar widget the host renders.
///
/// `value` stays within `[0, max - extent]`; the bar is enabled only when the
/// content (`max`) exceeds the viewport (`extent`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBarModel {
    enabled: bool,
    max: i32,
    value: i32,
    extent: i32,
    unit_increment: i32,
}

impl ScrollBarModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-range the bar after a content or viewport change, keeping the
    /// current value as close as possible.
    pub fn configure(&mut self, max: i32, extent: i32, unit_increment: i32) {
        self.max = max.max(0);
        self.extent = extent.max(0);
        self.unit_increment = unit_increment.max(1);
        self.enabled = self.max > self.extent;
        self.set_value(self.value);
    }

    /// Set the scroll position, clamped into the valid range.
    pub fn set_value(&mut self, value: i32) {
        self.value = value.clamp(0, (self.max - self.extent).max(0));
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn extent(&self) -> i32 {
        self.extent
    }

    pub fn unit_increment(&self) -> i32 {
        self.unit_increment
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_clamped_to_scrollable_range() {
        let mut bar = ScrollBarModel::new();
        bar.configure(1000, 400, 40);

        bar.set_value(-50);
        assert_eq!(bar.value(), 0);

        bar.set_value(5000);
        assert_eq!(bar.value(), 600);

        bar.set_value(300);
        assert_eq!(bar.value(), 300);
    }

    #[test]
    fn disabled_when_content_fits_the_viewport() {
        let mut bar = ScrollBarModel::new();
        bar.configure(400, 1000, 40);
        assert!(!bar.enabled());
        bar.set_value(100);
        assert_eq!(bar.value(), 0);
    }

    #[test]
    fn reconfigure_reclamps_the_current_value() {
        let mut bar = ScrollBarModel::new();
        bar.configure(1000, 400, 40);
        bar.set_value(600);

        bar.configure(500, 400, 40);
        assert_eq!(bar.value(), 100);
    }
}
