//! Viewport that windows a large world into a bounded visible region.

use tilefall_core::{HasBoundingBox, PixelPoint, PixelRect};

/// Rectangular window into world-pixel space.
///
/// The window's size is fixed to the display size at construction; only its
/// position moves. After every [`Viewport::update`] the window satisfies
/// `0 <= left <= world_width - width - 1` per axis, collapsing to zero when
/// the world is smaller than the window.
#[derive(Clone, Debug)]
pub struct Viewport {
    window: PixelRect,
    world_width: i32,
    world_height: i32,
}

impl Viewport {
    /// Creates a viewport anchored at the world origin.
    #[must_use]
    pub const fn new(width: i32, height: i32, world_width: i32, world_height: i32) -> Self {
        Self {
            window: PixelRect::new(0, 0, width, height),
            world_width,
            world_height,
        }
    }

    /// Current window rect in world pixels.
    #[must_use]
    pub const fn window(&self) -> PixelRect {
        self.window
    }

    /// Translates a window-local location into a world-pixel location.
    #[must_use]
    pub const fn window_to_map(&self, location: PixelPoint) -> PixelPoint {
        PixelPoint::new(
            location.x + self.window.left(),
            location.y + self.window.top(),
        )
    }

    /// Projects a world-space target onto the window: its draw position
    /// relative to the window's top-left corner.
    #[must_use]
    pub fn apply(&self, target: &impl HasBoundingBox) -> PixelRect {
        target
            .bounding_box()
            .translated(-self.window.left(), -self.window.top())
    }

    /// Recenters the window on the target and clamps it to the world bounds,
    /// returning the resulting window rect.
    ///
    /// Consumers crop the world surface to the returned rect; the core only
    /// computes the visible sub-rectangle.
    pub fn update(&mut self, target: &impl HasBoundingBox) -> PixelRect {
        let rect = target.bounding_box();
        let left = rect.left() - self.window.width() / 2;
        let top = rect.top() - self.window.height() / 2;

        self.window = PixelRect::new(
            clamp_axis(left, self.world_width, self.window.width()),
            clamp_axis(top, self.world_height, self.window.height()),
            self.window.width(),
            self.window.height(),
        );
        self.window
    }
}

/// Clamps one window axis to `0 ..= world - window - 1`.
///
/// When the world is smaller than the window the range is empty; the axis
/// pins to zero so the window never scrolls to negative coordinates.
fn clamp_axis(value: i32, world_extent: i32, window_extent: i32) -> i32 {
    let max = world_extent - window_extent - 1;
    if max <= 0 {
        0
    } else {
        value.clamp(0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use tilefall_core::{PixelPoint, PixelRect};

    #[test]
    fn update_clamps_at_world_origin() {
        let mut viewport = Viewport::new(1024, 768, 3200, 3200);
        let window = viewport.update(&PixelRect::new(0, 0, 30, 32));

        assert_eq!(window.left(), 0);
        assert_eq!(window.top(), 0);
    }

    #[test]
    fn update_clamps_at_far_world_edge() {
        let mut viewport = Viewport::new(1024, 768, 3200, 3200);
        let window = viewport.update(&PixelRect::new(3170, 3168, 30, 32));

        assert_eq!(window.left(), 3200 - 1024 - 1);
        assert_eq!(window.top(), 3200 - 768 - 1);
    }

    #[test]
    fn update_centers_on_target_inside_bounds() {
        let mut viewport = Viewport::new(1024, 768, 3200, 3200);
        let window = viewport.update(&PixelRect::new(1600, 1000, 30, 32));

        assert_eq!(window.left(), 1600 - 512);
        assert_eq!(window.top(), 1000 - 384);
    }

    #[test]
    fn degenerate_world_smaller_than_window_pins_to_origin() {
        let mut viewport = Viewport::new(1024, 768, 320, 320);
        let window = viewport.update(&PixelRect::new(300, 300, 30, 32));

        assert_eq!(window.left(), 0);
        assert_eq!(window.top(), 0);
    }

    #[test]
    fn window_to_map_offsets_by_window_origin() {
        let mut viewport = Viewport::new(1024, 768, 3200, 3200);
        let _ = viewport.update(&PixelRect::new(1600, 1000, 30, 32));

        let world = viewport.window_to_map(PixelPoint::new(10, 20));
        assert_eq!(world, PixelPoint::new(1088 + 10, 616 + 20));
    }

    #[test]
    fn apply_translates_into_window_space() {
        let mut viewport = Viewport::new(1024, 768, 3200, 3200);
        let _ = viewport.update(&PixelRect::new(1600, 1000, 30, 32));

        let projected = viewport.apply(&PixelRect::new(1600, 1000, 30, 32));
        assert_eq!(projected, PixelRect::new(512, 384, 30, 32));
    }
}
