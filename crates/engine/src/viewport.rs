//! World <-> screen transform.
//!
//! `screen = canvas_center + world * cell_size * zoom + offset`
//!
//! World (0, 0) sits at the canvas center before panning. Screen y grows downward
//! together with world y. Offsets are in CSS pixels and unbounded.

use fleetview_protocol::{CanvasSize, ScreenPoint, ViewportState};

use crate::config::MapConfig;

/// Axis-aligned rectangle in world units (floating point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset: (f64, f64),
    min_zoom: f64,
    max_zoom: f64,
    cell_size: f64,
}

impl Viewport {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            zoom: 1.0_f64.clamp(config.min_zoom, config.max_zoom),
            offset: (0.0, 0.0),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            cell_size: config.cell_size,
        }
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline]
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Screen pixels per world unit at the current zoom.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.cell_size * self.zoom
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            zoom: self.zoom,
            offset_x: self.offset.0,
            offset_y: self.offset.1,
        }
    }

    /// Multiplies zoom by `factor`, clamped to the configured bounds.
    ///
    /// Without an anchor the canvas center stays fixed. With one, the world point
    /// under the anchor stays under it. Returns whether anything changed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<ScreenPoint>, canvas: CanvasSize) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let old = self.zoom;
        let new = (old * factor).clamp(self.min_zoom, self.max_zoom);
        if (new - old).abs() <= f64::EPSILON {
            return false;
        }
        let ratio = new / old;
        let center = canvas.center();
        // Distance of the anchor from the origin-shifted center; the world point
        // under the anchor is preserved by scaling the offset around it.
        let (ax, ay) = match anchor {
            Some(p) => (p.x - center.x, p.y - center.y),
            None => (0.0, 0.0),
        };
        self.offset.0 = ax - (ax - self.offset.0) * ratio;
        self.offset.1 = ay - (ay - self.offset.1) * ratio;
        self.zoom = new;
        true
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    pub fn set_offset(&mut self, offset: (f64, f64)) {
        self.offset = offset;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
        self.offset = (0.0, 0.0);
    }

    /// Pans so that `(wx, wy)` lands on the canvas center. Zoom is unchanged.
    pub fn center_on(&mut self, wx: f64, wy: f64) {
        let s = self.scale();
        self.offset = (-wx * s, -wy * s);
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64, canvas: CanvasSize) -> ScreenPoint {
        let s = self.scale();
        let c = canvas.center();
        ScreenPoint::new(c.x + wx * s + self.offset.0, c.y + wy * s + self.offset.1)
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64, canvas: CanvasSize) -> (f64, f64) {
        let s = self.scale();
        let c = canvas.center();
        ((sx - c.x - self.offset.0) / s, (sy - c.y - self.offset.1) / s)
    }

    /// Converts a screen-pixel length to world units at the current zoom.
    pub fn px_to_world(&self, px: f64) -> f64 {
        px / self.scale()
    }

    pub fn visible_world_rect(&self, canvas: CanvasSize) -> WorldRect {
        let (min_x, min_y) = self.screen_to_world(0.0, 0.0, canvas);
        let (max_x, max_y) = self.screen_to_world(canvas.width, canvas.height, canvas);
        WorldRect {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::approx;

    fn canvas() -> CanvasSize {
        CanvasSize::new(800.0, 600.0)
    }

    fn config() -> MapConfig {
        MapConfig {
            min_zoom: 0.5,
            max_zoom: 3.0,
            ..MapConfig::default()
        }
    }

    #[test]
    fn origin_maps_to_canvas_center() {
        let vp = Viewport::new(&config());
        let p = vp.world_to_screen(0.0, 0.0, canvas());
        assert_eq!((p.x, p.y), (400.0, 300.0));
    }

    #[test]
    fn zoom_is_clamped_to_max() {
        let mut vp = Viewport::new(&config());
        for _ in 0..5 {
            vp.zoom_by(1.5, None, canvas());
        }
        assert_eq!(vp.zoom(), 3.0);
        for _ in 0..20 {
            vp.zoom_by(0.5, None, canvas());
        }
        assert_eq!(vp.zoom(), 0.5);
    }

    #[test]
    fn non_positive_factor_is_ignored() {
        let mut vp = Viewport::new(&config());
        assert!(!vp.zoom_by(0.0, None, canvas()));
        assert!(!vp.zoom_by(f64::NAN, None, canvas()));
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn transform_round_trips_over_reachable_states() {
        let mut vp = Viewport::new(&config());
        let points = [(0.0, 0.0), (3.0, -12.0), (1e6, -1e6), (-0.25, 7.5)];
        let factors = [1.0, 1.3, 0.7, 2.9, 0.1, 10.0];
        let pans = [(0.0, 0.0), (123.4, -56.7), (-1e5, 3e4)];
        for f in factors {
            vp.zoom_by(f, Some(ScreenPoint::new(17.0, 590.0)), canvas());
            for (dx, dy) in pans {
                vp.pan_by(dx, dy);
                for (wx, wy) in points {
                    let s = vp.world_to_screen(wx, wy, canvas());
                    let (rx, ry) = vp.screen_to_world(s.x, s.y, canvas());
                    assert!(approx(rx, wx), "x {rx} != {wx} at zoom {}", vp.zoom());
                    assert!(approx(ry, wy), "y {ry} != {wy} at zoom {}", vp.zoom());
                }
            }
        }
    }

    #[test]
    fn center_zoom_keeps_center_world_point() {
        let mut vp = Viewport::new(&config());
        vp.pan_by(40.0, -25.0);
        let before = vp.screen_to_world(400.0, 300.0, canvas());
        vp.zoom_by(2.0, None, canvas());
        let after = vp.screen_to_world(400.0, 300.0, canvas());
        assert!(approx(before.0, after.0) && approx(before.1, after.1));
    }

    #[test]
    fn anchored_zoom_keeps_point_under_cursor() {
        let mut vp = Viewport::new(&config());
        let cursor = ScreenPoint::new(650.0, 120.0);
        let before = vp.screen_to_world(cursor.x, cursor.y, canvas());
        vp.zoom_by(1.8, Some(cursor), canvas());
        let after = vp.screen_to_world(cursor.x, cursor.y, canvas());
        assert!(approx(before.0, after.0) && approx(before.1, after.1));
    }

    #[test]
    fn center_on_places_point_mid_canvas() {
        let mut vp = Viewport::new(&config());
        vp.zoom_by(2.0, None, canvas());
        vp.center_on(3.0, -12.0);
        let p = vp.world_to_screen(3.0, -12.0, canvas());
        assert!(approx(p.x, 400.0) && approx(p.y, 300.0));
    }

    #[test]
    fn reset_restores_identity() {
        let mut vp = Viewport::new(&config());
        vp.zoom_by(2.0, None, canvas());
        vp.pan_by(10.0, 10.0);
        vp.reset();
        assert_eq!(vp.zoom(), 1.0);
        assert_eq!(vp.offset(), (0.0, 0.0));
    }
}
