//! Viewport module for pan/zoom over the print area.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Viewport manages the view transform for the canvas.
///
/// Pan is in screen pixels. The effective scale is `zoom * display_scale`,
/// where `display_scale` maps print-area pixels onto the on-screen canvas
/// element and is owned by the device adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan)
    pub pan: Vec2,
    /// Current zoom level (1.0 = fit)
    pub zoom: f64,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
    /// On-screen pixels per canvas pixel
    pub display_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 3.0,
            display_scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective screen pixels per canvas pixel.
    pub fn scale(&self) -> f64 {
        self.zoom * self.display_scale
    }

    /// World (canvas) to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.scale())
    }

    /// Screen to world (canvas) transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale()) * Affine::translate(-self.pan)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Convert a screen-space movement into a canvas-space movement.
    pub fn screen_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        delta / self.scale()
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom the viewport, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let canvas_point = self.screen_to_canvas(screen_point);
        self.zoom = new_zoom;

        // Shift pan so canvas_point stays under screen_point
        let new_screen = self.canvas_to_screen(canvas_point);
        self.pan += screen_point - new_screen;
    }

    /// Change the zoom bounds and clamp the current zoom into them.
    pub fn set_zoom_bounds(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    pub fn set_display_scale(&mut self, display_scale: f64) {
        if display_scale.is_finite() && display_scale > 0.0 {
            self.display_scale = display_scale;
        }
    }

    /// Reset pan and zoom, keeping bounds and display scale.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert!((viewport.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_canvas_with_pan_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(50.0, 100.0);
        viewport.zoom = 2.0;
        let canvas = viewport.screen_to_canvas(Point::new(150.0, 300.0));
        assert!((canvas.x - 50.0).abs() < 1e-10);
        assert!((canvas.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_display_scale_affects_delta() {
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.set_display_scale(0.5);
        let delta = viewport.screen_delta_to_canvas(Vec2::new(10.0, -4.0));
        assert!((delta.x - 10.0).abs() < 1e-10);
        assert!((delta.y + 4.0).abs() < 1e-10);

        viewport.set_display_scale(0.0);
        assert!((viewport.display_scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(30.0, -20.0);
        viewport.zoom = 1.5;
        viewport.display_scale = 0.8;

        let original = Point::new(123.0, 456.0);
        let back = viewport.canvas_to_screen(viewport.screen_to_canvas(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.zoom_at(Point::ZERO, 0.001);
        assert_eq!(viewport.zoom, viewport.min_zoom);

        viewport.zoom = 1.0;
        for _ in 0..5 {
            viewport.zoom_at(Point::ZERO, 10.0);
        }
        assert_eq!(viewport.zoom, 3.0);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(200.0, 120.0);
        let before = viewport.screen_to_canvas(anchor);
        viewport.zoom_at(anchor, 2.0);
        let after = viewport.screen_to_canvas(anchor);
        assert!((before - after).hypot() < 1e-9);
    }

    #[test]
    fn test_set_zoom_bounds_clamps() {
        let mut viewport = Viewport::new();
        viewport.zoom = 0.2;
        viewport.set_zoom_bounds(0.5, 3.0);
        assert_eq!(viewport.zoom, 0.5);
    }
}
