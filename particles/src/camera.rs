#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen (view) or image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Camera state for pan/zoom over the loaded image.
///
/// `pan_x` / `pan_y` are in screen pixels.
/// `zoom` is a scale factor (1.0 = whole image, never below).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point to image coordinates.
    #[must_use]
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert an image-space point to screen coordinates.
    #[must_use]
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point {
            x: image.x * self.zoom + self.pan_x,
            y: image.y * self.zoom + self.pan_y,
        }
    }

    /// Whether the view is magnified at all.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.zoom > MIN_ZOOM
    }

    /// Change zoom while keeping the image point under `screen` fixed on screen.
    ///
    /// The requested zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`. Landing on the
    /// minimum zoom resets the pan so the image sits back at the origin.
    /// Returns `true` if the camera changed.
    pub fn zoom_at(&mut self, screen: Point, zoom: f64) -> bool {
        let new_zoom = clamp_zoom(zoom);
        let before = *self;
        if new_zoom <= MIN_ZOOM {
            *self = Self::default();
        } else {
            let anchor = self.screen_to_image(screen);
            self.zoom = new_zoom;
            self.pan_x = screen.x - anchor.x * new_zoom;
            self.pan_y = screen.y - anchor.y * new_zoom;
        }
        *self != before
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Pan so that `image` lands on `viewport_center` at the current zoom.
    pub fn center_on(&mut self, image: Point, viewport_center: Point) {
        self.pan_x = viewport_center.x - image.x * self.zoom;
        self.pan_y = viewport_center.y - image.y * self.zoom;
    }
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return MIN_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}
