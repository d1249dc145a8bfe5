//! Screen geometry: points, boxes and viewports.

use serde::{Deserialize, Serialize};

/// A point in CSS pixels or, for relative positions, in viewport percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Viewport information for coordinate calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
    /// Scroll X offset.
    #[serde(default, alias = "scrollX")]
    pub scroll_x: f64,
    /// Scroll Y offset.
    #[serde(default, alias = "scrollY")]
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Whether the viewport has a usable, non-degenerate size.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Convert a pixel point to viewport percentages (0-100), rounded to 2 decimals.
    pub fn to_relative(&self, point: Point) -> Point {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        Point {
            x: round(point.x / self.width * 100.0),
            y: round(point.y / self.height * 100.0),
        }
    }

    /// Convert viewport percentages back to pixels.
    pub fn to_absolute(&self, relative: Point) -> Point {
        Point {
            x: relative.x / 100.0 * self.width,
            y: relative.y / 100.0 * self.height,
        }
    }
}

/// Bounding box for an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    #[serde(alias = "w")]
    pub width: f64,
    #[serde(alias = "h")]
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Get the center point of this bounding box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if this box intersects with another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Check if this box is visible in viewport.
    pub fn is_visible_in_viewport(&self, viewport: &Viewport) -> bool {
        let vp_box = BoundingBox::new(0.0, 0.0, viewport.width, viewport.height);
        self.intersects(&vp_box)
    }

    /// A box with finite coordinates and a non-zero area.
    pub fn has_layout(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Grow the box by `padding` on every side, clamped at the origin.
    pub fn padded(&self, padding: f64) -> BoundingBox {
        let x = (self.x - padding).max(0.0);
        let y = (self.y - padding).max(0.0);
        BoundingBox {
            x,
            y,
            width: self.x + self.width + padding - x,
            height: self.y + self.height + padding - y,
        }
    }

    /// Size similarity in `0..=1` (1 = identical width and height).
    pub fn size_similarity(&self, other: &BoundingBox) -> f64 {
        let ratio = |a: f64, b: f64| {
            if a <= 0.0 && b <= 0.0 {
                1.0
            } else if a <= 0.0 || b <= 0.0 {
                0.0
            } else {
                a.min(b) / a.max(b)
            }
        };
        (ratio(self.width, other.width) + ratio(self.height, other.height)) / 2.0
    }
}
