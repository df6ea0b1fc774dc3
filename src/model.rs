//! Data model shared by the extraction pipeline.
//!
//! Geometry is expressed in sheet pixel coordinates: x grows to the right,
//! y grows downward, and a rectangle covers `[x, x + width - 1]` by
//! `[y, y + height - 1]`.

use serde::{Deserialize, Serialize};

/// A pixel location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of a single pixel.
    pub fn of_point(p: Point) -> Self {
        Self::new(p.x, p.y, 1, 1)
    }

    /// Abscissa of the rightmost column.
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Ordinate of the bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x + 1, bottom - y + 1)
    }

    /// Whether the rectangle abscissa range embraces `x`.
    pub fn x_embraces(&self, x: f64) -> bool {
        x >= self.x as f64 && x < (self.x + self.width) as f64
    }

    /// Euclidean distance between the two rectangles, 0 when they touch
    /// or overlap.
    pub fn gap(&self, other: &Rect) -> f64 {
        let dx = (other.x - self.right() - 1).max(self.x - other.right() - 1).max(0);
        let dy = (other.y - self.bottom() - 1).max(self.y - other.bottom() - 1).max(0);
        (dx as f64).hypot(dy as f64)
    }
}

/// Shapes a key alter glyph may be recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
    DoubleFlat,
    /// Anything that is not a musical symbol, used for negative samples.
    Clutter,
}

/// Classifier verdict for one shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub shape: Shape,
    /// Raw classifier grade in [0, 1]
    pub grade: f64,
}

impl Evaluation {
    pub fn new(shape: Shape, grade: f64) -> Self {
        Self { shape, grade }
    }
}

/// An expected vertical landmark (stem-like feature) in the key area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyPeak {
    /// Horizontal center of the peak
    pub center: f64,
}

impl KeyPeak {
    pub fn new(center: f64) -> Self {
        Self { center }
    }
}

/// Abscissa range of the key signature area, both bounds included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRange {
    pub start: i32,
    pub stop: i32,
}

impl KeyRange {
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }

    pub fn width(&self) -> i32 {
        self.stop - self.start + 1
    }
}

/// The staff whose key signature is being extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    /// Staff identifier (for logging only)
    pub id: usize,
    /// Distance between two staff lines, in pixels
    pub interline: u32,
    /// Ordinate of the middle staff line at the key area
    pub mid_line_y: f64,
}

impl Staff {
    pub fn new(id: usize, interline: u32, mid_line_y: f64) -> Self {
        Self { id, interline, mid_line_y }
    }

    /// Pitch position of a point: number of half-interlines from the
    /// middle line, negative above it (top line is -4, bottom line is +4).
    pub fn pitch_position_of(&self, p: Point) -> f64 {
        if self.interline == 0 {
            return 0.0;
        }
        2.0 * (p.y as f64 - self.mid_line_y) / self.interline as f64
    }
}
