//! Binary pixel buffer for the staff-free image.
//!
//! Follows the usual scanned-image convention: value 0 is foreground
//! (ink), any other value is background.

use crate::error::{ExtractError, ExtractResult};
use crate::model::{Point, Rect};

/// Foreground pixel value.
pub const FOREGROUND: u8 = 0;
/// Background pixel value.
pub const BACKGROUND: u8 = 255;

/// A rectangular byte buffer, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSource {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelSource {
    /// Wrap raw pixel values.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> ExtractResult<Self> {
        if width == 0 || height == 0 {
            return Err(ExtractError::InvalidDimensions(width, height));
        }
        let expected = width * height;
        if data.len() != expected {
            return Err(ExtractError::PixelCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// An all-background buffer.
    pub fn blank(width: usize, height: usize) -> ExtractResult<Self> {
        Self::new(width, height, vec![BACKGROUND; width * height])
    }

    /// Build from text rows where `#` or `X` marks ink, anything else
    /// background. Short rows are padded with background.
    pub fn from_ascii(rows: &[&str]) -> ExtractResult<Self> {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut source = Self::blank(width, height)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                if c == '#' || c == 'X' {
                    source.data[y * width + x] = FOREGROUND;
                }
            }
        }
        Ok(source)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel value, background when out of bounds.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return BACKGROUND;
        }
        self.data[y as usize * self.width + x as usize]
    }

    pub fn is_foreground(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == FOREGROUND
    }

    /// Set a pixel; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.data[y as usize * self.width + x as usize] = value;
    }

    /// Number of foreground pixels within `rect`.
    pub fn ink(&self, rect: &Rect) -> u32 {
        let mut weight = 0;
        for x in rect.x..=rect.right() {
            for y in rect.y..=rect.bottom() {
                if self.is_foreground(x, y) {
                    weight += 1;
                }
            }
        }
        weight
    }

    /// Copy of the `rect` area. Parts of `rect` lying outside the source
    /// read as background.
    pub fn crop(&self, rect: &Rect) -> ExtractResult<PixelSource> {
        if rect.is_empty() {
            return Err(ExtractError::InvalidRegion(format!("empty crop {:?}", rect)));
        }
        let width = rect.width as usize;
        let height = rect.height as usize;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..rect.height {
            for x in 0..rect.width {
                data.push(self.get(rect.x + x, rect.y + y));
            }
        }
        PixelSource::new(width, height, data)
    }

    /// Erase the given absolute pixels, this buffer being located at `origin`.
    pub fn erase(&mut self, pixels: &[Point], origin: Point) {
        for p in pixels {
            self.set(p.x - origin.x, p.y - origin.y, BACKGROUND);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_data() {
        assert_eq!(
            PixelSource::new(3, 3, vec![0; 8]),
            Err(ExtractError::PixelCountMismatch { expected: 9, actual: 8 })
        );
        assert_eq!(
            PixelSource::new(0, 3, vec![]),
            Err(ExtractError::InvalidDimensions(0, 3))
        );
    }

    #[test]
    fn counts_ink_inside_rect_only() {
        let source = PixelSource::from_ascii(&[
            "#..#",
            ".##.",
            "....",
        ])
        .unwrap();
        assert_eq!(source.ink(&Rect::new(0, 0, 4, 3)), 4);
        assert_eq!(source.ink(&Rect::new(1, 0, 2, 2)), 2);
        // Outside pixels are background
        assert_eq!(source.ink(&Rect::new(-5, -5, 20, 20)), 4);
    }

    #[test]
    fn blank_region_has_no_ink() {
        let source = PixelSource::blank(30, 30).unwrap();
        assert_eq!(source.ink(&Rect::new(0, 0, 30, 30)), 0);
    }

    #[test]
    fn crop_and_erase() {
        let source = PixelSource::from_ascii(&[
            "....",
            ".##.",
            ".##.",
        ])
        .unwrap();
        let mut sub = source.crop(&Rect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(sub.ink(&Rect::new(0, 0, 2, 2)), 4);
        sub.erase(&[Point::new(1, 1), Point::new(2, 2)], Point::new(1, 1));
        assert_eq!(sub.ink(&Rect::new(0, 0, 2, 2)), 2);
        assert!(!sub.is_foreground(0, 0));
    }
}
