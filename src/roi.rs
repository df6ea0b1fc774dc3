//! Key signature region of interest and its slices.
//!
//! The key area is cut into vertical slices, one per expected alter. Each
//! slice keeps the best evaluation found so far and, once accepted, the
//! resulting [`KeyAlter`].

use serde::Serialize;

use crate::error::{ExtractError, ExtractResult};
use crate::glyph::Glyph;
use crate::model::{Evaluation, KeyRange, Point, Rect, Shape};
use crate::pixels::PixelSource;

/// An accepted key alter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyAlter {
    /// Registered glyph
    pub glyph: Glyph,
    pub shape: Shape,
    /// Classifier grade discounted by the intrinsic ratio
    pub grade: f64,
    /// Pitch position relative to the staff middle line
    pub pitch: f64,
}

/// One expected alter position.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySlice {
    /// 1-based index within the roi
    pub id: usize,
    pub rect: Rect,
    /// Best evaluation so far
    pub eval: Option<Evaluation>,
    /// Glyph of the best evaluation
    pub glyph: Option<Glyph>,
    /// Accepted alter
    pub alter: Option<KeyAlter>,
}

impl KeySlice {
    pub fn new(id: usize, rect: Rect) -> Self {
        Self {
            id,
            rect,
            eval: None,
            glyph: None,
            alter: None,
        }
    }

    /// First and last abscissa covered.
    pub fn span(&self) -> (i32, i32) {
        (self.rect.x, self.rect.right())
    }

    pub fn alter(&self) -> Option<&KeyAlter> {
        self.alter.as_ref()
    }
}

impl std::fmt::Display for KeySlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slice#{} x:{} w:{}", self.id, self.rect.x, self.rect.width)?;
        if let Some(ref eval) = self.eval {
            write!(f, " {:?}({:.3})", eval.shape, eval.grade)?;
        }
        if let Some(ref alter) = self.alter {
            write!(f, " alter:{:?}({:.3})", alter.shape, alter.grade)?;
        }
        Ok(())
    }
}

/// The key area: a horizontal band of the staff plus its slices.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRoi {
    /// Top ordinate of the area
    pub y: i32,
    pub height: i32,
    slices: Vec<KeySlice>,
}

impl KeyRoi {
    pub fn new(y: i32, height: i32) -> Self {
        Self {
            y,
            height,
            slices: Vec::new(),
        }
    }

    /// Build a roi with one slice per `(start, stop)` abscissa pair.
    pub fn with_slices(y: i32, height: i32, bounds: &[(i32, i32)]) -> Self {
        let mut roi = Self::new(y, height);
        for &(start, stop) in bounds {
            roi.create_slice(start, stop);
        }
        roi
    }

    /// Append a slice covering `[start, stop]`, returning its index.
    pub fn create_slice(&mut self, start: i32, stop: i32) -> usize {
        let id = self.slices.len() + 1;
        let rect = Rect::new(start, self.y, stop - start + 1, self.height);
        self.slices.push(KeySlice::new(id, rect));
        self.slices.len() - 1
    }

    /// Check the geometry is usable.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.height <= 0 {
            return Err(ExtractError::InvalidRegion(format!(
                "roi height must be positive, got {}",
                self.height
            )));
        }
        for slice in &self.slices {
            if slice.rect.is_empty() {
                return Err(ExtractError::InvalidRegion(format!(
                    "slice#{} has empty rectangle {:?}",
                    slice.id, slice.rect
                )));
            }
        }
        Ok(())
    }

    pub fn slices(&self) -> &[KeySlice] {
        &self.slices
    }

    pub fn get(&self, index: usize) -> Option<&KeySlice> {
        self.slices.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut KeySlice> {
        self.slices.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeySlice> {
        self.slices.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, KeySlice> {
        self.slices.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Index of the slice whose abscissa range contains `x`.
    pub fn slice_of(&self, x: i32) -> Option<usize> {
        self.slices
            .iter()
            .position(|s| s.rect.x <= x && x <= s.rect.right())
    }

    /// Rectangle of the whole key area.
    pub fn area_rect(&self, range: &KeyRange) -> Rect {
        Rect::new(range.start, self.y, range.width(), self.height)
    }

    /// Pixels of the key area.
    pub fn area_pixels(&self, source: &PixelSource, range: &KeyRange) -> ExtractResult<PixelSource> {
        source.crop(&self.area_rect(range))
    }

    /// Pixels of one slice. With `crop_neighbors`, the pixels of alters
    /// already accepted in the adjacent slices are erased.
    pub fn slice_pixels(
        &self,
        source: &PixelSource,
        index: usize,
        crop_neighbors: bool,
    ) -> ExtractResult<PixelSource> {
        let slice = self.slices.get(index).ok_or_else(|| {
            ExtractError::InvalidRegion(format!("no slice at index {index}"))
        })?;
        let mut buf = source.crop(&slice.rect)?;

        if crop_neighbors {
            let origin = Point::new(slice.rect.x, slice.rect.y);
            let neighbors = [index.checked_sub(1), Some(index + 1)];
            for neighbor in neighbors.into_iter().flatten() {
                if let Some(alter) = self.slices.get(neighbor).and_then(|s| s.alter.as_ref()) {
                    buf.erase(alter.glyph.pixels(), origin);
                }
            }
        }

        Ok(buf)
    }
}

impl<'a> IntoIterator for &'a KeyRoi {
    type Item = &'a KeySlice;
    type IntoIter = std::slice::Iter<'a, KeySlice>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}
