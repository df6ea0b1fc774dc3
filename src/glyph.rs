//! Glyphs and their two-phase lifecycle.
//!
//! A glyph starts transient (`id == None`) when the cluster decomposer
//! assembles it from fragments. It is promoted only once it backs an
//! accepted key alter, by registering it in a [`GlyphIndex`], which hands
//! out stable identifiers and dedupes glyphs made of the same pixels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Point, Rect};

/// Persistent glyph identifier, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlyphId(pub u32);

/// A set of foreground pixels with its geometric summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Set once the glyph is registered
    pub id: Option<GlyphId>,
    pub bounds: Rect,
    /// Number of pixels
    pub weight: u32,
    pub centroid: Point,
    /// Absolute pixel locations, sorted
    #[serde(skip)]
    pixels: Vec<Point>,
}

impl Glyph {
    /// Build a transient glyph. Returns `None` for an empty pixel set.
    pub fn from_pixels(mut pixels: Vec<Point>) -> Option<Glyph> {
        let first = *pixels.first()?;
        pixels.sort_unstable();
        pixels.dedup();

        let mut bounds = Rect::of_point(first);
        let (mut sum_x, mut sum_y) = (0i64, 0i64);
        for p in &pixels {
            bounds = bounds.union(&Rect::of_point(*p));
            sum_x += p.x as i64;
            sum_y += p.y as i64;
        }
        let weight = pixels.len() as u32;
        let centroid = Point::new(
            (sum_x as f64 / weight as f64).round() as i32,
            (sum_y as f64 / weight as f64).round() as i32,
        );

        Some(Glyph {
            id: None,
            bounds,
            weight,
            centroid,
            pixels,
        })
    }

    pub fn pixels(&self) -> &[Point] {
        &self.pixels
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    /// Whether both glyphs are made of exactly the same pixels.
    pub fn same_pixels(&self, other: &Glyph) -> bool {
        self.pixels == other.pixels
    }
}

/// Arena of promoted glyphs.
#[derive(Debug, Default)]
pub struct GlyphIndex {
    glyphs: Vec<Glyph>,
    by_pixels: HashMap<Vec<Point>, GlyphId>,
}

impl GlyphIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote a glyph, or return the already registered glyph with the
    /// same pixels.
    pub fn register(&mut self, glyph: Glyph) -> Glyph {
        if glyph.is_registered() {
            return glyph;
        }
        if let Some(&id) = self.by_pixels.get(&glyph.pixels) {
            return self.glyphs[(id.0 - 1) as usize].clone();
        }
        let id = GlyphId(self.glyphs.len() as u32 + 1);
        let mut glyph = glyph;
        glyph.id = Some(id);
        self.by_pixels.insert(glyph.pixels.clone(), id);
        self.glyphs.push(glyph.clone());
        log::debug!("Registered glyph#{} weight:{}", id.0, glyph.weight);
        glyph
    }

    pub fn get(&self, id: GlyphId) -> Option<&Glyph> {
        (id.0 as usize).checked_sub(1).and_then(|i| self.glyphs.get(i))
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
