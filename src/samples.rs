//! Training sample sink.
//!
//! Glyphs accepted as key alters make positive samples; glyphs that were
//! submitted to the classifier but never accepted make negative
//! ([`Shape::Clutter`]) samples.

use serde::Serialize;

use crate::glyph::Glyph;
use crate::model::{Point, Rect, Shape};

/// Receives training samples.
pub trait SampleRecorder {
    fn add_sample(&mut self, shape: Shape, glyph: &Glyph, interline: u32, pitch: f64);
}

/// One recorded sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub shape: Shape,
    pub bounds: Rect,
    pub weight: u32,
    pub interline: u32,
    pub pitch: f64,
    /// Absolute pixel locations
    pub pixels: Vec<Point>,
}

/// In-memory sample repository.
#[derive(Debug, Default)]
pub struct SampleRepository {
    samples: Vec<Sample>,
}

impl SampleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples of the given shape.
    pub fn of_shape(&self, shape: Shape) -> impl Iterator<Item = &Sample> {
        self.samples.iter().filter(move |s| s.shape == shape)
    }

    /// Serialize all samples to JSON.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(&self.samples).map_err(|e| format!("JSON serialization error: {e}"))
    }
}

impl SampleRecorder for SampleRepository {
    fn add_sample(&mut self, shape: Shape, glyph: &Glyph, interline: u32, pitch: f64) {
        self.samples.push(Sample {
            shape,
            bounds: glyph.bounds,
            weight: glyph.weight,
            interline,
            pitch,
            pixels: glyph.pixels().to_vec(),
        });
    }
}
