//! Shape classifier seam.
//!
//! The classifier is an opaque, read-only scoring oracle. It must be safe
//! to call from several threads at once since independent subgraphs are
//! evaluated in parallel.

use crate::glyph::Glyph;
use crate::model::{Evaluation, Shape};

/// Scores a glyph against the known shapes.
pub trait ShapeClassifier: Send + Sync {
    /// Evaluations of `glyph` for every shape the classifier knows,
    /// `interline` giving the scale the glyph was drawn at.
    fn natural_evaluations(&self, glyph: &Glyph, interline: u32) -> Vec<Evaluation>;
}

/// Evaluation for one shape, graded 0 when the classifier did not report it.
pub fn evaluation_of(evaluations: &[Evaluation], shape: Shape) -> Evaluation {
    evaluations
        .iter()
        .find(|e| e.shape == shape)
        .copied()
        .unwrap_or(Evaluation::new(shape, 0.0))
}

impl<F> ShapeClassifier for F
where
    F: Fn(&Glyph, u32) -> Vec<Evaluation> + Send + Sync,
{
    fn natural_evaluations(&self, glyph: &Glyph, interline: u32) -> Vec<Evaluation> {
        self(glyph, interline)
    }
}
