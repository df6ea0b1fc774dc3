//! Evaluation of compound glyphs proposed by the cluster decomposer.
//!
//! Both extraction modes share the same filtering path and only differ in
//! what they keep:
//! - [`KeepMode::SingleSlot`] keeps the best glyph for one slice,
//! - [`KeepMode::WholeArea`] keeps every acceptable glyph as a candidate,
//!   checking peaks against the slice under the glyph centroid.

use crate::candidates::Candidate;
use crate::classifier::{evaluation_of, ShapeClassifier};
use crate::cluster::ClusterAdapter;
use crate::config::Parameters;
use crate::fragments::FragmentId;
use crate::glyph::Glyph;
use crate::model::{Evaluation, KeyPeak, Rect, Shape};
use crate::roi::{KeyRoi, KeySlice};

/// What to keep from acceptable evaluations.
#[derive(Debug, Clone)]
pub enum KeepMode {
    SingleSlot {
        /// Index of the slice in the roi
        slice: usize,
        /// Running best, replaced only by a strictly higher grade
        best: Option<(Evaluation, Glyph)>,
    },
    WholeArea {
        candidates: Vec<Candidate>,
    },
}

/// Everything one decomposition produced.
#[derive(Debug)]
pub struct AdapterOutcome {
    /// Number of glyphs submitted to the classifier
    pub trials: usize,
    /// Glyphs submitted to the classifier, in submission order
    pub tried: Vec<Glyph>,
    pub kept: KeepMode,
}

/// Shared read-only context of an evaluation.
pub struct EvalContext<'a> {
    pub params: &'a Parameters,
    pub peaks: &'a [KeyPeak],
    pub roi: &'a KeyRoi,
    pub classifier: &'a dyn ShapeClassifier,
    pub interline: u32,
    pub intrinsic_ratio: f64,
}

/// Cluster adapter for key alters.
pub struct KeyAdapter<'a> {
    ctx: &'a EvalContext<'a>,
    target_shapes: Vec<Shape>,
    min_grade: f64,
    trials: usize,
    tried: Vec<Glyph>,
    mode: KeepMode,
}

impl<'a> KeyAdapter<'a> {
    pub fn new(ctx: &'a EvalContext<'a>, target_shapes: &[Shape], min_grade: f64, mode: KeepMode) -> Self {
        let mut target_shapes = target_shapes.to_vec();
        target_shapes.sort();
        target_shapes.dedup();
        Self {
            ctx,
            target_shapes,
            min_grade,
            trials: 0,
            tried: Vec::new(),
            mode,
        }
    }

    pub fn finish(self) -> AdapterOutcome {
        AdapterOutcome {
            trials: self.trials,
            tried: self.tried,
            kept: self.mode,
        }
    }

    /// Make sure the glyph width embraces every peak of the slice.
    fn embraces_slice_peaks(&self, slice: &KeySlice, glyph: &Glyph) -> bool {
        let (start, stop) = slice.span();
        let (slice_start, slice_stop) = (start as f64, stop as f64);

        self.ctx
            .peaks
            .iter()
            .filter(|peak| slice_start <= peak.center && peak.center <= slice_stop)
            .all(|peak| glyph.bounds.x_embraces(peak.center))
    }

    fn evaluate_slice_glyph(&mut self, slice: Option<usize>, glyph: Glyph, parts: &[FragmentId]) {
        if self.is_too_small(&glyph.bounds) {
            return;
        }

        if let Some(slice) = slice.and_then(|i| self.ctx.roi.get(i)) {
            if !self.embraces_slice_peaks(slice, &glyph) {
                return;
            }
        }

        self.trials += 1;
        self.tried.push(glyph.clone());

        let evals = self.ctx.classifier.natural_evaluations(&glyph, self.ctx.interline);

        for i in 0..self.target_shapes.len() {
            let eval = evaluation_of(&evals, self.target_shapes[i]);
            let grade = self.ctx.intrinsic_ratio * eval.grade;

            if grade >= self.min_grade {
                log::debug!(
                    "glyph at {:?} width:{} {:?}({:.3})",
                    glyph.bounds,
                    glyph.width(),
                    eval.shape,
                    eval.grade
                );
                self.keep_candidate(&glyph, parts, eval);
            }
        }
    }

    fn keep_candidate(&mut self, glyph: &Glyph, parts: &[FragmentId], eval: Evaluation) {
        match &mut self.mode {
            KeepMode::SingleSlot { best, .. } => {
                let better = best.as_ref().map_or(true, |(e, _)| e.grade < eval.grade);
                if better {
                    *best = Some((eval, glyph.clone()));
                }
            }
            KeepMode::WholeArea { candidates } => {
                candidates.push(Candidate::new(glyph.clone(), parts.to_vec(), eval));
            }
        }
    }
}

impl ClusterAdapter for KeyAdapter<'_> {
    fn is_too_small(&self, bounds: &Rect) -> bool {
        (bounds.width as f64) < self.ctx.params.min_glyph_width
            || (bounds.height as f64) < self.ctx.params.min_glyph_height
    }

    fn is_too_large(&self, bounds: &Rect) -> bool {
        (bounds.width as f64) > self.ctx.params.max_glyph_width
            || (bounds.height as f64) > self.ctx.params.max_glyph_height
    }

    fn is_too_light(&self, weight: u32) -> bool {
        weight < self.ctx.params.min_glyph_weight
    }

    fn is_too_heavy(&self, weight: u32) -> bool {
        weight > self.ctx.params.max_glyph_weight
    }

    fn evaluate_glyph(&mut self, glyph: Glyph, parts: &[FragmentId]) {
        let slice = match &self.mode {
            KeepMode::SingleSlot { slice, .. } => Some(*slice),
            KeepMode::WholeArea { .. } => self.ctx.roi.slice_of(glyph.centroid.x),
        };
        self.evaluate_slice_glyph(slice, glyph, parts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::GlyphCluster;
    use crate::config::{ExtractorConfig, Scale};
    use crate::fragments::build_fragments;
    use crate::graph::build_links;
    use crate::model::Point;
    use crate::pixels::{PixelSource, FOREGROUND};

    fn bar(x0: i32, x1: i32, y0: i32, y1: i32) -> Glyph {
        let mut pixels = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                pixels.push(Point::new(x, y));
            }
        }
        Glyph::from_pixels(pixels).unwrap()
    }

    fn params() -> Parameters {
        let mut params = Parameters::new(&Scale::new(10).unwrap(), &ExtractorConfig::default());
        params.min_glyph_width = 2.0;
        params.min_glyph_height = 2.0;
        params
    }

    fn sharp(grade: f64) -> impl Fn(&Glyph, u32) -> Vec<Evaluation> + Send + Sync {
        move |_: &Glyph, _: u32| vec![Evaluation::new(Shape::Sharp, grade)]
    }

    #[test]
    fn peaks_inside_slice_must_be_embraced() {
        // Peaks at 10, 30, 50; slice covers [0, 39]
        let params = params();
        let peaks = [KeyPeak::new(10.0), KeyPeak::new(30.0), KeyPeak::new(50.0)];
        let roi = KeyRoi::with_slices(0, 20, &[(0, 39), (40, 59)]);
        let classifier = sharp(1.0);
        let ctx = EvalContext {
            params: &params,
            peaks: &peaks,
            roi: &roi,
            classifier: &classifier,
            interline: 10,
            intrinsic_ratio: 0.8,
        };
        let adapter = KeyAdapter::new(&ctx, &[Shape::Sharp], 0.5, KeepMode::WholeArea { candidates: Vec::new() });
        let slice = roi.get(0).unwrap();
        assert_eq!(slice.span(), (0, 39));

        // x in [5, 40] embraces 10 and 30, not 50
        assert!(adapter.embraces_slice_peaks(slice, &bar(5, 40, 0, 3)));
        // x in [15, 40] misses 10
        assert!(!adapter.embraces_slice_peaks(slice, &bar(15, 40, 0, 3)));
    }

    #[test]
    fn single_slot_keeps_strictly_better_only() {
        let params = params();
        let roi = KeyRoi::with_slices(0, 20, &[(0, 19)]);
        let classifier = |g: &Glyph, _: u32| {
            let grade = if g.bounds.x == 0 { 0.9 } else { 0.7 };
            vec![Evaluation::new(Shape::Flat, grade)]
        };
        let ctx = EvalContext {
            params: &params,
            peaks: &[],
            roi: &roi,
            classifier: &classifier,
            interline: 10,
            intrinsic_ratio: 1.0,
        };
        let mut adapter = KeyAdapter::new(
            &ctx,
            &[Shape::Flat],
            0.5,
            KeepMode::SingleSlot { slice: 0, best: None },
        );
        adapter.evaluate_glyph(bar(0, 3, 0, 3), &[FragmentId(0)]);
        adapter.evaluate_glyph(bar(5, 8, 0, 3), &[FragmentId(1)]);

        let outcome = adapter.finish();
        assert_eq!(outcome.trials, 2);
        match outcome.kept {
            KeepMode::SingleSlot { best: Some((eval, glyph)), .. } => {
                assert_eq!(eval.grade, 0.9);
                assert_eq!(glyph.bounds.x, 0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn too_small_glyphs_are_not_classified() {
        let params = params();
        let roi = KeyRoi::with_slices(0, 20, &[(0, 19)]);
        let classifier = sharp(1.0);
        let ctx = EvalContext {
            params: &params,
            peaks: &[],
            roi: &roi,
            classifier: &classifier,
            interline: 10,
            intrinsic_ratio: 0.8,
        };
        let mut adapter = KeyAdapter::new(&ctx, &[Shape::Sharp], 0.5, KeepMode::WholeArea { candidates: Vec::new() });
        adapter.evaluate_glyph(bar(0, 0, 0, 5), &[FragmentId(0)]);
        let outcome = adapter.finish();
        assert_eq!(outcome.trials, 0);
        assert!(outcome.tried.is_empty());
    }

    #[test]
    fn grade_is_discounted_before_threshold() {
        let params = params();
        let roi = KeyRoi::with_slices(0, 20, &[(0, 19)]);
        // 0.8 * 0.6 = 0.48 < 0.5
        let classifier = sharp(0.6);
        let ctx = EvalContext {
            params: &params,
            peaks: &[],
            roi: &roi,
            classifier: &classifier,
            interline: 10,
            intrinsic_ratio: 0.8,
        };
        let mut adapter = KeyAdapter::new(&ctx, &[Shape::Sharp], 0.5, KeepMode::WholeArea { candidates: Vec::new() });
        adapter.evaluate_glyph(bar(0, 3, 0, 3), &[FragmentId(0)]);
        let outcome = adapter.finish();
        assert_eq!(outcome.trials, 1);
        match outcome.kept {
            KeepMode::WholeArea { candidates } => assert!(candidates.is_empty()),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn oversized_compounds_are_never_classified() {
        // interline 10: max width 20, max weight 290
        let params = Parameters::new(&Scale::new(10).unwrap(), &ExtractorConfig::default());
        let mut source = PixelSource::blank(60, 40).unwrap();
        // Two 8 x 15 bars 5 apart (union 21 wide), one 15 x 25 block (375 px)
        for (x0, x1, y0, y1) in [(0, 7, 5, 19), (13, 20, 5, 19), (35, 49, 5, 29)] {
            for x in x0..=x1 {
                for y in y0..=y1 {
                    source.set(x, y, FOREGROUND);
                }
            }
        }
        let arena = build_fragments(&source, Point::new(0, 0));
        let graph = build_links(&arena, &arena.ids(), params.max_part_gap);
        assert_eq!(graph.edge_count(), 2);

        let roi = KeyRoi::with_slices(0, 40, &[(0, 59)]);
        let classifier = sharp(1.0);
        let ctx = EvalContext {
            params: &params,
            peaks: &[],
            roi: &roi,
            classifier: &classifier,
            interline: 10,
            intrinsic_ratio: 0.8,
        };
        let mut adapter = KeyAdapter::new(&ctx, &[Shape::Sharp], 0.5, KeepMode::WholeArea { candidates: Vec::new() });
        let offered = GlyphCluster::new(&graph, &arena, &mut adapter).decompose();
        let outcome = adapter.finish();

        assert_eq!(offered, 2);
        let tried: Vec<Rect> = outcome.tried.iter().map(|g| g.bounds).collect();
        assert_eq!(tried, vec![Rect::new(0, 5, 8, 15), Rect::new(13, 5, 8, 15)]);
    }
}
