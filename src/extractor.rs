//! Key alter extractor.
//!
//! Companion of the key builder, focused on extracting key alter glyphs
//! from the staff-free pixel source and recognizing them. Two strategies:
//! - slice by slice ([`KeyExtractor::extract_alter`]), keeping the best
//!   glyph found within one slice;
//! - whole area ([`KeyExtractor::retrieve_components`]), where connected
//!   sets of parts are decomposed independently, candidates sharing a part
//!   are mutually excluded, and the survivors are dispatched to slices.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::adapter::{AdapterOutcome, EvalContext, KeepMode, KeyAdapter};
use crate::candidates::{purge_candidates, Candidate};
use crate::classifier::ShapeClassifier;
use crate::cluster::GlyphCluster;
use crate::config::{ExtractorConfig, Parameters, Scale};
use crate::error::{ExtractError, ExtractResult};
use crate::fragments::{build_fragments, purge_parts};
use crate::glyph::{Glyph, GlyphIndex};
use crate::graph::{build_links, connected_sets, sub_graph};
use crate::model::{Evaluation, KeyPeak, KeyRange, Point, Rect, Shape, Staff};
use crate::pixels::PixelSource;
use crate::report::KeyReport;
use crate::roi::{KeyAlter, KeyRoi};
use crate::samples::SampleRecorder;

/// Glyphs submitted to the classifier during the pass, without duplicates.
#[derive(Debug, Default)]
struct TrialSet {
    glyphs: Vec<Glyph>,
    keys: HashSet<Vec<Point>>,
}

impl TrialSet {
    fn insert(&mut self, glyph: Glyph) {
        if self.keys.insert(glyph.pixels().to_vec()) {
            self.glyphs.push(glyph);
        }
    }

    fn remove(&mut self, glyph: &Glyph) {
        if self.keys.remove(glyph.pixels()) {
            self.glyphs.retain(|g| !g.same_pixels(glyph));
        }
    }
}

/// Extraction engine for the key signature of one staff.
pub struct KeyExtractor<'a> {
    staff: Staff,
    range: KeyRange,
    peaks: Vec<KeyPeak>,
    roi: KeyRoi,
    config: ExtractorConfig,
    params: Parameters,
    /// Staff-free pixel source
    source: &'a PixelSource,
    classifier: &'a dyn ShapeClassifier,
    glyph_index: GlyphIndex,
    /// All glyphs submitted to classifier
    glyph_candidates: TrialSet,
}

impl<'a> KeyExtractor<'a> {
    /// Create an extractor.
    ///
    /// * `staff` - the underlying staff
    /// * `range` - abscissa range of the key area
    /// * `peaks` - detected peaks
    /// * `roi` - key area with its slices
    pub fn new(
        staff: Staff,
        range: KeyRange,
        peaks: Vec<KeyPeak>,
        roi: KeyRoi,
        source: &'a PixelSource,
        classifier: &'a dyn ShapeClassifier,
        config: ExtractorConfig,
    ) -> ExtractResult<Self> {
        config.validate()?;
        let scale = Scale::new(staff.interline)?;
        roi.validate()?;
        if range.width() <= 0 {
            return Err(ExtractError::InvalidRegion(format!(
                "key range [{}, {}] is empty",
                range.start, range.stop
            )));
        }
        let params = Parameters::new(&scale, &config);

        Ok(Self {
            staff,
            range,
            peaks,
            roi,
            config,
            params,
            source,
            classifier,
            glyph_index: GlyphIndex::new(),
            glyph_candidates: TrialSet::default(),
        })
    }

    pub fn roi(&self) -> &KeyRoi {
        &self.roi
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn staff(&self) -> &Staff {
        &self.staff
    }

    pub fn glyph_index(&self) -> &GlyphIndex {
        &self.glyph_index
    }

    /// Number of distinct glyphs submitted to the classifier so far.
    pub fn trial_count(&self) -> usize {
        self.glyph_candidates.glyphs.len()
    }

    pub fn report(&self) -> KeyReport {
        KeyReport::from_roi(self.staff.id, &self.roi)
    }

    /// In the given slice, extract the relevant foreground pixels and
    /// evaluate possible glyph instances.
    ///
    /// The slice best evaluation survives between calls, so a new glyph is
    /// retained only if strictly better. Returns the slice alter when its
    /// grade reaches `min_grade`.
    pub fn extract_alter(
        &mut self,
        slice_index: usize,
        target_shapes: &[Shape],
        min_grade: f64,
        crop_neighbors: bool,
    ) -> Option<KeyAlter> {
        let (slice_rect, seed) = match self.roi.get(slice_index) {
            Some(slice) => (slice.rect, slice.eval.zip(slice.glyph.clone())),
            None => {
                log::warn!("Staff#{} no slice at index {}", self.staff.id, slice_index);
                return None;
            }
        };

        let slice_buf = match self.roi.slice_pixels(self.source, slice_index, crop_neighbors) {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("Staff#{} slice pixels: {}", self.staff.id, e);
                return None;
            }
        };
        let arena = build_fragments(&slice_buf, Point::new(slice_rect.x, slice_rect.y));
        let parts = purge_parts(&arena, arena.ids(), slice_rect.right(), &self.params);
        let graph = build_links(&arena, &parts, self.params.max_part_gap);

        let outcome = {
            let ctx = self.eval_context();
            let mut adapter = KeyAdapter::new(
                &ctx,
                target_shapes,
                min_grade,
                KeepMode::SingleSlot {
                    slice: slice_index,
                    best: seed,
                },
            );
            GlyphCluster::new(&graph, &arena, &mut adapter).decompose();
            adapter.finish()
        };
        let best = match self.absorb(outcome) {
            KeepMode::SingleSlot { best, .. } => best,
            KeepMode::WholeArea { .. } => None,
        };

        let slice = self.roi.get_mut(slice_index)?;
        if let Some((eval, glyph)) = best {
            slice.eval = Some(eval);
            slice.glyph = Some(glyph);
        }

        let (eval, glyph) = match (slice.eval, slice.glyph.clone()) {
            (Some(eval), Some(glyph)) => (eval, glyph),
            _ => return None,
        };
        let grade = self.config.intrinsic_ratio * eval.grade;
        if grade < min_grade {
            return None;
        }

        let stale = slice
            .alter
            .as_ref()
            .map_or(true, |alter| !alter.glyph.same_pixels(&glyph));
        if stale {
            let alter = create_alter(&mut self.glyph_index, &self.staff, glyph, eval, grade);
            log::debug!(
                "Glyph#{:?} {:?}({:.3})",
                alter.glyph.id.map(|id| id.0),
                eval.shape,
                eval.grade
            );
            slice.glyph = Some(alter.glyph.clone());
            slice.alter = Some(alter);
            log::debug!("{}", slice);
        }

        slice.alter.clone()
    }

    /// Retrieve all possible candidates (as connected components) with
    /// acceptable shape, no part being shared by two candidates.
    ///
    /// Candidates come sorted by decreasing grade.
    pub fn retrieve_candidates(&mut self, shapes: &[Shape]) -> Vec<Candidate> {
        log::debug!("Candidates for staff#{}", self.staff.id);

        // Key-signature area pixels
        let key_buf = match self.roi.area_pixels(self.source, &self.range) {
            Ok(buf) => buf,
            Err(e) => {
                log::warn!("Staff#{} area pixels: {}", self.staff.id, e);
                return Vec::new();
            }
        };
        let arena = build_fragments(&key_buf, Point::new(self.range.start, self.roi.y));
        let parts = purge_parts(&arena, arena.ids(), self.range.stop, &self.params);

        // Formalize parts relationships in a global graph
        let global_graph = build_links(&arena, &parts, self.params.max_part_gap);
        let sets = connected_sets(&global_graph);
        log::debug!("Staff#{} sets:{}", self.staff.id, sets.len());

        let min_grade = self.config.candidate_min_grade;
        let outcomes: Vec<(usize, AdapterOutcome)> = {
            let ctx = self.eval_context();
            sets.par_iter()
                .map(|set| {
                    // Use only the subgraph for this set
                    let sub = sub_graph(&global_graph, set);
                    let mut adapter = KeyAdapter::new(
                        &ctx,
                        shapes,
                        min_grade,
                        KeepMode::WholeArea {
                            candidates: Vec::new(),
                        },
                    );
                    GlyphCluster::new(&sub, &arena, &mut adapter).decompose();
                    (set.len(), adapter.finish())
                })
                .collect()
        };

        let mut all_candidates = Vec::new();
        for (size, outcome) in outcomes {
            log::debug!(
                "Staff#{} set:{} trials:{}",
                self.staff.id,
                size,
                outcome.trials
            );
            if let KeepMode::WholeArea { candidates } = self.absorb(outcome) {
                all_candidates.extend(candidates);
            }
        }

        purge_candidates(&mut all_candidates);
        all_candidates
    }

    /// Look into the key area for key alters, based on connected
    /// components, and assign the best candidate of each slice.
    ///
    /// Returns the number of slices holding an alter.
    pub fn retrieve_components(&mut self, key_shape: Shape) -> usize {
        log::debug!("Key for staff#{}", self.staff.id);

        let all_candidates = self.retrieve_candidates(&[key_shape]);

        for candidate in &all_candidates {
            let index = match self.roi.slice_of(candidate.glyph.centroid.x) {
                Some(i) => i,
                None => continue,
            };
            if let Some(slice) = self.roi.get_mut(index) {
                if slice.eval.map_or(true, |e| e.grade < candidate.eval.grade) {
                    slice.eval = Some(candidate.eval);
                    slice.glyph = Some(candidate.glyph.clone());
                }
            }
        }

        let mut count = 0;
        for slice in self.roi.iter_mut() {
            if let (Some(eval), Some(glyph)) = (slice.eval, slice.glyph.clone()) {
                let grade = self.config.intrinsic_ratio * eval.grade;
                let alter = create_alter(&mut self.glyph_index, &self.staff, glyph, eval, grade);
                slice.glyph = Some(alter.glyph.clone());
                slice.alter = Some(alter);
                count += 1;
            }
            log::debug!("{}", slice);
        }
        count
    }

    /// Report whether the provided rectangle contains enough ink for an
    /// alter.
    pub fn slice_has_ink(&self, rect: &Rect) -> bool {
        self.source.ink(rect) >= self.params.min_glyph_weight
    }

    /// Record glyphs used in key building as training samples.
    ///
    /// * `record_positives` - record accepted alters under `key_shape`
    /// * `record_negatives` - record every other classified glyph as clutter
    pub fn record_samples(
        &mut self,
        record_positives: bool,
        record_negatives: bool,
        key_shape: Shape,
        recorder: &mut dyn SampleRecorder,
    ) {
        let interline = self.staff.interline;

        // Positive samples (assigned to key_shape)
        for slice in self.roi.iter() {
            if let Some(alter) = slice.alter() {
                if record_positives {
                    let pitch = self.staff.pitch_position_of(alter.glyph.centroid);
                    recorder.add_sample(key_shape, &alter.glyph, interline, pitch);
                }
                self.glyph_candidates.remove(&alter.glyph);
            }
        }

        // Negative samples (assigned to clutter)
        if record_negatives {
            for glyph in &self.glyph_candidates.glyphs {
                let pitch = self.staff.pitch_position_of(glyph.centroid);
                recorder.add_sample(Shape::Clutter, glyph, interline, pitch);
            }
        }
    }

    fn eval_context(&self) -> EvalContext<'_> {
        EvalContext {
            params: &self.params,
            peaks: &self.peaks,
            roi: &self.roi,
            classifier: self.classifier,
            interline: self.staff.interline,
            intrinsic_ratio: self.config.intrinsic_ratio,
        }
    }

    /// Merge the tried glyphs of a decomposition into the pass trial set.
    fn absorb(&mut self, outcome: AdapterOutcome) -> KeepMode {
        for glyph in outcome.tried {
            self.glyph_candidates.insert(glyph);
        }
        outcome.kept
    }
}

/// Promote a glyph and wrap it into an alter.
fn create_alter(
    index: &mut GlyphIndex,
    staff: &Staff,
    glyph: Glyph,
    eval: Evaluation,
    grade: f64,
) -> KeyAlter {
    let glyph = index.register(glyph);
    let pitch = staff.pitch_position_of(glyph.centroid);
    KeyAlter {
        glyph,
        shape: eval.shape,
        grade,
        pitch,
    }
}
