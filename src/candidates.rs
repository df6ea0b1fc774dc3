//! Whole-area candidates and their mutual exclusion.

use std::cmp::Ordering;
use std::fmt;

use crate::fragments::FragmentId;
use crate::glyph::Glyph;
use crate::model::Evaluation;

/// A compound glyph, the parts it is made of, and its evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub glyph: Glyph,
    /// Sorted, non-empty
    pub parts: Vec<FragmentId>,
    pub eval: Evaluation,
}

impl Candidate {
    pub fn new(glyph: Glyph, parts: Vec<FragmentId>, eval: Evaluation) -> Self {
        Self { glyph, parts, eval }
    }

    /// Whether both candidates use at least one common part.
    pub fn shares_part_with(&self, other: &Candidate) -> bool {
        self.parts.iter().any(|p| other.parts.binary_search(p).is_ok())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Candidate{{parts:{:?} {:?}({:.3})}}",
            self.parts.iter().map(|p| p.0).collect::<Vec<_>>(),
            self.eval.shape,
            self.eval.grade
        )
    }
}

/// Ordering by decreasing grade.
pub fn by_reverse_grade(a: &Candidate, b: &Candidate) -> Ordering {
    b.eval.grade.partial_cmp(&a.eval.grade).unwrap_or(Ordering::Equal)
}

/// Ordering by left abscissa.
pub fn by_abscissa(a: &Candidate, b: &Candidate) -> Ordering {
    a.glyph.bounds.x.cmp(&b.glyph.bounds.x)
}

/// Make sure that no part is shared by different candidates.
///
/// Candidates are sorted by decreasing grade (ties keep their encounter
/// order), then each surviving candidate evicts every later candidate
/// sharing a part with it.
pub fn purge_candidates(candidates: &mut Vec<Candidate>) {
    candidates.sort_by(by_reverse_grade);

    let mut i = 0;
    while i < candidates.len() {
        let current = candidates[i].clone();
        let mut j = i + 1;
        while j < candidates.len() {
            if candidates[j].shares_part_with(&current) {
                log::debug!("{} evicted by {}", candidates[j], current);
                candidates.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}
