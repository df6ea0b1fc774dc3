//! Extraction report: a serializable summary of the key slices, meant to
//! be handed across process or language boundaries as JSON.

use serde::Serialize;

use crate::model::{Rect, Shape};
use crate::roi::KeyRoi;

/// Summary of one staff key extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyReport {
    pub staff_id: usize,
    pub slices: Vec<SliceReport>,
}

/// Summary of one slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceReport {
    /// 1-based slice index
    pub id: usize,
    pub rect: Rect,
    /// Accepted alter, if any
    pub alter: Option<AlterReport>,
}

/// Summary of an accepted alter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlterReport {
    pub shape: Shape,
    pub grade: f64,
    pub glyph_id: Option<u32>,
    pub bounds: Rect,
    pub pitch: f64,
}

impl KeyReport {
    pub fn from_roi(staff_id: usize, roi: &KeyRoi) -> Self {
        let slices = roi
            .iter()
            .map(|slice| SliceReport {
                id: slice.id,
                rect: slice.rect,
                alter: slice.alter.as_ref().map(|alter| AlterReport {
                    shape: alter.shape,
                    grade: alter.grade,
                    glyph_id: alter.glyph.id.map(|id| id.0),
                    bounds: alter.glyph.bounds,
                    pitch: alter.pitch,
                }),
            })
            .collect();

        Self { staff_id, slices }
    }

    /// Shapes of the accepted alters, left to right.
    pub fn shapes(&self) -> Vec<Shape> {
        self.slices
            .iter()
            .filter_map(|s| s.alter.as_ref().map(|a| a.shape))
            .collect()
    }
}

/// Serialize a KeyReport to JSON.
pub fn report_to_json(report: &KeyReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
}
