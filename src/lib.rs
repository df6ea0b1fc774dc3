//! keysiglib: key signature alter extraction for staff images.
//!
//! Given the staff-free pixels of a key signature area, cut into one slice
//! per expected alter, the library builds the candidate fragments, links
//! the close ones, decomposes them into compound glyphs, submits those to a
//! shape classifier and keeps the best alter per slice.
//!
//! # Example
//! ```no_run
//! use keysiglib::*;
//!
//! let source = PixelSource::blank(200, 120).unwrap();
//! let staff = Staff::new(1, 20, 60.0);
//! let roi = KeyRoi::with_slices(20, 80, &[(10, 39), (40, 69)]);
//! let classifier = |_: &Glyph, _: u32| vec![Evaluation::new(Shape::Sharp, 0.9)];
//!
//! let mut extractor = KeyExtractor::new(
//!     staff,
//!     KeyRange::new(10, 69),
//!     vec![KeyPeak::new(25.0), KeyPeak::new(55.0)],
//!     roi,
//!     &source,
//!     &classifier,
//!     ExtractorConfig::default(),
//! )
//! .unwrap();
//!
//! let count = extractor.retrieve_components(Shape::Sharp);
//! println!("Alters: {}", count);
//! println!("{}", report_to_json(&extractor.report()));
//! ```

pub mod adapter;
pub mod candidates;
pub mod classifier;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fragments;
pub mod glyph;
pub mod graph;
pub mod model;
pub mod pixels;
pub mod report;
pub mod roi;
pub mod samples;

pub use candidates::{by_abscissa, by_reverse_grade, purge_candidates, Candidate};
pub use classifier::ShapeClassifier;
pub use config::{ExtractorConfig, Parameters, Scale};
pub use error::{ExtractError, ExtractResult};
pub use extractor::KeyExtractor;
pub use fragments::{build_fragments, purge_parts, FragmentArena, FragmentId};
pub use glyph::{Glyph, GlyphId, GlyphIndex};
pub use model::*;
pub use pixels::PixelSource;
pub use report::{report_to_json, KeyReport};
pub use roi::{KeyAlter, KeyRoi, KeySlice};
pub use samples::{SampleRecorder, SampleRepository};

/// Convert an extraction configuration to a JSON string.
pub fn config_to_json(config: &ExtractorConfig) -> Result<String, String> {
    serde_json::to_string_pretty(config).map_err(|e| format!("JSON serialization error: {e}"))
}
