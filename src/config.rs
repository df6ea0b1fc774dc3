//! Extraction configuration and scale-derived parameters.
//!
//! Lengths are given as fractions of the staff interline, weights as
//! fractions of the interline squared. They are turned into pixel values
//! once per staff through [`Parameters::new`].

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Tunable constants for key alter extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum number of parts considered for an alter symbol (default: 8)
    pub max_part_count: usize,
    /// Minimum weight for an alter part, area fraction (default: 0.01)
    pub min_part_weight: f64,
    /// Maximum distance between two parts of a single alter symbol (default: 1.5)
    pub max_part_gap: f64,
    /// Minimum glyph width (default: 0.5)
    pub min_glyph_width: f64,
    /// Maximum glyph width (default: 2.0)
    pub max_glyph_width: f64,
    /// Minimum glyph height (default: 1.0)
    pub min_glyph_height: f64,
    /// Maximum glyph height (default: 3.5)
    pub max_glyph_height: f64,
    /// Minimum glyph weight, area fraction (default: 0.2).
    /// Also the ink threshold of a slice.
    pub min_glyph_weight: f64,
    /// Maximum glyph weight, area fraction (default: 2.9)
    pub max_glyph_weight: f64,
    /// Discount applied to raw classifier grades (default: 0.8)
    pub intrinsic_ratio: f64,
    /// Minimum adjusted grade for whole-area candidates (default: 0.3)
    pub candidate_min_grade: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_part_count: 8,
            min_part_weight: 0.01,
            max_part_gap: 1.5,
            min_glyph_width: 0.5,
            max_glyph_width: 2.0,
            min_glyph_height: 1.0,
            max_glyph_height: 3.5,
            min_glyph_weight: 0.2,
            max_glyph_weight: 2.9,
            intrinsic_ratio: 0.8,
            candidate_min_grade: 0.3,
        }
    }
}

impl ExtractorConfig {
    /// Parse a configuration from JSON. Missing fields keep their default.
    pub fn from_json(json: &str) -> ExtractResult<Self> {
        let config: ExtractorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> ExtractResult<()> {
        if self.max_part_count == 0 {
            return Err(ExtractError::Config("max_part_count must be > 0".to_string()));
        }
        let fractions = [
            ("min_part_weight", self.min_part_weight),
            ("max_part_gap", self.max_part_gap),
            ("min_glyph_width", self.min_glyph_width),
            ("max_glyph_width", self.max_glyph_width),
            ("min_glyph_height", self.min_glyph_height),
            ("max_glyph_height", self.max_glyph_height),
            ("min_glyph_weight", self.min_glyph_weight),
            ("max_glyph_weight", self.max_glyph_weight),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(ExtractError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.min_glyph_width > self.max_glyph_width {
            return Err(ExtractError::Config(format!(
                "min_glyph_width {} exceeds max_glyph_width {}",
                self.min_glyph_width, self.max_glyph_width
            )));
        }
        if self.min_glyph_height > self.max_glyph_height {
            return Err(ExtractError::Config(format!(
                "min_glyph_height {} exceeds max_glyph_height {}",
                self.min_glyph_height, self.max_glyph_height
            )));
        }
        if self.min_glyph_weight > self.max_glyph_weight {
            return Err(ExtractError::Config(format!(
                "min_glyph_weight {} exceeds max_glyph_weight {}",
                self.min_glyph_weight, self.max_glyph_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.intrinsic_ratio) {
            return Err(ExtractError::Config(format!(
                "intrinsic_ratio must be in [0, 1], got {}",
                self.intrinsic_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.candidate_min_grade) {
            return Err(ExtractError::Config(format!(
                "candidate_min_grade must be in [0, 1], got {}",
                self.candidate_min_grade
            )));
        }
        Ok(())
    }
}

/// Sheet scale, driven by the staff interline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    /// Distance between two staff lines, in pixels
    pub interline: u32,
}

impl Scale {
    pub fn new(interline: u32) -> ExtractResult<Self> {
        if interline == 0 {
            return Err(ExtractError::InvalidScale(interline));
        }
        Ok(Self { interline })
    }

    /// Length fraction to (rounded) pixels.
    pub fn to_pixels(&self, fraction: f64) -> i32 {
        self.to_pixels_f64(fraction).round() as i32
    }

    /// Length fraction to pixels.
    pub fn to_pixels_f64(&self, fraction: f64) -> f64 {
        fraction * self.interline as f64
    }

    /// Area fraction to (rounded) pixel count.
    pub fn to_area_pixels(&self, fraction: f64) -> u32 {
        let il = self.interline as f64;
        (fraction * il * il).round() as u32
    }
}

/// Scale-dependent parameters, read-only for one extraction pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub max_part_count: usize,
    pub min_part_weight: u32,
    pub max_part_gap: f64,
    pub min_glyph_width: f64,
    pub max_glyph_width: f64,
    pub min_glyph_height: f64,
    pub max_glyph_height: f64,
    pub min_glyph_weight: u32,
    pub max_glyph_weight: u32,
}

impl Parameters {
    pub fn new(scale: &Scale, config: &ExtractorConfig) -> Self {
        Self {
            max_part_count: config.max_part_count,
            min_part_weight: scale.to_area_pixels(config.min_part_weight),
            max_part_gap: scale.to_pixels_f64(config.max_part_gap),
            min_glyph_width: scale.to_pixels_f64(config.min_glyph_width),
            max_glyph_width: scale.to_pixels_f64(config.max_glyph_width),
            min_glyph_height: scale.to_pixels_f64(config.min_glyph_height),
            max_glyph_height: scale.to_pixels_f64(config.max_glyph_height),
            min_glyph_weight: scale.to_area_pixels(config.min_glyph_weight),
            max_glyph_weight: scale.to_area_pixels(config.max_glyph_weight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn parameters_scale_with_interline() {
        let scale = Scale::new(20).unwrap();
        let params = Parameters::new(&scale, &ExtractorConfig::default());
        assert_eq!(params.max_part_count, 8);
        assert_eq!(params.min_part_weight, 4); // 0.01 * 400
        assert_eq!(params.max_part_gap, 30.0);
        assert_eq!(params.min_glyph_width, 10.0);
        assert_eq!(params.max_glyph_height, 70.0);
        assert_eq!(params.min_glyph_weight, 80);
        assert_eq!(params.max_glyph_weight, 1160);
    }

    #[test]
    fn zero_interline_is_rejected() {
        assert_eq!(Scale::new(0), Err(ExtractError::InvalidScale(0)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = ExtractorConfig {
            min_glyph_width: 3.0,
            max_glyph_width: 2.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExtractError::Config(_))));
    }

    #[test]
    fn json_keeps_defaults_for_missing_fields() {
        let config = ExtractorConfig::from_json(r#"{ "max_part_count": 5 }"#).unwrap();
        assert_eq!(config.max_part_count, 5);
        assert_eq!(config.intrinsic_ratio, 0.8);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ExtractorConfig::from_json("{ not json"),
            Err(ExtractError::Json(_))
        ));
    }
}
