// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunable parameters for the analysis pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Side length of the square canvas each view is rendered onto
    pub canvas_size: u32,
    /// Center crop side as a fraction of the shorter image dimension
    pub center_crop_ratio: f64,
    /// Threshold for labels missing from the threshold tables
    pub default_threshold: f64,
    /// `person` detections below this adjusted confidence are dropped
    pub person_min_confidence: f64,
    /// Base threshold for room-implausible labels (before the room boost)
    pub implausible_base_threshold: f64,
    /// Percentage points added to expected items
    pub expectation_boost: u32,
    /// Upper bound for boosted confidences
    pub expectation_cap: u32,
    /// Unlikely items below this max confidence are removed
    pub unlikely_removal_confidence: u32,
    /// Synthetic confidence range for architectural priors `[min, max)`
    pub architectural_confidence_range: (u32, u32),
    /// Render and classify views on the rayon pool
    pub parallel_views: bool,
    /// Fixed seed for the architectural estimator (entropy when `None`)
    pub seed: Option<u64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 1024,
            center_crop_ratio: 0.75,
            default_threshold: 0.25,
            person_min_confidence: 0.5,
            implausible_base_threshold: 0.4,
            expectation_boost: 10,
            expectation_cap: 95,
            unlikely_removal_confidence: 70,
            architectural_confidence_range: (60, 85),
            parallel_views: false,
            seed: None,
        }
    }
}

impl DetectorConfig {
    /// Parse and validate a configuration from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DetectorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 {
            return Err(Error::InvalidConfig("canvas_size must be positive".into()));
        }
        if !(self.center_crop_ratio > 0.0 && self.center_crop_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "center_crop_ratio must be in (0, 1], got {}",
                self.center_crop_ratio
            )));
        }
        let (lo, hi) = self.architectural_confidence_range;
        if lo >= hi || hi > 100 {
            return Err(Error::InvalidConfig(format!(
                "architectural_confidence_range must satisfy min < max <= 100, got ({}, {})",
                lo, hi
            )));
        }
        if self.expectation_cap > 100 {
            return Err(Error::InvalidConfig(format!(
                "expectation_cap must be <= 100, got {}",
                self.expectation_cap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = DetectorConfig::from_json(r#"{"seed": 7, "parallel_views": true}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(config.parallel_views);
        assert_eq!(config.canvas_size, 1024);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = DetectorConfig::from_json(r#"{"canvas_size": 0}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = DetectorConfig::from_json(r#"{"architectural_confidence_range": [90, 80]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        assert!(matches!(
            DetectorConfig::from_json("not json").unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_seed() {
        let config = DetectorConfig {
            seed: Some(42),
            ..Default::default()
        };
        let parsed = DetectorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
