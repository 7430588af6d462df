// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection fusion across views
//!
//! Every raw detection is weighted by its view, screened against the
//! room's thresholds and context filter, and folded into a per-label
//! accumulator. Screening runs in three stages:
//! 1. Threshold: weighted confidence must reach the room/label threshold
//! 2. Context: labels implausible for the room need a boosted confidence
//! 3. Person: weak `person` hits are usually shadows or furniture

use crate::config::DetectorConfig;
use crate::room_tables::RoomTables;
use crate::types::{RawDetection, RoomType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Labels that are implausible in a room and the extra confidence they need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextFilter {
    pub implausible: Vec<String>,
    pub threshold_boost: f64,
}

impl ContextFilter {
    pub fn new(labels: &[&str], threshold_boost: f64) -> Self {
        Self {
            implausible: labels.iter().map(|l| l.to_string()).collect(),
            threshold_boost,
        }
    }

    pub fn is_implausible(&self, label: &str) -> bool {
        self.implausible.iter().any(|l| l == label)
    }
}

/// Running statistics for one label within one analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassAccumulator {
    pub occurrences: u32,
    /// Confidence percentages in arrival order
    pub confidences: Vec<u32>,
    pub max_confidence: u32,
    /// Distinct source tags in first-seen order
    pub sources: Vec<String>,
}

impl ClassAccumulator {
    pub fn record(&mut self, percent: u32, source: &str) {
        self.occurrences += 1;
        self.confidences.push(percent);
        self.max_confidence = self.max_confidence.max(percent);
        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(source.to_string());
        }
    }

    /// Rounded arithmetic mean of the recorded percentages
    pub fn avg_confidence(&self) -> u32 {
        if self.confidences.is_empty() {
            return 0;
        }
        let sum: u32 = self.confidences.iter().sum();
        (sum as f64 / self.confidences.len() as f64).round() as u32
    }

    pub fn distinct_sources(&self) -> usize {
        self.sources.len()
    }
}

/// Why a detection was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BelowThreshold,
    Implausible,
    UnreliablePerson,
}

/// Counters from one fusion pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionStats {
    pub input_count: usize,
    pub accepted: usize,
    pub below_threshold: usize,
    pub implausible: usize,
    pub unreliable_person: usize,
}

/// Accumulated classes plus screening statistics
#[derive(Debug, Clone, Default)]
pub struct FusionResult {
    pub classes: FxHashMap<String, ClassAccumulator>,
    pub stats: FusionStats,
}

/// Weighted confidence as a percentage, clamped to [0, 100]
pub fn to_percent(adjusted_confidence: f64) -> u32 {
    (adjusted_confidence * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Screen one detection; returns its weighted confidence when it survives
pub fn screen_detection(
    detection: &RawDetection,
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
) -> Result<f64, Rejection> {
    let label = detection.label.as_str();
    let confidence = detection.adjusted_confidence();

    let threshold = tables
        .threshold(room, label)
        .unwrap_or(config.default_threshold);
    if confidence < threshold {
        return Err(Rejection::BelowThreshold);
    }

    if let Some(filter) = tables.context_filter(room) {
        if filter.is_implausible(label) {
            let required = config.implausible_base_threshold + filter.threshold_boost;
            return if confidence < required {
                Err(Rejection::Implausible)
            } else {
                Ok(confidence)
            };
        }
    }

    if label == "person" && confidence < config.person_min_confidence {
        return Err(Rejection::UnreliablePerson);
    }

    Ok(confidence)
}

/// Fold all detections of one analysis into per-label accumulators
pub fn fuse_detections(
    detections: &[RawDetection],
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
) -> FusionResult {
    let mut result = FusionResult {
        classes: FxHashMap::default(),
        stats: FusionStats {
            input_count: detections.len(),
            ..Default::default()
        },
    };

    for detection in detections {
        match screen_detection(detection, room, tables, config) {
            Ok(confidence) => {
                result
                    .classes
                    .entry(detection.label.clone())
                    .or_default()
                    .record(to_percent(confidence), &detection.source);
                result.stats.accepted += 1;
            }
            Err(Rejection::BelowThreshold) => result.stats.below_threshold += 1,
            Err(Rejection::Implausible) => result.stats.implausible += 1,
            Err(Rejection::UnreliablePerson) => result.stats.unreliable_person += 1,
        }
    }

    tracing::debug!(
        room = %room,
        input = result.stats.input_count,
        accepted = result.stats.accepted,
        below_threshold = result.stats.below_threshold,
        implausible = result.stats.implausible,
        unreliable_person = result.stats.unreliable_person,
        classes = result.classes.len(),
        "Fused detections"
    );

    result
}
