// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overcount correction and quality assessment
//!
//! Overlapping views re-detect the same physical object, so raw occurrence
//! counts overstate how many items are in the room. Each label belongs to
//! one overcounting class that decides how hard the count is divided.

use crate::fusion::ClassAccumulator;
use crate::room_tables::RoomTables;
use crate::types::{ItemEstimate, ItemKind, QualityTier, ResultMap, RoomType};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Overcounting class of a label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// Small items seen from many angles (phones, cups)
    Aggressive,
    /// Items that recur legitimately but also duplicate (chairs)
    Moderate,
    /// Large singular fixtures (beds, fridges)
    Conservative,
    /// No deduplication
    Unlisted,
}

impl DedupStrategy {
    /// Divisor applied to the occurrence count
    pub fn divisor(&self, distinct_sources: usize) -> f64 {
        let s = distinct_sources as f64;
        match self {
            DedupStrategy::Aggressive => s.max(2.0),
            DedupStrategy::Moderate => (s * 0.8).max(1.5),
            DedupStrategy::Conservative => (s * 0.6).max(1.2),
            DedupStrategy::Unlisted => 1.0,
        }
    }
}

/// Believable instance count for a label; never exceeds `occurrences`
pub fn deduplicate_count(
    label: &str,
    occurrences: u32,
    distinct_sources: usize,
    room: RoomType,
    tables: &RoomTables,
) -> u32 {
    let divisor = tables.dedup_strategy(label).divisor(distinct_sources);
    let multiplier = tables.count_multiplier(room, label);

    let estimate = (occurrences as f64 / divisor * multiplier).ceil().max(1.0) as u32;
    estimate.min(occurrences)
}

pub fn assess_quality(max_confidence: u32, avg_confidence: u32, distinct_sources: usize) -> QualityTier {
    if max_confidence >= 80 && avg_confidence >= 60 && distinct_sources >= 2 {
        QualityTier::High
    } else if max_confidence >= 60 && avg_confidence >= 40 {
        QualityTier::Medium
    } else {
        QualityTier::Low
    }
}

/// Turn accumulated classes into object estimates
pub fn estimate_objects(
    classes: FxHashMap<String, ClassAccumulator>,
    room: RoomType,
    tables: &RoomTables,
) -> ResultMap {
    classes
        .into_iter()
        .map(|(label, acc)| {
            let avg_confidence = acc.avg_confidence();
            let sources = acc.distinct_sources();
            let count = deduplicate_count(&label, acc.occurrences, sources, room, tables);
            let quality = assess_quality(acc.max_confidence, avg_confidence, sources);

            let estimate = ItemEstimate {
                label: label.clone(),
                count,
                occurrences: acc.occurrences,
                confidences: acc.confidences,
                max_confidence: acc.max_confidence,
                avg_confidence,
                quality,
                kind: ItemKind::Object,
                sources: acc.sources,
            };
            (label, estimate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn count(label: &str, occurrences: u32, sources: usize, room: RoomType) -> u32 {
        deduplicate_count(label, occurrences, sources, room, &RoomTables::standard())
    }

    #[test]
    fn test_divisors() {
        assert_relative_eq!(DedupStrategy::Aggressive.divisor(1), 2.0);
        assert_relative_eq!(DedupStrategy::Aggressive.divisor(5), 5.0);
        assert_relative_eq!(DedupStrategy::Moderate.divisor(1), 1.5);
        assert_relative_eq!(DedupStrategy::Moderate.divisor(4), 3.2);
        assert_relative_eq!(DedupStrategy::Conservative.divisor(1), 1.2);
        assert_relative_eq!(DedupStrategy::Conservative.divisor(6), 3.6, epsilon = 1e-12);
        assert_relative_eq!(DedupStrategy::Unlisted.divisor(9), 1.0);
    }

    #[test]
    fn test_aggressive_collapses_phones() {
        // 4 hits from 4 views: ceil(4 / 4) = 1
        assert_eq!(count("cell phone", 4, 4, RoomType::General), 1);
        // 3 hits from one view: ceil(3 / 2) = 2
        assert_eq!(count("cup", 3, 1, RoomType::General), 2);
    }

    #[test]
    fn test_kitchen_multiplier_keeps_more_chairs() {
        // general: ceil(6 / 3.2) = 2; kitchen: ceil(6 / 3.2 * 1.5) = 3
        assert_eq!(count("chair", 6, 4, RoomType::General), 2);
        assert_eq!(count("chair", 6, 4, RoomType::Kitchen), 3);
        // entrance scales down: ceil(6 / 3.2 * 0.8) = 2
        assert_eq!(count("chair", 6, 4, RoomType::Entrance), 2);
    }

    #[test]
    fn test_never_exceeds_occurrences() {
        // kitchen cabinet: ceil(1 / 1.5 * 2) = 2, capped at 1
        assert_eq!(count("cabinet", 1, 1, RoomType::Kitchen), 1);
        for occurrences in 1..12 {
            for sources in 1..9 {
                for room in RoomType::ALL {
                    for label in ["chair", "cabinet", "cup", "bed", "vase"] {
                        let c = count(label, occurrences, sources, room);
                        assert!(c >= 1 && c <= occurrences);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unlisted_label_keeps_count() {
        assert_eq!(count("vase", 5, 3, RoomType::General), 5);
    }

    #[test]
    fn test_quality_tiers() {
        assert_eq!(assess_quality(85, 65, 2), QualityTier::High);
        assert_eq!(assess_quality(85, 65, 1), QualityTier::Medium);
        assert_eq!(assess_quality(60, 40, 1), QualityTier::Medium);
        assert_eq!(assess_quality(59, 59, 3), QualityTier::Low);
        assert_eq!(assess_quality(90, 35, 3), QualityTier::Low);
    }

    #[test]
    fn test_estimate_objects_builds_object_items() {
        let mut acc = ClassAccumulator::default();
        acc.record(90, "full");
        acc.record(70, "center");
        let mut classes = FxHashMap::default();
        classes.insert("bed".to_string(), acc);

        let result = estimate_objects(classes, RoomType::Bedroom, &RoomTables::standard());
        let bed = &result["bed"];
        assert_eq!(bed.kind, ItemKind::Object);
        assert_eq!(bed.occurrences, 2);
        // conservative: max(1.2, 2 * 0.6) = 1.2 -> ceil(1.67) = 2
        assert_eq!(bed.count, 2);
        assert_eq!(bed.avg_confidence, 80);
        assert_eq!(bed.quality, QualityTier::High);
    }
}
