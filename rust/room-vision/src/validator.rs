// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging object and architectural estimates, then reconciling the result
//! with what a room type is expected to contain

use crate::config::DetectorConfig;
use crate::room_tables::RoomTables;
use crate::types::{ResultMap, RoomType};
use serde::{Deserialize, Serialize};

/// Expected contents of a room type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomExpectation {
    /// Present items get a confidence boost
    pub should_have: Vec<String>,
    /// Informational only
    pub might_have: Vec<String>,
    /// Present items with weak confidence are removed
    pub unlikely: Vec<String>,
}

impl RoomExpectation {
    pub fn new(should_have: &[&str], might_have: &[&str], unlikely: &[&str]) -> Self {
        Self {
            should_have: owned(should_have),
            might_have: owned(might_have),
            unlikely: owned(unlikely),
        }
    }
}

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

/// Merge both estimate kinds; on a label collision the object estimate wins
pub fn merge_estimates(objects: ResultMap, architectural: ResultMap) -> ResultMap {
    let mut combined = objects;
    for (label, estimate) in architectural {
        if combined.contains_key(&label) {
            tracing::debug!(label = %label, "Architectural estimate shadowed by object detection");
            continue;
        }
        combined.insert(label, estimate);
    }
    combined
}

/// Boost expected items and drop weak unlikely ones
pub fn validate_against_room(
    mut results: ResultMap,
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
) -> ResultMap {
    let Some(expectation) = tables.expectation(room) else {
        return results;
    };

    let boost = |c: u32| (c + config.expectation_boost).min(config.expectation_cap);

    for label in &expectation.should_have {
        if let Some(item) = results.get_mut(label) {
            item.confidences.iter_mut().for_each(|c| *c = boost(*c));
            item.max_confidence = boost(item.max_confidence);
            item.avg_confidence = boost(item.avg_confidence);
        }
    }

    for label in &expectation.unlikely {
        let weak = results
            .get(label)
            .is_some_and(|item| item.max_confidence < config.unlikely_removal_confidence);
        if weak {
            tracing::debug!(label = %label, room = %room, "Removed unlikely item");
            results.remove(label);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemEstimate, ItemKind, QualityTier};

    fn item(label: &str, confidences: &[u32], kind: ItemKind) -> ItemEstimate {
        let max = confidences.iter().copied().max().unwrap_or(0);
        let avg = confidences.iter().sum::<u32>() / confidences.len().max(1) as u32;
        ItemEstimate {
            label: label.into(),
            count: 1,
            occurrences: confidences.len() as u32,
            confidences: confidences.to_vec(),
            max_confidence: max,
            avg_confidence: avg,
            quality: QualityTier::Medium,
            kind,
            sources: vec!["full".into()],
        }
    }

    fn results(items: Vec<ItemEstimate>) -> ResultMap {
        items.into_iter().map(|i| (i.label.clone(), i)).collect()
    }

    fn validate(map: ResultMap, room: RoomType) -> ResultMap {
        validate_against_room(map, room, &RoomTables::standard(), &DetectorConfig::default())
    }

    #[test]
    fn test_should_have_boost_is_capped() {
        let map = results(vec![item("refrigerator", &[40, 90], ItemKind::Object)]);
        let validated = validate(map, RoomType::Kitchen);
        let fridge = &validated["refrigerator"];
        assert_eq!(fridge.confidences, vec![50, 95]);
        assert_eq!(fridge.max_confidence, 95);
        assert_eq!(fridge.avg_confidence, 75);
    }

    #[test]
    fn test_unlikely_weak_item_removed() {
        let map = results(vec![
            item("bed", &[65], ItemKind::Object),
            item("sink", &[50], ItemKind::Object),
        ]);
        let validated = validate(map, RoomType::Kitchen);
        assert!(!validated.contains_key("bed"));
        assert!(validated.contains_key("sink"));
    }

    #[test]
    fn test_unlikely_strong_item_retained_unmodified() {
        let original = item("bed", &[75], ItemKind::Object);
        let validated = validate(results(vec![original.clone()]), RoomType::Kitchen);
        assert_eq!(validated["bed"], original);
    }

    #[test]
    fn test_might_have_is_informational() {
        let original = item("microwave", &[30], ItemKind::Object);
        let validated = validate(results(vec![original.clone()]), RoomType::Kitchen);
        assert_eq!(validated["microwave"], original);
    }

    #[test]
    fn test_room_without_expectations_passes_through() {
        let map = results(vec![
            item("bed", &[20], ItemKind::Object),
            item("toilet", &[30], ItemKind::Object),
        ]);
        let validated = validate(map.clone(), RoomType::Entrance);
        assert_eq!(validated, map);
    }

    #[test]
    fn test_merge_prefers_object_estimate() {
        let objects = results(vec![item("cabinet", &[70, 72], ItemKind::Object)]);
        let architectural = results(vec![
            item("cabinet", &[80], ItemKind::Architectural),
            item("door", &[64], ItemKind::Architectural),
        ]);

        let merged = merge_estimates(objects, architectural);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["cabinet"].kind, ItemKind::Object);
        assert_eq!(merged["door"].kind, ItemKind::Architectural);
    }
}
