// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Architectural feature priors
//!
//! Doors, windows, cabinets and closets are rarely picked up by a generic
//! object classifier. This estimator samples plausible counts from room-type
//! priors instead. Its output is a statistical placeholder, not evidence
//! derived from the image, and is tagged [`ItemKind::Architectural`].

use crate::room_tables::RoomTables;
use crate::types::{ItemEstimate, ItemKind, QualityTier, ResultMap, RoomType};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Source tag carried by every architectural estimate
pub const ARCHITECTURAL_SOURCE: &str = "architectural";

/// Prior for one structural feature in a room type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchitecturalFeature {
    pub name: String,
    /// Chance the feature is present at all
    pub probability: f64,
    /// Inclusive typical count range
    pub min_count: u32,
    pub max_count: u32,
}

impl ArchitecturalFeature {
    pub fn new(name: &str, probability: f64, min_count: u32, max_count: u32) -> Self {
        Self {
            name: name.to_string(),
            probability,
            min_count,
            max_count,
        }
    }
}

/// Sample architectural estimates for `room`
///
/// `confidence_range` is the half-open range synthetic confidences are drawn
/// from; an empty range yields its lower bound.
pub fn estimate_features<R: Rng>(
    room: RoomType,
    tables: &RoomTables,
    confidence_range: (u32, u32),
    rng: &mut R,
) -> ResultMap {
    let mut features = ResultMap::default();

    for feature in tables.architectural_features(room) {
        if rng.gen::<f64>() >= feature.probability {
            continue;
        }

        let max_count = feature.max_count.max(feature.min_count);
        let count = rng.gen_range(feature.min_count..=max_count);
        if count == 0 {
            continue;
        }

        let (lo, hi) = confidence_range;
        let confidence = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        features.insert(
            feature.name.clone(),
            ItemEstimate {
                label: feature.name.clone(),
                count,
                occurrences: count,
                confidences: vec![confidence],
                max_confidence: confidence,
                avg_confidence: confidence,
                quality: if confidence > 75 {
                    QualityTier::High
                } else {
                    QualityTier::Medium
                },
                kind: ItemKind::Architectural,
                sources: vec![ARCHITECTURAL_SOURCE.to_string()],
            },
        );
    }

    features
}
