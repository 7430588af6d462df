// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room-keyed lookup tables
//!
//! Every per-room and per-label constant the pipeline consults lives here:
//! confidence thresholds, context filters, deduplication classes, count
//! multipliers, grid layouts, architectural priors and room expectations.
//! The tables are built once and shared read-only (see [`RoomTables::shared`]).

use crate::architectural::ArchitecturalFeature;
use crate::dedup::DedupStrategy;
use crate::error::{Error, Result};
use crate::fusion::ContextFilter;
use crate::types::RoomType;
use crate::validator::RoomExpectation;
use crate::view_planner::{GridConfig, GridFocus};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Catalogue priority of a supported object
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogueEntry {
    pub label: String,
    pub threshold: f64,
    pub priority: Priority,
}

/// Named group of supported objects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectCategory {
    pub name: String,
    pub objects: Vec<CatalogueEntry>,
}

/// Read-only configuration tables for every room type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomTables {
    pub base_thresholds: FxHashMap<String, f64>,
    pub room_thresholds: FxHashMap<RoomType, FxHashMap<String, f64>>,
    pub context_filters: FxHashMap<RoomType, ContextFilter>,
    pub dedup_classes: FxHashMap<String, DedupStrategy>,
    pub count_multipliers: FxHashMap<RoomType, FxHashMap<String, f64>>,
    pub grids: FxHashMap<RoomType, GridConfig>,
    pub architectural: FxHashMap<RoomType, Vec<ArchitecturalFeature>>,
    pub expectations: FxHashMap<RoomType, RoomExpectation>,
    pub catalogue: Vec<ObjectCategory>,
    pub room_names: FxHashMap<String, RoomType>,
}

/// Upper bound on grid cells per room, keeping the view plan small
pub const MAX_GRID_CELLS: usize = 64;

static SHARED: OnceLock<Arc<RoomTables>> = OnceLock::new();

impl Default for RoomTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoomTables {
    /// Process-wide standard tables, built on first use
    pub fn shared() -> Arc<RoomTables> {
        SHARED.get_or_init(|| Arc::new(Self::standard())).clone()
    }

    /// Parse and validate tables from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: RoomTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let room_overrides = self.room_thresholds.values().flat_map(|m| m.iter());
        for (label, threshold) in self.base_thresholds.iter().chain(room_overrides) {
            if !(0.0..=1.0).contains(threshold) {
                return Err(Error::InvalidConfig(format!(
                    "threshold for '{}' must be in [0, 1], got {}",
                    label, threshold
                )));
            }
        }

        for (room, filter) in &self.context_filters {
            if !filter.threshold_boost.is_finite() || filter.threshold_boost < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "context filter boost for {} must be non-negative, got {}",
                    room, filter.threshold_boost
                )));
            }
        }

        for (label, multiplier) in self.count_multipliers.values().flat_map(|m| m.iter()) {
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "count multiplier for '{}' must be positive, got {}",
                    label, multiplier
                )));
            }
        }

        for (room, grid) in &self.grids {
            let cells = grid.cols as u64 * grid.rows as u64;
            if cells == 0 || cells > MAX_GRID_CELLS as u64 {
                return Err(Error::InvalidConfig(format!(
                    "grid for {} must have 1..={} cells, got {}x{}",
                    room, MAX_GRID_CELLS, grid.cols, grid.rows
                )));
            }
        }

        for (room, features) in &self.architectural {
            for feature in features {
                if !(0.0..=1.0).contains(&feature.probability)
                    || feature.min_count > feature.max_count
                {
                    return Err(Error::InvalidConfig(format!(
                        "architectural prior '{}' for {} needs probability in [0, 1] \
                         and min_count <= max_count",
                        feature.name, room
                    )));
                }
            }
        }

        Ok(())
    }

    /// Confidence threshold for `label`, room override first
    pub fn threshold(&self, room: RoomType, label: &str) -> Option<f64> {
        self.room_thresholds
            .get(&room)
            .and_then(|overrides| overrides.get(label))
            .or_else(|| self.base_thresholds.get(label))
            .copied()
    }

    pub fn context_filter(&self, room: RoomType) -> Option<&ContextFilter> {
        self.context_filters.get(&room)
    }

    pub fn dedup_strategy(&self, label: &str) -> DedupStrategy {
        self.dedup_classes
            .get(label)
            .copied()
            .unwrap_or(DedupStrategy::Unlisted)
    }

    pub fn count_multiplier(&self, room: RoomType, label: &str) -> f64 {
        self.count_multipliers
            .get(&room)
            .and_then(|m| m.get(label))
            .copied()
            .unwrap_or(1.0)
    }

    /// Grid layout for `room`, falling back to the general layout
    pub fn grid(&self, room: RoomType) -> GridConfig {
        self.grids
            .get(&room)
            .or_else(|| self.grids.get(&RoomType::General))
            .copied()
            .unwrap_or(GridConfig {
                cols: 3,
                rows: 2,
                focus: GridFocus::Center,
            })
    }

    /// Architectural priors for `room`, falling back to the general set
    pub fn architectural_features(&self, room: RoomType) -> &[ArchitecturalFeature] {
        self.architectural
            .get(&room)
            .or_else(|| self.architectural.get(&RoomType::General))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn expectation(&self, room: RoomType) -> Option<&RoomExpectation> {
        self.expectations.get(&room)
    }

    /// Resolve a room name via the lookup table; unknown names are `General`
    pub fn room_type_from_name(&self, name: &str) -> RoomType {
        self.room_names.get(name).copied().unwrap_or_default()
    }

    /// Union of all catalogue categories, first occurrence wins
    pub fn supported_objects(&self) -> Vec<String> {
        let mut objects: Vec<String> = Vec::new();
        for entry in self.catalogue.iter().flat_map(|c| c.objects.iter()) {
            if !objects.iter().any(|o| o == &entry.label) {
                objects.push(entry.label.clone());
            }
        }
        objects
    }

    /// Room types that carry architectural priors
    pub fn supported_room_types(&self) -> Vec<String> {
        RoomType::ALL
            .iter()
            .filter(|room| self.architectural.contains_key(room))
            .map(|room| room.as_str().to_string())
            .collect()
    }

    /// The standard calibration
    pub fn standard() -> Self {
        use DedupStrategy::{Aggressive, Conservative, Moderate};
        use RoomType::*;

        let base_thresholds = label_map(&[
            // High-confidence objects
            ("chair", 0.25),
            ("couch", 0.35),
            ("bed", 0.35),
            ("dining table", 0.25),
            ("tv", 0.35),
            ("laptop", 0.25),
            ("refrigerator", 0.35),
            ("toilet", 0.4),
            // Medium-confidence objects
            ("microwave", 0.25),
            ("oven", 0.3),
            ("sink", 0.25),
            ("potted plant", 0.25),
            ("clock", 0.25),
            ("keyboard", 0.25),
            ("desk", 0.25),
            // Prone to false positives
            ("person", 0.6),
            ("cell phone", 0.4),
            ("book", 0.3),
            ("cup", 0.35),
            ("mouse", 0.3),
            ("remote", 0.3),
            ("vase", 0.25),
        ]);

        let room_thresholds = room_map(vec![
            (
                Kitchen,
                label_map(&[
                    ("refrigerator", 0.25),
                    ("microwave", 0.2),
                    ("oven", 0.25),
                    ("sink", 0.2),
                    ("dining table", 0.2),
                    ("chair", 0.2),
                ]),
            ),
            (
                Bathroom,
                label_map(&[("toilet", 0.3), ("sink", 0.2), ("person", 0.7)]),
            ),
            (
                Toilet,
                label_map(&[("toilet", 0.25), ("sink", 0.2), ("person", 0.8)]),
            ),
            (
                Bedroom,
                label_map(&[("bed", 0.25), ("chair", 0.2), ("desk", 0.2), ("laptop", 0.2)]),
            ),
            (Entrance, label_map(&[("chair", 0.3), ("person", 0.5)])),
        ]);

        let context_filters = room_map(vec![
            (
                Toilet,
                ContextFilter::new(&["bed", "couch", "dining table", "tv", "laptop"], 0.3),
            ),
            (Kitchen, ContextFilter::new(&["bed", "toilet"], 0.2)),
            (
                Bedroom,
                ContextFilter::new(&["toilet", "refrigerator", "oven", "microwave"], 0.2),
            ),
            (
                Bathroom,
                ContextFilter::new(&["bed", "couch", "dining table", "tv"], 0.3),
            ),
        ]);

        let mut dedup_classes = FxHashMap::default();
        for (labels, strategy) in [
            (&["person", "cell phone", "book", "cup", "mouse"][..], Aggressive),
            (&["chair", "cabinet", "potted plant", "clock"][..], Moderate),
            (
                &["bed", "couch", "refrigerator", "tv", "toilet", "sink"][..],
                Conservative,
            ),
        ] {
            for label in labels {
                dedup_classes.insert(label.to_string(), strategy);
            }
        }

        let count_multipliers = room_map(vec![
            (Kitchen, label_map(&[("chair", 1.5), ("cabinet", 2.0)])),
            (Bedroom, label_map(&[("chair", 1.2)])),
            (Entrance, label_map(&[("chair", 0.8)])),
        ]);

        let grids = room_map(vec![
            (Kitchen, GridConfig::new(3, 2, GridFocus::Lower)),
            (Bathroom, GridConfig::new(2, 2, GridFocus::Center)),
            (Bedroom, GridConfig::new(3, 2, GridFocus::Center)),
            (Entrance, GridConfig::new(2, 3, GridFocus::Vertical)),
            (General, GridConfig::new(3, 2, GridFocus::Center)),
        ]);

        let feature = ArchitecturalFeature::new;
        let architectural = room_map(vec![
            (
                General,
                vec![feature("door", 0.95, 1, 2), feature("window", 0.8, 1, 3)],
            ),
            (
                Kitchen,
                vec![
                    feature("door", 0.9, 1, 2),
                    feature("window", 0.7, 1, 2),
                    feature("cabinet", 0.85, 3, 8),
                ],
            ),
            (
                Bathroom,
                vec![
                    feature("door", 0.95, 1, 1),
                    feature("window", 0.4, 0, 1),
                    feature("cabinet", 0.6, 1, 3),
                ],
            ),
            (
                Toilet,
                vec![
                    feature("door", 0.95, 1, 1),
                    feature("window", 0.3, 0, 1),
                    feature("cabinet", 0.4, 0, 2),
                ],
            ),
            (
                Bedroom,
                vec![
                    feature("door", 0.9, 1, 2),
                    feature("window", 0.85, 1, 3),
                    feature("closet", 0.7, 1, 2),
                ],
            ),
            (
                Entrance,
                vec![feature("door", 0.98, 1, 3), feature("window", 0.5, 0, 2)],
            ),
        ]);

        let expectations = room_map(vec![
            (
                Kitchen,
                RoomExpectation::new(
                    &["refrigerator", "sink"],
                    &["microwave", "oven", "dining table", "chair"],
                    &["bed", "toilet"],
                ),
            ),
            (
                Bathroom,
                RoomExpectation::new(&["sink"], &["toilet", "cabinet"], &["bed", "couch", "tv"]),
            ),
            (
                Toilet,
                RoomExpectation::new(
                    &["toilet"],
                    &["sink"],
                    &["bed", "couch", "tv", "refrigerator"],
                ),
            ),
            (
                Bedroom,
                RoomExpectation::new(
                    &["bed"],
                    &["chair", "desk", "closet"],
                    &["toilet", "refrigerator", "oven"],
                ),
            ),
        ]);

        let catalogue = vec![
            category(
                "furniture",
                &[
                    ("chair", 0.25, Priority::High),
                    ("couch", 0.35, Priority::High),
                    ("bed", 0.35, Priority::High),
                    ("dining table", 0.25, Priority::High),
                    ("desk", 0.25, Priority::Medium),
                ],
            ),
            category(
                "electronics",
                &[
                    ("tv", 0.35, Priority::High),
                    ("laptop", 0.25, Priority::Medium),
                    ("cell phone", 0.4, Priority::Low),
                    ("keyboard", 0.25, Priority::Medium),
                    ("mouse", 0.2, Priority::Low),
                    ("remote", 0.2, Priority::Low),
                ],
            ),
            category(
                "kitchen",
                &[
                    ("refrigerator", 0.35, Priority::High),
                    ("microwave", 0.25, Priority::Medium),
                    ("oven", 0.3, Priority::High),
                    ("sink", 0.25, Priority::High),
                    ("toaster", 0.25, Priority::Medium),
                ],
            ),
            category(
                "bathroom",
                &[
                    ("toilet", 0.4, Priority::High),
                    ("sink", 0.25, Priority::High),
                ],
            ),
            category(
                "decorative",
                &[
                    ("potted plant", 0.25, Priority::Medium),
                    ("vase", 0.2, Priority::Low),
                    ("clock", 0.25, Priority::Medium),
                    ("book", 0.2, Priority::Low),
                ],
            ),
        ];

        let room_names = [
            ("kitchen", Kitchen),
            ("toilet", Toilet),
            ("washroom", Bathroom),
            ("room1", Bedroom),
            ("room2", Bedroom),
            ("entrance", Entrance),
            // Canonical names round-trip
            ("general", General),
            ("bathroom", Bathroom),
            ("bedroom", Bedroom),
        ]
        .into_iter()
        .map(|(name, room)| (name.to_string(), room))
        .collect();

        Self {
            base_thresholds,
            room_thresholds,
            context_filters,
            dedup_classes,
            count_multipliers,
            grids,
            architectural,
            expectations,
            catalogue,
            room_names,
        }
    }
}

fn label_map(entries: &[(&str, f64)]) -> FxHashMap<String, f64> {
    entries
        .iter()
        .map(|(label, value)| (label.to_string(), *value))
        .collect()
}

fn room_map<T>(entries: Vec<(RoomType, T)>) -> FxHashMap<RoomType, T> {
    entries.into_iter().collect()
}

fn category(name: &str, entries: &[(&str, f64, Priority)]) -> ObjectCategory {
    ObjectCategory {
        name: name.to_string(),
        objects: entries
            .iter()
            .map(|(label, threshold, priority)| CatalogueEntry {
                label: label.to_string(),
                threshold: *threshold,
                priority: *priority,
            })
            .collect(),
    }
}
