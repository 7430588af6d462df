// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furnishing and architectural feature estimation for panoramic room photos
//!
//! This crate provides a complete pipeline for:
//! 1. Planning overlapping views of a panorama (full, center, grid, edge)
//! 2. Rendering and classifying each view with an external detector
//! 3. Fusing weighted detections with room-aware thresholds and filters
//! 4. Correcting overcounts and rating each estimate's quality
//! 5. Blending in architectural priors (doors, windows, cabinets, closets)
//! 6. Reconciling the result with what the room type should contain
//!
//! # Usage
//!
//! ```rust,ignore
//! use room_vision::{RoomDetector, ClassifierError};
//!
//! let mut detector = RoomDetector::new(|| -> Result<_, ClassifierError> {
//!     Ok(MyCocoModel::load("mobilenet_v2")?)
//! });
//!
//! if detector.initialize() {
//!     let items = detector.analyze_room(&panorama, "kitchen")?;
//!     for (label, item) in &items {
//!         println!("{label}: {} ({:?})", item.count, item.quality);
//!     }
//! }
//! ```

pub mod architectural;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod detector;
pub mod error;
pub mod fusion;
pub mod render;
pub mod room_tables;
pub mod types;
pub mod validator;
pub mod view_planner;

// Re-export commonly used types and functions
pub use architectural::{estimate_features, ArchitecturalFeature};
pub use classifier::{Classifier, ModelLoader};
pub use config::DetectorConfig;
pub use dedup::{assess_quality, deduplicate_count, DedupStrategy};
pub use detector::{estimate_room, RoomDetector};
pub use error::{ClassifierError, Error, Result};
pub use fusion::{fuse_detections, ClassAccumulator, ContextFilter, FusionResult};
pub use render::{CanvasRenderer, RegionRenderer};
pub use room_tables::RoomTables;
pub use types::{
    DetectionStats, EnhancementLevel, ItemEstimate, ItemKind, Prediction, QualityTier,
    RawDetection, ResultMap, RoomType, ViewDescriptor, ViewRect,
};
pub use validator::{merge_estimates, validate_against_room, RoomExpectation};
pub use view_planner::{plan_views, GridConfig, GridFocus};

/// Resolve a room name with the standard lookup table
///
/// Unknown names resolve to [`RoomType::General`].
pub fn room_type_from_name(room_name: &str) -> RoomType {
    RoomTables::shared().room_type_from_name(room_name)
}

/// Plan, fuse and validate precomputed per-view predictions
///
/// Runs every stage after classification: `predictions[i]` must hold the
/// classifier output for `views[i]` as returned by [`plan_views`].
pub fn analyze_predictions<G: rand::Rng>(
    views: &[ViewDescriptor],
    predictions: Vec<Vec<Prediction>>,
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
    rng: &mut G,
) -> Result<ResultMap> {
    if views.len() != predictions.len() {
        return Err(Error::InvalidConfig(format!(
            "expected predictions for {} views, got {}",
            views.len(),
            predictions.len()
        )));
    }

    let detections: Vec<RawDetection> = views
        .iter()
        .zip(predictions)
        .flat_map(|(view, preds)| {
            preds
                .into_iter()
                .take(view.max_results)
                .map(move |p| RawDetection::from_prediction(p, view))
        })
        .collect();

    estimate_room(&detections, room, tables, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_room_type_from_name() {
        assert_eq!(room_type_from_name("washroom"), RoomType::Bathroom);
        assert_eq!(room_type_from_name("unknown_x"), RoomType::General);
        assert_eq!(room_type_from_name("room1"), RoomType::Bedroom);
    }

    #[test]
    fn test_analyze_predictions_bedroom_bed() {
        let tables = RoomTables::standard();
        let config = DetectorConfig::default();
        let views = plan_views(2000, 1000, RoomType::Bedroom, &tables, &config);

        let mut predictions = vec![Vec::new(); views.len()];
        predictions[0].push(Prediction::new("bed", 0.40));

        let mut rng = StdRng::seed_from_u64(5);
        let results =
            analyze_predictions(&views, predictions, RoomType::Bedroom, &tables, &config, &mut rng)
                .unwrap();

        let bed = &results["bed"];
        assert_eq!(bed.kind, ItemKind::Object);
        assert_eq!(bed.count, 1);
        assert_eq!(bed.max_confidence, 50);
        assert_eq!(bed.avg_confidence, 50);
        assert_eq!(bed.confidences, vec![50]);
        assert_eq!(bed.quality, QualityTier::Low);
    }

    #[test]
    fn test_analyze_predictions_respects_view_budget() {
        let tables = RoomTables::standard();
        let config = DetectorConfig::default();
        let views = plan_views(900, 600, RoomType::Entrance, &tables, &config);

        // grid cells accept at most 6 predictions
        let mut predictions = vec![Vec::new(); views.len()];
        predictions[2] = (0..10).map(|_| Prediction::new("umbrella", 0.9)).collect();

        let mut rng = StdRng::seed_from_u64(0);
        let results =
            analyze_predictions(&views, predictions, RoomType::Entrance, &tables, &config, &mut rng)
                .unwrap();
        assert_eq!(results["umbrella"].occurrences, 6);
    }

    #[test]
    fn test_analyze_predictions_length_mismatch() {
        let tables = RoomTables::standard();
        let config = DetectorConfig::default();
        let views = plan_views(900, 600, RoomType::Kitchen, &tables, &config);
        let mut rng = StdRng::seed_from_u64(0);

        for len in [views.len() - 1, views.len() + 1] {
            let result = analyze_predictions(
                &views,
                vec![Vec::new(); len],
                RoomType::Kitchen,
                &tables,
                &config,
                &mut rng,
            );
            assert!(matches!(result, Err(Error::InvalidConfig(_))), "len {len}");
        }
    }

    #[test]
    fn test_analyze_predictions_rejects_invalid_config() {
        let tables = RoomTables::standard();
        let config = DetectorConfig {
            architectural_confidence_range: (70, 70),
            ..Default::default()
        };
        let views = plan_views(900, 600, RoomType::General, &tables, &config);
        let predictions = vec![Vec::new(); views.len()];

        let mut rng = StdRng::seed_from_u64(0);
        let result =
            analyze_predictions(&views, predictions, RoomType::General, &tables, &config, &mut rng);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
