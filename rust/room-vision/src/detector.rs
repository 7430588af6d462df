// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room detector: the public entry point tying the pipeline together
//!
//! One analysis runs view planning, per-view rendering and classification,
//! fusion, deduplication, architectural priors and room validation. A
//! failure in any view aborts the analysis and yields an empty result map,
//! so callers cannot tell "nothing detected" from "pipeline failed".

use crate::architectural::estimate_features;
use crate::classifier::{Classifier, ModelLoader};
use crate::config::DetectorConfig;
use crate::dedup::estimate_objects;
use crate::error::{Error, Result};
use crate::fusion::fuse_detections;
use crate::render::{rgba_to_rgb, CanvasRenderer, RegionRenderer};
use crate::room_tables::RoomTables;
use crate::types::{DetectionStats, RawDetection, ResultMap, RoomType, ViewDescriptor};
use crate::validator::{merge_estimates, validate_against_room};
use crate::view_planner::plan_views;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Multi-view room content detector
pub struct RoomDetector<L: ModelLoader, R: RegionRenderer = CanvasRenderer> {
    loader: L,
    renderer: R,
    model: Option<L::Model>,
    config: DetectorConfig,
    tables: Arc<RoomTables>,
}

impl<L: ModelLoader> RoomDetector<L, CanvasRenderer> {
    /// Create a detector with default configuration and the shared tables
    pub fn new(loader: L) -> Self {
        let config = DetectorConfig::default();
        Self {
            loader,
            renderer: CanvasRenderer::new(config.canvas_size),
            model: None,
            config,
            tables: RoomTables::shared(),
        }
    }

    pub fn with_config(loader: L, config: DetectorConfig) -> Result<Self> {
        let renderer = CanvasRenderer::new(config.canvas_size);
        Self::with_parts(loader, renderer, config, RoomTables::shared())
    }
}

impl<L: ModelLoader, R: RegionRenderer> RoomDetector<L, R> {
    pub fn with_parts(
        loader: L,
        renderer: R,
        config: DetectorConfig,
        tables: Arc<RoomTables>,
    ) -> Result<Self> {
        config.validate()?;
        tables.validate()?;
        Ok(Self {
            loader,
            renderer,
            model: None,
            config,
            tables,
        })
    }

    /// Load the classifier model; safe to call again after a failure
    pub fn initialize(&mut self) -> bool {
        match self.try_initialize() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to initialize object detection");
                false
            }
        }
    }

    pub fn try_initialize(&mut self) -> Result<()> {
        if self.model.is_some() {
            return Ok(());
        }

        tracing::info!("Loading object detection model");
        let model = self
            .loader
            .load()
            .map_err(|e| Error::InitializationFailure(e.to_string()))?;
        self.model = Some(model);
        tracing::info!("Object detection initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn tables(&self) -> &RoomTables {
        &self.tables
    }

    pub fn room_type_from_name(&self, room_name: &str) -> RoomType {
        self.tables.room_type_from_name(room_name)
    }

    /// Analyze a panorama for the named room
    ///
    /// Architectural priors use `config.seed` when set, entropy otherwise.
    pub fn analyze_room(&self, image: &RgbImage, room_name: &str) -> Result<ResultMap> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.analyze_room_with_rng(image, room_name, &mut rng)
    }

    /// Analyze with an explicit random source for the architectural priors
    ///
    /// Returns `Err(NotInitialized)` before a successful [`initialize`](Self::initialize);
    /// any render or classifier failure is logged and yields an empty map.
    pub fn analyze_room_with_rng<G: Rng>(
        &self,
        image: &RgbImage,
        room_name: &str,
        rng: &mut G,
    ) -> Result<ResultMap> {
        let model = self.model.as_ref().ok_or(Error::NotInitialized)?;
        let room = self.room_type_from_name(room_name);

        match self.detect_objects(model, image, room, rng) {
            Ok(results) => Ok(results),
            Err(err) => {
                tracing::error!(error = %err, room = %room, "Room analysis aborted");
                Ok(ResultMap::default())
            }
        }
    }

    /// Analyze raw RGBA pixel data (4 bytes per pixel)
    pub fn analyze_rgba(
        &self,
        rgba_data: &[u8],
        width: u32,
        height: u32,
        room_name: &str,
    ) -> Result<ResultMap> {
        let expected_len = width as usize * height as usize * 4;
        if rgba_data.len() != expected_len {
            return Err(Error::InvalidImage(format!(
                "Invalid RGBA data length: expected {}, got {}",
                expected_len,
                rgba_data.len()
            )));
        }
        let image = rgba_to_rgb(rgba_data, width, height);
        self.analyze_room(&image, room_name)
    }

    pub fn detection_stats(&self) -> DetectionStats {
        DetectionStats {
            is_initialized: self.is_initialized(),
            model_loaded: self.model.is_some(),
            supported_objects: self.tables.supported_objects(),
            supported_room_types: self.tables.supported_room_types(),
        }
    }

    fn detect_objects<G: Rng>(
        &self,
        model: &L::Model,
        image: &RgbImage,
        room: RoomType,
        rng: &mut G,
    ) -> Result<ResultMap> {
        let start = Instant::now();
        let views = plan_views(
            image.width(),
            image.height(),
            room,
            &self.tables,
            &self.config,
        );

        tracing::info!(
            room = %room,
            width = image.width(),
            height = image.height(),
            views = views.len(),
            parallel = self.config.parallel_views,
            "Starting room analysis"
        );

        let detections = self.collect_detections(model, image, &views)?;
        let results = estimate_room(&detections, room, &self.tables, &self.config, rng)?;

        tracing::info!(
            room = %room,
            raw_detections = detections.len(),
            items = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Room analysis complete"
        );

        Ok(results)
    }

    /// Classify every view, keeping detections in plan order
    fn collect_detections(
        &self,
        model: &L::Model,
        image: &RgbImage,
        views: &[ViewDescriptor],
    ) -> Result<Vec<RawDetection>> {
        let renderer = &self.renderer;

        let per_view: Vec<Vec<RawDetection>> = if self.config.parallel_views {
            views
                .par_iter()
                .map(|view| classify_view(renderer, model, image, view))
                .collect::<Result<_>>()?
        } else {
            views
                .iter()
                .map(|view| classify_view(renderer, model, image, view))
                .collect::<Result<_>>()?
        };

        Ok(per_view.into_iter().flatten().collect())
    }
}

/// Every stage after classification: fusion, deduplication, architectural
/// priors, merge and room validation
///
/// Fails with `InvalidConfig` when `config` does not validate.
pub fn estimate_room<G: Rng>(
    detections: &[RawDetection],
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
    rng: &mut G,
) -> Result<ResultMap> {
    config.validate()?;

    let fused = fuse_detections(detections, room, tables, config);
    let objects = estimate_objects(fused.classes, room, tables);
    let architectural =
        estimate_features(room, tables, config.architectural_confidence_range, rng);

    Ok(validate_against_room(
        merge_estimates(objects, architectural),
        room,
        tables,
        config,
    ))
}

/// Render one view into its own buffer and classify it
fn classify_view<R: RegionRenderer, C: Classifier>(
    renderer: &R,
    model: &C,
    image: &RgbImage,
    view: &ViewDescriptor,
) -> Result<Vec<RawDetection>> {
    let region = renderer.render(image, view)?;

    let mut predictions =
        model
            .classify(&region, view.max_results)
            .map_err(|e| Error::ClassifierFailure {
                view: view.tag.clone(),
                reason: e.to_string(),
            })?;
    predictions.truncate(view.max_results);

    tracing::debug!(
        view = %view.tag,
        weight = view.weight,
        predictions = predictions.len(),
        "Classified view"
    );

    Ok(predictions
        .into_iter()
        .map(|p| RawDetection::from_prediction(p, view))
        .collect())
}
