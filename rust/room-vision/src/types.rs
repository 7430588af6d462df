// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for multi-view room content estimation

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room classification that drives thresholds, grids and priors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    #[default]
    General,
    Kitchen,
    Bathroom,
    Toilet,
    Bedroom,
    Entrance,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::General,
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::Toilet,
        RoomType::Bedroom,
        RoomType::Entrance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::General => "general",
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
            RoomType::Toilet => "toilet",
            RoomType::Bedroom => "bedroom",
            RoomType::Entrance => "entrance",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Colour enhancement applied to a view before classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementLevel {
    Low,
    Medium,
    High,
    /// Sharpened, high-contrast, desaturated profile for structural edges
    Edge,
}

/// CSS-style colour filter parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterProfile {
    pub contrast: f32,
    pub brightness: f32,
    pub saturation: f32,
    /// Unsharp-mask sigma, `None` for no sharpening
    pub sharpen_sigma: Option<f32>,
}

impl EnhancementLevel {
    pub fn profile(&self) -> FilterProfile {
        match self {
            EnhancementLevel::Low => FilterProfile {
                contrast: 1.1,
                brightness: 1.05,
                saturation: 1.05,
                sharpen_sigma: None,
            },
            EnhancementLevel::Medium => FilterProfile {
                contrast: 1.2,
                brightness: 1.1,
                saturation: 1.1,
                sharpen_sigma: None,
            },
            EnhancementLevel::High => FilterProfile {
                contrast: 1.3,
                brightness: 1.15,
                saturation: 1.2,
                sharpen_sigma: None,
            },
            EnhancementLevel::Edge => FilterProfile {
                contrast: 1.5,
                brightness: 1.0,
                saturation: 0.8,
                sharpen_sigma: Some(1.5),
            },
        }
    }
}

/// Sampling rectangle in source-image coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One planned sampling of the source panorama
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewDescriptor {
    /// Source tag recorded on every detection from this view
    pub tag: String,
    pub rect: ViewRect,
    pub enhancement: EnhancementLevel,
    /// Multiplier applied to raw classifier scores from this view
    pub weight: f64,
    /// Result budget passed to the classifier
    pub max_results: usize,
}

/// A single classifier output for one rendered region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Raw score in [0, 1]
    pub score: f64,
    /// Bounding box in region coordinates `[x, y, width, height]`
    #[serde(default)]
    pub bbox: [f64; 4],
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
            bbox: [0.0; 4],
        }
    }
}

/// A prediction tagged with the view it came from
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub label: String,
    pub raw_confidence: f64,
    pub source: String,
    pub weight: f64,
}

impl RawDetection {
    pub fn from_prediction(prediction: Prediction, view: &ViewDescriptor) -> Self {
        Self {
            label: prediction.label,
            raw_confidence: prediction.score,
            source: view.tag.clone(),
            weight: view.weight,
        }
    }

    /// Raw confidence scaled by the originating view's weight
    pub fn adjusted_confidence(&self) -> f64 {
        self.raw_confidence * self.weight
    }
}

/// Coarse reliability of an estimate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Medium,
    High,
}

/// Where an estimate came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Derived from classifier detections
    Object,
    /// Drawn from room-type priors; a statistical placeholder, not image evidence
    Architectural,
}

/// Final per-label estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemEstimate {
    pub label: String,
    /// Believed number of physical instances (>= 1)
    pub count: u32,
    /// Number of surviving detections before deduplication
    pub occurrences: u32,
    /// Confidence percentages in detection order
    pub confidences: Vec<u32>,
    pub max_confidence: u32,
    pub avg_confidence: u32,
    pub quality: QualityTier,
    pub kind: ItemKind,
    /// Distinct source tags in first-seen order
    pub sources: Vec<String>,
}

/// Label → estimate, the outcome of one analysis
pub type ResultMap = FxHashMap<String, ItemEstimate>;

/// Introspection snapshot of a detector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionStats {
    pub is_initialized: bool,
    pub model_loaded: bool,
    pub supported_objects: Vec<String>,
    pub supported_room_types: Vec<String>,
}
