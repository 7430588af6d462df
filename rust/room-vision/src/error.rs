// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for room analysis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during room analysis
#[derive(Error, Debug)]
pub enum Error {
    #[error("Detector not initialized: call initialize() first")]
    NotInitialized,

    #[error("Model initialization failed: {0}")]
    InitializationFailure(String),

    #[error("Classifier failed on view '{view}': {reason}")]
    ClassifierFailure { view: String, reason: String },

    #[error("Region rendering failed on view '{view}': {reason}")]
    RenderFailure { view: String, reason: String },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an external classifier or model loader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ClassifierError {
    pub message: String,
}

impl ClassifierError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
