// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the external visual classifier

use crate::error::ClassifierError;
use crate::types::Prediction;
use image::RgbImage;

/// A loaded object detection model
///
/// Implementations must tolerate repeated calls, and concurrent calls when
/// views are classified in parallel, without sharing state between them.
pub trait Classifier: Send + Sync {
    /// Detect objects in `region`, returning at most `max_results` predictions
    fn classify(
        &self,
        region: &RgbImage,
        max_results: usize,
    ) -> Result<Vec<Prediction>, ClassifierError>;
}

/// Loads (downloads, warms up) a classifier model
pub trait ModelLoader {
    type Model: Classifier;

    fn load(&self) -> Result<Self::Model, ClassifierError>;
}

impl<F, C> ModelLoader for F
where
    F: Fn() -> Result<C, ClassifierError>,
    C: Classifier,
{
    type Model = C;

    fn load(&self) -> Result<C, ClassifierError> {
        self()
    }
}
