// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View planning for panoramic images
//!
//! Equirectangular panoramas compress detail toward the frame edges, so a
//! single full-frame pass under-detects. The planner emits overlapping views
//! in a fixed order:
//! 1. Full frame (medium, weight 1.0)
//! 2. Center crop (high, weight 1.2)
//! 3. Adaptive grid cells in row-major order (weights 1.1 / 0.8)
//! 4. Edge-enhanced full frame (edge profile, weight 0.9)

use crate::config::DetectorConfig;
use crate::room_tables::RoomTables;
use crate::types::{EnhancementLevel, RoomType, ViewDescriptor, ViewRect};
use serde::{Deserialize, Serialize};

pub const FULL_TAG: &str = "full";
pub const CENTER_TAG: &str = "center";
pub const EDGE_TAG: &str = "edge_enhanced";

const FULL_WEIGHT: f64 = 1.0;
const CENTER_WEIGHT: f64 = 1.2;
const FOCUS_CELL_WEIGHT: f64 = 1.1;
const CELL_WEIGHT: f64 = 0.8;
const EDGE_WEIGHT: f64 = 0.9;

const FULL_MAX_RESULTS: usize = 12;
const CENTER_MAX_RESULTS: usize = 10;
const CELL_MAX_RESULTS: usize = 6;
const EDGE_MAX_RESULTS: usize = 8;

/// Which grid cells get the emphasized weight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GridFocus {
    /// The single cell at `(cols / 2, rows / 2)`
    Center,
    /// The bottom row (counters, fixtures)
    Lower,
    /// Tall layout, no emphasized cell
    Vertical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridConfig {
    pub cols: u32,
    pub rows: u32,
    pub focus: GridFocus,
}

impl GridConfig {
    pub fn new(cols: u32, rows: u32, focus: GridFocus) -> Self {
        Self { cols, rows, focus }
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    fn is_focus_cell(&self, col: u32, row: u32) -> bool {
        match self.focus {
            GridFocus::Center => col == self.cols / 2 && row == self.rows / 2,
            GridFocus::Lower => row + 1 >= self.rows,
            GridFocus::Vertical => false,
        }
    }
}

/// Plan every view for an image of the given size
pub fn plan_views(
    width: u32,
    height: u32,
    room: RoomType,
    tables: &RoomTables,
    config: &DetectorConfig,
) -> Vec<ViewDescriptor> {
    let grid = tables.grid(room);
    let mut views = Vec::with_capacity(grid.cell_count() + 3);

    views.push(ViewDescriptor {
        tag: FULL_TAG.to_string(),
        rect: ViewRect::full(width, height),
        enhancement: EnhancementLevel::Medium,
        weight: FULL_WEIGHT,
        max_results: FULL_MAX_RESULTS,
    });

    views.push(ViewDescriptor {
        tag: CENTER_TAG.to_string(),
        rect: center_crop(width, height, config.center_crop_ratio),
        enhancement: EnhancementLevel::High,
        weight: CENTER_WEIGHT,
        max_results: CENTER_MAX_RESULTS,
    });

    views.extend(grid_views(width, height, &grid));

    views.push(ViewDescriptor {
        tag: EDGE_TAG.to_string(),
        rect: ViewRect::full(width, height),
        enhancement: EnhancementLevel::Edge,
        weight: EDGE_WEIGHT,
        max_results: EDGE_MAX_RESULTS,
    });

    views
}

/// Square crop centered in the frame, sized from the shorter dimension
pub fn center_crop(width: u32, height: u32, ratio: f64) -> ViewRect {
    let size = width.min(height) as f64 * ratio;
    ViewRect::new(
        (width as f64 - size) / 2.0,
        (height as f64 - size) / 2.0,
        size,
        size,
    )
}

/// Grid cells in row-major order, tagged `grid_<index>`
pub fn grid_views(width: u32, height: u32, grid: &GridConfig) -> Vec<ViewDescriptor> {
    if grid.cols == 0 || grid.rows == 0 {
        return Vec::new();
    }

    let cell_width = width as f64 / grid.cols as f64;
    let cell_height = height as f64 / grid.rows as f64;

    let mut cells = Vec::with_capacity(grid.cell_count());
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (weight, enhancement) = if grid.is_focus_cell(col, row) {
                (FOCUS_CELL_WEIGHT, EnhancementLevel::High)
            } else {
                (CELL_WEIGHT, EnhancementLevel::Medium)
            };

            cells.push(ViewDescriptor {
                tag: format!("grid_{}", cells.len()),
                rect: ViewRect::new(
                    col as f64 * cell_width,
                    row as f64 * cell_height,
                    cell_width,
                    cell_height,
                ),
                enhancement,
                weight,
                max_results: CELL_MAX_RESULTS,
            });
        }
    }
    cells
}
