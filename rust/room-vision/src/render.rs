// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region rendering: turning a planned view into a classifier input buffer

use crate::error::{Error, Result};
use crate::types::{FilterProfile, ViewDescriptor, ViewRect};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Produces an isolated pixel buffer for one view
pub trait RegionRenderer: Send + Sync {
    fn render(&self, image: &RgbImage, view: &ViewDescriptor) -> Result<RgbImage>;
}

/// Crops, rescales onto a square canvas and applies the view's colour profile
#[derive(Debug, Clone, Copy)]
pub struct CanvasRenderer {
    pub canvas_size: u32,
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self { canvas_size: 1024 }
    }
}

impl CanvasRenderer {
    pub fn new(canvas_size: u32) -> Self {
        Self { canvas_size }
    }
}

impl RegionRenderer for CanvasRenderer {
    fn render(&self, image: &RgbImage, view: &ViewDescriptor) -> Result<RgbImage> {
        let (x, y, width, height) =
            pixel_bounds(&view.rect, image.width(), image.height()).ok_or_else(|| {
                Error::RenderFailure {
                    view: view.tag.clone(),
                    reason: format!("empty image for region {:?}", view.rect),
                }
            })?;

        let region = imageops::crop_imm(image, x, y, width, height).to_image();
        let mut canvas = imageops::resize(
            &region,
            self.canvas_size,
            self.canvas_size,
            FilterType::Triangle,
        );

        let profile = view.enhancement.profile();
        apply_color_filter(&mut canvas, &profile);

        if let Some(sigma) = profile.sharpen_sigma {
            canvas = imageops::unsharpen(&canvas, sigma, 1);
        }

        Ok(canvas)
    }
}

/// Pixel bounds covering a view rectangle, clamped to the image
///
/// Partially covered pixels are included and every axis spans at least one
/// pixel. Returns `None` only for an empty image.
pub fn pixel_bounds(rect: &ViewRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (x0, x1) = pixel_span(rect.x, rect.width, width);
    let (y0, y1) = pixel_span(rect.y, rect.height, height);
    Some((x0, y0, x1 - x0, y1 - y0))
}

/// Covering span of `[start, start + len)` within `0..limit`; `limit` > 0
fn pixel_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let lo = start.floor().clamp(0.0, (limit - 1) as f64) as u32;
    let hi = (start + len).ceil().clamp(0.0, limit as f64) as u32;
    (lo, hi.max(lo + 1))
}

/// Apply contrast, brightness and saturation in that order
///
/// Each stage clamps to the displayable range before the next one runs.
pub fn apply_color_filter(image: &mut RgbImage, profile: &FilterProfile) {
    let s = profile.saturation;
    let saturate = [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ];

    for pixel in image.pixels_mut() {
        let mut rgb = [0f32; 3];
        for (c, value) in rgb.iter_mut().enumerate() {
            let v = pixel.0[c] as f32 / 255.0;
            let v = ((v - 0.5) * profile.contrast + 0.5).clamp(0.0, 1.0);
            *value = (v * profile.brightness).clamp(0.0, 1.0);
        }

        for (c, row) in saturate.iter().enumerate() {
            let v = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            pixel.0[c] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

/// Convert RGBA bytes to an RGB image, dropping alpha
pub fn rgba_to_rgb(rgba: &[u8], width: u32, height: u32) -> RgbImage {
    let mut rgb = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let i = (y as usize * width as usize + x as usize) * 4;
            if i + 2 < rgba.len() {
                rgb.put_pixel(x, y, Rgb([rgba[i], rgba[i + 1], rgba[i + 2]]));
            }
        }
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;
    use crate::room_tables::RoomTables;
    use crate::types::{EnhancementLevel, RoomType};
    use crate::view_planner::plan_views;

    fn view(rect: ViewRect, enhancement: EnhancementLevel) -> ViewDescriptor {
        ViewDescriptor {
            tag: "test".into(),
            rect,
            enhancement,
            weight: 1.0,
            max_results: 4,
        }
    }

    #[test]
    fn test_pixel_bounds_clamps() {
        let rect = ViewRect::new(-10.0, 5.4, 50.0, 200.0);
        assert_eq!(pixel_bounds(&rect, 30, 100), Some((0, 5, 30, 95)));
        // outside the frame still samples the nearest edge pixel
        assert_eq!(
            pixel_bounds(&ViewRect::new(40.0, 0.0, 10.0, 10.0), 30, 30),
            Some((29, 0, 1, 10))
        );
        assert_eq!(pixel_bounds(&ViewRect::full(4, 4), 0, 0), None);
    }

    #[test]
    fn test_pixel_bounds_covers_sub_pixel_cells() {
        // lower half of a one-pixel-high row
        assert_eq!(
            pixel_bounds(&ViewRect::new(1.0, 0.5, 4.0 / 3.0, 0.5), 4, 1),
            Some((1, 0, 2, 1))
        );
        assert_eq!(
            pixel_bounds(&ViewRect::new(0.0, 0.0, 0.2, 0.2), 8, 8),
            Some((0, 0, 1, 1))
        );
    }

    #[test]
    fn test_render_produces_square_canvas() {
        let image = RgbImage::from_pixel(64, 32, Rgb([120, 80, 40]));
        let renderer = CanvasRenderer::new(16);
        let canvas = renderer
            .render(&image, &view(ViewRect::full(64, 32), EnhancementLevel::Medium))
            .unwrap();
        assert_eq!(canvas.dimensions(), (16, 16));
    }

    #[test]
    fn test_render_empty_image_fails() {
        let image = RgbImage::new(0, 0);
        let renderer = CanvasRenderer::new(4);
        let err = renderer
            .render(&image, &view(ViewRect::full(0, 0), EnhancementLevel::Low))
            .unwrap_err();
        assert!(matches!(err, Error::RenderFailure { .. }));
    }

    #[test]
    fn test_every_planned_view_renders_on_tiny_images() {
        let tables = RoomTables::standard();
        let config = DetectorConfig::default();
        let renderer = CanvasRenderer::new(4);

        for (width, height, room) in [
            (2, 2, RoomType::Entrance),
            (4, 1, RoomType::Kitchen),
            (2, 1, RoomType::Kitchen),
            (1, 1, RoomType::Bathroom),
        ] {
            let image = RgbImage::new(width, height);
            for planned in plan_views(width, height, room, &tables, &config) {
                let canvas = renderer.render(&image, &planned).unwrap_or_else(|e| {
                    panic!("{width}x{height} {room} {}: {e}", planned.tag)
                });
                assert_eq!(canvas.dimensions(), (4, 4));
            }
        }
    }

    #[test]
    fn test_identity_profile_keeps_pixels() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb([10, 128, 250]));
        let identity = FilterProfile {
            contrast: 1.0,
            brightness: 1.0,
            saturation: 1.0,
            sharpen_sigma: None,
        };
        apply_color_filter(&mut image, &identity);
        assert_eq!(image.get_pixel(1, 1).0, [10, 128, 250]);
    }

    #[test]
    fn test_zero_saturation_is_gray() {
        let mut image = RgbImage::from_pixel(1, 1, Rgb([200, 30, 90]));
        let gray = FilterProfile {
            contrast: 1.0,
            brightness: 1.0,
            saturation: 0.0,
            sharpen_sigma: None,
        };
        apply_color_filter(&mut image, &gray);
        let [r, g, b] = image.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_contrast_spreads_values() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([64, 64, 64]));
        image.put_pixel(1, 0, Rgb([192, 192, 192]));
        apply_color_filter(&mut image, &EnhancementLevel::Edge.profile());
        assert!(image.get_pixel(0, 0).0[0] < 64);
        assert!(image.get_pixel(1, 0).0[0] > 192);
    }

    #[test]
    fn test_rgba_to_rgb() {
        let rgba = vec![255, 0, 0, 255, 0, 255, 0, 128];
        let rgb = rgba_to_rgb(&rgba, 2, 1);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 255, 0]);
    }
}
