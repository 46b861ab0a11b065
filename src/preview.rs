// Default thumbnail renderer: decode, downscale, auto-stretch, and half-block output for the terminal

use crate::error::{CullError, Result};
use image::imageops::FilterType;
use image::{GenericImageView, RgbImage};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};
use std::path::Path;

pub const MAX_IMAGE_WIDTH: u32 = 160;
/// Height is halved on screen because we render 2 pixels per terminal row using half-blocks
pub const MAX_IMAGE_HEIGHT: u32 = 100;

/// Shadows clipping point, in normalized MAD units below the median
const SHADOWS_CLIP: f64 = -2.8;
/// Where the median lands after stretching
const TARGET_BACKGROUND: f64 = 0.25;
/// Scales MAD to a standard-deviation estimate for normal data
const MAD_TO_SIGMA: f64 = 1.4826;

/// A rendered, display-ready frame
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: RgbImage,
    pub source_width: u32,
    pub source_height: u32,
}

impl Thumbnail {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Half-block lines fitting within `max_cols` x `max_rows` terminal cells
    pub fn to_halfblock_lines(&self, max_cols: u16, max_rows: u16) -> Vec<Line<'static>> {
        let (width, height) = calculate_resize_dimensions(
            self.width(),
            self.height(),
            u32::from(max_cols),
            u32::from(max_rows) * 2,
        );
        if width == 0 || height == 0 {
            return Vec::new();
        }
        image_to_halfblock_lines(&self.image, width, height)
    }
}

/// Renders `path` into a [`Thumbnail`].
///
/// Formats the `image` crate cannot decode (FITS, XISF) fail with a
/// [`CullError::Render`] for that path only.
pub fn render_thumbnail(path: &Path) -> Result<Thumbnail> {
    let img = image::open(path).map_err(|e| CullError::Render {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let (source_width, source_height) = img.dimensions();

    let (width, height) =
        calculate_resize_dimensions(source_width, source_height, MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT);
    if width == 0 || height == 0 {
        return Err(CullError::Render {
            path: path.to_path_buf(),
            reason: "image has no pixels".to_string(),
        });
    }

    let img = if (width, height) == (source_width, source_height) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };

    let mut image = img.to_rgb8();
    auto_stretch(&mut image);

    tracing::debug!(
        path = %path.display(),
        source_width,
        source_height,
        width,
        height,
        "thumbnail rendered"
    );

    Ok(Thumbnail {
        image,
        source_width,
        source_height,
    })
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;

    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        // Never upscale
        (original_width, original_height)
    } else {
        let new_width = (original_width as f64 * ratio) as u32;
        let new_height = (original_height as f64 * ratio) as u32;
        (new_width, new_height)
    }
}

/// Midtones transfer function: maps 0 to 0, 1 to 1 and `m` to 0.5
fn mtf(m: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    (m - 1.0) * x / ((2.0 * m - 1.0) * x - m)
}

fn histogram_median(histogram: &[u64; 256], count: u64) -> usize {
    let half = count.div_ceil(2);
    let mut seen = 0;
    for (value, &n) in histogram.iter().enumerate() {
        seen += n;
        if seen >= half {
            return value;
        }
    }
    255
}

/// Screen-transfer stretch over all channels together.
///
/// Clips shadows at median - 2.8 x MAD and places the median at the target
/// background. Flat images (zero MAD) are left as they are.
pub fn auto_stretch(image: &mut RgbImage) {
    let samples = image.as_raw();
    if samples.is_empty() {
        return;
    }
    let count = samples.len() as u64;

    let mut histogram = [0u64; 256];
    for &v in samples {
        histogram[v as usize] += 1;
    }
    let median = histogram_median(&histogram, count);

    let mut deviations = [0u64; 256];
    for (value, &n) in histogram.iter().enumerate() {
        deviations[value.abs_diff(median)] += n;
    }
    let mad = histogram_median(&deviations, count);
    if mad == 0 {
        return;
    }

    let median_norm = median as f64 / 255.0;
    let sigma = mad as f64 / 255.0 * MAD_TO_SIGMA;
    let shadows = (median_norm + SHADOWS_CLIP * sigma).clamp(0.0, 1.0);
    if shadows >= 1.0 {
        return;
    }
    let normalized_median = (median_norm - shadows) / (1.0 - shadows);
    if normalized_median <= 0.0 || normalized_median >= 1.0 {
        return;
    }
    let midtones = mtf(TARGET_BACKGROUND, normalized_median);

    let mut table = [0u8; 256];
    for (value, slot) in table.iter_mut().enumerate() {
        let x = ((value as f64 / 255.0 - shadows) / (1.0 - shadows)).clamp(0.0, 1.0);
        *slot = (mtf(midtones, x) * 255.0).round() as u8;
    }

    for v in image.iter_mut() {
        *v = table[*v as usize];
    }
}

/// Converts an image to styled lines using half-block characters for terminal display.
/// Uses the upper half block character (▀) with foreground color for the upper pixel
/// and background color for the lower pixel, effectively displaying 2 pixels per cell.
pub fn image_to_halfblock_lines(img: &RgbImage, width: u32, height: u32) -> Vec<Line<'static>> {
    // Ensure height is even for proper half-block rendering
    let height = if height.is_multiple_of(2) {
        height
    } else {
        height + 1
    };

    let img = image::imageops::resize(img, width, height, FilterType::Triangle);

    let term_height = height / 2;
    let mut lines = Vec::with_capacity(term_height as usize);

    for y in 0..term_height {
        let upper_y = y * 2;
        let lower_y = upper_y + 1;

        let mut spans = Vec::with_capacity(width as usize);

        for x in 0..width {
            let upper = img.get_pixel(x, upper_y);
            let lower = if lower_y < height {
                img.get_pixel(x, lower_y)
            } else {
                upper
            };

            let style = Style::default()
                .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                .bg(Color::Rgb(lower[0], lower[1], lower[2]));

            spans.push(Span::styled("▀", style));
        }

        lines.push(Line::from(spans));
    }

    lines
}
