/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! no-reference (perceptual) quality indicators

use image::{DynamicImage, GrayImage};
use imageproc::{filter::laplacian_filter, gradients::{horizontal_sobel, vertical_sobel}};
use serde::{Serialize,Deserialize};
use hiseq_common::{abs, pow2, sqrt};

use crate::{
    check_equal_shape, check_not_empty, to_intensity, Stats,
    errors::{Result,HiseqImageError},
    histogram::{Histogram, HISTOGRAM_BINS},
    metrics::{gray_brightness, gray_rms_contrast, histogram_entropy},
    tile_grid::TileGrid,
};

pub const DEFAULT_BLOCK_SIZE: u32 = 8;

/// mean boundary step that maps to a blocking score of 1
const BLOCKING_NORM: f64 = 20.0;

/* #region single image indicators *******************************************************/

/// variance of the 3x3 Laplacian of the intensity channel
pub fn sharpness (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "sharpness input")?;
    Ok( gray_sharpness( &to_intensity( img)) )
}

pub fn gray_sharpness (img: &GrayImage)->f64 {
    let lap = laplacian_filter( img);
    let mut stats: Stats<f64> = Stats::new();
    for p in lap.pixels() {
        stats.add( p.0[0] as f64);
    }
    stats.variance
}

/// histogram shape score in [0,1]:
/// `0.4 min(H/8,1) + 0.3 (1 - mean|p - box5(p)|) + 0.3 min(σ/64,1)` with `p` being the normalized
/// histogram, `box5` a zero padded 5 bin moving average and `σ` the intensity standard deviation
pub fn naturalness (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "naturalness input")?;
    Ok( gray_naturalness( &to_intensity( img)) )
}

pub fn gray_naturalness (img: &GrayImage)->f64 {
    let hist = Histogram::from_gray( img);
    let p = hist.probabilities();

    let entropy_score = (histogram_entropy( &hist) / 8.0).min(1.0);

    let mut dev = 0.0;
    for i in 0..HISTOGRAM_BINS {
        let lo = i.saturating_sub(2);
        let hi = (i+2).min(HISTOGRAM_BINS-1);
        let smooth: f64 = p[lo..=hi].iter().sum::<f64>() / 5.0;
        dev += abs( p[i] - smooth);
    }
    let smoothness = 1.0 - dev / HISTOGRAM_BINS as f64;

    let contrast_score = (gray_rms_contrast( img) / 64.0).min(1.0);

    (0.4 * entropy_score + 0.3 * smoothness + 0.3 * contrast_score).clamp(0.0, 1.0)
}

/// Hasler-Süsstrunk colorfulness `sqrt(σrg² + σyb²) + 0.3 sqrt(μrg² + μyb²)` with the opponent
/// channels `rg = R-G` and `yb = (R+G)/2 - B`. Grayscale images have colorfulness 0
pub fn colorfulness (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "colorfulness input")?;
    if img.color().channel_count() < 3 {
        return Ok(0.0)
    }

    let rgb = img.to_rgb8();
    let mut rg: Stats<f64> = Stats::new();
    let mut yb: Stats<f64> = Stats::new();

    for p in rgb.pixels() {
        let [r,g,b] = p.0.map(|c| c as f64);
        rg.add( r - g);
        yb.add( 0.5 * (r + g) - b);
    }

    let std_root = sqrt( rg.variance + yb.variance);
    let mean_root = sqrt( pow2(rg.mean) + pow2(yb.mean));
    Ok( std_root + 0.3 * mean_root )
}

/* #endregion single image indicators */

/* #region blocking artifacts ************************************************************/

fn row_step (img: &GrayImage, y: u32)->f64 {
    let w = img.width();
    let sum: f64 = (0..w).map(|x| abs( img.get_pixel(x,y).0[0] as f64 - img.get_pixel(x,y-1).0[0] as f64)).sum();
    sum / w as f64
}

fn col_step (img: &GrayImage, x: u32)->f64 {
    let h = img.height();
    let sum: f64 = (0..h).map(|y| abs( img.get_pixel(x,y).0[0] as f64 - img.get_pixel(x-1,y).0[0] as f64)).sum();
    sum / h as f64
}

fn boundary_score<I,J> (img: &GrayImage, row_boundaries: I, col_boundaries: J)->f64
    where I: IntoIterator<Item=u32>, J: IntoIterator<Item=u32>
{
    let (w,h) = img.dimensions();
    let mut sum = 0.0;
    let mut count = 0;

    for y in row_boundaries.into_iter().filter(|&y| y > 0 && y < h-1) {
        sum += row_step( img, y);
        count += 1;
    }
    for x in col_boundaries.into_iter().filter(|&x| x > 0 && x < w-1) {
        sum += col_step( img, x);
        count += 1;
    }

    if count > 0 { sum /= count as f64 }
    (sum / BLOCKING_NORM).min(1.0)
}

/// blocking score in [0,1]: mean absolute intensity step across all row/column boundaries at
/// multiples of `block_size`, normalized by 20 and capped at 1. Images without interior
/// boundaries score 0
pub fn blocking_artifacts (img: &DynamicImage, block_size: u32)->Result<f64> {
    check_not_empty( img, "blocking input")?;
    if block_size == 0 {
        return Err( HiseqImageError::InvalidConfiguration("block size has to be positive".into()))
    }

    let gray = to_intensity( img);
    let (w,h) = gray.dimensions();
    Ok( boundary_score( &gray, (block_size..h).step_by(block_size as usize), (block_size..w).step_by(block_size as usize)) )
}

/// blocking score sampled at the tile boundaries of a CLAHE tile grid instead of fixed blocks
pub fn tile_grid_blocking_artifacts (img: &DynamicImage, grid: &TileGrid)->Result<f64> {
    check_not_empty( img, "blocking input")?;

    let gray = to_intensity( img);
    if gray.dimensions() != (grid.width, grid.height) {
        return Err( HiseqImageError::ShapeMismatch(format!("tile grid {}x{} does not match image {:?}", grid.width, grid.height, gray.dimensions())))
    }

    let rows = grid.row_offsets();
    let cols = grid.col_offsets();
    Ok( boundary_score( &gray, rows[1..rows.len()-1].iter().copied(), cols[1..cols.len()-1].iter().copied()) )
}

/// ratio of the mean step across block boundaries to the mean step between all other adjacent
/// rows/columns. Values well above 1 indicate visible block edges, 1.0 if there are no steps at all
pub fn blocking_ratio (img: &DynamicImage, block_size: u32)->Result<f64> {
    check_not_empty( img, "blocking input")?;
    if block_size == 0 {
        return Err( HiseqImageError::InvalidConfiguration("block size has to be positive".into()))
    }

    let gray = to_intensity( img);
    let (w,h) = gray.dimensions();
    let mut boundary: Stats<f64> = Stats::new();
    let mut interior: Stats<f64> = Stats::new();

    for y in 1..h {
        let s = row_step( &gray, y);
        if y % block_size == 0 { boundary.add(s) } else { interior.add(s) }
    }
    for x in 1..w {
        let s = col_step( &gray, x);
        if x % block_size == 0 { boundary.add(s) } else { interior.add(s) }
    }

    let b = if boundary.n > 0 { boundary.mean } else { 0.0 };
    let i = if interior.n > 0 { interior.mean } else { 0.0 };
    Ok( hiseq_common::safe_ratio( b, i) )
}

/* #endregion blocking artifacts */

/* #region over-enhancement **************************************************************/

/// limits above which an enhancement is considered implausible
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct OverEnhancementThresholds {
    /// max |Δ brightness| / original brightness
    pub max_brightness_change: f64,
    /// max (enhanced - original) / original RMS contrast
    pub max_contrast_change: f64,
    /// max fraction of saturated pixels
    pub max_saturation_ratio: f64,
    /// intensities <= this count as saturated (dark end)
    pub low_saturation: u8,
    /// intensities >= this count as saturated (bright end)
    pub high_saturation: u8,
}

impl Default for OverEnhancementThresholds {
    fn default()->Self {
        OverEnhancementThresholds {
            max_brightness_change: 0.3,
            max_contrast_change: 2.0,
            max_saturation_ratio: 0.05,
            low_saturation: 5,
            high_saturation: 250,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct OverEnhancement {
    pub brightness_change_ratio: f64,
    pub contrast_change_ratio: f64,
    pub saturation_ratio: f64,
    /// mean Sobel gradient magnitude of the enhanced intensity
    pub edge_strength: f64,
    pub is_over_enhanced: bool,
}

fn saturation_ratio (img: &GrayImage, thresholds: &OverEnhancementThresholds)->f64 {
    let n = img.as_raw().iter().filter(|&&v| v <= thresholds.low_saturation || v >= thresholds.high_saturation).count();
    n as f64 / img.len() as f64
}

fn edge_strength (img: &GrayImage)->f64 {
    let gx = horizontal_sobel( img);
    let gy = vertical_sobel( img);

    let sum: f64 = gx.pixels().zip( gy.pixels())
        .map(|(x,y)| sqrt( pow2(x.0[0] as f64) + pow2(y.0[0] as f64)))
        .sum();
    sum / img.len() as f64
}

pub fn detect_over_enhancement (original: &DynamicImage, enhanced: &DynamicImage, thresholds: &OverEnhancementThresholds)->Result<OverEnhancement> {
    check_not_empty( original, "original")?;
    check_equal_shape( original, enhanced)?;

    let orig = to_intensity( original);
    let enh = to_intensity( enhanced);

    let bo = gray_brightness( &orig);
    let be = gray_brightness( &enh);
    let brightness_change_ratio = if bo > 0.0 {
        abs(be - bo) / bo
    } else if be == bo {
        0.0
    } else {
        f64::INFINITY
    };

    let co = gray_rms_contrast( &orig);
    let ce = gray_rms_contrast( &enh);
    let contrast_change_ratio = if co > 0.0 { (ce - co) / co } else { 0.0 };

    let saturation_ratio = saturation_ratio( &enh, thresholds);
    let edge_strength = edge_strength( &enh);

    let is_over_enhanced = brightness_change_ratio > thresholds.max_brightness_change
        || contrast_change_ratio > thresholds.max_contrast_change
        || saturation_ratio > thresholds.max_saturation_ratio;

    Ok( OverEnhancement { brightness_change_ratio, contrast_change_ratio, saturation_ratio, edge_strength, is_over_enhanced } )
}

/* #endregion over-enhancement */

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct QualitativeMetrics {
    pub sharpness: f64,
    pub naturalness: f64,
    pub colorfulness: f64,
    pub blocking_artifacts: f64,
}

impl QualitativeMetrics {
    pub fn compute (img: &DynamicImage)->Result<Self> {
        check_not_empty( img, "qualitative input")?;
        let gray = to_intensity( img);

        Ok( QualitativeMetrics {
            sharpness: gray_sharpness( &gray),
            naturalness: gray_naturalness( &gray),
            colorfulness: colorfulness( img)?,
            blocking_artifacts: blocking_artifacts( img, DEFAULT_BLOCK_SIZE)?,
        })
    }
}
