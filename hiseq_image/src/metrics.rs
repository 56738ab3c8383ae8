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

//! reference based (original vs. enhanced) quality metrics.
//!
//! All functions operate on the intensity channel, color input is converted with the BT.601 luma
//! formula (see [`to_intensity`]). Pairs have to agree in width, height and channel count.

use image::{DynamicImage, GrayImage};
use ndarray::Array2;
use serde::{Serialize,Deserialize};
use hiseq_common::{log2, log10, pow2, sqrt};

use crate::{
    check_equal_shape, check_equal_dimensions, check_not_empty, to_intensity, Stats,
    errors::Result, histogram::Histogram, tile_grid::{TileData, TileGrid, TileGridSize}
};

pub const MAX_INTENSITY: f64 = 255.0;

/// PSNR value for identical images (MSE == 0)
pub const PSNR_IDENTICAL: f64 = f64::INFINITY;

/// side length of the uniform SSIM window
pub const SSIM_WINDOW: u32 = 7;
pub const SSIM_K1: f64 = 0.01;
pub const SSIM_K2: f64 = 0.03;

/* #region reference based metrics ******************************************************/

fn checked_pair (original: &DynamicImage, enhanced: &DynamicImage)->Result<(GrayImage,GrayImage)> {
    check_not_empty( original, "original")?;
    check_not_empty( enhanced, "enhanced")?;
    check_equal_shape( original, enhanced)?;
    Ok( (to_intensity( original), to_intensity( enhanced)) )
}

pub fn gray_mse (a: &GrayImage, b: &GrayImage)->Result<f64> {
    check_not_empty( a, "first image")?;
    check_equal_dimensions( a, b)?;

    let n = a.len() as f64;
    let sum: f64 = a.as_raw().iter().zip( b.as_raw().iter())
        .map(|(&x,&y)| pow2( x as f64 - y as f64))
        .sum();
    Ok( sum / n )
}

pub fn mse (original: &DynamicImage, enhanced: &DynamicImage)->Result<f64> {
    let (a,b) = checked_pair( original, enhanced)?;
    gray_mse( &a, &b)
}

/// `10 log10(255² / MSE)`, [`PSNR_IDENTICAL`] if the channels are identical
pub fn gray_psnr (a: &GrayImage, b: &GrayImage)->Result<f64> {
    let mse = gray_mse( a, b)?;
    if mse == 0.0 {
        Ok( PSNR_IDENTICAL )
    } else {
        Ok( 10.0 * log10( pow2(MAX_INTENSITY) / mse) )
    }
}

pub fn psnr (original: &DynamicImage, enhanced: &DynamicImage)->Result<f64> {
    let (a,b) = checked_pair( original, enhanced)?;
    gray_psnr( &a, &b)
}

/// summed area table with a leading row/column of zeros
fn integral (img: &GrayImage, f: impl Fn(f64)->f64)->Array2<f64> {
    let (w,h) = img.dimensions();
    let (w,h) = (w as usize, h as usize);
    let mut sat = Array2::<f64>::zeros( (h+1, w+1));

    for y in 0..h {
        let mut row_sum = 0.0;
        for x in 0..w {
            row_sum += f( img.get_pixel( x as u32, y as u32).0[0] as f64);
            sat[[y+1, x+1]] = sat[[y, x+1]] + row_sum;
        }
    }
    sat
}

fn integral_product (a: &GrayImage, b: &GrayImage)->Array2<f64> {
    let (w,h) = a.dimensions();
    let (w,h) = (w as usize, h as usize);
    let mut sat = Array2::<f64>::zeros( (h+1, w+1));

    for y in 0..h {
        let mut row_sum = 0.0;
        for x in 0..w {
            row_sum += a.get_pixel( x as u32, y as u32).0[0] as f64 * b.get_pixel( x as u32, y as u32).0[0] as f64;
            sat[[y+1, x+1]] = sat[[y, x+1]] + row_sum;
        }
    }
    sat
}

#[inline]
fn window_sum (sat: &Array2<f64>, x: usize, y: usize, ww: usize, wh: usize)->f64 {
    sat[[y+wh, x+ww]] - sat[[y, x+ww]] - sat[[y+wh, x]] + sat[[y, x]]
}

/// mean SSIM over all fully contained `SSIM_WINDOW x SSIM_WINDOW` uniform windows, using sample
/// (N-1) variances and the stabilizing constants `C1 = (K1*255)²` and `C2 = (K2*255)²`.
/// Channels that are smaller than the window along an axis use their full extent on that axis.
/// Identical channels yield exactly 1.0
pub fn gray_ssim (a: &GrayImage, b: &GrayImage)->Result<f64> {
    check_not_empty( a, "first image")?;
    check_equal_dimensions( a, b)?;

    let (w,h) = a.dimensions();
    let ww = SSIM_WINDOW.min(w) as usize;
    let wh = SSIM_WINDOW.min(h) as usize;
    let n = (ww * wh) as f64;
    let cov_norm = if n > 1.0 { 1.0 / (n - 1.0) } else { 0.0 };

    let c1 = pow2( SSIM_K1 * MAX_INTENSITY);
    let c2 = pow2( SSIM_K2 * MAX_INTENSITY);

    let sa = integral( a, |v| v);
    let sb = integral( b, |v| v);
    let saa = integral( a, |v| v*v);
    let sbb = integral( b, |v| v*v);
    let sab = integral_product( a, b);

    let nx = w as usize - ww + 1;
    let ny = h as usize - wh + 1;
    let mut sum = 0.0;

    for y in 0..ny {
        for x in 0..nx {
            let sum_a = window_sum( &sa, x, y, ww, wh);
            let sum_b = window_sum( &sb, x, y, ww, wh);

            let mu_a = sum_a / n;
            let mu_b = sum_b / n;
            let var_a = (window_sum( &saa, x, y, ww, wh) - sum_a * sum_a / n) * cov_norm;
            let var_b = (window_sum( &sbb, x, y, ww, wh) - sum_b * sum_b / n) * cov_norm;
            let cov = (window_sum( &sab, x, y, ww, wh) - sum_a * sum_b / n) * cov_norm;

            let num = (2.0 * mu_a * mu_b + c1) * (2.0 * cov + c2);
            let den = (mu_a * mu_a + mu_b * mu_b + c1) * (var_a + var_b + c2);
            sum += num / den;
        }
    }

    Ok( sum / (nx * ny) as f64 )
}

pub fn ssim (original: &DynamicImage, enhanced: &DynamicImage)->Result<f64> {
    let (a,b) = checked_pair( original, enhanced)?;
    gray_ssim( &a, &b)
}

/// enhanced minus original mean intensity
pub fn brightness_delta (original: &DynamicImage, enhanced: &DynamicImage)->Result<f64> {
    let (a,b) = checked_pair( original, enhanced)?;
    Ok( gray_brightness( &b) - gray_brightness( &a) )
}

/* #endregion reference based metrics */

/* #region single image statistics ******************************************************/

/// Shannon entropy in bits `-Σ p log2(p)` over the non-zero bins, 0 for empty or single valued histograms
pub fn histogram_entropy (hist: &Histogram)->f64 {
    if hist.is_empty() { return 0.0 }

    let h: f64 = hist.probabilities().iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * log2(p))
        .sum();
    h.max(0.0) // avoid -0.0
}

pub fn gray_entropy (img: &GrayImage)->f64 {
    histogram_entropy( &Histogram::from_gray( img))
}

pub fn entropy (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "entropy input")?;
    Ok( gray_entropy( &to_intensity( img)) )
}

fn intensity_stats (img: &GrayImage)->Stats<u8> {
    Stats::from_values( img.as_raw().iter().copied())
}

pub fn gray_brightness (img: &GrayImage)->f64 {
    intensity_stats( img).mean
}

/// population standard deviation of intensities
pub fn gray_rms_contrast (img: &GrayImage)->f64 {
    intensity_stats( img).std_dev()
}

pub fn brightness (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "brightness input")?;
    Ok( gray_brightness( &to_intensity( img)) )
}

pub fn rms_contrast (img: &DynamicImage)->Result<f64> {
    check_not_empty( img, "contrast input")?;
    Ok( gray_rms_contrast( &to_intensity( img)) )
}

/// per tile entropy map, e.g. to see where CLAHE had room to stretch
pub fn tile_entropies (img: &GrayImage, grid_size: TileGridSize)->Result<TileData<f64>> {
    let (w,h) = img.dimensions();
    let grid = TileGrid::new( w, h, grid_size)?;

    Ok( TileData::from_fn( grid.cols(), grid.rows(), |col,row| {
        let t = grid.tile( row, col);
        histogram_entropy( &Histogram::from_region( img, t.x, t.y, t.width, t.height))
    }))
}

/* #endregion single image statistics */

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct QuantitativeMetrics {
    pub psnr: f64,
    pub ssim: f64,
    pub entropy: f64,
    pub rms_contrast: f64,
    pub brightness: f64,
    pub brightness_delta: f64,
}

impl QuantitativeMetrics {
    /// all reference based metrics of `enhanced` with respect to `original`
    pub fn compute (original: &DynamicImage, enhanced: &DynamicImage)->Result<Self> {
        let (a,b) = checked_pair( original, enhanced)?;
        let stats_a = intensity_stats( &a);
        let stats_b = intensity_stats( &b);

        Ok( QuantitativeMetrics {
            psnr: gray_psnr( &a, &b)?,
            ssim: gray_ssim( &a, &b)?,
            entropy: gray_entropy( &b),
            rms_contrast: sqrt( stats_b.variance),
            brightness: stats_b.mean,
            brightness_delta: stats_b.mean - stats_a.mean,
        })
    }
}
