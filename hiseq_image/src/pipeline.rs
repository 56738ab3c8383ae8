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

use std::path::Path;
use image::{DynamicImage, GrayImage};
use serde::{Serialize,Deserialize};
use strum::{Display,EnumIter,EnumString};
use tracing::{debug,trace};
use hiseq_common::config::load_ron_config;

use crate::{
    errors::{Result,HiseqImageError},
    color::{ColorSpace, decompose, recompose},
    ghe::equalize,
    clahe::{equalize_adaptive, DEFAULT_CLIP_LIMIT},
    qualitative::OverEnhancementThresholds,
    tile_grid::TileGridSize,
};

pub const DEFAULT_SWEEP_CLIP_LIMITS: [f32; 4] = [1.0, 2.0, 3.0, 4.0];
pub const DEFAULT_SWEEP_GRIDS: [TileGridSize; 3] = [TileGridSize::square(4), TileGridSize::square(8), TileGridSize::square(16)];

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize,Display,EnumString,EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    #[strum(to_string="GHE")]
    #[serde(rename="GHE", alias="ghe")]
    Ghe,

    #[strum(to_string="CLAHE")]
    #[serde(rename="CLAHE", alias="clahe")]
    Clahe,
}

/// enhancement parameters. All fields are optional in a RON config file, e.g.
/// `EnhanceConfig( method: GHE, color_space: HSV )`
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    pub method: Method,
    pub color_space: ColorSpace,
    pub tile_grid: TileGridSize,
    pub clip_limit: f32,
    pub thresholds: OverEnhancementThresholds,
}

impl Default for EnhanceConfig {
    fn default()->Self {
        EnhanceConfig {
            method: Method::Clahe,
            color_space: ColorSpace::Lab,
            tile_grid: TileGridSize::default(),
            clip_limit: DEFAULT_CLIP_LIMIT,
            thresholds: OverEnhancementThresholds::default(),
        }
    }
}

impl EnhanceConfig {
    pub fn with_method (&self, method: Method)->Self {
        EnhanceConfig { method, ..self.clone() }
    }

    pub fn load<P: AsRef<Path>> (path: P)->Result<Self> {
        let config: EnhanceConfig = load_ron_config( path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate (&self)->Result<()> {
        self.tile_grid.validate()?;
        if !(self.clip_limit.is_finite() && self.clip_limit > 0.0) {
            return Err( HiseqImageError::InvalidConfiguration(format!("clip limit has to be positive, got {}", self.clip_limit)))
        }
        Ok(())
    }
}

/// run the configured engine on an intensity channel
pub fn enhance_intensity (intensity: &GrayImage, config: &EnhanceConfig)->Result<GrayImage> {
    match config.method {
        Method::Ghe => equalize( intensity),
        Method::Clahe => equalize_adaptive( intensity, config.tile_grid, config.clip_limit)
    }
}

/// decompose, enhance the intensity channel and recompose. The result is 8 bit with the channel
/// count of the input, i.e. grayscale stays grayscale and an alpha channel is passed through unchanged
pub fn enhance (img: &DynamicImage, config: &EnhanceConfig)->Result<DynamicImage> {
    config.validate()?;

    let parts = decompose( img, config.color_space)?;
    debug!("enhancing {}x{} {} image with {} in {}", img.width(), img.height(),
           if parts.is_grayscale() {"grayscale"} else {"color"}, config.method, config.color_space);

    let enhanced = enhance_intensity( &parts.intensity, config)?;
    let recomposed = recompose( &enhanced, parts.side.as_ref(), config.color_space)?;
    Ok( with_alpha_of( img, recomposed) )
}

/// re-attach the alpha channel of `original` (if any) to the Luma8/Rgb8 `enhanced` image
fn with_alpha_of (original: &DynamicImage, enhanced: DynamicImage)->DynamicImage {
    if !original.color().has_alpha() {
        return enhanced
    }

    if original.color().has_color() {
        let alpha = original.to_rgba8();
        let mut out = enhanced.to_rgba8();
        for (p,a) in out.pixels_mut().zip( alpha.pixels()) {
            p.0[3] = a.0[3];
        }
        DynamicImage::ImageRgba8( out)
    } else {
        let alpha = original.to_luma_alpha8();
        let mut out = enhanced.to_luma_alpha8();
        for (p,a) in out.pixels_mut().zip( alpha.pixels()) {
            p.0[1] = a.0[1];
        }
        DynamicImage::ImageLumaA8( out)
    }
}

/// open an image file and convert it into one of the two pipeline layouts (Luma8 or Rgb8)
pub fn open_8bit<P: AsRef<Path>> (path: P)->Result<DynamicImage> {
    Ok( to_8bit( image::open( path)?) )
}

pub fn to_8bit (img: DynamicImage)->DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        _ if img.color().has_color() => DynamicImage::ImageRgb8( img.to_rgb8()),
        _ => DynamicImage::ImageLuma8( img.to_luma8())
    }
}

/// read `in_path`, enhance it and save the result to `out_path`. Returns (original, enhanced)
pub fn enhance_file<P,Q> (in_path: P, out_path: Q, config: &EnhanceConfig)->Result<(DynamicImage,DynamicImage)>
    where P: AsRef<Path>, Q: AsRef<Path>
{
    let original = open_8bit( in_path)?;
    let enhanced = enhance( &original, config)?;
    enhanced.save( out_path)?;
    Ok( (original, enhanced) )
}

/* #region parameter sweep ***************************************************************/

pub struct SweepEntry {
    pub clip_limit: f32,
    pub grid: TileGridSize,
    pub image: DynamicImage,
}

impl SweepEntry {
    pub fn key (&self)->String {
        format!("clip_{}_tile_{}", self.clip_limit, self.grid)
    }
}

/// CLAHE result for every (clip limit, grid) combination, in clip limit major order.
/// The image is only decomposed once
pub fn clahe_parameter_sweep (img: &DynamicImage, clip_limits: &[f32], grids: &[TileGridSize], color_space: ColorSpace)->Result<Vec<SweepEntry>> {
    let parts = decompose( img, color_space)?;
    let mut entries = Vec::with_capacity( clip_limits.len() * grids.len());

    for &clip_limit in clip_limits {
        for &grid in grids {
            let enhanced = equalize_adaptive( &parts.intensity, grid, clip_limit)?;
            let image = with_alpha_of( img, recompose( &enhanced, parts.side.as_ref(), color_space)?);
            trace!("sweep entry clip={clip_limit} grid={grid}");
            entries.push( SweepEntry{ clip_limit, grid, image });
        }
    }

    Ok(entries)
}

/* #endregion parameter sweep */
