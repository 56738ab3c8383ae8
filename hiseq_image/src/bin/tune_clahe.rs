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

use anyhow::{Result,anyhow};
use tracing_subscriber::EnvFilter;

use hiseq_common::{define_cli, check_cli};
use hiseq_image::{
    clahe_parameter_sweep, open_8bit, to_intensity, ColorSpace, TileGridSize, DEFAULT_SWEEP_CLIP_LIMITS, DEFAULT_SWEEP_GRIDS,
    metrics::{gray_entropy, gray_psnr, gray_rms_contrast, tile_entropies}
};

define_cli! { ARGS [about="run CLAHE over a range of clip limits and tile grids and print the resulting metrics"] =
    color_space: String [help="color space for color images (YCrCb, HSV, LAB)", long, default_value="LAB"],
    clip_limits: Vec<f32> [help="clip limits to try (default 1,2,3,4)", long, value_delimiter=','],
    grids: Vec<String> [help="tile grids to try (default 4x4,8x8,16x16)", long, value_delimiter=','],
    tile_map: bool [help="print the per tile entropy map of the original for each grid", long],
    save_dir: Option<String> [help="optional directory to store the enhanced images", long],
    input: String [help="input image"]
}

fn main()->Result<()> {
    check_cli!(ARGS);
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).try_init().map_err(|e| anyhow!("{e}"))?;

    let color_space = ColorSpace::from_name( &ARGS.color_space)?;
    let clip_limits: Vec<f32> = if ARGS.clip_limits.is_empty() { DEFAULT_SWEEP_CLIP_LIMITS.to_vec() } else { ARGS.clip_limits.clone() };
    let grids: Vec<TileGridSize> = if ARGS.grids.is_empty() {
        DEFAULT_SWEEP_GRIDS.to_vec()
    } else {
        ARGS.grids.iter().map(|s| s.parse::<TileGridSize>()).collect::<hiseq_image::Result<Vec<_>>>()?
    };

    let original = open_8bit( &ARGS.input)?;
    let orig_gray = to_intensity( &original);

    if ARGS.tile_map {
        for grid in &grids {
            let entropies = tile_entropies( &orig_gray, *grid)?;
            let stats = entropies.stats();
            println!("tile entropies {grid} (min {:.2}, max {:.2}, mean {:.2}):", stats.min, stats.max, stats.mean);
            entropies.print( 6, 2);
        }
    }

    if let Some(dir) = &ARGS.save_dir {
        hiseq_common::fs::ensure_writable_dir( dir)?;
    }

    println!("original: entropy {:.4}, contrast {:.2}", gray_entropy( &orig_gray), gray_rms_contrast( &orig_gray));
    println!("{:<24} {:>10} {:>10} {:>10}", "setting", "entropy", "contrast", "PSNR");
    println!("{}", "-".repeat(57));

    for entry in clahe_parameter_sweep( &original, &clip_limits, &grids, color_space)? {
        let gray = to_intensity( &entry.image);
        println!("{:<24} {:>10.4} {:>10.2} {:>10.2}", entry.key(), gray_entropy( &gray), gray_rms_contrast( &gray), gray_psnr( &orig_gray, &gray)?);

        if let Some(dir) = &ARGS.save_dir {
            entry.image.save( std::path::Path::new(dir).join( format!("{}.png", entry.key())))?;
        }
    }

    Ok(())
}
