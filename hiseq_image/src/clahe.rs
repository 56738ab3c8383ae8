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

//! contrast limited adaptive histogram equalization.
//!
//! The channel is partitioned into a [`TileGrid`]. Each tile gets its own equalization lookup
//! table computed from a clipped histogram (bins are capped at `clip_limit * tile_pixels / 256`
//! and the excess is spread over all bins). Output pixels are a bilinear blend of the lookup
//! values of the (up to) four tiles whose centers surround the pixel. Pixels outside the outermost
//! tile centers fold the missing side onto the nearest tile.

use image::{GrayImage, Luma};
use tracing::debug;
use hiseq_common::quantize_u8;

use crate::{
    check_not_empty,
    errors::{Result,HiseqImageError},
    histogram::{Cdf, Histogram, HISTOGRAM_BINS},
    tile_grid::{Tile, TileData, TileGrid, TileGridSize}
};

pub const DEFAULT_CLIP_LIMIT: f32 = 2.0;

pub type Lut = [u8; HISTOGRAM_BINS];

fn check_clip_limit (clip_limit: f32)->Result<()> {
    if clip_limit.is_finite() && clip_limit > 0.0 {
        Ok(())
    } else {
        Err( HiseqImageError::InvalidConfiguration(format!("clip limit has to be positive, got {clip_limit}")))
    }
}

fn identity_lut ()->Lut {
    let mut lut = [0u8; HISTOGRAM_BINS];
    for (i,l) in lut.iter_mut().enumerate() { *l = i as u8 }
    lut
}

fn tile_lut (img: &GrayImage, tile: &Tile, clip_limit: f32)->Lut {
    let hist = Histogram::from_region( img, tile.x, tile.y, tile.width, tile.height);

    if let Some(v) = hist.single_value() {
        debug!("tile ({},{}) has single value {v}, using identity", tile.col, tile.row);
        identity_lut()
    } else {
        Cdf::from_bins( &hist.clipped( clip_limit)).lut()
    }
}

/// the tile grid and per tile lookup tables (indexed by (col,row)) that [`equalize_adaptive`] blends
pub fn clahe_luts (img: &GrayImage, grid_size: TileGridSize, clip_limit: f32)->Result<(TileGrid,TileData<Lut>)> {
    check_not_empty( img, "CLAHE input")?;
    check_clip_limit( clip_limit)?;

    let (w,h) = img.dimensions();
    let grid = TileGrid::new( w, h, grid_size)?;
    if grid.size != grid_size {
        debug!("tile grid {grid_size} reduced to {} for {w}x{h} image", grid.size);
    }

    let luts = TileData::from_fn( grid.cols(), grid.rows(), |col,row| tile_lut( img, &grid.tile(row,col), clip_limit));
    Ok( (grid, luts) )
}

/// per-axis interpolation entry: lower tile index, upper tile index, weight of the upper tile
#[derive(Debug,Clone,Copy)]
struct AxisWeight {
    lo: usize,
    hi: usize,
    w: f64,
}

fn axis_weights (extent: u32, centers: &[f64])->Vec<AxisWeight> {
    let n = centers.len();
    let first = centers[0];
    let last = centers[n-1];
    let mut i = 0;

    (0..extent).map( |p| {
        let p = p as f64;
        if p <= first {
            AxisWeight{ lo: 0, hi: 0, w: 0.0 }
        } else if p >= last {
            AxisWeight{ lo: n-1, hi: n-1, w: 0.0 }
        } else {
            while centers[i+1] <= p { i += 1 }
            let w = (p - centers[i]) / (centers[i+1] - centers[i]);
            AxisWeight{ lo: i, hi: i+1, w }
        }
    }).collect()
}

pub fn equalize_adaptive (img: &GrayImage, grid_size: TileGridSize, clip_limit: f32)->Result<GrayImage> {
    let (grid, luts) = clahe_luts( img, grid_size, clip_limit)?;
    let (w,h) = img.dimensions();

    let col_centers: Vec<f64> = (0..grid.cols()).map(|col| grid.tile(0,col).center().0).collect();
    let row_centers: Vec<f64> = (0..grid.rows()).map(|row| grid.tile(row,0).center().1).collect();
    let xw = axis_weights( w, &col_centers);
    let yw = axis_weights( h, &row_centers);

    let mut out = GrayImage::new( w, h);
    for (y, yi) in yw.iter().enumerate() {
        for (x, xi) in xw.iter().enumerate() {
            let v = img.get_pixel( x as u32, y as u32).0[0] as usize;

            let top = (1.0 - xi.w) * luts.get(xi.lo, yi.lo)[v] as f64 + xi.w * luts.get(xi.hi, yi.lo)[v] as f64;
            let bottom = (1.0 - xi.w) * luts.get(xi.lo, yi.hi)[v] as f64 + xi.w * luts.get(xi.hi, yi.hi)[v] as f64;
            let blended = (1.0 - yi.w) * top + yi.w * bottom;

            out.put_pixel( x as u32, y as u32, Luma([quantize_u8( blended)]));
        }
    }

    Ok(out)
}
