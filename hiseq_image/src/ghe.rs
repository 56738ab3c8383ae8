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

//! global histogram equalization of a single 8-bit intensity channel

use image::GrayImage;
use tracing::debug;

use crate::{check_not_empty, errors::Result, histogram::{Cdf, Histogram, HISTOGRAM_BINS, apply_lut}};

/// the GHE lookup table for `img`:
/// `lut[v] = round((cdf[v] - cdf_min) * 255 / (N - cdf_min))`
///
/// the table is non-decreasing. If `img` only has one distinct intensity the table is the identity
pub fn equalization_lut (img: &GrayImage)->Result<[u8; HISTOGRAM_BINS]> {
    check_not_empty( img, "GHE input")?;

    let hist = Histogram::from_gray( img);
    let cdf = Cdf::from_histogram( &hist);
    if cdf.is_degenerate() {
        debug!("single valued intensity channel, using identity mapping");
    }

    Ok( cdf.lut() )
}

pub fn equalize (img: &GrayImage)->Result<GrayImage> {
    let lut = equalization_lut( img)?;
    Ok( apply_lut( img, &lut) )
}
