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

//! histogram based contrast enhancement (GHE and CLAHE) and the metrics to compare enhanced
//! images with their originals.
//! this mostly wraps and extends the external 'image' crate (and related). All engine functions are
//! pure functions over in-memory buffers, configuration is passed in explicitly

use std::ops::{Add, Div, Mul, Sub};
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma};
use num::{Zero,Bounded};

mod errors;
pub use errors::{Result,HiseqImageError};

pub mod color;
pub use color::{ColorSpace, Decomposition, SideChannels, decompose, recompose, to_intensity};

pub mod histogram;
pub use histogram::{Histogram, Cdf, HISTOGRAM_BINS, apply_lut};

pub mod ghe;
pub use ghe::{equalize, equalization_lut};

pub mod tile_grid;
pub use tile_grid::{Tile, TileGrid, TileGridSize, TileData};

pub mod clahe;
pub use clahe::{equalize_adaptive, clahe_luts, DEFAULT_CLIP_LIMIT};

pub mod metrics;
pub mod qualitative;

pub mod evaluation;
pub use evaluation::{evaluate_enhancement, EnhancementReport, MetricResult};

mod pipeline;
pub use pipeline::*;

/// incremental min/max/mean/(population) variance accumulator
pub struct Stats<T> {
    pub min: T,
    pub max: T,
    pub mean: f64,
    pub variance: f64,

    pub s: f64,
    pub n: usize
}

impl <T> Stats<T>
    where T: Add<T,Output=T> + Sub<T,Output=T> + Div<T,Output=T> + Mul<T,Output=T> +
             Bounded + PartialOrd + PartialEq + Zero + Into<f64> + Copy
{
    pub fn new ()->Self {
        let min = T::max_value();
        let max = T::min_value();
        let mean: f64 = 0.0;
        let variance: f64 = 0.0;

        Stats{min,max,mean,variance, s: 0.0, n: 0}
    }

    pub fn from_values<I> (values: I)->Self where I: IntoIterator<Item=T> {
        let mut stats = Self::new();
        for v in values { stats.add( v) }
        stats
    }

    pub fn add (&mut self, v: T) {
        self.n += 1;

        if v < self.min { self.min = v }
        if v > self.max { self.max = v }

        let prev_mean = self.mean;
        let v: f64 = v.into();
        let n = self.n as f64;

        self.mean = (v + (n * prev_mean) - prev_mean) / n;
        self.s = self.s + (v - prev_mean) * (v - self.mean);
        self.variance = self.s / n;
    }

    pub fn std_dev (&self)->f64 {
        self.variance.sqrt()
    }
}

pub type GrayImage32f = ImageBuffer<Luma<f32>, Vec<f32>>;

pub fn check_not_empty<I> (img: &I, what: &str)->Result<()> where I: GenericImageView {
    let (w,h) = img.dimensions();
    if w == 0 || h == 0 {
        Err( HiseqImageError::EmptyImage(format!("{what} has dimensions {w}x{h}")) )
    } else {
        Ok(())
    }
}

/// check that two images agree in width, height and channel count
pub fn check_equal_shape (img1: &DynamicImage, img2: &DynamicImage)->Result<()> {
    let c1 = img1.color().channel_count();
    let c2 = img2.color().channel_count();

    if img1.dimensions() != img2.dimensions() || c1 != c2 {
        let (w1,h1) = img1.dimensions();
        let (w2,h2) = img2.dimensions();
        Err( HiseqImageError::ShapeMismatch(format!("{h1}x{w1}x{c1} vs {h2}x{w2}x{c2}")) )
    } else {
        Ok(())
    }
}

pub fn check_equal_dimensions<I> (img1: &I, img2: &I)->Result<()> where I: GenericImageView {
    if img1.dimensions() != img2.dimensions() {
        Err( HiseqImageError::ShapeMismatch(format!("image dimensions differ: {:?} vs {:?}", img1.dimensions(), img2.dimensions())) )
    } else {
        Ok(())
    }
}
