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

//! 8-bit intensity histograms, contrast limiting and cumulative distributions

use image::{GrayImage, Luma};
use tracing::trace;

pub const HISTOGRAM_BINS: usize = 256;

/// upper bound for clip/redistribute rounds
pub const MAX_CLIP_ITERATIONS: usize = 16;

/// clipping stops once the excess mass of a round is below this count
pub const CLIP_EPSILON: f64 = 1e-6;

/// a 256 bin histogram of a single intensity channel (or a rectangular region of it).
/// Invariant: the sum of all counts equals `total()`
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Histogram {
    counts: [u32; HISTOGRAM_BINS],
    total: u64
}

impl Histogram {
    pub fn new ()->Self {
        Histogram { counts: [0; HISTOGRAM_BINS], total: 0 }
    }

    pub fn from_gray (img: &GrayImage)->Self {
        let mut hist = Histogram::new();
        for p in img.pixels() {
            hist.add( p.0[0]);
        }
        hist
    }

    /// histogram of the region [x0..x0+width, y0..y0+height], which has to be inside of `img`
    pub fn from_region (img: &GrayImage, x0: u32, y0: u32, width: u32, height: u32)->Self {
        let mut hist = Histogram::new();
        for y in y0..y0+height {
            for x in x0..x0+width {
                hist.add( img.get_pixel( x, y).0[0]);
            }
        }
        hist
    }

    #[inline(always)]
    pub fn add (&mut self, v: u8) {
        self.counts[v as usize] += 1;
        self.total += 1;
    }

    pub fn counts (&self)->&[u32; HISTOGRAM_BINS] { &self.counts }
    pub fn count (&self, v: u8)->u32 { self.counts[v as usize] }
    pub fn total (&self)->u64 { self.total }
    pub fn is_empty (&self)->bool { self.total == 0 }

    pub fn distinct_values (&self)->usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// the only occupied intensity if there is exactly one
    pub fn single_value (&self)->Option<u8> {
        let mut it = self.counts.iter().enumerate().filter(|(_,c)| **c > 0);
        match (it.next(), it.next()) {
            (Some((v,_)), None) => Some(v as u8),
            _ => None
        }
    }

    pub fn bins (&self)->[f64; HISTOGRAM_BINS] {
        let mut bins = [0.0; HISTOGRAM_BINS];
        for (b,&c) in bins.iter_mut().zip( self.counts.iter()) { *b = c as f64 }
        bins
    }

    /// normalized histogram (all zero for an empty histogram)
    pub fn probabilities (&self)->[f64; HISTOGRAM_BINS] {
        let mut p = self.bins();
        if self.total > 0 {
            let n = self.total as f64;
            p.iter_mut().for_each(|v| *v /= n);
        }
        p
    }

    /// bins capped at `clip_limit * mean_bin_count`, with the excess spread uniformly over all bins
    pub fn clipped (&self, clip_limit: f32)->[f64; HISTOGRAM_BINS] {
        let mut bins = self.bins();
        let limit = clip_limit as f64 * self.total as f64 / HISTOGRAM_BINS as f64;
        clip_and_redistribute( &mut bins, limit);
        bins
    }
}

impl Default for Histogram {
    fn default()->Self { Self::new() }
}

/// clip all bins at `limit` and add the clipped mass back in equal shares to every bin.
/// Since this can push bins that were at the limit over it again we repeat until the excess is
/// negligible or MAX_CLIP_ITERATIONS is reached. Total mass is preserved.
/// Returns the number of rounds that clipped something.
pub fn clip_and_redistribute (bins: &mut [f64; HISTOGRAM_BINS], limit: f64)->usize {
    for round in 0..MAX_CLIP_ITERATIONS {
        let mut excess = 0.0;
        for b in bins.iter_mut() {
            if *b > limit {
                excess += *b - limit;
                *b = limit;
            }
        }

        if excess < CLIP_EPSILON {
            return round
        }

        let inc = excess / HISTOGRAM_BINS as f64;
        bins.iter_mut().for_each(|b| *b += inc);
        trace!("clip round {round}: redistributed {excess:.3} (limit {limit:.3})");
    }
    MAX_CLIP_ITERATIONS
}

/// cumulative distribution normalized to [0,255]:
/// `cdf[v] = (cum[v] - cum_min) * 255 / (total - cum_min)` with `cum_min` being the first non-zero
/// prefix sum. Bins below the first occupied one map to 0. A distribution with a single occupied bin
/// (or no mass at all) has no range to stretch and is the identity `cdf[v] = v`
#[derive(Debug,Clone,PartialEq)]
pub struct Cdf {
    values: [f64; HISTOGRAM_BINS],
    degenerate: bool
}

impl Cdf {
    pub fn from_histogram (hist: &Histogram)->Self {
        Self::from_bins( &hist.bins())
    }

    pub fn from_bins (bins: &[f64; HISTOGRAM_BINS])->Self {
        let mut cum = [0.0; HISTOGRAM_BINS];
        let mut acc = 0.0;
        for (c,&b) in cum.iter_mut().zip( bins.iter()) {
            acc += b;
            *c = acc;
        }

        let total = cum[HISTOGRAM_BINS-1];
        let cum_min = cum.iter().copied().find(|&c| c > 0.0).unwrap_or(0.0);
        let range = total - cum_min;

        let mut values = [0.0; HISTOGRAM_BINS];
        if range <= 0.0 {
            for (i,v) in values.iter_mut().enumerate() { *v = i as f64 }
            Cdf { values, degenerate: true }

        } else {
            for (v,&c) in values.iter_mut().zip( cum.iter()) {
                *v = ((c - cum_min).max(0.0) / range) * 255.0;
            }
            Cdf { values, degenerate: false }
        }
    }

    pub fn values (&self)->&[f64; HISTOGRAM_BINS] { &self.values }

    /// true if the distribution had nothing to stretch (identity mapping)
    pub fn is_degenerate (&self)->bool { self.degenerate }

    /// the 256 entry lookup table (rounded half away from zero)
    pub fn lut (&self)->[u8; HISTOGRAM_BINS] {
        let mut lut = [0u8; HISTOGRAM_BINS];
        for (l,&v) in lut.iter_mut().zip( self.values.iter()) {
            *l = hiseq_common::quantize_u8( v);
        }
        lut
    }
}

pub fn apply_lut (img: &GrayImage, lut: &[u8; HISTOGRAM_BINS])->GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        *p = Luma([lut[p.0[0] as usize]]);
    }
    out
}
