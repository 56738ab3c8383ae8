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

//! common utilities shared by the hiseq crates: numeric sugar, error/cli macros,
//! file system helpers and RON config loading

pub mod macros;
pub mod fs;
pub mod config;

// syntactic sugar - this is just more readable in the metric formulas
#[inline(always)] pub fn sqrt(x:f64) -> f64 { x.sqrt() }
#[inline(always)] pub fn pow2(x:f64) -> f64 { x*x }
#[inline(always)] pub fn abs(x:f64) -> f64 { x.abs() }
#[inline(always)] pub fn log2(x:f64) -> f64 { x.log2() }
#[inline(always)] pub fn log10(x:f64) -> f64 { x.log10() }

/// round half away from zero and clamp into the u8 sample range
/// this is the single quantization rule used for all 8-bit outputs
#[inline(always)]
pub fn quantize_u8 (x: f64)->u8 {
    if x.is_nan() { return 0 }
    x.round().clamp(0.0, 255.0) as u8
}

/// ratio `a/b` that does not produce NaN for a zero denominator:
/// `0/0` is 1 (no change), `x/0` is +inf
#[inline]
pub fn safe_ratio (a: f64, b: f64)->f64 {
    if b != 0.0 {
        a / b
    } else if a == 0.0 {
        1.0
    } else {
        f64::INFINITY
    }
}

/// a simple incremental min/max/avg accumulator
#[derive(Debug,Clone)]
pub struct MinMaxAvg {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64
}

impl MinMaxAvg {
    pub fn new()->Self { MinMaxAvg { n: 0, min: f64::MAX, max: f64::MIN, avg: f64::NAN } }

    /// add a new observation
    pub fn add (&mut self, x: f64) {
        self.n += 1;

        if self.n > 1 {
            self.avg = self.avg + (x - self.avg) / self.n as f64;
            if x < self.min { self.min = x }
            if x > self.max { self.max = x }
        } else {
            self.min = x;
            self.max = x;
            self.avg = x;
        }
    }
}

impl Default for MinMaxAvg {
    fn default()->Self { Self::new() }
}
