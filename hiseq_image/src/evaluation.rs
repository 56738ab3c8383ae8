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

use std::{collections::BTreeMap, fmt};
use image::DynamicImage;
use serde::{Serialize,Deserialize};
use hiseq_common::safe_ratio;

use crate::{
    check_equal_shape, check_not_empty, to_intensity,
    errors::Result,
    metrics::{gray_brightness, gray_entropy, gray_psnr, gray_rms_contrast, gray_ssim},
    qualitative::{
        blocking_artifacts, colorfulness, detect_over_enhancement, gray_naturalness, gray_sharpness,
        OverEnhancement, OverEnhancementThresholds, DEFAULT_BLOCK_SIZE
    },
};

/// flat metric name -> value map
pub type MetricResult = BTreeMap<String,f64>;

/// all metrics for one (original, enhanced) pair
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct EnhancementReport {
    pub method: String,

    pub psnr: f64,
    pub ssim: f64,

    pub entropy_original: f64,
    pub entropy_enhanced: f64,
    pub entropy_improvement: f64,

    pub contrast_original: f64,
    pub contrast_enhanced: f64,
    pub contrast_improvement: f64,

    pub brightness_original: f64,
    pub brightness_enhanced: f64,

    pub sharpness_original: f64,
    pub sharpness_enhanced: f64,

    pub naturalness_original: f64,
    pub naturalness_enhanced: f64,

    pub colorfulness_original: f64,
    pub colorfulness_enhanced: f64,

    pub blocking_artifacts: f64,

    pub over_enhancement: OverEnhancement,
}

impl EnhancementReport {
    /// flatten into a name->value map, booleans become 0.0/1.0
    pub fn to_metric_result (&self)->MetricResult {
        let mut m = MetricResult::new();
        let mut put = |k: &str, v: f64| { m.insert( k.to_string(), v); };

        put( "psnr", self.psnr);
        put( "ssim", self.ssim);
        put( "entropy_original", self.entropy_original);
        put( "entropy_enhanced", self.entropy_enhanced);
        put( "entropy_improvement", self.entropy_improvement);
        put( "contrast_original", self.contrast_original);
        put( "contrast_enhanced", self.contrast_enhanced);
        put( "contrast_improvement", self.contrast_improvement);
        put( "brightness_original", self.brightness_original);
        put( "brightness_enhanced", self.brightness_enhanced);
        put( "sharpness_original", self.sharpness_original);
        put( "sharpness_enhanced", self.sharpness_enhanced);
        put( "naturalness_original", self.naturalness_original);
        put( "naturalness_enhanced", self.naturalness_enhanced);
        put( "colorfulness_original", self.colorfulness_original);
        put( "colorfulness_enhanced", self.colorfulness_enhanced);
        put( "blocking_artifacts", self.blocking_artifacts);

        let oe = &self.over_enhancement;
        put( "brightness_change", oe.brightness_change_ratio);
        put( "contrast_change", oe.contrast_change_ratio);
        put( "saturation_ratio", oe.saturation_ratio);
        put( "edge_strength", oe.edge_strength);
        put( "over_enhancement_detected", if oe.is_over_enhanced { 1.0 } else { 0.0 });

        m
    }

    pub fn to_json (&self)->Result<String> {
        Ok( serde_json::to_string_pretty( self)? )
    }
}

fn percent (x: f64)->String {
    if x.is_finite() { format!("{:.2}%", x * 100.0) } else { format!("{x}") }
}

impl fmt::Display for EnhancementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = "=".repeat(70);
        let sep = "-".repeat(70);

        writeln!(f, "{line}")?;
        writeln!(f, "Enhancement Evaluation: {}", self.method)?;
        writeln!(f, "{line}")?;

        writeln!(f, "{:^70}", "QUANTITATIVE METRICS (Reference-based)")?;
        writeln!(f, "{sep}")?;
        writeln!(f, "PSNR: {:.2} dB (higher is better)", self.psnr)?;
        writeln!(f, "SSIM: {:.4} (closer to 1.0 is better)", self.ssim)?;
        writeln!(f, "Entropy:    original {:.4}, enhanced {:.4}, ratio {}", self.entropy_original, self.entropy_enhanced, percent(self.entropy_improvement))?;
        writeln!(f, "Contrast:   original {:.2}, enhanced {:.2}, ratio {}", self.contrast_original, self.contrast_enhanced, percent(self.contrast_improvement))?;
        writeln!(f, "Brightness: original {:.2}, enhanced {:.2}, change {}", self.brightness_original, self.brightness_enhanced,
                 percent(self.over_enhancement.brightness_change_ratio))?;

        writeln!(f)?;
        writeln!(f, "{:^70}", "QUALITATIVE METRICS (Perceptual Quality)")?;
        writeln!(f, "{sep}")?;
        writeln!(f, "Sharpness:   original {:.2}, enhanced {:.2}", self.sharpness_original, self.sharpness_enhanced)?;
        writeln!(f, "Naturalness: original {:.4}, enhanced {:.4}", self.naturalness_original, self.naturalness_enhanced)?;
        if self.colorfulness_enhanced > 0.0 {
            writeln!(f, "Colorfulness: original {:.2}, enhanced {:.2}", self.colorfulness_original, self.colorfulness_enhanced)?;
        }
        writeln!(f, "Blocking artifacts: {:.4} (lower is better)", self.blocking_artifacts)?;
        writeln!(f, "Saturation ratio:   {:.4} (lower is better)", self.over_enhancement.saturation_ratio)?;
        writeln!(f, "Edge strength:      {:.2}", self.over_enhancement.edge_strength)?;

        writeln!(f)?;
        let oe = &self.over_enhancement;
        if oe.is_over_enhanced {
            writeln!(f, "WARNING: over-enhancement detected (brightness change {}, contrast change {}, saturation {})",
                     percent(oe.brightness_change_ratio), percent(oe.contrast_change_ratio), percent(oe.saturation_ratio))?;
        } else {
            writeln!(f, "enhancement appears natural (no over-enhancement detected)")?;
        }
        write!(f, "{line}")
    }
}

/// compute the full report for `enhanced` with respect to `original`
pub fn evaluate_enhancement (original: &DynamicImage, enhanced: &DynamicImage, method: &str, thresholds: &OverEnhancementThresholds)->Result<EnhancementReport> {
    check_not_empty( original, "original")?;
    check_equal_shape( original, enhanced)?;

    let orig = to_intensity( original);
    let enh = to_intensity( enhanced);

    let entropy_original = gray_entropy( &orig);
    let entropy_enhanced = gray_entropy( &enh);
    let contrast_original = gray_rms_contrast( &orig);
    let contrast_enhanced = gray_rms_contrast( &enh);

    Ok( EnhancementReport {
        method: method.to_string(),
        psnr: gray_psnr( &orig, &enh)?,
        ssim: gray_ssim( &orig, &enh)?,

        entropy_original,
        entropy_enhanced,
        entropy_improvement: safe_ratio( entropy_enhanced, entropy_original),

        contrast_original,
        contrast_enhanced,
        contrast_improvement: safe_ratio( contrast_enhanced, contrast_original),

        brightness_original: gray_brightness( &orig),
        brightness_enhanced: gray_brightness( &enh),

        sharpness_original: gray_sharpness( &orig),
        sharpness_enhanced: gray_sharpness( &enh),

        naturalness_original: gray_naturalness( &orig),
        naturalness_enhanced: gray_naturalness( &enh),

        colorfulness_original: colorfulness( original)?,
        colorfulness_enhanced: colorfulness( enhanced)?,

        blocking_artifacts: blocking_artifacts( enhanced, DEFAULT_BLOCK_SIZE)?,
        over_enhancement: detect_over_enhancement( original, enhanced, thresholds)?,
    })
}
