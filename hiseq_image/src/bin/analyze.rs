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
use anyhow::{Result,anyhow};
use regex::Regex;
use serde::Serialize;
use tracing::{info,warn};
use tracing_subscriber::EnvFilter;

use hiseq_common::{define_cli, check_cli, MinMaxAvg, fs::{matching_files_in_dir, filestem}};
use hiseq_image::{evaluate_enhancement, enhance, open_8bit, EnhanceConfig, EnhancementReport, Method};

define_cli! { ARGS [about="apply GHE and CLAHE to all images in a directory and write the key metrics as CSV"] =
    config: Option<String> [help="optional RON config file (EnhanceConfig)", long],
    pattern: String [help="regular expression for image file names", long, default_value=r"(?i)\.(jpe?g|png|tiff?|bmp)$"],
    input_dir: String [help="directory with original images"],
    csv_file: String [help="CSV output file"]
}

/// one CSV row per image
#[derive(Serialize)]
struct ResultRow {
    image: String,
    category: String,
    ghe_psnr: f64,
    clahe_psnr: f64,
    ghe_ssim: f64,
    clahe_ssim: f64,
    ghe_entropy_improvement: f64,
    clahe_entropy_improvement: f64,
    ghe_contrast_improvement: f64,
    clahe_contrast_improvement: f64,
    ghe_naturalness: f64,
    clahe_naturalness: f64,
    ghe_sharpness: f64,
    clahe_sharpness: f64,
    ghe_over_enhanced: bool,
    clahe_over_enhanced: bool,
}

impl ResultRow {
    fn new (image: &str, ghe: &EnhancementReport, clahe: &EnhancementReport)->Self {
        // "<category>_<n>" naming of the image set
        let category = image.rsplit_once('_').map(|(c,_)| c).unwrap_or("").to_string();

        ResultRow {
            image: image.to_string(),
            category,
            ghe_psnr: ghe.psnr,
            clahe_psnr: clahe.psnr,
            ghe_ssim: ghe.ssim,
            clahe_ssim: clahe.ssim,
            ghe_entropy_improvement: ghe.entropy_improvement,
            clahe_entropy_improvement: clahe.entropy_improvement,
            ghe_contrast_improvement: ghe.contrast_improvement,
            clahe_contrast_improvement: clahe.contrast_improvement,
            ghe_naturalness: ghe.naturalness_enhanced,
            clahe_naturalness: clahe.naturalness_enhanced,
            ghe_sharpness: ghe.sharpness_enhanced,
            clahe_sharpness: clahe.sharpness_enhanced,
            ghe_over_enhanced: ghe.over_enhancement.is_over_enhanced,
            clahe_over_enhanced: clahe.over_enhancement.is_over_enhanced,
        }
    }
}

#[derive(Default)]
struct Summary {
    psnr: MinMaxAvg,
    ssim: MinMaxAvg,
    entropy_improvement: MinMaxAvg,
    contrast_improvement: MinMaxAvg,
    naturalness: MinMaxAvg,
    over_enhanced: MinMaxAvg,
}

impl Summary {
    fn add (&mut self, report: &EnhancementReport) {
        // identical images have infinite PSNR which would swamp the average
        if report.psnr.is_finite() { self.psnr.add( report.psnr) }
        self.ssim.add( report.ssim);
        self.entropy_improvement.add( report.entropy_improvement);
        self.contrast_improvement.add( report.contrast_improvement);
        self.naturalness.add( report.naturalness_enhanced);
        self.over_enhanced.add( if report.over_enhancement.is_over_enhanced { 1.0 } else { 0.0 });
    }

    fn print (&self, method: Method) {
        println!("{method:<6} PSNR: {:.2} dB, SSIM: {:.4}, entropy ratio: {:.2}%, contrast ratio: {:.2}%, naturalness: {:.4}, over-enhanced: {:.1}%",
            self.psnr.avg, self.ssim.avg, self.entropy_improvement.avg * 100.0, self.contrast_improvement.avg * 100.0,
            self.naturalness.avg, self.over_enhanced.avg * 100.0);
    }
}

fn main()->Result<()> {
    check_cli!(ARGS);
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).try_init().map_err(|e| anyhow!("{e}"))?;

    let config = match &ARGS.config {
        Some(path) => EnhanceConfig::load( path)?,
        None => EnhanceConfig::default()
    };
    let ghe_config = config.with_method( Method::Ghe);
    let clahe_config = config.with_method( Method::Clahe);

    let regex = Regex::new( &ARGS.pattern)?;
    let files = matching_files_in_dir( &ARGS.input_dir, &regex)?;
    if files.is_empty() {
        warn!("no matching images in {}", ARGS.input_dir);
        return Ok(())
    }

    let mut writer = csv::Writer::from_path( &ARGS.csv_file)?;
    let mut ghe_summary = Summary::default();
    let mut clahe_summary = Summary::default();

    for path in &files {
        let Some(name) = filestem( path) else { continue };

        match analyze_image( path, &ghe_config, &clahe_config) {
            Ok((ghe,clahe)) => {
                writer.serialize( ResultRow::new( name, &ghe, &clahe))?;
                ghe_summary.add( &ghe);
                clahe_summary.add( &clahe);
                info!("analyzed {name}");
            }
            Err(e) => warn!("skipping {name}: {e}")
        }
    }
    writer.flush()?;
    println!("saved detailed results to: {}", ARGS.csv_file);

    println!("averages over {} images:", ghe_summary.ssim.n);
    ghe_summary.print( Method::Ghe);
    clahe_summary.print( Method::Clahe);

    Ok(())
}

fn analyze_image (path: &Path, ghe_config: &EnhanceConfig, clahe_config: &EnhanceConfig)->Result<(EnhancementReport,EnhancementReport)> {
    let original = open_8bit( path)?;

    let ghe = enhance( &original, ghe_config)?;
    let clahe = enhance( &original, clahe_config)?;

    Ok((
        evaluate_enhancement( &original, &ghe, "GHE", &ghe_config.thresholds)?,
        evaluate_enhancement( &original, &clahe, "CLAHE", &clahe_config.thresholds)?
    ))
}
