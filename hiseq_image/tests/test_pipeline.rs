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

#![allow(unused)]

use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use hiseq_common::config::{parse_ron_config, to_ron_config_string};
use hiseq_image::{
    clahe_parameter_sweep, enhance, enhance_file, equalize, equalize_adaptive, evaluate_enhancement, open_8bit, to_8bit,
    ColorSpace, EnhanceConfig, HiseqImageError, Method, TileGridSize, DEFAULT_SWEEP_CLIP_LIMITS, DEFAULT_SWEEP_GRIDS,
    qualitative::OverEnhancementThresholds
};

/// tests for the enhancement pipeline, configuration and evaluation report
/// run with "cargo test test_enhance -- --nocapture"

fn random_rgb (rng: &mut StdRng, w: u32, h: u32)->RgbImage {
    // low contrast color image
    RgbImage::from_fn( w, h, |_,_| Rgb([rng.random_range(80..=150u8), rng.random_range(70..=140u8), rng.random_range(60..=130u8)]))
}

fn random_gray (rng: &mut StdRng, w: u32, h: u32)->GrayImage {
    GrayImage::from_fn( w, h, |_,_| Luma([rng.random_range(50..=180u8)]))
}

#[test]
fn test_default_config () {
    let config = EnhanceConfig::default();
    assert_eq!( config.method, Method::Clahe);
    assert_eq!( config.color_space, ColorSpace::Lab);
    assert_eq!( config.tile_grid, TileGridSize::square(8));
    assert_eq!( config.clip_limit, 2.0);
    assert_eq!( config.thresholds, OverEnhancementThresholds::default());
    assert!( config.validate().is_ok());
}

#[test]
fn test_parse_config () {
    let config: EnhanceConfig = parse_ron_config( "EnhanceConfig( method: GHE, color_space: HSV, tile_grid: (rows: 4, cols: 6) )").unwrap();
    assert_eq!( config.method, Method::Ghe);
    assert_eq!( config.color_space, ColorSpace::Hsv);
    assert_eq!( config.tile_grid, TileGridSize::new(4,6));
    assert_eq!( config.clip_limit, 2.0);

    let config: EnhanceConfig = parse_ron_config( "( clip_limit: 3.5, thresholds: ( max_saturation_ratio: 0.1 ) )").unwrap();
    assert_eq!( config.method, Method::Clahe);
    assert_eq!( config.clip_limit, 3.5);
    assert_eq!( config.thresholds.max_saturation_ratio, 0.1);
    assert_eq!( config.thresholds.max_contrast_change, 2.0);

    let s = to_ron_config_string( &EnhanceConfig::default()).unwrap();
    println!("{s}");
    let parsed: EnhanceConfig = parse_ron_config( &s).unwrap();
    assert_eq!( parsed, EnhanceConfig::default());
}

#[test]
fn test_load_config () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enhance.ron");
    std::fs::write( &path, "EnhanceConfig( method: CLAHE, clip_limit: 0.0 )").unwrap();
    assert!( matches!( EnhanceConfig::load( &path), Err(HiseqImageError::InvalidConfiguration(_))));

    std::fs::write( &path, "EnhanceConfig( color_space: YCrCb, clip_limit: 1.5 )").unwrap();
    let config = EnhanceConfig::load( &path).unwrap();
    assert_eq!( config.color_space, ColorSpace::YCrCb);
    assert_eq!( config.clip_limit, 1.5);

    std::fs::write( &path, "EnhanceConfig( color_space: RGB )").unwrap();
    assert!( matches!( EnhanceConfig::load( &path), Err(HiseqImageError::ConfigError(_))));
}

#[test]
fn test_method_names () {
    assert_eq!( "ghe".parse::<Method>().unwrap(), Method::Ghe);
    assert_eq!( "CLAHE".parse::<Method>().unwrap(), Method::Clahe);
    assert_eq!( Method::Ghe.to_string(), "GHE");
    assert!( "he".parse::<Method>().is_err());
}

#[test]
fn test_enhance_grayscale () {
    let mut rng = StdRng::seed_from_u64( 42);
    let gray = random_gray( &mut rng, 40, 30);
    let img = DynamicImage::ImageLuma8( gray.clone());

    let config = EnhanceConfig::default();
    let ghe = enhance( &img, &config.with_method( Method::Ghe)).unwrap();
    assert_eq!( ghe.as_luma8(), Some(&equalize( &gray).unwrap()));

    let clahe = enhance( &img, &config).unwrap();
    assert_eq!( clahe.as_luma8(), Some(&equalize_adaptive( &gray, config.tile_grid, config.clip_limit).unwrap()));
}

#[test]
fn test_enhance_color () {
    let mut rng = StdRng::seed_from_u64( 7);
    let img = DynamicImage::ImageRgb8( random_rgb( &mut rng, 128, 128));

    for cs in [ColorSpace::YCrCb, ColorSpace::Hsv, ColorSpace::Lab] {
        for method in [Method::Ghe, Method::Clahe] {
            let config = EnhanceConfig { method, color_space: cs, ..EnhanceConfig::default() };
            let enhanced = enhance( &img, &config).unwrap();

            assert_eq!( enhanced.dimensions(), img.dimensions());
            assert!( enhanced.as_rgb8().is_some());

            let report = evaluate_enhancement( &img, &enhanced, &method.to_string(), &config.thresholds).unwrap();
            println!("{method} in {cs}: contrast {:.2} -> {:.2}", report.contrast_original, report.contrast_enhanced);
            assert!( report.contrast_enhanced > report.contrast_original);
        }
    }
}

#[test]
fn test_enhance_alpha () {
    let mut rng = StdRng::seed_from_u64( 23);
    let rgb = random_rgb( &mut rng, 48, 40);
    let rgba = image::RgbaImage::from_fn( 48, 40, |x,y| {
        let [r,g,b] = rgb.get_pixel(x,y).0;
        image::Rgba([r, g, b, (x*5 + y) as u8])
    });
    let img = DynamicImage::ImageRgba8( rgba.clone());
    let config = EnhanceConfig::default();

    let enhanced = enhance( &img, &config).unwrap();
    let out = enhanced.as_rgba8().unwrap();
    let expected = enhance( &DynamicImage::ImageRgb8( rgb), &config).unwrap().to_rgb8();
    for (x,y,p) in out.enumerate_pixels() {
        assert_eq!( p.0[3], rgba.get_pixel(x,y).0[3]);
        assert_eq!( &p.0[..3], &expected.get_pixel(x,y).0[..]);
    }

    let report = evaluate_enhancement( &img, &enhanced, "CLAHE", &config.thresholds).unwrap();
    assert!( report.psnr.is_finite());

    let gray = random_gray( &mut rng, 32, 32);
    let luma_alpha = DynamicImage::ImageLumaA8( image::ImageBuffer::from_fn( 32, 32, |x,y| image::LumaA([gray.get_pixel(x,y).0[0], 200])));
    let enhanced = enhance( &luma_alpha, &config.with_method( Method::Ghe)).unwrap();
    let out = enhanced.as_luma_alpha8().unwrap();
    let ghe = equalize( &gray).unwrap();
    for (x,y,p) in out.enumerate_pixels() {
        assert_eq!( p.0, [ghe.get_pixel(x,y).0[0], 200]);
    }
    assert!( evaluate_enhancement( &luma_alpha, &enhanced, "GHE", &config.thresholds).is_ok());
}

#[test]
fn test_enhance_invalid_config () {
    let img = DynamicImage::ImageLuma8( GrayImage::from_pixel( 8, 8, Luma([3])));
    let config = EnhanceConfig { clip_limit: -2.0, ..EnhanceConfig::default() };
    assert!( matches!( enhance( &img, &config), Err(HiseqImageError::InvalidConfiguration(_))));
}

#[test]
fn test_enhance_file () {
    let mut rng = StdRng::seed_from_u64( 11);
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("in.png");
    let out_path = dir.path().join("out.png");

    DynamicImage::ImageRgb8( random_rgb( &mut rng, 32, 24)).save( &in_path).unwrap();

    let (original, enhanced) = enhance_file( &in_path, &out_path, &EnhanceConfig::default()).unwrap();
    let reloaded = open_8bit( &out_path).unwrap();
    assert_eq!( reloaded, enhanced);
    assert_eq!( original.dimensions(), enhanced.dimensions());
}

#[test]
fn test_to_8bit () {
    let rgba = DynamicImage::ImageRgba8( image::RgbaImage::from_pixel( 2, 2, image::Rgba([1,2,3,255])));
    assert!( to_8bit( rgba).as_rgb8().is_some());

    let luma16 = DynamicImage::ImageLuma16( image::ImageBuffer::from_pixel( 2, 2, Luma([1000u16])));
    assert!( to_8bit( luma16).as_luma8().is_some());
}

#[test]
fn test_parameter_sweep () {
    let mut rng = StdRng::seed_from_u64( 13);
    let img = DynamicImage::ImageRgb8( random_rgb( &mut rng, 64, 48));

    let entries = clahe_parameter_sweep( &img, &DEFAULT_SWEEP_CLIP_LIMITS, &DEFAULT_SWEEP_GRIDS, ColorSpace::Lab).unwrap();
    assert_eq!( entries.len(), 12);
    assert_eq!( entries[0].key(), "clip_1_tile_4x4");
    assert_eq!( entries[11].key(), "clip_4_tile_16x16");
    assert_eq!( (entries[4].clip_limit, entries[4].grid), (2.0, TileGridSize::square(8)));

    let config = EnhanceConfig { clip_limit: 3.0, tile_grid: TileGridSize::square(16), ..EnhanceConfig::default() };
    assert_eq!( entries[8].image, enhance( &img, &config).unwrap());
}

#[test]
fn test_report () {
    let mut rng = StdRng::seed_from_u64( 17);
    let img = DynamicImage::ImageLuma8( random_gray( &mut rng, 32, 32));

    let report = evaluate_enhancement( &img, &img, "GHE", &OverEnhancementThresholds::default()).unwrap();
    assert!( report.psnr.is_infinite());
    assert_eq!( report.ssim, 1.0);
    assert_eq!( report.entropy_improvement, 1.0);
    assert_eq!( report.contrast_improvement, 1.0);
    assert_eq!( report.colorfulness_enhanced, 0.0);
    assert!( !report.over_enhancement.is_over_enhanced);

    let m = report.to_metric_result();
    assert_eq!( m.len(), 22);
    assert_eq!( m["over_enhancement_detected"], 0.0);
    assert_eq!( m["ssim"], 1.0);

    let text = report.to_string();
    assert!( text.contains("Enhancement Evaluation: GHE"));
    assert!( report.to_json().unwrap().contains("\"method\": \"GHE\""));

    // flat original: ratios stay finite or infinite, never NaN
    let flat = DynamicImage::ImageLuma8( GrayImage::from_pixel( 16, 16, Luma([0])));
    let report = evaluate_enhancement( &flat, &flat, "CLAHE", &OverEnhancementThresholds::default()).unwrap();
    assert_eq!( report.entropy_improvement, 1.0);
    assert!( report.to_metric_result().values().all(|v| !v.is_nan()));

    let other = DynamicImage::ImageLuma8( GrayImage::new( 16, 17));
    assert!( matches!( evaluate_enhancement( &flat, &other, "GHE", &OverEnhancementThresholds::default()), Err(HiseqImageError::ShapeMismatch(_))));
}
