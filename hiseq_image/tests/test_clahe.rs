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

use image::{GrayImage, Luma};
use rand::{Rng, SeedableRng, rngs::StdRng};
use hiseq_common::quantize_u8;
use hiseq_image::{clahe_luts, equalize, equalize_adaptive, HiseqImageError, TileGrid, TileGridSize};

/// tests for tile grid partitioning and CLAHE
/// run with "cargo test test_clahe -- --nocapture"

fn random_gray (rng: &mut StdRng, w: u32, h: u32, lo: u8, hi: u8)->GrayImage {
    GrayImage::from_fn( w, h, |_,_| Luma([rng.random_range(lo..=hi)]))
}

fn check_partition (w: u32, h: u32, grid_size: TileGridSize) {
    let grid = TileGrid::new( w, h, grid_size).unwrap();
    let mut covered = vec![0u32; (w*h) as usize];

    for tile in grid.tiles() {
        assert!( tile.width > 0 && tile.height > 0);
        for y in tile.y..tile.y+tile.height {
            for x in tile.x..tile.x+tile.width {
                covered[(y*w + x) as usize] += 1;
            }
        }
    }
    assert!( covered.iter().all(|&c| c == 1), "gaps or overlaps in {w}x{h} / {grid_size}");
}

#[test]
fn test_tile_grid_even () {
    let grid = TileGrid::new( 256, 256, TileGridSize::square(8)).unwrap();
    assert_eq!( grid.tiles().count(), 64);

    for tile in grid.tiles() {
        assert_eq!( (tile.width, tile.height), (32,32));
        assert_eq!( (tile.x, tile.y), (tile.col as u32 * 32, tile.row as u32 * 32));
    }

    let width_sum: u32 = (0..grid.cols()).map(|c| grid.tile(0,c).width).sum();
    let height_sum: u32 = (0..grid.rows()).map(|r| grid.tile(r,0).height).sum();
    assert_eq!( (width_sum, height_sum), (256,256));

    check_partition( 256, 256, TileGridSize::square(8));
}

#[test]
fn test_tile_grid_remainder () {
    // 250 = 7*31 + 33, 263 = 7*32 + 39
    let grid = TileGrid::new( 250, 263, TileGridSize::square(8)).unwrap();

    assert_eq!( grid.tile(0,0).width, 31);
    assert_eq!( grid.tile(0,7).width, 33);
    assert_eq!( grid.tile(0,0).height, 32);
    assert_eq!( grid.tile(7,0).height, 39);
    assert_eq!( grid.tile(7,7).x + grid.tile(7,7).width, 250);
    assert_eq!( grid.tile(7,7).y + grid.tile(7,7).height, 263);

    check_partition( 250, 263, TileGridSize::square(8));
    check_partition( 17, 9, TileGridSize::new(4,3));

    assert_eq!( grid.tile_index_of( 0, 0), (0,0));
    assert_eq!( grid.tile_index_of( 249, 262), (7,7));
    assert_eq!( grid.tile_index_of( 217, 224), (7,7));
    assert_eq!( grid.tile_index_of( 216, 223), (6,6));
}

#[test]
fn test_tile_grid_clamped () {
    let grid = TileGrid::new( 3, 5, TileGridSize::square(8)).unwrap();
    assert_eq!( grid.size, TileGridSize::new(5,3));
    check_partition( 3, 5, TileGridSize::square(8));
}

#[test]
fn test_tile_grid_size_parse () {
    assert_eq!( "8x8".parse::<TileGridSize>().unwrap(), TileGridSize::square(8));
    assert_eq!( "4X16".parse::<TileGridSize>().unwrap(), TileGridSize::new(4,16));
    assert_eq!( " 6 ".parse::<TileGridSize>().unwrap(), TileGridSize::square(6));
    assert_eq!( TileGridSize::new(2,3).to_string(), "2x3");

    assert!( matches!( "0x8".parse::<TileGridSize>(), Err(HiseqImageError::InvalidConfiguration(_))));
    assert!( matches!( "ax8".parse::<TileGridSize>(), Err(HiseqImageError::InvalidConfiguration(_))));
}

#[test]
fn test_clahe_degenerates_to_ghe () {
    let mut rng = StdRng::seed_from_u64( 42);

    for (w,h,lo,hi) in [(64,48,0,255), (33,17,90,140), (16,16,0,30)] {
        let img = random_gray( &mut rng, w, h, lo, hi);
        let ghe = equalize( &img).unwrap();
        let clahe = equalize_adaptive( &img, TileGridSize::square(1), 1000.0).unwrap();
        assert_eq!( clahe, ghe, "CLAHE 1x1 differs from GHE for {w}x{h}");
    }
}

#[test]
fn test_clahe_flat_image_unchanged () {
    let img = GrayImage::from_pixel( 64, 64, Luma([100]));
    let out = equalize_adaptive( &img, TileGridSize::square(8), 2.0).unwrap();
    assert_eq!( out, img);
}

#[test]
fn test_clahe_tile_luts () {
    let mut rng = StdRng::seed_from_u64( 11);
    let img = random_gray( &mut rng, 64, 64, 0, 255);

    let (grid, luts) = clahe_luts( &img, TileGridSize::square(8), 2.0).unwrap();
    assert_eq!( luts.dimensions(), (8,8));
    assert_eq!( grid.rows(), 8);

    for lut in luts.iter() {
        assert!( lut.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_clahe_limits_contrast () {
    // low contrast noise: a tight clip limit stretches less than GHE
    let mut rng = StdRng::seed_from_u64( 13);
    let img = random_gray( &mut rng, 64, 64, 120, 130);

    let spread = |g: &GrayImage| {
        let min = g.pixels().map(|p| p.0[0]).min().unwrap();
        let max = g.pixels().map(|p| p.0[0]).max().unwrap();
        max - min
    };

    let ghe = equalize( &img).unwrap();
    let clahe = equalize_adaptive( &img, TileGridSize::square(4), 1.0).unwrap();
    println!("spread: original {}, GHE {}, CLAHE(clip=1) {}", spread(&img), spread(&ghe), spread(&clahe));
    assert!( spread( &clahe) < spread( &ghe));
}

#[test]
fn test_clahe_blends_between_tile_centers () {
    let mut rng = StdRng::seed_from_u64( 19);

    // two tiles side by side, centers at x = 3.5 and x = 11.5
    let img = GrayImage::from_fn( 16, 10, |x,_| {
        if x < 8 { Luma([rng.random_range(0..=120)]) } else { Luma([rng.random_range(60..=255)]) }
    });
    let grid_size = TileGridSize::new(1,2);
    let (_, luts) = clahe_luts( &img, grid_size, 2.0).unwrap();
    let out = equalize_adaptive( &img, grid_size, 2.0).unwrap();
    let (lut0, lut1) = (luts.get(0,0), luts.get(1,0));

    for (x,y,p) in img.enumerate_pixels() {
        let v = p.0[0] as usize;
        let expected = if x <= 3 {
            lut0[v]
        } else if x >= 12 {
            lut1[v]
        } else {
            let w = (x as f64 - 3.5) / 8.0;
            quantize_u8( (1.0 - w) * lut0[v] as f64 + w * lut1[v] as f64)
        };
        assert_eq!( out.get_pixel(x,y).0[0], expected, "pixel ({x},{y}) value {v}");
    }

    // same along rows
    let img = GrayImage::from_fn( 10, 16, |_,y| {
        if y < 8 { Luma([rng.random_range(0..=120)]) } else { Luma([rng.random_range(60..=255)]) }
    });
    let grid_size = TileGridSize::new(2,1);
    let (_, luts) = clahe_luts( &img, grid_size, 2.0).unwrap();
    let out = equalize_adaptive( &img, grid_size, 2.0).unwrap();
    let (lut0, lut1) = (luts.get(0,0), luts.get(0,1));

    for (x,y,p) in img.enumerate_pixels() {
        let v = p.0[0] as usize;
        let expected = if y <= 3 {
            lut0[v]
        } else if y >= 12 {
            lut1[v]
        } else {
            let w = (y as f64 - 3.5) / 8.0;
            quantize_u8( (1.0 - w) * lut0[v] as f64 + w * lut1[v] as f64)
        };
        assert_eq!( out.get_pixel(x,y).0[0], expected, "pixel ({x},{y}) value {v}");
    }
}

#[test]
fn test_clahe_deterministic () {
    let mut rng = StdRng::seed_from_u64( 17);
    let img = random_gray( &mut rng, 50, 70, 0, 255);
    let a = equalize_adaptive( &img, TileGridSize::new(3,5), 2.0).unwrap();
    let b = equalize_adaptive( &img, TileGridSize::new(3,5), 2.0).unwrap();
    assert_eq!( a, b);
}

#[test]
fn test_clahe_invalid_configuration () {
    let img = GrayImage::from_pixel( 8, 8, Luma([1]));

    for (grid, clip) in [(TileGridSize::new(0,8), 2.0), (TileGridSize::new(8,0), 2.0),
                         (TileGridSize::square(8), 0.0), (TileGridSize::square(8), -1.0), (TileGridSize::square(8), f32::NAN)] {
        assert!( matches!( equalize_adaptive( &img, grid, clip), Err(HiseqImageError::InvalidConfiguration(_))));
    }

    assert!( matches!( equalize_adaptive( &GrayImage::new(0,4), TileGridSize::square(8), 2.0), Err(HiseqImageError::EmptyImage(_))));
}
