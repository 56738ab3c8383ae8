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

use regex::Regex;
use hiseq_common::{quantize_u8, safe_ratio, MinMaxAvg, fs::{matching_files_in_dir, filestem, extension}};

/// run with "cargo test test_quantize -- --nocapture"

mod errors {
    use hiseq_common::define_error;

    define_error!{ pub TestError =
        IOError(#[from] std::io::Error) : "IO error: {0}",
        Invalid(String) : "invalid: {0}",
    }
}
use errors::TestError;

#[test]
fn test_quantize () {
    assert_eq!( quantize_u8( 2.5), 3);
    assert_eq!( quantize_u8( 2.49), 2);
    assert_eq!( quantize_u8( -0.4), 0);
    assert_eq!( quantize_u8( -7.0), 0);
    assert_eq!( quantize_u8( 254.5), 255);
    assert_eq!( quantize_u8( 300.0), 255);
    assert_eq!( quantize_u8( f64::NAN), 0);
}

#[test]
fn test_safe_ratio () {
    assert_eq!( safe_ratio( 3.0, 2.0), 1.5);
    assert_eq!( safe_ratio( 0.0, 0.0), 1.0);
    assert_eq!( safe_ratio( 1.0, 0.0), f64::INFINITY);
}

#[test]
fn test_min_max_avg () {
    let mut mma = MinMaxAvg::new();
    assert!( mma.avg.is_nan());

    for x in [3.0, 1.0, 5.0, 3.0] { mma.add(x) }
    assert_eq!( mma.n, 4);
    assert_eq!( (mma.min, mma.max), (1.0, 5.0));
    assert!( (mma.avg - 3.0).abs() < 1e-12);
}

#[test]
fn test_define_error () {
    let e = TestError::Invalid("clip limit".into());
    assert_eq!( e.to_string(), "invalid: clip limit");

    let e: TestError = std::io::Error::new( std::io::ErrorKind::NotFound, "gone").into();
    assert!( matches!( e, TestError::IOError(_)));
}

#[test]
fn test_matching_files () {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b_2.png", "a_1.jpg", "notes.txt", "c_3.JPG"] {
        std::fs::write( dir.path().join(name), "x").unwrap();
    }
    std::fs::create_dir( dir.path().join("sub.png")).unwrap();

    let regex = Regex::new( r"(?i)\.(jpe?g|png)$").unwrap();
    let files = matching_files_in_dir( &dir.path(), &regex).unwrap();
    let names: Vec<&str> = files.iter().filter_map(|p| filestem(p)).collect();

    assert_eq!( names, vec!["a_1", "b_2", "c_3"]);
    assert_eq!( extension( &files[0]), Some("jpg"));
}
