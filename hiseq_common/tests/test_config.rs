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

use serde::{Serialize,Deserialize};
use hiseq_common::config::{load_ron_config, parse_ron_config, to_ron_config_string, ConfigError};

/// run with "cargo test test_config -- --nocapture"

#[derive(Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
struct TestConfig {
    name: String,
    clip_limit: f32,
    grid: (u32,u32),
}

impl Default for TestConfig {
    fn default()->Self {
        TestConfig { name: "default".into(), clip_limit: 2.0, grid: (8,8) }
    }
}

#[test]
fn test_config_defaults () {
    let config: TestConfig = parse_ron_config( "TestConfig( clip_limit: 4.0 )").unwrap();
    assert_eq!( config, TestConfig { clip_limit: 4.0, ..TestConfig::default() });

    let config: TestConfig = parse_ron_config( "()").unwrap();
    assert_eq!( config, TestConfig::default());
}

#[test]
fn test_config_file () {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.ron");

    let config = TestConfig { name: "tuned".into(), clip_limit: 3.0, grid: (4,16) };
    let s = to_ron_config_string( &config).unwrap();
    println!("{s}");
    std::fs::write( &path, s).unwrap();

    let loaded: TestConfig = load_ron_config( &path).unwrap();
    assert_eq!( loaded, config);
}

#[test]
fn test_config_errors () {
    let res: Result<TestConfig,ConfigError> = parse_ron_config( "TestConfig( clip_limit: \"high\" )");
    assert!( matches!( res, Err(ConfigError::ParseError(_))));

    let res: Result<TestConfig,ConfigError> = load_ron_config( "/this/does/not/exist.ron");
    assert!( matches!( res, Err(ConfigError::IOError(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.ron");
    std::fs::write( &path, "").unwrap();
    let res: Result<TestConfig,ConfigError> = load_ron_config( &path);
    assert!( res.is_err());
}
