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

//! RON based configuration loading. Configs are plain serde structs, missing fields are
//! filled in from `#[serde(default)]` so that a config file only has to list what it overrides

use std::path::Path;
use serde::{Serialize,Deserialize};
use ron::ser::PrettyConfig;

use crate::{define_error, fs::filepath_contents};

pub type Result<T> = std::result::Result<T, ConfigError>;

define_error!{ pub ConfigError =
    IOError(#[from] std::io::Error) : "IO error: {0}",
    ParseError(#[from] ron::error::SpannedError) : "config parse error: {0}",
    SerializeError(#[from] ron::Error) : "config serialization error: {0}"
}

/// load a config of type `C` from a RON file
pub fn load_ron_config<C,P> (path: P) -> Result<C> where C: for <'a> Deserialize<'a>, P: AsRef<Path> {
    let data = filepath_contents( &path)?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

/// parse a config of type `C` from a RON string
pub fn parse_ron_config<C> (s: &str) -> Result<C> where C: for <'a> Deserialize<'a> {
    Ok( ron::from_str(s)? )
}

/// pretty printed RON serialization that includes struct names, used to create config templates
pub fn to_ron_config_string<C> (config: &C) -> Result<String> where C: Serialize {
    let opts = PrettyConfig::new().struct_names(true);
    Ok( ron::ser::to_string_pretty( config, opts)? )
}
