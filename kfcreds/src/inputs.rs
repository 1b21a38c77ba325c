//! Reading input files.

use kfcreds_common::prelude::*;
use serde::de::DeserializeOwned;
use std::{fs::File, path::Path};

/// Read and parse a YAML file. JSON is also accepted, because it's (nearly) a
/// subset of YAML.
pub fn read_yaml_or_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("can't open {}", path.display()))?;
    serde_yaml::from_reader(f).with_context(|| format!("can't parse {}", path.display()))
}
