//! Dataset metadata

use serde::Serialize;
use serde_json::Value;

use crate::config::ConfigSpec;
use crate::features::Features;

pub const HOMEPAGE: &str = "https://yale-lily.github.io/ROSE/";

pub const DESCRIPTION: &str = "RoSE benchmark";

/// Remote archive holding every annotation file under `rose_data/`
pub const ARCHIVE_URL: &str =
    "https://storage.googleapis.com/sfr-rose-data-research/rose_data.tar.gz";

pub const VERSION: &str = "1.0.0";

/// Directory inside the extracted archive holding the annotation files
pub const ARCHIVE_DIR: &str = "rose_data";

/// Describes one configuration of the dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub config_name: &'static str,
    pub description: &'static str,
    pub homepage: &'static str,
    pub version: &'static str,
    /// (input, target) columns
    pub supervised_keys: (&'static str, &'static str),
    #[serde(serialize_with = "serialize_features")]
    pub features: Features,
}

fn serialize_features<S: serde::Serializer>(
    features: &Features,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    features.to_json().serialize(serializer)
}

impl DatasetInfo {
    pub fn for_config(spec: &'static ConfigSpec) -> Self {
        Self {
            config_name: spec.name,
            description: DESCRIPTION,
            homepage: HOMEPAGE,
            version: VERSION,
            supervised_keys: ("source", "reference"),
            features: Features::for_config(spec),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
