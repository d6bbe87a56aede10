//! Split generators

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigSpec, DatasetFamily, Split};
use crate::info::ARCHIVE_DIR;

/// Name of the only split each configuration produces
pub const DATA_SPLIT: &str = "data";

/// Arguments for one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenKwargs {
    /// Annotation file inside the extracted archive
    pub acu_file: PathBuf,
    /// Corpus family to join against
    pub dataset: DatasetFamily,
    /// Corpus split to join against
    pub split: Split,
}

/// A named split and the arguments that generate it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitGenerator {
    pub name: String,
    pub gen_kwargs: GenKwargs,
}

/// Split generators for a configuration, rooted at the extracted archive
pub fn split_generators(spec: &ConfigSpec, data_dir: &Path) -> Vec<SplitGenerator> {
    vec![SplitGenerator {
        name: DATA_SPLIT.to_string(),
        gen_kwargs: GenKwargs {
            acu_file: data_dir.join(ARCHIVE_DIR).join(spec.file_name),
            dataset: spec.dataset,
            split: spec.split,
        },
    }]
}
