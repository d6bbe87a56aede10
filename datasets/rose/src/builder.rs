//! Entry point tying a configuration to its metadata, splits and examples

use std::fs::File;
use std::io::BufReader;

use tracing::info;

use crate::config::{ConfigName, ConfigSpec};
use crate::corpus::{CorpusProvider, JsonlCorpus};
use crate::error::{RoseError, RoseResult};
use crate::examples::Examples;
use crate::info::DatasetInfo;
use crate::settings::RoseSettings;
use crate::splits::{split_generators, GenKwargs, SplitGenerator};

/// Builder for one configuration of the benchmark
#[derive(Debug, Clone)]
pub struct RoseBuilder {
    config: ConfigName,
    settings: RoseSettings,
}

impl RoseBuilder {
    /// Resolve a configuration by name
    ///
    /// Unknown names fail here, before any I/O.
    pub fn new(name: &str, settings: RoseSettings) -> RoseResult<Self> {
        let config = name.parse()?;
        Ok(Self::from_config(config, settings))
    }

    pub fn from_config(config: ConfigName, settings: RoseSettings) -> Self {
        Self { config, settings }
    }

    pub fn config(&self) -> ConfigName {
        self.config
    }

    pub fn spec(&self) -> &'static ConfigSpec {
        self.config.spec()
    }

    pub fn settings(&self) -> &RoseSettings {
        &self.settings
    }

    /// Corpus provider reading the exports under the configured corpus dir
    pub fn local_corpus(&self) -> JsonlCorpus {
        JsonlCorpus::new(&self.settings.corpus_dir)
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo::for_config(self.spec())
    }

    pub fn split_generators(&self) -> Vec<SplitGenerator> {
        split_generators(self.spec(), &self.settings.data_dir)
    }

    /// Start a pass for the given split arguments
    pub fn generate_examples(
        &self,
        kwargs: &GenKwargs,
        provider: &dyn CorpusProvider,
    ) -> RoseResult<Examples<BufReader<File>>> {
        info!(
            config = %self.config,
            dataset = %kwargs.dataset,
            split = %kwargs.split,
            "Generating examples"
        );
        Examples::open(kwargs, self.spec(), provider)
    }

    /// Start a pass over the configuration's `data` split
    pub fn examples(
        &self,
        provider: &dyn CorpusProvider,
    ) -> RoseResult<Examples<BufReader<File>>> {
        let generators = self.split_generators();
        let generator = generators
            .first()
            .ok_or_else(|| RoseError::Corpus(format!("{} declares no splits", self.config)))?;
        self.generate_examples(&generator.gen_kwargs, provider)
    }
}
