//! RoSE benchmark loader
//!
//! Human-annotated summary evaluation data from the RoSE benchmark, built on
//! Atomic Content Units (ACUs). Annotation files ship without their source
//! documents; each pass joins them against the original corpus
//! (CNN/DailyMail, XSum or SAMSum) and yields the enriched records.
//!
//! ## Configurations
//!
//! - `cnndm_test`, `cnndm_validation`: ACU annotations on CNN/DailyMail
//! - `cnndm_protocol`: per-annotator prior / ref-based / ref-free scores
//! - `cnndm_protocol_gpt3`: float-valued protocol scores, reference scored as a system
//! - `xsum`, `samsum`: ACU annotations on XSum and SAMSum
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rose::{RoseBuilder, RoseSettings};
//!
//! let builder = RoseBuilder::new("cnndm_test", RoseSettings::load()?)?;
//! let corpus = builder.local_corpus();
//! for item in builder.examples(&corpus)? {
//!     let (index, example) = item?;
//!     // ...
//! }
//! ```

pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod examples;
pub mod features;
pub mod info;
pub mod settings;
pub mod splits;

// Re-export important items
pub use builder::RoseBuilder;
pub use config::{ConfigName, ConfigSpec, DatasetFamily, KeyKind, Split, REFERENCE_SYSTEM};
pub use corpus::{
    CorpusIndex, CorpusProvider, CorpusRecord, InMemoryCorpus, JoinKey, JsonlCorpus,
};
pub use error::{RoseError, RoseResult};
pub use examples::{Example, Examples, REFERENCE_SENTINEL};
pub use features::{Dtype, Feature, Features};
pub use info::{DatasetInfo, ARCHIVE_URL};
pub use settings::RoseSettings;
pub use splits::{GenKwargs, SplitGenerator};
