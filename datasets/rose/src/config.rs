//! Configuration table for the six RoSE variants
//!
//! Each variant maps to one static [`ConfigSpec`] row: which corpus and split
//! it joins against, which annotation file it reads, which systems were
//! evaluated, and which score-record shape applies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RoseError;

/// Source corpus family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFamily {
    /// CNN/DailyMail news articles
    Cnndm,
    /// Extreme summarization (BBC articles)
    Xsum,
    /// Messenger-style dialogues
    Samsum,
}

/// How annotation records find their corpus entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Explicit `id` field on the corpus, `example_id` on the annotation
    Identifier,
    /// Corpus iteration position, `count_id` on the annotation
    Position,
}

impl DatasetFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetFamily::Cnndm => "cnndm",
            DatasetFamily::Xsum => "xsum",
            DatasetFamily::Samsum => "samsum",
        }
    }

    /// Name of the hosted corpus the family joins against
    pub fn corpus_name(&self) -> &'static str {
        match self {
            DatasetFamily::Cnndm => "cnn_dailymail",
            DatasetFamily::Xsum => "xsum",
            DatasetFamily::Samsum => "samsum",
        }
    }

    /// Corpus version, if the hosted corpus is versioned
    pub fn corpus_version(&self) -> Option<&'static str> {
        match self {
            DatasetFamily::Cnndm => Some("3.0.0"),
            _ => None,
        }
    }

    /// Corpus field holding the source text
    pub fn source_field(&self) -> &'static str {
        match self {
            DatasetFamily::Cnndm => "article",
            DatasetFamily::Xsum => "document",
            DatasetFamily::Samsum => "dialogue",
        }
    }

    /// Corpus field holding the human reference summary
    pub fn reference_field(&self) -> &'static str {
        match self {
            DatasetFamily::Cnndm => "highlights",
            DatasetFamily::Xsum | DatasetFamily::Samsum => "summary",
        }
    }

    pub fn key_kind(&self) -> KeyKind {
        match self {
            DatasetFamily::Samsum => KeyKind::Position,
            _ => KeyKind::Identifier,
        }
    }
}

impl fmt::Display for DatasetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetFamily {
    type Err = RoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cnndm" => Ok(DatasetFamily::Cnndm),
            "xsum" => Ok(DatasetFamily::Xsum),
            "samsum" => Ok(DatasetFamily::Samsum),
            _ => Err(RoseError::UnknownIdentifier {
                kind: "dataset",
                value: s.to_string(),
            }),
        }
    }
}

/// Corpus split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Test,
    Validation,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Test => "test",
            Split::Validation => "validation",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = RoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Split::Test),
            "validation" => Ok(Split::Validation),
            _ => Err(RoseError::UnknownIdentifier {
                kind: "split",
                value: s.to_string(),
            }),
        }
    }
}

/// The system name denoting the human-written reference summary
pub const REFERENCE_SYSTEM: &str = "reference";

const CNNDM_TEST_SYSTEMS: &[&str] = &[
    "bart", "gold", "pegasus", "brio", "gsum", "simcls", "cliff", "ctrlsum", "frost", "glob",
    "matchsum", "brio-ext",
];

const CNNDM_VALIDATION_SYSTEMS: &[&str] = &[
    "pegasus", "gsum", "matchsum", "bart", "brio-ext", "brio", "simcls", "cliff",
];

const CNNDM_GPT3_SYSTEMS: &[&str] = &["bart", "brio", "t0", "gpt3", REFERENCE_SYSTEM];

const XSUM_SYSTEMS: &[&str] = &[
    "brio",
    "frost",
    "bart",
    "cliff",
    "bart.beam_patience",
    "pegasus",
    "brio-ranking",
    "cliff-pegasus",
];

const SAMSUM_SYSTEMS: &[&str] = &[
    "BART",
    "PEGASUS",
    "MV-BART",
    "CODS",
    "S-BART",
    "PLM-BART",
    "Ctrl-DiaSumm",
    "UniLM",
];

/// One row of the configuration table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSpec {
    pub name: &'static str,
    pub dataset: DatasetFamily,
    pub split: Split,
    /// Annotation file name inside the extracted archive
    pub file_name: &'static str,
    /// Evaluated systems, in declaration order
    pub systems: &'static [&'static str],
    /// Carries per-annotator prior / ref_based / ref_free scores
    pub protocol: bool,
    /// Scores are floats and the reference is scored as a system
    pub gpt3: bool,
}

static CONFIGS: [ConfigSpec; 6] = [
    ConfigSpec {
        name: "cnndm_test",
        dataset: DatasetFamily::Cnndm,
        split: Split::Test,
        file_name: "cnndm.test.acus.aggregated.jsonl",
        systems: CNNDM_TEST_SYSTEMS,
        protocol: false,
        gpt3: false,
    },
    ConfigSpec {
        name: "cnndm_validation",
        dataset: DatasetFamily::Cnndm,
        split: Split::Validation,
        file_name: "cnndm.val.acus.aggregated.jsonl",
        systems: CNNDM_VALIDATION_SYSTEMS,
        protocol: false,
        gpt3: false,
    },
    ConfigSpec {
        name: "cnndm_protocol",
        dataset: DatasetFamily::Cnndm,
        split: Split::Test,
        file_name: "cnndm.test.protocols.aggregated.jsonl",
        systems: CNNDM_TEST_SYSTEMS,
        protocol: true,
        gpt3: false,
    },
    ConfigSpec {
        name: "cnndm_protocol_gpt3",
        dataset: DatasetFamily::Cnndm,
        split: Split::Test,
        file_name: "cnndm.test.protocols-gpt3.aggregated.jsonl",
        systems: CNNDM_GPT3_SYSTEMS,
        protocol: true,
        gpt3: true,
    },
    ConfigSpec {
        name: "xsum",
        dataset: DatasetFamily::Xsum,
        split: Split::Test,
        file_name: "xsum.test.acus.aggregated.jsonl",
        systems: XSUM_SYSTEMS,
        protocol: false,
        gpt3: false,
    },
    ConfigSpec {
        name: "samsum",
        dataset: DatasetFamily::Samsum,
        split: Split::Test,
        file_name: "samsum.test.acus.aggregated.jsonl",
        systems: SAMSUM_SYSTEMS,
        protocol: false,
        gpt3: false,
    },
];

/// Dataset configuration variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigName {
    CnndmTest,
    CnndmValidation,
    CnndmProtocol,
    CnndmProtocolGpt3,
    Xsum,
    Samsum,
}

impl ConfigName {
    pub const ALL: [ConfigName; 6] = [
        ConfigName::CnndmTest,
        ConfigName::CnndmValidation,
        ConfigName::CnndmProtocol,
        ConfigName::CnndmProtocolGpt3,
        ConfigName::Xsum,
        ConfigName::Samsum,
    ];

    /// The table row for this variant
    pub fn spec(&self) -> &'static ConfigSpec {
        match self {
            ConfigName::CnndmTest => &CONFIGS[0],
            ConfigName::CnndmValidation => &CONFIGS[1],
            ConfigName::CnndmProtocol => &CONFIGS[2],
            ConfigName::CnndmProtocolGpt3 => &CONFIGS[3],
            ConfigName::Xsum => &CONFIGS[4],
            ConfigName::Samsum => &CONFIGS[5],
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for ConfigName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigName {
    type Err = RoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RoseError::UnknownConfig {
                name: s.to_string(),
                known: ConfigName::ALL
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl ConfigSpec {
    /// Systems that have a generated summary (everything but the reference)
    pub fn summary_systems(&self) -> impl Iterator<Item = &'static str> {
        self.systems
            .iter()
            .copied()
            .filter(|s| *s != REFERENCE_SYSTEM)
    }

    /// Whether the reference-derived ACU list is part of the schema
    pub fn has_reference_acus(&self) -> bool {
        !self.protocol || self.gpt3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_round_trip() {
        for config in ConfigName::ALL {
            let parsed: ConfigName = config.as_str().parse().unwrap();
            assert_eq!(parsed, config);
            assert_eq!(config.to_string(), config.spec().name);
        }
    }

    #[test]
    fn test_unknown_config_lists_known_names() {
        let err = "cnndm_train".parse::<ConfigName>().unwrap_err();
        match err {
            RoseError::UnknownConfig { name, known } => {
                assert_eq!(name, "cnndm_train");
                assert!(known.contains("cnndm_protocol_gpt3"));
                assert!(known.contains("samsum"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_systems_non_empty_and_unique() {
        for config in ConfigName::ALL {
            let systems = config.spec().systems;
            assert!(!systems.is_empty(), "{config} has no systems");
            let mut sorted = systems.to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), systems.len(), "{config} repeats a system");
        }
    }

    #[test]
    fn test_protocol_flags() {
        let flags: Vec<(bool, bool)> = ConfigName::ALL
            .iter()
            .map(|c| (c.spec().protocol, c.spec().gpt3))
            .collect();
        assert_eq!(
            flags,
            vec![
                (false, false),
                (false, false),
                (true, false),
                (true, true),
                (false, false),
                (false, false),
            ]
        );
    }

    #[test]
    fn test_reference_system_only_in_gpt3() {
        for config in ConfigName::ALL {
            let spec = config.spec();
            assert_eq!(spec.systems.contains(&REFERENCE_SYSTEM), spec.gpt3);
            assert!(spec.summary_systems().all(|s| s != REFERENCE_SYSTEM));
        }
        assert_eq!(ConfigName::CnndmProtocolGpt3.spec().summary_systems().count(), 4);
    }

    #[test]
    fn test_family_fields() {
        assert_eq!(DatasetFamily::Cnndm.source_field(), "article");
        assert_eq!(DatasetFamily::Cnndm.reference_field(), "highlights");
        assert_eq!(DatasetFamily::Xsum.source_field(), "document");
        assert_eq!(DatasetFamily::Samsum.source_field(), "dialogue");
        assert_eq!(DatasetFamily::Samsum.key_kind(), KeyKind::Position);
        assert_eq!(DatasetFamily::Xsum.key_kind(), KeyKind::Identifier);
    }

    #[test]
    fn test_family_and_split_parse() {
        assert_eq!("xsum".parse::<DatasetFamily>().unwrap(), DatasetFamily::Xsum);
        assert_eq!("validation".parse::<Split>().unwrap(), Split::Validation);
        assert!(matches!(
            "train".parse::<Split>(),
            Err(RoseError::UnknownIdentifier { kind: "split", .. })
        ));
    }
}
