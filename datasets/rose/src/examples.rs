//! The join-and-yield pass
//!
//! Streams annotation records from a JSON-lines file, joins each against the
//! source corpus, and yields `(line index, record)` pairs in file order. The
//! first error ends the pass.

use std::fs::File;
use std::io::{BufRead, BufReader};

use rose_common::JsonLines;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::{ConfigSpec, KeyKind, REFERENCE_SYSTEM};
use crate::corpus::{CorpusIndex, CorpusProvider, JoinKey};
use crate::error::{RoseError, RoseResult};
use crate::splits::GenKwargs;

/// One produced dataset example
pub type Example = Map<String, Value>;

/// Sentinel written into the reference's self-comparison scores
pub const REFERENCE_SENTINEL: i64 = -1;

/// Forward-only iterator over the examples of one pass
pub struct Examples<R> {
    lines: JsonLines<R, Example>,
    corpus: CorpusIndex,
    spec: &'static ConfigSpec,
    yielded: usize,
    done: bool,
}

impl Examples<BufReader<File>> {
    /// Start a pass over the annotation file named by `kwargs`
    ///
    /// The corpus split named by `kwargs` is loaded and indexed before this
    /// returns; `spec` decides the configuration-specific patching.
    pub fn open(
        kwargs: &GenKwargs,
        spec: &'static ConfigSpec,
        provider: &dyn CorpusProvider,
    ) -> RoseResult<Self> {
        let corpus = CorpusIndex::load(provider, kwargs.dataset, kwargs.split)?;
        let lines = JsonLines::open(&kwargs.acu_file)?;
        debug!(config = spec.name, file = %kwargs.acu_file.display(), "Starting pass");
        Ok(Self::with_index(lines, spec, corpus))
    }
}

impl<R: BufRead> Examples<R> {
    /// Start a pass over any buffered reader, joining against the
    /// configuration's own corpus split
    pub fn from_reader(
        reader: R,
        spec: &'static ConfigSpec,
        provider: &dyn CorpusProvider,
    ) -> RoseResult<Self> {
        let corpus = CorpusIndex::load(provider, spec.dataset, spec.split)?;
        Ok(Self::with_index(JsonLines::new(reader), spec, corpus))
    }

    fn with_index(
        lines: JsonLines<R, Example>,
        spec: &'static ConfigSpec,
        corpus: CorpusIndex,
    ) -> Self {
        Self {
            lines,
            corpus,
            spec,
            yielded: 0,
            done: false,
        }
    }

    fn enrich(&self, line: usize, mut record: Example) -> RoseResult<Example> {
        let dataset = self.corpus.dataset();
        let key = join_key(dataset.key_kind(), line, &record)?;
        let Some(entry) = self.corpus.get(&key) else {
            return Err(RoseError::MissingKey { line, key });
        };

        let field = |name: &'static str| {
            entry
                .get(name)
                .cloned()
                .ok_or_else(|| RoseError::MissingCorpusField {
                    line,
                    key: key.clone(),
                    field: name,
                })
        };
        let source = field(dataset.source_field())?;
        let reference = field(dataset.reference_field())?;

        // Corpus values are copied as-is and replace anything already present
        record.insert("source".to_string(), source);
        record.insert("reference".to_string(), reference);

        if self.spec.gpt3 {
            patch_reference_scores(&mut record)?;
        }

        Ok(record)
    }
}

impl<R: BufRead> Iterator for Examples<R> {
    type Item = RoseResult<(usize, Example)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match self.lines.next() {
            Some(Ok((line, record))) => self.enrich(line, record).map(|r| (line, r)),
            Some(Err(e)) => Err(e.into()),
            None => {
                self.done = true;
                info!(
                    config = self.spec.name,
                    examples = self.yielded,
                    "Pass complete"
                );
                return None;
            }
        };

        match &result {
            Ok(_) => self.yielded += 1,
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

/// Resolve the corpus key of an annotation record
fn join_key(kind: KeyKind, line: usize, record: &Example) -> RoseResult<JoinKey> {
    match kind {
        KeyKind::Position => record
            .get("count_id")
            .and_then(position)
            .map(JoinKey::Position)
            .ok_or(RoseError::MissingField {
                line,
                field: "count_id",
            }),
        KeyKind::Identifier => record
            .get("example_id")
            .and_then(Value::as_str)
            .map(|id| JoinKey::Id(id.to_string()))
            .ok_or(RoseError::MissingField {
                line,
                field: "example_id",
            }),
    }
}

/// Non-negative integral position; `2.0` counts as `2`
fn position(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return Some(n as usize);
    }
    value
        .as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as usize)
}

/// Give the reference a schema-shaped score record with no self-comparison
fn patch_reference_scores(record: &mut Example) -> RoseResult<()> {
    let annotations = record
        .entry("annotations")
        .or_insert_with(|| Value::Object(Map::new()));
    let annotations = annotations.as_object_mut().ok_or_else(|| RoseError::Schema {
        path: "annotations".to_string(),
        expected: "struct".to_string(),
    })?;

    let reference = annotations
        .entry(REFERENCE_SYSTEM)
        .or_insert_with(|| Value::Object(Map::new()));
    let reference = reference.as_object_mut().ok_or_else(|| RoseError::Schema {
        path: format!("annotations.{}", REFERENCE_SYSTEM),
        expected: "struct".to_string(),
    })?;

    reference.insert("ref_based".to_string(), json!(REFERENCE_SENTINEL));
    reference.insert("acu".to_string(), json!(REFERENCE_SENTINEL));
    reference.insert("normalized_acu".to_string(), json!(REFERENCE_SENTINEL));
    reference.insert("acu_labels".to_string(), json!([]));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigName, DatasetFamily, Split};
    use crate::corpus::{CorpusRecord, InMemoryCorpus};
    use rose_common::JsonlError;
    use std::io::Cursor;

    fn record(value: Value) -> CorpusRecord {
        value.as_object().cloned().unwrap()
    }

    fn cnndm_corpus() -> InMemoryCorpus {
        InMemoryCorpus::new().with_split(
            DatasetFamily::Cnndm,
            Split::Test,
            vec![
                record(json!({"id": "ex1", "article": "S", "highlights": "R"})),
                record(json!({"id": "ex2", "article": "S2", "highlights": "R2"})),
            ],
        )
    }

    fn run(
        config: ConfigName,
        input: &str,
        corpus: &InMemoryCorpus,
    ) -> Vec<RoseResult<(usize, Example)>> {
        Examples::from_reader(Cursor::new(input.to_string()), config.spec(), corpus)
            .unwrap()
            .collect()
    }

    #[test]
    fn test_join_fills_source_and_reference() {
        let input = r#"{"example_id": "ex1", "count_id": 0, "reference_acus": ["a", "b"]}"#;
        let results = run(ConfigName::CnndmTest, input, &cnndm_corpus());

        assert_eq!(results.len(), 1);
        let (index, example) = results.into_iter().next().unwrap().unwrap();
        assert_eq!(index, 0);
        assert_eq!(example["source"], "S");
        assert_eq!(example["reference"], "R");
        assert_eq!(example["example_id"], "ex1");
        assert_eq!(example["count_id"], 0);
        assert_eq!(example["reference_acus"], json!(["a", "b"]));
    }

    #[test]
    fn test_existing_source_is_overwritten() {
        let input = r#"{"example_id": "ex2", "source": "stale", "reference": "stale"}"#;
        let results = run(ConfigName::CnndmTest, input, &cnndm_corpus());

        let (_, example) = results.into_iter().next().unwrap().unwrap();
        assert_eq!(example["source"], "S2");
        assert_eq!(example["reference"], "R2");
    }

    #[test]
    fn test_indices_follow_lines_with_repeated_keys() {
        let input = "{\"example_id\": \"ex1\"}\n{\"example_id\": \"ex1\"}\n{\"example_id\": \"ex2\"}\n{\"example_id\": \"ex1\"}\n";
        let indices: Vec<usize> = run(ConfigName::CnndmTest, input, &cnndm_corpus())
            .into_iter()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_missing_key_stops_the_pass() {
        let input = "{\"example_id\": \"ex1\"}\n{\"example_id\": \"nope\"}\n{\"example_id\": \"ex2\"}\n";
        let results = run(ConfigName::CnndmTest, input, &cnndm_corpus());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().0, 0);
        match &results[1] {
            Err(RoseError::MissingKey { line, key }) => {
                assert_eq!(*line, 1);
                assert_eq!(key, &JoinKey::Id("nope".into()));
            }
            other => panic!("expected missing key, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_line_stops_the_pass() {
        let input = "{\"example_id\": \"ex1\"}\n{\"example_id\": \n{\"example_id\": \"ex2\"}\n";
        let results = run(ConfigName::CnndmTest, input, &cnndm_corpus());

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[1],
            Err(RoseError::Jsonl(JsonlError::Parse { line: 1, .. }))
        ));
    }

    #[test]
    fn test_missing_join_field() {
        let input = r#"{"count_id": 0}"#;
        let results = run(ConfigName::CnndmTest, input, &cnndm_corpus());
        assert!(matches!(
            results[0],
            Err(RoseError::MissingField {
                line: 0,
                field: "example_id"
            })
        ));
    }

    #[test]
    fn test_dialogue_joins_by_position() {
        let corpus = InMemoryCorpus::new().with_split(
            DatasetFamily::Samsum,
            Split::Test,
            vec![
                record(json!({"id": "2", "dialogue": "D0", "summary": "S0"})),
                record(json!({"id": "1", "dialogue": "D1", "summary": "S1"})),
                record(json!({"id": "0", "dialogue": "D2", "summary": "S2"})),
            ],
        );
        let input = r#"{"count_id": 2, "example_id": "0"}"#;
        let (_, example) = run(ConfigName::Samsum, input, &corpus)
            .into_iter()
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(example["source"], "D2");
        assert_eq!(example["reference"], "S2");
    }

    #[test]
    fn test_integral_float_count_id_joins() {
        let corpus = InMemoryCorpus::new().with_split(
            DatasetFamily::Samsum,
            Split::Test,
            vec![
                record(json!({"id": "2", "dialogue": "D0", "summary": "S0"})),
                record(json!({"id": "1", "dialogue": "D1", "summary": "S1"})),
                record(json!({"id": "0", "dialogue": "D2", "summary": "S2"})),
            ],
        );
        let input = "{\"count_id\": 2.0}\n{\"count_id\": 2.5}\n";
        let results = run(ConfigName::Samsum, input, &corpus);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().1["source"], "D2");
        assert!(matches!(
            results[1],
            Err(RoseError::MissingField {
                line: 1,
                field: "count_id"
            })
        ));
    }

    #[test]
    fn test_unjoined_defective_record_is_ignored() {
        let corpus = InMemoryCorpus::new().with_split(
            DatasetFamily::Cnndm,
            Split::Test,
            vec![
                record(json!({"id": "ex1", "article": "S", "highlights": "R"})),
                record(json!({"id": "other", "article": "S2", "highlights": null})),
                record(json!({"id": "bare"})),
            ],
        );
        let results = run(ConfigName::CnndmTest, r#"{"example_id": "ex1"}"#, &corpus);

        assert_eq!(results.len(), 1);
        let (index, example) = results.into_iter().next().unwrap().unwrap();
        assert_eq!(index, 0);
        assert_eq!(example["source"], "S");
        assert_eq!(example["reference"], "R");
    }

    #[test]
    fn test_joined_record_without_text_field_fails() {
        let corpus = InMemoryCorpus::new().with_split(
            DatasetFamily::Cnndm,
            Split::Test,
            vec![
                record(json!({"id": "ex1", "article": "S", "highlights": "R"})),
                record(json!({"id": "bare", "article": "S2"})),
            ],
        );
        let input = "{\"example_id\": \"ex1\"}\n{\"example_id\": \"bare\"}\n{\"example_id\": \"ex1\"}\n";
        let results = run(ConfigName::CnndmTest, input, &corpus);

        assert_eq!(results.len(), 2);
        match &results[1] {
            Err(RoseError::MissingCorpusField { line, key, field }) => {
                assert_eq!(*line, 1);
                assert_eq!(key, &JoinKey::Id("bare".into()));
                assert_eq!(*field, "highlights");
            }
            other => panic!("expected missing corpus field, got {:?}", other),
        }
    }

    #[test]
    fn test_null_corpus_value_is_copied() {
        let corpus = InMemoryCorpus::new().with_split(
            DatasetFamily::Cnndm,
            Split::Test,
            vec![record(json!({"id": "ex1", "article": "S", "highlights": null}))],
        );
        let (_, example) = run(ConfigName::CnndmTest, r#"{"example_id": "ex1"}"#, &corpus)
            .into_iter()
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(example["source"], "S");
        assert_eq!(example["reference"], Value::Null);
    }

    #[test]
    fn test_gpt3_reference_sentinels() {
        let input = r#"{"example_id": "ex1", "annotations": {"reference": {"prior": 4.0, "ref_based": 5.0, "ref_free": 3.5, "acu_labels": [1, 1], "acu": 1.0, "normalized_acu": 0.9}, "gpt3": {"acu": 0.4}}}"#;
        let (_, example) = run(ConfigName::CnndmProtocolGpt3, input, &cnndm_corpus())
            .into_iter()
            .next()
            .unwrap()
            .unwrap();

        let reference = &example["annotations"]["reference"];
        assert_eq!(reference["ref_based"], -1);
        assert_eq!(reference["acu"], -1);
        assert_eq!(reference["normalized_acu"], -1);
        assert_eq!(reference["acu_labels"], json!([]));
        assert_eq!(reference["prior"], 4.0);
        assert_eq!(example["annotations"]["gpt3"]["acu"], 0.4);
    }

    #[test]
    fn test_gpt3_reference_created_when_absent() {
        let input = r#"{"example_id": "ex1"}"#;
        let (_, example) = run(ConfigName::CnndmProtocolGpt3, input, &cnndm_corpus())
            .into_iter()
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(example["annotations"]["reference"]["acu"], -1);
    }

    #[test]
    fn test_reference_untouched_outside_gpt3() {
        let input = r#"{"example_id": "ex1", "annotations": {"bart": {"acu": 0.5}}}"#;
        let (_, example) = run(ConfigName::CnndmProtocol, input, &cnndm_corpus())
            .into_iter()
            .next()
            .unwrap()
            .unwrap();
        assert!(example["annotations"].get("reference").is_none());
    }

    #[test]
    fn test_corpus_failure_surfaces_before_iteration() {
        let empty = InMemoryCorpus::new();
        let result =
            Examples::from_reader(Cursor::new(String::new()), ConfigName::Xsum.spec(), &empty);
        assert!(matches!(result, Err(RoseError::Corpus(_))));
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        assert!(run(ConfigName::CnndmTest, "", &cnndm_corpus()).is_empty());
    }
}
