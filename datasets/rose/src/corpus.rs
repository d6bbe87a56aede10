//! External source corpora and the identifier-keyed join index

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rose_common::JsonLines;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{DatasetFamily, KeyKind, Split};
use crate::error::{RoseError, RoseResult};

/// One record of a source corpus (article / dialogue plus reference summary)
pub type CorpusRecord = Map<String, Value>;

/// Corpus field carrying the explicit identifier
pub const CORPUS_ID_FIELD: &str = "id";

/// Supplies the full split of a source corpus
///
/// Implementations return records in the corpus' canonical iteration order;
/// positional joins depend on it.
pub trait CorpusProvider {
    fn load(&self, dataset: DatasetFamily, split: Split) -> RoseResult<Vec<CorpusRecord>>;
}

/// Corpus exported as JSON lines under `<root>/<corpus name>/<split>.jsonl`
#[derive(Debug, Clone)]
pub struct JsonlCorpus {
    root: PathBuf,
}

impl JsonlCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the export for a corpus split
    pub fn split_path(&self, dataset: DatasetFamily, split: Split) -> PathBuf {
        self.root
            .join(dataset.corpus_name())
            .join(format!("{}.jsonl", split))
    }
}

impl CorpusProvider for JsonlCorpus {
    fn load(&self, dataset: DatasetFamily, split: Split) -> RoseResult<Vec<CorpusRecord>> {
        let path = self.split_path(dataset, split);
        info!("Loading {} {} corpus from {:?}", dataset.corpus_name(), split, path);

        let records = JsonLines::<_, CorpusRecord>::open(&path)
            .map_err(|e| RoseError::Corpus(e.to_string()))?
            .map(|item| item.map(|(_, record)| record))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RoseError::Corpus(format!("{}: {}", path.display(), e)))?;

        info!("Loaded {} corpus records", records.len());
        Ok(records)
    }
}

/// Corpus records held in memory, per (dataset, split)
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    splits: HashMap<(DatasetFamily, Split), Vec<CorpusRecord>>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split(
        mut self,
        dataset: DatasetFamily,
        split: Split,
        records: Vec<CorpusRecord>,
    ) -> Self {
        self.splits.insert((dataset, split), records);
        self
    }
}

impl CorpusProvider for InMemoryCorpus {
    fn load(&self, dataset: DatasetFamily, split: Split) -> RoseResult<Vec<CorpusRecord>> {
        self.splits.get(&(dataset, split)).cloned().ok_or_else(|| {
            RoseError::Corpus(format!(
                "no {} {} split available",
                dataset.corpus_name(),
                split
            ))
        })
    }
}

/// Key joining an annotation record to its corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Id(String),
    Position(usize),
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKey::Id(id) => write!(f, "id '{}'", id),
            JoinKey::Position(pos) => write!(f, "position {}", pos),
        }
    }
}

/// In-memory join index over one corpus split
///
/// Records are kept as loaded. Only the identifier is read up front; the
/// text fields are read when a record is joined. Built once per pass and
/// dropped with it.
#[derive(Debug)]
pub struct CorpusIndex {
    dataset: DatasetFamily,
    entries: HashMap<JoinKey, CorpusRecord>,
}

impl CorpusIndex {
    /// Index corpus records by position (dialogues) or by their `id` field
    ///
    /// Later records win when identifiers repeat.
    pub fn build(dataset: DatasetFamily, records: Vec<CorpusRecord>) -> RoseResult<Self> {
        let mut entries = HashMap::with_capacity(records.len());

        for (position, record) in records.into_iter().enumerate() {
            let key = match dataset.key_kind() {
                KeyKind::Position => JoinKey::Position(position),
                KeyKind::Identifier => JoinKey::Id(record_id(&record, position)?),
            };
            entries.insert(key, record);
        }

        debug!(dataset = %dataset, entries = entries.len(), "Built corpus index");
        Ok(Self { dataset, entries })
    }

    /// Load a split through a provider and index it
    pub fn load(
        provider: &dyn CorpusProvider,
        dataset: DatasetFamily,
        split: Split,
    ) -> RoseResult<Self> {
        let records = provider.load(dataset, split)?;
        Self::build(dataset, records)
    }

    pub fn dataset(&self) -> DatasetFamily {
        self.dataset
    }

    pub fn get(&self, key: &JoinKey) -> Option<&CorpusRecord> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Identifier of a corpus record; numeric ids are keyed by their decimal text
fn record_id(record: &CorpusRecord, position: usize) -> RoseResult<String> {
    match record.get(CORPUS_ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RoseError::Corpus(format!(
            "record {} has no '{}' field",
            position, CORPUS_ID_FIELD
        ))),
    }
}
