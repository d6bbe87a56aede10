//! Streaming reader for newline-delimited JSON
//!
//! Every physical line is one record. Blank lines are not skipped: they fail
//! to parse like any other malformed line, so indices always match line
//! numbers in the file.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while reading a JSON-lines source
#[derive(Error, Debug)]
pub enum JsonlError {
    /// The file could not be opened
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a line failed
    #[error("failed to read line {line}: {source}")]
    Read {
        /// Zero-based line index
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A line did not decode into the expected value
    #[error("malformed JSON on line {line}: {source}")]
    Parse {
        /// Zero-based line index
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for JSON-lines operations
pub type JsonlResult<T> = Result<T, JsonlError>;

/// Forward-only iterator over `(line index, record)` pairs
///
/// Each line is decoded independently, in file order.
pub struct JsonLines<R, T = serde_json::Value> {
    lines: Lines<R>,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonLines<BufReader<File>, T> {
    /// Open a file for line-by-line decoding
    pub fn open(path: impl AsRef<Path>) -> JsonlResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| JsonlError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead, T: DeserializeOwned> JsonLines<R, T> {
    /// Wrap any buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            index: 0,
            _marker: PhantomData,
        }
    }

    /// Number of lines consumed so far
    pub fn position(&self) -> usize {
        self.index
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for JsonLines<R, T> {
    type Item = JsonlResult<(usize, T)>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        let index = self.index;
        self.index += 1;

        let item = match line {
            Ok(text) => serde_json::from_str(&text)
                .map(|value| (index, value))
                .map_err(|source| JsonlError::Parse {
                    line: index,
                    source,
                }),
            Err(source) => Err(JsonlError::Read {
                line: index,
                source,
            }),
        };
        Some(item)
    }
}
