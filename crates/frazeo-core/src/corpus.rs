use crate::{FrazeoError, FrazeoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dense, 0-based position of a record in the [`Corpus`].
pub type IdiomId = usize;

/// A single idiom and its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdiomRecord {
    /// The idiom itself, e.g. "бить баклуши".
    pub phrase: String,
    /// Its explanation.
    pub definition: String,
}

impl IdiomRecord {
    /// Creates a record from a phrase and its definition.
    pub fn new(phrase: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            definition: definition.into(),
        }
    }
}

/// Immutable in-memory table of idioms, loaded once at startup.
///
/// Record ids are the line order of the source file. The corpus is never
/// empty: every component downstream (random idiom, index alignment) relies
/// on at least one record existing.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<IdiomRecord>,
}

impl Corpus {
    /// Read a tab-separated corpus file (`phrase\tdefinition` per line).
    pub fn load(path: &Path) -> FrazeoResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| FrazeoError::MalformedCorpus {
            line: 0,
            reason: format!("failed to read '{}': {e}", path.display()),
        })?;
        let corpus = Self::parse(&data)?;
        tracing::info!(path = %path.display(), records = corpus.len(), "Corpus loaded");
        Ok(corpus)
    }

    /// Parse corpus text. Fails on the first line that is not exactly two
    /// non-empty tab-separated fields.
    pub fn parse(data: &str) -> FrazeoResult<Self> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        let mut records = Vec::new();
        for (idx, raw) in data.lines().enumerate() {
            let line = idx + 1;
            let fields: Vec<&str> = raw.trim_end_matches('\r').split('\t').collect();
            if fields.len() != 2 {
                return Err(FrazeoError::MalformedCorpus {
                    line,
                    reason: format!("expected 2 tab-separated fields, found {}", fields.len()),
                });
            }
            let phrase = fields[0].trim();
            let definition = fields[1].trim();
            if phrase.is_empty() || definition.is_empty() {
                return Err(FrazeoError::MalformedCorpus {
                    line,
                    reason: "empty phrase or definition".into(),
                });
            }
            records.push(IdiomRecord::new(phrase, definition));
        }
        Self::from_records(records)
    }

    /// Build a corpus from already-parsed records.
    pub fn from_records(records: Vec<IdiomRecord>) -> FrazeoResult<Self> {
        if records.is_empty() {
            return Err(FrazeoError::MalformedCorpus {
                line: 0,
                reason: "corpus is empty".into(),
            });
        }
        Ok(Self { records })
    }

    /// Record by id, if in range.
    pub fn get(&self, id: IdiomId) -> Option<&IdiomRecord> {
        self.records.get(id)
    }

    /// Number of records. Ids are exactly `0..len()`.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(id, record)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (IdiomId, &IdiomRecord)> {
        self.records.iter().enumerate()
    }
}
