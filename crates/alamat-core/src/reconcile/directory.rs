use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::error::DirectoryError;
use crate::types::CandidateRecord;

/// Capability to query the authoritative region directory.
///
/// The directory is keyed by postal code, but callers also pass city,
/// sub-district or village names through the same parameter. An empty
/// list means "no data"; transport and parse failures are errors.
pub trait DirectoryLookup {
    fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError>;
}

impl<T: DirectoryLookup + ?Sized> DirectoryLookup for &T {
    fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
        (**self).lookup(key)
    }
}

impl<T: DirectoryLookup + ?Sized> DirectoryLookup for Box<T> {
    fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
        (**self).lookup(key)
    }
}

impl<T: DirectoryLookup + ?Sized> DirectoryLookup for Arc<T> {
    fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
        (**self).lookup(key)
    }
}

/// Directory that never returns candidates; disables reconciliation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDirectory;

impl DirectoryLookup for NoDirectory {
    fn lookup(&self, _key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
        Ok(Vec::new())
    }
}

/// Directory held in memory, in insertion order.
///
/// A key matches a row when it equals the postal code or any region
/// name, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDirectory {
    records: Vec<CandidateRecord>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    /// Loads a JSON array of candidate records.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        Ok(Self::from_records(serde_json::from_str(json)?))
    }

    /// Loads a JSON array of candidate records from a reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        Ok(Self::from_records(serde_json::from_reader(reader)?))
    }

    pub fn push(&mut self, record: CandidateRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CandidateRecord> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = CandidateRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

impl DirectoryLookup for InMemoryDirectory {
    fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
        let found: Vec<CandidateRecord> = self
            .records
            .iter()
            .filter(|record| record.matches_key(key))
            .cloned()
            .collect();
        debug!(key, candidates = found.len(), "in-memory directory lookup");
        Ok(found)
    }
}
