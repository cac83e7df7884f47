//! Mock metadata index for testing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::index::{IndexError, IndexFilter, IndexRecord, MetadataIndex};

/// In-memory metadata index with failure injection.
pub struct MockMetadataIndex {
    records: RwLock<Vec<IndexRecord>>,
    next_error: RwLock<Option<IndexError>>,
    closed: AtomicBool,
}

impl MockMetadataIndex {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_error: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// The next insert or lookup fails with `error`.
    pub fn set_next_error(&self, error: IndexError) {
        *self.next_error.write().unwrap() = Some(error);
    }

    pub fn records(&self) -> Vec<IndexRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), IndexError> {
        if self.is_closed() {
            return Err(IndexError::Closed);
        }
        match self.next_error.write().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MockMetadataIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockMetadataIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockMetadataIndex")
            .field("records", &self.records.read().map(|r| r.len()).unwrap_or(0))
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl MetadataIndex for MockMetadataIndex {
    fn insert(&self, record: &IndexRecord) -> Result<(), IndexError> {
        if record.repository_id.trim().is_empty() {
            return Err(IndexError::MissingRepositoryId);
        }
        self.check()?;
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    fn find_one(&self, filter: &IndexFilter) -> Result<String, IndexError> {
        self.check()?;
        let records = self.records.read().unwrap();
        // Later inserts win ties on indexed_at.
        records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(&r.metadata))
            .max_by_key(|(seq, r)| (r.indexed_at, *seq))
            .map(|(_, r)| r.repository_id.clone())
            .ok_or(IndexError::NotFound)
    }

    fn close(&self) -> Result<(), IndexError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
