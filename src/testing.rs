//! Test support: a writer that keeps every record in memory.

use std::sync::{Arc, Mutex, PoisonError};

use crate::{Record, RecordWriter};

#[derive(Debug, Default)]
pub struct CaptureWriter {
    records: Mutex<Vec<Record>>,
}

impl CaptureWriter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of every record written so far.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Record> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordWriter for CaptureWriter {
    fn write(&self, record: &Record) {
        self.lock().push(record.clone());
    }
}
