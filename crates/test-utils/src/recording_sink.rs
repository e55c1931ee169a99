use std::sync::{Arc, Mutex};

use plansolve::errors::{PlansolveError, Result};
use plansolve::progress::{LogRecord, ProgressSink, Severity};

/// A sink that keeps every record in memory.
///
/// Optionally fails once it has accepted `fail_after` records, to exercise
/// forwarder failures.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(n: usize) -> Self {
        Self {
            records: Arc::default(),
            fail_after: Some(n),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.severity == severity)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn record(&self, record: LogRecord) -> Result<()> {
        let mut guard = self.records.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if guard.len() >= limit {
                return Err(PlansolveError::ProgressError(format!(
                    "recording sink full after {limit} records"
                )));
            }
        }
        guard.push(record);
        Ok(())
    }
}
