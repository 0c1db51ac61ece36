//! Run summary aggregation across datasets.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::schema::Dataset;

/// Result of one warehouse load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
    pub duration: Duration,
}

/// Overall outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every dataset loaded.
    Success,
    /// At least one dataset failed, others completed.
    Partial,
    /// Every dataset failed.
    Failure,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Partial => "PARTIAL",
            RunStatus::Failure => "FAILURE",
        }
    }
}

/// Per-dataset counts and outcome.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub dataset: Dataset,
    pub records_seen: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Rejections broken down by reason code.
    pub rejected_by_reason: BTreeMap<String, usize>,
    /// Treatments whose patient_id never appeared in the patients dataset.
    /// Informational only; such records are loaded, not rejected.
    pub orphan_references: Option<usize>,
    pub load_duration: Option<Duration>,
    /// Fatal error text when this dataset's run aborted.
    pub error: Option<String>,
}

impl DatasetSummary {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            records_seen: 0,
            accepted: 0,
            rejected: 0,
            rejected_by_reason: BTreeMap::new(),
            orphan_references: None,
            load_duration: None,
            error: None,
        }
    }

    pub fn failed(dataset: Dataset, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(dataset)
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregated result of one run, always produced even on total failure.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub datasets: Vec<DatasetSummary>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn status(&self) -> RunStatus {
        let attempted = self.datasets.len();
        let failed = self.datasets.iter().filter(|d| !d.succeeded()).count();
        if failed == 0 {
            RunStatus::Success
        } else if failed == attempted {
            RunStatus::Failure
        } else {
            RunStatus::Partial
        }
    }

    pub fn total_accepted(&self) -> usize {
        self.datasets.iter().map(|d| d.accepted).sum()
    }

    pub fn total_rejected(&self) -> usize {
        self.datasets.iter().map(|d| d.rejected).sum()
    }
}
