//! Pipeline driver with explicit stages.
//!
//! Per dataset the driver streams Extract -> Validate -> Transform record
//! at a time, then loads the accepted batch and reports. Datasets are
//! independent: a fatal failure in one (unreachable source, corrupt file,
//! exhausted load retries) is folded into that dataset's summary and the
//! remaining datasets still run. The run summary is always produced, even
//! on total failure.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{error, info, info_span, warn};

use hetl_ingest::extract;
use hetl_load::{Loader, RejectsWriter, RetryPolicy, WarehouseSink};
use hetl_model::{Dataset, DatasetSummary, EnrichedRecord, RunSummary, schema_of};
use hetl_transform::transform;
use hetl_validate::{Outcome, Validator};

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding the per-dataset CSV sources.
    pub source_dir: PathBuf,
    /// Append-only rejects diagnostics file.
    pub rejects_path: PathBuf,
    /// Run identifier used for idempotency tagging.
    pub run_id: String,
    /// Datasets to process; empty means all, in registry order.
    pub datasets: Vec<Dataset>,
    pub retry: RetryPolicy,
}

/// Cooperative cancellation, checked at dataset boundaries only. Aborting
/// mid-dataset is treated as a failed load and relies on the idempotent
/// re-run policy.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Execute one run across the requested datasets.
pub fn run<S: WarehouseSink>(
    options: &RunOptions,
    sink: &mut S,
    cancel: Option<&CancelToken>,
) -> RunSummary {
    let started = Instant::now();
    let run_stamp = Utc::now();
    info!(run_id = %options.run_id, "starting pipeline run");

    let mut rejects = match RejectsWriter::open(&options.rejects_path) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // Diagnostics only; the run proceeds without a rejects sink.
            warn!(path = %options.rejects_path.display(), "rejects sink unavailable: {e}");
            None
        }
    };

    // Patients run first so treatment references can be counted against
    // the accepted patient key set.
    let requested: Vec<Dataset> = if options.datasets.is_empty() {
        Dataset::all().to_vec()
    } else {
        Dataset::all()
            .into_iter()
            .filter(|d| options.datasets.contains(d))
            .collect()
    };

    let mut patient_keys: Option<HashSet<String>> = None;
    let mut datasets = Vec::with_capacity(requested.len());
    for dataset in requested {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            warn!(%dataset, "run cancelled before dataset start");
            datasets.push(DatasetSummary::failed(dataset, "cancelled before start"));
            continue;
        }
        let span = info_span!("dataset", name = %dataset);
        let _guard = span.enter();
        let summary = process_dataset(
            dataset,
            options,
            sink,
            run_stamp,
            &mut rejects,
            &mut patient_keys,
        );
        datasets.push(summary);
    }

    if let Some(writer) = rejects.as_mut()
        && let Err(e) = writer.flush()
    {
        warn!("rejects sink flush failed: {e}");
    }

    let summary = RunSummary {
        run_id: options.run_id.clone(),
        datasets,
        duration: started.elapsed(),
    };
    info!(
        status = summary.status().as_str(),
        accepted = summary.total_accepted(),
        rejected = summary.total_rejected(),
        "pipeline run finished"
    );
    summary
}

/// Run the EVTL stages for one dataset.
fn process_dataset<S: WarehouseSink>(
    dataset: Dataset,
    options: &RunOptions,
    sink: &mut S,
    run_stamp: DateTime<Utc>,
    rejects: &mut Option<RejectsWriter>,
    patient_keys: &mut Option<HashSet<String>>,
) -> DatasetSummary {
    let schema = schema_of(dataset);
    let path = options.source_dir.join(dataset.source_file());

    // Stage 1: Extract
    let stream = match extract(schema, &path) {
        Ok(stream) => stream,
        Err(e) => {
            error!("extract failed: {e}");
            return DatasetSummary::failed(dataset, e.to_string());
        }
    };

    // Stages 2-3: Validate and Transform, streaming record at a time.
    let mut summary = DatasetSummary::new(dataset);
    let mut validator = Validator::new(schema);
    let mut accepted: Vec<EnrichedRecord> = Vec::new();
    let mut orphans = 0usize;
    for item in stream {
        let raw = match item {
            Ok(raw) => raw,
            Err(e) => {
                // Corruption mid-file is fatal for this dataset, not retried.
                error!("extract failed: {e}");
                summary.error = Some(e.to_string());
                return summary;
            }
        };
        summary.records_seen += 1;
        match validator.validate(raw) {
            Outcome::Accepted(typed) => {
                if dataset == Dataset::Treatments
                    && let Some(known) = patient_keys.as_ref()
                    && let Some(patient_id) = typed.value("patient_id").as_text()
                    && !known.contains(patient_id)
                {
                    orphans += 1;
                }
                accepted.push(transform(schema, typed, run_stamp));
            }
            Outcome::Rejected(rejected) => {
                summary.rejected += 1;
                for reason in &rejected.reasons {
                    *summary
                        .rejected_by_reason
                        .entry(reason.code().to_string())
                        .or_insert(0) += 1;
                }
                if let Some(writer) = rejects.as_mut()
                    && let Err(e) = writer.write(&options.run_id, dataset.as_str(), &rejected)
                {
                    warn!(line = rejected.line, "rejects sink write failed: {e}");
                }
            }
        }
    }
    summary.accepted = accepted.len();

    if dataset == Dataset::Treatments {
        // Informational only: orphaned references are flagged, not rejected.
        summary.orphan_references = patient_keys.as_ref().map(|_| orphans);
    }
    info!(
        seen = summary.records_seen,
        accepted = summary.accepted,
        rejected = summary.rejected,
        "validation finished"
    );

    // Stage 4: Load
    match Loader::new(sink).with_retry(options.retry).load(
        schema,
        &options.run_id,
        &accepted,
        summary.rejected,
    ) {
        Ok(report) => summary.load_duration = Some(report.duration),
        Err(e) => {
            error!("load failed: {e}");
            summary.error = Some(e.to_string());
        }
    }

    // Reference checks only count keys that actually landed; a failed
    // patients load leaves later orphan counts unavailable.
    if dataset == Dataset::Patients && summary.succeeded() {
        *patient_keys = Some(
            accepted
                .iter()
                .filter_map(|record| record.value("patient_id").as_text())
                .map(str::to_string)
                .collect(),
        );
    }
    summary
}
