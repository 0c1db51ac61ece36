//! Append-only rejects diagnostics sink.
//!
//! Best-effort: entries are never retried, and a write failure is the
//! caller's to log, not a fatal pipeline error.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use hetl_model::{RejectedRecord, RejectionReason};

/// One rejects-sink entry: enough to explain every validation failure
/// without re-running the pipeline.
#[derive(Debug, Serialize)]
pub struct RejectEntry<'a> {
    pub run_id: &'a str,
    pub dataset: &'a str,
    pub source_line: u64,
    pub raw_record: &'a BTreeMap<String, String>,
    pub reasons: &'a [RejectionReason],
}

/// Appends rejected records to a JSONL diagnostics file.
pub struct RejectsWriter {
    file: File,
}

impl RejectsWriter {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    pub fn write(&mut self, run_id: &str, dataset: &str, record: &RejectedRecord) -> io::Result<()> {
        let entry = RejectEntry {
            run_id,
            dataset,
            source_line: record.line,
            raw_record: &record.raw,
            reasons: &record.reasons,
        };
        let line = serde_json::to_string(&entry).map_err(io::Error::other)?;
        writeln!(self.file, "{line}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_lossless_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rejects.jsonl");
        let mut writer = RejectsWriter::open(&path).unwrap();

        let mut raw = BTreeMap::new();
        raw.insert("patient_id".to_string(), "P001".to_string());
        raw.insert("age".to_string(), "fifty".to_string());
        let record = RejectedRecord {
            line: 4,
            raw,
            reasons: vec![
                RejectionReason::TypeMismatch {
                    field: "age".to_string(),
                    raw_value: "fifty".to_string(),
                },
                RejectionReason::ConstraintViolation {
                    field: "cost".to_string(),
                    rule: "non_negative".to_string(),
                },
            ],
        };
        writer.write("run-1", "analysis", &record).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let entry: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(entry["run_id"], "run-1");
        assert_eq!(entry["dataset"], "analysis");
        assert_eq!(entry["source_line"], 4);
        assert_eq!(entry["raw_record"]["age"], "fifty");
        // Both reasons survive; nothing is dropped on multi-field failures.
        assert_eq!(entry["reasons"].as_array().unwrap().len(), 2);
        assert_eq!(entry["reasons"][0]["code"], "TYPE_MISMATCH");
        assert_eq!(entry["reasons"][1]["code"], "CONSTRAINT_VIOLATION");
    }
}
