//! File-backed warehouse: one JSONL file per table.
//!
//! Suitable for a single-process batch job; replace and upsert rewrite the
//! whole table file, append adds lines. Rows carry a `run_id` column so a
//! re-run can purge its own tag before appending.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::sink::{SinkError, TableRow, WarehouseSink};

pub struct JsonlWarehouse {
    root: PathBuf,
}

impl JsonlWarehouse {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.jsonl"))
    }

    fn read_rows(&self, table: &str) -> Result<Vec<TableRow>, SinkError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path).map_err(|e| permanent(&path, &e))?;
        let mut rows = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| permanent(&path, &e))?;
            if line.trim().is_empty() {
                continue;
            }
            let row: TableRow = serde_json::from_str(&line)
                .map_err(|e| SinkError::Permanent(format!("{}: {e}", path.display())))?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn write_rows(&self, table: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        let path = self.table_path(table);
        let mut file = File::create(&path).map_err(|e| permanent(&path, &e))?;
        write_jsonl(&mut file, &path, rows)
    }
}

fn permanent(path: &Path, error: &dyn std::fmt::Display) -> SinkError {
    SinkError::Permanent(format!("{}: {error}", path.display()))
}

fn write_jsonl(file: &mut File, path: &Path, rows: &[TableRow]) -> Result<(), SinkError> {
    for row in rows {
        let line = serde_json::to_string(row)
            .map_err(|e| SinkError::Permanent(format!("{}: {e}", path.display())))?;
        writeln!(file, "{line}").map_err(|e| permanent(path, &e))?;
    }
    file.flush().map_err(|e| permanent(path, &e))
}

impl WarehouseSink for JsonlWarehouse {
    fn replace(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        self.write_rows(table, rows)
    }

    fn upsert(&mut self, table: &str, key: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        let mut existing = self.read_rows(table)?;
        for row in rows {
            let key_value = row.get(key).cloned();
            match existing
                .iter_mut()
                .find(|candidate| candidate.get(key) == key_value.as_ref())
            {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }
        self.write_rows(table, &existing)
    }

    fn append(&mut self, table: &str, rows: &[TableRow]) -> Result<(), SinkError> {
        let path = self.table_path(table);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| permanent(&path, &e))?;
        write_jsonl(&mut file, &path, rows)
    }

    fn purge_run(&mut self, table: &str, run_id: &str) -> Result<(), SinkError> {
        if !self.table_path(table).exists() {
            return Ok(());
        }
        let rows = self.read_rows(table)?;
        let kept: Vec<TableRow> = rows
            .into_iter()
            .filter(|row| row.get("run_id").and_then(|v| v.as_str()) != Some(run_id))
            .collect();
        self.write_rows(table, &kept)
    }

    fn row_count(&self, table: &str) -> Result<usize, SinkError> {
        Ok(self.read_rows(table)?.len())
    }
}
