//! Subcommand implementations.

use anyhow::{Context, Result};
use chrono::Utc;

use hetl_load::{JsonlWarehouse, RetryPolicy};
use hetl_model::{Dataset, RunSummary, schema_of};

use hetl_cli::pipeline::{self, RunOptions};

use crate::cli::RunArgs;

pub fn run_pipeline(args: &RunArgs) -> Result<RunSummary> {
    let warehouse_dir = args
        .warehouse_dir
        .clone()
        .unwrap_or_else(|| args.source_dir.join("warehouse"));
    let rejects_path = args
        .rejects_file
        .clone()
        .unwrap_or_else(|| warehouse_dir.join("rejects.jsonl"));
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| format!("run-{}", Utc::now().format("%Y%m%dT%H%M%SZ")));

    let options = RunOptions {
        source_dir: args.source_dir.clone(),
        rejects_path,
        run_id,
        datasets: args.datasets.clone(),
        retry: RetryPolicy::default(),
    };
    let mut warehouse = JsonlWarehouse::new(&warehouse_dir)
        .with_context(|| format!("open warehouse: {}", warehouse_dir.display()))?;

    Ok(pipeline::run(&options, &mut warehouse, None))
}

pub fn run_datasets() -> Result<()> {
    for dataset in Dataset::all() {
        let schema = schema_of(dataset);
        let key = schema.primary_key.as_deref().unwrap_or("-");
        println!(
            "{:<12} table={:<18} fields={:<3} key={key}",
            dataset.as_str(),
            schema.table,
            schema.fields.len()
        );
    }
    Ok(())
}
