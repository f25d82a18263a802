pub mod anonymize;
pub mod inspect;

use anyhow::{Context, Result};
use arrow::{
    csv::{ReaderBuilder, Writer},
    datatypes::SchemaRef,
    record_batch::RecordBatch,
};
use std::{fs::File, path::Path};
use tracing::info;

const SCHEMA_INFERENCE_ROWS: usize = 1000;

/// Reads a CSV file with a header row, inferring column types from the leading records.
pub fn read_csv(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let reader = ReaderBuilder::new()
        .has_header(true)
        .infer_schema(Some(SCHEMA_INFERENCE_ROWS))
        .build(file)?;

    let schema = reader.schema();
    let batches = reader.collect::<arrow::error::Result<Vec<RecordBatch>>>()?;

    info!(
        path = %path.display(),
        columns = schema.fields().len(),
        rows = batches.iter().map(RecordBatch::num_rows).sum::<usize>(),
        "loaded dataset"
    );

    Ok((schema, batches))
}

pub fn write_csv(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;

    let mut writer = Writer::new(file);
    writer.write(batch)?;

    Ok(())
}
