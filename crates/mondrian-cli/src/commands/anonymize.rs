use super::{read_csv, write_csv};
use crate::config::{load_config, ApplicationConfig};
use anyhow::Result;
use arrow::{datatypes::Schema as ArrowSchema, util::pretty::pretty_format_batches};
use clap::ArgMatches;
use mondrian_anonymization::{
    build_anonymized_dataset, get_spans, infer_kind, partition_dataset, partition_rects,
    record_batches_to_dataset, table_to_record_batch, CategoryIndex, Dataset, Partition, Schema,
};
use std::path::Path;
use tracing::info;

/// Column kinds of the configured columns: explicit `[[columns]]` entries win over the types
/// the CSV reader inferred.
fn resolve_schema(config: &ApplicationConfig, arrow_schema: &ArrowSchema) -> Result<Schema> {
    let mut schema = Schema::new();

    for name in config.dataset_columns() {
        let kind = match config.column(name) {
            Some(column) => column.kind(),
            None => infer_kind(arrow_schema.field_with_name(name)?)?,
        };
        schema.set_kind(name, kind);
    }

    Ok(schema)
}

fn print_rects(dataset: &Dataset, partitions: &[Partition], columns: &[&str]) -> Result<()> {
    let index = CategoryIndex::build(dataset)?;
    let rects = partition_rects(
        dataset,
        partitions,
        columns[0],
        columns[1],
        &index,
        (0.0, 0.0),
    )?;

    println!("partition\t{0}_low\t{0}_high\t{1}_low\t{1}_high", columns[0], columns[1]);
    for (partition, rect) in rects.iter().enumerate() {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            partition, rect.low.0, rect.high.0, rect.low.1, rect.high.1
        );
    }

    Ok(())
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config_file_path = Path::new(matches.value_of("config").unwrap_or("./mondrian.toml"));
    let config_file_path = std::env::current_dir()?.join(config_file_path);
    let config = load_config(&config_file_path)?;
    config.validate()?;

    let (arrow_schema, batches) = read_csv(&config.input)?;
    let schema = resolve_schema(&config, &arrow_schema)?;
    let dataset = record_batches_to_dataset(&batches, &schema)?;

    let scale = get_spans(&dataset, &dataset.full_partition(), None)?;
    let partitions = partition_dataset(
        &dataset,
        &config.feature_columns,
        &config.sensitive_column,
        &scale,
        &config.criteria(),
    )?;

    info!(
        rows = dataset.num_rows(),
        partitions = partitions.len(),
        k = config.k,
        "anonymized dataset"
    );

    if let Some(columns) = matches.values_of("rects") {
        let columns: Vec<&str> = columns.collect();
        print_rects(&dataset, &partitions, &columns)?;
        return Ok(());
    }

    let table = build_anonymized_dataset(&dataset, &partitions, &config.aggregation_config())?;
    let batch = table_to_record_batch(&table)?;

    match &config.output {
        Some(path) => {
            write_csv(path, &batch)?;
            info!(path = %path.display(), rows = batch.num_rows(), "wrote anonymized table");
        }
        None => println!("{}", pretty_format_batches(&[batch])?),
    }

    Ok(())
}
