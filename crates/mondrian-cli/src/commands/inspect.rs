use super::read_csv;
use crate::config::{ApplicationConfig, ColumnConfiguration};
use anyhow::{bail, Result};
use arrow::datatypes::Schema as ArrowSchema;
use clap::ArgMatches;
use mondrian_anonymization::{
    get_spans, infer_kind, record_batches_to_dataset, AttributeKind, Schema,
};
use std::path::Path;
use tracing::warn;

const DEFAULT_K: usize = 3;

/// Inferred kinds of every column the engine can handle; other columns are skipped.
fn supported_schema(arrow_schema: &ArrowSchema) -> Schema {
    let mut schema = Schema::new();

    for field in arrow_schema.fields() {
        match infer_kind(field) {
            Ok(kind) => schema.set_kind(field.name().as_str(), kind),
            Err(err) => warn!("skipping column: {}", err),
        }
    }

    schema
}

/// Starting configuration: every column but the last is a feature, the last one is sensitive.
fn emit_config(input: &Path, schema: &Schema) -> Result<ApplicationConfig> {
    let mut names: Vec<String> = schema.names().map(String::from).collect();
    let sensitive_column = match names.pop() {
        Some(name) if !names.is_empty() => name,
        _ => bail!("at least two supported columns are required"),
    };

    let columns = schema
        .attributes()
        .iter()
        .filter(|(name, _)| *name != sensitive_column)
        .map(|(name, kind)| match kind {
            AttributeKind::Categorical => ColumnConfiguration::Categorical {
                name: name.clone(),
                aggregation: Default::default(),
            },
            AttributeKind::Numerical => ColumnConfiguration::Numerical {
                name: name.clone(),
                aggregation: Default::default(),
            },
        })
        .collect();

    Ok(ApplicationConfig {
        input: input.to_path_buf(),
        output: None,
        k: DEFAULT_K,
        l: None,
        feature_columns: names,
        sensitive_column,
        max_partitions: None,
        columns,
    })
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let input = Path::new(matches.value_of("input").unwrap_or_default());
    let (arrow_schema, batches) = read_csv(input)?;
    let schema = supported_schema(&arrow_schema);

    if matches.is_present("emit-config") {
        let config = emit_config(input, &schema)?;
        print!("{}", toml::to_string(&config)?);
        return Ok(());
    }

    let dataset = record_batches_to_dataset(&batches, &schema)?;
    let spans = get_spans(&dataset, &dataset.full_partition(), None)?;

    println!("{} rows", dataset.num_rows());
    for (name, kind) in schema.attributes() {
        let kind = match kind {
            AttributeKind::Categorical => "categorical",
            AttributeKind::Numerical => "numerical",
        };
        println!("{}\t{}\tspan {}", name, kind, spans[name]);
    }

    Ok(())
}
