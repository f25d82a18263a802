use crate::dataset::{Column, Dataset, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::util::min_max;
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::warn;

/// Spread of each attribute within a partition, keyed by attribute name.
pub type Spans = BTreeMap<String, f64>;

/// Number of distinct values for categorical columns, `max - min` for numerical ones.
/// An empty partition has a span of zero. Rows of `partition` must index into `column`.
pub fn get_span(column: &Column, partition: &[RowIndex]) -> f64 {
    match column {
        Column::Categorical(values) => partition
            .iter()
            .map(|&row| values[row as usize].as_str())
            .unique()
            .count() as f64,
        Column::Numerical(values) => min_max(partition.iter().map(|&row| values[row as usize]))
            .map_or(0.0, |(min, max)| max - min),
    }
}

/// Divides `span` by `scale`. Attributes that are constant over the reference scope have a
/// zero scale and always yield a zero scaled span.
pub fn scale_span(span: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        0.0
    } else {
        span / scale
    }
}

/// Spans of every attribute in the dataset.
pub fn get_spans(
    dataset: &Dataset,
    partition: &[RowIndex],
    scale: Option<&Spans>,
) -> Result<Spans> {
    let columns: Vec<&str> = dataset.schema().names().collect();
    get_spans_for(dataset, &columns, partition, scale)
}

/// Spans of `columns` within `partition`, each divided by its entry in `scale` when given.
pub fn get_spans_for<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
    partition: &[RowIndex],
    scale: Option<&Spans>,
) -> Result<Spans> {
    dataset.check_partition(partition)?;

    if partition.is_empty() {
        warn!("computing spans of an empty partition");
    }

    let mut spans = Spans::new();

    for name in columns {
        let name = name.as_ref();
        let mut span = get_span(dataset.column(name)?, partition);

        if let Some(scale) = scale {
            let column_scale = scale
                .get(name)
                .ok_or_else(|| AnonymizationError::MissingScale(name.to_string()))?;
            span = scale_span(span, *column_scale);
        }

        spans.insert(name.to_string(), span);
    }

    Ok(spans)
}
