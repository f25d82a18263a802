use crate::dataset::{Column, Dataset, Partition, RowIndex};
use crate::error::Result;
use crate::util::median;
use itertools::Itertools;
use std::collections::HashSet;

/// Splits `partition` in two along `column`.
///
/// Categorical columns bisect the sorted distinct values; the lower half takes the extra value
/// when the count is odd. Numerical columns split at the median: values below it go left, the
/// rest (ties included) go right. Either side may come back empty.
pub fn split(
    dataset: &Dataset,
    partition: &[RowIndex],
    column: &str,
) -> Result<(Partition, Partition)> {
    let column = dataset.column(column)?;
    dataset.check_partition(partition)?;

    match column {
        Column::Categorical(values) => Ok(split_categorical(values, partition)),
        Column::Numerical(values) => Ok(split_numerical(values, partition)),
    }
}

fn split_categorical(values: &[String], partition: &[RowIndex]) -> (Partition, Partition) {
    let distinct: Vec<&str> = partition
        .iter()
        .map(|&row| values[row as usize].as_str())
        .unique()
        .sorted()
        .collect();

    let lv: HashSet<&str> = distinct[..(distinct.len() + 1) / 2].iter().copied().collect();

    partition
        .iter()
        .copied()
        .partition(|&row| lv.contains(values[row as usize].as_str()))
}

fn split_numerical(values: &[f64], partition: &[RowIndex]) -> (Partition, Partition) {
    let mut dfp: Vec<f64> = partition.iter().map(|&row| values[row as usize]).collect();

    match median(&mut dfp) {
        Some(median) => partition
            .iter()
            .copied()
            .partition(|&row| values[row as usize] < median),
        None => (vec![], vec![]),
    }
}
