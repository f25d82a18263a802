//! Extents of finished partitions along one or two attributes, for plotting partitions as
//! rectangles. Categorical values are laid out on an axis by the ordinal of their sorted value.

use crate::dataset::{Column, Dataset, Partition, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::util::min_max;
use itertools::Itertools;
use std::collections::HashMap;

/// Ordinal position of every categorical value, per categorical column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryIndex {
    indexes: HashMap<String, HashMap<String, usize>>,
}

impl CategoryIndex {
    pub fn build(dataset: &Dataset) -> Result<Self> {
        let mut indexes = HashMap::new();

        for name in dataset.schema().names() {
            if let Column::Categorical(values) = dataset.column(name)? {
                let ordinals = values
                    .iter()
                    .unique()
                    .sorted()
                    .enumerate()
                    .map(|(ordinal, value)| (value.clone(), ordinal))
                    .collect();
                indexes.insert(name.to_string(), ordinals);
            }
        }

        Ok(Self { indexes })
    }

    pub fn ordinal(&self, column: &str, value: &str) -> Option<usize> {
        self.indexes.get(column)?.get(value).copied()
    }

    pub fn cardinality(&self, column: &str) -> Option<usize> {
        self.indexes.get(column).map(HashMap::len)
    }

    fn require_ordinal(&self, column: &str, value: &str) -> Result<f64> {
        self.ordinal(column, value)
            .map(|ordinal| ordinal as f64)
            .ok_or_else(|| AnonymizationError::UnknownColumn(column.to_string()))
    }
}

/// Axis-aligned rectangle covering a partition on two attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub low: (f64, f64),
    pub high: (f64, f64),
}

/// `(low, high)` extent of `partition` along `column`, widened by `offset` on both sides.
///
/// Categorical extents span from the first to one past the last ordinal present. Numerical
/// extents run from the partition minimum up to the next larger value in the whole dataset,
/// so adjacent partitions share an edge; the partition holding the maximum ends at it.
pub fn partition_extent(
    dataset: &Dataset,
    column: &str,
    partition: &[RowIndex],
    index: &CategoryIndex,
    offset: f64,
) -> Result<(f64, f64)> {
    dataset.check_partition(partition)?;

    let (l, r) = match dataset.column(column)? {
        Column::Categorical(values) => {
            let (first, last) = partition
                .iter()
                .map(|&row| values[row as usize].as_str())
                .minmax()
                .into_option()
                .ok_or(AnonymizationError::EmptyPartition)?;

            (
                index.require_ordinal(column, first)?,
                index.require_ordinal(column, last)? + 1.0,
            )
        }
        Column::Numerical(values) => {
            let (min, max) = min_max(partition.iter().map(|&row| values[row as usize]))
                .ok_or(AnonymizationError::EmptyPartition)?;

            let next_value = values
                .iter()
                .copied()
                .filter(|value| *value > max)
                .fold(None, |acc: Option<f64>, value| {
                    Some(acc.map_or(value, |acc| acc.min(value)))
                })
                .unwrap_or(max);

            (min, next_value)
        }
    };

    Ok((l - offset, r + offset))
}

/// Rectangles of every partition on `column_x` and `column_y`.
pub fn partition_rects(
    dataset: &Dataset,
    partitions: &[Partition],
    column_x: &str,
    column_y: &str,
    index: &CategoryIndex,
    offsets: (f64, f64),
) -> Result<Vec<Rect>> {
    partitions
        .iter()
        .map(|partition| {
            let (xl, xr) = partition_extent(dataset, column_x, partition, index, offsets.0)?;
            let (yl, yr) = partition_extent(dataset, column_y, partition, index, offsets.1)?;

            Ok(Rect {
                low: (xl, yl),
                high: (xr, yr),
            })
        })
        .collect()
}

/// Plot bounds of a whole column.
pub fn column_bounds(
    dataset: &Dataset,
    column: &str,
    index: &CategoryIndex,
    offset: f64,
) -> Result<(f64, f64)> {
    match dataset.column(column)? {
        Column::Categorical(_) => {
            let cardinality = index
                .cardinality(column)
                .ok_or_else(|| AnonymizationError::UnknownColumn(column.to_string()))?;
            Ok((0.0 - offset, cardinality as f64 + offset))
        }
        Column::Numerical(values) => {
            let (min, max) =
                min_max(values.iter().copied()).ok_or(AnonymizationError::EmptyPartition)?;
            Ok((min - offset, max + offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::builder()
            .numerical("age", vec![20, 21, 40, 41, 60, 61])
            .categorical("region", vec!["north", "north", "south", "south", "east", "east"])
            .build()
            .unwrap()
    }

    #[test]
    fn category_index_orders_values() {
        let index = CategoryIndex::build(&dataset()).unwrap();

        assert_eq!(index.ordinal("region", "east"), Some(0));
        assert_eq!(index.ordinal("region", "south"), Some(2));
        assert_eq!(index.cardinality("region"), Some(3));
        assert_eq!(index.cardinality("age"), None);
    }

    #[test]
    fn numerical_extent_reaches_next_value() {
        let dataset = dataset();
        let index = CategoryIndex::build(&dataset).unwrap();

        assert_eq!(
            partition_extent(&dataset, "age", &[0, 1, 2], &index, 0.0).unwrap(),
            (20.0, 41.0)
        );
        assert_eq!(
            partition_extent(&dataset, "age", &[3, 4, 5], &index, 0.5).unwrap(),
            (40.5, 61.5)
        );
    }

    #[test]
    fn categorical_extent_covers_ordinals() {
        let dataset = dataset();
        let index = CategoryIndex::build(&dataset).unwrap();

        assert_eq!(
            partition_extent(&dataset, "region", &[0, 4], &index, 0.0).unwrap(),
            (0.0, 2.0)
        );
    }

    #[test]
    fn rects_and_bounds() {
        let dataset = dataset();
        let index = CategoryIndex::build(&dataset).unwrap();
        let rects = partition_rects(
            &dataset,
            &[vec![0, 1], vec![2, 3, 4, 5]],
            "age",
            "region",
            &index,
            (0.0, 0.1),
        )
        .unwrap();

        assert_eq!(
            rects[0],
            Rect {
                low: (20.0, 1.0 - 0.1),
                high: (40.0, 2.0 + 0.1)
            }
        );
        assert_eq!(column_bounds(&dataset, "region", &index, 1.0).unwrap(), (-1.0, 4.0));
        assert_eq!(column_bounds(&dataset, "age", &index, 1.0).unwrap(), (19.0, 62.0));
    }

    #[test]
    fn empty_partition_has_no_extent() {
        let dataset = dataset();
        let index = CategoryIndex::build(&dataset).unwrap();

        assert!(matches!(
            partition_extent(&dataset, "age", &[], &index, 0.0),
            Err(AnonymizationError::EmptyPartition)
        ));
    }
}
