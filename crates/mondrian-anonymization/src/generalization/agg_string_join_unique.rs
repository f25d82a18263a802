use super::{ColumnGeneralization, GeneralizedKind, GeneralizedValue};
use crate::dataset::{Column, RowIndex};
use crate::error::Result;
use itertools::Itertools;

const SEPARATOR: &str = ",";

/// Joins the sorted, deduplicated labels of a categorical column.
pub struct AggStringJoinUnique;

impl ColumnGeneralization for AggStringJoinUnique {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue> {
        let values = column.as_categorical()?;

        let new_string = partition
            .iter()
            .map(|&row| values[row as usize].as_str())
            .unique()
            .sorted()
            .join(SEPARATOR);

        Ok(GeneralizedValue::Label(new_string))
    }

    fn output_kind(&self) -> GeneralizedKind {
        GeneralizedKind::Label
    }
}
