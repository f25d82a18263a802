use super::{ColumnGeneralization, GeneralizedKind, GeneralizedValue};
use crate::dataset::{Column, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::util::mean;

/// Arithmetic mean of a numerical column.
pub struct AggMean;

impl ColumnGeneralization for AggMean {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue> {
        mean(&column.numbers_in(partition)?)
            .map(GeneralizedValue::Number)
            .ok_or(AnonymizationError::EmptyPartition)
    }

    fn output_kind(&self) -> GeneralizedKind {
        GeneralizedKind::Number
    }
}
