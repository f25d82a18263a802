use super::{ColumnGeneralization, GeneralizedKind, GeneralizedValue};
use crate::dataset::{Column, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::util::median;

pub struct AggMedian;

impl ColumnGeneralization for AggMedian {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue> {
        median(&mut column.numbers_in(partition)?)
            .map(GeneralizedValue::Number)
            .ok_or(AnonymizationError::EmptyPartition)
    }

    fn output_kind(&self) -> GeneralizedKind {
        GeneralizedKind::Number
    }
}
