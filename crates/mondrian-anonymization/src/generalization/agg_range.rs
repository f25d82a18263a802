use super::{ColumnGeneralization, GeneralizedKind, GeneralizedValue};
use crate::dataset::{Column, RowIndex};
use crate::error::{AnonymizationError, Result};
use crate::util::min_max;

/// Renders a numerical column as `"min - max"`, or as the single value when all are equal.
pub struct AggRange;

impl ColumnGeneralization for AggRange {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue> {
        let (min, max) = min_max(column.numbers_in(partition)?)
            .ok_or(AnonymizationError::EmptyPartition)?;

        let agg = if max == min {
            format!("{}", max)
        } else {
            format!("{} - {}", min, max)
        };

        Ok(GeneralizedValue::Label(agg))
    }

    fn output_kind(&self) -> GeneralizedKind {
        GeneralizedKind::Label
    }
}
