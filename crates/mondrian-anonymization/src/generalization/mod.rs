mod agg_mean;
mod agg_median;
mod agg_range;
mod agg_string_common_prefix;
mod agg_string_join_unique;

pub use agg_mean::AggMean;
pub use agg_median::AggMedian;
pub use agg_range::AggRange;
pub use agg_string_common_prefix::AggStringCommonPrefix;
pub use agg_string_join_unique::AggStringJoinUnique;

use crate::dataset::{Column, RowIndex};
use crate::error::Result;
use std::{cmp::Ordering, fmt};

/// Generalized value of one feature column over a whole partition.
#[derive(Clone, Debug)]
pub enum GeneralizedValue {
    Number(f64),
    Label(String),
}

/// Whether a generalization yields numbers or labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneralizedKind {
    Number,
    Label,
}

impl GeneralizedValue {
    pub fn kind(&self) -> GeneralizedKind {
        match self {
            GeneralizedValue::Number(_) => GeneralizedKind::Number,
            GeneralizedValue::Label(_) => GeneralizedKind::Label,
        }
    }
}

impl PartialEq for GeneralizedValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GeneralizedValue {}

impl PartialOrd for GeneralizedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GeneralizedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GeneralizedValue::Number(a), GeneralizedValue::Number(b)) => a.total_cmp(b),
            (GeneralizedValue::Label(a), GeneralizedValue::Label(b)) => a.cmp(b),
            (GeneralizedValue::Number(_), GeneralizedValue::Label(_)) => Ordering::Less,
            (GeneralizedValue::Label(_), GeneralizedValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for GeneralizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneralizedValue::Number(value) => write!(f, "{}", value),
            GeneralizedValue::Label(value) => write!(f, "{}", value),
        }
    }
}

/// Collapses the values of one column within a partition into a single generalized value.
pub trait ColumnGeneralization: Send + Sync {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue>;
    fn output_kind(&self) -> GeneralizedKind;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericAggregation {
    Mean,
    Median,
    Range,
}

impl Default for NumericAggregation {
    fn default() -> Self {
        NumericAggregation::Mean
    }
}

impl NumericAggregation {
    pub fn generalization(&self) -> Box<dyn ColumnGeneralization> {
        match self {
            NumericAggregation::Mean => Box::new(AggMean),
            NumericAggregation::Median => Box::new(AggMedian),
            NumericAggregation::Range => Box::new(AggRange),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoricalAggregation {
    Join,
    CommonPrefix,
}

impl Default for CategoricalAggregation {
    fn default() -> Self {
        CategoricalAggregation::Join
    }
}

impl CategoricalAggregation {
    pub fn generalization(&self) -> Box<dyn ColumnGeneralization> {
        match self {
            CategoricalAggregation::Join => Box::new(AggStringJoinUnique),
            CategoricalAggregation::CommonPrefix => Box::new(AggStringCommonPrefix),
        }
    }
}
