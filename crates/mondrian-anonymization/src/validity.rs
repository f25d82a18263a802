use crate::dataset::{Column, Dataset, RowIndex};
use crate::error::Result;
use itertools::Itertools;

/// Predicate gating every split: a split is only committed when both children are valid.
///
/// Implemented for closures, so callers can plug in their own criteria:
///
/// ```
/// use mondrian_anonymization::{Dataset, Result, RowIndex, Validity};
///
/// let at_least_two =
///     |_: &Dataset, partition: &[RowIndex], _: &str| -> Result<bool> { Ok(partition.len() >= 2) };
/// let dataset = Dataset::builder().numerical("age", vec![1, 2]).build().unwrap();
/// assert!(at_least_two.is_valid(&dataset, &[0, 1], "age").unwrap());
/// ```
pub trait Validity {
    fn is_valid(
        &self,
        dataset: &Dataset,
        partition: &[RowIndex],
        sensitive_column: &str,
    ) -> Result<bool>;
}

impl<F> Validity for F
where
    F: Fn(&Dataset, &[RowIndex], &str) -> Result<bool>,
{
    fn is_valid(
        &self,
        dataset: &Dataset,
        partition: &[RowIndex],
        sensitive_column: &str,
    ) -> Result<bool> {
        self(dataset, partition, sensitive_column)
    }
}

pub fn is_k_anonymous(partition: &[RowIndex], k: usize) -> bool {
    partition.len() >= k
}

pub fn is_l_diverse(
    dataset: &Dataset,
    partition: &[RowIndex],
    sensitive_column: &str,
    l: usize,
) -> Result<bool> {
    dataset.check_partition(partition)?;

    let distinct = match dataset.column(sensitive_column)? {
        Column::Categorical(values) => partition
            .iter()
            .map(|&row| values[row as usize].as_str())
            .unique()
            .count(),
        Column::Numerical(values) => partition
            .iter()
            .map(|&row| values[row as usize].to_bits())
            .unique()
            .count(),
    };

    Ok(distinct >= l)
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnonymizationCriteria {
    KAnonymous { k: usize },
    LDiverse { l: usize },
}

impl Validity for AnonymizationCriteria {
    fn is_valid(
        &self,
        dataset: &Dataset,
        partition: &[RowIndex],
        sensitive_column: &str,
    ) -> Result<bool> {
        match self {
            Self::KAnonymous { k } => Ok(is_k_anonymous(partition, *k)),
            Self::LDiverse { l } => is_l_diverse(dataset, partition, sensitive_column, *l),
        }
    }
}

/// Conjunction of criteria: valid iff every criterion holds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria(pub Vec<AnonymizationCriteria>);

impl Criteria {
    pub fn k_anonymous(k: usize) -> Self {
        Self(vec![AnonymizationCriteria::KAnonymous { k }])
    }

    pub fn and(mut self, criterium: AnonymizationCriteria) -> Self {
        self.0.push(criterium);
        self
    }
}

impl Validity for Criteria {
    fn is_valid(
        &self,
        dataset: &Dataset,
        partition: &[RowIndex],
        sensitive_column: &str,
    ) -> Result<bool> {
        for criterium in &self.0 {
            if !criterium.is_valid(dataset, partition, sensitive_column)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
