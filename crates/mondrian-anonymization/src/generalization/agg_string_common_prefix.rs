use super::{ColumnGeneralization, GeneralizedKind, GeneralizedValue};
use crate::dataset::{Column, RowIndex};
use crate::error::{AnonymizationError, Result};
use itertools::Itertools;

pub fn longest_common_prefix<'a>(strings: &[&'a str]) -> &'a str {
    let first = match strings.first() {
        Some(first) => *first,
        None => return "",
    };

    let mut len = first.len();
    for other in &strings[1..] {
        len = first
            .char_indices()
            .zip(other.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, c), _)| index + c.len_utf8())
            .min(len);
    }

    &first[..len]
}

/// Longest common prefix of the labels followed by `*`; a single distinct label is kept as is.
pub struct AggStringCommonPrefix;

impl ColumnGeneralization for AggStringCommonPrefix {
    fn generalize(&self, column: &Column, partition: &[RowIndex]) -> Result<GeneralizedValue> {
        let values = column.as_categorical()?;
        let distinct: Vec<&str> = partition
            .iter()
            .map(|&row| values[row as usize].as_str())
            .unique()
            .collect();

        match distinct.as_slice() {
            [] => Err(AnonymizationError::EmptyPartition),
            [only] => Ok(GeneralizedValue::Label(only.to_string())),
            _ => Ok(GeneralizedValue::Label(format!(
                "{}*",
                longest_common_prefix(&distinct)
            ))),
        }
    }

    fn output_kind(&self) -> GeneralizedKind {
        GeneralizedKind::Label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_aggregation() {
        let column = Column::Categorical(
            vec!["Berlin", "Berlin", "Bern", "Bergen"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        assert_eq!(
            AggStringCommonPrefix.generalize(&column, &[0, 1, 2, 3]).unwrap(),
            GeneralizedValue::Label("Ber*".to_string())
        );
        assert_eq!(
            AggStringCommonPrefix.generalize(&column, &[0, 1]).unwrap(),
            GeneralizedValue::Label("Berlin".to_string())
        );
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        assert_eq!(longest_common_prefix(&["Müller", "Mütze"]), "Mü");
        assert_eq!(longest_common_prefix(&["abc", "xyz"]), "");
        assert_eq!(longest_common_prefix(&["abc"]), "abc");
        assert_eq!(longest_common_prefix(&[]), "");
    }
}
