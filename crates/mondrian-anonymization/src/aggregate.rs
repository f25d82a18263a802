use crate::dataset::{Dataset, Partition, Value};
use crate::error::{AnonymizationError, Result};
use crate::generalization::{
    CategoricalAggregation, ColumnGeneralization, GeneralizedKind, GeneralizedValue,
    NumericAggregation,
};
use crate::schema::AttributeKind;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, info};

/// Name of the output column holding the number of records per sensitive value.
pub const COUNT_COLUMN: &str = "count";

const PROGRESS_INTERVAL: usize = 100;

/// Settings for [`build_anonymized_dataset`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregationConfig {
    pub feature_columns: Vec<String>,
    pub sensitive_column: String,
    /// Only the first `max_partitions` partitions are emitted when set.
    pub max_partitions: Option<usize>,
    pub numeric_aggregations: HashMap<String, NumericAggregation>,
    pub categorical_aggregations: HashMap<String, CategoricalAggregation>,
}

impl AggregationConfig {
    pub fn new<S: AsRef<str>>(feature_columns: &[S], sensitive_column: &str) -> Self {
        Self {
            feature_columns: feature_columns
                .iter()
                .map(|column| column.as_ref().to_string())
                .collect(),
            sensitive_column: sensitive_column.to_string(),
            ..Self::default()
        }
    }

    pub fn with_max_partitions(mut self, max_partitions: usize) -> Self {
        self.max_partitions = Some(max_partitions);
        self
    }

    pub fn with_numeric_aggregation(mut self, column: &str, agg: NumericAggregation) -> Self {
        self.numeric_aggregations.insert(column.to_string(), agg);
        self
    }

    pub fn with_categorical_aggregation(
        mut self,
        column: &str,
        agg: CategoricalAggregation,
    ) -> Self {
        self.categorical_aggregations.insert(column.to_string(), agg);
        self
    }

    fn generalization(
        &self,
        column: &str,
        kind: AttributeKind,
    ) -> Box<dyn ColumnGeneralization> {
        match kind {
            AttributeKind::Numerical => self
                .numeric_aggregations
                .get(column)
                .copied()
                .unwrap_or_default()
                .generalization(),
            AttributeKind::Categorical => self
                .categorical_aggregations
                .get(column)
                .copied()
                .unwrap_or_default()
                .generalization(),
        }
    }
}

/// One released row: the generalized features of a partition plus one sensitive value and
/// how often it occurs in that partition.
#[derive(Clone, Debug, PartialEq)]
pub struct AnonymizedRow {
    /// Index of the source partition in the finished-partition list.
    pub partition: usize,
    pub features: Vec<GeneralizedValue>,
    pub sensitive_value: Value,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnonymizedTable {
    feature_columns: Vec<String>,
    feature_kinds: Vec<GeneralizedKind>,
    sensitive_column: String,
    sensitive_kind: AttributeKind,
    rows: Vec<AnonymizedRow>,
}

impl AnonymizedTable {
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn feature_kinds(&self) -> &[GeneralizedKind] {
        &self.feature_kinds
    }

    pub fn sensitive_column(&self) -> &str {
        &self.sensitive_column
    }

    pub fn sensitive_kind(&self) -> AttributeKind {
        self.sensitive_kind
    }

    pub fn rows(&self) -> &[AnonymizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature columns, then the sensitive column, then [`COUNT_COLUMN`].
    pub fn column_names(&self) -> Vec<&str> {
        self.feature_columns
            .iter()
            .map(String::as_str)
            .chain(vec![self.sensitive_column.as_str(), COUNT_COLUMN])
            .collect()
    }

    /// Orders rows by their generalized features, then by sensitive value.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by(|a, b| {
            a.features
                .cmp(&b.features)
                .then_with(|| a.sensitive_value.cmp(&b.sensitive_value))
        });
    }
}

/// Collapses each finished partition into generalized rows, one per distinct sensitive value.
///
/// Rows with identical generalized features coming from different partitions are kept apart.
pub fn build_anonymized_dataset(
    dataset: &Dataset,
    partitions: &[Partition],
    config: &AggregationConfig,
) -> Result<AnonymizedTable> {
    let sensitive = dataset.column(&config.sensitive_column)?;

    let mut generalizations = Vec::with_capacity(config.feature_columns.len());
    for name in &config.feature_columns {
        let column = dataset.column(name)?;
        generalizations.push((column, config.generalization(name, column.kind())));
    }

    let mut rows = vec![];
    for (index, partition) in partitions.iter().enumerate() {
        if config.max_partitions.map_or(false, |max| index >= max) {
            info!(
                emitted = index,
                total = partitions.len(),
                "reached partition cap"
            );
            break;
        }

        if index > 0 && index % PROGRESS_INTERVAL == 0 {
            info!("Finished {} partitions...", index);
        }

        if partition.is_empty() {
            error!(partition = index, "empty partition reached the aggregator");
            return Err(AnonymizationError::EmptyPartition);
        }
        dataset.check_partition(partition)?;

        let features = generalizations
            .iter()
            .map(|(column, generalization)| generalization.generalize(column, partition))
            .collect::<Result<Vec<GeneralizedValue>>>()?;

        let mut sensitive_counts: BTreeMap<Value, usize> = BTreeMap::new();
        for &row in partition {
            *sensitive_counts.entry(sensitive.value(row)).or_insert(0) += 1;
        }

        for (sensitive_value, count) in sensitive_counts {
            if count == 0 {
                continue;
            }

            rows.push(AnonymizedRow {
                partition: index,
                features: features.clone(),
                sensitive_value,
                count,
            });
        }
    }

    Ok(AnonymizedTable {
        feature_columns: config.feature_columns.clone(),
        feature_kinds: generalizations
            .iter()
            .map(|(_, generalization)| generalization.output_kind())
            .collect(),
        sensitive_column: config.sensitive_column.clone(),
        sensitive_kind: sensitive.kind(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::builder()
            .numerical("age", vec![20, 21, 40, 41, 60, 61])
            .categorical("region", vec!["north", "south", "north", "east", "east", "west"])
            .categorical("diagnosis", vec!["flu", "cold", "flu", "flu", "flu", "flu"])
            .build()
            .unwrap()
    }

    fn partitions() -> Vec<Partition> {
        vec![vec![0, 1, 2], vec![3, 4, 5]]
    }

    #[test]
    fn one_row_per_sensitive_value() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age", "region"], "diagnosis");
        let table = build_anonymized_dataset(&dataset, &partitions(), &config).unwrap();

        assert_eq!(
            table.rows(),
            &[
                AnonymizedRow {
                    partition: 0,
                    features: vec![
                        GeneralizedValue::Number(27.0),
                        GeneralizedValue::Label("north,south".to_string()),
                    ],
                    sensitive_value: Value::Categorical("cold".to_string()),
                    count: 1,
                },
                AnonymizedRow {
                    partition: 0,
                    features: vec![
                        GeneralizedValue::Number(27.0),
                        GeneralizedValue::Label("north,south".to_string()),
                    ],
                    sensitive_value: Value::Categorical("flu".to_string()),
                    count: 2,
                },
                AnonymizedRow {
                    partition: 1,
                    features: vec![
                        GeneralizedValue::Number(54.0),
                        GeneralizedValue::Label("east,west".to_string()),
                    ],
                    sensitive_value: Value::Categorical("flu".to_string()),
                    count: 3,
                },
            ]
        );
        assert_eq!(
            table.column_names(),
            vec!["age", "region", "diagnosis", COUNT_COLUMN]
        );
        assert_eq!(
            table.feature_kinds(),
            &[GeneralizedKind::Number, GeneralizedKind::Label]
        );
    }

    #[test]
    fn counts_add_up_to_partition_sizes() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age"], "diagnosis");
        let partitions = partitions();
        let table = build_anonymized_dataset(&dataset, &partitions, &config).unwrap();

        for (index, partition) in partitions.iter().enumerate() {
            let total: usize = table
                .rows()
                .iter()
                .filter(|row| row.partition == index)
                .map(|row| row.count)
                .sum();
            assert_eq!(total, partition.len());
        }
    }

    #[test]
    fn honors_partition_cap() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age"], "diagnosis").with_max_partitions(1);
        let table = build_anonymized_dataset(&dataset, &partitions(), &config).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.rows().iter().all(|row| row.partition == 0));
    }

    #[test]
    fn per_column_aggregation_overrides() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age"], "diagnosis")
            .with_numeric_aggregation("age", NumericAggregation::Range);
        let table = build_anonymized_dataset(&dataset, &partitions(), &config).unwrap();

        assert_eq!(
            table.rows()[0].features,
            vec![GeneralizedValue::Label("20 - 40".to_string())]
        );
        assert_eq!(table.feature_kinds(), &[GeneralizedKind::Label]);
    }

    #[test]
    fn numerical_sensitive_values_are_grouped() {
        let dataset = Dataset::builder()
            .numerical("age", vec![20, 21, 22])
            .numerical("charges", vec![1200.5, 300.0, 1200.5])
            .build()
            .unwrap();
        let config = AggregationConfig::new(&["age"], "charges");
        let table = build_anonymized_dataset(&dataset, &[vec![0, 1, 2]], &config).unwrap();

        let groups: Vec<(Value, usize)> = table
            .rows()
            .iter()
            .map(|row| (row.sensitive_value.clone(), row.count))
            .collect();
        assert_eq!(
            groups,
            vec![(Value::Numerical(300.0), 1), (Value::Numerical(1200.5), 2)]
        );
    }

    #[test]
    fn empty_partition_is_a_fault() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age"], "diagnosis");
        let result = build_anonymized_dataset(&dataset, &[vec![0, 1], vec![]], &config);

        assert!(matches!(result, Err(AnonymizationError::EmptyPartition)));
    }

    #[test]
    fn sort_rows_orders_by_features_then_sensitive_value() {
        let dataset = dataset();
        let config = AggregationConfig::new(&["age"], "diagnosis");
        let mut table =
            build_anonymized_dataset(&dataset, &[vec![3, 4, 5], vec![0, 1, 2]], &config).unwrap();
        table.sort_rows();

        let partitions: Vec<usize> = table.rows().iter().map(|row| row.partition).collect();
        assert_eq!(partitions, vec![1, 1, 0]);
        assert_eq!(
            table.rows()[0].sensitive_value,
            Value::Categorical("cold".to_string())
        );
    }
}
