use ::config::{ConfigError, Environment, Source};
use anyhow::{bail, Result};
use mondrian_anonymization::{
    AggregationConfig, AnonymizationCriteria, AttributeKind, CategoricalAggregation, Criteria,
    NumericAggregation,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CATEGORICAL_AGG: CategoricalAggregationRef = CategoricalAggregationRef::Join;
const DEFAULT_NUMERIC_AGG: NumericAggregationRef = NumericAggregationRef::Mean;

/// Environment variables starting with `MONDRIAN_` override file settings, e.g. `MONDRIAN_K=5`.
pub const ENV_PREFIX: &str = "MONDRIAN";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericAggregationRef {
    Mean,
    Median,
    Range,
}

impl From<NumericAggregationRef> for NumericAggregation {
    fn from(def: NumericAggregationRef) -> NumericAggregation {
        match def {
            NumericAggregationRef::Mean => NumericAggregation::Mean,
            NumericAggregationRef::Median => NumericAggregation::Median,
            NumericAggregationRef::Range => NumericAggregation::Range,
        }
    }
}

impl Default for NumericAggregationRef {
    fn default() -> Self {
        DEFAULT_NUMERIC_AGG
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalAggregationRef {
    Join,
    CommonPrefix,
}

impl From<CategoricalAggregationRef> for CategoricalAggregation {
    fn from(def: CategoricalAggregationRef) -> CategoricalAggregation {
        match def {
            CategoricalAggregationRef::Join => CategoricalAggregation::Join,
            CategoricalAggregationRef::CommonPrefix => CategoricalAggregation::CommonPrefix,
        }
    }
}

impl Default for CategoricalAggregationRef {
    fn default() -> Self {
        DEFAULT_CATEGORICAL_AGG
    }
}

/// Explicit kind of a column, overriding what the CSV reader inferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ColumnConfiguration {
    Categorical {
        name: String,
        #[serde(default)]
        aggregation: CategoricalAggregationRef,
    },
    Numerical {
        name: String,
        #[serde(default)]
        aggregation: NumericAggregationRef,
    },
}

impl ColumnConfiguration {
    pub fn name(&self) -> &str {
        match self {
            ColumnConfiguration::Categorical { name, .. } => name,
            ColumnConfiguration::Numerical { name, .. } => name,
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            ColumnConfiguration::Categorical { .. } => AttributeKind::Categorical,
            ColumnConfiguration::Numerical { .. } => AttributeKind::Numerical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub input: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<usize>,
    pub feature_columns: Vec<String>,
    pub sensitive_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_partitions: Option<usize>,
    // Arrays of tables have to come last when serializing to TOML.
    #[serde(default)]
    pub columns: Vec<ColumnConfiguration>,
}

impl ApplicationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            bail!("k must be at least 1");
        }

        if self.l == Some(0) {
            bail!("l must be at least 1");
        }

        if self.feature_columns.is_empty() {
            bail!("at least one feature column is required");
        }

        if self.feature_columns.contains(&self.sensitive_column) {
            bail!(
                "column {} is both a feature and the sensitive column",
                self.sensitive_column
            );
        }

        Ok(())
    }

    /// Feature columns followed by the sensitive column.
    pub fn dataset_columns(&self) -> impl Iterator<Item = &str> {
        self.feature_columns
            .iter()
            .chain(std::iter::once(&self.sensitive_column))
            .map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnConfiguration> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn criteria(&self) -> Criteria {
        let criteria = Criteria::k_anonymous(self.k);

        match self.l {
            Some(l) => criteria.and(AnonymizationCriteria::LDiverse { l }),
            None => criteria,
        }
    }

    pub fn aggregation_config(&self) -> AggregationConfig {
        let mut aggregation =
            AggregationConfig::new(&self.feature_columns, &self.sensitive_column);
        aggregation.max_partitions = self.max_partitions;

        for column in &self.columns {
            match column {
                ColumnConfiguration::Categorical { name, aggregation: agg } => {
                    aggregation = aggregation.with_categorical_aggregation(name, (*agg).into());
                }
                ColumnConfiguration::Numerical { name, aggregation: agg } => {
                    aggregation = aggregation.with_numeric_aggregation(name, (*agg).into());
                }
            }
        }

        aggregation
    }
}

/// Merges `source` with the `MONDRIAN_` environment overrides.
pub fn build_config<S>(source: S) -> Result<ApplicationConfig, ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    let mut s = config::Config::default();
    s.merge(source)?;
    s.merge(Environment::with_prefix(ENV_PREFIX))?;
    s.try_into()
}

pub fn load_config(path: &Path) -> Result<ApplicationConfig, ConfigError> {
    build_config(config::File::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::config::{File, FileFormat};

    const CONFIG: &str = r#"
        input = "insurance.csv"
        k = 5
        l = 2
        feature_columns = ["age", "sex", "bmi", "children", "region"]
        sensitive_column = "smoker"

        [[columns]]
        type = "categorical"
        name = "children"

        [[columns]]
        type = "numerical"
        name = "bmi"
        aggregation = "range"

        [[columns]]
        type = "categorical"
        name = "region"
        aggregation = "common_prefix"
    "#;

    fn parse(source: &str) -> ApplicationConfig {
        build_config(File::from_str(source, FileFormat::Toml)).unwrap()
    }

    #[test]
    fn test_parses_application_config() {
        let config = parse(CONFIG);

        assert_eq!(config.input, PathBuf::from("insurance.csv"));
        assert_eq!(config.output, None);
        assert_eq!(config.k, 5);
        assert_eq!(config.l, Some(2));
        assert_eq!(config.max_partitions, None);
        assert_eq!(config.sensitive_column, "smoker");
        assert_eq!(
            config.columns[0],
            ColumnConfiguration::Categorical {
                name: "children".to_string(),
                aggregation: CategoricalAggregationRef::Join,
            }
        );
        assert_eq!(
            config.column("bmi").map(ColumnConfiguration::kind),
            Some(AttributeKind::Numerical)
        );
        assert!(config.column("age").is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_aggregation_overrides() {
        let aggregation = parse(CONFIG).aggregation_config();

        assert_eq!(
            aggregation.numeric_aggregations.get("bmi"),
            Some(&NumericAggregation::Range)
        );
        assert_eq!(
            aggregation.categorical_aggregations.get("region"),
            Some(&CategoricalAggregation::CommonPrefix)
        );
        assert_eq!(
            aggregation.categorical_aggregations.get("children"),
            Some(&CategoricalAggregation::Join)
        );
        assert_eq!(aggregation.feature_columns.len(), 5);
    }

    #[test]
    fn test_criteria() {
        let config = parse(CONFIG);

        assert_eq!(
            config.criteria(),
            Criteria(vec![
                AnonymizationCriteria::KAnonymous { k: 5 },
                AnonymizationCriteria::LDiverse { l: 2 },
            ])
        );
    }

    #[test]
    fn test_rejects_sensitive_feature() {
        let mut config = parse(CONFIG);
        config.feature_columns.push("smoker".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_emitted_config_can_be_loaded() {
        let config = parse(CONFIG);
        let emitted = toml::to_string(&config).unwrap();

        assert_eq!(parse(&emitted), config);
    }
}
