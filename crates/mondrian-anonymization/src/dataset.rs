use crate::error::{AnonymizationError, Result};
use crate::schema::{AttributeKind, Schema};
use std::{cmp::Ordering, fmt};

/// Stable identity of a record within a [`Dataset`].
pub type RowIndex = u32;

/// A set of row indices treated as one anonymity group.
pub type Partition = Vec<RowIndex>;

/// A column whose semantic kind has already been resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Categorical(Vec<String>),
    Numerical(Vec<f64>),
}

impl Column {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Column::Categorical(_) => AttributeKind::Categorical,
            Column::Numerical(_) => AttributeKind::Numerical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(values) => values.len(),
            Column::Numerical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Panics
    ///
    /// Panics if `row` is past the end of the column; [`Dataset::value`] checks the bound.
    pub fn value(&self, row: RowIndex) -> Value {
        match self {
            Column::Categorical(values) => Value::Categorical(values[row as usize].clone()),
            Column::Numerical(values) => Value::Numerical(values[row as usize]),
        }
    }

    pub fn as_categorical(&self) -> Result<&[String]> {
        match self {
            Column::Categorical(values) => Ok(values),
            Column::Numerical(_) => Err(AnonymizationError::KindMismatch {
                expected: AttributeKind::Categorical,
                found: AttributeKind::Numerical,
            }),
        }
    }

    pub fn as_numerical(&self) -> Result<&[f64]> {
        match self {
            Column::Numerical(values) => Ok(values),
            Column::Categorical(_) => Err(AnonymizationError::KindMismatch {
                expected: AttributeKind::Numerical,
                found: AttributeKind::Categorical,
            }),
        }
    }

    /// Values of a numerical column restricted to `partition`.
    pub fn numbers_in(&self, partition: &[RowIndex]) -> Result<Vec<f64>> {
        let values = self.as_numerical()?;
        Ok(partition.iter().map(|&row| values[row as usize]).collect())
    }
}

/// A single cell. Numerical values order by [`f64::total_cmp`], so values can be grouped
/// and sorted.
#[derive(Clone, Debug)]
pub enum Value {
    Categorical(String),
    Numerical(f64),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Categorical(a), Value::Categorical(b)) => a.cmp(b),
            (Value::Numerical(a), Value::Numerical(b)) => a.total_cmp(b),
            (Value::Numerical(_), Value::Categorical(_)) => Ordering::Less,
            (Value::Categorical(_), Value::Numerical(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Categorical(value) => write!(f, "{}", value),
            Value::Numerical(value) => write!(f, "{}", value),
        }
    }
}

/// In-memory table with one resolved [`Column`] per schema attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    schema: Schema,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Dataset {
    pub fn new(schema: Schema, columns: Vec<Column>) -> Result<Self> {
        if schema.len() != columns.len() {
            return Err(AnonymizationError::SchemaMismatch(format!(
                "schema has {} attributes but {} columns were given",
                schema.len(),
                columns.len()
            )));
        }

        for ((name, kind), column) in schema.attributes().iter().zip(&columns) {
            if *kind != column.kind() {
                return Err(AnonymizationError::SchemaMismatch(format!(
                    "column {} is declared {:?} but holds {:?} data",
                    name,
                    kind,
                    column.kind()
                )));
            }
        }

        let num_rows = columns.first().map_or(0, Column::len);
        if let Some(((name, _), column)) = schema
            .attributes()
            .iter()
            .zip(&columns)
            .find(|(_, column)| column.len() != num_rows)
        {
            return Err(AnonymizationError::SchemaMismatch(format!(
                "column {} has {} rows, expected {}",
                name,
                column.len(),
                num_rows
            )));
        }

        if num_rows > RowIndex::MAX as usize {
            return Err(AnonymizationError::SchemaMismatch(format!(
                "{} rows exceed the addressable row count",
                num_rows
            )));
        }

        Ok(Self {
            schema,
            columns,
            num_rows,
        })
    }

    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.schema
            .position(name)
            .map(|index| &self.columns[index])
            .ok_or_else(|| AnonymizationError::UnknownColumn(name.to_string()))
    }

    pub fn value(&self, name: &str, row: RowIndex) -> Result<Value> {
        let column = self.column(name)?;
        self.check_partition(&[row])?;
        Ok(column.value(row))
    }

    /// Fails with [`AnonymizationError::RowOutOfRange`] unless every row of `partition` belongs
    /// to this dataset.
    pub fn check_partition(&self, partition: &[RowIndex]) -> Result<()> {
        match partition.iter().find(|&&row| row as usize >= self.num_rows) {
            Some(&row) => Err(AnonymizationError::RowOutOfRange {
                row,
                num_rows: self.num_rows,
            }),
            None => Ok(()),
        }
    }

    /// The partition holding every row of the dataset.
    pub fn full_partition(&self) -> Partition {
        (0..self.num_rows).map(|i| i as RowIndex).collect()
    }
}

#[derive(Debug, Default)]
pub struct DatasetBuilder {
    schema: Schema,
    columns: Vec<Column>,
}

impl DatasetBuilder {
    pub fn categorical<S: Into<String>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.push(
            name,
            Column::Categorical(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn numerical<N: Into<f64>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = N>,
    ) -> Self {
        self.push(
            name,
            Column::Numerical(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn column(mut self, name: &str, column: Column) -> Self {
        self.push(name, column);
        self
    }

    fn push(&mut self, name: &str, column: Column) {
        self.schema.set_kind(name, column.kind());
        match self.schema.position(name) {
            Some(index) if index < self.columns.len() => self.columns[index] = column,
            _ => self.columns.push(column),
        }
    }

    pub fn build(self) -> Result<Dataset> {
        Dataset::new(self.schema, self.columns)
    }
}
