use crate::dataset::RowIndex;
use crate::schema::AttributeKind;
use arrow::datatypes::DataType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnonymizationError>;

#[derive(Error, Debug)]
pub enum AnonymizationError {
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("missing scale for column {0}")]
    MissingScale(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("expected a {expected:?} column, found a {found:?} column")]
    KindMismatch {
        expected: AttributeKind,
        found: AttributeKind,
    },

    #[error("unsupported type {data_type:?} for column {column}")]
    UnsupportedType { column: String, data_type: DataType },

    #[error("null value in numerical column {column} at row {row}")]
    NullValue { column: String, row: usize },

    #[error("row {row} is out of range for a dataset of {num_rows} rows")]
    RowOutOfRange { row: RowIndex, num_rows: usize },

    #[error("encountered an empty partition")]
    EmptyPartition,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
