//! Mondrian k-anonymity: greedy multidimensional partitioning of a table over its
//! quasi-identifier columns, followed by generalization of every partition into released rows.

mod aggregate;
mod algorithm;
mod bounds;
mod conversion;
mod dataset;
mod error;
pub mod generalization;
mod schema;
mod span;
mod split;
mod util;
mod validity;

pub use aggregate::{
    build_anonymized_dataset, AggregationConfig, AnonymizedRow, AnonymizedTable, COUNT_COLUMN,
};
pub use algorithm::{partition_dataset, Partitioner, Step};
pub use bounds::{column_bounds, partition_extent, partition_rects, CategoryIndex, Rect};
pub use conversion::{
    infer_kind, infer_schema, record_batch_to_dataset, record_batches_to_dataset,
    table_to_record_batch, NULL_LABEL,
};
pub use dataset::{Column, Dataset, DatasetBuilder, Partition, RowIndex, Value};
pub use error::{AnonymizationError, Result};
pub use generalization::{
    CategoricalAggregation, ColumnGeneralization, GeneralizedKind, GeneralizedValue,
    NumericAggregation,
};
pub use schema::{AttributeKind, Schema};
pub use span::{get_span, get_spans, get_spans_for, scale_span, Spans};
pub use split::split;
pub use validity::{is_k_anonymous, is_l_diverse, AnonymizationCriteria, Criteria, Validity};
