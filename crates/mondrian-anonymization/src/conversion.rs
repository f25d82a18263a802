use crate::aggregate::{AnonymizedTable, COUNT_COLUMN};
use crate::dataset::{Column, Dataset, Value};
use crate::error::{AnonymizationError, Result};
use crate::generalization::{GeneralizedKind, GeneralizedValue};
use crate::schema::{AttributeKind, Schema};
use arrow::{
    array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray, UInt64Array},
    compute::kernels::cast::{can_cast_types, cast},
    datatypes::{DataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

/// Label used for missing categorical values.
pub const NULL_LABEL: &str = "None";

/// Attribute kind of an arrow field: strings and booleans are categorical, integers and floats
/// numerical.
pub fn infer_kind(field: &Field) -> Result<AttributeKind> {
    match field.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Boolean => Ok(AttributeKind::Categorical),
        DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64 => Ok(AttributeKind::Numerical),
        other => Err(AnonymizationError::UnsupportedType {
            column: field.name().to_string(),
            data_type: other.clone(),
        }),
    }
}

/// Resolves the kind of every field of `schema`, see [`infer_kind`].
pub fn infer_schema(schema: &ArrowSchema) -> Result<Schema> {
    let mut inferred = Schema::new();

    for field in schema.fields() {
        inferred.set_kind(field.name().as_str(), infer_kind(field)?);
    }

    Ok(inferred)
}

fn cast_column(name: &str, array: &ArrayRef, to: &DataType) -> Result<ArrayRef> {
    if !can_cast_types(array.data_type(), to) {
        return Err(AnonymizationError::UnsupportedType {
            column: name.to_string(),
            data_type: array.data_type().clone(),
        });
    }

    Ok(cast(array, to)?)
}

fn extend_categorical(name: &str, array: &ArrayRef, values: &mut Vec<String>) -> Result<()> {
    if let Some(booleans) = array.as_any().downcast_ref::<BooleanArray>() {
        values.extend(booleans.iter().map(|value| match value {
            Some(value) => value.to_string(),
            None => NULL_LABEL.to_string(),
        }));
        return Ok(());
    }

    let casted = cast_column(name, array, &DataType::Utf8)?;
    let strings = casted
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AnonymizationError::UnsupportedType {
            column: name.to_string(),
            data_type: array.data_type().clone(),
        })?;

    values.extend(
        strings
            .iter()
            .map(|value| value.map_or_else(|| NULL_LABEL.to_string(), String::from)),
    );

    Ok(())
}

fn extend_numerical(name: &str, array: &ArrayRef, values: &mut Vec<f64>) -> Result<()> {
    let casted = cast_column(name, array, &DataType::Float64)?;
    let numbers = casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| AnonymizationError::UnsupportedType {
            column: name.to_string(),
            data_type: array.data_type().clone(),
        })?;

    let offset = values.len();
    for (row, value) in numbers.iter().enumerate() {
        let value = value.ok_or_else(|| AnonymizationError::NullValue {
            column: name.to_string(),
            row: offset + row,
        })?;
        values.push(value);
    }

    Ok(())
}

/// Coerces the columns named in `schema` into a [`Dataset`]. Columns of the batches that the
/// schema does not mention are ignored.
pub fn record_batches_to_dataset(batches: &[RecordBatch], schema: &Schema) -> Result<Dataset> {
    let mut columns: Vec<Column> = schema
        .attributes()
        .iter()
        .map(|(_, kind)| match kind {
            AttributeKind::Categorical => Column::Categorical(vec![]),
            AttributeKind::Numerical => Column::Numerical(vec![]),
        })
        .collect();

    for batch in batches {
        for ((name, _), column) in schema.attributes().iter().zip(columns.iter_mut()) {
            let index = batch
                .schema()
                .index_of(name)
                .map_err(|_| AnonymizationError::UnknownColumn(name.to_string()))?;
            let array = batch.column(index);

            match column {
                Column::Categorical(values) => extend_categorical(name, array, values)?,
                Column::Numerical(values) => extend_numerical(name, array, values)?,
            }
        }
    }

    Dataset::new(schema.clone(), columns)
}

pub fn record_batch_to_dataset(batch: &RecordBatch, schema: &Schema) -> Result<Dataset> {
    record_batches_to_dataset(std::slice::from_ref(batch), schema)
}

fn number_column(name: &str, values: impl Iterator<Item = Option<f64>>) -> Result<ArrayRef> {
    let numbers = values
        .map(|value| {
            value.ok_or_else(|| {
                AnonymizationError::SchemaMismatch(format!("column {} mixes labels into numbers", name))
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Arc::new(Float64Array::from(numbers)))
}

/// Arrow representation of an anonymized table: numeric generalizations become `Float64`,
/// labels `Utf8`, the sensitive column keeps its kind and `count` is `UInt64`.
pub fn table_to_record_batch(table: &AnonymizedTable) -> Result<RecordBatch> {
    let mut fields = vec![];
    let mut columns: Vec<ArrayRef> = vec![];

    for (index, (name, kind)) in table
        .feature_columns()
        .iter()
        .zip(table.feature_kinds())
        .enumerate()
    {
        let values = table.rows().iter().map(move |row| &row.features[index]);

        match kind {
            GeneralizedKind::Number => {
                fields.push(Field::new(name, DataType::Float64, false));
                columns.push(number_column(
                    name,
                    values.map(|value| match value {
                        GeneralizedValue::Number(number) => Some(*number),
                        GeneralizedValue::Label(_) => None,
                    }),
                )?);
            }
            GeneralizedKind::Label => {
                fields.push(Field::new(name, DataType::Utf8, false));
                columns.push(Arc::new(
                    values
                        .map(|value| Some(value.to_string()))
                        .collect::<StringArray>(),
                ));
            }
        }
    }

    let sensitive_values = table.rows().iter().map(|row| &row.sensitive_value);
    match table.sensitive_kind() {
        AttributeKind::Numerical => {
            fields.push(Field::new(table.sensitive_column(), DataType::Float64, false));
            columns.push(number_column(
                table.sensitive_column(),
                sensitive_values.map(|value| match value {
                    Value::Numerical(number) => Some(*number),
                    Value::Categorical(_) => None,
                }),
            )?);
        }
        AttributeKind::Categorical => {
            fields.push(Field::new(table.sensitive_column(), DataType::Utf8, false));
            columns.push(Arc::new(
                sensitive_values
                    .map(|value| Some(value.to_string()))
                    .collect::<StringArray>(),
            ));
        }
    }

    fields.push(Field::new(COUNT_COLUMN, DataType::UInt64, false));
    columns.push(Arc::new(UInt64Array::from(
        table
            .rows()
            .iter()
            .map(|row| row.count as u64)
            .collect::<Vec<u64>>(),
    )));

    Ok(RecordBatch::try_new(
        Arc::new(ArrowSchema::new(fields)),
        columns,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_anonymized_dataset, AggregationConfig};
    use arrow::array::Int32Array;

    fn batch() -> RecordBatch {
        let age_array = Int32Array::from(vec![19, 18, 28, 33]);
        let sex_array = StringArray::from(vec![Some("female"), Some("male"), None, Some("male")]);
        let smoker_array = BooleanArray::from(vec![true, false, false, false]);
        let charges_array = Float64Array::from(vec![16884.924, 1725.5523, 4449.462, 21984.47061]);

        let schema = ArrowSchema::new(vec![
            Field::new("age", DataType::Int32, false),
            Field::new("sex", DataType::Utf8, true),
            Field::new("smoker", DataType::Boolean, false),
            Field::new("charges", DataType::Float64, false),
        ]);

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(age_array),
                Arc::new(sex_array),
                Arc::new(smoker_array),
                Arc::new(charges_array),
            ],
        )
        .unwrap()
    }

    #[test]
    fn infers_kinds_from_arrow_types() {
        let schema = infer_schema(&batch().schema()).unwrap();

        assert_eq!(
            schema.attributes(),
            &[
                ("age".to_string(), AttributeKind::Numerical),
                ("sex".to_string(), AttributeKind::Categorical),
                ("smoker".to_string(), AttributeKind::Categorical),
                ("charges".to_string(), AttributeKind::Numerical),
            ]
        );
    }

    #[test]
    fn rejects_unsupported_types() {
        let schema = ArrowSchema::new(vec![Field::new("blob", DataType::Binary, true)]);

        assert!(matches!(
            infer_schema(&schema),
            Err(AnonymizationError::UnsupportedType { column, .. }) if column == "blob"
        ));
    }

    #[test]
    fn converts_batch_into_dataset() {
        let batch = batch();
        let schema = infer_schema(&batch.schema())
            .unwrap()
            .with_attribute("age", AttributeKind::Categorical);
        let dataset = record_batch_to_dataset(&batch, &schema).unwrap();

        assert_eq!(
            dataset.column("age").unwrap(),
            &Column::Categorical(vec![
                "19".to_string(),
                "18".to_string(),
                "28".to_string(),
                "33".to_string()
            ])
        );
        assert_eq!(
            dataset.value("sex", 2).unwrap(),
            Value::Categorical(NULL_LABEL.to_string())
        );
        assert_eq!(
            dataset.value("smoker", 0).unwrap(),
            Value::Categorical("true".to_string())
        );
        assert_eq!(
            dataset.value("charges", 1).unwrap(),
            Value::Numerical(1725.5523)
        );
    }

    #[test]
    fn schema_subset_ignores_other_columns() {
        let schema = Schema::new().with_attribute("charges", AttributeKind::Numerical);
        let dataset = record_batches_to_dataset(&[batch(), batch()], &schema).unwrap();

        assert_eq!(dataset.num_rows(), 8);
        assert_eq!(dataset.schema().len(), 1);
    }

    #[test]
    fn null_numbers_are_rejected() {
        let schema = ArrowSchema::new(vec![Field::new("bmi", DataType::Float64, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![Some(27.9), None]))],
        )
        .unwrap();
        let schema = infer_schema(&batch.schema()).unwrap();

        assert!(matches!(
            record_batch_to_dataset(&batch, &schema),
            Err(AnonymizationError::NullValue { row: 1, .. })
        ));
    }

    #[test]
    fn unknown_schema_column() {
        let schema = Schema::new().with_attribute("bmi", AttributeKind::Numerical);

        assert!(matches!(
            record_batch_to_dataset(&batch(), &schema),
            Err(AnonymizationError::UnknownColumn(name)) if name == "bmi"
        ));
    }

    #[test]
    fn table_into_record_batch() {
        let batch = batch();
        let dataset = record_batch_to_dataset(&batch, &infer_schema(&batch.schema()).unwrap())
            .unwrap();
        let config = AggregationConfig::new(&["age", "smoker"], "sex");
        let table = build_anonymized_dataset(&dataset, &[vec![0, 1, 2, 3]], &config).unwrap();

        let output = table_to_record_batch(&table).unwrap();

        assert_eq!(output.num_rows(), 3);
        assert_eq!(output.num_columns(), 4);
        assert_eq!(output.schema().field(0).data_type(), &DataType::Float64);
        assert_eq!(output.schema().field(1).data_type(), &DataType::Utf8);
        assert_eq!(output.schema().field(3).name(), COUNT_COLUMN);

        let smoker = output
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(smoker.value(0), "false,true");

        let counts = output
            .column(3)
            .as_any()
            .downcast_ref::<UInt64Array>()
            .unwrap()
            .iter()
            .collect::<Vec<Option<u64>>>();
        // None, female, male
        assert_eq!(counts, vec![Some(1), Some(1), Some(2)]);
    }
}
