//! Small accessors for reading values out of query results.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, UInt64Array};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::errors::ConnectorError;

/// Values of the named column, converted to strings.
pub fn string_column(
    batch: &RecordBatch,
    name: &str,
) -> Result<Vec<Option<String>>, ConnectorError> {
    let column = batch.column_by_name(name).ok_or_else(|| {
        ConnectorError::DataSchemaMismatch(format!("result has no column named {name}"))
    })?;
    let column = cast(column, &DataType::Utf8)?;
    let column = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ConnectorError::DataSchemaMismatch(format!("{name} is not a string")))?;

    Ok(column.iter().map(|v| v.map(str::to_string)).collect())
}

/// The value in the first row of the first column, as an unsigned integer.
///
/// `None` when the result is empty or the value is NULL.
pub fn first_u64(batch: &RecordBatch) -> Result<Option<u64>, ConnectorError> {
    if batch.num_columns() == 0 || batch.num_rows() == 0 {
        return Ok(None);
    }
    let column = cast(batch.column(0), &DataType::UInt64)?;
    let column = column
        .as_any()
        .downcast_ref::<UInt64Array>()
        .ok_or_else(|| ConnectorError::DataSchemaMismatch("expected a number".to_string()))?;

    Ok(if column.is_null(0) {
        None
    } else {
        Some(column.value(0))
    })
}

/// A copy of `batch` with one more column at the end.
pub fn with_column(
    batch: &RecordBatch,
    field: Field,
    array: ArrayRef,
) -> Result<RecordBatch, ConnectorError> {
    let schema = batch.schema();
    let mut fields: Vec<_> = schema.fields().iter().cloned().collect();
    fields.push(Arc::new(field));

    let mut columns = batch.columns().to_vec();
    columns.push(array);

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        columns,
    )?)
}
