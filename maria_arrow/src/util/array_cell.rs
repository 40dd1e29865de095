use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use super::transport::{Produce, ProduceTy};
use crate::errors::ConnectorError;

/// A reference to one cell of an Arrow array, readable through [Produce].
pub struct ArrayCellRef<'a> {
    pub array: &'a ArrayRef,
    pub field: &'a Field,
    pub row_number: usize,
}

impl<'a> ArrayCellRef<'a> {
    /// One cell reference per column of the batch, all pointing at the first row.
    pub fn vec_from_batch(batch: &'a RecordBatch, schema: &'a Schema) -> Vec<ArrayCellRef<'a>> {
        batch
            .columns()
            .iter()
            .zip(schema.fields().iter())
            .map(|(array, field)| ArrayCellRef {
                array,
                field: field.as_ref(),
                row_number: 0,
            })
            .collect()
    }

    fn downcast<A: Array + 'static>(&self) -> Result<&'a A, ConnectorError> {
        self.array.as_any().downcast_ref::<A>().ok_or_else(|| {
            ConnectorError::DataSchemaMismatch(format!(
                "column {} declared as {} holds an array of type {}",
                self.field.name(),
                self.field.data_type(),
                self.array.data_type()
            ))
        })
    }

    fn is_null(&self) -> bool {
        self.array.is_null(self.row_number)
    }
}

impl<'r> Produce<'r> for &ArrayCellRef<'r> {}

macro_rules! impl_produce_ty {
    ($($t: ty => $Array: ty,)+) => {
        $(
            impl<'r> ProduceTy<'r, $t> for &ArrayCellRef<'r> {
                fn produce(self) -> Result<$t, ConnectorError> {
                    Ok(self.downcast::<$Array>()?.value(self.row_number))
                }

                fn produce_opt(self) -> Result<Option<$t>, ConnectorError> {
                    if self.is_null() {
                        return Ok(None);
                    }
                    self.produce().map(Some)
                }
            }
        )+
    };
}

impl_produce_ty!(
    bool => BooleanArray,
    i8 => Int8Array,
    i16 => Int16Array,
    i32 => Int32Array,
    i64 => Int64Array,
    u8 => UInt8Array,
    u16 => UInt16Array,
    u32 => UInt32Array,
    u64 => UInt64Array,
    f32 => Float32Array,
    f64 => Float64Array,
);

impl<'r> ProduceTy<'r, String> for &ArrayCellRef<'r> {
    fn produce(self) -> Result<String, ConnectorError> {
        let value = match self.array.data_type() {
            DataType::LargeUtf8 => self.downcast::<LargeStringArray>()?.value(self.row_number),
            _ => self.downcast::<StringArray>()?.value(self.row_number),
        };
        Ok(value.to_string())
    }

    fn produce_opt(self) -> Result<Option<String>, ConnectorError> {
        if self.is_null() {
            return Ok(None);
        }
        self.produce().map(Some)
    }
}

impl<'r> ProduceTy<'r, Vec<u8>> for &ArrayCellRef<'r> {
    fn produce(self) -> Result<Vec<u8>, ConnectorError> {
        let value = match self.array.data_type() {
            DataType::LargeBinary => self.downcast::<LargeBinaryArray>()?.value(self.row_number),
            _ => self.downcast::<BinaryArray>()?.value(self.row_number),
        };
        Ok(value.to_vec())
    }

    fn produce_opt(self) -> Result<Option<Vec<u8>>, ConnectorError> {
        if self.is_null() {
            return Ok(None);
        }
        self.produce().map(Some)
    }
}
