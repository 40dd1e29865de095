use std::any::Any;

use arrow::array::builder::{
    BinaryBuilder, LargeBinaryBuilder, LargeStringBuilder, NullBuilder, StringBuilder,
};
use arrow::array::{ArrayBuilder, ArrayRef};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use fehler::throws;

use super::transport::{Consume, ConsumeTy};
use crate::errors::ConnectorError;

/// Receives values row-by-row and passes them to [ArrayBuilder]s,
/// which construct [RecordBatch]es.
pub struct ArrowRowWriter {
    schema: SchemaRef,
    min_batch_size: usize,
    data: Vec<RecordBatch>,

    /// Determines into which column the next stream value should go.
    receiver: Organizer,

    /// Array buffers.
    builders: Option<Vec<Box<dyn ArrayBuilder>>>,
    /// Number of rows reserved to be written in by [ArrowRowWriter::prepare_for_batch]
    rows_reserved: usize,
    /// Number of rows allocated within builders.
    rows_capacity: usize,
}

impl ArrowRowWriter {
    #[throws(ConnectorError)]
    pub fn new(schema: SchemaRef, min_batch_size: usize) -> Self {
        ArrowRowWriter {
            receiver: Organizer::new(schema.fields().len()),
            data: Vec::new(),

            builders: None,
            rows_reserved: 0,
            rows_capacity: 0,

            schema,
            min_batch_size: min_batch_size.max(1),
        }
    }

    #[throws(ConnectorError)]
    pub fn prepare_for_batch(&mut self, row_count: usize) {
        self.receiver.reset();
        self.allocate(row_count)?;
    }

    /// Make sure that there is enough memory allocated in builders for the incoming batch.
    /// Might allocate more than needed, for future row reservations.
    #[throws(ConnectorError)]
    fn allocate(&mut self, row_count: usize) {
        if self.rows_capacity >= row_count + self.rows_reserved {
            // there is enough capacity, no need to allocate
            self.rows_reserved += row_count;
            return;
        }

        if self.rows_reserved > 0 {
            self.flush()?;
        }

        let to_allocate = if row_count < self.min_batch_size {
            self.min_batch_size
        } else {
            row_count
        };

        let builders: Vec<Box<dyn ArrayBuilder>> = self
            .schema
            .fields()
            .iter()
            .map(|f| arrow::array::make_builder(f.data_type(), to_allocate))
            .collect();

        self.builders = Some(builders);
        self.rows_reserved = row_count;
        self.rows_capacity = to_allocate;
    }

    #[throws(ConnectorError)]
    fn flush(&mut self) {
        if let Some(mut builders) = self.builders.take() {
            let columns: Vec<ArrayRef> = builders
                .iter_mut()
                .map(|builder| builder.finish())
                .collect();
            let rb = RecordBatch::try_new(self.schema.clone(), columns)?;
            self.data.push(rb);
        }
    }

    #[throws(ConnectorError)]
    pub fn finish(mut self) -> Vec<RecordBatch> {
        self.flush()?;
        self.data
    }

    fn next_builder(&mut self) -> &mut dyn Any {
        let col = self.receiver.next_col_index();
        // this is safe, because prepare_for_batch must have been called earlier
        let builders = self.builders.as_mut().unwrap();
        builders[col].as_any_mut()
    }
}

impl Consume for ArrowRowWriter {}

/// Determines into which column the next stream value should go.
struct Organizer {
    col_count: usize,
    next_col: usize,
}

impl Organizer {
    fn new(col_count: usize) -> Self {
        Organizer {
            col_count,
            next_col: 0,
        }
    }

    fn reset(&mut self) {
        self.next_col = 0;
    }

    fn next_col_index(&mut self) -> usize {
        let col = self.next_col;

        self.next_col += 1;
        if self.next_col == self.col_count {
            self.next_col = 0;
        }
        col
    }
}

macro_rules! impl_consume_ty {
    (
        $(
            { $Native:ty => $Builder:tt }
        )*
    ) => {
        $(
            impl ConsumeTy<$Native> for ArrowRowWriter {
                fn consume(&mut self, value: $Native) {
                    self.next_builder()
                        .downcast_mut::<arrow::array::builder::$Builder>().unwrap()
                        .append_value(value);
                }
                fn consume_opt(&mut self, value: Option<$Native>) {
                    self.next_builder()
                        .downcast_mut::<arrow::array::builder::$Builder>().unwrap()
                        .append_option(value);
                }
            }
        )+
    };
}

// List of ConsumeTy implementations to generate.
// Must match with arrow::array::make_builder
impl_consume_ty! {
       { bool    => BooleanBuilder         }  // Boolean
       { i8      => Int8Builder            }  // Int8
       { i16     => Int16Builder           }  // Int16
       { i32     => Int32Builder           }  // Int32
       { i64     => Int64Builder           }  // Int64
       { u8      => UInt8Builder           }  // UInt8
       { u16     => UInt16Builder          }  // UInt16
       { u32     => UInt32Builder          }  // UInt32
       { u64     => UInt64Builder          }  // UInt64
       { f32     => Float32Builder         }  // Float32
       { f64     => Float64Builder         }  // Float64
}

impl ConsumeTy<()> for ArrowRowWriter {
    fn consume(&mut self, _value: ()) {
        self.next_builder()
            .downcast_mut::<NullBuilder>()
            .unwrap()
            .append_null();
    }
    fn consume_opt(&mut self, _value: Option<()>) {
        self.consume(());
    }
}

// Utf8 and LargeUtf8 (or Binary and LargeBinary) both transport the same native type,
// so the builder is picked by whichever one the column was allocated with.

impl ConsumeTy<String> for ArrowRowWriter {
    fn consume(&mut self, value: String) {
        self.consume_opt(Some(value));
    }
    fn consume_opt(&mut self, value: Option<String>) {
        let builder = self.next_builder();
        if let Some(b) = builder.downcast_mut::<StringBuilder>() {
            b.append_option(value);
        } else {
            let b = builder.downcast_mut::<LargeStringBuilder>().unwrap();
            b.append_option(value);
        }
    }
}

impl ConsumeTy<Vec<u8>> for ArrowRowWriter {
    fn consume(&mut self, value: Vec<u8>) {
        self.consume_opt(Some(value));
    }
    fn consume_opt(&mut self, value: Option<Vec<u8>>) {
        let builder = self.next_builder();
        if let Some(b) = builder.downcast_mut::<BinaryBuilder>() {
            b.append_option(value);
        } else {
            let b = builder.downcast_mut::<LargeBinaryBuilder>().unwrap();
            b.append_option(value);
        }
    }
}
