use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::api::ResultReader;
use crate::errors::ConnectorError;

/// Reader over batches that were read in full before the reader was created.
///
/// Results are buffered so the connection is free again by the time the caller
/// iterates, and a row limit can be applied while reading.
pub struct ArrowReader {
    schema: SchemaRef,
    inner: std::vec::IntoIter<RecordBatch>,
}

impl ArrowReader {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        ArrowReader {
            schema,
            inner: batches.into_iter(),
        }
    }
}

impl Iterator for ArrowReader {
    type Item = Result<RecordBatch, ConnectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ok)
    }
}

impl<'stmt> ResultReader<'stmt> for ArrowReader {
    fn get_schema(&mut self) -> Result<SchemaRef, ConnectorError> {
        Ok(self.schema.clone())
    }
}
