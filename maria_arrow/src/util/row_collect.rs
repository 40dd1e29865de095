use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::errors::ConnectorError;
use crate::util::row_writer::ArrowRowWriter;
use crate::util::transport;

/// Drain a [RowsReader] into record batches of the given schema.
pub fn collect_rows_to_arrow<'stmt, T: RowsReader<'stmt>>(
    schema: SchemaRef,
    rows_reader: &mut T,
    min_batch_size: usize,
) -> Result<Vec<RecordBatch>, ConnectorError> {
    let mut writer = ArrowRowWriter::new(schema.clone(), min_batch_size)?;
    log::debug!("reading rows");

    while let Some(mut row_reader) = rows_reader.next_row()? {
        writer.prepare_for_batch(1)?;

        for field in schema.fields() {
            let cell_ref = row_reader.next_cell().ok_or_else(|| {
                ConnectorError::DataSchemaMismatch(format!(
                    "row ended before column {}",
                    field.name()
                ))
            })?;

            transport::transport(field, cell_ref, &mut writer)?;
        }
    }
    writer.finish()
}

/// Iterator over rows.
// Cannot be an actual iterator, because of lifetime requirements (I think).
pub trait RowsReader<'stmt> {
    type CellReader<'row>: CellReader<'row>
    where
        Self: 'row;

    fn next_row(&mut self) -> Result<Option<Self::CellReader<'_>>, ConnectorError>;
}

/// Iterator over cells of a row.
// Cannot be an actual iterator, because of lifetime requirements (I think).
pub trait CellReader<'row> {
    type CellRef<'cell>: transport::Produce<'cell>
    where
        Self: 'cell;

    /// Returns `None` past the last cell.
    fn next_cell(&mut self) -> Option<Self::CellRef<'_>>;
}
