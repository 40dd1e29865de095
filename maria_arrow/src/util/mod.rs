//! Utilities for converting row-major tabular data into Apache Arrow and back.
//! Used by database client implementations.

mod array_cell;
mod arrow_reader;
pub mod batch;
pub mod escape;
mod row_collect;
mod row_writer;
pub mod transport;

pub use array_cell::ArrayCellRef;
pub use arrow_reader::ArrowReader;
pub use row_collect::{collect_rows_to_arrow, CellReader, RowsReader};
pub use row_writer::ArrowRowWriter;
