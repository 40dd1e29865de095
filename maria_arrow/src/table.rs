//! Table-level operations, each one a single round trip over its own connection.

use std::sync::Arc;

use arrow::array::StringArray;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::api::{Append, Connection, Connector, SchemaEdit, SchemaGet};
use crate::errors::{ConnectorError, TableCreateError, TableDropError};
use crate::session::{fetch, Session};
use crate::statement::{self, KeyOptions};
use crate::util::batch;

/// Name of the column that [Session::all_table_columns] appends.
pub const TABLE_NAME_COLUMN: &str = "table";

/// Columns of a `SHOW COLUMNS` result.
const SHOW_COLUMNS_FIELDS: [&str; 6] = ["Field", "Type", "Null", "Key", "Default", "Extra"];

/// How [Session::row_count_with] obtains the number of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowCount {
    /// `SELECT COUNT(*)`, exact but scans the table.
    #[default]
    Exact,

    /// Read from `information_schema.TABLES`.
    ///
    /// Does not scan the table, but for InnoDB this is only an estimate
    /// and can be off by a large margin.
    CatalogEstimate,
}

/// What [Session::write_table] does when the table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Fail with [TableCreateError::TableExists].
    #[default]
    Create,

    /// Drop the existing table first.
    Overwrite,
}

/// Number of rows and columns of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableShape {
    pub rows: u64,
    pub columns: usize,
}

impl<C: Connector> Session<C> {
    pub fn list_tables(&mut self) -> Result<Vec<String>, ConnectorError> {
        self.with_connection(|conn| conn.table_list())
    }

    /// Columns of a table with their declared types, as reported by `SHOW COLUMNS`.
    pub fn table_columns(&mut self, table: &str) -> Result<RecordBatch, ConnectorError> {
        self.fetch_query(statement::show_columns(table, None), None)
    }

    /// Columns of all tables, with the name of the owning table in an extra column.
    pub fn all_table_columns(&mut self) -> Result<RecordBatch, ConnectorError> {
        self.with_connection(|conn| {
            let mut batches = Vec::new();
            for table in conn.table_list()? {
                let columns = fetch(conn, &statement::show_columns(&table, None), None)?;

                let names = StringArray::from(vec![table.as_str(); columns.num_rows()]);
                let field = Field::new(TABLE_NAME_COLUMN, DataType::Utf8, false);
                batches.push(batch::with_column(&columns, field, Arc::new(names))?);
            }

            let schema = match batches.first() {
                Some(first) => first.schema(),
                None => {
                    let fields = SHOW_COLUMNS_FIELDS
                        .iter()
                        .chain(&[TABLE_NAME_COLUMN])
                        .map(|name| Field::new(*name, DataType::Utf8, true))
                        .collect::<Vec<_>>();
                    Arc::new(Schema::new(fields))
                }
            };
            Ok(arrow::compute::concat_batches(&schema, &batches)?)
        })
    }

    /// Declared type of a column, such as `varchar(32)`.
    ///
    /// `None` when the table has no such column.
    pub fn column_type(
        &mut self,
        table: &str,
        field: &str,
    ) -> Result<Option<String>, ConnectorError> {
        let columns = self.fetch_query(statement::show_columns(table, Some(field)), None)?;
        let types = batch::string_column(&columns, "Type")?;
        Ok(types.into_iter().next().flatten())
    }

    pub fn set_column_type(
        &mut self,
        table: &str,
        field: &str,
        field_type: &str,
    ) -> Result<u64, ConnectorError> {
        self.run_statement(statement::modify_column(table, field, field_type))
    }

    pub fn add_column(
        &mut self,
        table: &str,
        field: &str,
        field_type: &str,
    ) -> Result<u64, ConnectorError> {
        self.run_statement(statement::add_column(table, field, field_type))
    }

    pub fn drop_column(&mut self, table: &str, field: &str) -> Result<u64, ConnectorError> {
        self.run_statement(statement::drop_column(table, field))
    }

    /// Add an auto-increment integer column, which numbers existing rows in storage order.
    pub fn add_auto_increment_key(
        &mut self,
        table: &str,
        key: &KeyOptions,
    ) -> Result<u64, ConnectorError> {
        self.run_statement(statement::add_auto_increment_key(table, key))
    }

    /// Exact number of rows of a table.
    pub fn row_count(&mut self, table: &str) -> Result<u64, ConnectorError> {
        self.row_count_with(table, RowCount::Exact)
    }

    pub fn row_count_with(&mut self, table: &str, method: RowCount) -> Result<u64, ConnectorError> {
        match method {
            RowCount::Exact => {
                let res = self.fetch_query(statement::count_rows(table), None)?;
                batch::first_u64(&res)?.ok_or_else(|| {
                    ConnectorError::DataSchemaMismatch("COUNT(*) returned no value".to_string())
                })
            }
            RowCount::CatalogEstimate => {
                let res = self.fetch_query(statement::catalog_row_estimate(table), None)?;
                if res.num_rows() == 0 {
                    return Err(ConnectorError::Execution(
                        format!("Table '{table}' doesn't exist").into(),
                    ));
                }
                // views have no statistics
                Ok(batch::first_u64(&res)?.unwrap_or(0))
            }
        }
    }

    /// Arrow schema the rows of a table are read into, from the declared column types.
    ///
    /// Fails with [ConnectorError::IncompatibleSchema] when a column type has no
    /// Arrow counterpart.
    pub fn table_schema(&mut self, table: &str) -> Result<SchemaRef, ConnectorError> {
        self.with_connection(|conn| conn.table_get(table))
    }

    /// Names of the columns of a table, in declaration order.
    pub fn column_names(&mut self, table: &str) -> Result<Vec<String>, ConnectorError> {
        let columns = self.table_columns(table)?;
        let names = batch::string_column(&columns, "Field")?;
        Ok(names.into_iter().flatten().collect())
    }

    pub fn column_count(&mut self, table: &str) -> Result<usize, ConnectorError> {
        Ok(self.column_names(table)?.len())
    }

    pub fn table_shape(&mut self, table: &str) -> Result<TableShape, ConnectorError> {
        Ok(TableShape {
            rows: self.row_count(table)?,
            columns: self.column_count(table)?,
        })
    }

    /// Create a table with the schema of `batch` and insert its rows.
    ///
    /// When the rows cannot be inserted, the new table is dropped again.
    /// Returns the number of inserted rows.
    pub fn write_table(
        &mut self,
        table: &str,
        batch: &RecordBatch,
        mode: WriteMode,
    ) -> Result<u64, TableCreateError> {
        self.with_connection(|conn| {
            if mode == WriteMode::Overwrite {
                match conn.table_drop(table) {
                    Ok(()) | Err(TableDropError::TableNonexistent) => {}
                    Err(TableDropError::Connector(e)) => return Err(e.into()),
                }
            }
            conn.table_create(table, batch.schema())?;

            match append(conn, table, batch) {
                Ok(inserted) => Ok(inserted),
                Err(e) => {
                    if let Err(drop_err) = conn.table_drop(table) {
                        log::warn!("error while dropping {table} after a failed write: {drop_err}");
                    }
                    Err(e.into())
                }
            }
        })
    }

    /// Insert the rows of `batch` into an existing table.
    ///
    /// Returns the number of inserted rows.
    pub fn append_table(&mut self, table: &str, batch: &RecordBatch) -> Result<u64, ConnectorError> {
        self.with_connection(|conn| append(conn, table, batch))
    }

    /// Rows of a table, at most `row_limit` of them.
    ///
    /// The limit is part of the statement, so the server sends no more rows than that.
    pub fn fetch_table(
        &mut self,
        table: &str,
        row_limit: Option<usize>,
    ) -> Result<RecordBatch, ConnectorError> {
        self.fetch_query(statement::select_all(table, row_limit), row_limit)
    }

    /// Drop a table. With `missing_ok`, a table that does not exist is not an error.
    pub fn remove_table(&mut self, table: &str, missing_ok: bool) -> Result<(), TableDropError> {
        self.with_connection(|conn| match conn.table_drop(table) {
            Err(TableDropError::TableNonexistent) if missing_ok => Ok(()),
            res => res,
        })
    }
}

fn append<C: Connection>(
    conn: &mut C,
    table: &str,
    batch: &RecordBatch,
) -> Result<u64, ConnectorError> {
    let mut appender = conn.append(table)?;
    let inserted = appender.append(batch.clone())?;
    appender.finish()?;
    Ok(inserted)
}
