//! Database client interface that uses Apache Arrow as data-transfer format and schema definition format.
//!
//! The important traits are:
//! - [Connector], which opens a [Connection] from a [ConnectionConfig],
//! - [Connection], providing [Connection::query], [Connection::execute] and [Connection::append],
//! - [SchemaGet], for schema introspection,
//! - [SchemaEdit], for basic schema migration commands.
//!
//! The MariaDB implementation lives in [crate::mysql]. Anything else that implements these
//! traits (an in-memory fake, for example) can be driven by [crate::Session] just the same.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::config::ConnectionConfig;
use crate::errors::{ConnectorError, TableCreateError, TableDropError};

/// Opens connections to a data store.
pub trait Connector {
    type Conn: Connection;

    /// Open a new connection.
    ///
    /// The config has already been validated, so the password is present.
    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Conn, ConnectorError>;
}

/// A connection to a data store.
pub trait Connection: SchemaGet + SchemaEdit {
    type Stmt<'conn>: Statement<'conn>
    where
        Self: 'conn;

    type Append<'conn>: Append<'conn>
    where
        Self: 'conn;

    /// Prepare a query to the data store, using data store's preferred query language.
    fn query<'a>(&'a mut self, query: &str) -> Result<Self::Stmt<'a>, ConnectorError>;

    /// Execute a statement that does not return rows and return the number of affected rows.
    fn execute(&mut self, statement: &str, params: &[String]) -> Result<u64, ConnectorError>;

    /// Prepare an appender for the given table.
    fn append<'a>(&'a mut self, table_name: &str) -> Result<Self::Append<'a>, ConnectorError>;

    /// Close the connection.
    fn close(self) -> Result<(), ConnectorError>;
}

/// A task that is to be executed in the data store, over a connection.
pub trait Statement<'conn> {
    type Reader<'stmt>: ResultReader<'stmt>
    where
        Self: 'stmt;

    /// Start executing.
    /// This will create a reader that can retrieve the result schema and data.
    ///
    /// At most `row_limit` rows are read, or all of them when it is `None`.
    fn start(
        &mut self,
        params: &[String],
        row_limit: Option<usize>,
    ) -> Result<Self::Reader<'_>, ConnectorError>;
}

/// Reads result of the query, starting with the schema.
pub trait ResultReader<'stmt>: Iterator<Item = Result<RecordBatch, ConnectorError>> {
    /// Return the schema of the result.
    fn get_schema(&mut self) -> Result<SchemaRef, ConnectorError>;
}

/// Receive [RecordBatch]es that have to be written to a table in the data store.
pub trait Append<'conn> {
    /// Returns the number of inserted rows.
    fn append(&mut self, batch: RecordBatch) -> Result<u64, ConnectorError>;

    fn finish(self) -> Result<(), ConnectorError>;
}

/// Schema introspection
pub trait SchemaGet {
    fn table_list(&mut self) -> Result<Vec<String>, ConnectorError>;

    fn table_get(&mut self, name: &str) -> Result<SchemaRef, ConnectorError>;
}

/// Schema migration
pub trait SchemaEdit {
    fn table_create(&mut self, name: &str, schema: SchemaRef) -> Result<(), TableCreateError>;

    fn table_drop(&mut self, name: &str) -> Result<(), TableDropError>;
}
