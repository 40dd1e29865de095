//! Connection management: one connection per operation, always released.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use arrow::record_batch::RecordBatch;

use crate::api::{Connection, Connector, ResultReader, Statement};
use crate::config::{self, ConnectionConfig};
use crate::credentials::CredentialResolver;
use crate::errors::ConnectorError;
use crate::statement::Sql;

/// Connection parameters and a way to open connections with them.
///
/// Every operation opens its own connection and closes it before returning.
/// The only state kept between operations is the configuration, including
/// the password once it has been resolved.
pub struct Session<C: Connector> {
    connector: C,
    config: ConnectionConfig,
    credentials: CredentialResolver,
}

impl<C: Connector> Session<C> {
    /// A session that resolves a missing password from the environment or the terminal.
    pub fn new(connector: C, config: ConnectionConfig) -> Self {
        Session {
            connector,
            config,
            credentials: CredentialResolver::default(),
        }
    }

    /// A session configured from the file at `path`.
    ///
    /// When the file does not exist, placeholder values are written there and
    /// [ConnectorError::MissingConfigFile] is returned.
    pub fn from_config_file(connector: C, path: &Path) -> Result<Self, ConnectorError> {
        let config = config::read_config(path, ConnectionConfig::placeholder())?;
        Ok(Session::new(connector, config))
    }

    /// Replace the sources the password is resolved from.
    pub fn with_credentials(mut self, credentials: CredentialResolver) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Drop the password resolved earlier, so it is resolved again on next connect.
    pub fn forget_password(&mut self) {
        self.config.password = None;
    }

    /// Open a connection.
    ///
    /// The username is checked before the password is resolved, so a
    /// misconfigured session does not prompt for anything.
    pub fn connect(&mut self) -> Result<ConnectionGuard<C::Conn>, ConnectorError> {
        if self.config.username.is_empty() {
            return Err(ConnectorError::InvalidConfiguration(
                "username is empty".to_string(),
            ));
        }
        self.credentials.resolve(&mut self.config)?;
        self.config.validate()?;

        let conn = self.connector.connect(&self.config)?;
        Ok(ConnectionGuard::new(conn))
    }

    /// Open a connection, pass it to `f` and close it afterwards, whatever `f` returns.
    pub fn with_connection<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut C::Conn) -> Result<T, E>,
        E: From<ConnectorError>,
    {
        let mut conn = self.connect()?;
        let res = f(&mut conn);
        conn.close();
        res
    }

    /// Execute a statement that returns no rows. Returns the number of affected rows.
    pub fn run_statement(&mut self, sql: impl Into<Sql>) -> Result<u64, ConnectorError> {
        let sql = sql.into();
        self.with_connection(|conn| conn.execute(&sql.text, &sql.params))
    }

    /// Execute a query and collect at most `row_limit` rows of its result.
    ///
    /// Rows past the limit are still sent by the server and discarded while
    /// reading. Put a `LIMIT` into the query to avoid transferring them.
    pub fn fetch_query(
        &mut self,
        sql: impl Into<Sql>,
        row_limit: Option<usize>,
    ) -> Result<RecordBatch, ConnectorError> {
        let sql = sql.into();
        self.with_connection(|conn| fetch(conn, &sql, row_limit))
    }
}

/// Run a query over an open connection and concatenate its result into one batch.
pub fn fetch<C: Connection>(
    conn: &mut C,
    sql: &Sql,
    row_limit: Option<usize>,
) -> Result<RecordBatch, ConnectorError> {
    let mut stmt = conn.query(&sql.text)?;
    let mut reader = stmt.start(&sql.params, row_limit)?;

    let schema = reader.get_schema()?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(arrow::compute::concat_batches(&schema, &batches)?)
}

/// An open connection that is closed when this guard goes out of scope.
///
/// Failures to close are logged and otherwise ignored.
pub struct ConnectionGuard<C: Connection> {
    conn: Option<C>,
}

impl<C: Connection> ConnectionGuard<C> {
    fn new(conn: C) -> Self {
        ConnectionGuard { conn: Some(conn) }
    }

    /// Close the connection now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close() {
                log::warn!("error while closing connection: {e}");
            }
        }
    }
}

impl<C: Connection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        // only empty after release, which consumes or drops the guard
        self.conn.as_ref().unwrap()
    }
}

impl<C: Connection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().unwrap()
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        self.release();
    }
}
