use std::path::PathBuf;

use thiserror::Error;

/// Error reported by the underlying database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can be raised from this library.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("configuration file {} did not exist; defaults were written there, edit them before connecting", .path.display())]
    MissingConfigFile { path: PathBuf },

    #[error("invalid connection configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no password configured and no secret source is available")]
    CredentialUnavailable,

    #[error("cannot connect to the database: {0}")]
    Connection(#[source] DriverError),

    #[error("statement rejected by the server: {0}")]
    Execution(#[source] DriverError),

    #[error("Query returned no result sets")]
    NoResultSets,

    #[error("Result data does not match the schema: {0}")]
    DataSchemaMismatch(String),

    #[error("Schema is not compatible with Arrow data types")]
    IncompatibleSchema {
        table_name: String,
        message: String,
        hint: Option<String>,
    },

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

impl From<mysql::Error> for ConnectorError {
    fn from(e: mysql::Error) -> Self {
        ConnectorError::Execution(Box::new(e))
    }
}

impl From<mysql::FromValueError> for ConnectorError {
    fn from(e: mysql::FromValueError) -> Self {
        ConnectorError::DataSchemaMismatch(format!("unexpected value {:?}", e.0))
    }
}

#[derive(Error, Debug)]
pub enum TableCreateError {
    #[error("Table already exists")]
    TableExists,

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

#[derive(Error, Debug)]
pub enum TableDropError {
    #[error("Table does not exist")]
    TableNonexistent,

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
