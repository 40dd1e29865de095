//! Table-level convenience operations on a MariaDB database, with data exchanged
//! as Apache Arrow record batches.
//!
//! A [Session] holds the connection configuration. Each of its operations opens a
//! connection, performs a single statement or query and closes the connection
//! again, on error paths as well.
//!
//! Capabilities:
//! - **Configuration**: read connection parameters from a YAML file, see [config].
//! - **Credentials**: resolve a missing password from the environment or a prompt, see [credentials].
//! - **Query**: run statements and fetch query results as a [arrow::record_batch::RecordBatch].
//! - **Schema Introspection**: list tables, their columns and declared types.
//! - **Schema Migration**: add, retype and drop columns; add an auto-increment key.
//! - **Write**: create tables from record batches, append to them and drop them.
//!
//! ```no_run
//! use maria_arrow::{config, KeyOptions, MySQLConnector, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let path = config::default_config_path();
//! let mut session = Session::from_config_file(MySQLConnector::new(), &path)?;
//!
//! for table in session.list_tables()? {
//!     println!("{table}: {:?}", session.table_shape(&table)?);
//! }
//!
//! session.add_auto_increment_key("t1", &KeyOptions::default())?;
//! let first_rows = session.fetch_table("t1", Some(6))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Transitive dependency on arrow
//!
//! If you depend on `maria_arrow`, it is recommended not to depend on `arrow`
//! directly, but use re-export from this crate instead:
//!
//! ```
//! use maria_arrow::arrow;
//! ```
//!
//! If you do depend on `arrow` directly, you have to make sure to use exactly the
//! same version as is used by `maria_arrow`, otherwise types from `arrow` and
//! `maria_arrow` will not be interchangeable and might lead to type errors.

pub mod api;
pub mod config;
pub mod credentials;
mod errors;
pub mod mysql;
mod session;
pub mod statement;
mod table;
pub mod util;

pub use arrow;
pub use errors::*;

pub use config::{ConnectionConfig, SslMode};
pub use credentials::CredentialResolver;
pub use mysql::MySQLConnector;
pub use session::{fetch, ConnectionGuard, Session};
pub use statement::{KeyOptions, Sql};
pub use table::{RowCount, TableShape, WriteMode, TABLE_NAME_COLUMN};
