//! MariaDB (and MySQL) implementation of [crate::api], on top of the `mysql` crate.

mod append;
mod query;
mod schema;
mod types;

pub use types::{type_arrow_into_db, type_db_into_arrow};

use mysql::prelude::*;
use mysql::{ClientIdentity, OptsBuilder, SslOpts};

use crate::api::{Connection, Connector};
use crate::config::{ConnectionConfig, SslMode};
use crate::ConnectorError;

/// Opens [mysql::Conn]s from a [ConnectionConfig].
#[derive(Debug, Clone, Default)]
pub struct MySQLConnector {
    /// Extra driver options applied on top of the configuration, such as timeouts.
    pub customize: Option<fn(OptsBuilder) -> OptsBuilder>,
}

impl MySQLConnector {
    pub fn new() -> Self {
        MySQLConnector::default()
    }

    /// Driver options for a validated configuration.
    pub fn opts(&self, config: &ConnectionConfig) -> OptsBuilder {
        let host = if config.host.is_empty() {
            None
        } else {
            Some(config.host.clone())
        };
        let db_name = if config.dbname.is_empty() {
            None
        } else {
            Some(config.dbname.clone())
        };

        let opts = OptsBuilder::new()
            .ip_or_hostname(host)
            .tcp_port(config.port())
            .user(Some(config.username.clone()))
            .pass(config.password.clone())
            .db_name(db_name)
            .ssl_opts(ssl_opts(config));

        match self.customize {
            Some(customize) => customize(opts),
            None => opts,
        }
    }
}

fn ssl_opts(config: &ConnectionConfig) -> Option<SslOpts> {
    let mode = match (config.sslmode, &config.sslca) {
        (SslMode::Disabled, _) | (SslMode::Preferred, None) => return None,
        (SslMode::Preferred, Some(_)) => SslMode::VerifyCa,
        (mode, _) => mode,
    };

    let identity = match (&config.sslcert, &config.sslkey) {
        (Some(cert), Some(key)) => Some(ClientIdentity::new(cert.clone(), key.clone())),
        _ => None,
    };

    let opts = SslOpts::default()
        .with_root_cert_path(config.sslca.clone())
        .with_client_identity(identity);

    Some(match mode {
        SslMode::Required => opts
            .with_danger_accept_invalid_certs(true)
            .with_danger_skip_domain_validation(true),
        SslMode::VerifyCa => opts.with_danger_skip_domain_validation(true),
        _ => opts,
    })
}

impl Connector for MySQLConnector {
    type Conn = MySQLConnection<mysql::Conn>;

    fn connect(&self, config: &ConnectionConfig) -> Result<Self::Conn, ConnectorError> {
        log::debug!(
            "connecting to {}@{}:{}/{}",
            config.username,
            config.host,
            config.port(),
            config.dbname
        );

        let conn = mysql::Conn::new(self.opts(config))
            .map_err(|e| ConnectorError::Connection(Box::new(e)))?;
        Ok(MySQLConnection::new(conn))
    }
}

pub struct MySQLConnection<Q: Queryable> {
    queryable: Q,
}

impl<Q: Queryable> MySQLConnection<Q> {
    pub fn new(conn: Q) -> Self {
        MySQLConnection { queryable: conn }
    }
}

impl<Q: Queryable> Connection for MySQLConnection<Q> {
    type Stmt<'conn> = query::MySQLStatement<'conn, Q> where Self: 'conn;

    type Append<'conn> = append::MySQLAppender<'conn, Q> where Self: 'conn;

    fn query<'a>(&'a mut self, query: &str) -> Result<Self::Stmt<'a>, ConnectorError> {
        log::debug!("prepare: {query}");

        let stmt = self.queryable.prep(query)?;
        Ok(query::MySQLStatement {
            queryable: &mut self.queryable,
            stmt,
        })
    }

    fn execute(&mut self, statement: &str, params: &[String]) -> Result<u64, ConnectorError> {
        log::debug!("execute: {statement}");

        let affected = if params.is_empty() {
            self.queryable.query_iter(statement)?.affected_rows()
        } else {
            let params = query::positional_params(params);
            self.queryable.exec_iter(statement, params)?.affected_rows()
        };
        Ok(affected)
    }

    fn append<'a>(&'a mut self, table_name: &str) -> Result<Self::Append<'a>, ConnectorError> {
        append::MySQLAppender::new(&mut self.queryable, table_name)
    }

    fn close(self) -> Result<(), ConnectorError> {
        // the driver sends COM_QUIT when the connection is dropped
        drop(self.queryable);
        Ok(())
    }
}
