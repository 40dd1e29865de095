//! An in-memory data store that records what is done to it.
//!
//! It understands just the statements that the table operations produce.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use maria_arrow::api::{Append, Connection, Connector, SchemaEdit, SchemaGet, Statement};
use maria_arrow::credentials::{SecretSource, StaticSecret};
use maria_arrow::mysql::type_arrow_into_db;
use maria_arrow::util::ArrowReader;
use maria_arrow::{
    ConnectionConfig, ConnectorError, CredentialResolver, Session, TableCreateError,
    TableDropError,
};

#[derive(Default)]
pub struct FakeState {
    pub tables: BTreeMap<String, RecordBatch>,

    /// Declared types set by `ALTER TABLE ... MODIFY`, by table and column.
    pub declared_types: BTreeMap<(String, String), String>,

    /// Names the catalog lists without row statistics, like views.
    pub views: BTreeSet<String>,

    pub connect_attempts: usize,
    pub connects: usize,
    pub closes: usize,

    /// Texts passed to [Connection::execute].
    pub executed: Vec<String>,
    /// Texts passed to [Connection::query].
    pub queried: Vec<String>,

    pub fail_connect: bool,
    pub fail_execute: bool,
    pub fail_append: bool,
    pub fail_close: bool,
}

impl FakeState {
    /// Number of connections that were opened and not closed yet.
    pub fn open_connections(&self) -> usize {
        self.connects - self.closes
    }

    fn table(&self, name: &str) -> Result<&RecordBatch, ConnectorError> {
        self.tables
            .get(name)
            .ok_or_else(|| ConnectorError::Execution(format!("Table '{name}' doesn't exist").into()))
    }

    fn answer(&self, text: &str, params: &[String]) -> Result<RecordBatch, ConnectorError> {
        let idents = identifiers(text);

        if text.starts_with("SHOW COLUMNS FROM") {
            let table = self.table(idents[0])?;
            let field = text.contains("WHERE Field = ?").then(|| params[0].as_str());
            self.show_columns(idents[0], table, field)
        } else if text.starts_with("SELECT COUNT(*) FROM") {
            let table = self.table(idents[0])?;
            single_number("COUNT(*)", Some(table.num_rows() as i64))
        } else if text.starts_with("SELECT * FROM") {
            Ok(self.table(idents[0])?.clone())
        } else if text.contains("information_schema.TABLES") {
            if self.views.contains(&params[0]) {
                let field = Field::new("TABLE_ROWS", DataType::Int64, true);
                let schema = Arc::new(Schema::new(vec![field]));
                let rows = Int64Array::from(vec![None::<i64>]);
                return Ok(RecordBatch::try_new(schema, vec![Arc::new(rows)])?);
            }
            let rows = self.tables.get(&params[0]).map(|t| t.num_rows() as i64);
            single_number("TABLE_ROWS", rows)
        } else {
            Err(ConnectorError::Execution(
                format!("fake cannot answer {text}").into(),
            ))
        }
    }

    fn show_columns(
        &self,
        table_name: &str,
        table: &RecordBatch,
        only: Option<&str>,
    ) -> Result<RecordBatch, ConnectorError> {
        let schema = table.schema();
        let fields: Vec<_> = schema
            .fields()
            .iter()
            .filter(|f| only.map_or(true, |only| f.name() == only))
            .collect();

        let names: Vec<_> = fields.iter().map(|f| f.name().clone()).collect();
        let types: Vec<_> = fields
            .iter()
            .map(|f| {
                let key = (table_name.to_string(), f.name().clone());
                match self.declared_types.get(&key) {
                    Some(ty) => ty.clone(),
                    None => type_arrow_into_db(f.data_type()).unwrap_or_default(),
                }
            })
            .collect();
        let nulls: Vec<_> = fields
            .iter()
            .map(|f| if f.is_nullable() { "YES" } else { "NO" })
            .collect();
        let empty = vec![""; fields.len()];

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(types)),
            Arc::new(StringArray::from(nulls)),
            Arc::new(StringArray::from(empty.clone())),
            Arc::new(StringArray::from(vec![None::<&str>; fields.len()])),
            Arc::new(StringArray::from(empty)),
        ];
        Ok(RecordBatch::try_new(show_columns_schema(), columns)?)
    }

    fn execute(&mut self, text: &str) -> Result<u64, ConnectorError> {
        self.executed.push(text.to_string());
        if self.fail_execute {
            return Err(ConnectorError::Execution("statement rejected".into()));
        }

        if text.contains(" MODIFY ") {
            let idents = identifiers(text);
            let ty = text.rsplit('`').next().unwrap_or_default().trim();
            self.declared_types
                .insert((idents[0].to_string(), idents[1].to_string()), ty.to_string());
        }
        Ok(0)
    }
}

fn show_columns_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("Field", DataType::Utf8, false),
        Field::new("Type", DataType::Utf8, false),
        Field::new("Null", DataType::Utf8, false),
        Field::new("Key", DataType::Utf8, false),
        Field::new("Default", DataType::Utf8, true),
        Field::new("Extra", DataType::Utf8, false),
    ]))
}

fn single_number(name: &str, value: Option<i64>) -> Result<RecordBatch, ConnectorError> {
    let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Int64, true)]));
    let values: Vec<i64> = value.into_iter().collect();
    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(Int64Array::from(values))],
    )?)
}

/// Backtick-quoted identifiers of a statement, in order.
fn identifiers(text: &str) -> Vec<&str> {
    text.split('`').skip(1).step_by(2).collect()
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Rc<RefCell<FakeState>>,
}

impl FakeConnector {
    pub fn state(&self) -> Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FakeState> {
        self.state.borrow_mut()
    }
}

impl Connector for FakeConnector {
    type Conn = FakeConnection;

    fn connect(&self, config: &ConnectionConfig) -> Result<FakeConnection, ConnectorError> {
        let mut state = self.state.borrow_mut();
        state.connect_attempts += 1;
        assert!(config.password.is_some(), "connect without a password");

        if state.fail_connect {
            return Err(ConnectorError::Connection("connection refused".into()));
        }
        state.connects += 1;
        Ok(FakeConnection {
            state: self.state.clone(),
        })
    }
}

pub struct FakeConnection {
    state: Rc<RefCell<FakeState>>,
}

impl Connection for FakeConnection {
    type Stmt<'conn> = FakeStatement<'conn>
    where
        Self: 'conn;

    type Append<'conn> = FakeAppender<'conn>
    where
        Self: 'conn;

    fn query<'a>(&'a mut self, query: &str) -> Result<Self::Stmt<'a>, ConnectorError> {
        self.state.borrow_mut().queried.push(query.to_string());
        Ok(FakeStatement {
            conn: self,
            text: query.to_string(),
        })
    }

    fn execute(&mut self, statement: &str, _params: &[String]) -> Result<u64, ConnectorError> {
        self.state.borrow_mut().execute(statement)
    }

    fn append<'a>(&'a mut self, table_name: &str) -> Result<Self::Append<'a>, ConnectorError> {
        self.state.borrow().table(table_name)?;
        Ok(FakeAppender {
            conn: self,
            table: table_name.to_string(),
            pending: Vec::new(),
        })
    }

    fn close(self) -> Result<(), ConnectorError> {
        let mut state = self.state.borrow_mut();
        state.closes += 1;
        if state.fail_close {
            return Err(ConnectorError::Connection("connection reset".into()));
        }
        Ok(())
    }
}

impl SchemaGet for FakeConnection {
    fn table_list(&mut self) -> Result<Vec<String>, ConnectorError> {
        Ok(self.state.borrow().tables.keys().cloned().collect())
    }

    fn table_get(&mut self, name: &str) -> Result<SchemaRef, ConnectorError> {
        Ok(self.state.borrow().table(name)?.schema())
    }
}

impl SchemaEdit for FakeConnection {
    fn table_create(&mut self, name: &str, schema: SchemaRef) -> Result<(), TableCreateError> {
        let mut state = self.state.borrow_mut();
        if state.tables.contains_key(name) {
            return Err(TableCreateError::TableExists);
        }
        state
            .tables
            .insert(name.to_string(), RecordBatch::new_empty(schema));
        Ok(())
    }

    fn table_drop(&mut self, name: &str) -> Result<(), TableDropError> {
        match self.state.borrow_mut().tables.remove(name) {
            Some(_) => Ok(()),
            None => Err(TableDropError::TableNonexistent),
        }
    }
}

pub struct FakeStatement<'conn> {
    conn: &'conn mut FakeConnection,
    text: String,
}

impl<'conn> Statement<'conn> for FakeStatement<'conn> {
    type Reader<'stmt> = ArrowReader
    where
        Self: 'stmt;

    fn start(
        &mut self,
        params: &[String],
        row_limit: Option<usize>,
    ) -> Result<Self::Reader<'_>, ConnectorError> {
        let state = self.conn.state.borrow();
        let batch = state.answer(&self.text, params)?;

        let batch = match row_limit {
            Some(limit) => batch.slice(0, limit.min(batch.num_rows())),
            None => batch,
        };
        Ok(ArrowReader::new(batch.schema(), vec![batch]))
    }
}

/// Rows become visible only on [Append::finish], like a committed transaction.
pub struct FakeAppender<'conn> {
    conn: &'conn mut FakeConnection,
    table: String,
    pending: Vec<RecordBatch>,
}

impl<'conn> Append<'conn> for FakeAppender<'conn> {
    fn append(&mut self, batch: RecordBatch) -> Result<u64, ConnectorError> {
        if self.conn.state.borrow().fail_append {
            return Err(ConnectorError::Execution("Data too long for column".into()));
        }
        let rows = batch.num_rows() as u64;
        self.pending.push(batch);
        Ok(rows)
    }

    fn finish(self) -> Result<(), ConnectorError> {
        let mut state = self.conn.state.borrow_mut();
        let existing = state.table(&self.table)?.clone();

        let schema = existing.schema();
        let merged =
            arrow::compute::concat_batches(&schema, std::iter::once(&existing).chain(&self.pending))?;
        state.tables.insert(self.table, merged);
        Ok(())
    }
}

/// Configuration that passes validation.
pub fn config() -> ConnectionConfig {
    ConnectionConfig {
        username: "analyst".to_string(),
        host: "localhost".to_string(),
        dbname: "warehouse".to_string(),
        ..Default::default()
    }
}

/// A session over a fresh fake, with a password available.
pub fn session() -> (FakeConnector, Session<FakeConnector>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let connector = FakeConnector::default();
    let sources: Vec<Box<dyn SecretSource>> = vec![Box::new(StaticSecret("secret".to_string()))];
    let credentials = CredentialResolver::new(sources);
    let session = Session::new(connector.clone(), config()).with_credentials(credentials);
    (connector, session)
}
