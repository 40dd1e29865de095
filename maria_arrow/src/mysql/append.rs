use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use mysql::prelude::Queryable;
use mysql::Value;

use crate::api::Append;
use crate::util::escape::escaped_ident_bt;
use crate::util::transport::{self, Consume, ConsumeTy};
use crate::util::ArrayCellRef;
use crate::ConnectorError;

/// Inserts batches into a table, inside a single transaction.
pub struct MySQLAppender<'conn, Q: Queryable> {
    table: String,
    client: &'conn mut Q,
}

impl<'conn, Q: Queryable> MySQLAppender<'conn, Q> {
    pub fn new(client: &'conn mut Q, table_name: &str) -> Result<Self, ConnectorError> {
        client.query_drop("START TRANSACTION")?;
        Ok(Self {
            table: table_name.to_owned(),
            client,
        })
    }
}

impl<'conn, Q: Queryable> Append<'conn> for MySQLAppender<'conn, Q> {
    fn append(&mut self, batch: RecordBatch) -> Result<u64, ConnectorError> {
        // TODO: 30 is a guess, we need benchmarking to find the optimum value
        const BATCH_SIZE: usize = 30;

        let mut affected = 0;
        for chunk_start in (0..batch.num_rows()).step_by(BATCH_SIZE) {
            let rows_range = chunk_start..(chunk_start + BATCH_SIZE).min(batch.num_rows());

            let query = insert_query(&batch, &self.table, rows_range.len());
            let params: Vec<Value> = collect_args(&batch, rows_range)?;

            log::debug!("execute: {query}");
            affected += self.client.exec_iter(query, params)?.affected_rows();
        }

        Ok(affected)
    }

    fn finish(self) -> Result<(), ConnectorError> {
        self.client.query_drop("COMMIT")?;
        Ok(())
    }
}

fn insert_query(batch: &RecordBatch, table_name: &str, rows: usize) -> String {
    let schema = batch.schema();
    let columns = schema
        .fields()
        .iter()
        .map(|f| escaped_ident_bt(f.name()).to_string())
        .join(",");

    let values = (0..rows)
        .map(|_| {
            let row = (0..batch.num_columns()).map(|_| "?").join(",");
            format!("({row})")
        })
        .join(",");

    format!(
        "INSERT INTO {} ({columns}) VALUES {values}",
        escaped_ident_bt(table_name)
    )
}

fn collect_args(
    batch: &RecordBatch,
    rows_range: std::ops::Range<usize>,
) -> Result<Vec<Value>, ConnectorError> {
    let mut res = Vec::with_capacity(rows_range.len() * batch.num_columns());

    let schema = batch.schema();
    let mut row = ArrayCellRef::vec_from_batch(batch, &schema);

    for row_number in rows_range {
        for cell in &mut row {
            cell.row_number = row_number;
            transport::transport(cell.field, &*cell, &mut res)?;
        }
    }
    Ok(res)
}

impl Consume for Vec<Value> {}

macro_rules! impl_consume_ty {
    ($native: ty, $value_kind: expr) => {
        impl_consume_ty!($native, $value_kind, std::convert::identity);
    };

    ($native: ty, $value_kind: expr, $conversion: expr) => {
        impl ConsumeTy<$native> for Vec<Value> {
            fn consume(&mut self, value: $native) {
                let value: Value = $value_kind(($conversion)(value));
                self.push(value);
            }

            fn consume_opt(&mut self, value: Option<$native>) {
                match value {
                    Some(value) => self.consume(value),
                    None => self.push(Value::NULL),
                }
            }
        }
    };
}

impl_consume_ty!(bool, Value::Int, i64::from);
impl_consume_ty!(i8, Value::Int, i64::from);
impl_consume_ty!(i16, Value::Int, i64::from);
impl_consume_ty!(i32, Value::Int, i64::from);
impl_consume_ty!(i64, Value::Int);
impl_consume_ty!(u8, Value::UInt, u64::from);
impl_consume_ty!(u16, Value::UInt, u64::from);
impl_consume_ty!(u32, Value::UInt, u64::from);
impl_consume_ty!(u64, Value::UInt);
impl_consume_ty!(f32, Value::Float);
impl_consume_ty!(f64, Value::Double);
impl_consume_ty!(String, Value::Bytes, String::into_bytes);
impl_consume_ty!(Vec<u8>, Value::Bytes);

impl ConsumeTy<()> for Vec<Value> {
    fn consume(&mut self, _value: ()) {
        self.push(Value::NULL);
    }

    fn consume_opt(&mut self, _value: Option<()>) {
        self.push(Value::NULL);
    }
}
