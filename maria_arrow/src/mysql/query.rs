use mysql::prelude::*;
use mysql::{Params, Row, Value};

use crate::api::Statement;
use crate::util::transport::{Produce, ProduceTy};
use crate::util::{self, ArrowReader};
use crate::ConnectorError;

pub struct MySQLStatement<'conn, Q: Queryable> {
    pub(super) stmt: mysql::Statement,
    pub(super) queryable: &'conn mut Q,
}

pub(super) fn positional_params(params: &[String]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(
            params
                .iter()
                .map(|p| Value::Bytes(p.as_bytes().to_vec()))
                .collect(),
        )
    }
}

impl<'conn, Q: Queryable> Statement<'conn> for MySQLStatement<'conn, Q> {
    type Reader<'stmt> = ArrowReader
    where
        Self: 'stmt;

    fn start(
        &mut self,
        params: &[String],
        row_limit: Option<usize>,
    ) -> Result<Self::Reader<'_>, ConnectorError> {
        let mut query_result = self
            .queryable
            .exec_iter(&self.stmt, positional_params(params))?;

        // read the rows into a buffer, stopping at the limit
        let (schema, rows) = {
            let result_set = query_result.iter().ok_or(ConnectorError::NoResultSets)?;
            let schema = super::types::get_result_schema(result_set.columns().as_ref())?;

            let limit = row_limit.unwrap_or(usize::MAX);
            let rows = result_set.take(limit).collect::<Result<Vec<Row>, _>>()?;
            (schema, rows)
        };
        // dropping the result reads and discards rows past the limit
        drop(query_result);

        let row_count = rows.len();
        let mut reader = MySQLRowsReader {
            rows: rows.into_iter(),
        };
        let batches = util::collect_rows_to_arrow(schema.clone(), &mut reader, row_count)?;

        Ok(ArrowReader::new(schema, batches))
    }
}

struct MySQLRowsReader {
    rows: std::vec::IntoIter<Row>,
}

impl<'s> util::RowsReader<'s> for MySQLRowsReader {
    type CellReader<'row> = MySQLCellReader
    where
        Self: 'row;

    fn next_row(&mut self) -> Result<Option<Self::CellReader<'_>>, ConnectorError> {
        Ok(self.rows.next().map(|row| MySQLCellReader { row, cell: 0 }))
    }
}

struct MySQLCellReader {
    row: Row,
    cell: usize,
}

impl<'a> util::CellReader<'a> for MySQLCellReader {
    type CellRef<'cell> = MySQLCellRef<'cell>
    where
        Self: 'cell;

    fn next_cell(&mut self) -> Option<Self::CellRef<'_>> {
        if self.cell >= self.row.len() {
            return None;
        }
        let r = MySQLCellRef {
            row: &mut self.row,
            cell: self.cell,
        };
        self.cell += 1;
        Some(r)
    }
}

#[derive(Debug)]
struct MySQLCellRef<'a> {
    row: &'a mut Row,
    cell: usize,
}

impl<'r> MySQLCellRef<'r> {
    fn take_value(self) -> Value {
        self.row.take(self.cell).unwrap_or(Value::NULL)
    }
}

impl<'r> Produce<'r> for MySQLCellRef<'r> {}

macro_rules! impl_produce_ty {
    ($p: ty, ($($t: ty,)+)) => {
        $(
            impl<'r> ProduceTy<'r, $t> for $p {
                fn produce(self) -> Result<$t, ConnectorError> {
                    let value = self.take_value();
                    if value == Value::NULL {
                        return Err(ConnectorError::DataSchemaMismatch(
                            "NULL in a NOT NULL column".to_string(),
                        ));
                    }
                    Ok(mysql::from_value_opt::<$t>(value)?)
                }
                fn produce_opt(self) -> Result<Option<$t>, ConnectorError> {
                    Ok(mysql::from_value_opt::<Option<$t>>(self.take_value())?)
                }
            }
        )+
    };
}

impl_produce_ty!(
    MySQLCellRef<'r>,
    (
        bool,
        i8,
        i16,
        i32,
        i64,
        u8,
        u16,
        u32,
        u64,
        f32,
        f64,
        Vec<u8>,
    )
);

// Strings are produced from the textual form of any value, because temporal
// and decimal columns are exposed as strings.
impl<'r> ProduceTy<'r, String> for MySQLCellRef<'r> {
    fn produce(self) -> Result<String, ConnectorError> {
        ProduceTy::<String>::produce_opt(self)?.ok_or_else(|| {
            ConnectorError::DataSchemaMismatch("NULL in a NOT NULL column".to_string())
        })
    }

    fn produce_opt(self) -> Result<Option<String>, ConnectorError> {
        Ok(value_to_string(self.take_value()))
    }
}

fn value_to_string(value: Value) -> Option<String> {
    Some(match value {
        Value::NULL => return None,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        },
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Date(year, month, day, 0, 0, 0, 0) => format!("{year:04}-{month:02}-{day:02}"),
        Value::Date(year, month, day, hour, minute, second, 0) => {
            format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
        }
        Value::Date(year, month, day, hour, minute, second, micros) => format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
        ),
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if negative { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            if micros == 0 {
                format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
            } else {
                format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
            }
        }
    })
}
