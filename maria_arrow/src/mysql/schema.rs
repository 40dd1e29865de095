use std::sync::Arc;

use arrow::datatypes::{DataType, Schema, SchemaRef};
use mysql::prelude::Queryable;

use crate::api::{SchemaEdit, SchemaGet};
use crate::statement;
use crate::util::escape::escaped_ident_bt;
use crate::{ConnectorError, TableCreateError, TableDropError};

/// Server error codes
const ER_TABLE_EXISTS_ERROR: u16 = 1050;
const ER_BAD_TABLE_ERROR: u16 = 1051;

impl<Q: Queryable> SchemaGet for super::MySQLConnection<Q> {
    fn table_list(&mut self) -> Result<Vec<String>, ConnectorError> {
        let sql = statement::show_tables();
        log::debug!("query: {}", sql.text);

        let table_names = self.queryable.query_map(sql.text, |name: String| name)?;
        Ok(table_names)
    }

    fn table_get(&mut self, name: &str) -> Result<SchemaRef, ConnectorError> {
        let ddl = format!("DESCRIBE {}", escaped_ident_bt(name));
        log::debug!("query: {ddl}");

        // Field, Type, Null, Key, Default, Extra
        let columns: Vec<(String, String, String)> = self
            .queryable
            .query_map(ddl, |mut row: mysql::Row| {
                (
                    row.take::<String, _>(0).unwrap_or_default(),
                    row.take::<String, _>(1).unwrap_or_default(),
                    row.take::<String, _>(2).unwrap_or_default(),
                )
            })?;

        let fields = columns
            .into_iter()
            .map(|(field, ty, null)| super::types::create_field(name, field, &ty, null == "YES"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(Schema::new(fields)))
    }
}

impl<Q: Queryable> SchemaEdit for super::MySQLConnection<Q> {
    fn table_create(&mut self, name: &str, schema: SchemaRef) -> Result<(), TableCreateError> {
        let column_defs = schema
            .fields()
            .iter()
            .map(|field| {
                let ty = super::types::type_arrow_into_db(field.data_type()).ok_or_else(|| {
                    ConnectorError::IncompatibleSchema {
                        table_name: name.to_string(),
                        message: format!(
                            "cannot store arrow type {} of column {} in MariaDB",
                            field.data_type(),
                            field.name()
                        ),
                        hint: Some("cast the column before writing it".to_string()),
                    }
                })?;

                let is_nullable =
                    field.is_nullable() || matches!(field.data_type(), DataType::Null);
                let not_null = if is_nullable { "" } else { " NOT NULL" };

                let name = escaped_ident_bt(field.name());
                Ok(format!("{name} {ty}{not_null}"))
            })
            .collect::<Result<Vec<_>, ConnectorError>>()?
            .join(",");

        let ddl = format!("CREATE TABLE {} ({column_defs})", escaped_ident_bt(name));
        log::debug!("execute: {ddl}");

        let res = self.queryable.query_drop(&ddl);
        match res {
            Ok(_) => Ok(()),
            Err(mysql::Error::MySqlError(e)) if e.code == ER_TABLE_EXISTS_ERROR => {
                Err(TableCreateError::TableExists)
            }
            Err(e) => Err(TableCreateError::Connector(e.into())),
        }
    }

    fn table_drop(&mut self, name: &str) -> Result<(), TableDropError> {
        let sql = statement::drop_table(name, false);
        log::debug!("execute: {}", sql.text);

        let res = self.queryable.query_drop(&sql.text);
        match res {
            Ok(_) => Ok(()),
            Err(mysql::Error::MySqlError(e)) if e.code == ER_BAD_TABLE_ERROR => {
                Err(TableDropError::TableNonexistent)
            }
            Err(e) => Err(TableDropError::Connector(e.into())),
        }
    }
}
