use std::sync::Arc;

use arrow::datatypes::*;
use mysql::consts::{ColumnFlags, ColumnType};
use mysql::Column;

use crate::ConnectorError;

/// Character set number of binary strings.
const BINARY_CHARSET: u16 = 63;

pub fn get_result_schema(columns: &[Column]) -> Result<SchemaRef, ConnectorError> {
    let mut fields = Vec::with_capacity(columns.len());
    for column in columns {
        let is_unsigned = !(column.flags() & ColumnFlags::UNSIGNED_FLAG).is_empty();
        let is_not_null = !(column.flags() & ColumnFlags::NOT_NULL_FLAG).is_empty();
        let is_binary = column.character_set() == BINARY_CHARSET;

        let data_type = type_of_column(column.column_type(), is_unsigned, is_binary);
        fields.push(Field::new(column.name_str(), data_type, !is_not_null));
    }

    Ok(Arc::new(Schema::new(fields)))
}

fn type_of_column(col_ty: ColumnType, unsigned: bool, binary: bool) -> DataType {
    use ColumnType::*;

    match (col_ty, unsigned) {
        (MYSQL_TYPE_NULL, _) => DataType::Null,

        (MYSQL_TYPE_TINY, false) => DataType::Int8,
        (MYSQL_TYPE_TINY, true) => DataType::UInt8,
        (MYSQL_TYPE_SHORT, false) => DataType::Int16,
        (MYSQL_TYPE_SHORT, true) => DataType::UInt16,
        (MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG, false) => DataType::Int32,
        (MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG, true) => DataType::UInt32,
        (MYSQL_TYPE_LONGLONG, false) => DataType::Int64,
        (MYSQL_TYPE_LONGLONG, true) => DataType::UInt64,
        (MYSQL_TYPE_YEAR, _) => DataType::UInt16,

        (MYSQL_TYPE_FLOAT, _) => DataType::Float32,
        (MYSQL_TYPE_DOUBLE, _) => DataType::Float64,

        (
            MYSQL_TYPE_BIT | MYSQL_TYPE_GEOMETRY | MYSQL_TYPE_TINY_BLOB | MYSQL_TYPE_MEDIUM_BLOB
            | MYSQL_TYPE_LONG_BLOB | MYSQL_TYPE_BLOB | MYSQL_TYPE_VARCHAR | MYSQL_TYPE_VAR_STRING
            | MYSQL_TYPE_STRING,
            _,
        ) if binary => DataType::Binary,

        // decimals and temporal values are passed on in their textual form
        _ => DataType::Utf8,
    }
}

/// Arrow type of a column declared as `ty`, as reported by `DESCRIBE`.
pub fn type_db_into_arrow(ty: &str) -> Option<DataType> {
    let lowered = ty.to_lowercase();
    let ty = lowered.trim();
    let ty = ty.strip_suffix(" zerofill").unwrap_or(ty);
    let (ty, unsigned) = match ty.strip_suffix(" unsigned") {
        Some(ty) => (ty, true),
        None => (ty, false),
    };

    // strip size suffix and anything following it
    let ty = if let Some(open_parent) = ty.find('(') {
        &ty[0..open_parent]
    } else {
        ty
    };

    Some(match (ty.trim(), unsigned) {
        ("null", _) => DataType::Null,

        ("tinyint" | "bool" | "boolean", false) => DataType::Int8,
        ("smallint", false) => DataType::Int16,
        ("mediumint" | "integer" | "int", false) => DataType::Int32,
        ("bigint", false) => DataType::Int64,

        ("tinyint", true) => DataType::UInt8,
        ("smallint", true) => DataType::UInt16,
        ("mediumint" | "integer" | "int", true) => DataType::UInt32,
        ("bigint", true) => DataType::UInt64,
        ("year", _) => DataType::UInt16,

        ("real" | "float" | "float4", _) => DataType::Float32,
        ("double" | "float8", _) => DataType::Float64,

        (
            "bit" | "tinyblob" | "mediumblob" | "longblob" | "blob" | "binary" | "varbinary",
            _,
        ) => DataType::Binary,

        (
            "tinytext" | "mediumtext" | "longtext" | "text" | "varchar" | "char" | "json" | "enum"
            | "set" | "uuid" | "inet4" | "inet6",
            _,
        ) => DataType::Utf8,

        ("decimal" | "numeric" | "dec" | "fixed", _) => DataType::Utf8,

        ("date" | "datetime" | "timestamp" | "time", _) => DataType::Utf8,

        _ => return None,
    })
}

/// Column type used when creating a table for a field of type `ty`.
pub fn type_arrow_into_db(ty: &DataType) -> Option<String> {
    Some(
        match ty {
            DataType::Null => "tinyint",
            DataType::Boolean => "tinyint",
            DataType::Int8 => "tinyint",
            DataType::Int16 => "smallint",
            DataType::Int32 => "integer",
            DataType::Int64 => "bigint",
            DataType::UInt8 => "tinyint unsigned",
            DataType::UInt16 => "smallint unsigned",
            DataType::UInt32 => "integer unsigned",
            DataType::UInt64 => "bigint unsigned",
            DataType::Float32 => "float",
            DataType::Float64 => "double",

            DataType::Binary | DataType::LargeBinary => "longblob",

            DataType::Utf8 | DataType::LargeUtf8 => "longtext",

            _ => return None,
        }
        .to_string(),
    )
}

pub(super) fn create_field(
    table_name: &str,
    name: String,
    db_ty: &str,
    nullable: bool,
) -> Result<Field, ConnectorError> {
    let data_type =
        type_db_into_arrow(db_ty).ok_or_else(|| ConnectorError::IncompatibleSchema {
            table_name: table_name.to_string(),
            message: format!("column {name} has type {db_ty}, which has no Arrow counterpart"),
            hint: None,
        })?;

    Ok(Field::new(name, data_type, nullable))
}
