//! SQL text for each table operation.
//!
//! Identifiers are quoted with [escaped_ident_bt] and column types are inlined
//! after [strip_terminator]. Values that are compared against (a column name in
//! `SHOW COLUMNS ... WHERE`, a table name in the catalog lookup) are passed as
//! bound parameters instead of being inlined.

use crate::util::escape::{escaped_ident_bt, strip_terminator};

/// A statement text with its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sql {
    pub text: String,
    pub params: Vec<String>,
}

impl Sql {
    pub fn new(text: impl Into<String>) -> Self {
        Sql {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

impl From<&str> for Sql {
    fn from(text: &str) -> Self {
        Sql::new(text)
    }
}

impl From<String> for Sql {
    fn from(text: String) -> Self {
        Sql::new(text)
    }
}

/// Options of the auto-increment key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOptions {
    /// Name of the new column.
    pub name: String,
    /// Make the column the primary key.
    pub primary: bool,
    /// Make the index over the column unique.
    pub unique: bool,
    /// Name of the index, `<name>_index` when not set.
    pub index_name: Option<String>,
}

impl Default for KeyOptions {
    fn default() -> Self {
        KeyOptions {
            name: "id".to_string(),
            primary: true,
            unique: false,
            index_name: None,
        }
    }
}

impl KeyOptions {
    pub fn named(name: impl Into<String>) -> Self {
        KeyOptions {
            name: name.into(),
            ..Default::default()
        }
    }
}

pub fn show_tables() -> Sql {
    Sql::new("SHOW TABLES")
}

pub fn show_columns(table: &str, field: Option<&str>) -> Sql {
    let mut sql = Sql::new(format!("SHOW COLUMNS FROM {}", escaped_ident_bt(table)));
    if let Some(field) = field {
        sql.text.push_str(" WHERE Field = ?");
        sql = sql.bind(field);
    }
    sql
}

pub fn add_column(table: &str, field: &str, field_type: &str) -> Sql {
    Sql::new(format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        escaped_ident_bt(table),
        escaped_ident_bt(field),
        strip_terminator(field_type)
    ))
}

pub fn modify_column(table: &str, field: &str, field_type: &str) -> Sql {
    Sql::new(format!(
        "ALTER TABLE {} MODIFY {} {}",
        escaped_ident_bt(table),
        escaped_ident_bt(field),
        strip_terminator(field_type)
    ))
}

pub fn drop_column(table: &str, field: &str) -> Sql {
    Sql::new(format!(
        "ALTER TABLE {} DROP COLUMN {}",
        escaped_ident_bt(table),
        escaped_ident_bt(field)
    ))
}

pub fn add_auto_increment_key(table: &str, key: &KeyOptions) -> Sql {
    let field = escaped_ident_bt(&key.name);
    let index_name = key
        .index_name
        .clone()
        .unwrap_or_else(|| format!("{}_index", key.name));

    let primary = if key.primary { " PRIMARY KEY" } else { "" };
    let unique = if key.unique { "UNIQUE " } else { "" };

    Sql::new(format!(
        "ALTER TABLE {} ADD {field} INT UNSIGNED NOT NULL AUTO_INCREMENT{primary}, ADD {unique}INDEX {} ({field})",
        escaped_ident_bt(table),
        escaped_ident_bt(&index_name),
    ))
}

/// Exact number of rows.
pub fn count_rows(table: &str) -> Sql {
    Sql::new(format!("SELECT COUNT(*) FROM {}", escaped_ident_bt(table)))
}

/// Row count as estimated by the storage engine statistics.
///
/// Cheap, but approximate for InnoDB tables.
pub fn catalog_row_estimate(table: &str) -> Sql {
    Sql::new(
        "SELECT TABLE_ROWS FROM information_schema.TABLES \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
    )
    .bind(table)
}

pub fn select_all(table: &str, limit: Option<usize>) -> Sql {
    let mut sql = Sql::new(format!("SELECT * FROM {}", escaped_ident_bt(table)));
    if let Some(limit) = limit {
        sql.text.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

pub fn drop_table(table: &str, if_exists: bool) -> Sql {
    let if_exists = if if_exists { "IF EXISTS " } else { "" };
    Sql::new(format!("DROP TABLE {if_exists}{}", escaped_ident_bt(table)))
}
