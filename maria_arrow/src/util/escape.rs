//! Quoting of identifiers and sanitization of inlined SQL fragments.
//!
//! This is a narrow defense against accidental syntax breakage (a reserved word
//! used as a column name, a stray semicolon in a table name). It is not an
//! injection-proof boundary: identifiers are only stripped of the quote and
//! statement-terminator characters, without an allow-list. Values that can be
//! bound as statement parameters should be bound instead.

use std::fmt;

/// Identifier wrapped in backticks, with backticks and semicolons removed.
pub struct EscapedIdentBt<'a>(&'a str);

pub fn escaped_ident_bt(ident: &str) -> EscapedIdentBt<'_> {
    EscapedIdentBt(ident)
}

impl fmt::Display for EscapedIdentBt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("`")?;
        for c in self.0.chars().filter(|c| *c != '`' && *c != ';') {
            fmt::Write::write_char(f, c)?;
        }
        f.write_str("`")
    }
}

/// Remove statement terminators from a fragment that is inlined verbatim,
/// such as a column type.
pub fn strip_terminator(fragment: &str) -> String {
    fragment.replace(';', "")
}
