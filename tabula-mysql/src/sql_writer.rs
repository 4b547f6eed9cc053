use tabula_core::SqlWriter;

/// MySQL dialect: backtick identifiers and backslash escapes in string literals.
#[derive(Default, Clone, Copy)]
pub struct MySQLSqlWriter {}

impl SqlWriter for MySQLSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    /// Every dot separated part is quoted on its own: `db.users` is `` `db`.`users` ``.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        for (i, part) in value.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('`');
            self.write_escaped(out, part, '`', "``");
            out.push('`');
        }
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        for c in value.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\x08' => out.push_str("\\b"),
                '\t' => out.push_str("\\t"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\x1a' => out.push_str("\\Z"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                c => out.push(c),
            }
        }
        out.push('\'');
    }
}
