use crate::{Condition, Options, PrimaryKey, Record, Result, Value, separated_by};
use std::fmt::Write;
use time::{Date, PrimitiveDateTime, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Dialect printer: identifier quoting, value escaping and the statements the table
/// gateway emits.
///
/// Every method has a portable default, drivers override what their dialect spells
/// differently (identifier quotes, string escapes).
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Copies `value` into `out` replacing every `search` char with `replace`.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', r#""""#);
        out.push('"');
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => self.write_value_none(out),
            Value::Boolean(v) => self.write_value_bool(out, *v),
            Value::Int64(v) => write_integer!(out, *v),
            Value::UInt64(v) => write_integer!(out, *v),
            Value::Float64(v) => self.write_value_float(out, *v),
            Value::Decimal(v) => drop(write!(out, "{}", v)),
            Value::Varchar(v) => self.write_value_string(out, v),
            Value::Blob(v) => self.write_value_blob(out, v),
            Value::Date(v) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Time(v) => {
                out.push('\'');
                self.write_value_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(v) => {
                out.push('\'');
                self.write_value_timestamp(out, v);
                out.push('\'');
            }
            Value::Uuid(v) => drop(write!(out, "'{}'", v)),
            Value::List(v) => self.write_value_list(out, v),
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_float(&self, out: &mut String, value: f64) {
        if value.is_finite() {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format(value));
        } else {
            log::warn!("Non finite float {value} is written as NULL");
            self.write_value_none(out);
        }
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob as a hexadecimal literal.
    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second(),
        );
        let mut subsecond = value.microsecond();
        if subsecond != 0 {
            let mut width = 6;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    fn write_value_timestamp(&self, out: &mut String, value: &PrimitiveDateTime) {
        self.write_value_date(out, &value.date());
        out.push(' ');
        self.write_value_time(out, &value.time());
    }

    /// Parenthesized, comma separated list of values.
    fn write_value_list(&self, out: &mut String, value: &[Value]) {
        out.push('(');
        separated_by(out, value, |out, v| self.write_value(out, v), ", ");
        out.push(')');
    }

    /// `field = value` pairs separated by comma, as used by `SET`.
    fn write_assignments(&self, out: &mut String, fields: &Record) {
        separated_by(
            out,
            fields,
            |out, (name, value)| {
                self.write_identifier_quoted(out, name);
                out.push_str(" = ");
                self.write_value(out, value);
            },
            ", ",
        );
    }

    /// Substitutes the placeholders of `template`: `??` takes the next value as an
    /// identifier, `?` as an escaped value. Placeholders without a value are kept as is.
    fn write_template(&self, out: &mut String, template: &str, values: &[Value]) {
        let mut values = values.iter();
        let mut rest = template;
        while let Some(position) = rest.find('?') {
            out.push_str(&rest[..position]);
            rest = &rest[position..];
            let identifier = rest.starts_with("??");
            let placeholder = if identifier { 2 } else { 1 };
            match values.next() {
                Some(value) if identifier => self.write_template_identifier(out, value),
                Some(value) => self.write_value(out, value),
                None => out.push_str(&rest[..placeholder]),
            }
            rest = &rest[placeholder..];
        }
        out.push_str(rest);
    }

    fn write_template_identifier(&self, out: &mut String, value: &Value) {
        match value {
            Value::Varchar(v) => self.write_identifier_quoted(out, v),
            Value::List(v) => separated_by(
                out,
                v,
                |out, v| self.write_template_identifier(out, v),
                ", ",
            ),
            v => self.write_identifier_quoted(out, &v.to_string()),
        }
    }

    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("START TRANSACTION");
    }

    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
    }

    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
    }

    fn write_select(
        &self,
        out: &mut String,
        table: &str,
        primary_key: &PrimaryKey,
        condition: &Condition,
        options: &Options,
    ) -> Result<()> {
        out.push_str("SELECT * FROM ");
        self.write_identifier_quoted(out, table);
        condition.write_query(self.as_dyn(), out, primary_key)?;
        options.write_query(out);
        Ok(())
    }

    fn write_insert(&self, out: &mut String, table: &str, fields: &Record) {
        out.push_str("INSERT INTO ");
        self.write_identifier_quoted(out, table);
        out.push_str(" SET ");
        self.write_assignments(out, fields);
    }

    fn write_update(
        &self,
        out: &mut String,
        table: &str,
        fields: &Record,
        primary_key: &PrimaryKey,
        condition: &Condition,
    ) -> Result<()> {
        out.push_str("UPDATE ");
        self.write_identifier_quoted(out, table);
        out.push_str(" SET ");
        self.write_assignments(out, fields);
        condition.write_query(self.as_dyn(), out, primary_key)
    }

    /// An empty condition produces no `WHERE`: the statement removes every row.
    fn write_delete(
        &self,
        out: &mut String,
        table: &str,
        primary_key: &PrimaryKey,
        condition: &Condition,
    ) -> Result<()> {
        out.push_str("DELETE FROM ");
        self.write_identifier_quoted(out, table);
        condition.write_query(self.as_dyn(), out, primary_key)
    }
}

#[derive(Default, Clone, Copy)]
pub struct GenericSqlWriter;
impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}
impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
