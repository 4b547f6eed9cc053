use crate::{Failure, PrimaryKey, Record, Result, SqlWriter, Value};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Comparison operators accepted inside a condition clause.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    #[default]
    Equal,
    NotEqual,
    LessGreater,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NullSafeEqual,
    Like,
    NotLike,
    In,
    NotIn,
    Is,
    IsNot,
    Regexp,
    NotRegexp,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessGreater => "<>",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::NullSafeEqual => "<=>",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Regexp => "REGEXP",
            Operator::NotRegexp => "NOT REGEXP",
        }
    }
}

impl FromStr for Operator {
    type Err = crate::Error;

    /// Case insensitive, inner whitespace is collapsed (`not  like` is `NOT LIKE`).
    fn from_str(value: &str) -> Result<Self> {
        let normalized = value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        Ok(match normalized.as_str() {
            "=" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<>" => Operator::LessGreater,
            "<" => Operator::Less,
            "<=" => Operator::LessEqual,
            ">" => Operator::Greater,
            ">=" => Operator::GreaterEqual,
            "<=>" => Operator::NullSafeEqual,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "IS" => Operator::Is,
            "IS NOT" => Operator::IsNot,
            "REGEXP" => Operator::Regexp,
            "NOT REGEXP" => Operator::NotRegexp,
            _ => {
                return Err(Failure::invalid_parameter(format!(
                    "unsupported operator `{value}` in condition"
                )));
            }
        })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Joins a clause to the ones before it, ignored on the first clause.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = crate::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Conjunction::And),
            "OR" => Ok(Conjunction::Or),
            _ => Err(Failure::invalid_parameter(format!(
                "unsupported conjunction `{value}` in condition"
            ))),
        }
    }
}

/// Right hand side of a clause: plain equality or an explicit operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Value),
    Compare {
        operator: Operator,
        value: Value,
        conjunction: Conjunction,
    },
}

impl Predicate {
    /// Parses the operator, `like`, `Like` and `LIKE` are the same.
    pub fn new(operator: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Predicate::Compare {
            operator: operator.parse()?,
            value: value.into(),
            conjunction: Conjunction::And,
        })
    }

    pub fn like(value: impl Into<Value>) -> Self {
        Predicate::Compare {
            operator: Operator::Like,
            value: value.into(),
            conjunction: Conjunction::And,
        }
    }

    pub fn with_conjunction(self, conjunction: Conjunction) -> Self {
        let (operator, value, _) = self.into_parts();
        Predicate::Compare {
            operator,
            value,
            conjunction,
        }
    }

    /// Joins this clause to the previous one with `OR`.
    pub fn or(self) -> Self {
        self.with_conjunction(Conjunction::Or)
    }

    pub fn operator(&self) -> Operator {
        match self {
            Predicate::Equals(..) => Operator::Equal,
            Predicate::Compare { operator, .. } => *operator,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Predicate::Equals(value) | Predicate::Compare { value, .. } => value,
        }
    }

    pub fn conjunction(&self) -> Conjunction {
        match self {
            Predicate::Equals(..) => Conjunction::And,
            Predicate::Compare { conjunction, .. } => *conjunction,
        }
    }

    fn into_parts(self) -> (Operator, Value, Conjunction) {
        match self {
            Predicate::Equals(value) => (Operator::Equal, value, Conjunction::And),
            Predicate::Compare {
                operator,
                value,
                conjunction,
            } => (operator, value, conjunction),
        }
    }
}

/// Decodes a dynamic `[operator, value, conjunction?]` tuple.
impl TryFrom<Vec<Value>> for Predicate {
    type Error = crate::Error;

    fn try_from(parts: Vec<Value>) -> Result<Self> {
        if parts.len() < 2 {
            return Err(Failure::invalid_parameter(
                "not enough parameters for condition",
            ));
        }
        if parts.len() > 3 {
            return Err(Failure::invalid_parameter(
                "too many parameters for condition",
            ));
        }
        let mut parts = parts.into_iter();
        let operator = match parts.next() {
            Some(Value::Null) => Operator::Equal,
            Some(Value::Varchar(v)) if v.trim().is_empty() => Operator::Equal,
            Some(Value::Varchar(v)) => v.parse()?,
            v => {
                return Err(Failure::invalid_parameter(format!(
                    "the operator of a condition must be a string, found {v:?}"
                )));
            }
        };
        let value = parts.next().unwrap_or_default();
        let conjunction = match parts.next() {
            None | Some(Value::Null) => Conjunction::And,
            Some(Value::Varchar(v)) if v.trim().is_empty() => Conjunction::And,
            Some(Value::Varchar(v)) => v.parse()?,
            Some(v) => {
                return Err(Failure::invalid_parameter(format!(
                    "the conjunction of a condition must be a string, found {v:?}"
                )));
            }
        };
        Ok(Predicate::Compare {
            operator,
            value,
            conjunction,
        })
    }
}

/// Row filter, compiled into a `WHERE` clause.
///
/// `Condition::None` (as well as an empty mapping or list) compiles to nothing at all:
/// it matches every row.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Condition {
    #[default]
    None,
    /// Equality on the (single) primary key.
    Key(Value),
    /// Literal SQL written after `WHERE` without any escaping. A string shaped like a
    /// key (no whitespace, none of `= < > "`) is treated as [`Condition::Key`].
    Raw(String),
    Keyed(IndexMap<String, Predicate>),
    List(Vec<(String, Predicate)>),
}

impl Condition {
    pub fn key(value: impl Into<Value>) -> Self {
        Condition::Key(value.into())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    /// Appends a clause keeping the declaration order. A key or raw condition cannot
    /// be extended, the clause replaces it.
    pub fn and(self, field: impl Into<String>, predicate: impl Into<Predicate>) -> Self {
        let mut items = match self {
            Condition::Keyed(map) => map.into_iter().collect(),
            Condition::List(items) => items,
            Condition::None => Vec::new(),
            other => {
                log::warn!("Condition {other:?} is replaced by a clause list");
                Vec::new()
            }
        };
        items.push((field.into(), predicate.into()));
        Condition::List(items)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Condition::None => true,
            Condition::Key(..) => false,
            Condition::Raw(v) => v.is_empty(),
            Condition::Keyed(v) => v.is_empty(),
            Condition::List(v) => v.is_empty(),
        }
    }

    /// Writes ` WHERE ...` into `out`, or nothing when the condition matches every row.
    pub fn write_query(
        &self,
        writer: &dyn SqlWriter,
        out: &mut String,
        primary_key: &PrimaryKey,
    ) -> Result<()> {
        match self {
            Condition::None => {}
            Condition::Key(value) => {
                let field = key_field(primary_key)?;
                write_clauses(writer, out, [(field, &Predicate::Equals(value.clone()))]);
            }
            Condition::Raw(sql) if sql.is_empty() => {}
            Condition::Raw(sql) if is_key_shaped(sql) => {
                let field = key_field(primary_key)?;
                let predicate = Predicate::Equals(Value::Varchar(sql.clone()));
                write_clauses(writer, out, [(field, &predicate)]);
            }
            Condition::Raw(sql) => {
                out.push_str(" WHERE ");
                out.push_str(sql);
            }
            Condition::Keyed(map) => {
                write_clauses(writer, out, map.iter().map(|(k, v)| (k.as_str(), v)));
            }
            Condition::List(items) => {
                write_clauses(writer, out, items.iter().map(|(k, v)| (k.as_str(), v)));
            }
        }
        Ok(())
    }

    pub fn compile(&self, writer: &dyn SqlWriter, primary_key: &PrimaryKey) -> Result<String> {
        let mut out = String::with_capacity(64);
        self.write_query(writer, &mut out, primary_key)?;
        Ok(out)
    }

    /// The field/value pairs the condition mentions, raw fragments contribute nothing.
    pub fn filter_record(&self, primary_key: &PrimaryKey) -> Record {
        match self {
            Condition::Key(value) => match primary_key {
                PrimaryKey::Single(field) => [(field.clone(), value.clone())].into_iter().collect(),
                PrimaryKey::Composite(..) => Record::new(),
            },
            Condition::Raw(sql) if is_key_shaped(sql) => match primary_key {
                PrimaryKey::Single(field) => [(field.clone(), Value::Varchar(sql.clone()))]
                    .into_iter()
                    .collect(),
                PrimaryKey::Composite(..) => Record::new(),
            },
            Condition::Keyed(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.value().clone()))
                .collect(),
            Condition::List(items) => items
                .iter()
                .map(|(k, v)| (k.clone(), v.value().clone()))
                .collect(),
            Condition::None | Condition::Raw(..) => Record::new(),
        }
    }
}

fn key_field(primary_key: &PrimaryKey) -> Result<&str> {
    match primary_key {
        PrimaryKey::Single(field) => Ok(field),
        PrimaryKey::Composite(..) => Err(Failure::invalid_call(
            "invalid input for composite primary key",
        )),
    }
}

/// No whitespace and none of `= < > "`.
pub fn is_key_shaped(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '=' | '<' | '>' | '"'))
}

fn write_clauses<'a>(
    writer: &dyn SqlWriter,
    out: &mut String,
    clauses: impl IntoIterator<Item = (&'a str, &'a Predicate)>,
) {
    let mut first = true;
    for (field, predicate) in clauses {
        if first {
            out.push_str(" WHERE ");
            first = false;
        } else {
            out.push(' ');
            out.push_str(predicate.conjunction().as_str());
            out.push(' ');
        }
        let operator = predicate.operator();
        out.push('(');
        writer.write_identifier_quoted(out, field);
        out.push(' ');
        out.push_str(operator.as_str());
        out.push(' ');
        match predicate.value() {
            Value::Varchar(v)
                if matches!(operator, Operator::Like | Operator::NotLike)
                    && !v.contains(['%', '?']) =>
            {
                writer.write_value_string(out, &format!("%{v}%"));
            }
            value => writer.write_value(out, value),
        }
        out.push(')');
    }
}

macro_rules! impl_from_scalar {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for Predicate {
            fn from(value: $source) -> Self {
                Predicate::Equals(value.into())
            }
        }
        impl From<$source> for Condition {
            fn from(value: $source) -> Self {
                Condition::Key(value.into())
            }
        }
    )+};
}

impl_from_scalar!(
    i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, Decimal, Date, Time,
    PrimitiveDateTime, Uuid,
);

impl From<Value> for Predicate {
    fn from(value: Value) -> Self {
        Predicate::Equals(value)
    }
}

impl From<&str> for Predicate {
    fn from(value: &str) -> Self {
        Predicate::Equals(value.into())
    }
}

impl From<String> for Predicate {
    fn from(value: String) -> Self {
        Predicate::Equals(value.into())
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::Key(value)
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Raw(value.into())
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Raw(value)
    }
}

impl From<Record> for Condition {
    fn from(value: Record) -> Self {
        Condition::Keyed(
            value
                .into_iter()
                .map(|(k, v)| (k, Predicate::Equals(v)))
                .collect(),
        )
    }
}

impl From<IndexMap<String, Predicate>> for Condition {
    fn from(value: IndexMap<String, Predicate>) -> Self {
        Condition::Keyed(value)
    }
}

impl<K: Into<String>, P: Into<Predicate>> From<Vec<(K, P)>> for Condition {
    fn from(value: Vec<(K, P)>) -> Self {
        Condition::List(
            value
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
        )
    }
}

impl<T: Into<Condition>> From<Option<T>> for Condition {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<()> for Condition {
    fn from(_: ()) -> Self {
        Condition::None
    }
}
