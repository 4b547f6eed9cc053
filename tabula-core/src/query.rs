use crate::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Insertion ordered field/value mapping used for data records and keyed conditions.
pub type Record = IndexMap<String, Value>;

/// Builds a [`Record`] preserving the declaration order of the fields.
///
/// ```rust
/// use tabula_core::{Value, record};
/// let user = record! { "id" => 7, "name" => "Ada" };
/// assert_eq!(user["name"], Value::Varchar("Ada".into()));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.insert(::std::string::String::from($field), $crate::Value::from($value));)+
        record
    }};
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Backend-specific last inserted identifier when available.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(names: RowNames, values: Row) -> Self {
        Self {
            labels: names,
            values,
        }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Converts the row into a record keyed by column label.
    pub fn into_record(self) -> Record {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.into_vec())
            .collect()
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// Outcome of one executed statement, as reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Rows produced by a query (possibly none).
    Rows(Vec<RowLabeled>),
    /// Effect of a modify statement.
    Affected(RowsAffected),
}

impl QueryResult {
    /// The produced rows, a modify outcome has none.
    pub fn into_rows(self) -> Vec<RowLabeled> {
        match self {
            QueryResult::Rows(rows) => rows,
            QueryResult::Affected(..) => Vec::new(),
        }
    }

    /// The modify outcome, a query reports zero affected rows.
    pub fn affected(&self) -> RowsAffected {
        match self {
            QueryResult::Rows(..) => RowsAffected::default(),
            QueryResult::Affected(affected) => *affected,
        }
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        QueryResult::Rows(Vec::new())
    }
}

impl From<Vec<RowLabeled>> for QueryResult {
    fn from(value: Vec<RowLabeled>) -> Self {
        QueryResult::Rows(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}
