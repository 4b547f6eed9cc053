use crate::{Failure, Record, Result, Value};
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};

/// Field (or ordered fields) identifying a row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl Default for PrimaryKey {
    fn default() -> Self {
        PrimaryKey::Single("id".into())
    }
}

/// Input accepted when identifying a row.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// The key value itself, only meaningful for a single field key.
    Scalar(Value),
    /// A record carrying (at least) the key fields.
    Record(Record),
    /// Key values in the declaration order of the key fields.
    Positional(Vec<Value>),
}

impl PrimaryKey {
    pub fn fields(&self) -> &[String] {
        match self {
            PrimaryKey::Single(field) => std::slice::from_ref(field),
            PrimaryKey::Composite(fields) => fields,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, PrimaryKey::Composite(..))
    }

    /// Builds the mapping that identifies exactly one row.
    ///
    /// ```rust
    /// use tabula_core::{PrimaryKey, Value, record};
    /// let key = PrimaryKey::from(["tenant", "id"]);
    /// let resolved = key.resolve(record! { "id" => 3, "tenant" => "acme", "name" => "x" }).unwrap();
    /// assert_eq!(resolved.keys().collect::<Vec<_>>(), ["tenant", "id"]);
    /// ```
    pub fn resolve(&self, source: impl Into<KeySource>) -> Result<Record> {
        let source = source.into();
        match self {
            PrimaryKey::Single(field) => {
                let value = match source {
                    KeySource::Scalar(value) => Some(value),
                    KeySource::Record(mut record) => record.swap_remove(field),
                    KeySource::Positional(values) => values.into_iter().next(),
                }
                .filter(|v| !v.is_null())
                .ok_or_else(|| Failure::invalid_parameter("missing primary key"))?;
                Ok(Record::from_iter([(field.clone(), value)]))
            }
            PrimaryKey::Composite(fields) => match source {
                KeySource::Scalar(..) => Err(Failure::invalid_call(
                    "invalid input for composite primary key",
                )),
                KeySource::Record(mut record) => fields
                    .iter()
                    .map(|field| {
                        record
                            .swap_remove(field)
                            .filter(|v| !v.is_null())
                            .map(|v| (field.clone(), v))
                            .ok_or_else(|| missing_composite(field))
                    })
                    .collect(),
                KeySource::Positional(values) => {
                    let mut values = values.into_iter();
                    fields
                        .iter()
                        .map(|field| {
                            values
                                .next()
                                .filter(|v| !v.is_null())
                                .map(|v| (field.clone(), v))
                                .ok_or_else(|| missing_composite(field))
                        })
                        .collect()
                }
            },
        }
    }
}

fn missing_composite(field: &str) -> crate::Error {
    Failure::invalid_call(format!("missing '{field}' for composite primary key"))
}

impl Display for PrimaryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Single(field) => f.write_str(field),
            PrimaryKey::Composite(fields) => write!(f, "({})", fields.join(", ")),
        }
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        PrimaryKey::Single(value.into())
    }
}

impl From<String> for PrimaryKey {
    fn from(value: String) -> Self {
        PrimaryKey::Single(value)
    }
}

impl From<Vec<String>> for PrimaryKey {
    fn from(value: Vec<String>) -> Self {
        PrimaryKey::Composite(value)
    }
}

impl From<Vec<&str>> for PrimaryKey {
    fn from(value: Vec<&str>) -> Self {
        PrimaryKey::Composite(value.into_iter().map(Into::into).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PrimaryKey {
    fn from(value: [&str; N]) -> Self {
        PrimaryKey::Composite(value.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for KeySource {
    fn from(value: Value) -> Self {
        match value {
            Value::List(values) => KeySource::Positional(values),
            value => KeySource::Scalar(value),
        }
    }
}

impl From<Record> for KeySource {
    fn from(value: Record) -> Self {
        KeySource::Record(value)
    }
}

impl From<Vec<Value>> for KeySource {
    fn from(value: Vec<Value>) -> Self {
        KeySource::Positional(value)
    }
}

impl From<&str> for KeySource {
    fn from(value: &str) -> Self {
        KeySource::Scalar(value.into())
    }
}

macro_rules! impl_key_source_scalar {
    ($($source:ty),+ $(,)?) => {$(
        impl From<$source> for KeySource {
            fn from(value: $source) -> Self {
                KeySource::Scalar(value.into())
            }
        }
    )+};
}

impl_key_source_scalar!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    String,
    uuid::Uuid,
    rust_decimal::Decimal,
);
