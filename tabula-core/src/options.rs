use regex::Regex;
use std::sync::LazyLock;

static LIMIT_KEYWORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLIMIT\b").unwrap());

/// Ordering and pagination appended after the condition.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub enum Options {
    #[default]
    None,
    /// Literal SQL written after the condition, a leading space is added when missing.
    Raw(String),
    Clauses(Clauses),
}

/// Structured `ORDER BY` / `LIMIT` description.
///
/// `pair` (offset and count) wins over `start` and `limit` when both are present.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Clauses {
    pub order_by: Option<String>,
    pub pair: Option<(u64, u64)>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

impl Clauses {
    pub fn new() -> Self {
        Default::default()
    }

    /// Raw ordering expression, for example `name DESC`.
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// `LIMIT offset, count`.
    pub fn limit(mut self, offset: u64, count: u64) -> Self {
        self.pair = Some((offset, count));
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn count(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn write_query(&self, out: &mut String) {
        if let Some(order_by) = &self.order_by {
            out.push_str(" ORDER BY ");
            out.push_str(order_by);
        }
        let mut buffer = itoa::Buffer::new();
        match (self.pair, self.start, self.limit) {
            (Some((offset, count)), ..) => {
                out.push_str(" LIMIT ");
                out.push_str(buffer.format(offset));
                out.push_str(", ");
                out.push_str(buffer.format(count));
            }
            (None, None, None) => {}
            (None, start, limit) => {
                out.push_str(" LIMIT ");
                if let Some(start) = start {
                    out.push_str(buffer.format(start));
                    if limit.is_some() {
                        out.push_str(", ");
                    }
                }
                if let Some(limit) = limit {
                    out.push_str(buffer.format(limit));
                }
            }
        }
    }
}

impl Options {
    pub fn is_empty(&self) -> bool {
        match self {
            Options::None => true,
            Options::Raw(v) => v.is_empty(),
            Options::Clauses(v) => *v == Clauses::default(),
        }
    }

    pub fn write_query(&self, out: &mut String) {
        match self {
            Options::None => {}
            Options::Raw(sql) if sql.is_empty() => {}
            Options::Raw(sql) => {
                if !sql.starts_with(char::is_whitespace) {
                    out.push(' ');
                }
                out.push_str(sql);
            }
            Options::Clauses(clauses) => clauses.write_query(out),
        }
    }

    pub fn compile(&self) -> String {
        let mut out = String::new();
        self.write_query(&mut out);
        out
    }

    /// Same ordering, restricted to the first matching row.
    ///
    /// An explicit pair keeps its offset, a `start` is kept while `limit` becomes 1.
    /// Raw options are extended with `LIMIT 1` unless they already mention a limit.
    pub fn single_row(self) -> Self {
        match self {
            Options::None => Options::Clauses(Clauses::new().count(1)),
            Options::Raw(sql) => {
                if LIMIT_KEYWORD.is_match(&sql) {
                    Options::Raw(sql)
                } else {
                    Options::Raw(format!("{} LIMIT 1", sql.trim_end()))
                }
            }
            Options::Clauses(mut clauses) => {
                match clauses.pair {
                    Some((offset, _)) => clauses.pair = Some((offset, 1)),
                    None => clauses.limit = Some(1),
                }
                Options::Clauses(clauses)
            }
        }
    }
}

impl From<&str> for Options {
    fn from(value: &str) -> Self {
        Options::Raw(value.into())
    }
}

impl From<String> for Options {
    fn from(value: String) -> Self {
        Options::Raw(value)
    }
}

impl From<Clauses> for Options {
    fn from(value: Clauses) -> Self {
        Options::Clauses(value)
    }
}

impl<T: Into<Options>> From<Option<T>> for Options {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<()> for Options {
    fn from(_: ()) -> Self {
        Options::None
    }
}
