use crate::{Failure, Record, Result, Value, Violations};
use indexmap::IndexMap;
use regex::Regex;
use std::borrow::Cow;

/// Rules applied to one field.
///
/// Every rule except `presence` ignores a missing or `Null` field.
#[derive(Default, Debug, Clone)]
pub struct Constraint {
    pub presence: bool,
    pub length: Option<Length>,
    pub numericality: Option<Numericality>,
    pub inclusion: Option<Vec<Value>>,
    pub exclusion: Option<Vec<Value>>,
    pub format: Option<Regex>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    pub minimum: Option<usize>,
    pub maximum: Option<usize>,
    pub is: Option<usize>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Numericality {
    pub only_integer: bool,
    pub greater_than: Option<f64>,
    pub greater_than_or_equal_to: Option<f64>,
    pub less_than: Option<f64>,
    pub less_than_or_equal_to: Option<f64>,
}

impl Constraint {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn presence(mut self) -> Self {
        self.presence = true;
        self
    }

    pub fn length(mut self, length: Length) -> Self {
        self.length = Some(length);
        self
    }

    pub fn numericality(mut self, numericality: Numericality) -> Self {
        self.numericality = Some(numericality);
        self
    }

    pub fn inclusion(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.inclusion = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclusion(mut self, values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        self.exclusion = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// The whole value must match `pattern`.
    pub fn format(mut self, pattern: &str) -> Result<Self> {
        self.format = Some(Regex::new(&format!("^(?:{pattern})$"))?);
        Ok(self)
    }
}

/// Field name to its constraint, the keys double as the writable field allow-list.
pub type ConstraintMap = IndexMap<String, Constraint>;

/// Constraints requested for one call.
#[derive(Debug, Clone)]
pub enum Constraints {
    /// The constraints configured on the table.
    Configured,
    /// Merged over the configured constraints, field by field.
    Merge(ConstraintMap),
}

impl Constraints {
    pub fn resolve<'a>(&'a self, configured: &'a ConstraintMap) -> Cow<'a, ConstraintMap> {
        match self {
            Constraints::Configured => Cow::Borrowed(configured),
            Constraints::Merge(overrides) if overrides.is_empty() => Cow::Borrowed(configured),
            Constraints::Merge(overrides) => {
                let mut merged = configured.clone();
                merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
                Cow::Owned(merged)
            }
        }
    }
}

impl From<ConstraintMap> for Constraints {
    fn from(value: ConstraintMap) -> Self {
        Constraints::Merge(value)
    }
}

/// Rule engine checking a record against a constraint mapping.
pub trait Validator: Send + Sync {
    /// Returns the violations, empty when the record is valid.
    fn validate(&self, record: &Record, constraints: &ConstraintMap) -> Violations;
}

/// Evaluates the rules of [`Constraint`].
#[derive(Default, Debug, Clone, Copy)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(&self, record: &Record, constraints: &ConstraintMap) -> Violations {
        let mut violations = Violations::new();
        for (field, constraint) in constraints {
            let messages = check(field, record.get(field), constraint);
            if !messages.is_empty() {
                violations.insert(field.clone(), messages);
            }
        }
        violations
    }
}

/// Runs `validator` and turns a non empty outcome into [`Failure::ValidationFailed`].
pub fn validate_record(
    validator: &dyn Validator,
    record: &Record,
    constraints: &ConstraintMap,
) -> Result<()> {
    let violations = validator.validate(record, constraints);
    if violations.is_empty() {
        Ok(())
    } else {
        log::debug!("Validation failed: {violations:?}");
        Err(Failure::validation_failed(violations))
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Varchar(v)) => v.trim().is_empty(),
        Some(Value::List(v)) => v.is_empty(),
        Some(Value::Blob(v)) => v.is_empty(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::Float64(v) if v.is_finite() => Some(*v),
        Value::Decimal(v) => v.to_string().parse().ok(),
        _ => None,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Varchar(v) => Some(v.chars().count()),
        Value::List(v) => Some(v.len()),
        Value::Blob(v) => Some(v.len()),
        _ => None,
    }
}

fn check(field: &str, value: Option<&Value>, constraint: &Constraint) -> Vec<String> {
    let mut messages = Vec::new();
    if constraint.presence && is_blank(value) {
        messages.push(format!("{field} can't be blank"));
    }
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => return messages,
    };
    if let Some(length) = &constraint.length {
        match length_of(value) {
            Some(len) => {
                if let Some(is) = length.is.filter(|is| *is != len) {
                    messages.push(format!(
                        "{field} is the wrong length (should be {is} characters)"
                    ));
                }
                if let Some(minimum) = length.minimum.filter(|min| len < *min) {
                    messages.push(format!(
                        "{field} is too short (minimum is {minimum} characters)"
                    ));
                }
                if let Some(maximum) = length.maximum.filter(|max| len > *max) {
                    messages.push(format!(
                        "{field} is too long (maximum is {maximum} characters)"
                    ));
                }
            }
            None => messages.push(format!("{field} has an incorrect length")),
        }
    }
    if let Some(numericality) = &constraint.numericality {
        match as_number(value) {
            Some(number) => {
                if numericality.only_integer && number.fract() != 0.0 {
                    messages.push(format!("{field} must be an integer"));
                }
                let bounds: [(Option<f64>, &str, fn(f64, f64) -> bool); 4] = [
                    (numericality.greater_than, "greater than", |n, b| n > b),
                    (
                        numericality.greater_than_or_equal_to,
                        "greater than or equal to",
                        |n, b| n >= b,
                    ),
                    (numericality.less_than, "less than", |n, b| n < b),
                    (
                        numericality.less_than_or_equal_to,
                        "less than or equal to",
                        |n, b| n <= b,
                    ),
                ];
                for (bound, label, satisfied) in bounds {
                    if let Some(bound) = bound
                        && !satisfied(number, bound)
                    {
                        messages.push(format!("{field} must be {label} {bound}"));
                    }
                }
            }
            None => messages.push(format!("{field} is not a number")),
        }
    }
    if let Some(inclusion) = &constraint.inclusion
        && !inclusion.contains(value)
    {
        messages.push(format!("{field} is not included in the list"));
    }
    if let Some(exclusion) = &constraint.exclusion
        && exclusion.contains(value)
    {
        messages.push(format!("{field} is restricted"));
    }
    if let Some(format) = &constraint.format {
        let matched = match value {
            Value::Varchar(v) => format.is_match(v),
            Value::Int64(..) | Value::UInt64(..) | Value::Float64(..) | Value::Decimal(..) => {
                format.is_match(&value.to_string())
            }
            _ => false,
        };
        if !matched {
            messages.push(format!("{field} is invalid"));
        }
    }
    messages
}
