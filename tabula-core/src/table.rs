use crate::{
    Condition, Connection, Constraint, ConstraintMap, Constraints, Driver, Failure, KeySource,
    Operations, Options, PrimaryKey, QueryResult, Record, Result, RowLabeled, RowsAffected,
    RuleValidator, SqlWriter, Validator, Value, validate_record,
};
use serde::Deserialize;
use std::sync::Arc;

/// Immutable description of a table handle.
#[derive(Default, Debug, Clone)]
pub struct TableConfig {
    pub table: String,
    pub primary_key: PrimaryKey,
    /// Constraints per field. The field names are also the only ones `insert` and
    /// `update` write.
    pub constraints: ConstraintMap,
}

impl TableConfig {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn primary_key(mut self, primary_key: impl Into<PrimaryKey>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn constraint(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.insert(field.into(), constraint);
        self
    }

    pub fn constraints(mut self, constraints: ConstraintMap) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Writable fields without any rule.
    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        for field in fields {
            self.constraints.entry(field.into()).or_default();
        }
        self
    }

    fn check(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Failure::invalid_parameter("table name is required"));
        }
        let fields = self.primary_key.fields();
        if fields.is_empty() || fields.iter().any(|v| v.trim().is_empty()) {
            return Err(Failure::invalid_parameter(format!(
                "invalid primary key `{}` for table `{}`",
                self.primary_key, self.table
            )));
        }
        Ok(())
    }
}

/// Serialized form of a [`TableConfig`].
///
/// ```rust
/// use tabula_core::{PrimaryKey, TableConfig, TableSettings};
/// let settings: TableSettings =
///     serde_json::from_str(r#"{ "table": "members", "primaryKey": ["club", "id"] }"#).unwrap();
/// let config = TableConfig::try_from(settings).unwrap();
/// assert_eq!(config.primary_key, PrimaryKey::from(["club", "id"]));
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSettings {
    pub table: String,
    #[serde(default)]
    pub primary_key: PrimaryKey,
    /// Writable fields, see [`TableConfig::fields`].
    #[serde(default)]
    pub fields: Vec<String>,
}

impl TryFrom<TableSettings> for TableConfig {
    type Error = crate::Error;

    fn try_from(settings: TableSettings) -> Result<Self> {
        let config = TableConfig::new(settings.table)
            .primary_key(settings.primary_key)
            .fields(settings.fields);
        config.check()?;
        Ok(config)
    }
}

/// Outcome of [`Table::replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replaced {
    /// A row with the same key existed and was updated.
    Updated(RowsAffected),
    /// No row had the key, a new one was inserted.
    Inserted(RowsAffected),
}

impl Replaced {
    pub fn affected(&self) -> RowsAffected {
        match self {
            Replaced::Updated(v) | Replaced::Inserted(v) => *v,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Replaced::Inserted(..))
    }
}

/// CRUD gateway over one table.
///
/// Each operation compiles one statement (two for `replace`) and awaits the driver. The
/// futures are lazy, [`Table::operations`] gives the eagerly dispatched variant that
/// also accepts a completion callback.
pub struct Table<D: Driver> {
    connection: Connection<D>,
    config: Arc<TableConfig>,
    validator: Arc<dyn Validator>,
}

impl<D: Driver> Clone for Table<D> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            config: self.config.clone(),
            validator: self.validator.clone(),
        }
    }
}

impl<D: Driver> Table<D> {
    pub fn new(driver: D, config: TableConfig) -> Result<Self> {
        Self::with_connection(Connection::new(driver), config)
    }

    pub fn with_connection(connection: Connection<D>, config: TableConfig) -> Result<Self> {
        config.check()?;
        Ok(Self {
            connection,
            config: Arc::new(config),
            validator: Arc::new(RuleValidator),
        })
    }

    /// Replaces the default [`RuleValidator`].
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.table
    }

    pub fn primary_key(&self) -> &PrimaryKey {
        &self.config.primary_key
    }

    pub fn connection(&self) -> &Connection<D> {
        &self.connection
    }

    /// Callback friendly surface, see [`Operations`].
    pub fn operations(&self) -> Operations<D> {
        Operations::new(self.clone())
    }

    /// All the rows matching `condition`.
    pub async fn search(
        &self,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
    ) -> Result<Vec<RowLabeled>> {
        let statement = {
            let mut out = String::with_capacity(128);
            self.connection.sql_writer().write_select(
                &mut out,
                &self.config.table,
                &self.config.primary_key,
                &condition.into(),
                &options.into(),
            )?;
            out
        };
        Ok(self.connection.execute(statement).await?.into_rows())
    }

    /// The first row matching `condition`, `None` when there is none.
    pub async fn find(
        &self,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
    ) -> Result<Option<RowLabeled>> {
        let options = options.into().single_row();
        Ok(self.search(condition, options).await?.into_iter().next())
    }

    pub async fn find_by_pk(&self, key: impl Into<KeySource>) -> Result<Option<RowLabeled>> {
        let key = self.config.primary_key.resolve(key)?;
        self.find(key, Options::None).await
    }

    /// A single column of the first matching row.
    ///
    /// `None` means no row matched (or the row has no such column), a stored `NULL` is
    /// `Some(Value::Null)`.
    pub async fn find_one(
        &self,
        field: impl AsRef<str>,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
    ) -> Result<Option<Value>> {
        let row = self.find(condition, options).await?;
        Ok(row.and_then(|row| row.get_column(field.as_ref()).cloned()))
    }

    pub async fn find_all(&self, options: impl Into<Options>) -> Result<Vec<RowLabeled>> {
        self.search(Condition::None, options).await
    }

    /// Validates `data` (when `constraints` is given) and inserts its writable fields.
    pub async fn insert(
        &self,
        data: Record,
        constraints: Option<Constraints>,
    ) -> Result<RowsAffected> {
        let statement = {
            self.validate(&data, constraints.as_ref())?;
            let fields = self.writable(data)?;
            let mut out = String::with_capacity(128);
            self.connection
                .sql_writer()
                .write_insert(&mut out, &self.config.table, &fields);
            out
        };
        Ok(self.connection.execute(statement).await?.affected())
    }

    /// Writes the writable fields of `data` on the rows matching `condition`.
    ///
    /// The constraints are checked against the fields named by `condition`, not
    /// against `data`. Callers relying on data validation must call
    /// [`validate_record`] themselves.
    pub async fn update(
        &self,
        condition: impl Into<Condition>,
        data: Record,
        constraints: Option<Constraints>,
    ) -> Result<RowsAffected> {
        let condition = condition.into();
        let statement = {
            let filter = condition.filter_record(&self.config.primary_key);
            self.validate(&filter, constraints.as_ref())?;
            let fields = self.writable(data)?;
            if condition.is_empty() {
                log::warn!("Updating every row of `{}`", self.config.table);
            }
            let mut out = String::with_capacity(128);
            self.connection.sql_writer().write_update(
                &mut out,
                &self.config.table,
                &fields,
                &self.config.primary_key,
                &condition,
            )?;
            out
        };
        Ok(self.connection.execute(statement).await?.affected())
    }

    /// Updates the row identified by the key fields of `data`, or inserts `data` when
    /// no such row exists.
    pub async fn replace(
        &self,
        data: Record,
        constraints: Option<Constraints>,
    ) -> Result<Replaced> {
        let key = self.config.primary_key.resolve(data.clone())?;
        let existing = self.find(key.clone(), Options::None).await?;
        Ok(match existing {
            Some(..) => Replaced::Updated(self.update(key, data, constraints).await?),
            None => Replaced::Inserted(self.insert(data, constraints).await?),
        })
    }

    /// Deletes the rows matching `condition`. An empty condition deletes every row.
    pub async fn remove(&self, condition: impl Into<Condition>) -> Result<RowsAffected> {
        let condition = condition.into();
        let statement = {
            if condition.is_empty() {
                log::warn!("Deleting every row of `{}`", self.config.table);
            }
            let mut out = String::with_capacity(64);
            self.connection.sql_writer().write_delete(
                &mut out,
                &self.config.table,
                &self.config.primary_key,
                &condition,
            )?;
            out
        };
        Ok(self.connection.execute(statement).await?.affected())
    }

    /// Same as [`Table::remove`].
    pub async fn delete(&self, condition: impl Into<Condition>) -> Result<RowsAffected> {
        self.remove(condition).await
    }

    /// Executes `template` after replacing `?` with values and `??` with identifiers.
    pub async fn query(&self, template: &str, values: &[Value]) -> Result<QueryResult> {
        self.connection.query(template, values).await
    }

    fn validate(&self, record: &Record, constraints: Option<&Constraints>) -> Result<()> {
        let Some(constraints) = constraints else {
            return Ok(());
        };
        let constraints = constraints.resolve(&self.config.constraints);
        validate_record(self.validator.as_ref(), record, &constraints)
    }

    fn writable(&self, mut data: Record) -> Result<Record> {
        data.retain(|field, _| self.config.constraints.contains_key(field));
        if data.is_empty() {
            return Err(Failure::invalid_parameter(format!(
                "no writable fields for table `{}`",
                self.config.table
            )));
        }
        Ok(data)
    }
}
