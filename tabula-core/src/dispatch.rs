use crate::{
    Callback, Condition, Constraints, Deferred, Driver, KeySource, Options, QueryResult, Record,
    Replaced, RowLabeled, RowsAffected, Table, Value, with_callback,
};

/// The operations of a [`Table`] with a trailing optional completion callback.
///
/// Every call is dispatched immediately on the tokio runtime (so it needs one) and runs
/// once. The callback, when given, observes the outcome first, then the returned
/// [`Deferred`] resolves to the same outcome.
///
/// ```rust,no_run
/// # use tabula_core::{Driver, Table, Condition, Options, callback};
/// # async fn run<D: Driver>(table: Table<D>) -> tabula_core::Result<()> {
/// let operations = table.operations();
/// let rows = operations
///     .search(
///         Condition::raw("age > 18"),
///         Options::None,
///         callback(|result| log::info!("search done: {}", result.is_ok())),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Operations<D: Driver> {
    table: Table<D>,
}

impl<D: Driver> Clone for Operations<D> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<D: Driver> Operations<D> {
    pub fn new(table: Table<D>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table<D> {
        &self.table
    }

    pub fn search(
        &self,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
        callback: Option<Callback<Vec<RowLabeled>>>,
    ) -> Deferred<Vec<RowLabeled>> {
        let table = self.table.clone();
        let (condition, options) = (condition.into(), options.into());
        with_callback(
            async move { table.search(condition, options).await },
            callback,
        )
    }

    pub fn find(
        &self,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
        callback: Option<Callback<Option<RowLabeled>>>,
    ) -> Deferred<Option<RowLabeled>> {
        let table = self.table.clone();
        let (condition, options) = (condition.into(), options.into());
        with_callback(async move { table.find(condition, options).await }, callback)
    }

    pub fn find_by_pk(
        &self,
        key: impl Into<KeySource>,
        callback: Option<Callback<Option<RowLabeled>>>,
    ) -> Deferred<Option<RowLabeled>> {
        let table = self.table.clone();
        let key = key.into();
        with_callback(async move { table.find_by_pk(key).await }, callback)
    }

    pub fn find_one(
        &self,
        field: impl Into<String>,
        condition: impl Into<Condition>,
        options: impl Into<Options>,
        callback: Option<Callback<Option<Value>>>,
    ) -> Deferred<Option<Value>> {
        let table = self.table.clone();
        let (field, condition, options) = (field.into(), condition.into(), options.into());
        with_callback(
            async move { table.find_one(field, condition, options).await },
            callback,
        )
    }

    pub fn find_all(
        &self,
        options: impl Into<Options>,
        callback: Option<Callback<Vec<RowLabeled>>>,
    ) -> Deferred<Vec<RowLabeled>> {
        let table = self.table.clone();
        let options = options.into();
        with_callback(async move { table.find_all(options).await }, callback)
    }

    pub fn insert(
        &self,
        data: Record,
        constraints: Option<Constraints>,
        callback: Option<Callback<RowsAffected>>,
    ) -> Deferred<RowsAffected> {
        let table = self.table.clone();
        with_callback(
            async move { table.insert(data, constraints).await },
            callback,
        )
    }

    pub fn update(
        &self,
        condition: impl Into<Condition>,
        data: Record,
        constraints: Option<Constraints>,
        callback: Option<Callback<RowsAffected>>,
    ) -> Deferred<RowsAffected> {
        let table = self.table.clone();
        let condition = condition.into();
        with_callback(
            async move { table.update(condition, data, constraints).await },
            callback,
        )
    }

    pub fn replace(
        &self,
        data: Record,
        constraints: Option<Constraints>,
        callback: Option<Callback<Replaced>>,
    ) -> Deferred<Replaced> {
        let table = self.table.clone();
        with_callback(
            async move { table.replace(data, constraints).await },
            callback,
        )
    }

    pub fn remove(
        &self,
        condition: impl Into<Condition>,
        callback: Option<Callback<RowsAffected>>,
    ) -> Deferred<RowsAffected> {
        let table = self.table.clone();
        let condition = condition.into();
        with_callback(async move { table.remove(condition).await }, callback)
    }

    pub fn delete(
        &self,
        condition: impl Into<Condition>,
        callback: Option<Callback<RowsAffected>>,
    ) -> Deferred<RowsAffected> {
        self.remove(condition, callback)
    }

    pub fn query(
        &self,
        template: impl Into<String>,
        values: Vec<Value>,
        callback: Option<Callback<QueryResult>>,
    ) -> Deferred<QueryResult> {
        let table = self.table.clone();
        let template = template.into();
        with_callback(
            async move { table.query(&template, &values).await },
            callback,
        )
    }
}
