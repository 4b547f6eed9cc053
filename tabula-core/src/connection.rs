use crate::{Completion, Deferred, Driver, QueryResult, SqlWriter, Value, deferred, printable_query};
use std::sync::Arc;

/// Promise layer over a driver: every primitive is invoked once and settles one
/// [`Deferred`].
pub struct Connection<D: Driver> {
    driver: Arc<D>,
}

impl<D: Driver> Clone for Connection<D> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
        }
    }
}

impl<D: Driver> Connection<D> {
    pub fn new(driver: D) -> Self {
        Self::from_arc(Arc::new(driver))
    }

    pub fn from_arc(driver: Arc<D>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn sql_writer(&self) -> D::SqlWriter {
        self.driver.sql_writer()
    }

    pub fn execute(&self, statement: String) -> Deferred<QueryResult> {
        log::debug!("[{}] {}", D::NAME, printable_query!(statement));
        deferred(|completion| self.driver.execute(statement, logged(completion)))
    }

    /// Fills `template` with `values` (`?` values, `??` identifiers) and executes it.
    pub fn query(&self, template: &str, values: &[Value]) -> Deferred<QueryResult> {
        let mut statement = String::with_capacity(template.len() + 16 * values.len());
        self.sql_writer()
            .write_template(&mut statement, template, values);
        self.execute(statement)
    }

    pub fn begin_transaction(&self) -> Deferred<()> {
        deferred(|completion| self.driver.begin_transaction(logged(completion)))
    }

    pub fn commit(&self) -> Deferred<()> {
        deferred(|completion| self.driver.commit(logged(completion)))
    }

    pub fn rollback(&self) -> Deferred<()> {
        deferred(|completion| self.driver.rollback(logged(completion)))
    }

    pub fn end(&self) -> Deferred<()> {
        deferred(|completion| self.driver.end(logged(completion)))
    }
}

fn logged<T: 'static>(completion: Completion<T>) -> Completion<T> {
    Box::new(move |result| {
        if let Err(e) = &result {
            log::error!("{:#}", e);
        }
        completion(result)
    })
}
