use crate::{QueryResult, Result, SqlWriter};

/// Completion handed to a driver primitive, called exactly once with the outcome.
pub type Completion<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Database client collaborator.
///
/// Primitives are completion based: the driver calls `completion` once when the
/// statement finished (from any thread). Dropping a completion without calling it is
/// reported to the caller as an error.
pub trait Driver: Send + Sync + 'static {
    type SqlWriter: SqlWriter;

    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    /// Runs one statement verbatim.
    fn execute(&self, statement: String, completion: Completion<QueryResult>);

    fn begin_transaction(&self, completion: Completion<()>) {
        let mut statement = String::with_capacity(20);
        self.sql_writer().write_transaction_begin(&mut statement);
        self.execute(statement, discard_result(completion));
    }

    fn commit(&self, completion: Completion<()>) {
        let mut statement = String::with_capacity(8);
        self.sql_writer().write_transaction_commit(&mut statement);
        self.execute(statement, discard_result(completion));
    }

    fn rollback(&self, completion: Completion<()>) {
        let mut statement = String::with_capacity(8);
        self.sql_writer().write_transaction_rollback(&mut statement);
        self.execute(statement, discard_result(completion));
    }

    /// Closes the underlying connection.
    fn end(&self, completion: Completion<()>) {
        completion(Ok(()));
    }
}

fn discard_result(completion: Completion<()>) -> Completion<QueryResult> {
    Box::new(move |result| completion(result.map(|_| ())))
}
