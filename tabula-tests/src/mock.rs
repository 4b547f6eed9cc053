use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};
use tabula_core::{
    Completion, Driver, Error, GenericSqlWriter, QueryResult, RowLabeled, RowNames, RowsAffected,
    Value,
};

enum Response {
    Result(QueryResult),
    Failure(String),
    /// The completion is dropped without being called.
    Drop,
}

#[derive(Default)]
struct State {
    statements: Vec<String>,
    script: VecDeque<Response>,
    executions: usize,
    ends: usize,
    threaded: bool,
}

/// In memory driver recording every statement it receives.
///
/// Answers come from a script (`respond`, `fail`, `drop_next`) consumed one per
/// statement, an exhausted script answers with an empty row set. Clones share the same
/// state so a test can keep a handle after moving the driver into a table.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<State>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Default::default()
    }

    /// Completions are called from a separate thread instead of inline.
    pub fn threaded(self) -> Self {
        self.state().threaded = true;
        self
    }

    pub fn respond(&self, result: impl Into<QueryResult>) -> &Self {
        self.state()
            .script
            .push_back(Response::Result(result.into()));
        self
    }

    pub fn respond_rows(&self, labels: &[&str], rows: Vec<Vec<Value>>) -> &Self {
        self.respond(rows_of(labels, rows))
    }

    pub fn respond_affected(&self, rows_affected: u64) -> &Self {
        self.respond(RowsAffected {
            rows_affected,
            last_affected_id: None,
        })
    }

    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.state()
            .script
            .push_back(Response::Failure(message.into()));
        self
    }

    pub fn drop_next(&self) -> &Self {
        self.state().script.push_back(Response::Drop);
        self
    }

    /// Every statement executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn last_statement(&self) -> Option<String> {
        self.state().statements.last().cloned()
    }

    /// Number of `execute` invocations.
    pub fn executions(&self) -> usize {
        self.state().executions
    }

    pub fn ends(&self) -> usize {
        self.state().ends
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Driver for MockDriver {
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "mock";

    fn sql_writer(&self) -> Self::SqlWriter {
        GenericSqlWriter::new()
    }

    fn execute(&self, statement: String, completion: Completion<QueryResult>) {
        let (response, threaded) = {
            let mut state = self.state();
            state.executions += 1;
            state.statements.push(statement);
            let response = state
                .script
                .pop_front()
                .unwrap_or_else(|| Response::Result(QueryResult::default()));
            (response, state.threaded)
        };
        let result = match response {
            Response::Result(v) => Ok(v),
            Response::Failure(message) => Err(Error::msg(message)),
            Response::Drop => return drop(completion),
        };
        if threaded {
            std::thread::spawn(move || completion(result));
        } else {
            completion(result);
        }
    }

    fn end(&self, completion: Completion<()>) {
        self.state().ends += 1;
        completion(Ok(()));
    }
}

/// Builds a row set sharing the same labels.
pub fn rows_of(labels: &[&str], rows: Vec<Vec<Value>>) -> QueryResult {
    let labels: RowNames = labels.iter().map(|v| v.to_string()).collect();
    QueryResult::Rows(
        rows.into_iter()
            .map(|values| RowLabeled::new(labels.clone(), values.into()))
            .collect(),
    )
}
