mod composite;
mod mock;
mod transaction;
mod users;

pub use mock::*;

use crate::{composite::composite, users::users};
use log::LevelFilter;
use std::{env, sync::LazyLock};
use tabula_core::{Connection, Driver};
use tokio::sync::Mutex;
#[cfg(not(feature = "disable-transactions"))]
use transaction::transaction;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite against a real database reachable through `driver`.
///
/// The suite recreates its own tables, runs of the suite in the same process are
/// serialized.
pub async fn execute_tests<D: Driver>(driver: D) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;
    let connection = Connection::new(driver);
    users(&connection).await;
    composite(&connection).await;
    #[cfg(not(feature = "disable-transactions"))]
    transaction(&connection).await;
    connection
        .end()
        .await
        .expect("Failed to close the connection");
}

/// Evaluates the code with logging disabled and returns its value.
#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        let result = { $($code)+ };
        log::set_max_level(level);
        result
    }};
}
