mod condition;
mod connection;
mod deferred;
mod dispatch;
mod driver;
mod error;
mod options;
mod primary_key;
mod query;
mod sql_writer;
mod table;
mod util;
mod validation;
mod value;

pub use ::anyhow::Context;
pub use condition::*;
pub use connection::*;
pub use deferred::*;
pub use dispatch::*;
pub use driver::*;
pub use error::*;
pub use options::*;
pub use primary_key::*;
pub use query::*;
pub use sql_writer::*;
pub use table::*;
pub use util::*;
pub use validation::*;
pub use value::*;
pub use ::futures::future;
pub use ::indexmap::IndexMap;
pub use ::regex::Regex;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
