//! Thin table gateway in front of a SQL driver.
//!
//! A [`Table`] compiles condition and option descriptors into escaped SQL, resolves
//! primary keys, validates records before writing them and hands one statement per
//! step to a [`Driver`]. Every operation is available as a lazy future on [`Table`] and
//! as an eagerly dispatched [`Deferred`] with an optional completion callback on
//! [`Operations`].
//!
//! ```rust,no_run
//! use tabula::{Constraint, Constraints, Driver, Options, Table, TableConfig, record};
//!
//! async fn register<D: Driver>(driver: D) -> tabula::Result<()> {
//!     let users = Table::new(
//!         driver,
//!         TableConfig::new("users")
//!             .constraint("id", Constraint::new().presence())
//!             .constraint("name", Constraint::new().presence()),
//!     )?;
//!     users
//!         .insert(record! { "id" => 1, "name" => "Ada" }, Some(Constraints::Configured))
//!         .await?;
//!     let name = users.find_one("name", 1, Options::None).await?;
//!     log::info!("{name:?}");
//!     Ok(())
//! }
//! ```
pub use ::tabula_core::*;
