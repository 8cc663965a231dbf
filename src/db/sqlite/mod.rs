//! SQLite implementation of the database traits.
//!
//! This module provides a SQLite-backed implementation of the repository
//! traits defined in the parent module.

mod connection;
mod group;
mod helpers;
mod schema;
mod subtodo;
mod todo;

#[cfg(test)]
mod critical_tests;

pub use connection::SqliteDatabase;
pub use group::SqliteGroupRepository;
pub use subtodo::SqliteSubTodoRepository;
pub use todo::SqliteTodoRepository;
