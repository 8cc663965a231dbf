//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access and the
//! SQLite implementation behind them.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Group, Todo, SubTodo) and query/patch types
//! - `mapper`: Storage records and their conversion to entities
//! - `repository`: Trait definitions for data access
//! - `sqlite`: The SQLite backing store

mod error;
pub mod mapper;
mod models;
mod patch;
mod repository;
pub mod sqlite;
pub mod utils;


pub use error::{DbError, DbResult};
pub use models::*;
pub use patch::Patch;
pub use repository::*;
pub use sqlite::SqliteDatabase;
