//! Task storage for the task tracker
//!
//! This crate provides a storage abstraction for tasks. It supports a JSON
//! file (for single-process deployments) and PostgreSQL (selected when a
//! connection string is configured). Callers obtain one store from
//! [`create_store`], call `initialize`, and use it through the [`TaskStore`]
//! trait.

mod config;
mod error;
mod file;
mod postgres;
mod selector;
mod stats;
mod traits;

pub use config::*;
pub use entities::{Task, TaskPriority, TaskStatusFilter};
pub use error::*;
pub use file::*;
pub use postgres::*;
pub use selector::*;
pub use stats::*;
pub use traits::*;
