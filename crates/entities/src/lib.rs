//! Core entity definitions for the task tracker.
//!
//! This crate defines the task record shared by every storage backend, along
//! with the priority and status types callers use to validate input and
//! filter listings.

mod priority;
mod task;

pub use priority::*;
pub use task::*;
