//! Core domain types
//!
//! These types describe a remote task as observed by a client. None of them
//! carry behavior that mutates remote state: every observation of a task
//! produces a fresh, immutable value.

pub mod heartbeat;
pub mod product;
pub mod status;
pub mod task;
