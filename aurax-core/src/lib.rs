//! Aurax Core
//!
//! Core types shared by the Aurax client and CLI.
//!
//! This crate contains:
//! - Domain types: task identifiers, statuses, status snapshots and heartbeats
//! - DTOs: request and response bodies exchanged with the Aurax API
//! - Validation: client-side checks applied before a request is sent

pub mod domain;
pub mod dto;
pub mod validation;
