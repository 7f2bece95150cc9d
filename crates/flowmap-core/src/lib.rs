#![forbid(unsafe_code)]
//! flowmap-core library.
//!
//! Turns n8n workflow exports into a raw dependency graph: workflows, the
//! data sources they touch, the credentials those sources authenticate
//! with, and stored functions discovered in URLs or relational metadata.
//!
//! # Conventions
//!
//! - **Errors**: Use `thiserror` enums for library errors, `anyhow::Result`
//!   at I/O boundaries.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod payload;

pub use extract::{Extraction, extract};
pub use model::{Category, EdgeKind, Entity, Group, RawEdge};
pub use payload::Payload;
