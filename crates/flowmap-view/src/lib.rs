#![forbid(unsafe_code)]
//! flowmap-view library.
//!
//! Turns an extraction into what a user looks at: a collapse/expand
//! projection, impact queries, statistics and a report.
//!
//! # Conventions
//!
//! - **Errors**: Nothing here fails; payload loading errors belong to
//!   `flowmap-core`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod graph;
pub mod impact;
pub mod projection;
pub mod report;
pub mod session;
pub mod toggles;

pub use graph::{GraphStats, RawGraph};
pub use projection::{Projection, VisibleEdge, VisibleEntity, project};
pub use report::ReportView;
pub use session::Session;
pub use toggles::ToggleMap;
