//! Raw dependency graph for flowmap views.
//!
//! # Overview
//!
//! The extractor produces flat entity and edge lists. This module indexes
//! them into a petgraph directed graph so that neighborhood queries (who
//! uses this table, which sources does this credential authenticate) are
//! cheap and independent of the projector's collapse state.
//!
//! ## Pipeline
//!
//! ```text
//! Payload
//!        ↓  flowmap_core::extract::extract_payload()
//! Extraction (entities + edges)
//!        ↓  build::RawGraph::from_extraction()
//! RawGraph (DiGraph + id map + content hash)
//!        ↓  stats::GraphStats::from_raw()
//! GraphStats (per-group counts, orphans, isolated entities, …)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use flowmap_core::{Payload, extract::extract_payload};
//! use flowmap_view::graph::{build::RawGraph, stats::GraphStats};
//!
//! let payload = Payload::from_path(path)?;
//! let raw = RawGraph::from_extraction(extract_payload(&payload));
//! let stats = GraphStats::from_raw(&raw);
//!
//! println!("entities={} edges={} orphans={}",
//!     stats.entity_count, stats.edge_count, stats.orphan_table_count);
//! ```

pub mod build;
pub mod stats;

pub use build::RawGraph;
pub use stats::GraphStats;
