//! Summary statistics for the raw dependency graph.
//!
//! # Statistics Provided
//!
//! - **entity_count** / **edge_count**: raw list sizes. `edge_count` counts
//!   repeated edges; `distinct_edge_count` counts `(source, target, kind)`
//!   triples once.
//! - **by_group** / **by_kind**: entities per bucket, raw edges per kind.
//! - **orphan_table_count**: tables the relational store knows about that no
//!   workflow references.
//! - **function_only_tables**: tables with an incoming `reads` edge but no
//!   incoming `uses` edge, i.e. reachable only through stored functions.
//! - **isolated_entity_count**: entities with no edges at all.

use std::collections::BTreeMap;

use flowmap_core::model::{Category, EdgeKind, Group};
use petgraph::{Direction, visit::EdgeRef, visit::IntoNodeIdentifiers};
use serde::Serialize;

use crate::graph::build::RawGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a [`RawGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    /// Number of entities.
    pub entity_count: usize,
    /// Number of raw edges, repeats included.
    pub edge_count: usize,
    /// Number of distinct `(source, target, kind)` edges.
    pub distinct_edge_count: usize,
    /// Entities per bucket. Empty buckets are omitted.
    pub by_group: BTreeMap<Group, usize>,
    /// Raw edges per kind. Kinds with no edges are omitted.
    pub by_kind: BTreeMap<EdgeKind, usize>,
    /// Number of `supabase-orphan-table` entities.
    pub orphan_table_count: usize,
    /// Ids of tables reachable only through stored functions.
    pub function_only_tables: Vec<String>,
    /// Entities with neither incoming nor outgoing edges.
    pub isolated_entity_count: usize,
    /// Content hash of the underlying graph.
    pub content_hash: String,
}

impl GraphStats {
    /// Compute statistics from a [`RawGraph`].
    #[must_use]
    pub fn from_raw(raw: &RawGraph) -> Self {
        let mut by_group = BTreeMap::new();
        let mut orphan_table_count = 0;
        for entity in raw.entities() {
            *by_group.entry(entity.category.group()).or_insert(0) += 1;
            if entity.category == Category::SupabaseOrphanTable {
                orphan_table_count += 1;
            }
        }

        let mut by_kind = BTreeMap::new();
        for edge in &raw.extraction.edges {
            *by_kind.entry(edge.kind).or_insert(0) += 1;
        }

        let function_only_tables = raw
            .graph
            .node_identifiers()
            .filter(|&idx| {
                raw.entity_at(idx).is_some_and(|e| e.category.group() == Group::Supabase)
            })
            .filter(|&idx| {
                let mut read = false;
                let mut used = false;
                for edge in raw.graph.edges_directed(idx, Direction::Incoming) {
                    match edge.weight() {
                        EdgeKind::Reads => read = true,
                        EdgeKind::Uses => used = true,
                        EdgeKind::Auth | EdgeKind::Calls => {}
                    }
                }
                read && !used
            })
            .filter_map(|idx| raw.graph.node_weight(idx).cloned())
            .collect();

        // Isolated nodes: degree 0 (no in or out edges).
        let isolated_entity_count = raw
            .graph
            .node_identifiers()
            .filter(|&idx| {
                raw.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
                    && raw
                        .graph
                        .neighbors_directed(idx, Direction::Outgoing)
                        .next()
                        .is_none()
            })
            .count();

        Self {
            entity_count: raw.node_count(),
            edge_count: raw.extraction.edges.len(),
            distinct_edge_count: raw.edge_count(),
            by_group,
            by_kind,
            orphan_table_count,
            function_only_tables,
            isolated_entity_count,
            content_hash: raw.content_hash.clone(),
        }
    }

    /// Return the entity count for one bucket.
    #[must_use]
    pub fn group_count(&self, group: Group) -> usize {
        self.by_group.get(&group).copied().unwrap_or(0)
    }

    /// Return the raw edge count for one kind.
    #[must_use]
    pub fn kind_count(&self, kind: EdgeKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Return `true` if the graph has no edges.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
