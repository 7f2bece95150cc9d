//! Raw graph index over an [`Extraction`].
//!
//! # Overview
//!
//! The extractor hands back flat entity and edge lists. [`RawGraph`] keeps
//! those lists (the projector consumes them as-is) and indexes them into a
//! [`petgraph`] directed graph for neighborhood queries such as "which
//! workflows use this table".
//!
//! ## Edge Direction
//!
//! Edges keep the extractor's direction: `workflow → source` (`uses`),
//! `source → credential` (`auth`), `workflow → function` (`calls`),
//! `function → table` (`reads`). Upstream queries therefore walk
//! `Direction::Incoming`.
//!
//! ## Content Hash
//!
//! [`RawGraph::content_hash`] is a BLAKE3 hash over the ordered entity and
//! edge lists. Identical input always produces an identical hash, which
//! makes it both a cache key and a cheap determinism check.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use flowmap_core::extract::Extraction;
use flowmap_core::model::{EdgeKind, Entity};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// RawGraph
// ---------------------------------------------------------------------------

/// The raw dependency graph produced by one extraction.
///
/// Node weights are entity ids; node indices follow entity insertion order.
/// Repeated entity ids keep their first occurrence.
/// Parallel raw edges with the same kind are stored once in `graph` but kept
/// verbatim in `extraction.edges`.
#[derive(Debug, Clone)]
pub struct RawGraph {
    /// Entities and edges exactly as extracted.
    pub extraction: Extraction,
    /// Directed graph: nodes = entity ids, edges = relation kinds.
    pub graph: DiGraph<String, EdgeKind>,
    /// Mapping from entity id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the entity and edge lists.
    pub content_hash: String,
}

impl Default for RawGraph {
    fn default() -> Self {
        Self::from_extraction(Extraction::default())
    }
}

impl RawGraph {
    /// Index an extraction.
    #[must_use]
    #[instrument(skip_all, fields(entities = extraction.entities.len(), edges = extraction.edges.len()))]
    pub fn from_extraction(mut extraction: Extraction) -> Self {
        // Node indices must line up with entity positions.
        let mut seen = HashSet::with_capacity(extraction.entities.len());
        extraction.entities.retain(|e| seen.insert(e.id.clone()));

        let content_hash = compute_content_hash(&extraction);

        let mut graph = DiGraph::<String, EdgeKind>::with_capacity(
            extraction.entities.len(),
            extraction.edges.len(),
        );
        let mut node_map: HashMap<String, NodeIndex> =
            HashMap::with_capacity(extraction.entities.len());

        for entity in &extraction.entities {
            let idx = graph.add_node(entity.id.clone());
            node_map.insert(entity.id.clone(), idx);
        }

        for edge in &extraction.edges {
            // Extractor output is closed over its entities; skip anything else.
            let (Some(&a), Some(&b)) = (node_map.get(&edge.source), node_map.get(&edge.target))
            else {
                continue;
            };

            // Avoid duplicate edges (petgraph allows them by default).
            let exists = graph
                .edges_connecting(a, b)
                .any(|e| *e.weight() == edge.kind);
            if !exists {
                graph.add_edge(a, b, edge.kind);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            %content_hash,
            "raw graph indexed"
        );

        Self {
            extraction,
            graph,
            node_map,
            content_hash,
        }
    }

    /// Return the number of entities in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of distinct `(source, target, kind)` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an entity id.
    #[must_use]
    pub fn node_index(&self, entity_id: &str) -> Option<NodeIndex> {
        self.node_map.get(entity_id).copied()
    }

    /// Look up an entity by id.
    #[must_use]
    pub fn entity(&self, entity_id: &str) -> Option<&Entity> {
        let idx = self.node_index(entity_id)?;
        self.extraction.entities.get(idx.index())
    }

    /// Entity stored at a graph node.
    #[must_use]
    pub fn entity_at(&self, idx: NodeIndex) -> Option<&Entity> {
        self.extraction.entities.get(idx.index())
    }

    /// All entities, in extraction order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.extraction.entities
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Compute a BLAKE3 hash of the ordered entity and edge lists.
fn compute_content_hash(extraction: &Extraction) -> String {
    let mut hasher = blake3::Hasher::new();
    for entity in &extraction.entities {
        hasher.update(b"N\x00");
        hasher.update(entity.id.as_bytes());
        hasher.update(b"\x00");
        hasher.update(entity.category.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(entity.label.as_bytes());
        hasher.update(b"\x00");
        hasher.update(entity.subtype.as_deref().unwrap_or_default().as_bytes());
        hasher.update(b"\x00");
    }
    for edge in &extraction.edges {
        hasher.update(b"E\x00");
        hasher.update(edge.source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(edge.kind.as_str().as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
