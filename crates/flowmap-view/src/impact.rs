//! Impact queries.
//!
//! [`neighbors`] works on the visible graph and answers "what lights up when
//! I hover this node". The other queries run on the raw graph, so they give
//! the same answer whatever the collapse state.

use std::collections::BTreeSet;

use flowmap_core::model::{Category, EdgeKind, Entity};
use petgraph::Direction;
use petgraph::graph::EdgeIndex;
use petgraph::visit::EdgeRef;

use crate::graph::RawGraph;
use crate::projection::Projection;

/// The node itself plus every node one visible edge away, in either
/// direction. Empty when `visible_id` is not in the projection.
#[must_use]
pub fn neighbors(projection: &Projection, visible_id: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    if projection.node(visible_id).is_none() {
        return out;
    }
    out.insert(visible_id.to_string());
    for link in &projection.links {
        if link.source == visible_id {
            out.insert(link.target.clone());
        } else if link.target == visible_id {
            out.insert(link.source.clone());
        }
    }
    out
}

/// Workflows with a `uses` or `calls` edge into `entity_id`.
///
/// Each workflow appears once, ordered by its first such edge.
#[must_use]
pub fn upstream_workflows<'a>(raw: &'a RawGraph, entity_id: &str) -> Vec<&'a Entity> {
    incoming(raw, entity_id, |kind| {
        matches!(kind, EdgeKind::Uses | EdgeKind::Calls)
    })
    .into_iter()
    .filter(|e| e.category == Category::Workflow)
    .collect()
}

/// Sources authenticated by the credential `credential_id`.
#[must_use]
pub fn credential_consumers<'a>(raw: &'a RawGraph, credential_id: &str) -> Vec<&'a Entity> {
    incoming(raw, credential_id, |kind| kind == EdgeKind::Auth)
}

/// Credentials `source_id` authenticates with.
#[must_use]
pub fn credentials_of<'a>(raw: &'a RawGraph, source_id: &str) -> Vec<&'a Entity> {
    outgoing(raw, source_id, |kind| kind == EdgeKind::Auth)
}

/// Sources and functions a workflow depends on directly.
#[must_use]
pub fn dependencies<'a>(raw: &'a RawGraph, workflow_id: &str) -> Vec<&'a Entity> {
    outgoing(raw, workflow_id, |kind| {
        matches!(kind, EdgeKind::Uses | EdgeKind::Calls)
    })
}

/// Stored functions that read the table `table_id`.
#[must_use]
pub fn readers<'a>(raw: &'a RawGraph, table_id: &str) -> Vec<&'a Entity> {
    incoming(raw, table_id, |kind| kind == EdgeKind::Reads)
}

fn incoming<'a>(
    raw: &'a RawGraph,
    id: &str,
    keep: impl Fn(EdgeKind) -> bool,
) -> Vec<&'a Entity> {
    adjacent(raw, id, Direction::Incoming, keep)
}

fn outgoing<'a>(
    raw: &'a RawGraph,
    id: &str,
    keep: impl Fn(EdgeKind) -> bool,
) -> Vec<&'a Entity> {
    adjacent(raw, id, Direction::Outgoing, keep)
}

/// Distinct neighbors over kind-filtered edges, in edge insertion order.
///
/// petgraph walks adjacency lists newest first, hence the sort.
fn adjacent<'a>(
    raw: &'a RawGraph,
    id: &str,
    direction: Direction,
    keep: impl Fn(EdgeKind) -> bool,
) -> Vec<&'a Entity> {
    let Some(idx) = raw.node_index(id) else {
        return Vec::new();
    };

    let mut hits: Vec<(EdgeIndex, _)> = raw
        .graph
        .edges_directed(idx, direction)
        .filter(|e| keep(*e.weight()))
        .map(|e| {
            let other = match direction {
                Direction::Incoming => e.source(),
                Direction::Outgoing => e.target(),
            };
            (e.id(), other)
        })
        .collect();
    hits.sort_by_key(|(edge, _)| *edge);

    let mut seen = BTreeSet::new();
    hits.into_iter()
        .filter(|(_, other)| seen.insert(*other))
        .filter_map(|(_, other)| raw.entity_at(other))
        .collect()
}
