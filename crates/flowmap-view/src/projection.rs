//! Collapse/expand projection from the raw graph to the visible graph.
//!
//! # Overview
//!
//! [`project`] maps every raw entity to a visible id: its own id when its
//! bucket is expanded, or the bucket's `group_<name>` id when collapsed.
//! Raw edges are then rewritten through that map.
//!
//! ## Rules
//!
//! - A collapsed bucket becomes one group entity whose `count` is the
//!   number of raw members and whose label is `"<Display> (<count>)"`.
//! - An edge is dropped when either endpoint is unmapped or both endpoints
//!   land on the same visible entity.
//! - Edges are deduplicated by `(source, target)`; the first kind seen wins,
//!   so a later `auth` between the same pair as an earlier `uses` is lost.
//! - Entities appear in first-encounter order; a group sits where its first
//!   member was. Edges keep raw order.
//!
//! The output is rebuilt from scratch on every call, so projecting twice
//! gives the same result and a toggle round-trip restores the old output.

use std::collections::{HashMap, HashSet};

use flowmap_core::model::{Category, EdgeKind, Entity, Group, RawEdge};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::toggles::ToggleMap;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// An entity as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleEntity {
    pub id: String,
    pub label: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub is_group: bool,
    /// Member count; only set on group entities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl VisibleEntity {
    fn from_raw(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            label: entity.label.clone(),
            category: entity.category,
            subtype: entity.subtype.clone(),
            is_group: false,
            count: None,
        }
    }

    fn group(group: Group) -> Self {
        Self {
            id: group.group_id(),
            label: group_label(group, 1),
            category: group.primary_category(),
            subtype: None,
            is_group: true,
            count: Some(1),
        }
    }

    /// Bucket this entity belongs to.
    #[must_use]
    pub const fn group_of(&self) -> Group {
        self.category.group()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VisibleEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// Renderer input: `{ "nodes": [...], "links": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub nodes: Vec<VisibleEntity>,
    pub links: Vec<VisibleEdge>,
    /// Raw id → visible id.
    #[serde(skip)]
    pub id_map: HashMap<String, String>,
}

impl Projection {
    #[must_use]
    pub fn node(&self, visible_id: &str) -> Option<&VisibleEntity> {
        self.nodes.iter().find(|n| n.id == visible_id)
    }

    /// Visible id a raw entity was mapped to.
    #[must_use]
    pub fn visible_id(&self, raw_id: &str) -> Option<&str> {
        self.id_map.get(raw_id).map(String::as_str)
    }

    /// Sum of raw entities represented, counting each group by its members.
    #[must_use]
    pub fn represented_count(&self) -> usize {
        self.nodes.iter().map(|n| n.count.unwrap_or(1)).sum()
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project the raw graph through the current toggle state.
#[must_use]
#[instrument(skip_all, fields(entities = entities.len(), edges = edges.len()))]
pub fn project(entities: &[Entity], edges: &[RawEdge], toggles: &ToggleMap) -> Projection {
    let mut nodes: Vec<VisibleEntity> = Vec::with_capacity(entities.len());
    let mut id_map: HashMap<String, String> = HashMap::with_capacity(entities.len());
    let mut group_slots: HashMap<Group, usize> = HashMap::new();

    for entity in entities {
        let group = entity.category.group();
        if toggles.is_expanded(group) {
            id_map.insert(entity.id.clone(), entity.id.clone());
            nodes.push(VisibleEntity::from_raw(entity));
            continue;
        }

        if let Some(&slot) = group_slots.get(&group) {
            let node = &mut nodes[slot];
            let count = node.count.map_or(1, |c| c + 1);
            node.count = Some(count);
            node.label = group_label(group, count);
        } else {
            group_slots.insert(group, nodes.len());
            nodes.push(VisibleEntity::group(group));
        }
        id_map.insert(entity.id.clone(), group.group_id());
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(edges.len());
    let mut links = Vec::new();
    for edge in edges {
        let (Some(source), Some(target)) = (id_map.get(&edge.source), id_map.get(&edge.target))
        else {
            continue;
        };
        if source == target {
            continue;
        }
        if seen.insert((source.as_str(), target.as_str())) {
            links.push(VisibleEdge {
                source: source.clone(),
                target: target.clone(),
                kind: edge.kind,
            });
        }
    }

    debug!(
        nodes = nodes.len(),
        links = links.len(),
        groups = group_slots.len(),
        "projection built"
    );

    Projection {
        nodes,
        links,
        id_map,
    }
}

fn group_label(group: Group, count: usize) -> String {
    format!("{} ({count})", group.display_name())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
