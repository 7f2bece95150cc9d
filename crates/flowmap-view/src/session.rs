//! Explicit view session.
//!
//! A [`Session`] owns the last loaded graph, the caller's toggle state and
//! the projection derived from them. Every mutation re-projects before it
//! returns, so [`Session::projection`] always matches [`Session::toggles`].

use chrono::{DateTime, Utc};
use flowmap_core::extract::extract_payload;
use flowmap_core::model::{Entity, Group};
use flowmap_core::payload::Payload;
use tracing::{debug, instrument};

use crate::graph::{GraphStats, RawGraph};
use crate::impact;
use crate::projection::{Projection, project};
use crate::report::ReportView;
use crate::toggles::ToggleMap;

#[derive(Debug, Clone, Default)]
pub struct Session {
    raw: RawGraph,
    generated_at: Option<DateTime<Utc>>,
    toggles: ToggleMap,
    projection: Projection,
}

impl Session {
    /// Empty session starting from `toggles`.
    #[must_use]
    pub fn new(toggles: ToggleMap) -> Self {
        let raw = RawGraph::default();
        let projection = project(raw.entities(), &raw.extraction.edges, &toggles);
        Self {
            raw,
            generated_at: None,
            toggles,
            projection,
        }
    }

    /// Replace the loaded graph with one extracted from `payload`.
    /// Toggle state is kept.
    #[instrument(skip_all, fields(workflows = payload.workflows.len()))]
    pub fn load(&mut self, payload: &Payload) {
        self.raw = RawGraph::from_extraction(extract_payload(payload));
        self.generated_at = payload.generated_at();
        self.reproject();
        debug!(
            entities = self.raw.node_count(),
            visible = self.projection.nodes.len(),
            hash = %self.raw.content_hash,
            "payload loaded"
        );
    }

    #[must_use]
    pub const fn raw(&self) -> &RawGraph {
        &self.raw
    }

    #[must_use]
    pub const fn toggles(&self) -> &ToggleMap {
        &self.toggles
    }

    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }

    #[must_use]
    pub const fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    /// Flip one bucket and return its new state.
    pub fn toggle(&mut self, group: Group) -> bool {
        let expanded = self.toggles.toggle(group);
        self.reproject();
        expanded
    }

    pub fn set_expanded(&mut self, group: Group, expanded: bool) {
        if self.toggles.set(group, expanded) {
            self.reproject();
        }
    }

    pub fn expand_all(&mut self) {
        self.toggles.expand_all();
        self.reproject();
    }

    pub fn collapse_all(&mut self) {
        self.toggles.collapse_all();
        self.reproject();
    }

    /// See [`impact::neighbors`].
    #[must_use]
    pub fn neighbors(&self, visible_id: &str) -> std::collections::BTreeSet<String> {
        impact::neighbors(&self.projection, visible_id)
    }

    /// See [`impact::upstream_workflows`].
    #[must_use]
    pub fn upstream_workflows(&self, entity_id: &str) -> Vec<&Entity> {
        impact::upstream_workflows(&self.raw, entity_id)
    }

    #[must_use]
    pub fn report(&self) -> ReportView {
        ReportView::build(&self.raw, self.generated_at)
    }

    #[must_use]
    pub fn stats(&self) -> GraphStats {
        GraphStats::from_raw(&self.raw)
    }

    fn reproject(&mut self) {
        self.projection = project(
            self.raw.entities(),
            &self.raw.extraction.edges,
            &self.toggles,
        );
        debug!(
            expanded = self.toggles.expanded_groups().count(),
            nodes = self.projection.nodes.len(),
            "re-projected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Payload {
        Payload::from_value(json!({
            "workflows": [{
                "id": "w1",
                "name": "Orders sync",
                "nodes": [{
                    "type": "n8n-nodes-base.supabase",
                    "parameters": {"tableId": "orders"},
                    "credentials": {"supabaseApi": {"name": "Prod"}}
                }]
            }],
            "metadata": {"generated_at": "2024-05-01T12:00:00Z"}
        }))
        .expect("payload")
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new(ToggleMap::default());
        assert!(session.projection().nodes.is_empty());
        assert!(session.generated_at().is_none());
    }

    #[test]
    fn load_projects_with_current_toggles() {
        let mut session = Session::new(ToggleMap::default());
        session.load(&payload());
        let ids: Vec<&str> = session.projection().nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["group_workflow", "group_supabase", "group_credential"]);
        assert!(session.generated_at().is_some());
    }

    #[test]
    fn toggle_reprojects() {
        let mut session = Session::new(ToggleMap::default());
        session.load(&payload());
        let collapsed = session.projection().clone();

        assert!(session.toggle(Group::Supabase));
        assert!(session.projection().node("supabase_orders").is_some());

        assert!(!session.toggle(Group::Supabase));
        assert_eq!(session.projection(), &collapsed);
    }

    #[test]
    fn expand_all_shows_raw_entities() {
        let mut session = Session::new(ToggleMap::default());
        session.load(&payload());
        session.expand_all();
        assert_eq!(session.projection().nodes.len(), session.raw().node_count());
        session.collapse_all();
        assert!(session.projection().nodes.iter().all(|n| n.is_group));
    }

    #[test]
    fn reload_keeps_toggles() {
        let mut session = Session::new(ToggleMap::default());
        session.set_expanded(Group::Workflow, true);
        session.load(&payload());
        assert!(session.projection().node("w1").is_some());
        assert_eq!(
            session.upstream_workflows("supabase_orders")[0].label,
            "Orders sync"
        );
        assert_eq!(session.stats().entity_count, 3);
        assert_eq!(session.report().sections.len(), 1);
    }
}
