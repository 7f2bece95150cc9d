//! Read-only dependency report.
//!
//! For every source bucket with members, lists the raw sources in label
//! order with the workflows that use them, the credentials they
//! authenticate with, and the stored functions that read them. Rendering is
//! left to the caller.

use chrono::{DateTime, Utc};
use flowmap_core::model::{Category, Entity, Group};
use serde::Serialize;

use crate::graph::RawGraph;
use crate::impact;

/// Short reference to another entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: String,
    pub label: String,
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            label: entity.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSource {
    pub id: String,
    pub label: String,
    pub category: Category,
    /// Known to the relational store but not referenced by any workflow.
    pub orphan: bool,
    pub workflows: Vec<EntityRef>,
    pub credentials: Vec<EntityRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read_by: Vec<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub group: Group,
    pub title: &'static str,
    pub sources: Vec<ReportSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    pub content_hash: String,
    pub workflow_count: usize,
    pub sections: Vec<ReportSection>,
}

impl ReportView {
    #[must_use]
    pub fn build(raw: &RawGraph, generated_at: Option<DateTime<Utc>>) -> Self {
        let sections = Group::ALL
            .iter()
            .filter(|g| g.primary_category().is_source())
            .filter_map(|&group| section(raw, group))
            .collect();

        let workflow_count = raw
            .entities()
            .iter()
            .filter(|e| e.category == Category::Workflow)
            .count();

        Self {
            generated_at,
            content_hash: raw.content_hash.clone(),
            workflow_count,
            sections,
        }
    }

    /// Total number of sources across all sections.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sections.iter().map(|s| s.sources.len()).sum()
    }

    #[must_use]
    pub fn section(&self, group: Group) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.group == group)
    }
}

fn section(raw: &RawGraph, group: Group) -> Option<ReportSection> {
    let mut sources: Vec<ReportSource> = raw
        .entities()
        .iter()
        .filter(|e| e.category.group() == group)
        .map(|e| ReportSource {
            id: e.id.clone(),
            label: e.label.clone(),
            category: e.category,
            orphan: e.category == Category::SupabaseOrphanTable,
            workflows: refs(&impact::upstream_workflows(raw, &e.id)),
            credentials: refs(&impact::credentials_of(raw, &e.id)),
            read_by: refs(&impact::readers(raw, &e.id)),
        })
        .collect();

    if sources.is_empty() {
        return None;
    }
    sources.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

    Some(ReportSection {
        group,
        title: group.display_name(),
        sources,
    })
}

fn refs(entities: &[&Entity]) -> Vec<EntityRef> {
    entities.iter().map(|&e| EntityRef::from(e)).collect()
}
