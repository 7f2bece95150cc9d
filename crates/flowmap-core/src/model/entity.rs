use serde::{Deserialize, Serialize};

use super::category::{Category, EdgeKind};

/// A node of the raw dependency graph.
///
/// `id` is derived from the category and a discriminating value
/// (`supabase_orders`, `cred_openai_Main`, `rpc_recalc_totals`); `label` is
/// for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub label: String,
    pub category: Category,
    /// Provider of a credential entity (`supabase`, `openai`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl Entity {
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category,
            subtype: None,
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }
}

/// A directed edge of the raw dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl RawEdge {
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}
