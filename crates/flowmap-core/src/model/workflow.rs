//! Lenient views of exported n8n workflow JSON.
//!
//! Exports come from several n8n versions and from hand-edited bundles, so
//! every field below the workflow list is optional and wrong-typed values
//! degrade to defaults instead of failing the load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One exported workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRecord {
    /// Workflow id; numeric ids from older exports are stringified.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_nodes")]
    pub nodes: Vec<NodeRecord>,
}

/// One processing node inside a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Dotted node type, e.g. `n8n-nodes-base.supabase`.
    #[serde(rename = "type", default, deserialize_with = "lenient_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub parameters: Map<String, Value>,
    /// Credential references keyed by credential type (`supabaseApi`, ...).
    #[serde(default, deserialize_with = "object_or_empty")]
    pub credentials: Map<String, Value>,
}

impl NodeRecord {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper used by tests and fixtures.
    #[must_use]
    pub fn with_parameter(mut self, key: &str, value: Value) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }

    /// Builder-style helper used by tests and fixtures.
    #[must_use]
    pub fn with_credential(mut self, key: &str, value: Value) -> Self {
        self.credentials.insert(key.to_string(), value);
        self
    }
}

/// Relational store metadata exported alongside the workflows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalMetadata {
    #[serde(default)]
    pub tables: Vec<RelationalTable>,
    #[serde(default)]
    pub functions: Vec<RelationalFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalTable {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationalFunction {
    pub name: String,
    #[serde(default)]
    pub tables_used: Vec<String>,
}

/// Display name of a credential reference (`{"id": "..", "name": ".."}`).
///
/// Prefers `name`, then `id`; a bare string is taken as the name.
#[must_use]
pub fn credential_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("name")
            .and_then(scalar_to_string)
            .or_else(|| map.get("id").and_then(scalar_to_string)),
        other => scalar_to_string(other),
    }
}

/// Non-empty string form of a scalar JSON value.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value))
}

fn lenient_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn lenient_nodes<'de, D>(deserializer: D) -> Result<Vec<NodeRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    // Every field of NodeRecord is lenient, so only non-object entries can
    // fail; those become empty nodes rather than being dropped.
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value::<NodeRecord>(item).unwrap_or_default())
        .collect())
}
