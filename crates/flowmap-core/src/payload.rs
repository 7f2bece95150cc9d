//! Top-level payload loading.
//!
//! Two shapes are accepted:
//!
//! ```text
//! [ WorkflowRecord, ... ]
//! { "workflows": [ ... ], "supabase": { tables, functions }, "metadata": { "generated_at": "..." } }
//! ```
//!
//! Shape errors are reported here, before extraction starts, and name the
//! offending top-level value.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::LoadError;
use crate::model::{RelationalMetadata, WorkflowRecord};

/// A fully materialized workflow bundle, ready for extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub workflows: Vec<WorkflowRecord>,
    /// Relational store metadata used for orphan-table reconciliation.
    pub supabase: Option<RelationalMetadata>,
    /// Raw `metadata.generated_at` value, if the bundle carried one.
    pub generated_at: Option<String>,
}

impl Payload {
    #[must_use]
    pub const fn from_workflows(workflows: Vec<WorkflowRecord>) -> Self {
        Self {
            workflows,
            supabase: None,
            generated_at: None,
        }
    }

    /// Parse a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] for invalid JSON and the shape variants of
    /// [`LoadError`] when the document is not a workflow bundle.
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON document as a payload.
    ///
    /// # Errors
    ///
    /// Returns a shape variant of [`LoadError`] naming the offending value.
    #[instrument(skip_all)]
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        let payload = match value {
            Value::Array(items) => Self::from_workflows(parse_workflows(items)?),
            Value::Object(mut map) => {
                let workflows = match map.remove("workflows") {
                    Some(Value::Array(items)) => parse_workflows(items)?,
                    Some(other) => {
                        return Err(LoadError::WorkflowsNotArray {
                            found: json_type_name(&other),
                        });
                    }
                    None => return Err(LoadError::WorkflowsNotArray { found: "nothing" }),
                };

                let supabase = match map.remove("supabase") {
                    None | Some(Value::Null) => None,
                    Some(meta) => {
                        Some(serde_json::from_value(meta).map_err(LoadError::Metadata)?)
                    }
                };

                let generated_at = map
                    .get("metadata")
                    .and_then(|m| m.get("generated_at"))
                    .and_then(Value::as_str)
                    .map(str::to_string);

                Self {
                    workflows,
                    supabase,
                    generated_at,
                }
            }
            other => {
                return Err(LoadError::UnexpectedTopLevel {
                    found: json_type_name(&other),
                });
            }
        };

        debug!(
            workflows = payload.workflows.len(),
            has_metadata = payload.supabase.is_some(),
            "payload loaded"
        );
        Ok(payload)
    }

    /// Read and parse a payload file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid payload.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// `metadata.generated_at` parsed as RFC 3339.
    ///
    /// Unparseable timestamps are logged and treated as absent.
    #[must_use]
    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.generated_at.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(err) => {
                warn!(value = raw, %err, "ignoring unparseable generated_at");
                None
            }
        }
    }
}

fn parse_workflows(items: Vec<Value>) -> Result<Vec<WorkflowRecord>, LoadError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                // serde's message for this case ("invalid type: integer")
                // is less useful than naming the entry.
                return Err(LoadError::Workflow {
                    index,
                    source: serde::de::Error::custom(format!(
                        "expected an object, found {}",
                        json_type_name(&item)
                    )),
                });
            }
            serde_json::from_value(item).map_err(|source| LoadError::Workflow { index, source })
        })
        .collect()
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
