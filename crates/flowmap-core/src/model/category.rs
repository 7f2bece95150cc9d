use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Classification bucket an entity is tagged with at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Workflow,
    SupabaseTable,
    SupabaseOrphanTable,
    RpcFunction,
    Notion,
    Bigquery,
    Microsoft,
    Google,
    Openai,
    Credential,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Self; 11] = [
        Self::Workflow,
        Self::SupabaseTable,
        Self::SupabaseOrphanTable,
        Self::RpcFunction,
        Self::Notion,
        Self::Bigquery,
        Self::Microsoft,
        Self::Google,
        Self::Openai,
        Self::Credential,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::SupabaseTable => "supabase-table",
            Self::SupabaseOrphanTable => "supabase-orphan-table",
            Self::RpcFunction => "rpc-function",
            Self::Notion => "notion",
            Self::Bigquery => "bigquery",
            Self::Microsoft => "microsoft",
            Self::Google => "google",
            Self::Openai => "openai",
            Self::Credential => "credential",
            Self::Other => "other",
        }
    }

    /// Resolve the collapse/expand bucket this category belongs to.
    ///
    /// Orphan tables share the Supabase bucket with referenced tables, so
    /// expanding "supabase" shows every known table.
    #[must_use]
    pub const fn group(self) -> Group {
        match self {
            Self::Workflow => Group::Workflow,
            Self::SupabaseTable | Self::SupabaseOrphanTable => Group::Supabase,
            Self::RpcFunction => Group::Rpc,
            Self::Notion => Group::Notion,
            Self::Bigquery => Group::Bigquery,
            Self::Microsoft => Group::Microsoft,
            Self::Google => Group::Google,
            Self::Openai => Group::Openai,
            Self::Credential => Group::Credential,
            Self::Other => Group::Other,
        }
    }

    /// `true` for categories that represent an external data source or API
    /// (everything except workflows and credentials).
    #[must_use]
    pub const fn is_source(self) -> bool {
        !matches!(self, Self::Workflow | Self::Credential)
    }
}

/// Collapse/expand bucket. Toggle maps are keyed by this closed set, so a
/// toggle for an unknown category cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Group {
    Workflow,
    Supabase,
    Rpc,
    Notion,
    Bigquery,
    Microsoft,
    Google,
    Openai,
    Credential,
    Other,
}

impl Group {
    pub const ALL: [Self; 10] = [
        Self::Workflow,
        Self::Supabase,
        Self::Rpc,
        Self::Notion,
        Self::Bigquery,
        Self::Microsoft,
        Self::Google,
        Self::Openai,
        Self::Credential,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Supabase => "supabase",
            Self::Rpc => "rpc",
            Self::Notion => "notion",
            Self::Bigquery => "bigquery",
            Self::Microsoft => "microsoft",
            Self::Google => "google",
            Self::Openai => "openai",
            Self::Credential => "credential",
            Self::Other => "other",
        }
    }

    /// Name shown on the synthetic group node.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Workflow => "Workflows",
            Self::Supabase => "Supabase",
            Self::Rpc => "RPC",
            Self::Notion => "Notion",
            Self::Bigquery => "BigQuery",
            Self::Microsoft => "Microsoft",
            Self::Google => "Google",
            Self::Openai => "OpenAI",
            Self::Credential => "Credentials",
            Self::Other => "Other",
        }
    }

    /// Category reported by this bucket's group node.
    #[must_use]
    pub const fn primary_category(self) -> Category {
        match self {
            Self::Workflow => Category::Workflow,
            Self::Supabase => Category::SupabaseTable,
            Self::Rpc => Category::RpcFunction,
            Self::Notion => Category::Notion,
            Self::Bigquery => Category::Bigquery,
            Self::Microsoft => Category::Microsoft,
            Self::Google => Category::Google,
            Self::Openai => Category::Openai,
            Self::Credential => Category::Credential,
            Self::Other => Category::Other,
        }
    }

    /// Identifier of the synthetic node standing in for a collapsed bucket.
    #[must_use]
    pub fn group_id(self) -> String {
        format!("group_{}", self.as_str())
    }
}

/// Semantic relation carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Workflow references a source.
    Uses,
    /// Source authenticates with a credential.
    Auth,
    /// Workflow calls a stored function.
    Calls,
    /// Stored function reads a table.
    Reads,
}

impl EdgeKind {
    pub const ALL: [Self; 4] = [Self::Uses, Self::Auth, Self::Calls, Self::Reads];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uses => "uses",
            Self::Auth => "auth",
            Self::Calls => "calls",
            Self::Reads => "reads",
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "category",
                got: s.to_string(),
            })
    }
}

impl FromStr for Group {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        // Accept the plural display names too ("workflows", "credentials").
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized || g.as_str() == singular)
            .ok_or_else(|| ParseEnumError {
                expected: "group",
                got: s.to_string(),
            })
    }
}

impl TryFrom<String> for Group {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for EdgeKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ParseEnumError {
                expected: "edge kind",
                got: s.to_string(),
            })
    }
}
