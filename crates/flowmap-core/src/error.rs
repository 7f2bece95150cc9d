use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InputNotFound,
    InputParseError,
    InputShapeMismatch,
    ConfigParseError,
    UnknownGroup,
    EntityNotFound,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InputNotFound => "E1001",
            Self::InputParseError => "E1002",
            Self::InputShapeMismatch => "E1003",
            Self::ConfigParseError => "E1004",
            Self::UnknownGroup => "E2001",
            Self::EntityNotFound => "E2002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InputNotFound => "Workflow payload not found",
            Self::InputParseError => "Workflow payload is not valid JSON",
            Self::InputShapeMismatch => "Workflow payload has an unexpected shape",
            Self::ConfigParseError => "Config file parse error",
            Self::UnknownGroup => "Unknown category group",
            Self::EntityNotFound => "Entity not found",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InputNotFound => {
                Some("Pass --input <file> or set [input] path in .flowmap/config.toml.")
            }
            Self::InputParseError => Some("Re-export the workflows; the file is truncated or corrupt."),
            Self::InputShapeMismatch => Some(
                "Provide a JSON array of workflows or an object with a \"workflows\" array.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .flowmap/config.toml and retry."),
            Self::UnknownGroup => Some(
                "Use one of: workflow, supabase, rpc, notion, bigquery, microsoft, google, openai, credential, other.",
            ),
            Self::EntityNotFound => Some("Run `flowmap graph --expand-all --format text` to list entity IDs."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while turning raw JSON into a [`crate::payload::Payload`].
///
/// These are the only hard failures of a load: everything below the
/// workflow level degrades to fallback labels instead.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document is not JSON at all.
    #[error("workflow payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is neither a workflow array nor a wrapper object.
    #[error("expected a workflow array or an object with a \"workflows\" array, found {found}")]
    UnexpectedTopLevel { found: &'static str },

    /// The wrapper object exists but its `workflows` field is missing or not an array.
    #[error("\"workflows\" must be an array, found {found}")]
    WorkflowsNotArray { found: &'static str },

    /// One entry of the workflow list could not be read as a workflow.
    #[error("workflow #{index} is malformed: {source}")]
    Workflow {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The optional `supabase` metadata block is present but malformed.
    #[error("\"supabase\" metadata is malformed: {0}")]
    Metadata(#[source] serde_json::Error),
}

impl LoadError {
    /// Map this error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Json(_) => ErrorCode::InputParseError,
            Self::UnexpectedTopLevel { .. }
            | Self::WorkflowsNotArray { .. }
            | Self::Workflow { .. }
            | Self::Metadata(_) => ErrorCode::InputShapeMismatch,
        }
    }
}
