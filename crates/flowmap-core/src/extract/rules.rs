//! The ordered classification table.
//!
//! Each [`Rule`] pairs a node-type predicate and a credential-key predicate
//! with the entity it produces. Rules are evaluated in table order and are
//! not mutually exclusive: one node can fire several rules, and a credential
//! key alone is enough to fire a rule whose type test fails.

use serde_json::Value;

use super::params::resolve;
use crate::model::{Category, NodeRecord};

/// Source entity produced when a rule fires.
pub struct SourceSpec {
    pub category: Category,
    /// Id prefix; the discriminator is appended verbatim.
    pub prefix: &'static str,
    /// Discriminator used when no parameter resolves.
    pub fallback: &'static str,
    pub discriminator: fn(&NodeRecord) -> Option<String>,
}

/// Category-specific extraction that runs after the source entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    /// Relational node whose `operation` is `call`/`rpc`.
    TableRpc,
    /// Generic HTTP node whose URL contains `/rpc/<name>`.
    HttpRpc,
}

pub struct Rule {
    pub name: &'static str,
    /// Credential subtype and id segment for `cred_<provider>_<name>`.
    pub provider: &'static str,
    pub matches_type: fn(&str) -> bool,
    /// Which credential keys belong to this rule (lower-cased key).
    pub matches_credential: fn(&str) -> bool,
    /// Whether a matching credential alone fires the rule.
    pub credential_triggers: bool,
    pub source: Option<SourceSpec>,
    pub follow_up: FollowUp,
}

impl Rule {
    /// First credential reference on `node` that belongs to this rule.
    #[must_use]
    pub fn credential<'a>(&self, node: &'a NodeRecord) -> Option<(&'a str, &'a Value)> {
        node.credentials
            .iter()
            .find(|(key, _)| (self.matches_credential)(&key.to_ascii_lowercase()))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Whether the rule fires for a node with lower-cased type `kind`.
    #[must_use]
    pub fn fires(&self, kind: &str, node: &NodeRecord) -> bool {
        (self.matches_type)(kind) || (self.credential_triggers && self.credential(node).is_some())
    }
}

pub const RULES: &[Rule] = &[
    Rule {
        name: "openai",
        provider: "openai",
        matches_type: is_openai,
        matches_credential: is_openai_credential,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::Openai,
            prefix: "openai_",
            fallback: "OpenAI",
            discriminator: openai_model,
        }),
        follow_up: FollowUp::None,
    },
    Rule {
        name: "vector-store",
        provider: "supabase",
        matches_type: is_vector_store,
        matches_credential: is_supabase_credential,
        credential_triggers: false,
        source: Some(SourceSpec {
            category: Category::SupabaseTable,
            prefix: "supabase_",
            fallback: "Supabase",
            discriminator: vector_table,
        }),
        follow_up: FollowUp::None,
    },
    Rule {
        name: "relational-table",
        provider: "supabase",
        matches_type: is_relational,
        matches_credential: is_supabase_credential,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::SupabaseTable,
            prefix: "supabase_",
            fallback: "Supabase",
            discriminator: relational_table,
        }),
        follow_up: FollowUp::TableRpc,
    },
    Rule {
        name: "http-generic",
        provider: "http",
        matches_type: is_http,
        matches_credential: never,
        credential_triggers: false,
        source: None,
        follow_up: FollowUp::HttpRpc,
    },
    Rule {
        name: "document-store",
        provider: "notion",
        matches_type: is_notion,
        matches_credential: is_notion_credential,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::Notion,
            prefix: "notion_",
            fallback: "Notion",
            discriminator: notion_target,
        }),
        follow_up: FollowUp::None,
    },
    Rule {
        name: "analytical-table",
        provider: "bigquery",
        matches_type: is_bigquery,
        matches_credential: is_bigquery,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::Bigquery,
            prefix: "bigquery_",
            fallback: "BigQuery",
            discriminator: bigquery_table,
        }),
        follow_up: FollowUp::None,
    },
    Rule {
        name: "microsoft-suite",
        provider: "microsoft",
        matches_type: is_microsoft,
        matches_credential: is_microsoft_credential,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::Microsoft,
            prefix: "microsoft_",
            fallback: "Microsoft",
            discriminator: microsoft_service,
        }),
        follow_up: FollowUp::None,
    },
    Rule {
        name: "google-suite",
        provider: "google",
        matches_type: is_google,
        matches_credential: is_google_credential,
        credential_triggers: true,
        source: Some(SourceSpec {
            category: Category::Google,
            prefix: "google_",
            fallback: "Google",
            discriminator: google_document,
        }),
        follow_up: FollowUp::None,
    },
];

/// Parameter chain naming the stored function of a relational `call` node.
pub const RPC_FUNCTION_KEYS: &[&str] = &["function", "functionName", "rpc", "rpcName"];

/// Discriminator used when an RPC operation names no function.
pub const RPC_FALLBACK: &str = "rpc";

// ---------------------------------------------------------------------------
// Type predicates (input is already lower-cased)
// ---------------------------------------------------------------------------

fn is_openai(kind: &str) -> bool {
    kind.contains("openai")
}

fn is_vector_store(kind: &str) -> bool {
    kind.contains("vectorstoresupabase")
}

fn is_relational(kind: &str) -> bool {
    kind.contains("supabase") && !kind.contains("vectorstore")
}

fn is_http(kind: &str) -> bool {
    kind.contains("httprequest")
}

fn is_notion(kind: &str) -> bool {
    kind.contains("notion")
}

fn is_bigquery(kind: &str) -> bool {
    kind.contains("bigquery")
}

fn is_microsoft(kind: &str) -> bool {
    kind.contains("microsoft")
}

fn is_google(kind: &str) -> bool {
    (kind.contains("google") || kind.contains("gmail")) && !kind.contains("bigquery")
}

// ---------------------------------------------------------------------------
// Credential predicates (input is the lower-cased credential key)
// ---------------------------------------------------------------------------

fn is_openai_credential(key: &str) -> bool {
    key == "openaiapi"
}

fn is_supabase_credential(key: &str) -> bool {
    key == "supabaseapi"
}

fn is_notion_credential(key: &str) -> bool {
    key.starts_with("notion")
}

fn is_microsoft_credential(key: &str) -> bool {
    key.starts_with("microsoft")
}

fn is_google_credential(key: &str) -> bool {
    (key.starts_with("google") || key.starts_with("gmail")) && !key.contains("bigquery")
}

const fn never(_: &str) -> bool {
    false
}

// ---------------------------------------------------------------------------
// Discriminators
// ---------------------------------------------------------------------------

fn openai_model(node: &NodeRecord) -> Option<String> {
    resolve(&node.parameters, &["modelId", "model"])
}

fn vector_table(node: &NodeRecord) -> Option<String> {
    resolve(&node.parameters, &["tableName", "table"])
}

fn relational_table(node: &NodeRecord) -> Option<String> {
    resolve(&node.parameters, &["tableId", "tableName", "table"])
}

fn notion_target(node: &NodeRecord) -> Option<String> {
    resolve(&node.parameters, &["databaseId", "pageId", "blockId", "resource"])
}

fn bigquery_table(node: &NodeRecord) -> Option<String> {
    resolve(&node.parameters, &["tableId", "datasetId", "projectId"])
}

/// The Microsoft service is the node type itself (`microsoftOutlook`,
/// `microsoftExcel`); credential-only matches fall back to `resource`.
fn microsoft_service(node: &NodeRecord) -> Option<String> {
    let suffix = node.kind.rsplit('.').next().unwrap_or_default();
    if suffix.to_ascii_lowercase().contains("microsoft") {
        return Some(suffix.to_string());
    }
    resolve(&node.parameters, &["resource"])
}

fn google_document(node: &NodeRecord) -> Option<String> {
    resolve(
        &node.parameters,
        &["documentId", "sheetName", "fileId", "folderId", "calendar"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(name: &str) -> &'static Rule {
        RULES
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no rule named {name}"))
    }

    #[test]
    fn table_order_is_fixed() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "openai",
                "vector-store",
                "relational-table",
                "http-generic",
                "document-store",
                "analytical-table",
                "microsoft-suite",
                "google-suite",
            ]
        );
    }

    #[test]
    fn vector_store_does_not_fire_the_relational_type_test() {
        let kind = "@n8n/n8n-nodes-langchain.vectorstoresupabase";
        assert!(is_vector_store(kind));
        assert!(!is_relational(kind));
        assert!(is_relational("n8n-nodes-base.supabase"));
    }

    #[test]
    fn bigquery_is_not_a_google_document() {
        assert!(is_bigquery("n8n-nodes-base.googlebigquery"));
        assert!(!is_google("n8n-nodes-base.googlebigquery"));
        assert!(is_google("n8n-nodes-base.googlesheets"));
        assert!(is_google("n8n-nodes-base.gmail"));
        assert!(!is_google_credential("googlebigqueryoauth2api"));
        assert!(is_google_credential("googlesheetsoauth2api"));
    }

    #[test]
    fn credential_alone_fires_a_rule() {
        let node = NodeRecord::new("n8n-nodes-base.httpRequest")
            .with_credential("microsoftOAuth2Api", json!({"name": "Tenant"}));
        let ms = rule("microsoft-suite");
        assert!(ms.fires("n8n-nodes-base.httprequest", &node));
        assert_eq!(ms.credential(&node).map(|(k, _)| k), Some("microsoftOAuth2Api"));
    }

    #[test]
    fn vector_store_credential_does_not_trigger_on_its_own() {
        let node = NodeRecord::new("n8n-nodes-base.httpRequest")
            .with_credential("supabaseApi", json!({"name": "Prod"}));
        assert!(!rule("vector-store").fires("n8n-nodes-base.httprequest", &node));
        assert!(rule("relational-table").fires("n8n-nodes-base.httprequest", &node));
    }

    #[test]
    fn microsoft_service_comes_from_the_type_suffix() {
        let node = NodeRecord::new("n8n-nodes-base.microsoftOutlook");
        assert_eq!(microsoft_service(&node).as_deref(), Some("microsoftOutlook"));

        let generic = NodeRecord::new("n8n-nodes-base.httpRequest")
            .with_parameter("resource", json!("drive"));
        assert_eq!(microsoft_service(&generic).as_deref(), Some("drive"));
    }
}
