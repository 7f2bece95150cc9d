//! Workflow → raw dependency graph extraction.
//!
//! # Overview
//!
//! [`extract`] walks every node of every workflow through the ordered
//! [`rules::RULES`] table and emits typed entities and edges:
//!
//! ```text
//! workflow ──uses──▶ source ──auth──▶ credential
//! workflow ──calls─▶ rpc function ──reads──▶ table
//! ```
//!
//! After the workflow pass, relational metadata (if any) is reconciled in
//! [`orphans`]: tables nobody references become orphan entities, and stored
//! functions gain `reads` edges to the tables they touch.
//!
//! ## Identity
//!
//! Entity ids are a pure function of category and discriminator. The first
//! insertion of an id fixes its label and category; later duplicates are
//! ignored, so re-running the extraction on the same input gives the same
//! entity list in the same order.

pub mod orphans;
pub mod params;
pub mod rules;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::model::workflow::credential_name;
use crate::model::{
    Category, EdgeKind, Entity, NodeRecord, RawEdge, RelationalMetadata, WorkflowRecord,
};
use crate::payload::Payload;
use rules::{FollowUp, RPC_FALLBACK, RPC_FUNCTION_KEYS, RULES, Rule, SourceSpec};

/// Stored-procedure path inside a REST URL (`.../rest/v1/rpc/recalc_totals`).
static RPC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/rpc/([A-Za-z_][A-Za-z0-9_]*)").expect("rpc path pattern is valid")
});

/// Label used for HTTP nodes whose URL yields no host.
const HTTP_FALLBACK: &str = "HTTP Request";

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// The raw entity and edge lists produced by one extraction.
///
/// Entities are unique by id and ordered by first insertion. Edges may
/// repeat; consumers deduplicate as they need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    pub edges: Vec<RawEdge>,
}

impl Extraction {
    /// Look up an entity by id.
    #[must_use]
    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Return `true` if no entity was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Extract a raw graph from a loaded payload.
#[must_use]
pub fn extract_payload(payload: &Payload) -> Extraction {
    extract(&payload.workflows, payload.supabase.as_ref())
}

/// Extract a raw graph from `workflows` and optional relational metadata.
///
/// Never fails: missing or malformed node fields degrade to fallback
/// labels and unrecognized node types contribute nothing.
#[must_use]
#[instrument(skip_all, fields(workflows = workflows.len()))]
pub fn extract(workflows: &[WorkflowRecord], metadata: Option<&RelationalMetadata>) -> Extraction {
    let mut builder = GraphBuilder::default();

    for (index, workflow) in workflows.iter().enumerate() {
        let workflow_id = workflow
            .id
            .clone()
            .unwrap_or_else(|| format!("workflow_{index}"));
        let label = workflow.name.clone().unwrap_or_else(|| workflow_id.clone());
        builder.ensure(Entity::new(&workflow_id, label, Category::Workflow));

        for node in &workflow.nodes {
            classify_node(&mut builder, &workflow_id, node);
        }
    }

    // Must run after the workflow pass so referenced tables keep their
    // non-orphan category.
    if let Some(meta) = metadata {
        orphans::reconcile(&mut builder, meta);
    }

    let extraction = builder.finish();
    debug!(
        entities = extraction.entities.len(),
        edges = extraction.edges.len(),
        "extraction complete"
    );
    extraction
}

/// Run one node through the rule table.
fn classify_node(builder: &mut GraphBuilder, workflow_id: &str, node: &NodeRecord) {
    let kind = node.kind.to_ascii_lowercase();
    let mut fired = false;
    let mut produced = false;

    for rule in RULES {
        if !rule.fires(&kind, node) {
            continue;
        }
        fired = true;
        trace!(rule = rule.name, node = node.name.as_deref(), "rule fired");

        if let Some(spec) = &rule.source {
            let source_id = emit_source(builder, workflow_id, spec, node);
            if let Some((_, credential)) = rule.credential(node) {
                emit_credential(builder, &source_id, rule, credential);
            }
            produced = true;
        }

        let function = match rule.follow_up {
            FollowUp::None => None,
            FollowUp::TableRpc => table_rpc_function(node),
            FollowUp::HttpRpc => http_rpc_function(node),
        };
        if let Some(function) = function {
            emit_rpc_call(builder, workflow_id, &function);
            produced = true;
        }
    }

    // Catch-all: an HTTP call that no marker explains is still a dependency.
    if !produced && kind.contains("httprequest") {
        let host = http_host(node);
        let id = format!("http_{host}");
        builder.ensure(Entity::new(&id, host, Category::Other));
        builder.link(workflow_id, &id, EdgeKind::Uses);
        fired = true;
    }

    if !fired {
        trace!(kind = node.kind.as_str(), "no marker matched node type");
    }
}

fn emit_source(
    builder: &mut GraphBuilder,
    workflow_id: &str,
    spec: &SourceSpec,
    node: &NodeRecord,
) -> String {
    let discriminator =
        (spec.discriminator)(node).unwrap_or_else(|| spec.fallback.to_string());
    let id = format!("{}{discriminator}", spec.prefix);
    builder.ensure(Entity::new(&id, discriminator, spec.category));
    builder.link(workflow_id, &id, EdgeKind::Uses);
    id
}

fn emit_credential(
    builder: &mut GraphBuilder,
    source_id: &str,
    rule: &Rule,
    credential: &serde_json::Value,
) {
    let name = credential_name(credential).unwrap_or_else(|| {
        rule.source
            .as_ref()
            .map_or(rule.provider, |spec| spec.fallback)
            .to_string()
    });
    let id = format!("cred_{}_{name}", rule.provider);
    builder.ensure(Entity::new(&id, name, Category::Credential).with_subtype(rule.provider));
    builder.link(source_id, &id, EdgeKind::Auth);
}

fn emit_rpc_call(builder: &mut GraphBuilder, workflow_id: &str, function: &str) {
    let id = rpc_id(function);
    builder.ensure(Entity::new(&id, function, Category::RpcFunction));
    builder.link(workflow_id, &id, EdgeKind::Calls);
}

/// Function called by a relational node whose operation is `call`/`rpc`.
fn table_rpc_function(node: &NodeRecord) -> Option<String> {
    let operation = params::resolve(&node.parameters, &["operation"])?;
    if !matches!(operation.to_ascii_lowercase().as_str(), "call" | "rpc") {
        return None;
    }
    Some(
        params::resolve(&node.parameters, RPC_FUNCTION_KEYS)
            .unwrap_or_else(|| RPC_FALLBACK.to_string()),
    )
}

/// Function named by a `/rpc/<name>` segment of an HTTP node's URL.
fn http_rpc_function(node: &NodeRecord) -> Option<String> {
    let url = params::resolve(&node.parameters, &["url"])?;
    rpc_function_in_url(&url)
}

/// Extract the stored-function name from a REST URL, if it has one.
#[must_use]
pub fn rpc_function_in_url(url: &str) -> Option<String> {
    RPC_PATH
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn http_host(node: &NodeRecord) -> String {
    params::resolve(&node.parameters, &["url"])
        .and_then(|raw| url::Url::parse(static_url_prefix(&raw)).ok())
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| HTTP_FALLBACK.to_string())
}

/// Literal part of a URL parameter: n8n marks expressions with a leading
/// `=` and interpolates `{{ ... }}` blocks at run time.
fn static_url_prefix(raw: &str) -> &str {
    let url = raw.strip_prefix('=').unwrap_or(raw).trim_start();
    url.find("{{").map_or(url, |at| &url[..at])
}

pub(crate) fn rpc_id(function: &str) -> String {
    format!("rpc_{function}")
}

pub(crate) fn table_id(table: &str) -> String {
    format!("supabase_{table}")
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Insertion-ordered entity set plus the raw edge list.
#[derive(Debug, Default)]
pub(crate) struct GraphBuilder {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    edges: Vec<RawEdge>,
}

impl GraphBuilder {
    /// Insert `entity` unless its id already exists. Returns `true` if inserted.
    ///
    /// The first writer wins: a later entity with the same id never changes
    /// the stored label or category.
    pub(crate) fn ensure(&mut self, entity: Entity) -> bool {
        if let Some(&pos) = self.index.get(&entity.id) {
            let existing = &self.entities[pos];
            if existing.category != entity.category {
                warn!(
                    id = entity.id.as_str(),
                    kept = %existing.category,
                    dropped = %entity.category,
                    "entity id reused across categories; keeping first"
                );
            }
            return false;
        }
        self.index.insert(entity.id.clone(), self.entities.len());
        self.entities.push(entity);
        true
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Append an edge. Self-loops are never materialized.
    pub(crate) fn link(&mut self, source: &str, target: &str, kind: EdgeKind) {
        if source == target {
            trace!(id = source, %kind, "dropping self-loop");
            return;
        }
        self.edges.push(RawEdge::new(source, target, kind));
    }

    pub(crate) fn finish(self) -> Extraction {
        Extraction {
            entities: self.entities,
            edges: self.edges,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workflow(id: &str, nodes: Vec<NodeRecord>) -> WorkflowRecord {
        WorkflowRecord {
            id: Some(id.to_string()),
            name: Some(format!("Workflow {id}")),
            nodes,
        }
    }

    fn ids(extraction: &Extraction) -> Vec<&str> {
        extraction.entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn rpc_url_pattern() {
        assert_eq!(
            rpc_function_in_url("https://x.supabase.co/rest/v1/rpc/recalc_totals").as_deref(),
            Some("recalc_totals")
        );
        assert_eq!(
            rpc_function_in_url("https://x/rest/v1/rpc/fn_2?select=*").as_deref(),
            Some("fn_2")
        );
        assert_eq!(rpc_function_in_url("https://x/rest/v1/orders"), None);
        assert_eq!(rpc_function_in_url("https://x/rpc/"), None);
    }

    #[test]
    fn openai_node_with_credential() {
        let node = NodeRecord::new("@n8n/n8n-nodes-langchain.lmChatOpenAi")
            .with_parameter("model", json!("gpt-4o"))
            .with_credential("openAiApi", json!({"id": "1", "name": "Main"}));
        let out = extract(&[workflow("w1", vec![node])], None);

        assert_eq!(ids(&out), ["w1", "openai_gpt-4o", "cred_openai_Main"]);
        let cred = out.entity("cred_openai_Main").unwrap();
        assert_eq!(cred.category, Category::Credential);
        assert_eq!(cred.subtype.as_deref(), Some("openai"));
        assert_eq!(
            out.edges,
            [
                RawEdge::new("w1", "openai_gpt-4o", EdgeKind::Uses),
                RawEdge::new("openai_gpt-4o", "cred_openai_Main", EdgeKind::Auth),
            ]
        );
    }

    #[test]
    fn missing_parameters_fall_back_to_literal_labels() {
        let nodes = vec![
            NodeRecord::new("n8n-nodes-base.supabase"),
            NodeRecord::new("n8n-nodes-base.notion"),
            NodeRecord::new("n8n-nodes-base.openAi"),
        ];
        let out = extract(&[workflow("w1", nodes)], None);

        assert_eq!(
            ids(&out),
            ["w1", "supabase_Supabase", "notion_Notion", "openai_OpenAI"]
        );
        assert_eq!(out.entity("supabase_Supabase").unwrap().label, "Supabase");
    }

    #[test]
    fn credential_without_name_uses_provider_fallback() {
        let node = NodeRecord::new("n8n-nodes-base.supabase")
            .with_parameter("tableId", json!("orders"))
            .with_credential("supabaseApi", json!({}));
        let out = extract(&[workflow("w1", vec![node])], None);
        assert!(out.entity("cred_supabase_Supabase").is_some());
    }

    #[test]
    fn table_rpc_operation_emits_calls_edge() {
        let node = NodeRecord::new("n8n-nodes-base.supabase")
            .with_parameter("operation", json!("rpc"))
            .with_parameter("function", json!("close_month"))
            .with_parameter("tableId", json!("ledger"));
        let out = extract(&[workflow("w1", vec![node])], None);

        assert!(out.entity("supabase_ledger").is_some());
        assert_eq!(
            out.entity("rpc_close_month").unwrap().category,
            Category::RpcFunction
        );
        assert!(out
            .edges
            .contains(&RawEdge::new("w1", "rpc_close_month", EdgeKind::Calls)));
    }

    #[test]
    fn table_rpc_without_function_name_degrades() {
        let node = NodeRecord::new("n8n-nodes-base.supabase").with_parameter("operation", json!("call"));
        let out = extract(&[workflow("w1", vec![node])], None);
        assert!(out.entity("rpc_rpc").is_some());
    }

    #[test]
    fn http_node_with_microsoft_credential_is_classified_by_credential() {
        let node = NodeRecord::new("n8n-nodes-base.httpRequest")
            .with_parameter("url", json!("https://graph.microsoft.com/v1.0/me"))
            .with_credential("microsoftOAuth2Api", json!({"name": "Tenant"}));
        let out = extract(&[workflow("w1", vec![node])], None);

        assert_eq!(ids(&out), ["w1", "microsoft_Microsoft", "cred_microsoft_Tenant"]);
        assert!(out.entity("http_graph.microsoft.com").is_none());
    }

    #[test]
    fn plain_http_node_falls_into_other() {
        let nodes = vec![
            NodeRecord::new("n8n-nodes-base.httpRequest")
                .with_parameter("url", json!("https://api.stripe.com/v1/charges")),
            NodeRecord::new("n8n-nodes-base.httpRequest")
                .with_parameter("url", json!("={{ $json.callback }}")),
        ];
        let out = extract(&[workflow("w1", nodes)], None);

        let stripe = out.entity("http_api.stripe.com").unwrap();
        assert_eq!(stripe.category, Category::Other);
        assert_eq!(stripe.label, "api.stripe.com");
        assert!(out.entity("http_HTTP Request").is_some());
    }

    #[test]
    fn expression_urls_keep_their_static_host() {
        let nodes = vec![
            NodeRecord::new("n8n-nodes-base.httpRequest").with_parameter(
                "url",
                json!("=https://api.stripe.com/v1/charges/{{ $json.id }}"),
            ),
            NodeRecord::new("n8n-nodes-base.httpRequest").with_parameter(
                "url",
                json!("=https://hooks.slack.com/services/{{ $json.t }}"),
            ),
        ];
        let out = extract(&[workflow("w1", nodes)], None);

        assert_eq!(ids(&out), ["w1", "http_api.stripe.com", "http_hooks.slack.com"]);
        assert!(out.entity("http_HTTP Request").is_none());
    }

    #[test]
    fn static_url_prefix_strips_expression_markers() {
        assert_eq!(
            static_url_prefix("=https://x.io/a/{{ $json.id }}"),
            "https://x.io/a/"
        );
        assert_eq!(static_url_prefix("https://x.io/a"), "https://x.io/a");
        assert_eq!(static_url_prefix("={{ $json.callback }}"), "");
    }

    #[test]
    fn http_rpc_node_does_not_add_a_host_entity() {
        let node = NodeRecord::new("n8n-nodes-base.httpRequest")
            .with_parameter("url", json!("https://x.supabase.co/rest/v1/rpc/recalc_totals"));
        let out = extract(&[workflow("w1", vec![node])], None);
        assert_eq!(ids(&out), ["w1", "rpc_recalc_totals"]);
    }

    #[test]
    fn unrecognized_types_contribute_nothing() {
        let nodes = vec![
            NodeRecord::new("n8n-nodes-base.set"),
            NodeRecord::new("n8n-nodes-base.if"),
            NodeRecord::default(),
        ];
        let out = extract(&[workflow("w1", nodes)], None);
        assert_eq!(ids(&out), ["w1"]);
        assert!(out.edges.is_empty());
    }

    #[test]
    fn workflow_without_id_gets_positional_id() {
        let wf = WorkflowRecord {
            id: None,
            name: None,
            nodes: vec![NodeRecord::new("n8n-nodes-base.notion")],
        };
        let out = extract(&[workflow("w0", vec![]), wf], None);
        let entity = out.entity("workflow_1").unwrap();
        assert_eq!(entity.label, "workflow_1");
        assert!(out
            .edges
            .contains(&RawEdge::new("workflow_1", "notion_Notion", EdgeKind::Uses)));
    }

    #[test]
    fn first_writer_fixes_label_and_category() {
        // A workflow whose id collides with a source id keeps its workflow category.
        let node = NodeRecord::new("n8n-nodes-base.supabase").with_parameter("tableId", json!("orders"));
        let out = extract(
            &[
                workflow("supabase_orders", vec![]),
                workflow("w2", vec![node]),
            ],
            None,
        );
        let entity = out.entity("supabase_orders").unwrap();
        assert_eq!(entity.category, Category::Workflow);
        assert_eq!(out.entities.len(), 2);
    }

    #[test]
    fn self_loops_are_never_materialized() {
        // Workflow id equal to the source id it references.
        let node = NodeRecord::new("n8n-nodes-base.supabase").with_parameter("tableId", json!("orders"));
        let out = extract(&[workflow("supabase_orders", vec![node])], None);
        assert!(out.edges.iter().all(|e| e.source != e.target));
    }

    #[test]
    fn repeated_references_duplicate_raw_edges_but_not_entities() {
        let node = NodeRecord::new("n8n-nodes-base.supabase").with_parameter("tableId", json!("orders"));
        let out = extract(&[workflow("w1", vec![node.clone(), node])], None);
        assert_eq!(ids(&out), ["w1", "supabase_orders"]);
        assert_eq!(out.edges.len(), 2);
    }
}
