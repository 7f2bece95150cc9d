//! Collapse/expand scenarios driven through a `Session`.

use flowmap_core::model::{EdgeKind, Group};
use flowmap_core::payload::Payload;
use flowmap_view::{Session, ToggleMap, VisibleEdge};
use serde_json::json;

fn bundle() -> Payload {
    Payload::from_value(json!({
        "workflows": [
            {
                "id": "w1",
                "name": "Orders sync",
                "nodes": [
                    {"type": "n8n-nodes-base.supabase", "parameters": {"tableId": "orders"},
                     "credentials": {"supabaseApi": {"name": "Prod"}}},
                    {"type": "n8n-nodes-base.supabase", "parameters": {"tableId": "customers"},
                     "credentials": {"supabaseApi": {"name": "Prod"}}}
                ]
            },
            {
                "id": "w2",
                "name": "Nightly totals",
                "nodes": [
                    {"type": "n8n-nodes-base.httpRequest",
                     "parameters": {"url": "https://x/rest/v1/rpc/recalc_totals"}},
                    {"type": "n8n-nodes-base.supabase", "parameters": {"tableId": "orders"}}
                ]
            }
        ],
        "supabase": {
            "tables": [{"name": "orders"}, {"name": "customers"}, {"name": "audit_log"}],
            "functions": [{"name": "recalc_totals", "tables_used": ["orders"]}]
        }
    }))
    .expect("bundle")
}

fn link(source: &str, target: &str, kind: EdgeKind) -> VisibleEdge {
    VisibleEdge {
        source: source.to_string(),
        target: target.to_string(),
        kind,
    }
}

#[test]
fn collapsed_supabase_absorbs_tables_then_expand_redistributes() {
    let toggles: ToggleMap = [Group::Workflow, Group::Rpc, Group::Credential]
        .into_iter()
        .collect();
    let mut session = Session::new(toggles);
    session.load(&bundle());

    // Supabase collapsed: three tables (one orphan) behind one group node.
    let group = session
        .projection()
        .node("group_supabase")
        .expect("supabase group");
    assert_eq!(group.count, Some(3));
    assert_eq!(group.label, "Supabase (3)");

    // Both workflows point at the group once, even though w1 uses two tables.
    let links = &session.projection().links;
    assert_eq!(
        links
            .iter()
            .filter(|l| l.source == "w1" && l.target == "group_supabase")
            .count(),
        1
    );
    assert!(links.contains(&link("w2", "group_supabase", EdgeKind::Uses)));
    assert!(links.contains(&link("rpc_recalc_totals", "group_supabase", EdgeKind::Reads)));
    assert!(links.contains(&link("group_supabase", "cred_supabase_Prod", EdgeKind::Auth)));

    session.set_expanded(Group::Supabase, true);

    let projection = session.projection();
    assert!(projection.node("group_supabase").is_none());
    for id in ["supabase_orders", "supabase_customers", "supabase_audit_log"] {
        assert!(projection.node(id).is_some(), "{id} should be visible");
    }
    let links = &projection.links;
    assert!(links.contains(&link("w1", "supabase_orders", EdgeKind::Uses)));
    assert!(links.contains(&link("w1", "supabase_customers", EdgeKind::Uses)));
    assert!(links.contains(&link("w2", "supabase_orders", EdgeKind::Uses)));
    assert!(links.contains(&link("rpc_recalc_totals", "supabase_orders", EdgeKind::Reads)));
    assert!(links.contains(&link("supabase_customers", "cred_supabase_Prod", EdgeKind::Auth)));
    assert!(links.iter().all(|l| l.target != "supabase_audit_log"));
}

#[test]
fn collapsing_everything_leaves_only_groups() {
    let mut session = Session::new(ToggleMap::expanded());
    session.load(&bundle());
    let raw_count = session.raw().node_count();
    assert_eq!(session.projection().nodes.len(), raw_count);

    session.collapse_all();
    let projection = session.projection();
    assert!(projection.nodes.iter().all(|n| n.is_group));
    assert_eq!(projection.represented_count(), raw_count);
    assert!(projection.links.iter().all(|l| l.source != l.target));
}

#[test]
fn impact_is_independent_of_collapse_state() {
    let mut session = Session::new(ToggleMap::collapsed());
    session.load(&bundle());
    let collapsed: Vec<String> = session
        .upstream_workflows("supabase_orders")
        .into_iter()
        .map(|e| e.id.clone())
        .collect();

    session.expand_all();
    let expanded: Vec<String> = session
        .upstream_workflows("supabase_orders")
        .into_iter()
        .map(|e| e.id.clone())
        .collect();

    assert_eq!(collapsed, ["w1", "w2"]);
    assert_eq!(collapsed, expanded);
}
