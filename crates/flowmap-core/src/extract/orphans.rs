//! Reconciliation against relational store metadata.
//!
//! Tables the store knows about but no workflow references become
//! `supabase-orphan-table` entities. Stored functions get an entity each and
//! a `reads` edge to every table they use, which is how tables reachable
//! only through functions show up in the graph.

use tracing::debug;

use super::{GraphBuilder, rpc_id, table_id};
use crate::model::{Category, EdgeKind, Entity, RelationalMetadata};

pub(crate) fn reconcile(builder: &mut GraphBuilder, meta: &RelationalMetadata) {
    let mut orphans = 0_usize;

    for table in &meta.tables {
        if ensure_table(builder, &table.name) {
            orphans += 1;
        }
    }

    for function in &meta.functions {
        let function_id = rpc_id(&function.name);
        builder.ensure(Entity::new(
            &function_id,
            &function.name,
            Category::RpcFunction,
        ));

        for table in &function.tables_used {
            if ensure_table(builder, table) {
                orphans += 1;
            }
            builder.link(&function_id, &table_id(table), EdgeKind::Reads);
        }
    }

    debug!(
        tables = meta.tables.len(),
        functions = meta.functions.len(),
        orphans,
        "relational metadata reconciled"
    );
}

/// Insert `name` as an orphan table unless it already exists.
/// Returns `true` when an orphan was created.
fn ensure_table(builder: &mut GraphBuilder, name: &str) -> bool {
    let id = table_id(name);
    if builder.contains(&id) {
        return false;
    }
    builder.ensure(Entity::new(id, name, Category::SupabaseOrphanTable))
}

#[cfg(test)]
mod tests {
    use crate::extract::extract;
    use crate::model::{
        Category, EdgeKind, NodeRecord, RawEdge, RelationalFunction, RelationalMetadata,
        RelationalTable, WorkflowRecord,
    };
    use serde_json::json;

    fn meta(tables: &[&str], functions: &[(&str, &[&str])]) -> RelationalMetadata {
        RelationalMetadata {
            tables: tables
                .iter()
                .map(|name| RelationalTable {
                    name: (*name).to_string(),
                })
                .collect(),
            functions: functions
                .iter()
                .map(|(name, used)| RelationalFunction {
                    name: (*name).to_string(),
                    tables_used: used.iter().map(|t| (*t).to_string()).collect(),
                })
                .collect(),
        }
    }

    fn workflow_using(table: &str) -> WorkflowRecord {
        WorkflowRecord {
            id: Some("w1".to_string()),
            name: Some("Orders".to_string()),
            nodes: vec![NodeRecord::new("n8n-nodes-base.supabase").with_parameter("tableId", json!(table))],
        }
    }

    #[test]
    fn referenced_tables_stay_referenced() {
        let out = extract(&[workflow_using("t1")], Some(&meta(&["t1", "t2"], &[])));

        assert_eq!(out.entity("supabase_t1").unwrap().category, Category::SupabaseTable);
        assert_eq!(
            out.entity("supabase_t2").unwrap().category,
            Category::SupabaseOrphanTable
        );
    }

    #[test]
    fn functions_read_their_tables() {
        let out = extract(
            &[workflow_using("orders")],
            Some(&meta(&["orders"], &[("recalc_totals", &["orders", "totals"])])),
        );

        assert_eq!(
            out.entity("rpc_recalc_totals").unwrap().category,
            Category::RpcFunction
        );
        // "totals" is only known through the function, so it is an orphan.
        assert_eq!(
            out.entity("supabase_totals").unwrap().category,
            Category::SupabaseOrphanTable
        );
        assert_eq!(out.entity("supabase_orders").unwrap().category, Category::SupabaseTable);
        assert!(out
            .edges
            .contains(&RawEdge::new("rpc_recalc_totals", "supabase_orders", EdgeKind::Reads)));
        assert!(out
            .edges
            .contains(&RawEdge::new("rpc_recalc_totals", "supabase_totals", EdgeKind::Reads)));
    }

    #[test]
    fn function_called_by_workflow_keeps_single_entity() {
        let wf = WorkflowRecord {
            id: Some("w1".to_string()),
            name: None,
            nodes: vec![NodeRecord::new("n8n-nodes-base.httpRequest")
                .with_parameter("url", json!("https://x/rest/v1/rpc/recalc_totals"))],
        };
        let out = extract(&[wf], Some(&meta(&[], &[("recalc_totals", &[])])));

        let rpc_count = out
            .entities
            .iter()
            .filter(|e| e.id == "rpc_recalc_totals")
            .count();
        assert_eq!(rpc_count, 1);
    }

    #[test]
    fn metadata_alone_produces_orphans() {
        let out = extract(&[], Some(&meta(&["a", "b"], &[])));
        assert_eq!(out.entities.len(), 2);
        assert!(out
            .entities
            .iter()
            .all(|e| e.category == Category::SupabaseOrphanTable));
        assert!(out.edges.is_empty());
    }
}
