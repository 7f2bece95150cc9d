//! `flowmap stats`: counts over the raw graph.

use std::io::Write;

use flowmap_core::model::{EdgeKind, Group};
use flowmap_view::{GraphStats, ToggleMap};

use crate::cmd::{Context, open_session};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Execute `flowmap stats`.
///
/// # Errors
///
/// Returns an error if the payload cannot be loaded or output rendering
/// fails.
pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let session = open_session(ctx, ToggleMap::default())?;
    render_mode(
        ctx.output,
        &session.stats(),
        render_stats_text,
        render_stats_pretty,
    )
}

fn render_stats_text(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "entities\t{}", stats.entity_count)?;
    writeln!(w, "edges\t{}", stats.edge_count)?;
    writeln!(w, "distinct_edges\t{}", stats.distinct_edge_count)?;
    for (group, count) in &stats.by_group {
        writeln!(w, "group.{group}\t{count}")?;
    }
    for (kind, count) in &stats.by_kind {
        writeln!(w, "kind.{kind}\t{count}")?;
    }
    writeln!(w, "orphan_tables\t{}", stats.orphan_table_count)?;
    writeln!(w, "function_only_tables\t{}", stats.function_only_tables.len())?;
    writeln!(w, "isolated\t{}", stats.isolated_entity_count)?;
    writeln!(w, "hash\t{}", stats.content_hash)
}

fn render_stats_pretty(stats: &GraphStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Graph stats")?;
    pretty_kv(w, "Entities", stats.entity_count.to_string())?;
    pretty_kv(
        w,
        "Edges",
        format!("{} ({} distinct)", stats.edge_count, stats.distinct_edge_count),
    )?;
    pretty_kv(w, "Orphans", stats.orphan_table_count.to_string())?;
    pretty_kv(w, "Isolated", stats.isolated_entity_count.to_string())?;
    pretty_kv(w, "Hash", &stats.content_hash)?;

    writeln!(w)?;
    pretty_section(w, "By group")?;
    for group in Group::ALL {
        let count = stats.group_count(group);
        if count > 0 {
            writeln!(w, "  {:<14} {count}", group.display_name())?;
        }
    }

    writeln!(w)?;
    pretty_section(w, "By edge kind")?;
    for kind in EdgeKind::ALL {
        writeln!(w, "  {:<14} {}", kind.as_str(), stats.kind_count(kind))?;
    }

    if !stats.function_only_tables.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Reachable only through functions")?;
        for id in &stats.function_only_tables {
            writeln!(w, "  {id}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowmap_core::extract::Extraction;
    use flowmap_core::model::{Category, Entity, RawEdge};
    use flowmap_view::RawGraph;

    fn stats() -> GraphStats {
        GraphStats::from_raw(&RawGraph::from_extraction(Extraction {
            entities: vec![
                Entity::new("w1", "W", Category::Workflow),
                Entity::new("supabase_a", "a", Category::SupabaseTable),
            ],
            edges: vec![RawEdge::new("w1", "supabase_a", EdgeKind::Uses)],
        }))
    }

    #[test]
    fn text_is_key_value_lines() {
        let mut buf = Vec::new();
        render_stats_text(&stats(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("entities\t2\nedges\t1\n"));
        assert!(text.contains("group.workflow\t1\n"));
        assert!(text.contains("group.supabase\t1\n"));
        assert!(text.contains("kind.uses\t1\n"));
        assert!(text.contains("hash\tblake3:"));
    }

    #[test]
    fn pretty_skips_empty_groups() {
        let mut buf = Vec::new();
        render_stats_pretty(&stats(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Workflows"));
        assert!(!text.contains("Notion"));
        assert!(!text.contains("Reachable only through functions"));
    }
}
