//! `flowmap graph`: the visible dependency graph.
//!
//! JSON output is the renderer contract: `{ "nodes": [...], "links": [...] }`.
//! Text output is one tab-separated line per node and per link.

use std::io::Write;

use clap::Args;
use flowmap_view::Projection;

use crate::cmd::{Context, ViewArgs, open_session};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `flowmap graph`.
#[derive(Args, Debug, Default)]
pub struct GraphArgs {
    #[command(flatten)]
    pub view: ViewArgs,
}

/// Execute `flowmap graph`.
///
/// # Errors
///
/// Returns an error if the payload cannot be loaded, a group name is
/// unknown, or output rendering fails.
pub fn run_graph(args: &GraphArgs, ctx: &Context) -> anyhow::Result<()> {
    let toggles = args.view.toggles(ctx)?;
    let session = open_session(ctx, toggles)?;
    render_mode(
        ctx.output,
        session.projection(),
        render_graph_text,
        render_graph_pretty,
    )
}

fn render_graph_text(p: &Projection, w: &mut dyn Write) -> std::io::Result<()> {
    for node in &p.nodes {
        writeln!(w, "node\t{}\t{}\t{}", node.id, node.category, node.label)?;
    }
    for link in &p.links {
        writeln!(w, "link\t{}\t{}\t{}", link.source, link.target, link.kind)?;
    }
    Ok(())
}

fn render_graph_pretty(p: &Projection, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Visible graph")?;
    pretty_kv(w, "Nodes", p.nodes.len().to_string())?;
    pretty_kv(w, "Links", p.links.len().to_string())?;
    pretty_kv(w, "Entities", p.represented_count().to_string())?;
    writeln!(w)?;

    pretty_section(w, "Nodes")?;
    for node in &p.nodes {
        let marker = if node.is_group { "▸" } else { " " };
        writeln!(w, "{marker} {:<36} {}", node.id, node.label)?;
    }

    if !p.links.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Links")?;
        for link in &p.links {
            writeln!(w, "  {} → {}  ({})", link.source, link.target, link.kind)?;
        }
    }
    Ok(())
}
