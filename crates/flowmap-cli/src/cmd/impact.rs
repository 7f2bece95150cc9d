//! `flowmap impact <id>`: what depends on an entity.
//!
//! Upstream workflows and credential consumers come from the raw graph.
//! The neighborhood is taken from the visible graph under the current
//! collapse flags, so it matches what a renderer would highlight.

use std::io::Write;

use clap::Args;
use flowmap_core::model::{Category, Entity};
use flowmap_view::impact;
use flowmap_view::report::EntityRef;
use serde::Serialize;

use crate::cmd::{Context, ViewArgs, entity_not_found, open_session};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `flowmap impact`.
#[derive(Args, Debug)]
pub struct ImpactArgs {
    /// Raw entity id, e.g. `supabase_orders` or `cred_supabase_Prod`.
    pub id: String,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Serialize)]
pub struct ImpactReport {
    pub entity: Entity,
    pub upstream_workflows: Vec<EntityRef>,
    /// Sources the entity authenticates, for credentials.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumers: Vec<EntityRef>,
    /// Direct dependencies, for workflows.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<EntityRef>,
    pub visible_id: String,
    pub neighbors: Vec<String>,
}

/// Execute `flowmap impact`.
///
/// # Errors
///
/// Returns an error if the payload cannot be loaded, the entity does not
/// exist, or output rendering fails.
pub fn run_impact(args: &ImpactArgs, ctx: &Context) -> anyhow::Result<()> {
    let toggles = args.view.toggles(ctx)?;
    let session = open_session(ctx, toggles)?;
    let raw = session.raw();

    let Some(entity) = raw.entity(&args.id) else {
        return entity_not_found(ctx, &args.id);
    };

    let visible_id = session
        .projection()
        .visible_id(&entity.id)
        .unwrap_or(&entity.id)
        .to_string();

    let report = ImpactReport {
        entity: entity.clone(),
        upstream_workflows: refs(&session.upstream_workflows(&entity.id)),
        consumers: if entity.category == Category::Credential {
            refs(&impact::credential_consumers(raw, &entity.id))
        } else {
            Vec::new()
        },
        dependencies: if entity.category == Category::Workflow {
            refs(&impact::dependencies(raw, &entity.id))
        } else {
            Vec::new()
        },
        neighbors: session
            .neighbors(&visible_id)
            .into_iter()
            .filter(|id| *id != visible_id)
            .collect(),
        visible_id,
    };

    render_mode(ctx.output, &report, render_impact_text, render_impact_pretty)
}

fn refs(entities: &[&Entity]) -> Vec<EntityRef> {
    entities.iter().map(|&e| EntityRef::from(e)).collect()
}

fn render_impact_text(report: &ImpactReport, w: &mut dyn Write) -> std::io::Result<()> {
    for wf in &report.upstream_workflows {
        writeln!(w, "upstream\t{}\t{}", wf.id, wf.label)?;
    }
    for source in &report.consumers {
        writeln!(w, "consumer\t{}\t{}", source.id, source.label)?;
    }
    for dep in &report.dependencies {
        writeln!(w, "dependency\t{}\t{}", dep.id, dep.label)?;
    }
    for id in &report.neighbors {
        writeln!(w, "neighbor\t{id}")?;
    }
    Ok(())
}

fn render_impact_pretty(report: &ImpactReport, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Impact of {}", report.entity.id))?;
    pretty_kv(w, "Label", &report.entity.label)?;
    pretty_kv(w, "Category", report.entity.category.as_str())?;
    if report.visible_id != report.entity.id {
        pretty_kv(w, "Shown as", &report.visible_id)?;
    }

    list(w, "Upstream workflows", &report.upstream_workflows)?;
    if !report.consumers.is_empty() {
        list(w, "Authenticates", &report.consumers)?;
    }
    if !report.dependencies.is_empty() {
        list(w, "Depends on", &report.dependencies)?;
    }

    writeln!(w)?;
    pretty_section(w, "Visible neighbors")?;
    if report.neighbors.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for id in &report.neighbors {
        writeln!(w, "  {id}")?;
    }
    Ok(())
}

fn list(w: &mut dyn Write, heading: &str, items: &[EntityRef]) -> std::io::Result<()> {
    writeln!(w)?;
    pretty_section(w, heading)?;
    if items.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for item in items {
        writeln!(w, "  {:<36} {}", item.id, item.label)?;
    }
    Ok(())
}
