//! `flowmap report`: which workflows depend on which sources.

use std::io::Write;

use clap::Args;
use flowmap_view::ToggleMap;
use flowmap_view::report::{EntityRef, ReportView};

use crate::cmd::{Context, open_session};
use crate::output::{pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `flowmap report`.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Only show sources no workflow references.
    #[arg(long)]
    pub orphans: bool,
}

/// Execute `flowmap report`.
///
/// # Errors
///
/// Returns an error if the payload cannot be loaded or output rendering
/// fails.
pub fn run_report(args: &ReportArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = open_session(ctx, ToggleMap::default())?;
    let mut report = session.report();
    if args.orphans {
        retain_orphans(&mut report);
    }
    render_mode(ctx.output, &report, render_report_text, render_report_pretty)
}

fn retain_orphans(report: &mut ReportView) {
    for section in &mut report.sections {
        section.sources.retain(|s| s.workflows.is_empty());
    }
    report.sections.retain(|s| !s.sources.is_empty());
}

fn labels(refs: &[EntityRef]) -> String {
    refs.iter()
        .map(|r| r.label.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_report_text(report: &ReportView, w: &mut dyn Write) -> std::io::Result<()> {
    for section in &report.sections {
        for source in &section.sources {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                section.group,
                source.id,
                source.workflows.len(),
                labels(&source.workflows)
            )?;
        }
    }
    Ok(())
}

fn render_report_pretty(report: &ReportView, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dependency report")?;
    if let Some(ts) = report.generated_at {
        pretty_kv(w, "Generated", ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())?;
    }
    pretty_kv(w, "Workflows", report.workflow_count.to_string())?;
    pretty_kv(w, "Sources", report.source_count().to_string())?;

    for section in &report.sections {
        writeln!(w)?;
        pretty_section(w, &format!("{} ({})", section.title, section.sources.len()))?;
        for source in &section.sources {
            let flag = if source.orphan { "  [orphan]" } else { "" };
            writeln!(w, "{}{flag}", source.label)?;
            if source.workflows.is_empty() {
                writeln!(w, "    used by:  (no workflow)")?;
            } else {
                writeln!(w, "    used by:  {}", labels(&source.workflows))?;
            }
            if !source.credentials.is_empty() {
                writeln!(w, "    auth:     {}", labels(&source.credentials))?;
            }
            if !source.read_by.is_empty() {
                writeln!(w, "    read by:  {}", labels(&source.read_by))?;
            }
        }
    }
    pretty_rule(w)
}
