#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "flowmap: dependency maps for n8n workflow exports",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workflow payload to read (default: `[input] path` or n8n_data.json).
    #[arg(short, long, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Views",
        about = "Show the visible dependency graph",
        long_about = "Extract the dependency graph from the payload and project it through the \
                      collapse state. Every category group starts collapsed unless expanded by \
                      config or flags.",
        after_help = "EXAMPLES:\n    # Fully collapsed overview\n    flowmap graph\n\n    # Open the Supabase group\n    flowmap graph --expand supabase\n\n    # Renderer input\n    flowmap graph --expand-all --format json"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(
        next_help_heading = "Views",
        about = "List sources and the workflows that use them",
        after_help = "EXAMPLES:\n    # Full report\n    flowmap report\n\n    # Only sources no workflow touches\n    flowmap report --orphans"
    )]
    Report(cmd::report::ReportArgs),

    #[command(
        next_help_heading = "Views",
        about = "Show what depends on an entity",
        after_help = "EXAMPLES:\n    # Workflows reading the orders table\n    flowmap impact supabase_orders\n\n    # Sources authenticated by a credential\n    flowmap impact cred_supabase_Prod --format json"
    )]
    Impact(cmd::impact::ImpactArgs),

    #[command(
        next_help_heading = "Views",
        about = "Show graph statistics",
        after_help = "EXAMPLES:\n    flowmap stats\n    flowmap stats --format text"
    )]
    Stats,

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    flowmap completions bash > /etc/bash_completion.d/flowmap"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FLOWMAP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "flowmap=debug,info"
        } else {
            "flowmap=info,warn"
        })
    });

    let format = env::var("FLOWMAP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let ctx = cmd::Context::resolve(&project_root, cli.input.as_deref(), cli.format, cli.json)?;
    debug!(input = %ctx.input_path().display(), output = ?ctx.output, "context resolved");

    match cli.command {
        Commands::Graph(ref args) => cmd::graph::run_graph(args, &ctx),
        Commands::Report(ref args) => cmd::report::run_report(args, &ctx),
        Commands::Impact(ref args) => cmd::impact::run_impact(args, &ctx),
        Commands::Stats => cmd::stats::run_stats(&ctx),
        Commands::Completions(_) => Ok(()),
    }
}
