pub mod completions;
pub mod graph;
pub mod impact;
pub mod report;
pub mod stats;

use std::path::Path;

use clap::Args;
use flowmap_core::config::{EffectiveConfig, resolve_config};
use flowmap_core::error::{ErrorCode, LoadError};
use flowmap_core::model::Group;
use flowmap_core::payload::Payload;
use flowmap_view::{Session, ToggleMap};
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error, resolve_output_mode};

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    pub config: EffectiveConfig,
    pub output: OutputMode,
}

impl Context {
    /// Load config and settle the output mode.
    ///
    /// # Errors
    ///
    /// Returns an error (after rendering it) if a config file is unreadable
    /// or malformed.
    pub fn resolve(
        project_root: &Path,
        cli_input: Option<&Path>,
        format_flag: Option<OutputMode>,
        json_flag: bool,
    ) -> anyhow::Result<Self> {
        match resolve_config(project_root, cli_input) {
            Ok(config) => {
                let output =
                    resolve_output_mode(format_flag, json_flag, config.user.output.as_deref());
                Ok(Self { config, output })
            }
            Err(err) => {
                let output = resolve_output_mode(format_flag, json_flag, None);
                render_error(
                    output,
                    &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
                )?;
                Err(err)
            }
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.config.input_path
    }
}

/// Collapse-state flags shared by commands that show the visible graph.
#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Expand a category group (repeatable), e.g. `--expand supabase`.
    #[arg(long = "expand", value_name = "GROUP")]
    pub expand: Vec<String>,

    /// Expand every group.
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,
}

impl ViewArgs {
    /// Initial toggle state: config `[view] expanded` plus `--expand` flags.
    ///
    /// # Errors
    ///
    /// Returns an error (after rendering it) for an unknown group name.
    pub fn toggles(&self, ctx: &Context) -> anyhow::Result<ToggleMap> {
        if self.expand_all {
            return Ok(ToggleMap::expanded());
        }

        let mut toggles: ToggleMap = ctx.config.project.view.expanded.iter().copied().collect();
        for name in &self.expand {
            match name.parse::<Group>() {
                Ok(group) => {
                    toggles.set(group, true);
                }
                Err(err) => {
                    render_error(
                        ctx.output,
                        &CliError::from_code(ErrorCode::UnknownGroup, err.to_string()),
                    )?;
                    anyhow::bail!("{err}");
                }
            }
        }
        Ok(toggles)
    }
}

/// Read the configured payload into a fresh session.
///
/// # Errors
///
/// Returns an error (after rendering it) if the payload is missing,
/// unreadable, or not a workflow bundle.
pub fn open_session(ctx: &Context, toggles: ToggleMap) -> anyhow::Result<Session> {
    let path = ctx.input_path();
    if !path.exists() {
        render_error(
            ctx.output,
            &CliError::from_code(
                ErrorCode::InputNotFound,
                format!("payload not found: {}", path.display()),
            ),
        )?;
        anyhow::bail!("payload not found: {}", path.display());
    }

    let payload = match Payload::from_path(path) {
        Ok(payload) => payload,
        Err(err) => {
            let code = err
                .downcast_ref::<LoadError>()
                .map_or(ErrorCode::InternalUnexpected, LoadError::error_code);
            render_error(ctx.output, &CliError::from_code(code, format!("{err:#}")))?;
            return Err(err);
        }
    };

    debug!(path = %path.display(), "opening session");
    let mut session = Session::new(toggles);
    session.load(&payload);
    Ok(session)
}

/// Render an `EntityNotFound` error and fail.
pub fn entity_not_found(ctx: &Context, id: &str) -> anyhow::Result<()> {
    render_error(
        ctx.output,
        &CliError::from_code(ErrorCode::EntityNotFound, format!("no entity with id '{id}'")),
    )?;
    anyhow::bail!("no entity with id '{id}'")
}
