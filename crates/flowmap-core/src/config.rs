use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::model::Group;

/// Default payload file name, matching what the n8n exporter writes.
pub const DEFAULT_INPUT: &str = "n8n_data.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Payload path, relative to the project root.
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Groups that start expanded. Everything else starts collapsed.
    #[serde(default)]
    pub expanded: Vec<Group>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    /// Absolute (or root-joined) payload path after CLI overrides.
    pub input_path: PathBuf,
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".flowmap/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("flowmap/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project config, user config and the `--input` override.
///
/// Input precedence: `cli_input` > `FLOWMAP_INPUT` env > `[input] path` >
/// [`DEFAULT_INPUT`]. Relative paths resolve against `project_root`.
pub fn resolve_config(project_root: &Path, cli_input: Option<&Path>) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_input = env::var_os("FLOWMAP_INPUT").map(PathBuf::from);
    let input_path = resolve_input(project_root, cli_input, env_input, &project.input.path);

    Ok(EffectiveConfig {
        project,
        user,
        input_path,
    })
}

fn resolve_input(
    project_root: &Path,
    cli_input: Option<&Path>,
    env_input: Option<PathBuf>,
    configured: &Path,
) -> PathBuf {
    let chosen = cli_input
        .map(Path::to_path_buf)
        .or(env_input)
        .unwrap_or_else(|| configured.to_path_buf());

    if chosen.is_absolute() {
        chosen
    } else {
        project_root.join(chosen)
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}
