//! Application configuration for nbdeploy.
//!
//! A project config lives at `./nbdeploy.toml`; a user-wide fallback lives at
//! `~/.nbdeploy/nbdeploy.toml`. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NbDeployError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "nbdeploy.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".nbdeploy";

// ---------------------------------------------------------------------------
// Config structs (matching nbdeploy.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// External notebook renderer.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Aggregate index settings.
    #[serde(default)]
    pub toc: TocConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `{year}-*.ipynb` notebooks.
    #[serde(default = "default_notebooks_dir")]
    pub notebooks_dir: PathBuf,

    /// Directory receiving `{year}-*.html` documents.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            notebooks_dir: default_notebooks_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_notebooks_dir() -> PathBuf {
    PathBuf::from("notebooks")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("docs/_posts")
}

/// `[converter]` section.
///
/// The invocation is `{program} {args...} --to {format} --output-dir <dir> <inputs...>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Executable to run.
    #[serde(default = "default_program")]
    pub program: String,

    /// Leading arguments (the subcommand for `jupyter`).
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Output format selector passed to `--to`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            format: default_format(),
        }
    }
}

fn default_program() -> String {
    "jupyter".into()
}
fn default_args() -> Vec<String> {
    vec!["nbconvert".into()]
}
fn default_format() -> String {
    "html".into()
}

/// Rendering of the aggregate index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocFormat {
    /// `<h2>` headers with `<ul>` link lists.
    #[default]
    Html,
    /// `## year` headers with `* [name](href)` bullets.
    Markdown,
}

/// `[toc]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    /// Directory whose `*/*.html` files are indexed.
    #[serde(default = "default_toc_root")]
    pub root: PathBuf,

    /// Index file name, relative to `root`.
    #[serde(default = "default_toc_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub format: TocFormat,

    /// Optional template file containing a `{TOC}` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            root: default_toc_root(),
            output: default_toc_output(),
            format: TocFormat::default(),
            template: None,
        }
    }
}

impl TocConfig {
    /// Full path of the index file.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}

fn default_toc_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_toc_output() -> PathBuf {
    PathBuf::from("toc.html")
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.nbdeploy/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NbDeployError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.nbdeploy/nbdeploy.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the user config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Resolve the effective config.
///
/// An explicit path must exist. Otherwise `nbdeploy.toml` in `project_dir`
/// wins over the user config, which wins over defaults.
pub fn resolve_config(explicit: Option<&Path>, project_dir: &Path) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let project = project_dir.join(CONFIG_FILE_NAME);
    if project.is_file() {
        tracing::debug!(path = ?project, "using project config");
        return load_config_from(&project);
    }

    load_config()
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NbDeployError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NbDeployError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| NbDeployError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NbDeployError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NbDeployError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
