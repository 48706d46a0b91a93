//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use nbdeploy_core::convert::NbConvert;
use nbdeploy_core::pipeline::{ProgressReporter, UpdateHtmlConfig, UpdateHtmlReport};
use nbdeploy_shared::{AppConfig, TocConfig, TocFormat, Year, init_config, resolve_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// nbdeploy — publish notebooks as HTML documentation.
#[derive(Parser)]
#[command(
    name = "nbdeploy",
    version,
    about = "Render year-prefixed notebooks to HTML and publish them into the docs tree.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ./nbdeploy.toml, then ~/.nbdeploy/nbdeploy.toml).
    #[arg(long, global = true, env = "NBDEPLOY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Index output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum IndexFormat {
    Html,
    Markdown,
}

impl From<IndexFormat> for TocFormat {
    fn from(format: IndexFormat) -> Self {
        match format {
            IndexFormat::Html => TocFormat::Html,
            IndexFormat::Markdown => TocFormat::Markdown,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Replace the generated HTML documents for one year.
    #[command(alias = "update_html")]
    UpdateHtml {
        /// Year prefix to rebuild (defaults to the current year).
        #[arg(short, long)]
        year: Option<Year>,

        /// Notebook source directory (overrides config).
        #[arg(long)]
        notebooks_dir: Option<PathBuf>,

        /// Documentation output directory (overrides config).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Show what would be removed and converted without doing it.
        #[arg(long)]
        dry_run: bool,

        /// Rebuild the aggregate index afterwards. The index covers
        /// `<toc.root>/<year>/*.html` (one level deep), so point `[toc] root`
        /// at the directory holding the year folders; with the default root
        /// `.`, documents under `docs/_posts/` are not indexed.
        #[arg(long)]
        toc: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the aggregate index of generated documents.
    Toc {
        /// Directory whose `<year>/*.html` files are indexed.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Index file name, relative to the root.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Index format.
        #[arg(long)]
        format: Option<IndexFormat>,

        /// Template with a `{TOC}` placeholder.
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize the user config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nbdeploy=info",
        1 => "nbdeploy=debug",
        _ => "nbdeploy=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let cwd =
        std::env::current_dir().map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let config = resolve_config(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Command::UpdateHtml {
            year,
            notebooks_dir,
            output_dir,
            dry_run,
            toc,
            json,
        } => {
            let update = UpdateHtmlConfig {
                year,
                notebooks_dir: notebooks_dir.unwrap_or_else(|| config.paths.notebooks_dir.clone()),
                output_dir: output_dir.unwrap_or_else(|| config.paths.output_dir.clone()),
                dry_run,
                rebuild_toc: toc.then(|| config.toc.clone()),
            };
            cmd_update_html(&config, &update, json)
        }
        Command::Toc {
            root,
            output,
            format,
            template,
        } => {
            let defaults = config.toc.clone();
            let toc = TocConfig {
                root: root.unwrap_or(defaults.root),
                output: output.unwrap_or(defaults.output),
                format: format.map(TocFormat::from).unwrap_or(defaults.format),
                template: template.or(defaults.template),
            };
            cmd_toc(&toc)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_update_html(config: &AppConfig, update: &UpdateHtmlConfig, json: bool) -> Result<()> {
    info!(
        year = update.year.as_ref().map(Year::as_str).unwrap_or("current"),
        notebooks = %update.notebooks_dir.display(),
        output = %update.output_dir.display(),
        "updating html"
    );

    let converter = NbConvert::new(config.converter.clone());
    let reporter = CliProgress::new(!json);

    let report = nbdeploy_core::pipeline::update_html(update, &converter, &reporter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if report.dry_run {
        println!("  Dry run for {} (nothing changed)", report.year);
        print_paths("Would remove", &report.removed);
        print_paths("Would convert", &report.sources);
    } else {
        println!("  Documents for {} updated!", report.year);
        println!("  Removed:   {}", report.removed.len());
        println!("  Converted: {}", report.sources.len());
        println!("  Output:    {}", report.generated.len());
        if let Some(toc) = &report.toc {
            println!("  Index:     {} ({} links)", toc.path.display(), toc.links);
        }
    }
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn print_paths(label: &str, paths: &[PathBuf]) {
    println!("  {label}: {}", paths.len());
    for path in paths {
        println!("    {}", path.display());
    }
}

fn cmd_toc(toc: &TocConfig) -> Result<()> {
    let report = nbdeploy_core::toc::write_index(toc)?;
    println!(
        "Index written to {} ({} years, {} links)",
        report.path.display(),
        report.sections,
        report.links
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn removed(&self, path: &Path) {
        self.spinner.set_message(format!("Removed {}", path.display()));
    }

    fn converting(&self, count: usize) {
        self.spinner.set_message(format!("Converting {count} notebook(s)"));
    }

    fn done(&self, _report: &UpdateHtmlReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
