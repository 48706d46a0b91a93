//! End-to-end `update_html` task: year → prune stale output → convert → index.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument};

use nbdeploy_shared::{NbDeployError, Result, TocConfig, Year};

use crate::convert::Converter;
use crate::files;
use crate::toc::{self, TocReport};

/// Configuration for the `update_html` task.
#[derive(Debug, Clone)]
pub struct UpdateHtmlConfig {
    /// Year to rebuild. Defaults to the current year when the task runs.
    pub year: Option<Year>,
    /// Directory holding `{year}-*.ipynb` notebooks.
    pub notebooks_dir: PathBuf,
    /// Directory receiving `{year}-*.html` documents.
    pub output_dir: PathBuf,
    /// Only compute what would be removed and converted.
    pub dry_run: bool,
    /// Rebuild the aggregate index after converting.
    pub rebuild_toc: Option<TocConfig>,
}

/// Files selected for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub year: Year,
    /// Previously generated documents for the year.
    pub stale: Vec<PathBuf>,
    /// Notebooks to convert.
    pub sources: Vec<PathBuf>,
}

/// Result of the `update_html` task.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateHtmlReport {
    pub year: Year,
    /// Documents deleted before conversion (would-be deletions on a dry run).
    pub removed: Vec<PathBuf>,
    /// Notebooks handed to the converter.
    pub sources: Vec<PathBuf>,
    /// Documents present for the year after conversion.
    pub generated: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc: Option<TocReport>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

/// Progress callback for reporting task status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for each stale document deleted.
    fn removed(&self, path: &std::path::Path);
    /// Called right before the converter runs.
    fn converting(&self, count: usize);
    /// Called when the task completes.
    fn done(&self, report: &UpdateHtmlReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn removed(&self, _path: &std::path::Path) {}
    fn converting(&self, _count: usize) {}
    fn done(&self, _report: &UpdateHtmlReport) {}
}

/// Enumerate stale documents and source notebooks for `year`.
pub fn plan(config: &UpdateHtmlConfig, year: Year) -> Result<BuildPlan> {
    let stale = files::matching_files(&config.output_dir, &year.generated_pattern())?;
    let sources = files::matching_files(&config.notebooks_dir, &year.notebook_pattern())?;
    Ok(BuildPlan {
        year,
        stale,
        sources,
    })
}

/// Run the `update_html` task.
///
/// 1. Resolve the year (current year when absent)
/// 2. Delete every `{year}-*.html` in the output directory
/// 3. Convert every `{year}-*.ipynb` in one converter invocation
/// 4. Optionally rebuild the aggregate index
///
/// Any failure aborts the remaining steps; nothing is rolled back.
#[instrument(skip_all, fields(output = %config.output_dir.display(), dry_run = config.dry_run))]
pub fn update_html(
    config: &UpdateHtmlConfig,
    converter: &dyn Converter,
    progress: &dyn ProgressReporter,
) -> Result<UpdateHtmlReport> {
    let start = Instant::now();
    let year = Year::or_current(config.year.clone());

    progress.phase("Scanning notebooks");
    let plan = plan(config, year)?;

    info!(
        year = %plan.year,
        stale = plan.stale.len(),
        sources = plan.sources.len(),
        "build plan computed"
    );

    if config.dry_run {
        let report = UpdateHtmlReport {
            year: plan.year,
            removed: plan.stale,
            sources: plan.sources,
            generated: Vec::new(),
            toc: None,
            dry_run: true,
            elapsed: start.elapsed(),
        };
        progress.done(&report);
        return Ok(report);
    }

    // --- Remove stale output ---
    progress.phase("Removing stale documents");
    let removed = files::remove_files(&plan.stale)?;
    for path in &removed {
        progress.removed(path);
    }

    // --- Convert ---
    if plan.sources.is_empty() {
        info!(year = %plan.year, "no notebooks for year, nothing to convert");
    } else {
        std::fs::create_dir_all(&config.output_dir)
            .map_err(|e| NbDeployError::io(&config.output_dir, e))?;

        progress.phase("Converting notebooks");
        progress.converting(plan.sources.len());
        converter
            .convert(&plan.sources, &config.output_dir)?
            .into_result(converter.name())?;
    }

    let generated = files::matching_files(&config.output_dir, &plan.year.generated_pattern())?;

    // --- Index ---
    let toc = match &config.rebuild_toc {
        Some(toc_config) => {
            progress.phase("Rebuilding index");
            Some(toc::write_index(toc_config)?)
        }
        None => None,
    };

    let report = UpdateHtmlReport {
        year: plan.year,
        removed,
        sources: plan.sources,
        generated,
        toc,
        dry_run: false,
        elapsed: start.elapsed(),
    };

    info!(
        year = %report.year,
        removed = report.removed.len(),
        generated = report.generated.len(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "update_html complete"
    );
    progress.done(&report);

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
