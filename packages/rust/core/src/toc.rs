//! Aggregate index builder.
//!
//! Scans `<root>/<year>/*.html` and writes a single page linking every
//! generated document, grouped by year directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use maud::html;
use serde::Serialize;
use tracing::{debug, info, instrument};

use nbdeploy_shared::{
    GENERATED_EXTENSION, NbDeployError, Result, TableOfContents, TocConfig, TocFormat, TocLink,
    TocSection,
};

use crate::files;

/// Placeholder replaced by the rendered index in a template file.
pub const TEMPLATE_PLACEHOLDER: &str = "{TOC}";

/// Summary of a written index.
#[derive(Debug, Clone, Serialize)]
pub struct TocReport {
    /// File that was (over)written.
    pub path: PathBuf,
    pub sections: usize,
    pub links: usize,
}

/// Collect every `*/*.html` file under `root` into a table of contents.
///
/// Years (the first path segment) are ordered descending. Within a year,
/// links are ordered by file name descending, so year-prefixed documents
/// list the most recent first.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn build_index(root: &Path) -> Result<TableOfContents> {
    let documents = files::matching_files(root, &format!("*/*.{GENERATED_EXTENSION}"))?;

    let mut by_year: BTreeMap<String, Vec<TocLink>> = BTreeMap::new();
    for document in &documents {
        let Some((year, title)) = year_and_title(document) else {
            debug!(path = %document.display(), "skipping unnamed document");
            continue;
        };
        by_year.entry(year.clone()).or_default().push(TocLink {
            href: format!("{year}/{title}"),
            title,
        });
    }

    let sections: Vec<TocSection> = by_year
        .into_iter()
        .rev()
        .map(|(year, mut links)| {
            links.sort_by(|a, b| b.title.cmp(&a.title));
            TocSection { year, links }
        })
        .collect();

    let toc = TableOfContents { sections };
    debug!(
        sections = toc.sections.len(),
        links = toc.link_count(),
        "index built"
    );
    Ok(toc)
}

/// Render as HTML: one `<h2>` per year followed by a list of links.
pub fn render_html(toc: &TableOfContents) -> String {
    let mut out = String::new();
    for section in &toc.sections {
        let markup = html! {
            h2 { (section.year) }
            ul {
                @for link in &section.links {
                    li { a href=(link.href) { (link.title) } }
                }
            }
        };
        out.push_str(&markup.into_string());
        out.push('\n');
    }
    out
}

/// Render as Markdown: `## year` headers with bullet links.
pub fn render_markdown(toc: &TableOfContents) -> String {
    let mut lines = Vec::new();
    for section in &toc.sections {
        lines.push(format!("## {}", section.year));
        lines.push(String::new());
        for link in &section.links {
            lines.push(format!(
                "* [{}]({})",
                escape_link_text(&link.title),
                escape_link_target(&link.href)
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Substitute the rendered index into a template.
pub fn apply_template(template: &str, rendered: &str) -> String {
    template.replace(TEMPLATE_PLACEHOLDER, rendered)
}

/// Build, render, and write the index described by `config`, replacing any
/// previous version.
#[instrument(skip_all, fields(root = %config.root.display()))]
pub fn write_index(config: &TocConfig) -> Result<TocReport> {
    let toc = build_index(&config.root)?;

    let rendered = match config.format {
        TocFormat::Html => render_html(&toc),
        TocFormat::Markdown => render_markdown(&toc),
    };

    let content = match &config.template {
        Some(template_path) => {
            let template = std::fs::read_to_string(template_path)
                .map_err(|e| NbDeployError::io(template_path, e))?;
            apply_template(&template, &rendered)
        }
        None => rendered,
    };

    let path = config.output_path();
    files::write_atomic(&path, &content)?;

    info!(
        path = %path.display(),
        sections = toc.sections.len(),
        links = toc.link_count(),
        "index written"
    );

    Ok(TocReport {
        path,
        sections: toc.sections.len(),
        links: toc.link_count(),
    })
}

/// Backslash-escape characters that would end or nest Markdown link text.
fn escape_link_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Percent-encode characters that would end a Markdown link target.
fn escape_link_target(href: &str) -> String {
    let mut out = String::with_capacity(href.len());
    for c in href.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(c),
        }
    }
    out
}

/// Split `<...>/<year>/<file>` into its last two segments.
fn year_and_title(path: &Path) -> Option<(String, String)> {
    let title = path.file_name()?.to_str()?.to_string();
    let year = path.parent()?.file_name()?.to_str()?.to_string();
    Some((year, title))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
