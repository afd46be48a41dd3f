// src/pipeline.rs

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{error, info, instrument, warn};

use crate::{
    classify::{heuristic_for, Classification, Classifier, ColumnKind},
    config::Config,
    error::Error,
    fetch,
    frame::TabularFrame,
    render::{chart_path, ChartRenderer, SvgLineChart},
    table::{self, RawTable},
};

pub const SUMMARY_FILE: &str = "summary.yaml";

/// A table that was parsed and has at least one numeric column.
#[derive(Debug, Clone)]
pub struct TableAnalysis {
    pub index: usize,
    pub frame: TabularFrame,
    pub classification: Classification,
}

/// A table left out of the output, and why.
#[derive(Debug)]
pub struct SkippedTable {
    pub index: usize,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    pub tables_found: usize,
    pub analysed: Vec<TableAnalysis>,
    pub skipped: Vec<SkippedTable>,
    /// Every chart file written, in rendering order. A path shows up twice
    /// when two tables share a numeric column name.
    pub charts: Vec<PathBuf>,
    pub render_failures: usize,
}

impl PipelineReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Locate → strip → parse → classify for one table.
#[instrument(level = "debug", skip(raw, classifier), fields(table = raw.index))]
pub fn analyse_table(raw: RawTable, classifier: &Classifier) -> Result<TableAnalysis, Error> {
    let index = raw.index;
    let clean = table::strip(raw);
    let frame = table::parse(clean)?;
    let classification = classifier.classify(&frame)?;
    Ok(TableAnalysis {
        index,
        frame,
        classification,
    })
}

pub struct Pipeline<R = SvgLineChart> {
    classifier: Classifier,
    renderer: R,
    output_dir: PathBuf,
    parallel: bool,
    write_summary: bool,
}

impl Pipeline<SvgLineChart> {
    pub fn from_config(cfg: &Config) -> Self {
        Pipeline {
            classifier: Classifier::default().with_heuristic(heuristic_for(cfg.date_heuristic)),
            renderer: SvgLineChart,
            output_dir: cfg.output_dir.clone(),
            parallel: cfg.parallel,
            write_summary: cfg.write_summary,
        }
    }
}

impl<R: ChartRenderer> Pipeline<R> {
    pub fn new(classifier: Classifier, renderer: R, output_dir: impl Into<PathBuf>) -> Self {
        Pipeline {
            classifier,
            renderer,
            output_dir: output_dir.into(),
            parallel: false,
            write_summary: false,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn write_summary(mut self, write_summary: bool) -> Self {
        self.write_summary = write_summary;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run every wikitable on the page through the pipeline and render its
    /// numeric columns. Only a page without wikitables is an error; tables
    /// that fail are reported and skipped.
    #[instrument(level = "info", skip(self, html), fields(bytes = html.len()))]
    pub fn process_html(&self, html: &str) -> Result<PipelineReport, Error> {
        let raws = table::locate(html)?;
        let mut report = PipelineReport {
            tables_found: raws.len(),
            ..Default::default()
        };
        info!(tables = raws.len(), "found wikitables");

        let results: Vec<(usize, Result<TableAnalysis, Error>)> = if self.parallel {
            raws.into_par_iter()
                .map(|raw| (raw.index, analyse_table(raw, &self.classifier)))
                .collect()
        } else {
            raws.into_iter()
                .map(|raw| (raw.index, analyse_table(raw, &self.classifier)))
                .collect()
        };

        for (index, result) in results {
            match result {
                Ok(analysis) => report.analysed.push(analysis),
                Err(e) if !e.is_table_local() => return Err(e),
                Err(e) => {
                    warn!(table = index, error = %e, "skipping table");
                    report.skipped.push(SkippedTable { index, error: e });
                }
            }
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))?;

        for analysis in &report.analysed {
            for chart in analysis.classification.chart_specs() {
                let path = chart_path(&self.output_dir, &chart.key.name, self.renderer.extension());
                match self.renderer.render(&chart, &path) {
                    Ok(()) => report.charts.push(path),
                    Err(e) => {
                        error!(table = analysis.index, column = %chart.key, error = %e, "render failed");
                        report.render_failures += 1;
                    }
                }
            }
        }

        if self.write_summary {
            let path = self.output_dir.join(SUMMARY_FILE);
            write_summary(&path, &report)?;
        }

        info!(
            charts = report.charts.len(),
            skipped = report.skipped_count(),
            render_failures = report.render_failures,
            "page processed"
        );
        Ok(report)
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    tables_found: usize,
    tables: Vec<TableSummary<'a>>,
    skipped: Vec<SkippedSummary>,
}

#[derive(Serialize)]
struct TableSummary<'a> {
    index: usize,
    rows: usize,
    columns: Vec<ColumnSummary<'a>>,
}

#[derive(Serialize)]
struct ColumnSummary<'a> {
    index: usize,
    name: &'a str,
    kind: ColumnKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<usize>,
}

#[derive(Serialize)]
struct SkippedSummary {
    index: usize,
    error: String,
}

fn write_summary(path: &Path, report: &PipelineReport) -> Result<(), Error> {
    let summary = Summary {
        tables_found: report.tables_found,
        tables: report
            .analysed
            .iter()
            .map(|a| TableSummary {
                index: a.index,
                rows: a.frame.row_count(),
                columns: a
                    .classification
                    .iter()
                    .map(|(key, class)| ColumnSummary {
                        index: key.index,
                        name: &key.name,
                        kind: class.kind(),
                        missing: class
                            .numeric_values()
                            .map(|v| v.iter().filter(|x| x.is_none()).count()),
                    })
                    .collect(),
            })
            .collect(),
        skipped: report
            .skipped
            .iter()
            .map(|s| SkippedSummary {
                index: s.index,
                error: s.error.to_string(),
            })
            .collect(),
    };
    let yaml = serde_yaml::to_string(&summary)?;
    fs::write(path, yaml).map_err(|e| Error::io(path, e))
}

/// Fetch the configured page and run it through the pipeline.
pub async fn run(cfg: &Config) -> Result<PipelineReport> {
    let client = fetch::build_client(cfg)?;
    let start = Instant::now();
    let html = fetch::fetch_page(&client, &cfg.source_url, fetch::RetryPolicy::from_config(cfg))
        .await?;
    info!(url = %cfg.source_url, bytes = html.len(), elapsed = ?start.elapsed(), "fetched page");

    // parsing and rendering are CPU-bound; keep them off the async workers
    let pipeline = Pipeline::from_config(cfg);
    let report = tokio::task::spawn_blocking(move || pipeline.process_html(&html))
        .await
        .context("pipeline task panicked")??;
    Ok(report)
}
