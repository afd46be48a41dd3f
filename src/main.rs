use anyhow::Result;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use wikiplot::{pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) configuration ────────────────────────────────────────────
    let cfg = Config::load(env::args().skip(1))?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!(url = %cfg.source_url, out = %cfg.output_dir.display(), "startup");

    // ─── 3) fetch, extract, classify, plot ───────────────────────────
    let report = pipeline::run(&cfg).await?;

    for skipped in &report.skipped {
        warn!(table = skipped.index, error = %skipped.error, "table skipped");
    }
    info!(
        tables = report.tables_found,
        charts = report.charts.len(),
        skipped = report.skipped_count(),
        "all done"
    );
    Ok(())
}
