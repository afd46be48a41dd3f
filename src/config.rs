// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;
use url::Url;

pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/Women%27s_high_jump_world_record_progression";

/// Env var holding the path of an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "WIKIPLOT_CONFIG";
pub const SOURCE_URL_ENV: &str = "WIKIPLOT_URL";
pub const OUTPUT_DIR_ENV: &str = "WIKIPLOT_OUTPUT_DIR";

/// Which strategy decides whether a column holds dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateHeuristicKind {
    /// Only the first cell is looked at.
    #[default]
    FirstValue,
    /// More than half of the non-empty cells must parse.
    Majority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source_url: String,
    pub output_dir: PathBuf,
    /// Extra fetch attempts after the first one.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
    /// Analyse tables on the rayon pool.
    pub parallel: bool,
    pub date_heuristic: DateHeuristicKind,
    /// Write `summary.yaml` next to the charts.
    pub write_summary: bool,
    /// Used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_dir: PathBuf::from("output"),
            max_retries: 0,
            retry_backoff_ms: 500,
            timeout_secs: 30,
            parallel: false,
            date_heuristic: DateHeuristicKind::FirstValue,
            write_summary: true,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Config = serde_yaml::from_str(yaml).context("parsing YAML config")?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Defaults, then the YAML file named by `WIKIPLOT_CONFIG`, then the
    /// `WIKIPLOT_URL` / `WIKIPLOT_OUTPUT_DIR` env vars, then positional
    /// `[URL] [OUTPUT_DIR]` arguments.
    pub fn load<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cfg = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                debug!(%path, "loading config file");
                Self::from_file(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(url) = env::var(SOURCE_URL_ENV) {
            cfg.source_url = url;
        }
        if let Ok(dir) = env::var(OUTPUT_DIR_ENV) {
            cfg.output_dir = PathBuf::from(dir);
        }

        cfg.apply_args(args);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        if let Some(url) = args.next() {
            self.source_url = url;
        }
        if let Some(dir) = args.next() {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.source_url)
            .with_context(|| format!("invalid source url {:?}", self.source_url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("unsupported url scheme {:?}", other),
        }
        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("output_dir must not be empty");
        }
        Ok(())
    }
}
