pub mod svg;

pub use svg::SvgLineChart;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::frame::ColumnKey;

/// One numeric column, ready to be drawn against its row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub key: ColumnKey,
    pub values: Vec<Option<f64>>,
}

impl ChartSpec {
    pub fn title(&self) -> String {
        format!("Plot of {}", self.key.name)
    }
}

/// Draws a chart and writes it to `output_path`.
pub trait ChartRenderer: Send + Sync {
    /// File extension of the images this renderer writes.
    fn extension(&self) -> &str;

    fn render(&self, chart: &ChartSpec, output_path: &Path) -> Result<()>;
}

/// `<dir>/output_plot_<name>.<ext>`. Two columns with the same name share a
/// file and the later one wins.
pub fn chart_path(output_dir: &Path, column_name: &str, extension: &str) -> PathBuf {
    output_dir.join(format!(
        "output_plot_{}.{}",
        sanitize_file_stem(column_name),
        extension
    ))
}

fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "column".to_string()
    } else {
        stem
    }
}
