use anyhow::{Context, Result};
use std::{fmt::Write as _, fs, path::Path};
use tracing::debug;

use super::{ChartRenderer, ChartSpec};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 6;
const MAX_X_TICKS: usize = 10;
const LINE_COLOR: &str = "#1f77b4";

/// Line-with-markers chart written as a standalone SVG document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgLineChart;

impl ChartRenderer for SvgLineChart {
    fn extension(&self) -> &str {
        "svg"
    }

    fn render(&self, chart: &ChartSpec, output_path: &Path) -> Result<()> {
        let doc = draw(chart)?;
        fs::write(output_path, doc)
            .with_context(|| format!("writing chart {}", output_path.display()))?;
        debug!(path = %output_path.display(), points = chart.values.len(), "wrote chart");
        Ok(())
    }
}

/// Maps data coordinates onto the plot area.
struct Frame {
    n: usize,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(values: &[Option<f64>]) -> Self {
        let present = values.iter().flatten().copied().filter(|v| v.is_finite());
        let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (lo, hi) = if lo > hi {
            (0.0, 1.0)
        } else if lo == hi {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        };
        let pad = (hi - lo) * 0.05;
        Self {
            n: values.len(),
            y_min: lo - pad,
            y_max: hi + pad,
        }
    }

    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, i: usize) -> f64 {
        if self.n <= 1 {
            MARGIN_LEFT + Self::plot_width() / 2.0
        } else {
            MARGIN_LEFT + Self::plot_width() * i as f64 / (self.n - 1) as f64
        }
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + Self::plot_height() * (self.y_max - v) / (self.y_max - self.y_min)
    }
}

fn draw(chart: &ChartSpec) -> Result<String> {
    let frame = Frame::new(&chart.values);
    let name = escape(&chart.key.name);
    let (left, top) = (MARGIN_LEFT, MARGIN_TOP);
    let (right, bottom) = (WIDTH - MARGIN_RIGHT, HEIGHT - MARGIN_BOTTOM);

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
        WIDTH / 2.0,
        escape(&chart.title())
    )?;

    // grid + y ticks
    for t in 0..Y_TICKS {
        let v = frame.y_min + (frame.y_max - frame.y_min) * t as f64 / (Y_TICKS - 1) as f64;
        let y = frame.y(v);
        writeln!(
            svg,
            r##"<line x1="{left}" y1="{y:.1}" x2="{right}" y2="{y:.1}" stroke="#dddddd"/>"##
        )?;
        writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
            left - 8.0,
            y + 4.0,
            format_tick(v)
        )?;
    }

    // x ticks
    let step = frame.n.div_ceil(MAX_X_TICKS).max(1);
    for i in (0..frame.n).step_by(step) {
        let x = frame.x(i);
        writeln!(
            svg,
            r##"<line x1="{x:.1}" y1="{top}" x2="{x:.1}" y2="{bottom}" stroke="#dddddd"/>"##
        )?;
        writeln!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="12">{i}</text>"#,
            bottom + 18.0
        )?;
    }

    // axes
    writeln!(
        svg,
        r#"<polyline points="{left},{top} {left},{bottom} {right},{bottom}" fill="none" stroke="black"/>"#
    )?;
    writeln!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">Index</text>"#,
        left + Frame::plot_width() / 2.0,
        HEIGHT - 15.0
    )?;
    let label_y = top + Frame::plot_height() / 2.0;
    writeln!(
        svg,
        r#"<text x="20" y="{label_y:.1}" text-anchor="middle" font-size="14" transform="rotate(-90 20 {label_y:.1})">{name}</text>"#
    )?;

    // a missing value breaks the line
    for run in runs(&chart.values) {
        if run.len() < 2 {
            continue;
        }
        let points: Vec<String> = run
            .iter()
            .map(|&(i, v)| format!("{:.1},{:.1}", frame.x(i), frame.y(v)))
            .collect();
        writeln!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{LINE_COLOR}" stroke-width="2"/>"#,
            points.join(" ")
        )?;
    }
    for (i, v) in present_points(&chart.values) {
        writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{LINE_COLOR}"/>"#,
            frame.x(i),
            frame.y(v)
        )?;
    }

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

fn present_points(values: &[Option<f64>]) -> impl Iterator<Item = (usize, f64)> + '_ {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i, v)))
}

/// Consecutive present values, split wherever one is missing.
fn runs(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v.filter(|v| v.is_finite()) {
            Some(v) => current.push((i, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn format_tick(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
