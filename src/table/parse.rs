use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument};

use super::CleanTable;
use crate::{error::Error, frame::TabularFrame};

const MAX_SPAN: usize = 1000;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("table selector"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Turn a cleaned table into a frame; the first row supplies the headers.
#[instrument(level = "debug", skip(table), fields(table = table.index))]
pub fn parse(table: CleanTable) -> Result<TabularFrame, Error> {
    let doc = Html::parse_fragment(&table.html);
    let root = doc
        .select(&TABLE)
        .next()
        .ok_or_else(|| Error::MalformedTable("fragment holds no <table>".into()))?;

    let mut grid = expand_spans(&table_rows(root));
    if grid.is_empty() {
        return Err(Error::MalformedTable("table has no rows".into()));
    }
    let headers = grid.remove(0);
    debug!(columns = headers.len(), rows = grid.len(), "parsed table grid");
    TabularFrame::from_rows(headers, grid)
}

/// Rows owned by this table; rows of nested tables are left out.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn row_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "td" | "th"))
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// A cell still covering rows below the one it was declared in.
struct Carry {
    text: String,
    rows_left: usize,
}

/// Lay the rows out on a grid, copying spanned cells into every position
/// they cover.
fn expand_spans(rows: &[ElementRef<'_>]) -> Vec<Vec<String>> {
    let mut grid = Vec::with_capacity(rows.len());
    let mut carried: Vec<Option<Carry>> = Vec::new();

    for row in rows {
        let mut cells = row_cells(*row).peekable();
        if cells.peek().is_none() {
            continue;
        }

        let mut out: Vec<String> = Vec::new();
        for cell in cells {
            fill_carried(&mut out, &mut carried);
            let text = cell_text(cell);
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");
            for _ in 0..colspan {
                let col = out.len();
                if rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize_with(col + 1, || None);
                    }
                    carried[col] = Some(Carry {
                        text: text.clone(),
                        rows_left: rowspan - 1,
                    });
                }
                out.push(text.clone());
            }
        }
        place_trailing_carried(&mut out, &mut carried);
        grid.push(out);
    }
    grid
}

/// Copy carried cells into `out` while the next free position is covered.
fn fill_carried(out: &mut Vec<String>, carried: &mut [Option<Carry>]) {
    while let Some(slot) = carried.get_mut(out.len()) {
        let Some(carry) = slot.as_mut() else { break };
        out.push(carry.text.clone());
        carry.rows_left -= 1;
        if carry.rows_left == 0 {
            *slot = None;
        }
    }
}

/// After the row's own cells, put every remaining carried cell at its column,
/// padding uncovered positions before it with empty cells.
fn place_trailing_carried(out: &mut Vec<String>, carried: &mut [Option<Carry>]) {
    let Some(last) = carried.iter().rposition(Option::is_some) else {
        return;
    };
    while out.len() <= last {
        let slot = &mut carried[out.len()];
        match slot.as_mut() {
            Some(carry) => {
                out.push(carry.text.clone());
                carry.rows_left -= 1;
                if carry.rows_left == 0 {
                    *slot = None;
                }
            }
            None => out.push(String::new()),
        }
    }
}

/// Displayed text of a cell with whitespace runs collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(cell, &mut raw);
    WHITESPACE.replace_all(&raw, " ").trim().to_string()
}

fn push_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_hidden(child) {
                        push_visible_text(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn is_hidden(el: ElementRef<'_>) -> bool {
    el.value().attr("style").is_some_and(|style| {
        style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase()
            .contains("display:none")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(html: &str) -> CleanTable {
        CleanTable {
            index: 0,
            html: html.to_string(),
        }
    }

    fn cells(frame: &TabularFrame, col: usize) -> Vec<&str> {
        frame.columns()[col]
            .cells
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn first_row_becomes_headers() {
        let frame = parse(clean(
            r#"<table class="wikitable">
                <tr><th>Rank</th><th>Athlete</th></tr>
                <tr><td>1</td><td>Ann  Smith</td></tr>
                <tr><td>2</td><td>
                    Bea Jones </td></tr>
            </table>"#,
        ))
        .unwrap();
        let names: Vec<&str> = frame.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rank", "Athlete"]);
        assert_eq!(cells(&frame, 0), vec!["1", "2"]);
        assert_eq!(cells(&frame, 1), vec!["Ann Smith", "Bea Jones"]);
    }

    #[test]
    fn reads_thead_and_tbody() {
        let frame = parse(clean(
            r#"<table><thead><tr><th>A</th></tr></thead>
               <tbody><tr><td>x</td></tr></tbody>
               <tfoot><tr><td>y</td></tr></tfoot></table>"#,
        ))
        .unwrap();
        assert_eq!(cells(&frame, 0), vec!["x", "y"]);
    }

    #[test]
    fn expands_colspan_and_rowspan() {
        let frame = parse(clean(
            r#"<table>
                <tr><th>Year</th><th>Mark</th><th>Venue</th></tr>
                <tr><td rowspan="2">1990</td><td>2.01</td><td>Rome</td></tr>
                <tr><td>2.02</td><td>Oslo</td></tr>
                <tr><td colspan="2">n/a</td><td>Paris</td></tr>
            </table>"#,
        ))
        .unwrap();
        assert_eq!(cells(&frame, 0), vec!["1990", "1990", "n/a"]);
        assert_eq!(cells(&frame, 1), vec!["2.01", "2.02", "n/a"]);
        assert_eq!(cells(&frame, 2), vec!["Rome", "Oslo", "Paris"]);
    }

    #[test]
    fn rowspan_survives_short_rows() {
        let frame = parse(clean(
            r#"<table>
                <tr><th>A</th><th>B</th><th>C</th></tr>
                <tr><td>1</td><td>2</td><td rowspan="2">S</td></tr>
                <tr><td>3</td></tr>
            </table>"#,
        ))
        .unwrap();
        assert_eq!(cells(&frame, 0), vec!["1", "3"]);
        assert_eq!(cells(&frame, 1), vec!["2", ""]);
        assert_eq!(cells(&frame, 2), vec!["S", "S"]);
    }

    #[test]
    fn rowspan_in_middle_column() {
        let frame = parse(clean(
            r#"<table>
                <tr><th>A</th><th>B</th><th>C</th></tr>
                <tr><td>1</td><td rowspan="3">shared</td><td>x</td></tr>
                <tr><td>2</td><td>y</td></tr>
                <tr><td>3</td><td>z</td></tr>
            </table>"#,
        ))
        .unwrap();
        assert_eq!(cells(&frame, 1), vec!["shared", "shared", "shared"]);
        assert_eq!(cells(&frame, 2), vec!["x", "y", "z"]);
    }

    #[test]
    fn skips_hidden_sort_keys() {
        let frame = parse(clean(
            r#"<table><tr><th>Date</th></tr>
               <tr><td><span style="display: none">1990-01-01</span>1 January 1990</td></tr>
               </table>"#,
        ))
        .unwrap();
        assert_eq!(cells(&frame, 0), vec!["1 January 1990"]);
    }

    #[test]
    fn ignores_nested_table_rows() {
        let frame = parse(clean(
            r#"<table><tr><th>A</th></tr>
               <tr><td>outer<table><tr><td>inner</td></tr></table></td></tr></table>"#,
        ))
        .unwrap();
        assert_eq!(frame.row_count(), 1);
    }

    #[test]
    fn wide_rows_are_malformed() {
        let err = parse(clean(
            r#"<table><tr><th>A</th></tr><tr><td>1</td><td>2</td></tr></table>"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)));
    }

    #[test]
    fn empty_table_is_malformed() {
        let err = parse(clean("<table></table>")).unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)));
        let err = parse(clean("<p>no table</p>")).unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)));
    }
}
