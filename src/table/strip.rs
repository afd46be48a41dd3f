use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::trace;

use super::{CleanTable, RawTable};

static CELL_SUPERSCRIPTS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr > td sup, tr > th sup").expect("CSS selector for cell superscripts")
});

/// Drop every `<sup>` subtree found inside a table cell. Citation markers
/// such as `[1]` live there and would otherwise leak into numeric values.
pub fn strip(table: RawTable) -> CleanTable {
    let mut doc = Html::parse_fragment(&table.html);
    let doomed: Vec<_> = doc.select(&CELL_SUPERSCRIPTS).map(|el| el.id()).collect();

    if doomed.is_empty() {
        return CleanTable {
            index: table.index,
            html: table.html,
        };
    }

    trace!(table = table.index, count = doomed.len(), "removing superscripts");
    for id in doomed {
        // a sup nested in another sup is already gone with its parent; detach is a no-op then
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    CleanTable {
        index: table.index,
        html: doc.root_element().inner_html(),
    }
}
