use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use super::RawTable;
use crate::error::Error;

// Class selectors match on tokens, so "wikitable sortable" is picked up too.
static WIKITABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.wikitable").expect("CSS selector for wikitables"));

/// Every wikitable on the page, in document order.
pub fn locate(html: &str) -> Result<Vec<RawTable>, Error> {
    let doc = Html::parse_document(html);
    let tables: Vec<RawTable> = doc
        .select(&WIKITABLE)
        .enumerate()
        .map(|(index, el)| RawTable {
            index,
            html: el.html(),
        })
        .collect();

    if tables.is_empty() {
        return Err(Error::NoTablesFound);
    }
    debug!(count = tables.len(), "located wikitables");
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tables_in_document_order() {
        let html = r#"<html><body>
            <table class="wikitable"><tr><th>first</th></tr></table>
            <table class="infobox"><tr><th>skip</th></tr></table>
            <table class="wikitable sortable"><tr><th>second</th></tr></table>
            </body></html>"#;
        let tables = locate(html).unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables[0].html.contains("first"));
        assert!(tables[1].html.contains("second"));
        assert_eq!(tables[1].index, 1);
        assert!(tables.iter().all(|t| !t.html.contains("skip")));
    }

    #[test]
    fn page_without_wikitables_fails() {
        let html = r#"<html><body><table class="infobox"><tr><td>1</td></tr></table>
            <p>wikitable mentioned in text</p></body></html>"#;
        assert!(matches!(locate(html), Err(Error::NoTablesFound)));
    }

    #[test]
    fn empty_page_fails() {
        assert!(matches!(locate(""), Err(Error::NoTablesFound)));
    }
}
