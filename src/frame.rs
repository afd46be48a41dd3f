use serde::Serialize;
use std::fmt;

use crate::error::Error;

/// Identifies a column by position and header text. Header rows may repeat a
/// label, so the position is what keeps two columns apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ColumnKey {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {:?}", self.index, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<String>,
}

/// Rectangular, column-oriented view of a parsed table. Rows keep their
/// source order and every column has the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularFrame {
    columns: Vec<Column>,
}

impl TabularFrame {
    /// Build a frame from a header row and row-major data.
    ///
    /// Short rows are padded with empty cells; a row wider than the header
    /// cannot be placed under any column and is rejected.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, Error> {
        if headers.is_empty() {
            return Err(Error::MalformedTable("header row has no cells".into()));
        }
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                cells: Vec::with_capacity(rows.len()),
            })
            .collect();

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(Error::MalformedTable(format!(
                    "row {} has {} cells but the header has {}",
                    r + 1,
                    row.len(),
                    width
                )));
            }
            let mut cells = row.into_iter();
            for col in columns.iter_mut() {
                col.cells.push(cells.next().unwrap_or_default());
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn keys(&self) -> impl Iterator<Item = ColumnKey> + '_ {
        self.columns.iter().enumerate().map(|(index, c)| ColumnKey {
            index,
            name: c.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn transposes_rows_into_columns() {
        let frame = TabularFrame::from_rows(
            s(&["Rank", "Name"]),
            vec![s(&["1", "Ann"]), s(&["2", "Bea"])],
        )
        .unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.columns()[1].cells, s(&["Ann", "Bea"]));
    }

    #[test]
    fn pads_short_rows() {
        let frame =
            TabularFrame::from_rows(s(&["A", "B", "C"]), vec![s(&["1"]), s(&["2", "x", "y"])])
                .unwrap();
        assert_eq!(frame.columns()[2].cells, s(&["", "y"]));
    }

    #[test]
    fn rejects_wide_rows() {
        let err = TabularFrame::from_rows(s(&["A"]), vec![s(&["1", "2"])]).unwrap_err();
        assert!(matches!(err, Error::MalformedTable(_)));
    }

    #[test]
    fn keeps_duplicate_headers_apart() {
        let frame =
            TabularFrame::from_rows(s(&["Mark", "Mark"]), vec![s(&["1", "2"])]).unwrap();
        let keys: Vec<ColumnKey> = frame.keys().collect();
        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert_eq!(keys[0].name, keys[1].name);
    }
}
