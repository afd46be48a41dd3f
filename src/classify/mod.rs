pub mod coerce;
pub mod date;
pub mod heuristic;

pub use coerce::{CellCoercer, DecimalRunCoercer};
pub use heuristic::{heuristic_for, ColumnTypeHeuristic, FirstValueDate, MajorityDate};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::{
    error::Error,
    frame::{ColumnKey, TabularFrame},
    render::ChartSpec,
};

/// What a column was found to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnClass {
    Date,
    /// One entry per row; `None` where the cell held no number.
    Numeric(Vec<Option<f64>>),
    Other,
}

/// Short tag of a [`ColumnClass`], for logs and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Date,
    Numeric,
    Other,
}

impl ColumnClass {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnClass::Date => ColumnKind::Date,
            ColumnClass::Numeric(_) => ColumnKind::Numeric,
            ColumnClass::Other => ColumnKind::Other,
        }
    }

    pub fn numeric_values(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnClass::Numeric(values) => Some(values),
            _ => None,
        }
    }
}

/// Per-column verdicts for one frame, ordered by column position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    columns: BTreeMap<ColumnKey, ColumnClass>,
}

impl Classification {
    /// Look a column up by its header text; the first match wins.
    pub fn by_name(&self, name: &str) -> Option<&ColumnClass> {
        self.columns
            .iter()
            .find(|(k, _)| k.name == name)
            .map(|(_, class)| class)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &ColumnClass)> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn numeric(&self) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
        self.columns
            .iter()
            .filter_map(|(k, class)| class.numeric_values().map(|v| (k, v)))
    }

    pub fn numeric_count(&self) -> usize {
        self.numeric().count()
    }

    /// One chart per numeric column, in column order.
    pub fn chart_specs(&self) -> Vec<ChartSpec> {
        self.numeric()
            .map(|(key, values)| ChartSpec {
                key: key.clone(),
                values: values.to_vec(),
            })
            .collect()
    }
}

/// Column classifier with swappable date detection and number extraction.
pub struct Classifier {
    heuristic: Box<dyn ColumnTypeHeuristic>,
    coercer: Box<dyn CellCoercer>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Box::new(FirstValueDate), Box::new(DecimalRunCoercer))
    }
}

impl Classifier {
    pub fn new(heuristic: Box<dyn ColumnTypeHeuristic>, coercer: Box<dyn CellCoercer>) -> Self {
        Self { heuristic, coercer }
    }

    pub fn with_heuristic(mut self, heuristic: Box<dyn ColumnTypeHeuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_coercer(mut self, coercer: Box<dyn CellCoercer>) -> Self {
        self.coercer = coercer;
        self
    }

    /// Classify one column's cells.
    pub fn classify_column(&self, cells: &[String]) -> ColumnClass {
        if self.heuristic.is_date_column(cells) {
            return ColumnClass::Date;
        }
        let values: Vec<Option<f64>> = cells.iter().map(|c| self.coercer.coerce(c)).collect();
        if values.iter().any(Option::is_some) {
            ColumnClass::Numeric(values)
        } else {
            ColumnClass::Other
        }
    }

    /// Classify every column; fails when none of them is numeric.
    pub fn classify(&self, frame: &TabularFrame) -> Result<Classification, Error> {
        let mut columns = BTreeMap::new();
        for (key, column) in frame.keys().zip(frame.columns()) {
            let class = self.classify_column(&column.cells);
            trace!(column = %key, kind = ?class.kind(), "classified column");
            columns.insert(key, class);
        }
        let classification = Classification { columns };

        let numeric = classification.numeric_count();
        debug!(
            columns = classification.len(),
            numeric, "classified frame columns"
        );
        if numeric == 0 {
            return Err(Error::NoNumericColumns);
        }
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn frame(headers: &[&str], rows: &[&[&str]]) -> TabularFrame {
        TabularFrame::from_rows(s(headers), rows.iter().map(|r| s(r)).collect()).unwrap()
    }

    #[test]
    fn date_numeric_and_other_columns() {
        let f = frame(
            &["Rank", "Height", "Date", "Athlete"],
            &[
                &["1", "2.45 m", "1 January 1990", "Ann"],
                &["2", "2.43 m", "2 March 1991", "Bea"],
                &["3", "2.40 m", "5 June 1992", "Cat"],
            ],
        );
        let c = Classifier::default().classify(&f).unwrap();
        assert_eq!(
            c.by_name("Rank"),
            Some(&ColumnClass::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)]))
        );
        assert_eq!(
            c.by_name("Height"),
            Some(&ColumnClass::Numeric(vec![Some(2.45), Some(2.43), Some(2.40)]))
        );
        assert_eq!(c.by_name("Date"), Some(&ColumnClass::Date));
        assert_eq!(c.by_name("Athlete"), Some(&ColumnClass::Other));
        assert_eq!(c.numeric_count(), 2);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn first_date_short_circuits() {
        let class = Classifier::default().classify_column(&s(&["1 January 1990", "12", "13"]));
        assert_eq!(class, ColumnClass::Date);
    }

    #[test]
    fn later_dates_do_not_make_a_date_column() {
        let class = Classifier::default().classify_column(&s(&["not a date", "2023-05-25"]));
        // the ISO date still yields its leading digit run
        assert_eq!(class, ColumnClass::Numeric(vec![None, Some(2023.0)]));
    }

    #[test]
    fn gaps_keep_column_numeric() {
        let class = Classifier::default().classify_column(&s(&["10", "—", "12"]));
        assert_eq!(class, ColumnClass::Numeric(vec![Some(10.0), None, Some(12.0)]));
        assert_eq!(class.numeric_values().map(<[_]>::len), Some(3));
    }

    #[test]
    fn all_missing_is_not_numeric() {
        let class = Classifier::default().classify_column(&s(&["—", "—", "n/a"]));
        assert_eq!(class, ColumnClass::Other);
    }

    #[test]
    fn no_numeric_columns_is_an_error() {
        let f = frame(&["Name", "Note"], &[&["Ann", "—"], &["Bea", "—"]]);
        let err = Classifier::default().classify(&f).unwrap_err();
        assert!(matches!(err, Error::NoNumericColumns));
    }

    #[test]
    fn frame_without_rows_has_no_numeric_columns() {
        let f = frame(&["A", "B"], &[]);
        assert!(matches!(
            Classifier::default().classify(&f),
            Err(Error::NoNumericColumns)
        ));
    }

    #[test]
    fn duplicate_headers_stay_separate() {
        let f = frame(&["Mark", "Mark"], &[&["1", "x"], &["2", "y"]]);
        let c = Classifier::default().classify(&f).unwrap();
        let kinds: Vec<ColumnKind> = c.iter().map(|(_, class)| class.kind()).collect();
        assert_eq!(kinds, vec![ColumnKind::Numeric, ColumnKind::Other]);
        assert_eq!(c.chart_specs().len(), 1);
        assert_eq!(c.chart_specs()[0].key.index, 0);
    }

    #[test]
    fn custom_coercer_changes_extraction() {
        let comma = |text: &str| text.trim().replace(',', ".").parse::<f64>().ok();
        let classifier = Classifier::default().with_coercer(Box::new(comma));
        let class = classifier.classify_column(&s(&["2,35", "abc"]));
        assert_eq!(class, ColumnClass::Numeric(vec![Some(2.35), None]));
    }

    #[test]
    fn majority_heuristic_can_be_swapped_in() {
        let cells = s(&["n/a", "1 May 2001", "2 May 2001"]);
        let first = Classifier::default();
        let majority = Classifier::default().with_heuristic(Box::new(MajorityDate));
        assert_eq!(first.classify_column(&cells).kind(), ColumnKind::Numeric);
        assert_eq!(majority.classify_column(&cells), ColumnClass::Date);
    }
}
