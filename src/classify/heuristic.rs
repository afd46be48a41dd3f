use super::date::is_date;
use crate::config::DateHeuristicKind;

/// Decides whether a column holds dates. Date columns are never coerced to
/// numbers.
pub trait ColumnTypeHeuristic: Send + Sync {
    fn is_date_column(&self, cells: &[String]) -> bool;
}

/// Looks at the first cell only: it alone decides, later cells are never
/// examined. An empty column is not a date column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstValueDate;

impl ColumnTypeHeuristic for FirstValueDate {
    fn is_date_column(&self, cells: &[String]) -> bool {
        cells.first().is_some_and(|first| is_date(first))
    }
}

/// A column is a date column when more than half of its non-empty cells
/// parse as dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityDate;

impl ColumnTypeHeuristic for MajorityDate {
    fn is_date_column(&self, cells: &[String]) -> bool {
        let filled: Vec<&String> = cells.iter().filter(|c| !c.trim().is_empty()).collect();
        if filled.is_empty() {
            return false;
        }
        let dates = filled.iter().filter(|c| is_date(c)).count();
        dates * 2 > filled.len()
    }
}

pub fn heuristic_for(kind: DateHeuristicKind) -> Box<dyn ColumnTypeHeuristic> {
    match kind {
        DateHeuristicKind::FirstValue => Box::new(FirstValueDate),
        DateHeuristicKind::Majority => Box::new(MajorityDate),
    }
}
