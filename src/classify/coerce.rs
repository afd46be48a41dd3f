use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("decimal run regex"));

/// Turns the free text of one cell into a number, if it holds one.
pub trait CellCoercer: Send + Sync {
    fn coerce(&self, text: &str) -> Option<f64>;
}

impl<F> CellCoercer for F
where
    F: Fn(&str) -> Option<f64> + Send + Sync,
{
    fn coerce(&self, text: &str) -> Option<f64> {
        self(text)
    }
}

/// Takes the first `digits[.digits]` run anywhere in the text, so
/// "2.35 m (world record)" gives 2.35. Signs and thousands separators are
/// not recognised.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalRunCoercer;

impl CellCoercer for DecimalRunCoercer {
    fn coerce(&self, text: &str) -> Option<f64> {
        DECIMAL_RUN.find(text)?.as_str().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_decimal_run() {
        let c = DecimalRunCoercer;
        assert_eq!(c.coerce("2.35 m"), Some(2.35));
        assert_eq!(c.coerce("2.35 m (world record)"), Some(2.35));
        assert_eq!(c.coerce("12"), Some(12.0));
        assert_eq!(c.coerce("— (approx. 3)"), Some(3.0));
        assert_eq!(c.coerce("6 ft 5 in"), Some(6.0));
        assert_eq!(c.coerce(" 789 "), Some(789.0));
    }

    #[test]
    fn no_digits_means_missing() {
        let c = DecimalRunCoercer;
        assert_eq!(c.coerce("no data"), None);
        assert_eq!(c.coerce("—"), None);
        assert_eq!(c.coerce(""), None);
    }

    #[test]
    fn trailing_dot_is_not_part_of_the_number() {
        assert_eq!(DecimalRunCoercer.coerce("3. place"), Some(3.0));
    }

    #[test]
    fn closures_are_coercers() {
        let comma = |text: &str| text.trim().replace(',', ".").parse::<f64>().ok();
        assert_eq!(comma.coerce("2,35"), Some(2.35));
    }
}
