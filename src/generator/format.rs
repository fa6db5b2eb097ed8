//! Number rendering shared by the synthesizers.
//!
//! Generated programs are Python, so any value a script would print has to be
//! rendered the way the Python runtime renders it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric ground-truth value: integer counts and sums, or float results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
}

impl CellValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            CellValue::Int(v) => *v as f64,
            CellValue::Float(v) => *v,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => f.write_str(&python_float(*v)),
        }
    }
}

/// Renders a float like Python's `str(float)` for ordinary magnitudes.
///
/// Whole values keep a trailing `.0`; everything else uses the shortest
/// round-tripping representation.
pub fn python_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Rounds half-to-even at the given number of decimals, matching Python's `round`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Inserts `,` thousands separators into an integer.
pub fn with_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Renders a whole-dollar price: `$nn.99` below 100, `$n,nnn.00` at or above.
pub fn currency(amount: i64) -> String {
    if amount < 100 {
        format!("${}.99", amount)
    } else {
        format!("${}.00", with_thousands(amount))
    }
}

/// Title-cases text the way Python's `str.title` does: a letter is upper-cased
/// when it follows a non-letter and lower-cased otherwise.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if after_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(ch);
            after_letter = false;
        }
    }
    out
}

/// `sales_records` -> `Sales Records`.
pub fn label_from_identifier(identifier: &str) -> String {
    title_case(&identifier.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_matches_python() {
        assert_eq!(title_case("monthly sales"), "Monthly Sales");
        assert_eq!(title_case("business KPIs"), "Business Kpis");
        assert_eq!(title_case("food_beverage"), "Food_Beverage");
        assert_eq!(label_from_identifier("test_results"), "Test Results");
    }

    #[test]
    fn test_python_float_keeps_trailing_zero() {
        assert_eq!(python_float(20.0), "20.0");
        assert_eq!(python_float(2.5), "2.5");
        assert_eq!(python_float(37.0 / 7.0), "5.285714285714286");
    }

    #[test]
    fn test_round_to_two_decimals() {
        assert_eq!(round_to(60.0 / 3.0, 2), 20.0);
        assert_eq!(round_to(10.0 / 3.0, 2), 3.33);
        // exact tie rounds to even, like Python
        assert_eq!(round_to(125.125, 2), 125.12);
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(with_thousands(7), "7");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1234567), "1,234,567");
        assert_eq!(with_thousands(-45000), "-45,000");
    }

    #[test]
    fn test_currency_threshold_at_one_hundred() {
        assert_eq!(currency(9), "$9.99");
        assert_eq!(currency(99), "$99.99");
        assert_eq!(currency(100), "$100.00");
        assert_eq!(currency(1999), "$1,999.00");
    }

    #[test]
    fn test_cell_value_display_and_serde() {
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(20.0).to_string(), "20.0");

        let json = serde_json::to_string(&CellValue::Float(20.0)).expect("serialize");
        assert_eq!(json, "20.0");
        let parsed: CellValue = serde_json::from_str("17").expect("deserialize");
        assert_eq!(parsed, CellValue::Int(17));
    }
}
