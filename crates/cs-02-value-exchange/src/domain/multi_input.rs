//! # Multi-input Combination
//!
//! An input fed by several publications either takes the most recent value
//! (`NoOp`) or reduces every current source value to one.
//!
//! | Mode | Result |
//! |------|--------|
//! | `NoOp` | last value |
//! | `And` / `Or` | boolean over truthiness |
//! | `Sum` / `Average` / `Max` / `Min` | double over numeric readings |
//! | `Diff` | first minus every following value |
//! | `Vectorize` | concatenation into a vector (a JSON string array if every source is a string) |

use serde::{Deserialize, Serialize};
use shared_types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiInputMode {
    #[default]
    NoOp,
    And,
    Or,
    Sum,
    Diff,
    Max,
    Min,
    Average,
    Vectorize,
}

impl MultiInputMode {
    /// Parse a mode name; unrecognised names give `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let mode = match name.trim().to_ascii_lowercase().as_str() {
            "no_op" | "noop" | "none" | "" => Self::NoOp,
            "and" => Self::And,
            "or" => Self::Or,
            "sum" => Self::Sum,
            "diff" | "difference" => Self::Diff,
            "max" => Self::Max,
            "min" => Self::Min,
            "average" | "mean" => Self::Average,
            "vectorize" => Self::Vectorize,
            _ => return None,
        };
        Some(mode)
    }

    /// Reduce the current source values; `None` when there is nothing to
    /// reduce.
    pub fn combine(self, values: &[Value]) -> Option<Value> {
        let last = values.last()?;
        let numbers = || values.iter().filter_map(Value::as_f64);

        let combined = match self {
            Self::NoOp => last.clone(),
            Self::And => Value::Bool(values.iter().all(Value::as_bool)),
            Self::Or => Value::Bool(values.iter().any(Value::as_bool)),
            Self::Sum => Value::Double(numbers().sum()),
            Self::Diff => {
                let mut readings = numbers();
                let first = readings.next()?;
                Value::Double(readings.fold(first, |acc, x| acc - x))
            }
            Self::Max => Value::Double(numbers().reduce(f64::max)?),
            Self::Min => Value::Double(numbers().reduce(f64::min)?),
            Self::Average => {
                let (sum, count) = numbers().fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
                if count == 0 {
                    return None;
                }
                Value::Double(sum / count as f64)
            }
            Self::Vectorize => vectorize(values),
        };
        Some(combined)
    }
}

fn vectorize(values: &[Value]) -> Value {
    let strings: Option<Vec<&str>> = values
        .iter()
        .map(|v| match v {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    if let Some(strings) = strings {
        return Value::String(serde_json::to_string(&strings).unwrap_or_else(|_| "[]".into()));
    }

    let mut out = Vec::new();
    for value in values {
        match value {
            Value::Vector(v) => out.extend_from_slice(v),
            Value::ComplexVector(v) => out.extend(v.iter().flat_map(|c| [c.re, c.im])),
            Value::Complex(c) => out.extend([c.re, c.im]),
            other => out.extend(other.as_f64()),
        }
    }
    Value::Vector(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubles(xs: &[f64]) -> Vec<Value> {
        xs.iter().copied().map(Value::Double).collect()
    }

    #[test]
    fn test_numeric_modes() {
        let values = doubles(&[2.0, 3.0, 7.0]);
        assert_eq!(MultiInputMode::Sum.combine(&values), Some(Value::Double(12.0)));
        assert_eq!(MultiInputMode::Diff.combine(&values), Some(Value::Double(-8.0)));
        assert_eq!(MultiInputMode::Max.combine(&values), Some(Value::Double(7.0)));
        assert_eq!(MultiInputMode::Min.combine(&values), Some(Value::Double(2.0)));
        assert_eq!(MultiInputMode::Average.combine(&values), Some(Value::Double(4.0)));
        assert_eq!(MultiInputMode::NoOp.combine(&values), Some(Value::Double(7.0)));
    }

    #[test]
    fn test_sum_of_two_sources() {
        let values = doubles(&[2.0, 3.0]);
        assert_eq!(MultiInputMode::Sum.combine(&values), Some(Value::Double(5.0)));
    }

    #[test]
    fn test_logical_modes() {
        let values = vec![Value::Bool(true), Value::Double(0.0), Value::String("on".into())];
        assert_eq!(MultiInputMode::And.combine(&values), Some(Value::Bool(false)));
        assert_eq!(MultiInputMode::Or.combine(&values), Some(Value::Bool(true)));
    }

    #[test]
    fn test_vectorize() {
        let values = vec![
            Value::Double(1.0),
            Value::Vector(vec![2.0, 3.0]),
            Value::Int(4),
        ];
        assert_eq!(
            MultiInputMode::Vectorize.combine(&values),
            Some(Value::Vector(vec![1.0, 2.0, 3.0, 4.0]))
        );

        let names = vec![Value::String("a".into()), Value::String("b".into())];
        assert_eq!(
            MultiInputMode::Vectorize.combine(&names),
            Some(Value::String(r#"["a","b"]"#.into()))
        );
    }

    #[test]
    fn test_empty_and_non_numeric() {
        assert_eq!(MultiInputMode::Sum.combine(&[]), None);
        let words = vec![Value::String("x".into())];
        assert_eq!(MultiInputMode::Max.combine(&words), None);
        assert_eq!(MultiInputMode::Average.combine(&words), None);
        assert_eq!(MultiInputMode::Sum.combine(&words), Some(Value::Double(0.0)));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(MultiInputMode::from_name("SUM"), Some(MultiInputMode::Sum));
        assert_eq!(MultiInputMode::from_name("none"), Some(MultiInputMode::NoOp));
        assert_eq!(MultiInputMode::from_name("bogus"), None);
    }
}
