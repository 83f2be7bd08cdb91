//! # Tagged Value
//!
//! The closed sum of the nine primary payloads an interface can hold, with
//! the conversion lattice between them and the distance function used by
//! change detection.
//!
//! ## Conversion Rules
//!
//! | From \ To | numeric (double/int/bool/time) | string | vector |
//! |-----------|--------------------------------|--------|--------|
//! | scalar    | direct cast                    | text   | `[x]`  |
//! | vector    | single element, else norm      | JSON   | copy   |
//! | complex   | real part if `im == 0`, else magnitude | `a+bj` | `[re, im]` |
//! | string    | parsed, error if not numeric   | copy   | JSON array or `[x]` |

use crate::data_type::DataType;
use crate::entities::{Complex, NamedPoint, Time};
use crate::errors::FederateError;
use serde::{Deserialize, Serialize};

/// One value of one of the primary data types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Double(f64),
    Int(i64),
    String(String),
    Bool(bool),
    Time(Time),
    Complex(Complex),
    Vector(Vec<f64>),
    ComplexVector(Vec<Complex>),
    NamedPoint(NamedPoint),
}

impl Default for Value {
    fn default() -> Self {
        Value::Double(0.0)
    }
}

/// Strings treated as boolean false.
const FALSE_STRINGS: &[&str] = &[
    "", "0", "false", "f", "off", "no", "n", "disabled", "0.0", "-0",
];

impl Value {
    /// The zero value of a type; non-primary types fall back to a double.
    pub fn default_for(data_type: DataType) -> Value {
        match data_type {
            DataType::Int => Value::Int(0),
            DataType::String | DataType::Json => Value::String(String::new()),
            DataType::Bool => Value::Bool(false),
            DataType::Time => Value::Time(Time::ZERO),
            DataType::Complex => Value::Complex(Complex::default()),
            DataType::Vector => Value::Vector(Vec::new()),
            DataType::ComplexVector => Value::ComplexVector(Vec::new()),
            DataType::NamedPoint => Value::NamedPoint(NamedPoint::new("", f64::NAN)),
            _ => Value::Double(0.0),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Double(_) => DataType::Double,
            Value::Int(_) => DataType::Int,
            Value::String(_) => DataType::String,
            Value::Bool(_) => DataType::Bool,
            Value::Time(_) => DataType::Time,
            Value::Complex(_) => DataType::Complex,
            Value::Vector(_) => DataType::Vector,
            Value::ComplexVector(_) => DataType::ComplexVector,
            Value::NamedPoint(_) => DataType::NamedPoint,
        }
    }

    fn conversion_error(&self, to: DataType) -> FederateError {
        FederateError::InvalidConversion {
            from: self.data_type(),
            to,
        }
    }

    // =========================================================================
    // CANONICAL REPRESENTATIONS
    // =========================================================================

    /// The canonical floating point reading of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Time(t) => Some(t.as_secs_f64()),
            Value::Complex(c) => Some(if c.im == 0.0 { c.re } else { c.norm() }),
            Value::Vector(v) => Some(match v.as_slice() {
                [single] => *single,
                values => values.iter().map(|x| x * x).sum::<f64>().sqrt(),
            }),
            Value::ComplexVector(v) => Some(match v.as_slice() {
                [single] if single.im == 0.0 => single.re,
                values => values
                    .iter()
                    .map(|c| c.norm() * c.norm())
                    .sum::<f64>()
                    .sqrt(),
            }),
            Value::NamedPoint(p) => Some(p.value),
        }
    }

    /// The canonical integer reading of the value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Time(t) => Some(t.as_nanos()),
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_i64))
            }
            other => other.as_f64().and_then(float_to_i64),
        }
    }

    /// Truthiness: non-zero numbers, non-empty containers, and any string
    /// that is not a recognised false word.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::String(s) => !FALSE_STRINGS.contains(&s.trim().to_ascii_lowercase().as_str()),
            Value::Vector(v) => v.iter().any(|x| *x != 0.0),
            Value::ComplexVector(v) => v.iter().any(|c| c.norm() != 0.0),
            other => other.as_f64().is_some_and(|x| x != 0.0),
        }
    }

    /// Text rendering; always succeeds.
    pub fn to_text(&self) -> String {
        match self {
            Value::Double(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Time(t) => t.as_secs_f64().to_string(),
            Value::Complex(c) => c.to_string(),
            Value::Vector(v) => {
                serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
            }
            Value::ComplexVector(v) => {
                let parts: Vec<String> = v.iter().map(Complex::to_string).collect();
                format!("[{}]", parts.join(","))
            }
            Value::NamedPoint(p) => serde_json::json!({ "name": p.name, "value": p.value })
                .to_string(),
        }
    }

    fn to_vector(&self) -> Result<Vec<f64>, FederateError> {
        match self {
            Value::Vector(v) => Ok(v.clone()),
            Value::Complex(c) => Ok(vec![c.re, c.im]),
            Value::ComplexVector(v) => Ok(v.iter().flat_map(|c| [c.re, c.im]).collect()),
            Value::String(s) => serde_json::from_str::<Vec<f64>>(s.trim())
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|x| vec![x]))
                .ok_or_else(|| self.conversion_error(DataType::Vector)),
            other => other
                .as_f64()
                .map(|x| vec![x])
                .ok_or_else(|| other.conversion_error(DataType::Vector)),
        }
    }

    fn to_complex(&self) -> Result<Complex, FederateError> {
        match self {
            Value::Complex(c) => Ok(*c),
            Value::Vector(v) => match v.as_slice() {
                [] => Ok(Complex::default()),
                [re] => Ok(Complex::new(*re, 0.0)),
                [re, im, ..] => Ok(Complex::new(*re, *im)),
            },
            Value::ComplexVector(v) => Ok(v.first().copied().unwrap_or_default()),
            Value::String(s) => {
                parse_complex(s).ok_or_else(|| self.conversion_error(DataType::Complex))
            }
            other => other
                .as_f64()
                .map(|x| Complex::new(x, 0.0))
                .ok_or_else(|| other.conversion_error(DataType::Complex)),
        }
    }

    fn to_complex_vector(&self) -> Result<Vec<Complex>, FederateError> {
        match self {
            Value::ComplexVector(v) => Ok(v.clone()),
            Value::Vector(v) => Ok(v.iter().map(|x| Complex::new(*x, 0.0)).collect()),
            Value::String(s) => {
                let trimmed = s.trim().trim_start_matches('[').trim_end_matches(']');
                if trimmed.is_empty() {
                    return Ok(Vec::new());
                }
                trimmed
                    .split(',')
                    .map(parse_complex)
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| self.conversion_error(DataType::ComplexVector))
            }
            other => other.to_complex().map(|c| vec![c]),
        }
    }

    fn to_named_point(&self) -> NamedPoint {
        match self {
            Value::NamedPoint(p) => p.clone(),
            Value::String(s) => serde_json::from_str::<NamedPoint>(s)
                .ok()
                .unwrap_or_else(|| match s.trim().parse::<f64>() {
                    Ok(x) => NamedPoint::new("value", x),
                    Err(_) => NamedPoint::new(s.clone(), f64::NAN),
                }),
            Value::Double(x) => NamedPoint::new("value", *x),
            other => NamedPoint::new(other.to_text(), other.as_f64().unwrap_or(f64::NAN)),
        }
    }

    // =========================================================================
    // CONVERSION LATTICE
    // =========================================================================

    /// Convert into the requested type.
    ///
    /// Non-primary targets (`any`, `unknown`, `raw`, `json`) keep the value
    /// as it is.
    pub fn convert_to(&self, target: DataType) -> Result<Value, FederateError> {
        if self.data_type() == target || !target.is_primary() {
            return Ok(self.clone());
        }
        let converted = match target {
            DataType::Double => Value::Double(
                self.as_f64()
                    .ok_or_else(|| self.conversion_error(target))?,
            ),
            DataType::Int => Value::Int(
                self.as_i64()
                    .ok_or_else(|| self.conversion_error(target))?,
            ),
            DataType::String => Value::String(self.to_text()),
            DataType::Bool => Value::Bool(self.as_bool()),
            DataType::Time => match self {
                Value::Int(ns) => Value::Time(Time::from_nanos(*ns)),
                other => Value::Time(Time::from_secs_f64(
                    other
                        .as_f64()
                        .ok_or_else(|| other.conversion_error(target))?,
                )),
            },
            DataType::Complex => Value::Complex(self.to_complex()?),
            DataType::Vector => Value::Vector(self.to_vector()?),
            DataType::ComplexVector => Value::ComplexVector(self.to_complex_vector()?),
            DataType::NamedPoint => Value::NamedPoint(self.to_named_point()),
            DataType::Raw | DataType::Json | DataType::Any | DataType::Unknown => self.clone(),
        };
        Ok(converted)
    }

    // =========================================================================
    // CHANGE DETECTION
    // =========================================================================

    /// Type-appropriate distance between two values.
    ///
    /// Values of different variants, strings that differ, and named points
    /// with different names are infinitely far apart.
    pub fn change_distance(&self, other: &Value) -> f64 {
        let distance = match (self, other) {
            (Value::Double(a), Value::Double(b)) => (a - b).abs(),
            (Value::Int(a), Value::Int(b)) => (*a as f64 - *b as f64).abs(),
            (Value::Bool(a), Value::Bool(b)) => bool_distance(a == b),
            (Value::Time(a), Value::Time(b)) => (a.as_secs_f64() - b.as_secs_f64()).abs(),
            (Value::String(a), Value::String(b)) => bool_distance(a == b),
            (Value::Complex(a), Value::Complex(b)) => a.sub(*b).norm(),
            (Value::Vector(a), Value::Vector(b)) => {
                if a.len() != b.len() {
                    f64::INFINITY
                } else {
                    a.iter()
                        .zip(b)
                        .map(|(x, y)| (x - y).abs())
                        .fold(0.0, f64::max)
                }
            }
            (Value::ComplexVector(a), Value::ComplexVector(b)) => {
                if a.len() != b.len() {
                    f64::INFINITY
                } else {
                    a.iter()
                        .zip(b)
                        .map(|(x, y)| x.sub(*y).norm())
                        .fold(0.0, f64::max)
                }
            }
            (Value::NamedPoint(a), Value::NamedPoint(b)) => {
                if a.name != b.name {
                    f64::INFINITY
                } else if a.value.is_nan() && b.value.is_nan() {
                    0.0
                } else {
                    (a.value - b.value).abs()
                }
            }
            _ => f64::INFINITY,
        };
        if distance.is_nan() {
            f64::INFINITY
        } else {
            distance
        }
    }

    /// True when `other` is at least `delta` away from `self`.
    pub fn differs_by(&self, other: &Value, delta: f64) -> bool {
        self.change_distance(other) >= delta
    }
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

macro_rules! value_from {
    ($($t:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from($v: $t) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    f64 => |v| Value::Double(v),
    f32 => |v| Value::Double(f64::from(v)),
    i64 => |v| Value::Int(v),
    i32 => |v| Value::Int(i64::from(v)),
    i16 => |v| Value::Int(i64::from(v)),
    u32 => |v| Value::Int(i64::from(v)),
    u16 => |v| Value::Int(i64::from(v)),
    u8 => |v| Value::Int(i64::from(v)),
    bool => |v| Value::Bool(v),
    char => |v| Value::String(v.to_string()),
    String => |v| Value::String(v),
    &str => |v| Value::String(v.to_string()),
    Time => |v| Value::Time(v),
    Complex => |v| Value::Complex(v),
    Vec<f64> => |v| Value::Vector(v),
    &[f64] => |v| Value::Vector(v.to_vec()),
    Vec<Complex> => |v| Value::ComplexVector(v),
    NamedPoint => |v| Value::NamedPoint(v),
}

fn bool_distance(equal: bool) -> f64 {
    if equal {
        0.0
    } else {
        f64::INFINITY
    }
}

fn float_to_i64(x: f64) -> Option<i64> {
    if x.is_finite() {
        Some(x.trunc() as i64)
    } else {
        None
    }
}

/// Parse `a+bj`, `a-bj`, `bj`, `a` (with `i` accepted for `j`).
fn parse_complex(text: &str) -> Option<Complex> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(re) = s.parse::<f64>() {
        return Some(Complex::new(re, 0.0));
    }
    let body = s.strip_suffix('j').or_else(|| s.strip_suffix('i'))?;
    // split at the last sign that is not an exponent sign or the leading sign
    let split = body
        .char_indices()
        .skip(1)
        .filter(|(i, c)| {
            (*c == '+' || *c == '-') && !matches!(body.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last();
    match split {
        Some(idx) => {
            let re = body[..idx].trim().parse::<f64>().ok()?;
            let im_text = body[idx..].trim();
            let im = match im_text {
                "+" => 1.0,
                "-" => -1.0,
                t => t.parse::<f64>().ok()?,
            };
            Some(Complex::new(re, im))
        }
        None => {
            let im = match body {
                "" | "+" => 1.0,
                "-" => -1.0,
                t => t.parse::<f64>().ok()?,
            };
            Some(Complex::new(0.0, im))
        }
    }
}
