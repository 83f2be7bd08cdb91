//! # Typed Extraction
//!
//! [`FromValue`] maps a cached [`Value`] onto a Rust type. Primary types
//! convert through the lattice directly; convertible numeric types decode
//! through the canonical `i64`/`f64` reading and then narrow. A reading
//! outside the target's range fails with
//! [`FederateError::InvalidConversion`] instead of wrapping.

use shared_types::{Complex, DataType, FederateError, NamedPoint, Time, Value};

/// A Rust type an input value can be read as.
pub trait FromValue: Sized {
    /// The primary type values are converted to before extraction.
    const DATA_TYPE: DataType;

    fn from_value(value: &Value) -> Result<Self, FederateError>;
}

macro_rules! primary_from_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $t {
                const DATA_TYPE: DataType = DataType::$variant;

                fn from_value(value: &Value) -> Result<Self, FederateError> {
                    match value.convert_to(DataType::$variant)? {
                        Value::$variant(v) => Ok(v),
                        other => Err(FederateError::InvalidConversion {
                            from: other.data_type(),
                            to: DataType::$variant,
                        }),
                    }
                }
            }
        )*
    };
}

primary_from_value! {
    f64 => Double,
    i64 => Int,
    String => String,
    bool => Bool,
    Time => Time,
    Complex => Complex,
    Vec<f64> => Vector,
    Vec<Complex> => ComplexVector,
    NamedPoint => NamedPoint,
}

macro_rules! narrowed_integer {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                const DATA_TYPE: DataType = DataType::Int;

                fn from_value(value: &Value) -> Result<Self, FederateError> {
                    let wide = i64::from_value(value)?;
                    <$t>::try_from(wide).map_err(|_| out_of_range(value, DataType::Int))
                }
            }
        )*
    };
}

narrowed_integer!(i32, i16, i8, u64, u32, u16, u8, usize);

impl FromValue for f32 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_value(value: &Value) -> Result<Self, FederateError> {
        let wide = f64::from_value(value)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(out_of_range(value, DataType::Double));
        }
        Ok(wide as f32)
    }
}

fn out_of_range(value: &Value, to: DataType) -> FederateError {
    FederateError::InvalidConversion {
        from: value.data_type(),
        to,
    }
}

impl FromValue for char {
    const DATA_TYPE: DataType = DataType::String;

    /// First character of a string; numeric values are read as a code point.
    fn from_value(value: &Value) -> Result<Self, FederateError> {
        match value {
            Value::String(s) => Ok(s.chars().next().unwrap_or('\0')),
            other => u32::from_value(other)
                .ok()
                .and_then(char::from_u32)
                .ok_or(FederateError::InvalidConversion {
                    from: other.data_type(),
                    to: DataType::String,
                }),
        }
    }
}

/// The cached value itself, unconverted.
impl FromValue for Value {
    const DATA_TYPE: DataType = DataType::Any;

    fn from_value(value: &Value) -> Result<Self, FederateError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_extraction() {
        assert_eq!(f64::from_value(&Value::Int(3)).unwrap(), 3.0);
        assert_eq!(String::from_value(&Value::Bool(true)).unwrap(), "true");
        assert_eq!(
            Vec::<f64>::from_value(&Value::Double(2.0)).unwrap(),
            vec![2.0]
        );
        assert!(f64::from_value(&Value::String("abc".into())).is_err());
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(i32::from_value(&Value::Double(7.9)).unwrap(), 7);
        assert_eq!(u8::from_value(&Value::Int(255)).unwrap(), 255);
        assert_eq!(f32::from_value(&Value::Double(0.5)).unwrap(), 0.5f32);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        assert_eq!(
            u8::from_value(&Value::Int(300)),
            Err(FederateError::InvalidConversion {
                from: DataType::Int,
                to: DataType::Int,
            })
        );
        assert!(u32::from_value(&Value::Int(-1)).is_err());
        assert!(i8::from_value(&Value::Double(128.0)).is_err());
        assert!(usize::from_value(&Value::Int(-5)).is_err());
        assert!(f32::from_value(&Value::Double(1e300)).is_err());
        assert!(f32::from_value(&Value::Double(f64::INFINITY))
            .unwrap()
            .is_infinite());
    }

    #[test]
    fn test_char() {
        assert_eq!(char::from_value(&Value::String("xyz".into())).unwrap(), 'x');
        assert_eq!(char::from_value(&Value::Int(65)).unwrap(), 'A');
        assert_eq!(char::from_value(&Value::String(String::new())).unwrap(), '\0');
        assert!(char::from_value(&Value::Int(-1)).is_err());
    }

    #[test]
    fn test_value_passthrough() {
        let v = Value::Complex(Complex::new(1.0, 2.0));
        assert_eq!(Value::from_value(&v).unwrap(), v);
    }
}
