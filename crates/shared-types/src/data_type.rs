//! # Data Type Catalogue
//!
//! Canonical type names exchanged with the Core, alias cleanup, and the
//! fixed wire-size table for primitive types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared data type of a value interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Double,
    Int,
    String,
    Bool,
    Time,
    Complex,
    Vector,
    ComplexVector,
    NamedPoint,
    /// Opaque bytes of a custom type.
    Raw,
    /// JSON-serialised values.
    Json,
    /// Accepts whatever the source publishes.
    Any,
    /// Not known until the counterpart interface is resolved.
    #[default]
    Unknown,
}

impl DataType {
    /// Canonical name used when talking to the Core.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Int => "int64",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Time => "time",
            Self::Complex => "complex",
            Self::Vector => "vector",
            Self::ComplexVector => "complex_vector",
            Self::NamedPoint => "named_point",
            Self::Raw => "raw",
            Self::Json => "json",
            Self::Any => "any",
            Self::Unknown => "",
        }
    }

    /// Resolve a type name (including common aliases).
    ///
    /// An empty name is `Unknown`; an unrecognised name is a custom type and
    /// maps to `Raw`.
    pub fn from_name(name: &str) -> Self {
        let lowered = name.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "" => Self::Unknown,
            "def" | "any" | "default" => Self::Any,
            "double" | "float" | "f64" | "f32" | "real" | "number" => Self::Double,
            "int64" | "int" | "integer" | "int32" | "i64" | "i32" | "long" | "uint64"
            | "uint32" | "int16" | "uint16" => Self::Int,
            "string" | "str" | "text" => Self::String,
            "bool" | "boolean" | "logical" => Self::Bool,
            "time" => Self::Time,
            "complex" | "complex_f" | "cmplx" => Self::Complex,
            "vector" | "double_vector" | "vec" | "doublevector" => Self::Vector,
            "complex_vector" | "cvec" | "complexvector" => Self::ComplexVector,
            "named_point" | "namedpoint" | "point" => Self::NamedPoint,
            "json" => Self::Json,
            _ => Self::Raw,
        }
    }

    /// True for the nine types a [`crate::Value`] can hold.
    pub const fn is_primary(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Int
                | Self::String
                | Self::Bool
                | Self::Time
                | Self::Complex
                | Self::Vector
                | Self::ComplexVector
                | Self::NamedPoint
        )
    }

    /// True when the type still has to be resolved from a counterpart.
    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::Any | Self::Unknown)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Normalise a type name: aliases of primary types become the canonical
/// name, anything else (custom types) is kept verbatim.
pub fn clean_type_name(name: &str) -> String {
    let data_type = DataType::from_name(name);
    if data_type.is_primary() || data_type == DataType::Json {
        data_type.name().to_string()
    } else {
        name.to_string()
    }
}

/// Encoded size in bytes of a fixed-size type, `None` for variable or unknown types.
pub fn type_size(name: &str) -> Option<usize> {
    let size = match name {
        "char" | "uchar" => 2,
        "block_4" => 5,
        "block_8" => 9,
        "block_12" => 13,
        "block_16" => 17,
        "block_20" => 24,
        "block_24" => 30,
        "double" | "int64" | "uint64" | "complex_f" => 9,
        "float" | "int32" | "uint32" => 5,
        "complex" => 17,
        _ => return None,
    };
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(DataType::from_name("float"), DataType::Double);
        assert_eq!(DataType::from_name("INT"), DataType::Int);
        assert_eq!(DataType::from_name("def"), DataType::Any);
        assert_eq!(DataType::from_name(""), DataType::Unknown);
        assert_eq!(DataType::from_name("my_struct"), DataType::Raw);
    }

    #[test]
    fn test_clean_type_name() {
        assert_eq!(clean_type_name("float"), "double");
        assert_eq!(clean_type_name("integer"), "int64");
        assert_eq!(clean_type_name("my_struct"), "my_struct");
    }

    #[test]
    fn test_type_size_table() {
        assert_eq!(type_size("double"), Some(9));
        assert_eq!(type_size("complex"), Some(17));
        assert_eq!(type_size("complex_f"), Some(9));
        assert_eq!(type_size("char"), Some(2));
        assert_eq!(type_size("string"), None);
    }
}
