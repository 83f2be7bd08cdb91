//! # Core Entities
//!
//! Simulated time, the opaque identifiers assigned by the Core, and the two
//! composite payloads (`Complex`, `NamedPoint`) carried by [`crate::Value`].

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TIME
// =============================================================================

/// Simulated time with nanosecond resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Time(i64);

impl Time {
    /// Time zero (simulation start).
    pub const ZERO: Time = Time(0);
    /// Largest representable time, used as the "never" sentinel.
    pub const MAX: Time = Time(i64::MAX);
    /// Smallest representable time, reported before any update happened.
    pub const MIN: Time = Time(i64::MIN);

    const NANOS_PER_SEC: f64 = 1_000_000_000.0;

    /// Build a time from a nanosecond count.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Build a time from (possibly fractional) seconds, saturating at the bounds.
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * Self::NANOS_PER_SEC).round();
        if nanos.is_nan() {
            return Self::ZERO;
        }
        if nanos >= i64::MAX as f64 {
            return Self::MAX;
        }
        if nanos <= i64::MIN as f64 {
            return Self::MIN;
        }
        Self(nanos as i64)
    }

    /// Nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Seconds as a double.
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / Self::NANOS_PER_SEC
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => write!(f, "max"),
            Self::MIN => write!(f, "min"),
            t => write!(f, "{}s", t.as_secs_f64()),
        }
    }
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identifier the Core assigns to an interface.
///
/// The default value is invalid; a handle only becomes valid once a
/// registration succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceHandle(i32);

impl InterfaceHandle {
    const INVALID: i32 = -1_700_000_000;

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The handle of a never-registered interface.
    pub const fn invalid() -> Self {
        Self(Self::INVALID)
    }

    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID
    }

    pub const fn value(self) -> i32 {
        self.0
    }
}

impl Default for InterfaceHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for InterfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "invalid")
        }
    }
}

/// Identifier of a federate local to one Core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FederateId(pub i32);

impl fmt::Display for FederateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fed-{}", self.0)
    }
}

// =============================================================================
// COMPOSITE PAYLOADS
// =============================================================================

/// A complex number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Magnitude.
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    pub fn sub(self, other: Complex) -> Complex {
        Complex::new(self.re - other.re, self.im - other.im)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}j", self.re, -self.im)
        } else {
            write!(f, "{}+{}j", self.re, self.im)
        }
    }
}

/// A value tagged with a name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NamedPoint {
    pub name: String,
    pub value: f64,
}

impl NamedPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
