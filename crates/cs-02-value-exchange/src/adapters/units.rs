//! Default unit converter.
//!
//! Converts only between identical units or between SI-prefixed forms of the
//! same base unit (`kW` to `W`, `ms` to `s`). Anything else is incompatible.

use crate::ports::outbound::UnitConverter;

const SI_PREFIXES: &[(&str, f64)] = &[
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("da", 1e1),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
];

/// Every `(scale, base)` reading of a unit string, unprefixed first.
fn readings(unit: &str) -> impl Iterator<Item = (f64, &str)> {
    std::iter::once((1.0, unit)).chain(SI_PREFIXES.iter().filter_map(move |(prefix, scale)| {
        unit.strip_prefix(prefix)
            .filter(|base| !base.is_empty())
            .map(|base| (*scale, base))
    }))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityUnits;

impl UnitConverter for IdentityUnits {
    fn convert(&self, value: f64, from: &str, to: &str) -> Option<f64> {
        if from == to {
            return Some(value);
        }
        readings(from).find_map(|(from_scale, from_base)| {
            readings(to)
                .find(|(_, to_base)| *to_base == from_base)
                .map(|(to_scale, _)| value * from_scale / to_scale)
        })
    }
}
