// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Inclusive integer bounds on a tree position.

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Inclusive `[min, max]` bounds.
///
/// For a leaf node the bounds constrain the node's own assigned value; for an
/// internal node they constrain the valid child-index domain. The invariant
/// `min <= max` holds for every constructed value and is revalidated when a
/// pair arrives over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[i64; 2]", into = "[i64; 2]")]
pub struct Bounds {
    min: i64,
    max: i64,
}

impl Bounds {
    /// Construct bounds, rejecting `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::InvertedBounds { min, max });
        }
        Ok(Self { min, max })
    }

    /// The index domain `[0, count - 1]` over `count` positions.
    ///
    /// `count == 0` is rejected: an empty domain has no valid index.
    pub fn index_domain(count: usize) -> Result<Self, SchemaError> {
        if count == 0 {
            return Err(SchemaError::InvertedBounds { min: 0, max: -1 });
        }
        let max = i64::try_from(count - 1)
            .map_err(|_| SchemaError::InvertedBounds { min: 0, max: i64::MAX })?;
        Self::new(0, max)
    }

    /// Parse the `"<min>-<max>"` declaration vocabulary.
    ///
    /// A leading `-` marks a negative minimum (`"-600-600"` is `[-600, 600]`),
    /// and a negative maximum follows naturally from the separator scan
    /// (`"-600--100"` is `[-600, -100]`).
    pub fn parse(spec: &str) -> Result<Self, SchemaError> {
        let malformed = || SchemaError::InvalidRangeSpec { spec: spec.to_owned() };
        let (negative_min, body) = match spec.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        let (min_raw, max_raw) = body.split_once('-').ok_or_else(malformed)?;
        let min: i64 = min_raw.parse().map_err(|_| malformed())?;
        let min = if negative_min { -min } else { min };
        let max: i64 = max_raw.parse().map_err(|_| malformed())?;
        Self::new(min, max)
    }

    /// Lower bound (inclusive).
    pub fn min(self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    pub fn max(self) -> i64 {
        self.max
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Number of admissible values.
    pub fn cardinality(self) -> u64 {
        self.max.abs_diff(self.min).saturating_add(1)
    }
}

impl TryFrom<[i64; 2]> for Bounds {
    type Error = SchemaError;

    fn try_from(pair: [i64; 2]) -> Result<Self, Self::Error> {
        Self::new(pair[0], pair[1])
    }
}

impl From<Bounds> for [i64; 2] {
    fn from(bounds: Bounds) -> Self {
        [bounds.min, bounds.max]
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
