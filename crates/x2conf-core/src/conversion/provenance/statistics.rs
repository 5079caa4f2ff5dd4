//! Summary statistics over the five mapping categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-category counts of a conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStatistics {
    pub direct: usize,
    pub transform: usize,
    pub default: usize,
    pub missing: usize,
    pub unmapped: usize,
}

impl MappingStatistics {
    pub fn total(&self) -> usize {
        self.direct + self.transform + self.default + self.missing + self.unmapped
    }

    /// Share of `count` in the total, in percent; zero when there are no events
    pub fn percent(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 * 100.0 / total as f64,
        }
    }

    /// Fields that ended up with a value: direct, transformed or defaulted
    pub fn resolved(&self) -> usize {
        self.direct + self.transform + self.default
    }
}

impl fmt::Display for MappingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Direct mappings: {}, Transform mappings: {}, Default values: {}, Missing: {}, Unmapped: {}, Total: {}",
            self.direct,
            self.transform,
            self.default,
            self.missing,
            self.unmapped,
            self.total()
        )
    }
}
