//! Mapping provenance tracking
//!
//! Every resolution event of a conversion run lands in one
//! [`ProvenanceTracker`], classified as Direct, Transform, Default, Missing or
//! Unmapped. The tracker is frozen into a [`MappingResult`] for reporting.
//!
//! # Examples
//!
//! ```
//! use x2conf_core::conversion::provenance::ProvenanceTracker;
//!
//! let mut tracker = ProvenanceTracker::new();
//! tracker.record_direct(
//!     Some("job.content[0].reader.parameter.username"),
//!     Some("source.Jdbc.user"),
//!     "root",
//!     "Directly extracted from DataX",
//! );
//! tracker.record_default(Some("source.Jdbc.fetch_size"), "1000", "Applied default value: 1000");
//!
//! let result = tracker.to_result();
//! assert_eq!(result.direct.len(), 1);
//! assert_eq!(result.defaults.len(), 1);
//! assert!(result.success);
//!
//! let stats = tracker.statistics();
//! assert_eq!(stats.total(), 2);
//! assert_eq!(stats.percent(stats.direct), 50.0);
//! ```
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod statistics;
pub mod tracker;
pub mod types;

#[cfg(test)]
mod tests;

pub use statistics::MappingStatistics;
pub use tracker::ProvenanceTracker;
pub use types::{MappingEvent, MappingKind, MappingResult};
