//! Filter chain parsing and evaluation
//!
//! Filters are applied left to right to the value an expression resolved
//! to. Built-ins form a closed set; any other name is treated as a
//! transformer declared in the template catalog, and unknown names pass the
//! value through with a warning.
//!
//! # Examples
//!
//! ```
//! use x2conf_core::conversion::context::ResolutionContext;
//! use x2conf_core::conversion::filter::{ChainEvaluator, FilterChain, FilterRegistry};
//! use x2conf_core::conversion::provenance::ProvenanceTracker;
//!
//! let chain = FilterChain::parse("split('/') | get(-2) | upper").unwrap();
//! assert_eq!(chain.len(), 3);
//!
//! let mut tracker = ProvenanceTracker::new();
//! let evaluator = ChainEvaluator::new(FilterRegistry::builtin_only());
//! let value = evaluator.evaluate(
//!     &chain,
//!     "/warehouse/test_ods/ods_user_info/".to_string(),
//!     &ResolutionContext::new().for_target("sink.table"),
//!     &mut tracker,
//! );
//! assert_eq!(value, "ODS_USER_INFO");
//! ```
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

pub mod builtin;
pub mod evaluator;
pub mod parser;
pub mod registry;
pub mod value;

#[cfg(test)]
mod prop_tests;
#[cfg(test)]
mod tests;

pub use builtin::BuiltinFilter;
pub use evaluator::ChainEvaluator;
pub use parser::{split_top_level, unquote, FilterChain, FilterInvocation, FilterParseError};
pub use registry::{Filter, FilterRegistry};
pub use value::FilterValue;
