//! Command handlers for the CLI
//!
//! Each subcommand has its own module; shared conversion plumbing lives in
//! [`utils`].

pub mod analyze;
pub mod batch;
pub mod completions;
pub mod convert;
pub mod utils;
pub mod validate;

pub use analyze::handle_analyze;
pub use batch::handle_batch;
pub use completions::handle_completions;
pub use convert::handle_convert;
pub use validate::handle_validate;
