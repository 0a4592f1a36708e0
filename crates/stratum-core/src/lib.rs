//! # stratum-core
//!
//! Shared foundation for the stratum workspace: the [`StratumError`] taxonomy,
//! layered [`Config`] loading, and tracing setup.

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;

// Re-export key types at the crate root.
pub use config::Config;
pub use error::{StratumError, StratumResult};
pub use logging::setup_logging;
