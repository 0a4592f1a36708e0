//! # stratum-cli
//!
//! The `migrate` command-line interface: a small management-command framework
//! plus the built-in `up`, `down`, and `status` commands.
//!
//! ## Quick Start
//!
//! ```rust
//! use stratum_cli::command::CommandRegistry;
//! use stratum_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"up"));
//! assert!(names.contains(&"down"));
//! assert!(names.contains(&"status"));
//! ```

#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

// Re-export primary types at the crate root for convenience.
pub use command::{CommandRegistry, ManagementCommand};
pub use commands::{register_builtin_commands, DownCommand, StatusCommand, UpCommand};
