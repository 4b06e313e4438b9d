//! Execution engine of `lsh`, a small Unix shell: pipelines of external
//! programs connected by pipes, `<`/`>` file redirection, and built-ins that
//! run inside the shell process.

pub mod builtin;
pub mod config;
pub mod error;
pub mod eval;
pub mod exec;
pub mod global;
pub mod job;
pub mod parser;
pub mod redirect;
pub mod search;
pub mod types;

pub use error::ShellError;
pub use global::State;
pub use types::{ExitStatus, Outcome, Pipeline, Stage};
