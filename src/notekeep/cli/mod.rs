//! # CLI Layer
//!
//! One UI client of the library. This is the only place that parses shell
//! arguments, touches stdout/stderr or installs the log subscriber.
//!
//! - `setup`: clap definitions
//! - `commands`: context setup and per-command handlers
//! - `print`: turning a `CmdResult` into terminal output

mod commands;
mod print;
mod setup;

pub use commands::run;
