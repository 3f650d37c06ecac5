//! Command-line interface for testrc
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and the runtime option bag (clap)
//! - `run`: entry point, pipeline and output

pub mod args;
mod run;

pub use args::Cli;
pub use run::run;
