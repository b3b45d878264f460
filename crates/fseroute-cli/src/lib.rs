//! FSEconomy route finder CLI library.
//!
//! Terminal styling, output formatting and the interactive prompts used by
//! the `fseroute` binary.

pub mod output;
pub mod prompt;
pub mod terminal;
