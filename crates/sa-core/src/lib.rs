//! sa-core: Command loop for scriptagent.
//!
//! Parses each input line, routes it to chat or to the script runner, and
//! keeps the conversation in memory for the life of the process.
//! Exposed as a library for integration testing.

pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod fetch;
pub mod memory;
pub mod repl;
pub mod runner;
pub mod telemetry;

#[cfg(test)]
mod test_server;
