//! sa-protocol: Shared types for scriptagent.
//!
//! This crate defines the data exchanged between the dispatcher, the chat
//! backends, and the script runner.

pub mod conversation;
pub mod execution;

pub use conversation::{Role, Turn};
pub use execution::ExecutionResult;
