//! Dispatcher module exports.
//!
//! Re-exports the dispatcher, its response types and the tool catalog so
//! downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod tools;

pub use dispatcher::{Dispatcher, Execution, ToolContent, ToolResponse};
pub use tools::{tool_catalog, ToolSpec};
