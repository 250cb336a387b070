//! MCP (Model Context Protocol) module
//!
//! Protocol types, the dispatcher, the tool registry and the static
//! resource and prompt catalogs.

pub mod completion;
pub mod context;
pub mod pagination;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;
pub mod types;
