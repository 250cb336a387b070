//! Assistants MCP Gateway Library
//!
//! A Model Context Protocol (MCP) server exposing the Assistants v2 API
//! (assistants, threads, messages, runs and run steps) as MCP tools, with
//! pluggable backend providers and stdio, HTTP and proxy transports.

pub mod config;
pub mod error;
pub mod mcp;
pub mod providers;
pub mod transport;

pub use config::Config;
pub use error::{GatewayError, Result};
