//! MCP server exposing a `greet` tool behind SQLite-backed API key authentication.

pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod key_store;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
