//! MCP (Model Context Protocol) server definitions

pub mod spec;

pub use spec::ServerSpec;
