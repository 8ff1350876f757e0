//! MasterGo MCP Library
//!
//! Exposes MasterGo design files to coding agents over the Model Context
//! Protocol:
//!
//! - `mcp__getDsl`: layer DSL with icon geometry collapsed by the `dsl` crate
//! - `mcp__getComponentLink`: component documentation behind a DSL link
//! - `mcp__getMeta`: site/page metadata plus site generation rules
//! - `mcp__getComponentGenerator`: scaffold a component workflow on disk
//! - `version`: server version
//!
//! # Usage
//!
//! ```bash
//! mastergo-mcp --token=YOUR_TOKEN [--url=API_URL] [--rule=RULE]... [--debug]
//!
//! # Or through the environment
//! MG_MCP_TOKEN=YOUR_TOKEN API_BASE_URL=https://mastergo.com mastergo-mcp
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod tools;
pub mod workflow;

pub use client::{DesignApi, LayerRef, MasterGoClient};
pub use config::{Args, Config};
pub use error::{ErrorCode, McpToolError, StructuredError, ToolResult};
pub use workflow::{scaffold_component, ScaffoldedFiles};
