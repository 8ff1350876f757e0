//! MasterGo DSL simplification
//!
//! Design documents fetched from MasterGo carry full vector geometry for every
//! icon on the page. When the document is handed to a language model that
//! geometry is pure token cost, so this crate rewrites icon-like subtrees into
//! compact `ICON_PLACEHOLDER` nodes and reports what was removed.
//!
//! # Usage
//!
//! ```rust
//! use serde_json::json;
//!
//! let doc = json!({
//!     "nodes": [{ "type": "VECTOR", "id": "1:2", "name": "arrow", "path": [1, 2, 3] }]
//! });
//! let out = dsl::simplify(doc);
//! assert_eq!(out.stats.icons_removed, 1);
//! assert_eq!(out.stats.paths_removed, 3);
//! assert_eq!(out.document["nodes"][0]["type"], "ICON_PLACEHOLDER");
//! ```

pub mod classify;
pub mod simplifier;

pub use classify::{classify, is_icon_container_name, IconRule, ParentContext, PLACEHOLDER_TYPE};
pub use simplifier::{release, simplify, simplify_nodes, SimplificationStats, Simplified};
