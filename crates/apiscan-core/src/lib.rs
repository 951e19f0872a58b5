//! apiscan core - structured API documentation extraction
//!
//! This crate turns the parsed syntax tree of one compilation unit into a
//! structured documentation record. It recognizes module/interface/class
//! factory invocations, walks their configuration sections (constructor,
//! properties, events, members, statics), and resolves every symbol to a
//! terminal type label by following assignment chains, closure returns,
//! conditional branches, and coercion operators, merging the result with
//! author-written documentation comments.
//!
//! The parser, the scope analyzer, and the comment-markup renderer are
//! external collaborators: [`tree`] defines the data model they produce and
//! this crate consumes.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Syntax tree interface - nodes, comments, and navigation
pub mod tree;

/// Human-readable rendering of value expressions
pub mod render;

/// The extraction engine - scanner, resolver, builders, export
pub mod api;

/// Convenience re-export of the extractor entry point
pub use api::{extract_units, ApiExtractor, ApiUnit};

/// Convenience re-export of the tree construction API
pub use tree::{Comment, Node, NodeId, NodeKind, Tree, TreeBuilder};

/// Convenience re-export of the value renderer
pub use render::ValueRenderer;
