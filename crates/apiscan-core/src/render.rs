//! Human-readable rendering of value expressions
//!
//! Documentation entries carry a short literal rendering of their value
//! (`"100"`, `"\"cell\""`, `"new core.event.Simple()"`). The renderer is an
//! explicit dependency of the extractor - one instance per worker - so
//! per-unit extraction has no shared state.

use crate::tree::{query, NodeId, NodeKind, Tree};

/// Renders value nodes into compact source-like text
#[derive(Debug, Clone)]
pub struct ValueRenderer {
    max_len: usize,
}

impl Default for ValueRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueRenderer {
    /// Create a renderer with the default length cap
    #[must_use]
    pub fn new() -> Self {
        Self { max_len: 80 }
    }

    /// Override the length cap applied to the finished rendering
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }

    /// Render the value rooted at `id`
    #[must_use]
    pub fn render(&self, tree: &Tree, id: NodeId) -> String {
        let full = self.render_inner(tree, id);
        if full.chars().count() > self.max_len {
            let mut truncated: String = full.chars().take(self.max_len - 1).collect();
            truncated.push('…');
            truncated
        } else {
            full
        }
    }

    fn render_inner(&self, tree: &Tree, id: NodeId) -> String {
        match tree.kind(id) {
            NodeKind::String { value } => format!("\"{value}\""),
            NodeKind::Number { raw } => raw.clone(),
            NodeKind::Boolean { value } => value.to_string(),
            NodeKind::Null => "null".to_string(),
            NodeKind::Void => "undefined".to_string(),
            NodeKind::RegExp { source } => source.clone(),
            NodeKind::Identifier { name } => name.clone(),
            NodeKind::Dot => {
                query::assemble_dot(tree, id).unwrap_or_else(|| "Identifier".to_string())
            }
            NodeKind::Function { .. } => "Function".to_string(),
            NodeKind::Array => {
                let items: Vec<String> = tree
                    .children(id)
                    .iter()
                    .map(|&c| self.render_inner(tree, c))
                    .collect();
                format!("[{}]", items.join(","))
            }
            NodeKind::Map => {
                let pairs: Vec<String> = query::map_entries(tree, id)
                    .into_iter()
                    .map(|(key, entry)| format!("{key}:{}", self.render_inner(tree, entry.value)))
                    .collect();
                format!("{{{}}}", pairs.join(","))
            }
            NodeKind::PropertyInit => tree
                .child(id, 1)
                .map_or_else(String::new, |v| self.render_inner(tree, v)),
            NodeKind::Call => {
                let callee = tree
                    .child(id, 0)
                    .map_or_else(String::new, |c| self.render_inner(tree, c));
                let args: Vec<String> = tree
                    .children(id)
                    .iter()
                    .skip(1)
                    .map(|&a| self.render_inner(tree, a))
                    .collect();
                format!("{callee}({})", args.join(","))
            }
            NodeKind::Object => {
                let ctor = tree
                    .child(id, 0)
                    .map_or_else(|| "Object".to_string(), |c| self.render_inner(tree, c));
                let args: Vec<String> = tree
                    .children(id)
                    .iter()
                    .skip(1)
                    .map(|&a| self.render_inner(tree, a))
                    .collect();
                format!("new {ctor}({})", args.join(","))
            }
            NodeKind::Hook => {
                let part = |n: usize| {
                    tree.child(id, n)
                        .map_or_else(String::new, |c| self.render_inner(tree, c))
                };
                format!("{}?{}:{}", part(0), part(1), part(2))
            }
            NodeKind::Plus => {
                let part = |n: usize| {
                    tree.child(id, n)
                        .map_or_else(String::new, |c| self.render_inner(tree, c))
                };
                format!("{}+{}", part(0), part(1))
            }
            // Statement shapes never carry a renderable value.
            NodeKind::Script
            | NodeKind::Var
            | NodeKind::Declaration { .. }
            | NodeKind::Assign
            | NodeKind::Semicolon
            | NodeKind::Return => String::new(),
        }
    }
}
