//! Navigation helpers over the syntax tree
//!
//! Everything the extraction engine needs to ask of a tree lives here:
//! dotted-path assembly, factory-call lookup, map-literal addressing,
//! assignment search, and comment anchoring.

use super::{Comment, NodeId, NodeKind, Tree};

/// Assemble a dotted member path (`foo.bar.Baz`) from a `Dot` chain or a
/// bare identifier. Returns `None` for any other shape.
#[must_use]
pub fn assemble_dot(tree: &Tree, id: NodeId) -> Option<String> {
    match tree.kind(id) {
        NodeKind::Identifier { name } => Some(name.clone()),
        NodeKind::Dot => {
            let base = assemble_dot(tree, tree.child(id, 0)?)?;
            let member = assemble_dot(tree, tree.child(id, 1)?)?;
            Some(format!("{base}.{member}"))
        }
        _ => None,
    }
}

/// All calls whose callee assembles to `path`, in document order
#[must_use]
pub fn find_calls(tree: &Tree, path: &str) -> Vec<NodeId> {
    tree.walk()
        .filter(|&id| {
            matches!(tree.kind(id), NodeKind::Call)
                && tree
                    .child(id, 0)
                    .and_then(|callee| assemble_dot(tree, callee))
                    .is_some_and(|p| p == path)
        })
        .collect()
}

/// The `n`-th argument of a call (0-based, callee excluded)
#[must_use]
pub fn call_argument(tree: &Tree, call: NodeId, n: usize) -> Option<NodeId> {
    if !matches!(tree.kind(call), NodeKind::Call) {
        return None;
    }
    tree.child(call, n + 1)
}

/// One key/value pair of a map literal
#[derive(Debug, Clone, Copy)]
pub struct MapEntry {
    /// The `PropertyInit` pair node (the comment container for the entry)
    pub pair: NodeId,
    /// The value expression
    pub value: NodeId,
}

/// The entries of a map literal, keyed by their string or identifier key.
///
/// Pairs with a non-literal key or a missing value are skipped.
#[must_use]
pub fn map_entries(tree: &Tree, map: NodeId) -> Vec<(String, MapEntry)> {
    if !matches!(tree.kind(map), NodeKind::Map) {
        return Vec::new();
    }
    tree.children(map)
        .iter()
        .filter_map(|&pair| {
            if !matches!(tree.kind(pair), NodeKind::PropertyInit) {
                return None;
            }
            let key = match tree.kind(tree.child(pair, 0)?) {
                NodeKind::String { value } => value.clone(),
                NodeKind::Identifier { name } => name.clone(),
                _ => return None,
            };
            let value = tree.child(pair, 1)?;
            Some((key, MapEntry { pair, value }))
        })
        .collect()
}

/// The value node stored under `key` in a map literal
#[must_use]
pub fn key_value(tree: &Tree, map: NodeId, key: &str) -> Option<NodeId> {
    map_entries(tree, map)
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, entry)| entry.value)
}

/// First function literal in the subtree rooted at `id`, `id` included
#[must_use]
pub fn find_function(tree: &Tree, id: NodeId) -> Option<NodeId> {
    tree.walk_from(id)
        .find(|&n| matches!(tree.kind(n), NodeKind::Function { .. }))
}

/// First `return` statement inside `id`, without descending into nested
/// function literals
#[must_use]
pub fn find_return(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = tree.children(id).iter().rev().copied().collect();
    while let Some(n) = stack.pop() {
        match tree.kind(n) {
            NodeKind::Return => return Some(n),
            NodeKind::Function { .. } => {}
            _ => stack.extend(tree.children(n).iter().rev()),
        }
    }
    None
}

/// Parameter names of a function literal, in declaration order
#[must_use]
pub fn function_params(tree: &Tree, id: NodeId) -> Option<&[String]> {
    match tree.kind(id) {
        NodeKind::Function { params } => Some(params),
        _ => None,
    }
}

/// An assignment site for a named symbol
#[derive(Debug, Clone, Copy)]
pub struct Assignment {
    /// The declarator or assignment node
    pub site: NodeId,
    /// The assigned value expression
    pub value: NodeId,
}

/// All assignments to `name` visible in the unit, in document order.
///
/// Covers `var name = value` declarators and `name = value` assignment
/// expressions. Resolution never crosses unit boundaries, so the whole tree
/// is the search scope.
#[must_use]
pub fn find_assignments(tree: &Tree, name: &str) -> Vec<Assignment> {
    tree.walk()
        .filter_map(|id| match tree.kind(id) {
            NodeKind::Declaration { name: declared } if declared == name => {
                let value = tree.child(id, 0)?;
                Some(Assignment { site: id, value })
            }
            NodeKind::Assign => {
                let target = tree.child(id, 0)?;
                let assigned = assemble_dot(tree, target)?;
                if assigned == name {
                    let value = tree.child(id, 1)?;
                    Some(Assignment { site: id, value })
                } else {
                    None
                }
            }
            _ => None,
        })
        .collect()
}

/// The documentation comment attached directly to a node
#[must_use]
pub fn doc_comment(tree: &Tree, id: NodeId) -> Option<&Comment> {
    tree.comments(id).iter().find(|c| c.is_doc())
}

/// The nearest node, starting at `id` and walking up the parent chain, that
/// carries a documentation comment
#[must_use]
pub fn find_comment_node(tree: &Tree, id: NodeId) -> Option<NodeId> {
    let mut current = Some(id);
    while let Some(n) = current {
        if doc_comment(tree, n).is_some() {
            return Some(n);
        }
        current = tree.parent(n);
    }
    None
}
