//! Recursive type resolution for member and static entries
//!
//! A symbol's value expression is classified through the structural
//! vocabulary and, while the label is still transient (a call, a ternary, an
//! identifier, an additive operator), resolution re-enters itself on a
//! derived node: the first return of the called closure, the informative
//! ternary branch, the aliased assignment value. An author-declared comment
//! type short-circuits the descent. Every re-entry passes a per-symbol
//! visited set, so mutually referencing assignments terminate with a
//! diagnostic instead of recursing forever.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

use super::scanner::Extraction;
use super::types::{is_constant, MemberEntry, ParamEntry, StructuralType};
use crate::tree::query;
use crate::tree::{NodeId, NodeKind, Tree};

impl Extraction<'_> {
    /// Resolve `value` into `collection[name]`, creating or updating the
    /// entry in place.
    pub(crate) fn add_entry(
        &mut self,
        name: &str,
        value: NodeId,
        comment_node: NodeId,
        collection: &mut BTreeMap<String, MemberEntry>,
        visited: &mut HashSet<NodeId>,
    ) {
        if !visited.insert(value) {
            self.warn(
                format!("Circular value reference for '{name}'"),
                self.tree.line(value),
            );
            return;
        }

        let structural = StructuralType::of(self.tree.kind(value));
        let entry = collection
            .entry(name.to_string())
            .or_insert_with(|| MemberEntry::new(structural.label()));

        // Generic data is rewritten on every (re-)resolution pass; the
        // name-derived fields cannot change, the line tracks the node that
        // finally resolves the type.
        entry.line = self.tree.line(value);
        entry.visibility = (self.policy.visibility)(name);
        entry.constant = is_constant(name);

        let current = entry.ty.clone();

        // Structural indirection is handled before anything else.
        if current == "Call" || current == "Hook" {
            if let Some(anchor) = query::find_comment_node(self.tree, comment_node) {
                let context = format!("Call/Hook '{name}'");
                let comment = self.doc_comment_at(anchor, &context, true);

                // An authored type is authoritative: adopt it and re-run the
                // terminal steps against the same node.
                if let Some(declared) = comment.and_then(|c| c.ty.clone()) {
                    if declared != current {
                        if let Some(e) = collection.get_mut(name) {
                            e.ty = declared;
                        }
                        visited.remove(&value);
                        self.add_entry(name, value, anchor, collection, visited);
                        return;
                    }
                } else if let Some(func) = query::find_function(self.tree, anchor) {
                    // The author documented a nested function, not its call
                    // wrapper: switch to the function for re-analysis.
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = StructuralType::Function.label().to_string();
                    }
                    self.add_entry(name, func, anchor, collection, visited);
                    return;
                }
            }

            if current == "Call" {
                if self.resolve_call(name, value, collection, visited) {
                    return;
                }
            } else {
                self.resolve_hook(name, value, collection, visited);
                return;
            }
        }

        // Identifier aliasing: follow the nearest visible assignment.
        let current = entry_type(collection, name);
        if current == "Identifier" {
            if let Some(ident) = query::assemble_dot(self.tree, value) {
                let assignments = query::find_assignments(self.tree, &ident);
                if assignments.is_empty() {
                    // No assignment in sight: the referenced name itself is
                    // the most meaningful label available.
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = ident;
                    }
                } else {
                    // Prefer the first assignment whose statement carries
                    // documentation; the value always comes from the first.
                    let anchor = assignments.iter().find_map(|a| {
                        if query::doc_comment(self.tree, a.site).is_some() {
                            return Some(a.site);
                        }
                        let parent = self.tree.parent(a.site)?;
                        query::doc_comment(self.tree, parent).is_some().then_some(parent)
                    });
                    let first = assignments[0].value;
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = StructuralType::of(self.tree.kind(first)).label().to_string();
                    }
                    self.add_entry(name, first, anchor.unwrap_or(first), collection, visited);
                    return;
                }
            }
        }

        // Coercion heuristics on the remaining special shapes.
        let current = entry_type(collection, name);
        if current == "Plus" {
            if let Some(e) = collection.get_mut(name) {
                e.ty = detect_plus_type(self.tree, value).to_string();
            }
        } else if current == "Object" {
            let detected = detect_object_type(self.tree, value);
            if let Some(e) = collection.get_mut(name) {
                e.ty = detected;
            }
        }

        // Human readable value, kept only when it adds anything.
        let rendered = self.renderer.render(self.tree, value);
        if let Some(e) = collection.get_mut(name) {
            e.value = (!rendered.is_empty() && rendered != e.ty).then_some(rendered);
        }

        // Merge authored documentation.
        let current = entry_type(collection, name);
        let context = format!("Member/Static '{name}' ({current})");
        let required = (self.policy.requires_doc)(name);
        let comment = self.doc_comment_at(comment_node, &context, required);
        if let Some(comment) = comment {
            if let Some(e) = collection.get_mut(name) {
                if let Some(declared) = &comment.ty {
                    e.ty = declared.clone();
                }
                if let Some(html) = &comment.html {
                    e.doc = Some(html.clone());
                }
                if !comment.tags.is_empty() {
                    e.tags = Some(comment.tags.clone());
                }
            }
        }

        // Function entries additionally carry params and returns.
        if entry_type(collection, name) == "Function" {
            self.enrich_function(name, value, comment_node, collection);
        }
    }

    /// Follow a call to the first return of the invoked function.
    ///
    /// Returns `true` when resolution was delegated to a recursive call.
    fn resolve_call(
        &mut self,
        name: &str,
        value: NodeId,
        collection: &mut BTreeMap<String, MemberEntry>,
        visited: &mut HashSet<NodeId>,
    ) -> bool {
        let mut function = None;
        if let Some(callee) = self.tree.child(value, 0) {
            match self.tree.kind(callee) {
                NodeKind::Function { .. } => function = Some(callee),
                NodeKind::Identifier { name: callee_name } => {
                    let callee_name = callee_name.clone();
                    function = query::find_assignments(self.tree, &callee_name)
                        .first()
                        .map(|a| a.value);
                }
                _ => {}
            }
        }

        match function {
            Some(func) if matches!(self.tree.kind(func), NodeKind::Function { .. }) => {
                if let Some(returned) =
                    query::find_return(self.tree, func).and_then(|r| self.tree.child(r, 0))
                {
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = StructuralType::of(self.tree.kind(returned))
                            .label()
                            .to_string();
                    }
                    self.add_entry(name, returned, returned, collection, visited);
                    true
                } else {
                    // Calling a function without a return yields undefined.
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = StructuralType::Void.label().to_string();
                    }
                    false
                }
            }
            _ => {
                self.warn(
                    format!("Unresolvable call value for '{name}'"),
                    self.tree.line(value),
                );
                if let Some(e) = collection.get_mut(name) {
                    e.ty = StructuralType::Object.label().to_string();
                }
                false
            }
        }
    }

    /// Resolve a ternary through its branches: the then-branch wins whenever
    /// it is informative, otherwise the else-branch is tried for better data
    /// than null/void.
    fn resolve_hook(
        &mut self,
        name: &str,
        value: NodeId,
        collection: &mut BTreeMap<String, MemberEntry>,
        visited: &mut HashSet<NodeId>,
    ) {
        let Some(then_branch) = self.tree.child(value, 1) else {
            return;
        };
        let then_type = StructuralType::of(self.tree.kind(then_branch));

        let branch = if then_type.is_informative() {
            then_branch
        } else if let Some(else_branch) = self.tree.child(value, 2) {
            else_branch
        } else {
            then_branch
        };

        if let Some(e) = collection.get_mut(name) {
            e.ty = StructuralType::of(self.tree.kind(branch)).label().to_string();
        }
        self.add_entry(name, branch, branch, collection, visited);
    }

    /// Seed params from the declared signature, derive a best-effort return
    /// type, then let the comment enrich both.
    fn enrich_function(
        &mut self,
        name: &str,
        value: NodeId,
        comment_node: NodeId,
        collection: &mut BTreeMap<String, MemberEntry>,
    ) {
        let declared = query::function_params(self.tree, value).map(<[String]>::to_vec);
        if let Some(params) = &declared {
            let seeded: IndexMap<String, ParamEntry> = params
                .iter()
                .map(|p| (p.clone(), ParamEntry::default()))
                .collect();
            if let Some(e) = collection.get_mut(name) {
                e.params = Some(seeded);
            }
        }
        let params = declared.unwrap_or_default();

        // First return statement decides the derived return type.
        if let Some(returned) =
            query::find_return(self.tree, value).and_then(|r| self.tree.child(r, 0))
        {
            let label = StructuralType::of(self.tree.kind(returned)).label();
            if let Some(e) = collection.get_mut(name) {
                e.returns = Some(vec![label.to_string()]);
            }
        }

        let Some(comment) = query::doc_comment(self.tree, comment_node) else {
            return;
        };

        if !comment.returns.is_empty() {
            if let Some(e) = collection.get_mut(name) {
                e.returns = Some(comment.returns.clone());
            }
        }

        if params.is_empty() {
            return;
        }
        if comment.params.is_empty() {
            self.warn(
                format!("Documentation for parameters of function '{name}' is missing"),
                self.tree.line(value),
            );
            return;
        }
        for param in &params {
            if let Some(documented) = comment.params.get(param) {
                let documented = ParamEntry {
                    ty: documented.ty.clone(),
                    doc: documented.doc.clone(),
                };
                if let Some(e) = collection.get_mut(name) {
                    if let Some(map) = e.params.as_mut() {
                        map.insert(param.clone(), documented);
                    }
                }
            } else {
                self.warn(
                    format!("Missing documentation for parameter {param} in function '{name}'"),
                    self.tree.line(value),
                );
            }
        }
    }
}

fn entry_type(collection: &BTreeMap<String, MemberEntry>, name: &str) -> String {
    collection.get(name).map(|e| e.ty.clone()).unwrap_or_default()
}

/// Additive coercion: a string on either side (at any depth of a nested
/// additive chain) produces a string, everything else stays numeric.
fn detect_plus_type(tree: &Tree, id: NodeId) -> &'static str {
    fn stringish(tree: &Tree, id: NodeId) -> bool {
        match tree.kind(id) {
            NodeKind::String { .. } => true,
            NodeKind::Plus => tree.children(id).iter().any(|&c| stringish(tree, c)),
            _ => false,
        }
    }
    if stringish(tree, id) {
        StructuralType::String.label()
    } else {
        StructuralType::Number.label()
    }
}

/// Constructor detection: `new foo.Bar(...)` documents as `foo.Bar`,
/// anything else stays the generic object label.
fn detect_object_type(tree: &Tree, id: NodeId) -> String {
    if matches!(tree.kind(id), NodeKind::Object) {
        if let Some(path) = tree.child(id, 0).and_then(|c| query::assemble_dot(tree, c)) {
            return path;
        }
    }
    StructuralType::Object.label().to_string()
}
