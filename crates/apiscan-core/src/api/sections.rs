//! Section builders for properties, events, and the constructor
//!
//! These apply their own field rules and delegate nothing but event-carrier
//! aliasing to recursion; member and static typing lives in the resolver.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

use super::scanner::Extraction;
use super::types::{ConstructorEntry, EventEntry, ParamEntry, PropertyEntry};
use crate::tree::query;
use crate::tree::{NodeId, NodeKind};

impl Extraction<'_> {
    /// Build one property entry from its configuration map.
    pub(crate) fn add_property(
        &mut self,
        name: &str,
        value: NodeId,
        collection: &mut BTreeMap<String, PropertyEntry>,
    ) {
        let mut entry = PropertyEntry::new();

        // Fetched for its diagnostics; property entries carry no doc text.
        let _ = self.doc_comment_at(value, &format!("Property '{name}'"), true);

        // type and fire are copied only when authored as string literals.
        if let Some(ty) = query::key_value(self.tree, value, "type") {
            if let NodeKind::String { value: s } = self.tree.kind(ty) {
                entry.ty = Some(s.clone());
            }
        }
        if let Some(fire) = query::key_value(self.tree, value, "fire") {
            if let NodeKind::String { value: s } = self.tree.kind(fire) {
                entry.fire = Some(s.clone());
            }
        }

        let init = query::key_value(self.tree, value, "init");
        if let Some(init) = init {
            entry.init = Some(self.renderer.render(self.tree, init));
        }

        // Nullability defaults from the initializer unless explicitly
        // authored: a present non-null init means not nullable.
        entry.nullable = match query::key_value(self.tree, value, "nullable") {
            Some(flag) => matches!(self.tree.kind(flag), NodeKind::Boolean { value: true }),
            None => init.map_or(true, |i| matches!(self.tree.kind(i), NodeKind::Null)),
        };

        // Only the presence of an apply hook matters, not its body.
        if let Some(apply) = query::key_value(self.tree, value, "apply") {
            if matches!(self.tree.kind(apply), NodeKind::Function { .. }) {
                entry.apply = Some(true);
            }
        }

        if let Some(flag) = query::key_value(self.tree, value, "themeable") {
            if matches!(self.tree.kind(flag), NodeKind::Boolean { value: true }) {
                entry.themeable = Some(true);
            }
        }
        if let Some(flag) = query::key_value(self.tree, value, "inheritable") {
            if matches!(self.tree.kind(flag), NodeKind::Boolean { value: true }) {
                entry.inheritable = Some(true);
            }
        }

        if let Some(group) = query::key_value(self.tree, value, "group") {
            let names = self.group_member_names(group);
            if !names.is_empty() {
                entry.group = Some(names);
                // Shorthand only means anything for grouped properties.
                if let Some(flag) = query::key_value(self.tree, value, "shorthand") {
                    if matches!(self.tree.kind(flag), NodeKind::Boolean { value: true }) {
                        entry.shorthand = Some(true);
                    }
                }
            }
        }

        collection.insert(name.to_string(), entry);
    }

    fn group_member_names(&self, group: NodeId) -> Vec<String> {
        if !matches!(self.tree.kind(group), NodeKind::Array) {
            return Vec::new();
        }
        self.tree
            .children(group)
            .iter()
            .map(|&member| match self.tree.kind(member) {
                NodeKind::String { value } => value.clone(),
                NodeKind::Identifier { name } => name.clone(),
                _ => self.renderer.render(self.tree, member),
            })
            .collect()
    }

    /// Build one event entry from its carrier expression.
    ///
    /// Dotted paths render directly; bare identifiers are chased through
    /// visible assignments with the same guard the resolver uses. The
    /// comment's declared type wins over everything, with its first return
    /// type as a tolerated fallback for authors who wrote return-style
    /// annotations.
    pub(crate) fn add_event(
        &mut self,
        name: &str,
        value: NodeId,
        comment_node: NodeId,
        collection: &mut BTreeMap<String, EventEntry>,
        visited: &mut HashSet<NodeId>,
    ) {
        collection.entry(name.to_string()).or_default();

        match self.tree.kind(value) {
            NodeKind::Dot => {
                if let Some(path) = query::assemble_dot(self.tree, value) {
                    if let Some(e) = collection.get_mut(name) {
                        e.ty = Some(path);
                    }
                }
            }
            NodeKind::Identifier { name: ident } => {
                let ident = ident.clone();
                if let Some(e) = collection.get_mut(name) {
                    e.ty = Some(ident.clone());
                }
                if visited.insert(value) {
                    if let Some(first) = query::find_assignments(self.tree, &ident).first() {
                        // Keep the original comment anchor when it already
                        // documents the event; a shared carrier variable may
                        // serve several differently documented events.
                        let anchor = if query::find_comment_node(self.tree, comment_node).is_some()
                        {
                            comment_node
                        } else {
                            first.site
                        };
                        let carrier = first.value;
                        self.add_event(name, carrier, anchor, collection, visited);
                        return;
                    }
                } else {
                    self.warn(
                        format!("Circular event reference for '{name}'"),
                        self.tree.line(value),
                    );
                }
            }
            _ => {}
        }

        let comment = self.doc_comment_at(comment_node, &format!("Event '{name}'"), true);
        if let Some(comment) = comment {
            if let Some(e) = collection.get_mut(name) {
                if let Some(declared) = &comment.ty {
                    e.ty = Some(declared.clone());
                } else if let Some(first) = comment.returns.first() {
                    e.ty = Some(first.clone());
                }
                if let Some(html) = &comment.html {
                    e.doc = Some(html.clone());
                }
            }
        }
    }

    /// Build the constructor entry from its function literal.
    pub(crate) fn add_constructor(&mut self, value: NodeId, comment_node: NodeId) {
        let mut entry = ConstructorEntry::default();

        let declared = query::function_params(self.tree, value).map(<[String]>::to_vec);
        if let Some(params) = declared {
            let mut seeded: IndexMap<String, ParamEntry> = params
                .iter()
                .map(|p| (p.clone(), ParamEntry::default()))
                .collect();

            if params.is_empty() {
                entry.params = Some(seeded);
                self.unit.constructor = Some(entry);
                return;
            }

            if let Some(comment) = self.doc_comment_at(comment_node, "Constructor", true) {
                if comment.params.is_empty() {
                    self.warn(
                        "Documentation for constructor parameters is missing".to_string(),
                        self.tree.line(value),
                    );
                } else {
                    let documented: Vec<(String, Option<ParamEntry>)> = params
                        .iter()
                        .map(|p| {
                            let found = comment.params.get(p).map(|c| ParamEntry {
                                ty: c.ty.clone(),
                                doc: c.doc.clone(),
                            });
                            (p.clone(), found)
                        })
                        .collect();
                    for (param, found) in documented {
                        match found {
                            Some(doc) => {
                                seeded.insert(param, doc);
                            }
                            None => self.warn(
                                format!(
                                    "Missing documentation for parameter {param} in constructor"
                                ),
                                self.tree.line(value),
                            ),
                        }
                    }
                }
            }
            entry.params = Some(seeded);
        }

        self.unit.constructor = Some(entry);
    }
}
