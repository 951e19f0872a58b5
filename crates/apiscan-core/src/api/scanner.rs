//! Declaration scanner - finds the factory invocation and dispatches its
//! configuration sections
//!
//! A unit declares itself through one of three factory calls, recognized by
//! the dotted callee path. The scanner records the main descriptor, then
//! hands each recognized section of the configuration map to the matching
//! builder. Unknown sections warn and are skipped; extra factory calls warn
//! and the last one wins.

use rayon::prelude::*;
use std::collections::HashSet;

use super::types::{ApiUnit, DeclarationKind, MainInfo, NamingPolicy};
use crate::render::ValueRenderer;
use crate::tree::query;
use crate::tree::{Comment, NodeId, NodeKind, Tree};

/// The dotted callee paths recognized as unit declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryNames {
    /// Module factory path
    pub module: String,
    /// Interface factory path
    pub interface: String,
    /// Class factory path
    pub class: String,
}

impl Default for FactoryNames {
    fn default() -> Self {
        Self {
            module: "core.Module".to_string(),
            interface: "core.Interface".to_string(),
            class: "core.Class".to_string(),
        }
    }
}

impl FactoryNames {
    fn kind_of(&self, path: &str) -> Option<DeclarationKind> {
        if path == self.module {
            Some(DeclarationKind::Module)
        } else if path == self.interface {
            Some(DeclarationKind::Interface)
        } else if path == self.class {
            Some(DeclarationKind::Class)
        } else {
            None
        }
    }
}

/// Extracts the [`ApiUnit`] of a compilation unit from its syntax tree
#[derive(Debug, Clone, Default)]
pub struct ApiExtractor {
    factories: FactoryNames,
    policy: NamingPolicy,
    renderer: ValueRenderer,
}

impl ApiExtractor {
    /// Create an extractor with the default factory names, naming policy,
    /// and value renderer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the recognized factory paths
    #[must_use]
    pub fn with_factories(mut self, factories: FactoryNames) -> Self {
        self.factories = factories;
        self
    }

    /// Override the naming policy
    #[must_use]
    pub fn with_policy(mut self, policy: NamingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the value renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: ValueRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Extract documentation for one unit
    #[must_use]
    pub fn extract(&self, tree: &Tree, id: impl Into<String>) -> ApiUnit {
        let unit = ApiUnit::new(id.into(), tree.scope.uses());
        let mut extraction = Extraction {
            tree,
            renderer: &self.renderer,
            policy: self.policy,
            unit,
        };
        extraction.scan(&self.factories);
        extraction.unit
    }

    /// Extract many units in parallel.
    ///
    /// Units are independent: each worker reads its own tree and fills its
    /// own result, so this is a plain data-parallel map.
    #[must_use]
    pub fn extract_all(&self, units: &[(String, Tree)]) -> Vec<ApiUnit> {
        units
            .par_iter()
            .map(|(id, tree)| self.extract(tree, id.clone()))
            .collect()
    }
}

/// Extract many units in parallel with the default extractor configuration
#[must_use]
pub fn extract_units(units: &[(String, Tree)]) -> Vec<ApiUnit> {
    ApiExtractor::new().extract_all(units)
}

/// Working state of one unit extraction
pub(crate) struct Extraction<'a> {
    pub(crate) tree: &'a Tree,
    pub(crate) renderer: &'a ValueRenderer,
    pub(crate) policy: NamingPolicy,
    pub(crate) unit: ApiUnit,
}

#[derive(Clone, Copy)]
enum MemberSection {
    Members,
    Statics,
}

impl<'a> Extraction<'a> {
    pub(crate) fn warn(&mut self, message: impl Into<String>, line: u32) {
        self.unit.diagnostics_mut().warn(message, line);
    }

    /// The documentation comment attached to `id`, with the original's
    /// diagnostic side effects: a missing comment warns when documentation
    /// is required, an empty one always leaves a trace.
    pub(crate) fn doc_comment_at(
        &mut self,
        id: NodeId,
        context: &str,
        required: bool,
    ) -> Option<&'a Comment> {
        match query::doc_comment(self.tree, id) {
            Some(comment) => {
                if comment.text.is_empty() && required {
                    self.warn(
                        format!("Missing documentation text ({context})"),
                        self.tree.line(id),
                    );
                }
                Some(comment)
            }
            None => {
                if required {
                    self.warn(
                        format!("Missing documentation ({context})"),
                        self.tree.line(id),
                    );
                }
                None
            }
        }
    }

    fn scan(&mut self, factories: &FactoryNames) {
        let mut found: Vec<(DeclarationKind, NodeId)> = Vec::new();
        for id in self.tree.walk() {
            if !matches!(self.tree.kind(id), NodeKind::Call) {
                continue;
            }
            let path = self
                .tree
                .child(id, 0)
                .and_then(|callee| query::assemble_dot(self.tree, callee));
            if let Some(kind) = path.and_then(|p| factories.kind_of(&p)) {
                found.push((kind, id));
            }
        }

        for (index, (kind, call)) in found.iter().enumerate() {
            if index > 0 {
                self.warn(
                    format!("Multiple unit declarations; {kind} overrides the earlier one"),
                    self.tree.line(*call),
                );
            }
            self.set_main(*kind, *call);
            self.dispatch(*kind, *call);
        }
    }

    fn set_main(&mut self, kind: DeclarationKind, call: NodeId) {
        // The enclosing statement is the comment container for the
        // declaration itself.
        let main_node = self.tree.parent(call).unwrap_or(call);
        let doc = self
            .doc_comment_at(main_node, "Main", true)
            .and_then(|c| c.html.clone());
        self.unit.main = Some(MainInfo {
            kind,
            line: self.tree.line(main_node),
            doc,
        });
    }

    fn dispatch(&mut self, kind: DeclarationKind, call: NodeId) {
        let Some(config) = query::call_argument(self.tree, call, 1) else {
            return;
        };
        if !matches!(self.tree.kind(config), NodeKind::Map) {
            return;
        }

        for (section, entry) in query::map_entries(self.tree, config) {
            match section.as_str() {
                "construct" => {
                    if kind == DeclarationKind::Class {
                        self.add_constructor(entry.value, entry.pair);
                    } else {
                        self.warn(
                            format!("Invalid section in {kind}: construct"),
                            self.tree.line(entry.pair),
                        );
                    }
                }
                "properties" => self.scan_properties(entry.value),
                "events" => self.scan_events(entry.value),
                "members" => self.scan_members(entry.value, MemberSection::Members),
                "statics" => self.scan_members(entry.value, MemberSection::Statics),
                other => self.warn(
                    format!("Invalid section in {kind}: {other}"),
                    self.tree.line(entry.pair),
                ),
            }
        }
    }

    fn scan_members(&mut self, map: NodeId, section: MemberSection) {
        let mut collection = match section {
            MemberSection::Members => self.unit.members.take(),
            MemberSection::Statics => self.unit.statics.take(),
        }
        .unwrap_or_default();

        for (name, entry) in query::map_entries(self.tree, map) {
            let mut visited = HashSet::new();
            self.add_entry(&name, entry.value, entry.pair, &mut collection, &mut visited);
        }

        match section {
            MemberSection::Members => self.unit.members = Some(collection),
            MemberSection::Statics => self.unit.statics = Some(collection),
        }
    }

    fn scan_properties(&mut self, map: NodeId) {
        let mut collection = self.unit.properties.take().unwrap_or_default();
        for (name, entry) in query::map_entries(self.tree, map) {
            self.add_property(&name, entry.value, &mut collection);
        }
        self.unit.properties = Some(collection);
    }

    fn scan_events(&mut self, map: NodeId) {
        let mut collection = self.unit.events.take().unwrap_or_default();
        for (name, entry) in query::map_entries(self.tree, map) {
            let mut visited = HashSet::new();
            self.add_event(&name, entry.value, entry.pair, &mut collection, &mut visited);
        }
        self.unit.events = Some(collection);
    }
}
