//! Data model for extracted API documentation
//!
//! One [`ApiUnit`] per compilation unit. Section mappings are sparse: an
//! attribute that was never populated stays `None` and is omitted from every
//! serialization, never emitted as null.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::diagnostics::Diagnostics;
use crate::tree::NodeKind;

/// Which factory declared the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclarationKind {
    /// Plain namespace of statics
    Module,
    /// Abstract member contract
    Interface,
    /// Instantiable class
    Class,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Module => write!(f, "Module"),
            DeclarationKind::Interface => write!(f, "Interface"),
            DeclarationKind::Class => write!(f, "Class"),
        }
    }
}

/// The unit's main descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainInfo {
    /// Declaring factory kind
    #[serde(rename = "declarationKind")]
    pub kind: DeclarationKind,
    /// Source line of the declaring statement
    pub line: u32,
    /// Rendered documentation of the declaration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Member visibility, derived purely from the symbol name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Part of the public API
    Public,
    /// Reserved for subclasses
    Protected,
    /// Implementation detail
    Private,
}

/// Name-driven conventions, pluggable because the underscore-to-visibility
/// mapping is a project convention rather than a language rule
#[derive(Debug, Clone, Copy)]
pub struct NamingPolicy {
    /// Maps a symbol name to its visibility
    pub visibility: fn(&str) -> Visibility,
    /// Whether a symbol of this name must carry documentation
    pub requires_doc: fn(&str) -> bool,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            visibility: default_visibility,
            requires_doc: default_requires_doc,
        }
    }
}

/// Default convention: `__name` is private, `_name` is protected
#[must_use]
pub fn default_visibility(name: &str) -> Visibility {
    if name.starts_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

/// Default convention: only public symbols must be documented
#[must_use]
pub fn default_requires_doc(name: &str) -> bool {
    default_visibility(name) == Visibility::Public
}

/// Whether a name denotes a constant (it equals its own upper-casing)
#[must_use]
pub fn is_constant(name: &str) -> bool {
    name.to_uppercase() == name
}

/// Structural classification of a value node, before any comment override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralType {
    String,
    Number,
    Boolean,
    Function,
    Array,
    Map,
    RegExp,
    Object,
    Null,
    Void,
    Call,
    Hook,
    Identifier,
    Plus,
}

impl StructuralType {
    /// Classify a node shape
    #[must_use]
    pub fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::String { .. } => StructuralType::String,
            NodeKind::Number { .. } => StructuralType::Number,
            NodeKind::Boolean { .. } => StructuralType::Boolean,
            NodeKind::Function { .. } => StructuralType::Function,
            NodeKind::Array => StructuralType::Array,
            NodeKind::Map | NodeKind::PropertyInit => StructuralType::Map,
            NodeKind::RegExp { .. } => StructuralType::RegExp,
            NodeKind::Object => StructuralType::Object,
            NodeKind::Null => StructuralType::Null,
            NodeKind::Call => StructuralType::Call,
            NodeKind::Hook => StructuralType::Hook,
            NodeKind::Identifier { .. } | NodeKind::Dot => StructuralType::Identifier,
            NodeKind::Plus => StructuralType::Plus,
            // Statement shapes never carry a value.
            NodeKind::Void
            | NodeKind::Script
            | NodeKind::Var
            | NodeKind::Declaration { .. }
            | NodeKind::Assign
            | NodeKind::Semicolon
            | NodeKind::Return => StructuralType::Void,
        }
    }

    /// The documentation label for this classification
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            StructuralType::String => "String",
            StructuralType::Number => "Number",
            StructuralType::Boolean => "Boolean",
            StructuralType::Function => "Function",
            StructuralType::Array => "Array",
            StructuralType::Map => "Map",
            StructuralType::RegExp => "RegExp",
            StructuralType::Object => "Object",
            StructuralType::Null => "Null",
            StructuralType::Void => "Void",
            StructuralType::Call => "Call",
            StructuralType::Hook => "Hook",
            StructuralType::Identifier => "Identifier",
            StructuralType::Plus => "Plus",
        }
    }

    /// Whether this label still needs structural resolution
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(
            self,
            StructuralType::Call
                | StructuralType::Hook
                | StructuralType::Identifier
                | StructuralType::Plus
        )
    }

    /// Whether a ternary branch of this type is worth keeping
    #[must_use]
    pub const fn is_informative(self) -> bool {
        !matches!(self, StructuralType::Void | StructuralType::Null)
    }
}

/// Documentation of one function parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParamEntry {
    /// Declared parameter type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Rendered parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A resolved member or static entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberEntry {
    /// Terminal type label
    #[serde(rename = "type")]
    pub ty: String,
    /// Line of the node that finally resolved the type
    pub line: u32,
    /// Name-derived visibility
    pub visibility: Visibility,
    /// Whether the name denotes a constant; omitted when false
    #[serde(skip_serializing_if = "is_false")]
    pub constant: bool,
    /// Human-readable literal rendering, when it adds anything over `type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Rendered documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Free-form documentation tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    /// Parameters in declaration order, for function members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<IndexMap<String, ParamEntry>>,
    /// Return type labels, for function members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<Vec<String>>,
}

impl MemberEntry {
    pub(crate) fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            line: 0,
            visibility: Visibility::Public,
            constant: false,
            value: None,
            doc: None,
            tags: None,
            params: None,
            returns: None,
        }
    }
}

/// A declared property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    /// Authored property type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Event type fired on change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire: Option<String>,
    /// Human-readable default value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init: Option<String>,
    /// Whether the property accepts null
    pub nullable: bool,
    /// Present and true when an apply hook function is defined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<bool>,
    /// Theme system participation flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themeable: Option<bool>,
    /// Inheritance participation flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritable: Option<bool>,
    /// Member names of a property group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<String>>,
    /// Shorthand expansion flag, only meaningful for groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shorthand: Option<bool>,
}

impl PropertyEntry {
    pub(crate) fn new() -> Self {
        Self {
            ty: None,
            fire: None,
            init: None,
            nullable: true,
            apply: None,
            themeable: None,
            inheritable: None,
            group: None,
            shorthand: None,
        }
    }
}

/// A declared event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventEntry {
    /// Resolved event type: a dotted path or an inferred label
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    /// Rendered documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// The constructor of a class unit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstructorEntry {
    /// Parameters in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<IndexMap<String, ParamEntry>>,
}

/// Extracted documentation of one compilation unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiUnit {
    /// The unit's main descriptor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<MainInfo>,
    /// The class constructor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorEntry>,
    /// Static members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statics: Option<BTreeMap<String, MemberEntry>>,
    /// Declared properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyEntry>>,
    /// Declared events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, EventEntry>>,
    /// Instance members
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<BTreeMap<String, MemberEntry>>,
    /// Unit id
    pub id: String,
    /// Cross-unit usage data, passed through from the scope analyzer
    pub uses: BTreeMap<String, serde_json::Value>,
    /// Warnings collected during extraction
    #[serde(skip)]
    diagnostics: Diagnostics,
}

impl ApiUnit {
    pub(crate) fn new(id: String, uses: BTreeMap<String, serde_json::Value>) -> Self {
        let diagnostics = Diagnostics::new(id.clone());
        Self {
            main: None,
            constructor: None,
            statics: None,
            properties: None,
            events: None,
            members: None,
            id,
            uses,
            diagnostics,
        }
    }

    /// The warnings collected while this unit was extracted
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_is_pure_in_the_name() {
        assert_eq!(default_visibility("render"), Visibility::Public);
        assert_eq!(default_visibility("_layout"), Visibility::Protected);
        assert_eq!(default_visibility("__cache"), Visibility::Private);
        // Same name, same answer, no context involved.
        assert_eq!(default_visibility("_layout"), default_visibility("_layout"));
    }

    #[test]
    fn test_constant_rule() {
        assert!(is_constant("MAX_WIDTH"));
        assert!(is_constant("X"));
        assert!(!is_constant("maxWidth"));
        assert!(!is_constant("Max"));
    }

    #[test]
    fn test_structural_vocabulary() {
        assert_eq!(
            StructuralType::of(&NodeKind::String {
                value: String::new()
            }),
            StructuralType::String
        );
        assert_eq!(StructuralType::of(&NodeKind::Hook), StructuralType::Hook);
        assert_eq!(
            StructuralType::of(&NodeKind::Dot),
            StructuralType::Identifier
        );
        assert!(StructuralType::Call.is_transient());
        assert!(!StructuralType::Map.is_transient());
        assert!(!StructuralType::Null.is_informative());
        assert!(StructuralType::String.is_informative());
    }

    #[test]
    fn test_member_entry_sparse_serialization() {
        let entry = MemberEntry {
            line: 4,
            visibility: Visibility::Protected,
            ..MemberEntry::new("Number")
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["type"], "Number");
        assert_eq!(json["visibility"], "protected");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("constant"));
        assert!(!object.contains_key("value"));
        assert!(!object.contains_key("params"));
    }
}
