//! Comments attached to syntax nodes
//!
//! The comment-markup renderer runs before extraction: documentation
//! comments arrive here with their `html` rendering and any parsed `type`,
//! `returns`, `params`, and `tags` data already in place. apiscan only binds
//! them to symbols and merges their fields.

use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Distinguishes documentation comments from ordinary ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentVariant {
    /// Documentation block (`/** ... */`)
    Doc,
    /// Ordinary line comment (`// ...`)
    Line,
    /// Ordinary block comment (`/* ... */`)
    Block,
}

/// Parsed documentation for a single parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentParam {
    /// Declared parameter type
    pub ty: Option<String>,
    /// Rendered parameter description
    pub doc: Option<String>,
}

impl CommentParam {
    /// Create a parameter doc with both fields set
    #[must_use]
    pub fn new(ty: impl Into<String>, doc: impl Into<String>) -> Self {
        Self {
            ty: Some(ty.into()),
            doc: Some(doc.into()),
        }
    }
}

/// A comment attached to a syntax node
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// The comment variant
    pub variant: CommentVariant,
    /// Raw comment text, markup included
    pub text: String,
    /// Rendered description markup
    pub html: Option<String>,
    /// Declared type annotation
    pub ty: Option<String>,
    /// Declared return types, in declaration order
    pub returns: Vec<String>,
    /// Per-parameter documentation, in declaration order
    pub params: IndexMap<String, CommentParam>,
    /// Free-form tags
    pub tags: BTreeSet<String>,
}

impl Comment {
    /// Create a documentation comment from its raw text
    #[must_use]
    pub fn doc(text: impl Into<String>) -> Self {
        Self::new(CommentVariant::Doc, text)
    }

    /// Create an ordinary comment
    #[must_use]
    pub fn plain(variant: CommentVariant, text: impl Into<String>) -> Self {
        Self::new(variant, text)
    }

    fn new(variant: CommentVariant, text: impl Into<String>) -> Self {
        Self {
            variant,
            text: text.into(),
            html: None,
            ty: None,
            returns: Vec::new(),
            params: IndexMap::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Set the rendered markup
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the declared type
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Append a declared return type
    #[must_use]
    pub fn with_return(mut self, ty: impl Into<String>) -> Self {
        self.returns.push(ty.into());
        self
    }

    /// Add documentation for one parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, param: CommentParam) -> Self {
        self.params.insert(name.into(), param);
        self
    }

    /// Add a free-form tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Whether this is a documentation comment
    #[must_use]
    pub fn is_doc(&self) -> bool {
        self.variant == CommentVariant::Doc
    }
}
