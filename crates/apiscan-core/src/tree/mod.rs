//! Syntax tree interface for the apiscan extraction engine
//!
//! The parser is an external collaborator: it produces a [`Tree`] through
//! [`TreeBuilder`] and apiscan only reads it. Nodes live in a flat arena and
//! are addressed by [`NodeId`], which keeps parent links cheap and gives the
//! resolver a stable identity for its visited-set guard.

mod comment;
pub mod query;
mod scope;

pub use comment::{Comment, CommentParam, CommentVariant};
pub use scope::ScopeInfo;

use std::fmt;

/// Stable index of a node within its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The closed vocabulary of syntax node shapes
///
/// Statement shapes (`Script`, `Var`, `Semicolon`, ...) matter to the engine
/// only as comment containers and assignment sites; value shapes are what the
/// resolver classifies.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Compilation unit root; children are statements
    Script,
    /// `var` statement; children are declarations
    Var,
    /// Single declarator inside a `var`; child 0 is the optional initializer
    Declaration {
        /// Declared variable name
        name: String,
    },
    /// Assignment expression; children are target and value
    Assign,
    /// Expression statement; child 0 is the wrapped expression
    Semicolon,
    /// `return` statement; child 0 is the returned expression, if any
    Return,
    /// Call expression; child 0 is the callee, remaining children are arguments
    Call,
    /// Ternary conditional; children are condition, then-branch, else-branch
    Hook,
    /// Plain identifier reference
    Identifier {
        /// Referenced name
        name: String,
    },
    /// Member access; children are the base expression and the member identifier
    Dot,
    /// Additive operator; children are the two operands
    Plus,
    /// Constructor invocation `new Expr(...)`; child 0 is the constructor
    /// expression, remaining children are arguments
    Object,
    /// Function literal; children are the body statements
    Function {
        /// Parameter names in declaration order
        params: Vec<String>,
    },
    /// String literal
    String {
        /// Literal content without quotes
        value: String,
    },
    /// Numeric literal
    Number {
        /// Literal as written in the source
        raw: String,
    },
    /// Boolean literal
    Boolean {
        /// Literal value
        value: bool,
    },
    /// Array literal; children are the elements
    Array,
    /// Map (object) literal; children are key/value pairs
    Map,
    /// Key/value pair inside a map literal; children are key and value
    PropertyInit,
    /// Regular expression literal
    RegExp {
        /// Literal as written, including delimiters and flags
        source: String,
    },
    /// `null` literal
    Null,
    /// The undefined value (`void` expression or elided branch)
    Void,
}

/// A single syntax node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The node shape
    pub kind: NodeKind,
    /// 1-based source line
    pub line: u32,
    /// Comments attached to this node
    pub comments: Vec<Comment>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            line,
            comments: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The syntax tree of one compilation unit
///
/// Nodes are stored in allocation order; index 0 is always the [`NodeKind::Script`]
/// root created by [`TreeBuilder::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    /// Cross-unit usage data supplied by the scope analyzer
    pub scope: ScopeInfo,
}

impl Tree {
    /// The root node of the unit
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a node.
    ///
    /// Panics when `id` was not allocated by this tree's builder.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Borrow a node, or `None` for a foreign id
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// The shape of a node
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// The source line of a node
    #[must_use]
    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    /// The parent of a node, if any
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// The children of a node, in source order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// The `n`-th child of a node
    #[must_use]
    pub fn child(&self, id: NodeId, n: usize) -> Option<NodeId> {
        self.node(id).children.get(n).copied()
    }

    /// Comments attached to a node
    #[must_use]
    pub fn comments(&self, id: NodeId) -> &[Comment] {
        &self.node(id).comments
    }

    /// Number of nodes in the tree
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Depth-first preorder walk of the whole unit
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Depth-first preorder walk of the subtree rooted at `id` (inclusive)
    pub fn walk_from(&self, id: NodeId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![id],
        }
    }
}

/// Depth-first preorder iterator over node ids
pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Push in reverse so children come off the stack in source order.
        for child in self.tree.children(id).iter().rev() {
            self.stack.push(*child);
        }
        Some(id)
    }
}

/// Construction API for [`Tree`]
///
/// The builder seeds the root `Script` node; everything else is allocated
/// with [`TreeBuilder::add`] or attached explicitly.
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    scope: ScopeInfo,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Create a builder holding an empty unit rooted at line 1
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Script, 1)],
            scope: ScopeInfo::default(),
        }
    }

    /// The root node id
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Allocate a detached node
    pub fn node(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("tree too large"));
        self.nodes.push(Node::new(kind, line));
        id
    }

    /// Attach an already-allocated node as the last child of `parent`
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Allocate a node and attach it under `parent` in one step
    pub fn add(&mut self, parent: NodeId, kind: NodeKind, line: u32) -> NodeId {
        let id = self.node(kind, line);
        self.attach(parent, id);
        id
    }

    /// Attach a comment to a node
    pub fn comment(&mut self, id: NodeId, comment: Comment) {
        self.nodes[id.index()].comments.push(comment);
    }

    /// Set the scope analyzer payload for the unit
    pub fn scope(&mut self, scope: ScopeInfo) {
        self.scope = scope;
    }

    /// Finish construction
    #[must_use]
    pub fn build(self) -> Tree {
        Tree {
            nodes: self.nodes,
            scope: self.scope,
        }
    }
}
