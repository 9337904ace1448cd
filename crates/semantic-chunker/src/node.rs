//! Language-agnostic view over a syntax tree.
//!
//! Adapters translate grammar-specific nodes into [`SyntaxNode`]s stored in a [`SyntaxTree`]
//! arena. Only significant nodes survive normalization: definitions, statements, modifier
//! applications and the few expressions the chunker cares about (callable literals, yield
//! points). Grammar nodes with no generic meaning are collapsed and their significant
//! descendants reattach to the nearest kept ancestor.

use crate::language::Language;
use crate::types::{LineIndex, Span};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The file root, or a nested module/namespace definition
    Module,
    Function,
    Class,
    Statement,
    Expression,
    /// Decorator, annotation or attribute applied to a definition
    Modifier,
}

impl NodeKind {
    #[must_use]
    pub const fn is_definition(self) -> bool {
        matches!(self, Self::Module | Self::Function | Self::Class)
    }
}

/// Half-open byte range into the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn contains(&self, other: &ByteSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or_default()
    }
}

/// Structural facts an adapter can report about a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Definition declared with an async keyword
    pub asynchronous: bool,
    /// Expression is a yield point
    pub yields: bool,
    /// Expression is an anonymous function (lambda, closure, arrow function)
    pub callable_literal: bool,
    /// Statement is a module-level guarded entry block
    pub guarded_entry: bool,
    /// Statement consists of a single string literal
    pub string_literal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub name: Option<String>,
    /// Span of the node itself, excluding detached modifiers and leading comments
    pub span: ByteSpan,
    pub children: Vec<NodeId>,
    /// Modifier nodes applied to this definition, in source order
    pub modifiers: Vec<NodeId>,
    /// Documentation comments directly above the definition
    pub leading_comments: Vec<ByteSpan>,
    /// First string-literal statement of the body
    pub docstring: Option<NodeId>,
    pub parameters: Option<ByteSpan>,
    pub return_type: Option<ByteSpan>,
    pub extends: Vec<String>,
    pub flags: NodeFlags,
    /// For lambda assignments: the callable literal on the right-hand side
    pub assigned_literal: Option<NodeId>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: ByteSpan) -> Self {
        Self {
            kind,
            name: None,
            span,
            children: Vec::new(),
            modifiers: Vec::new(),
            leading_comments: Vec::new(),
            docstring: None,
            parameters: None,
            return_type: None,
            extends: Vec::new(),
            flags: NodeFlags::default(),
            assigned_literal: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Span including attached modifiers and leading comments
    #[must_use]
    pub fn outer_span(&self, tree: &SyntaxTree) -> ByteSpan {
        let mut start = self.span.start;
        for id in &self.modifiers {
            start = start.min(tree.node(*id).span.start);
        }
        for comment in &self.leading_comments {
            start = start.min(comment.start);
        }
        ByteSpan::new(start, self.span.end)
    }

    #[must_use]
    pub fn line_span(&self, lines: &LineIndex) -> Span {
        lines.span(self.span.start, self.span.end)
    }
}

/// Immutable arena of normalized nodes for one file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
    language: Language,
    source_len: usize,
    malformed: Option<String>,
    package: Option<String>,
    imports: Vec<String>,
}

impl SyntaxTree {
    /// Start a tree whose root module node spans the whole source
    pub fn new(language: Language, source_len: usize) -> Self {
        Self {
            nodes: vec![SyntaxNode::new(
                NodeKind::Module,
                ByteSpan::new(0, source_len),
            )],
            root: NodeId(0),
            language,
            source_len,
            malformed: None,
            package: None,
            imports: Vec::new(),
        }
    }

    /// Append a node as the last child of `parent`
    pub fn push(&mut self, parent: NodeId, node: SyntaxNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a modifier node applied to `owner`
    pub fn push_modifier(&mut self, owner: NodeId, span: ByteSpan) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode::new(NodeKind::Modifier, span));
        self.nodes[owner.0].modifiers.push(id);
        id
    }

    /// Record that the producer could only build a partial tree
    pub fn mark_malformed(&mut self, reason: impl Into<String>) {
        self.malformed = Some(reason.into());
    }

    /// Record the file's declared package or namespace
    pub fn set_package(&mut self, package: impl Into<String>) {
        self.package = Some(package.into());
    }

    /// Record an imported module path; repeats are ignored
    pub fn push_import(&mut self, import: impl Into<String>) {
        let import = import.into();
        if !import.is_empty() && !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    #[must_use]
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn source_len(&self) -> usize {
        self.source_len
    }

    #[must_use]
    pub fn malformed(&self) -> Option<&str> {
        self.malformed.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check structural consistency against the source text.
    ///
    /// Returns a description of the first problem found: a span outside the source or off a
    /// char boundary, a child escaping its parent, or siblings out of order or overlapping.
    pub fn check_consistency(&self, source: &str) -> Option<String> {
        if self.source_len != source.len() {
            return Some(format!(
                "tree covers {} bytes but source has {}",
                self.source_len,
                source.len()
            ));
        }

        let mut stack = vec![self.root];
        let mut visited = 0usize;
        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > self.nodes.len() {
                return Some("node graph contains a cycle".to_string());
            }

            let node = self.node(id);
            if node.span.start > node.span.end || node.span.end > source.len() {
                return Some(format!(
                    "node {} span {}..{} is out of bounds",
                    id.0, node.span.start, node.span.end
                ));
            }
            if !source.is_char_boundary(node.span.start) || !source.is_char_boundary(node.span.end)
            {
                return Some(format!("node {} span splits a character", id.0));
            }

            let mut prev_end = node.span.start;
            for child_id in &node.children {
                let child = self.node(*child_id);
                let outer = child.outer_span(self);
                if !node.span.contains(&child.span) || outer.start < node.span.start {
                    return Some(format!(
                        "node {} escapes parent {} ({}..{} not in {}..{})",
                        child_id.0,
                        id.0,
                        outer.start,
                        child.span.end,
                        node.span.start,
                        node.span.end
                    ));
                }
                if outer.start < prev_end {
                    return Some(format!(
                        "node {} overlaps or precedes its previous sibling",
                        child_id.0
                    ));
                }
                prev_end = child.span.end;
                stack.push(*child_id);
            }
        }

        None
    }
}
