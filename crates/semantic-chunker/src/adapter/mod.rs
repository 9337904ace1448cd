//! Grammar adapters: translate tree-sitter nodes into the generic [`SyntaxTree`] view.
//!
//! Each supported grammar implements [`NodeAdapter`]. The adapters only answer local questions
//! about a single grammar node; [`normalize`] drives them over a parsed tree with an explicit
//! work stack and builds the arena.

mod go;
mod javascript;
mod python;
mod rust;

pub use go::GoAdapter;
pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;
pub use rust::RustAdapter;

use crate::language::Language;
use crate::node::{ByteSpan, NodeFlags, NodeId, NodeKind, SyntaxNode, SyntaxTree};
use std::collections::HashMap;
use tree_sitter::{Node, Tree};

/// Capability interface implemented once per grammar
pub trait NodeAdapter: Send + Sync {
    fn language(&self) -> Language;

    /// Map a grammar node onto the generic kind set.
    ///
    /// `None` means the node has no generic meaning of its own: it becomes a `Statement` when it
    /// sits directly in a body container, and is otherwise collapsed into its parent.
    fn classify(&self, node: Node<'_>, source: &str) -> Option<NodeKind>;

    /// Grammar kinds whose named children are statements (module root, blocks, class bodies)
    fn is_body(&self, kind: &str) -> bool;

    fn is_comment(&self, node: Node<'_>) -> bool {
        node.is_extra() || node.kind().contains("comment")
    }

    /// Comment that documents the definition following it
    fn is_doc_comment(&self, _node: Node<'_>, _source: &str) -> bool {
        false
    }

    /// Sibling nodes that annotate the next definition (e.g. Rust attributes)
    fn is_detached_modifier(&self, _node: Node<'_>) -> bool {
        false
    }

    /// Wrapper around a definition (decorated definition, export statement)
    fn unwrap_definition<'t>(&self, _node: Node<'t>) -> Option<Node<'t>> {
        None
    }

    /// Modifier nodes applied to `definition`, in source order
    fn modifier_nodes<'t>(
        &self,
        _definition: Node<'t>,
        _wrapper: Option<Node<'t>>,
    ) -> Vec<Node<'t>> {
        Vec::new()
    }

    fn name(&self, node: Node<'_>, source: &str) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .filter(|name| !name.is_empty())
    }

    fn flags(&self, node: Node<'_>, source: &str, kind: NodeKind) -> NodeFlags;

    /// Parameter list and return annotation of a callable
    fn signature_parts<'t>(&self, node: Node<'t>) -> (Option<Node<'t>>, Option<Node<'t>>) {
        (
            node.child_by_field_name("parameters"),
            node.child_by_field_name("return_type"),
        )
    }

    fn extends(&self, _node: Node<'_>, _source: &str) -> Vec<String> {
        Vec::new()
    }

    /// String-literal statement that documents `definition` from inside its body
    fn docstring_node<'t>(&self, _definition: Node<'t>) -> Option<Node<'t>> {
        None
    }

    /// `target = <callable literal>` statements: target name and the literal node
    fn lambda_assignment<'t>(
        &self,
        _statement: Node<'t>,
        _source: &str,
    ) -> Option<(String, Node<'t>)> {
        None
    }

    /// Package or namespace declared by a top-level node
    fn package_name(&self, _node: Node<'_>, _source: &str) -> Option<String> {
        None
    }

    /// Module paths imported by a top-level node
    fn imports(&self, _node: Node<'_>, _source: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Adapter for a language, if one exists
pub fn adapter_for(language: Language) -> Option<Box<dyn NodeAdapter>> {
    match language {
        Language::Python => Some(Box::new(PythonAdapter)),
        Language::Rust => Some(Box::new(RustAdapter)),
        Language::JavaScript => Some(Box::new(JavaScriptAdapter::javascript())),
        Language::TypeScript => Some(Box::new(JavaScriptAdapter::typescript())),
        Language::Tsx => Some(Box::new(JavaScriptAdapter::tsx())),
        Language::Go => Some(Box::new(GoAdapter)),
        _ => None,
    }
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

pub(crate) fn byte_span(node: Node<'_>) -> ByteSpan {
    ByteSpan::new(node.start_byte(), node.end_byte())
}

/// Text of a string literal without its surrounding quote characters
pub(crate) fn unquote(text: &str) -> &str {
    text.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`'))
}

/// Any direct child (named or anonymous) of the given grammar kind
pub(crate) fn has_child_kind(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// One sibling list still to be expanded under a normalized parent
struct Frame<'t> {
    node: Node<'t>,
    parent: NodeId,
}

/// Build the normalized tree for `tree` using `adapter`
pub fn normalize(adapter: &dyn NodeAdapter, tree: &Tree, source: &str) -> SyntaxTree {
    let root = tree.root_node();
    let mut out = SyntaxTree::new(adapter.language(), source.len());

    if root.has_error() {
        out.mark_malformed(describe_error(root));
    }

    // Grammar node id -> normalized id, to resolve docstrings and assigned literals afterwards
    let mut mapped: HashMap<usize, NodeId> = HashMap::new();
    let mut deferred_docstrings: Vec<(NodeId, usize)> = Vec::new();
    let mut deferred_literals: Vec<(NodeId, usize)> = Vec::new();

    collect_file_metadata(adapter, root, source, &mut out);

    let mut stack = vec![Frame {
        node: root,
        parent: out.root(),
    }];

    while let Some(frame) = stack.pop() {
        let in_body = adapter.is_body(frame.node.kind());
        let mut pending_modifiers: Vec<Node<'_>> = Vec::new();
        let mut pending_comments: Vec<ByteSpan> = Vec::new();

        let mut cursor = frame.node.walk();
        let children: Vec<Node<'_>> = frame.node.named_children(&mut cursor).collect();

        for child in children {
            if adapter.is_comment(child) {
                if adapter.is_doc_comment(child, source) {
                    pending_comments.push(byte_span(child));
                }
                continue;
            }

            if adapter.is_detached_modifier(child) {
                pending_modifiers.push(child);
                continue;
            }

            let wrapper = adapter.unwrap_definition(child).map(|inner| (inner, child));
            let definition = wrapper.map_or(child, |(inner, _)| inner);

            let kind = match adapter.classify(definition, source) {
                Some(kind) => kind,
                None if in_body => NodeKind::Statement,
                None => {
                    pending_modifiers.clear();
                    pending_comments.clear();
                    stack.push(Frame {
                        node: child,
                        parent: frame.parent,
                    });
                    continue;
                }
            };

            let outer = wrapper.map_or(definition, |(_, w)| w);
            let mut node = SyntaxNode::new(kind, byte_span(outer))
                .with_flags(adapter.flags(definition, source, kind));

            if kind.is_definition() || node.flags.callable_literal {
                node.name = adapter.name(definition, source);
                let (params, returns) = adapter.signature_parts(definition);
                node.parameters = params.map(byte_span);
                node.return_type = returns.map(byte_span);
                node.extends = adapter.extends(definition, source);
            }

            let mut assigned_literal = None;
            if kind == NodeKind::Statement {
                if let Some((target, literal)) = adapter.lambda_assignment(definition, source) {
                    node.name = Some(target);
                    assigned_literal = Some(literal.id());
                }
            }

            let id = out.push(frame.parent, node);
            mapped.insert(definition.id(), id);

            // Doc comments and detached attributes belong to whatever follows them
            for comment in pending_comments.drain(..) {
                out.node_mut(id).leading_comments.push(comment);
            }
            for modifier in pending_modifiers.drain(..) {
                out.push_modifier(id, byte_span(modifier));
            }
            if kind.is_definition() {
                for modifier in adapter.modifier_nodes(definition, wrapper.map(|(_, w)| w)) {
                    out.push_modifier(id, byte_span(modifier));
                }
                if let Some(doc) = adapter.docstring_node(definition) {
                    deferred_docstrings.push((id, doc.id()));
                }
            }
            if let Some(literal) = assigned_literal {
                deferred_literals.push((id, literal));
            }

            stack.push(Frame {
                node: definition,
                parent: id,
            });
        }
    }

    for (owner, grammar_id) in deferred_docstrings {
        if let Some(doc) = mapped.get(&grammar_id).copied() {
            if out.node(doc).flags.string_literal {
                out.node_mut(owner).docstring = Some(doc);
            }
        }
    }
    for (owner, grammar_id) in deferred_literals {
        out.node_mut(owner).assigned_literal = mapped.get(&grammar_id).copied();
    }

    sort_children(&mut out);
    log::trace!(
        "normalized {} tree into {} nodes",
        adapter.language().as_str(),
        out.len()
    );
    out
}

fn collect_file_metadata(
    adapter: &dyn NodeAdapter,
    root: Node<'_>,
    source: &str,
    out: &mut SyntaxTree,
) {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(package) = adapter.package_name(child, source) {
            out.set_package(package);
        }
        for import in adapter.imports(child, source) {
            out.push_import(import);
        }
    }
}

/// Frames are processed LIFO, so children collected from several grammar levels need ordering
fn sort_children(tree: &mut SyntaxTree) {
    for idx in 0..tree.len() {
        let id = NodeId(idx);
        let mut children = std::mem::take(&mut tree.node_mut(id).children);
        children.sort_by_key(|child| tree.node(*child).span.start);
        tree.node_mut(id).children = children;
    }
}

fn describe_error(root: Node<'_>) -> String {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return format!(
                "syntax error at line {}, column {}",
                pos.row + 1,
                pos.column + 1
            );
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node
            .children(&mut cursor)
            .filter(|child| child.has_error() || child.is_missing())
            .collect();
        stack.extend(children.into_iter().rev());
    }
    "syntax tree contains errors".to_string()
}
