use super::{node_text, unquote, NodeAdapter};
use crate::language::Language;
use crate::node::{NodeFlags, NodeKind};
use tree_sitter::Node;

/// Adapter for `tree-sitter-go`.
///
/// Struct and interface type specs map to `Class`. Methods stay top-level functions (Go has no
/// class bodies); the receiver's base type is reported through `extends`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoAdapter;

impl NodeAdapter for GoAdapter {
    fn language(&self) -> Language {
        Language::Go
    }

    fn classify(&self, node: Node<'_>, _source: &str) -> Option<NodeKind> {
        match node.kind() {
            "function_declaration" | "method_declaration" => Some(NodeKind::Function),
            "type_spec" => node
                .child_by_field_name("type")
                .filter(|ty| matches!(ty.kind(), "struct_type" | "interface_type"))
                .map(|_| NodeKind::Class),
            "func_literal" => Some(NodeKind::Expression),
            _ => None,
        }
    }

    fn is_body(&self, kind: &str) -> bool {
        matches!(kind, "source_file" | "statement_list")
    }

    /// Own-line comments directly above the next declaration, with no blank line in between
    fn is_doc_comment(&self, node: Node<'_>, _source: &str) -> bool {
        let own_line = node
            .prev_sibling()
            .map_or(true, |prev| prev.end_position().row < node.start_position().row);
        own_line
            && node
                .next_named_sibling()
                .is_some_and(|next| next.start_position().row <= node.end_position().row + 1)
    }

    /// `type Name struct {...}` declares a single spec; grouped declarations stay statements
    fn unwrap_definition<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() != "type_declaration" {
            return None;
        }
        let mut cursor = node.walk();
        let specs: Vec<Node<'t>> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .collect();
        match specs.as_slice() {
            [spec] if spec.kind() == "type_spec" => Some(*spec),
            _ => None,
        }
    }

    fn flags(&self, node: Node<'_>, _source: &str, kind: NodeKind) -> NodeFlags {
        NodeFlags {
            callable_literal: kind == NodeKind::Expression && node.kind() == "func_literal",
            ..NodeFlags::default()
        }
    }

    fn signature_parts<'t>(&self, node: Node<'t>) -> (Option<Node<'t>>, Option<Node<'t>>) {
        (
            node.child_by_field_name("parameters"),
            node.child_by_field_name("result"),
        )
    }

    fn extends(&self, node: Node<'_>, source: &str) -> Vec<String> {
        match node.kind() {
            "method_declaration" => node
                .child_by_field_name("receiver")
                .and_then(|receiver| {
                    let mut cursor = receiver.walk();
                    let param = receiver
                        .named_children(&mut cursor)
                        .find(|p| p.kind() == "parameter_declaration");
                    param
                })
                .and_then(|param| param.child_by_field_name("type"))
                .and_then(|ty| base_type_name(ty, source))
                .into_iter()
                .collect(),
            "type_spec" => node
                .child_by_field_name("type")
                .map(|ty| embedded_types(ty, source))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn lambda_assignment<'t>(
        &self,
        statement: Node<'t>,
        source: &str,
    ) -> Option<(String, Node<'t>)> {
        if statement.kind() != "var_declaration" || statement.named_child_count() != 1 {
            return None;
        }
        let spec = statement.named_child(0)?;
        if spec.kind() != "var_spec" {
            return None;
        }
        let mut cursor = spec.walk();
        let names: Vec<Node<'t>> = spec.children_by_field_name("name", &mut cursor).collect();
        let [name] = names.as_slice() else {
            return None;
        };
        let values = spec.child_by_field_name("value")?;
        if values.named_child_count() != 1 {
            return None;
        }
        let literal = values.named_child(0)?;
        (literal.kind() == "func_literal").then(|| (node_text(*name, source).to_string(), literal))
    }

    fn package_name(&self, node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() != "package_clause" {
            return None;
        }
        let mut cursor = node.walk();
        let name = node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "package_identifier")
            .map(|ident| node_text(ident, source).to_string());
        name
    }

    fn imports(&self, node: Node<'_>, source: &str) -> Vec<String> {
        if node.kind() != "import_declaration" {
            return Vec::new();
        }
        let mut specs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.push(child),
                "import_spec_list" => {
                    let mut list_cursor = child.walk();
                    specs.extend(
                        child
                            .named_children(&mut list_cursor)
                            .filter(|spec| spec.kind() == "import_spec"),
                    );
                }
                _ => {}
            }
        }
        specs
            .into_iter()
            .filter_map(|spec| spec.child_by_field_name("path"))
            .map(|path| unquote(node_text(path, source)).to_string())
            .collect()
    }
}

/// `*pkg.Server[T]` -> `Server`
fn base_type_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(node_text(node, source).to_string()),
        "pointer_type" | "parenthesized_type" => node
            .named_child(0)
            .and_then(|inner| base_type_name(inner, source)),
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(inner, source)),
        "qualified_type" => node
            .child_by_field_name("name")
            .map(|name| node_text(name, source).to_string()),
        _ => {
            let text = node_text(node, source).trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

/// Embedded struct fields and embedded interfaces
fn embedded_types(ty: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![ty];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "field_declaration" if node.child_by_field_name("name").is_none() => {
                names.extend(
                    node.child_by_field_name("type")
                        .and_then(|inner| base_type_name(inner, source)),
                );
            }
            "struct_type" | "interface_type" | "field_declaration_list" => {
                let mut cursor = node.walk();
                let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
            "type_elem" => {
                let mut cursor = node.walk();
                names.extend(
                    node.named_children(&mut cursor)
                        .filter_map(|inner| base_type_name(inner, source)),
                );
            }
            _ => {}
        }
    }
    names
}
