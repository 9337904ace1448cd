use super::{has_child_kind, node_text, NodeAdapter};
use crate::language::Language;
use crate::node::{NodeFlags, NodeKind};
use tree_sitter::Node;

/// Adapter for `tree-sitter-rust`.
///
/// Structs, enums, unions, traits and impl blocks all map to `Class`; functions inside an impl
/// or trait body therefore become methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustAdapter;

impl NodeAdapter for RustAdapter {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn classify(&self, node: Node<'_>, _source: &str) -> Option<NodeKind> {
        match node.kind() {
            "function_item" | "function_signature_item" => Some(NodeKind::Function),
            "struct_item" | "enum_item" | "union_item" | "trait_item" | "impl_item" => {
                Some(NodeKind::Class)
            }
            "mod_item" => Some(NodeKind::Module),
            "closure_expression" | "yield_expression" => Some(NodeKind::Expression),
            _ => None,
        }
    }

    fn is_body(&self, kind: &str) -> bool {
        matches!(kind, "source_file" | "declaration_list" | "block")
    }

    fn is_doc_comment(&self, node: Node<'_>, source: &str) -> bool {
        let text = node_text(node, source);
        (text.starts_with("///") && !text.starts_with("////"))
            || (text.starts_with("/**") && !text.starts_with("/***") && text != "/**/")
    }

    fn is_detached_modifier(&self, node: Node<'_>) -> bool {
        node.kind() == "attribute_item"
    }

    fn name(&self, node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() == "impl_item" {
            return node
                .child_by_field_name("type")
                .and_then(|ty| base_type_name(ty, source));
        }
        node.child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
    }

    fn flags(&self, node: Node<'_>, _source: &str, kind: NodeKind) -> NodeFlags {
        let mut flags = NodeFlags::default();
        match kind {
            NodeKind::Function => {
                let mut cursor = node.walk();
                flags.asynchronous = node.children(&mut cursor).any(|child| {
                    child.kind() == "function_modifiers" && has_child_kind(child, "async")
                });
            }
            NodeKind::Expression => {
                flags.callable_literal = node.kind() == "closure_expression";
                flags.yields = node.kind() == "yield_expression";
            }
            NodeKind::Statement => {
                flags.string_literal = node.kind() == "expression_statement"
                    && node.named_child(0).is_some_and(|child| {
                        matches!(child.kind(), "string_literal" | "raw_string_literal")
                    });
            }
            _ => {}
        }
        flags
    }

    fn extends(&self, node: Node<'_>, source: &str) -> Vec<String> {
        match node.kind() {
            "impl_item" => node
                .child_by_field_name("trait")
                .and_then(|t| base_type_name(t, source))
                .into_iter()
                .collect(),
            "trait_item" => node
                .child_by_field_name("bounds")
                .map(|bounds| {
                    let mut cursor = bounds.walk();
                    let names: Vec<String> = bounds
                        .named_children(&mut cursor)
                        .filter_map(|b| base_type_name(b, source))
                        .collect();
                    names
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn imports(&self, node: Node<'_>, source: &str) -> Vec<String> {
        match node.kind() {
            "use_declaration" => node
                .child_by_field_name("argument")
                .map(|arg| node_text(arg, source).split_whitespace().collect::<String>())
                .into_iter()
                .collect(),
            "extern_crate_declaration" => node
                .child_by_field_name("name")
                .map(|name| node_text(name, source).to_string())
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Base identifier of a type: `Vec<T>` -> `Vec`, `crate::a::B` -> `B`
fn base_type_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" | "identifier" | "primitive_type" => {
            Some(node_text(node, source).to_string())
        }
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(inner, source)),
        "scoped_type_identifier" | "scoped_identifier" => node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string()),
        "reference_type" => node
            .child_by_field_name("type")
            .and_then(|inner| base_type_name(inner, source)),
        _ => {
            let text = node_text(node, source).trim();
            (!text.is_empty()).then(|| text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::language::Language;
    use crate::node::{NodeKind, SyntaxTree};
    use crate::parser::SourceParser;

    fn parse(source: &str) -> SyntaxTree {
        SourceParser::new(Language::Rust).unwrap().parse(source).unwrap()
    }

    #[test]
    fn test_impl_methods_and_attributes() {
        let source = r#"use std::fmt;

/// A point.
#[derive(Debug)]
struct Point {
    x: i32,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.x)
    }
}
"#;
        let tree = parse(source);
        let root = tree.node(tree.root());
        let kinds: Vec<NodeKind> = root.children.iter().map(|c| tree.node(*c).kind).collect();
        assert_eq!(kinds, vec![NodeKind::Statement, NodeKind::Class, NodeKind::Class]);

        let point = tree.node(root.children[1]);
        assert_eq!(point.name.as_deref(), Some("Point"));
        assert_eq!(point.modifiers.len(), 1);
        assert_eq!(point.leading_comments.len(), 1);
        assert_eq!(point.outer_span(&tree).text(source).lines().next(), Some("/// A point."));

        let imp = tree.node(root.children[2]);
        assert_eq!(imp.name.as_deref(), Some("Point"));
        assert_eq!(imp.extends, vec!["Display".to_string()]);
        let method = tree.node(imp.children[0]);
        assert_eq!(method.kind, NodeKind::Function);
        assert_eq!(method.name.as_deref(), Some("fmt"));
        assert_eq!(method.return_type.unwrap().text(source), "fmt::Result");
    }

    #[test]
    fn test_async_fn_and_closure() {
        let source = "async fn run() {\n    let f = |x: i32| x + 1;\n}\n";
        let tree = parse(source);
        let func_id = tree.node(tree.root()).children[0];
        let func = tree.node(func_id);
        assert!(func.flags.asynchronous);

        let mut stack = vec![func_id];
        let mut closures = 0;
        while let Some(id) = stack.pop() {
            let node = tree.node(id);
            if node.flags.callable_literal {
                closures += 1;
            }
            stack.extend(node.children.iter().copied());
        }
        assert_eq!(closures, 1);
    }
}
