use super::{has_child_kind, node_text, NodeAdapter};
use crate::language::Language;
use crate::node::{NodeFlags, NodeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

static MAIN_GUARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(__name__\s*==\s*['"]__main__['"]|['"]__main__['"]\s*==\s*__name__)\s*$"#,
    )
    .expect("valid main guard regex")
});

/// Adapter for `tree-sitter-python`
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonAdapter;

impl NodeAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn classify(&self, node: Node<'_>, _source: &str) -> Option<NodeKind> {
        match node.kind() {
            "function_definition" => Some(NodeKind::Function),
            "class_definition" => Some(NodeKind::Class),
            "lambda" | "yield" => Some(NodeKind::Expression),
            _ => None,
        }
    }

    fn is_body(&self, kind: &str) -> bool {
        matches!(kind, "module" | "block")
    }

    fn unwrap_definition<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() == "decorated_definition" {
            node.child_by_field_name("definition")
        } else {
            None
        }
    }

    fn modifier_nodes<'t>(
        &self,
        _definition: Node<'t>,
        wrapper: Option<Node<'t>>,
    ) -> Vec<Node<'t>> {
        let Some(wrapper) = wrapper else {
            return Vec::new();
        };
        let mut cursor = wrapper.walk();
        let decorators: Vec<Node<'t>> = wrapper
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .collect();
        decorators
    }

    fn flags(&self, node: Node<'_>, source: &str, kind: NodeKind) -> NodeFlags {
        let mut flags = NodeFlags::default();
        match kind {
            NodeKind::Function => {
                flags.asynchronous = has_child_kind(node, "async");
            }
            NodeKind::Expression => {
                flags.yields = node.kind() == "yield";
                flags.callable_literal = node.kind() == "lambda";
            }
            NodeKind::Statement => {
                flags.string_literal = is_string_statement(node);
                flags.guarded_entry = node.kind() == "if_statement"
                    && node
                        .child_by_field_name("condition")
                        .is_some_and(|cond| MAIN_GUARD.is_match(node_text(cond, source)));
            }
            _ => {}
        }
        flags
    }

    fn extends(&self, node: Node<'_>, source: &str) -> Vec<String> {
        let Some(bases) = node.child_by_field_name("superclasses") else {
            return Vec::new();
        };
        let mut cursor = bases.walk();
        let names: Vec<String> = bases
            .named_children(&mut cursor)
            .filter(|base| !matches!(base.kind(), "keyword_argument" | "comment"))
            .map(|base| node_text(base, source).to_string())
            .collect();
        names
    }

    fn docstring_node<'t>(&self, definition: Node<'t>) -> Option<Node<'t>> {
        let body = definition.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        is_string_statement(first).then_some(first)
    }

    fn lambda_assignment<'t>(
        &self,
        statement: Node<'t>,
        source: &str,
    ) -> Option<(String, Node<'t>)> {
        if statement.kind() != "expression_statement" || statement.named_child_count() != 1 {
            return None;
        }
        let assignment = statement.named_child(0)?;
        if assignment.kind() != "assignment" {
            return None;
        }
        let left = assignment.child_by_field_name("left")?;
        let right = assignment.child_by_field_name("right")?;
        if left.kind() != "identifier" || right.kind() != "lambda" {
            return None;
        }
        Some((node_text(left, source).to_string(), right))
    }

    fn imports(&self, node: Node<'_>, source: &str) -> Vec<String> {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                let names: Vec<String> = node
                    .children_by_field_name("name", &mut cursor)
                    .filter_map(|name| match name.kind() {
                        "aliased_import" => name.child_by_field_name("name"),
                        _ => Some(name),
                    })
                    .map(|name| node_text(name, source).to_string())
                    .collect();
                names
            }
            "import_from_statement" => node
                .child_by_field_name("module_name")
                .map(|module| node_text(module, source).to_string())
                .into_iter()
                .collect(),
            "future_import_statement" => vec!["__future__".to_string()],
            _ => Vec::new(),
        }
    }
}

fn is_string_statement(node: Node<'_>) -> bool {
    node.kind() == "expression_statement"
        && node.named_child_count() == 1
        && node
            .named_child(0)
            .is_some_and(|child| matches!(child.kind(), "string" | "concatenated_string"))
}
