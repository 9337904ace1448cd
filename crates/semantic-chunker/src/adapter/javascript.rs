use super::{has_child_kind, node_text, unquote, NodeAdapter};
use crate::language::Language;
use crate::node::{NodeFlags, NodeKind};
use tree_sitter::Node;

const CALLABLE_LITERALS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

/// Method keywords surfaced as modifiers so the decorator rules can classify them
const METHOD_KEYWORDS: &[&str] = &["static", "get", "set"];

/// Adapter for `tree-sitter-javascript` and both `tree-sitter-typescript` dialects
#[derive(Debug, Clone, Copy)]
pub struct JavaScriptAdapter {
    language: Language,
}

impl JavaScriptAdapter {
    #[must_use]
    pub const fn javascript() -> Self {
        Self {
            language: Language::JavaScript,
        }
    }

    #[must_use]
    pub const fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
        }
    }

    #[must_use]
    pub const fn tsx() -> Self {
        Self {
            language: Language::Tsx,
        }
    }

    const fn is_typescript(&self) -> bool {
        matches!(self.language, Language::TypeScript | Language::Tsx)
    }
}

impl NodeAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        self.language
    }

    fn classify(&self, node: Node<'_>, _source: &str) -> Option<NodeKind> {
        let kind = node.kind();
        match kind {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                Some(NodeKind::Function)
            }
            "class_declaration" => Some(NodeKind::Class),
            "yield_expression" => Some(NodeKind::Expression),
            _ if CALLABLE_LITERALS.contains(&kind) => Some(NodeKind::Expression),
            _ if self.is_typescript() => match kind {
                "abstract_class_declaration" | "interface_declaration" | "enum_declaration" => {
                    Some(NodeKind::Class)
                }
                "internal_module" | "module" => Some(NodeKind::Module),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_body(&self, kind: &str) -> bool {
        matches!(
            kind,
            "program" | "statement_block" | "class_body" | "interface_body"
        )
    }

    fn is_doc_comment(&self, node: Node<'_>, source: &str) -> bool {
        let text = node_text(node, source);
        text.starts_with("/**") && text != "/**/"
    }

    /// TypeScript places member decorators beside the method in the class body
    fn is_detached_modifier(&self, node: Node<'_>) -> bool {
        node.kind() == "decorator"
    }

    fn unwrap_definition<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        if node.kind() == "export_statement" {
            node.child_by_field_name("declaration")
        } else {
            None
        }
    }

    fn modifier_nodes<'t>(
        &self,
        definition: Node<'t>,
        wrapper: Option<Node<'t>>,
    ) -> Vec<Node<'t>> {
        let mut out = Vec::new();
        for owner in wrapper.into_iter().chain(std::iter::once(definition)) {
            let mut cursor = owner.walk();
            for child in owner.children(&mut cursor) {
                let is_keyword = owner.kind() == "method_definition"
                    && !child.is_named()
                    && METHOD_KEYWORDS.contains(&child.kind());
                if child.kind() == "decorator" || is_keyword {
                    out.push(child);
                }
            }
        }
        out.sort_by_key(|n| n.start_byte());
        out
    }

    fn name(&self, node: Node<'_>, source: &str) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .filter(|name| !name.is_empty())
    }

    fn flags(&self, node: Node<'_>, _source: &str, kind: NodeKind) -> NodeFlags {
        let mut flags = NodeFlags::default();
        match kind {
            NodeKind::Function => {
                flags.asynchronous = has_child_kind(node, "async");
            }
            NodeKind::Expression => {
                flags.yields = node.kind() == "yield_expression";
                flags.callable_literal = CALLABLE_LITERALS.contains(&node.kind());
                flags.asynchronous = flags.callable_literal && has_child_kind(node, "async");
            }
            NodeKind::Statement => {
                flags.string_literal = node.kind() == "expression_statement"
                    && node
                        .named_child(0)
                        .is_some_and(|child| matches!(child.kind(), "string" | "template_string"));
            }
            _ => {}
        }
        flags
    }

    fn signature_parts<'t>(&self, node: Node<'t>) -> (Option<Node<'t>>, Option<Node<'t>>) {
        let params = node
            .child_by_field_name("parameters")
            .or_else(|| node.child_by_field_name("parameter"));
        (params, node.child_by_field_name("return_type"))
    }

    fn extends(&self, node: Node<'_>, source: &str) -> Vec<String> {
        let mut cursor = node.walk();
        let heritage = node
            .children(&mut cursor)
            .find(|child| matches!(child.kind(), "class_heritage" | "extends_type_clause"));
        let Some(heritage) = heritage else {
            return Vec::new();
        };

        let mut names = Vec::new();
        let mut cursor = heritage.walk();
        for child in heritage.named_children(&mut cursor) {
            match child.kind() {
                "extends_clause" | "implements_clause" => {
                    let mut clause_cursor = child.walk();
                    names.extend(
                        child
                            .named_children(&mut clause_cursor)
                            .filter(|n| !matches!(n.kind(), "type_arguments" | "comment"))
                            .map(|n| node_text(n, source).to_string()),
                    );
                }
                "type_arguments" | "comment" => {}
                _ => names.push(node_text(child, source).to_string()),
            }
        }
        names
    }

    fn lambda_assignment<'t>(
        &self,
        statement: Node<'t>,
        source: &str,
    ) -> Option<(String, Node<'t>)> {
        if !matches!(statement.kind(), "lexical_declaration" | "variable_declaration") {
            return None;
        }
        let mut cursor = statement.walk();
        let declarators: Vec<Node<'t>> = statement
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .collect();
        let [declarator] = declarators.as_slice() else {
            return None;
        };
        let name = declarator.child_by_field_name("name")?;
        let value = declarator.child_by_field_name("value")?;
        if name.kind() != "identifier" || !CALLABLE_LITERALS.contains(&value.kind()) {
            return None;
        }
        Some((node_text(name, source).to_string(), value))
    }

    fn imports(&self, node: Node<'_>, source: &str) -> Vec<String> {
        if node.kind() != "import_statement" {
            return Vec::new();
        }
        node.child_by_field_name("source")
            .map(|path| unquote(node_text(path, source)).to_string())
            .into_iter()
            .collect()
    }
}
