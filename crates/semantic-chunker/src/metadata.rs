//! Per-chunk metadata: docstrings, decorators, signatures and the refined chunk kind.
//!
//! The extractor visits each chunk once and only ever writes to that chunk. The one piece of
//! context it needs from outside is whether the enclosing chunk is class-like, which is read
//! from the syntax tree before the chunk is touched.

use crate::config::DecoratorRuleConfig;
use crate::error::{ChunkerError, Result};
use crate::node::{NodeId, NodeKind, SyntaxTree};
use crate::types::{Chunk, ChunkKind, ChunkOrigin, ChunkTree, Decorator, DecoratorTag};
use once_cell::sync::Lazy;
use regex::Regex;

/// Built-in classification table, evaluated after any configured rules
static BUILTIN_RULES: Lazy<Vec<DecoratorRule>> = Lazy::new(|| {
    [
        (
            r"^(property|cached_property|functools\.cached_property|abc\.abstractproperty|(\w+\.)+(setter|getter|deleter))$",
            DecoratorTag::Property,
        ),
        (r"^(get|set)$", DecoratorTag::Property),
        (
            r"^(staticmethod|static|abc\.abstractstaticmethod)$",
            DecoratorTag::Static,
        ),
        (
            r"^(classmethod|abc\.abstractclassmethod)$",
            DecoratorTag::ClassScoped,
        ),
        (
            r"^((\w+\.)*dataclass|attr\.s|attr\.attrs|attrs?\.(define|frozen|mutable))$",
            DecoratorTag::DataHolder,
        ),
    ]
    .into_iter()
    .map(|(pattern, tag)| DecoratorRule {
        pattern: Regex::new(pattern).expect("valid built-in decorator rule"),
        tag,
    })
    .collect()
});

/// A surface-name pattern and the tag it assigns
#[derive(Debug, Clone)]
pub struct DecoratorRule {
    pattern: Regex,
    tag: DecoratorTag,
}

impl DecoratorRule {
    pub fn new(pattern: &str, tag: DecoratorTag) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ChunkerError::invalid_config(format!("invalid decorator rule '{pattern}': {e}"))
        })?;
        Ok(Self { pattern, tag })
    }
}

/// Ordered rule table; first match wins
#[derive(Debug, Clone)]
pub struct DecoratorRules {
    rules: Vec<DecoratorRule>,
}

impl Default for DecoratorRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DecoratorRules {
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    /// Configured rules first, then the built-in table
    pub fn from_config(extra: &[DecoratorRuleConfig]) -> Result<Self> {
        let mut rules = extra
            .iter()
            .map(|rule| DecoratorRule::new(&rule.pattern, rule.tag))
            .collect::<Result<Vec<_>>>()?;
        rules.extend(BUILTIN_RULES.iter().cloned());
        Ok(Self { rules })
    }

    /// Tag for a modifier's source text, if any rule matches its surface name
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<DecoratorTag> {
        let surface = surface_name(text);
        if surface.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(surface))
            .map(|rule| rule.tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Callee path of a modifier: `@functools.lru_cache(1)` -> `functools.lru_cache`
pub fn surface_name(text: &str) -> &str {
    let text = text.trim();
    let text = if let Some(inner) = text
        .strip_prefix("#![")
        .or_else(|| text.strip_prefix("#["))
    {
        inner.strip_suffix(']').unwrap_or(inner)
    } else {
        text.strip_prefix('@').unwrap_or(text)
    };
    let end = text
        .find(|c: char| c == '(' || c == '[' || c == '=' || c.is_whitespace())
        .unwrap_or(text.len());
    text[..end].trim()
}

pub struct MetadataExtractor<'a> {
    rules: &'a DecoratorRules,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(rules: &'a DecoratorRules) -> Self {
        Self { rules }
    }

    /// Fill metadata for every reachable chunk of `chunks`
    pub fn extract(&self, chunks: &mut ChunkTree, tree: &SyntaxTree, source: &str) {
        for idx in chunks.preorder() {
            let in_class = chunks
                .get(idx)
                .parent
                .and_then(|p| chunks.get(p).node)
                .is_some_and(|node| tree.node(node).kind == NodeKind::Class);
            self.extract_chunk(chunks.get_mut(idx), in_class, tree, source);
        }
    }

    fn extract_chunk(&self, chunk: &mut Chunk, in_class: bool, tree: &SyntaxTree, source: &str) {
        let Some(node_id) = chunk.node else {
            return;
        };
        let meta_id = match chunk.origin {
            ChunkOrigin::Definition | ChunkOrigin::Literal => node_id,
            ChunkOrigin::LambdaAssignment => match tree.node(node_id).assigned_literal {
                Some(literal) => literal,
                None => return,
            },
            ChunkOrigin::Gap
            | ChunkOrigin::Guarded
            | ChunkOrigin::Fallback
            | ChunkOrigin::Synthetic => return,
        };
        let node = tree.node(meta_id);
        // A lambda assignment's comments and attributes sit on the statement, not the literal
        let carriers = if meta_id == node_id {
            vec![node]
        } else {
            vec![tree.node(node_id), node]
        };

        chunk.docstring = match node.docstring {
            Some(doc) => clean_docstring(tree.node(doc).span.text(source)),
            None => carriers
                .iter()
                .flat_map(|carrier| &carrier.leading_comments)
                .map(|span| strip_comment_markers(span.text(source)))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let mut decorators: Vec<Decorator> = Vec::new();
        for modifier in carriers.iter().flat_map(|carrier| &carrier.modifiers) {
            let text = tree.node(*modifier).span.text(source).trim();
            let decorator = match self.rules.classify(text) {
                Some(tag) => Decorator::Tag(tag),
                None => Decorator::Other(text.to_string()),
            };
            if !decorators.contains(&decorator) {
                decorators.push(decorator);
            }
        }

        let callable = node.kind == NodeKind::Function || node.flags.callable_literal;
        let yields = callable && yields_within(tree, meta_id);
        if callable && node.flags.asynchronous {
            push_tag(&mut decorators, DecoratorTag::Asynchronous);
        }
        if yields {
            push_tag(&mut decorators, DecoratorTag::Generator);
        }

        if callable {
            chunk.signature = normalize_signature(
                node.parameters.map(|p| p.text(source)),
                node.return_type.map(|r| r.text(source)),
            );
        }
        chunk.extends = node.extends.clone();

        chunk.kind = match (chunk.origin, node.kind) {
            (ChunkOrigin::Literal | ChunkOrigin::LambdaAssignment, _) => ChunkKind::Lambda,
            (_, NodeKind::Class)
                if decorators.contains(&Decorator::Tag(DecoratorTag::DataHolder)) =>
            {
                ChunkKind::DataHolder
            }
            (_, NodeKind::Class) => ChunkKind::Class,
            (_, NodeKind::Module) => ChunkKind::Module,
            (_, NodeKind::Function) if in_class => member_kind(&decorators),
            (_, NodeKind::Function) if node.flags.asynchronous => ChunkKind::AsyncFunction,
            (_, NodeKind::Function) if yields => ChunkKind::Generator,
            (_, NodeKind::Function) => ChunkKind::Function,
            _ => chunk.kind,
        };
        chunk.decorators = decorators;
    }
}

fn push_tag(decorators: &mut Vec<Decorator>, tag: DecoratorTag) {
    let decorator = Decorator::Tag(tag);
    if !decorators.contains(&decorator) {
        decorators.push(decorator);
    }
}

/// Kind of a function defined directly in a class body, from its first member tag
fn member_kind(decorators: &[Decorator]) -> ChunkKind {
    decorators
        .iter()
        .find_map(|d| match d.tag() {
            Some(DecoratorTag::Property) => Some(ChunkKind::Property),
            Some(DecoratorTag::Static) => Some(ChunkKind::StaticMethod),
            Some(DecoratorTag::ClassScoped) => Some(ChunkKind::ClassMethod),
            _ => None,
        })
        .unwrap_or(ChunkKind::Method)
}

/// Whether a yield point occurs in the node's own body (not in nested callables or classes)
fn yields_within(tree: &SyntaxTree, id: NodeId) -> bool {
    let mut stack: Vec<NodeId> = tree.node(id).children.clone();
    while let Some(current) = stack.pop() {
        let node = tree.node(current);
        if node.flags.yields {
            return true;
        }
        if node.kind.is_definition() || node.flags.callable_literal {
            continue;
        }
        stack.extend(node.children.iter().copied());
    }
    false
}

/// `(params)` plus ` -> ret` when a return annotation exists, whitespace collapsed
pub fn normalize_signature(params: Option<&str>, returns: Option<&str>) -> String {
    let params = collapse_whitespace(params.unwrap_or_default())
        .replace("( ", "(")
        .replace(" )", ")")
        .replace(",)", ")");
    let params = if params.starts_with('(') {
        params
    } else if let Some(inner) = params.strip_prefix('|').and_then(|p| p.strip_suffix('|')) {
        format!("({})", inner.trim())
    } else {
        format!("({params})")
    };

    let returns = returns
        .map(|r| {
            let r = r.trim();
            let r = r.strip_prefix("->").or_else(|| r.strip_prefix(':')).unwrap_or(r);
            collapse_whitespace(r)
        })
        .filter(|r| !r.is_empty());

    match returns {
        Some(ret) => format!("{params} -> {ret}"),
        None => params,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of a string-literal docstring with prefixes, quotes and common indentation removed.
///
/// Implicitly concatenated literals (`"a" "b"`) are joined before cleaning.
pub fn clean_docstring(literal: &str) -> String {
    let text = literal.trim();
    let parts = string_parts(text);
    if !parts.is_empty() {
        return cleandoc(&parts.concat());
    }

    let text = text.trim_start_matches(is_string_prefix);
    let text = STRING_QUOTES
        .iter()
        .find_map(|quote| {
            text.strip_prefix(quote)
                .and_then(|inner| inner.strip_suffix(quote))
        })
        .unwrap_or(text);
    cleandoc(text)
}

const STRING_QUOTES: [&str; 5] = ["\"\"\"", "'''", "\"", "'", "`"];

fn is_string_prefix(c: char) -> bool {
    matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F')
}

/// Bodies of a run of adjacent string literals; empty unless `text` is only literals
fn string_parts(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let body = rest.trim_start_matches(is_string_prefix);
        let Some(quote) = STRING_QUOTES.iter().find(|q| body.starts_with(**q)) else {
            return Vec::new();
        };
        let inner = &body[quote.len()..];
        let Some(close) = closing_quote(inner, quote) else {
            return Vec::new();
        };
        parts.push(&inner[..close]);
        rest = inner[close + quote.len()..].trim_start();
    }
    parts
}

/// Byte offset of the unescaped `quote` that ends a literal body
fn closing_quote(inner: &str, quote: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in inner.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if inner[idx..].starts_with(quote) {
            return Some(idx);
        }
    }
    None
}

/// Dedent a docstring body: first line trimmed, common indent of the rest removed
fn cleandoc(text: &str) -> String {
    let mut lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    out.push(lines.remove(0).trim().to_string());
    for line in lines {
        let line = line.trim_end();
        out.push(line.get(indent..).unwrap_or_else(|| line.trim_start()).to_string());
    }

    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Comment text without `///`, `//!`, `/**`, `*/` or leading `*` markers
fn strip_comment_markers(comment: &str) -> String {
    let mut lines = Vec::new();
    for line in comment.lines() {
        let line = line.trim();
        let line = line.strip_suffix("*/").unwrap_or(line);
        let line = ["///", "//!", "/**", "/*!", "//", "#", "*"]
            .iter()
            .find_map(|marker| line.strip_prefix(marker))
            .unwrap_or(line);
        lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end());
    }
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
