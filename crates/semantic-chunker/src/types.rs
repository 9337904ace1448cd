use crate::error::Diagnostic;
use crate::language::Language;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Byte and line range of a chunk.
///
/// Bytes are half-open `[start_byte, end_byte)`. Lines are 1-indexed and inclusive; the end line
/// is the line holding the last byte of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// `other` lies entirely inside `self` (equality counts)
    #[must_use]
    pub const fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    #[must_use]
    pub const fn is_disjoint(&self, other: &Span) -> bool {
        self.end_byte <= other.start_byte || other.end_byte <= self.start_byte
    }
}

/// Maps byte offsets to 1-indexed line numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Line (1-indexed) holding the byte at `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Column (1-indexed, in bytes) of `offset` within its line
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.line_starts[line - 1] + 1
    }

    /// Byte offsets at which a line starts, strictly inside `(start, end)`
    pub fn line_starts_within(&self, start: usize, end: usize) -> impl Iterator<Item = usize> + '_ {
        self.line_starts
            .iter()
            .copied()
            .filter(move |offset| *offset > start && *offset < end)
    }

    pub fn span(&self, start_byte: usize, end_byte: usize) -> Span {
        let start_line = self.line_of(start_byte);
        let end_line = if end_byte > start_byte {
            self.line_of(end_byte - 1)
        } else {
            start_line
        };
        Span {
            start_byte,
            end_byte,
            start_line,
            end_line,
        }
    }

    pub const fn source_len(&self) -> usize {
        self.len
    }
}

/// Semantic kind of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Module,
    Class,
    Function,
    Method,
    Property,
    StaticMethod,
    ClassMethod,
    Generator,
    AsyncFunction,
    Lambda,
    DataHolder,
    Other,
}

impl ChunkKind {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::Property => "property",
            Self::StaticMethod => "static_method",
            Self::ClassMethod => "class_method",
            Self::Generator => "generator",
            Self::AsyncFunction => "async_function",
            Self::Lambda => "lambda",
            Self::DataHolder => "data_holder",
            Self::Other => "other",
        }
    }

    /// Function-like kinds (anything callable defined in source)
    #[must_use]
    pub const fn is_callable(self) -> bool {
        matches!(
            self,
            Self::Function
                | Self::Method
                | Self::Property
                | Self::StaticMethod
                | Self::ClassMethod
                | Self::Generator
                | Self::AsyncFunction
                | Self::Lambda
        )
    }
}

/// Closed set of recognized modifier/structural tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorTag {
    Property,
    Static,
    ClassScoped,
    Generator,
    Asynchronous,
    DataHolder,
}

impl DecoratorTag {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Static => "static",
            Self::ClassScoped => "class_scoped",
            Self::Generator => "generator",
            Self::Asynchronous => "asynchronous",
            Self::DataHolder => "data_holder",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "property" => Some(Self::Property),
            "static" => Some(Self::Static),
            "class_scoped" => Some(Self::ClassScoped),
            "generator" => Some(Self::Generator),
            "asynchronous" => Some(Self::Asynchronous),
            "data_holder" => Some(Self::DataHolder),
            _ => None,
        }
    }
}

/// A classified modifier: a known tag, or the verbatim source text of an unknown one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Decorator {
    Tag(DecoratorTag),
    Other(String),
}

impl Decorator {
    #[must_use]
    pub const fn tag(&self) -> Option<DecoratorTag> {
        match self {
            Self::Tag(tag) => Some(*tag),
            Self::Other(_) => None,
        }
    }
}

impl From<String> for Decorator {
    fn from(value: String) -> Self {
        match DecoratorTag::from_name(&value) {
            Some(tag) => Self::Tag(tag),
            None => Self::Other(value),
        }
    }
}

impl From<Decorator> for String {
    fn from(value: Decorator) -> Self {
        match value {
            Decorator::Tag(tag) => tag.as_str().to_string(),
            Decorator::Other(text) => text,
        }
    }
}

/// How a chunk came into being in the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkOrigin {
    /// Function/class/module definition node
    Definition,
    /// Callable literal (lambda, closure, arrow function)
    Literal,
    /// Top-level non-definition statement
    Gap,
    /// Top-level guarded entry block
    Guarded,
    /// Top-level `name = <callable literal>` statement
    LambdaAssignment,
    /// Whole-file chunk emitted when the tree cannot be used
    Fallback,
    /// Introduced by the merger or splitter
    Synthetic,
}

/// Index of a chunk inside its [`ChunkTree`]
pub type ChunkIndex = usize;

/// A semantic unit of source text with structural metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Stable id derived from file path, span and depth
    pub id: String,
    pub kind: ChunkKind,
    pub name: String,
    pub signature: String,
    pub docstring: String,
    pub decorators: Vec<Decorator>,
    /// Base types named in the definition (class bases, implemented trait)
    pub extends: Vec<String>,
    pub span: Span,
    pub parent: Option<ChunkIndex>,
    pub children: Vec<ChunkIndex>,
    /// Nesting level; top-level chunks sit at depth 0
    pub depth: usize,
    pub synthetic: bool,
    /// Id of the chunk this fragment was split from
    pub split_from: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) node: Option<NodeId>,
    pub(crate) origin: ChunkOrigin,
}

impl Chunk {
    pub(crate) fn new(
        file_path: &str,
        kind: ChunkKind,
        name: impl Into<String>,
        span: Span,
        depth: usize,
        origin: ChunkOrigin,
    ) -> Self {
        Self {
            id: chunk_id(file_path, &span, depth),
            kind,
            name: name.into(),
            signature: String::new(),
            docstring: String::new(),
            decorators: Vec::new(),
            extends: Vec::new(),
            span,
            parent: None,
            children: Vec::new(),
            depth,
            synthetic: origin == ChunkOrigin::Synthetic,
            split_from: None,
            diagnostics: Vec::new(),
            node: None,
            origin,
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: DecoratorTag) -> bool {
        self.decorators.iter().any(|d| d.tag() == Some(tag))
    }

    /// Whether this chunk holds plain top-level statements rather than a definition
    #[must_use]
    pub fn is_gap(&self) -> bool {
        self.origin == ChunkOrigin::Gap
    }
}

/// Deterministic chunk id: hex SHA-256 prefix over path, byte span and depth
pub fn chunk_id(file_path: &str, span: &Span, depth: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update([0u8]);
    hasher.update((span.start_byte as u64).to_be_bytes());
    hasher.update((span.end_byte as u64).to_be_bytes());
    hasher.update((depth as u64).to_be_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// All chunks of one file, stored in an arena and linked by index
#[derive(Debug, Clone)]
pub struct ChunkTree {
    pub file_path: String,
    pub language: Language,
    /// Package or namespace the file declares
    pub package: Option<String>,
    /// Modules imported at file level, in source order
    pub imports: Vec<String>,
    chunks: Vec<Chunk>,
    roots: Vec<ChunkIndex>,
}

impl ChunkTree {
    pub fn new(file_path: impl Into<String>, language: Language) -> Self {
        Self {
            file_path: file_path.into(),
            language,
            package: None,
            imports: Vec::new(),
            chunks: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Add a chunk to the arena, linking it under `parent` (or the module root)
    pub(crate) fn insert(&mut self, mut chunk: Chunk, parent: Option<ChunkIndex>) -> ChunkIndex {
        let idx = self.chunks.len();
        chunk.parent = parent;
        self.chunks.push(chunk);
        match parent {
            Some(p) => self.chunks[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    #[must_use]
    pub fn get(&self, idx: ChunkIndex) -> &Chunk {
        &self.chunks[idx]
    }

    pub(crate) fn get_mut(&mut self, idx: ChunkIndex) -> &mut Chunk {
        &mut self.chunks[idx]
    }

    /// Top-level chunks in source order
    #[must_use]
    pub fn roots(&self) -> &[ChunkIndex] {
        &self.roots
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<ChunkIndex>) {
        self.roots = roots;
    }

    /// Number of arena slots, including chunks detached by merging or splitting
    pub(crate) fn arena_len(&self) -> usize {
        self.chunks.len()
    }

    /// Reachable chunks in pre-order (parents before children, source order)
    #[must_use]
    pub fn preorder(&self) -> Vec<ChunkIndex> {
        let mut out = Vec::with_capacity(self.chunks.len());
        let mut stack: Vec<ChunkIndex> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(self.chunks[idx].children.iter().rev().copied());
        }
        out
    }

    /// Re-sort every child list (and the roots) by span start
    pub(crate) fn sort_children(&mut self) {
        let starts: Vec<(usize, usize)> = self
            .chunks
            .iter()
            .map(|c| (c.span.start_byte, c.span.end_byte))
            .collect();
        let by_start = |a: &ChunkIndex, b: &ChunkIndex| {
            starts[*a]
                .0
                .cmp(&starts[*b].0)
                .then_with(|| starts[*b].1.cmp(&starts[*a].1))
        };
        self.roots.sort_by(by_start);
        for chunk in &mut self.chunks {
            chunk.children.sort_by(by_start);
        }
    }

    /// Parent chunk id, resolved through the arena
    #[must_use]
    pub fn parent_id(&self, idx: ChunkIndex) -> Option<&str> {
        self.chunks[idx]
            .parent
            .map(|p| self.chunks[p].id.as_str())
    }
}
