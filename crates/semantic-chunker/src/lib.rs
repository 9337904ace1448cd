//! # Context Semantic Chunker
//!
//! Splits source files into a tree of semantic chunks (modules, classes, functions, methods,
//! lambdas) for retrieval and AI context. Python, Rust, JavaScript, TypeScript and Go have
//! syntax adapters; other languages get a whole-file chunk split by lines.
//!
//! ## Guarantees
//!
//! For every file the chunker returns chunks that:
//! - Cover the file: top-level chunks tile `[0, len)` with no gaps and no overlaps
//! - Nest properly: a child span lies inside its parent and siblings never overlap
//! - Are deterministic: the same input always yields the same ids, order and metadata
//! - Never fail on broken input: malformed trees degrade to one whole-file chunk
//!
//! ## Architecture
//!
//! ```text
//! Source Code
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> Tree-sitter Parsing → SyntaxTree (via per-grammar NodeAdapter)
//!     │
//!     ├──> Tree Walker
//!     │    ├─> Tile top-level units over the file
//!     │    └─> Nest definitions under their enclosing chunk
//!     │
//!     ├──> Metadata Extractor
//!     │    ├─> Docstrings, signatures, base types
//!     │    └─> Decorator tags and refined kinds
//!     │
//!     ├──> Boundary Merger/Splitter
//!     │    ├─> Fold trivial top-level gaps
//!     │    └─> Split oversized chunks at child boundaries
//!     │
//!     └──> Emitter → ChunkRecord[] (pre-order)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_semantic_chunker::{ChunkKind, Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//!
//! let code = r#"
//! class Greeter:
//!     @staticmethod
//!     def hello(name: str) -> str:
//!         return f"hello {name}"
//! "#;
//!
//! let records = chunker.chunk_str(code, Some("greeter.py")).unwrap();
//! let hello = records.iter().find(|r| r.name == "hello").unwrap();
//! assert_eq!(hello.kind, ChunkKind::StaticMethod);
//! assert_eq!(hello.signature, "(name: str) -> str");
//! ```

mod adapter;
mod boundary;
mod chunker;
mod config;
mod emitter;
mod error;
mod language;
mod metadata;
mod node;
mod parser;
mod types;
mod walker;

pub use adapter::{
    adapter_for, normalize, GoAdapter, JavaScriptAdapter, NodeAdapter, PythonAdapter, RustAdapter,
};
pub use boundary::BoundaryProcessor;
pub use chunker::{Chunker, ChunkingStats, SourceInput};
pub use config::{ChunkerConfig, DecoratorRuleConfig, SizeUnit, StatementPolicy};
pub use emitter::{emit, to_json, to_json_lines, ChunkRecord};
pub use error::{ChunkerError, Diagnostic, DiagnosticCode, Result};
pub use language::Language;
pub use metadata::{DecoratorRule, DecoratorRules, MetadataExtractor};
pub use node::{ByteSpan, NodeFlags, NodeId, NodeKind, SyntaxNode, SyntaxTree};
pub use parser::SourceParser;
pub use types::{
    Chunk, ChunkIndex, ChunkKind, ChunkTree, Decorator, DecoratorTag, LineIndex, Span,
};
pub use walker::TreeWalker;
