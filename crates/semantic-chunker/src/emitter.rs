use crate::error::{Diagnostic, Result};
use crate::types::{ChunkKind, ChunkTree, Decorator, Span};
use serde::{Deserialize, Serialize};

/// Flat, serializable form of one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub file_path: String,
    pub language: String,
    pub kind: ChunkKind,
    pub name: String,
    pub signature: String,
    pub docstring: String,
    pub decorators: Vec<Decorator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    pub span: Span,
    pub depth: usize,
    pub synthetic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ChunkRecord {
    /// Source text covered by this record
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.span.start_byte..self.span.end_byte)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.span.line_count()
    }
}

/// Flatten a chunk tree into records, parents before children, siblings in source order
pub fn emit(chunks: &ChunkTree) -> Vec<ChunkRecord> {
    let language = chunks.language.as_str().to_string();
    chunks
        .preorder()
        .into_iter()
        .map(|idx| {
            let chunk = chunks.get(idx);
            ChunkRecord {
                id: chunk.id.clone(),
                parent_id: chunks.parent_id(idx).map(str::to_string),
                file_path: chunks.file_path.clone(),
                language: language.clone(),
                kind: chunk.kind,
                name: chunk.name.clone(),
                signature: chunk.signature.clone(),
                docstring: chunk.docstring.clone(),
                decorators: chunk.decorators.clone(),
                extends: chunk.extends.clone(),
                package: chunks.package.clone(),
                imports: chunks.imports.clone(),
                span: chunk.span,
                depth: chunk.depth,
                synthetic: chunk.synthetic,
                split_from: chunk.split_from.clone(),
                diagnostics: chunk.diagnostics.clone(),
            }
        })
        .collect()
}

/// Serialize records as a pretty-printed JSON array
pub fn to_json(records: &[ChunkRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Serialize records as JSON lines, one record per line
pub fn to_json_lines(records: &[ChunkRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}
