use crate::boundary::BoundaryProcessor;
use crate::config::ChunkerConfig;
use crate::emitter::{emit, ChunkRecord};
use crate::error::{ChunkerError, Diagnostic, Result};
use crate::language::Language;
use crate::metadata::{DecoratorRules, MetadataExtractor};
use crate::node::SyntaxTree;
use crate::parser::SourceParser;
use crate::types::{ChunkTree, LineIndex};
use crate::walker::TreeWalker;
use rayon::prelude::*;

/// Everything the pipeline needs for one file
#[derive(Debug, Clone, Copy)]
pub struct SourceInput<'a> {
    pub file_path: &'a str,
    pub source: &'a str,
    pub tree: &'a SyntaxTree,
    pub language: Language,
}

impl<'a> SourceInput<'a> {
    pub fn new(file_path: &'a str, source: &'a str, tree: &'a SyntaxTree) -> Self {
        Self {
            file_path,
            source,
            tree,
            language: tree.language(),
        }
    }
}

/// Main chunker interface for processing code
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    rules: DecoratorRules,
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
            rules: DecoratorRules::builtin(),
        }
    }
}

impl Chunker {
    /// Create a new chunker, rejecting invalid configuration up front
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        let rules = DecoratorRules::from_config(&config.decorator_rules)?;
        Ok(Self { config, rules })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk code from a string, detecting the language from the file extension
    pub fn chunk_str(&self, content: &str, file_path: Option<&str>) -> Result<Vec<ChunkRecord>> {
        let file_path = file_path.unwrap_or("unknown");
        let language = Language::from_path(file_path);

        self.chunk_with_language(content, file_path, language)
    }

    /// Chunk code with explicit language
    pub fn chunk_with_language(
        &self,
        content: &str,
        file_path: &str,
        language: Language,
    ) -> Result<Vec<ChunkRecord>> {
        self.ensure_enabled(language)?;

        if !language.supports_ast() {
            log::warn!(
                "{file_path}: no syntax adapter for {}, emitting whole-file chunk",
                language.as_str()
            );
            let lines = LineIndex::new(content);
            let mut chunks = TreeWalker::fallback(
                file_path,
                language,
                &lines,
                Diagnostic::unsupported_language(language.as_str()),
            );
            BoundaryProcessor::new(&self.config).apply(&mut chunks, content, &lines);
            return Ok(emit(&chunks));
        }

        let tree = SourceParser::new(language)?.parse(content)?;
        self.chunk_tree(SourceInput {
            file_path,
            source: content,
            tree: &tree,
            language,
        })
    }

    /// Chunk a file whose syntax tree was produced by the caller
    pub fn chunk_tree(&self, input: SourceInput<'_>) -> Result<Vec<ChunkRecord>> {
        self.ensure_enabled(input.language)?;
        Ok(emit(&self.build_tree(input)))
    }

    /// Run the pipeline and return the linked chunk tree instead of flat records
    pub fn build_tree(&self, input: SourceInput<'_>) -> ChunkTree {
        let lines = LineIndex::new(input.source);
        let mut chunks = TreeWalker::new(&self.config).walk(
            input.file_path,
            input.language,
            input.source,
            input.tree,
            &lines,
        );
        MetadataExtractor::new(&self.rules).extract(&mut chunks, input.tree, input.source);
        BoundaryProcessor::new(&self.config).apply(&mut chunks, input.source, &lines);

        log::debug!(
            "{}: {} chunks ({} top-level)",
            input.file_path,
            chunks.preorder().len(),
            chunks.roots().len()
        );
        chunks
    }

    /// Chunk many `(path, content)` pairs in parallel; results follow input order
    pub fn chunk_batch(&self, files: &[(String, String)]) -> Vec<Result<Vec<ChunkRecord>>> {
        files
            .par_iter()
            .map(|(path, content)| self.chunk_str(content, Some(path.as_str())))
            .collect()
    }

    fn ensure_enabled(&self, language: Language) -> Result<()> {
        let allowed = &self.config.supported_languages;
        if !allowed.is_empty() && !allowed.iter().any(|lang| lang == language.as_str()) {
            return Err(ChunkerError::unsupported_language(language.as_str()));
        }
        Ok(())
    }

    /// Get chunk statistics
    #[must_use]
    pub fn get_stats(records: &[ChunkRecord]) -> ChunkingStats {
        let top_level: Vec<&ChunkRecord> =
            records.iter().filter(|r| r.parent_id.is_none()).collect();

        ChunkingStats {
            total_chunks: records.len(),
            top_level_chunks: top_level.len(),
            total_lines: top_level.iter().map(|r| r.line_count()).sum(),
            max_depth: records.iter().map(|r| r.depth).max().unwrap_or(0),
            synthetic_chunks: records.iter().filter(|r| r.synthetic).count(),
            split_fragments: records.iter().filter(|r| r.split_from.is_some()).count(),
            diagnostics: records.iter().map(|r| r.diagnostics.len()).sum(),
        }
    }
}

/// Chunking statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub top_level_chunks: usize,
    pub total_lines: usize,
    pub max_depth: usize,
    pub synthetic_chunks: usize,
    pub split_fragments: usize,
    pub diagnostics: usize,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} ({} top-level) | Lines: {} | Max depth: {} | Synthetic: {} | Fragments: {} | Diagnostics: {}",
            self.total_chunks,
            self.top_level_chunks,
            self.total_lines,
            self.max_depth,
            self.synthetic_chunks,
            self.split_fragments,
            self.diagnostics
        )
    }
}
