use crate::config::{ChunkerConfig, StatementPolicy};
use crate::error::Diagnostic;
use crate::language::Language;
use crate::node::{NodeId, NodeKind, SyntaxTree};
use crate::types::{Chunk, ChunkIndex, ChunkKind, ChunkOrigin, ChunkTree, LineIndex};

/// Builds the provisional chunk tree from a normalized syntax tree.
///
/// Every top-level node becomes a top-level chunk and the top-level spans are widened so they
/// tile the file. Below the top level only chunkable nodes produce chunks; everything else is
/// gap content of the innermost enclosing chunk.
pub struct TreeWalker<'a> {
    config: &'a ChunkerConfig,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn walk(
        &self,
        file_path: &str,
        language: Language,
        source: &str,
        tree: &SyntaxTree,
        lines: &LineIndex,
    ) -> ChunkTree {
        let problem = tree
            .malformed()
            .map(str::to_string)
            .or_else(|| tree.check_consistency(source));
        if let Some(reason) = problem {
            log::warn!("{file_path}: malformed syntax tree, emitting whole-file chunk: {reason}");
            return Self::fallback(file_path, language, lines, Diagnostic::malformed_tree(reason));
        }

        let mut chunks = ChunkTree::new(file_path, language);
        chunks.package = tree.package().map(str::to_string);
        chunks.imports = tree.imports().to_vec();
        if source.is_empty() {
            return chunks;
        }

        let units = self.top_level_units(tree);
        if units.is_empty() {
            let span = lines.span(0, source.len());
            let gap = Chunk::new(
                file_path,
                ChunkKind::Other,
                gap_name(lines, 0),
                span,
                0,
                ChunkOrigin::Gap,
            );
            chunks.insert(gap, None);
            return chunks;
        }

        // Work stack of (node to inspect, innermost enclosing chunk)
        let mut stack: Vec<(NodeId, ChunkIndex)> = Vec::new();

        for (pos, (node_id, origin)) in units.iter().copied().enumerate() {
            let node = tree.node(node_id);
            let start = if pos == 0 {
                0
            } else {
                node.outer_span(tree).start
            };
            let end = units
                .get(pos + 1)
                .map_or(source.len(), |(next, _)| tree.node(*next).outer_span(tree).start);

            let (kind, name) = self.describe(tree, node_id, origin, lines);
            let mut chunk = Chunk::new(file_path, kind, name, lines.span(start, end), 0, origin);
            chunk.node = Some(node_id);
            let idx = chunks.insert(chunk, None);

            let skip = if origin == ChunkOrigin::LambdaAssignment {
                node.assigned_literal
            } else {
                None
            };
            push_children(&mut stack, tree, node_id, idx, skip);
        }

        while let Some((node_id, enclosing)) = stack.pop() {
            let node = tree.node(node_id);
            let origin = if node.kind.is_definition() {
                Some(ChunkOrigin::Definition)
            } else if node.flags.callable_literal && self.config.chunk_anonymous_literals {
                Some(ChunkOrigin::Literal)
            } else {
                None
            };

            let Some(origin) = origin else {
                push_children(&mut stack, tree, node_id, enclosing, None);
                continue;
            };

            let outer = node.outer_span(tree);
            let depth = chunks.get(enclosing).depth + 1;
            let (kind, name) = self.describe(tree, node_id, origin, lines);
            let mut chunk = Chunk::new(
                file_path,
                kind,
                name,
                lines.span(outer.start, outer.end),
                depth,
                origin,
            );
            chunk.node = Some(node_id);
            let idx = chunks.insert(chunk, Some(enclosing));
            push_children(&mut stack, tree, node_id, idx, None);
        }

        chunks.sort_children();
        log::debug!(
            "{file_path}: walker produced {} chunks ({} top-level)",
            chunks.arena_len(),
            chunks.roots().len()
        );
        chunks
    }

    /// Single whole-file chunk used when the tree cannot be trusted or no adapter exists
    pub fn fallback(
        file_path: &str,
        language: Language,
        lines: &LineIndex,
        diagnostic: Diagnostic,
    ) -> ChunkTree {
        let mut chunks = ChunkTree::new(file_path, language);
        if lines.source_len() == 0 {
            return chunks;
        }
        let span = lines.span(0, lines.source_len());
        let mut chunk = Chunk::new(
            file_path,
            ChunkKind::Module,
            "<module>",
            span,
            0,
            ChunkOrigin::Fallback,
        );
        chunk.diagnostics.push(diagnostic);
        chunks.insert(chunk, None);
        chunks
    }

    /// Classify each module-level node into the kind of top-level unit it starts
    fn top_level_units(&self, tree: &SyntaxTree) -> Vec<(NodeId, ChunkOrigin)> {
        tree.node(tree.root())
            .children
            .iter()
            .filter_map(|id| {
                let node = tree.node(*id);
                let origin = match node.kind {
                    NodeKind::Modifier => return None,
                    kind if kind.is_definition() => ChunkOrigin::Definition,
                    NodeKind::Statement
                        if node.flags.guarded_entry
                            && self.config.guarded_blocks == StatementPolicy::Chunk =>
                    {
                        ChunkOrigin::Guarded
                    }
                    NodeKind::Statement
                        if node.assigned_literal.is_some()
                            && self.config.lambda_assignments == StatementPolicy::Chunk =>
                    {
                        ChunkOrigin::LambdaAssignment
                    }
                    NodeKind::Expression
                        if node.flags.callable_literal && self.config.chunk_anonymous_literals =>
                    {
                        ChunkOrigin::Literal
                    }
                    _ => ChunkOrigin::Gap,
                };
                Some((*id, origin))
            })
            .collect()
    }

    /// Structural kind and display name; the metadata extractor refines the kind later
    fn describe(
        &self,
        tree: &SyntaxTree,
        node_id: NodeId,
        origin: ChunkOrigin,
        lines: &LineIndex,
    ) -> (ChunkKind, String) {
        let node = tree.node(node_id);
        let start = node.span.start;
        match origin {
            ChunkOrigin::Definition => {
                let kind = match node.kind {
                    NodeKind::Class => ChunkKind::Class,
                    NodeKind::Module => ChunkKind::Module,
                    _ => ChunkKind::Function,
                };
                let name = node
                    .name
                    .clone()
                    .unwrap_or_else(|| anonymous_name(lines, start));
                (kind, name)
            }
            ChunkOrigin::Literal | ChunkOrigin::LambdaAssignment => {
                let name = node
                    .name
                    .clone()
                    .unwrap_or_else(|| anonymous_name(lines, start));
                (ChunkKind::Lambda, name)
            }
            ChunkOrigin::Guarded => (ChunkKind::Module, "__main__".to_string()),
            ChunkOrigin::Gap | ChunkOrigin::Fallback | ChunkOrigin::Synthetic => {
                (ChunkKind::Other, gap_name(lines, node.outer_span(tree).start))
            }
        }
    }
}

fn push_children(
    stack: &mut Vec<(NodeId, ChunkIndex)>,
    tree: &SyntaxTree,
    node_id: NodeId,
    enclosing: ChunkIndex,
    skip: Option<NodeId>,
) {
    for child in tree.node(node_id).children.iter().rev() {
        if Some(*child) == skip {
            // The literal itself is the chunk; its contents still belong to it
            push_children(stack, tree, *child, enclosing, None);
        } else {
            stack.push((*child, enclosing));
        }
    }
}

pub(crate) fn anonymous_name(lines: &LineIndex, offset: usize) -> String {
    format!(
        "<anonymous@{}:{}>",
        lines.line_of(offset),
        lines.column_of(offset)
    )
}

fn gap_name(lines: &LineIndex, offset: usize) -> String {
    format!("<gap@{}:{}>", lines.line_of(offset), lines.column_of(offset))
}
