//! Size normalization: merge trivial top-level gaps, split oversized chunks.

use crate::config::{ChunkerConfig, SizeUnit};
use crate::types::{Chunk, ChunkIndex, ChunkKind, ChunkOrigin, ChunkTree, LineIndex, Span};
use unicode_segmentation::UnicodeSegmentation;

pub struct BoundaryProcessor<'a> {
    config: &'a ChunkerConfig,
}

impl<'a> BoundaryProcessor<'a> {
    pub fn new(config: &'a ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn apply(&self, chunks: &mut ChunkTree, source: &str, lines: &LineIndex) {
        if self.config.merge_adjacent_trivial {
            self.merge_trivial(chunks, source, lines);
        }
        self.split_oversized(chunks, source, lines);
        chunks.sort_children();
    }

    /// Size of a span in the configured unit
    pub fn measure(&self, source: &str, span: &Span) -> usize {
        match self.config.size_unit {
            SizeUnit::Chars => source
                .get(span.start_byte..span.end_byte)
                .map_or(0, |text| text.graphemes(true).count()),
            SizeUnit::Lines => {
                if span.is_empty() {
                    0
                } else {
                    span.line_count()
                }
            }
        }
    }

    fn is_trivial(&self, chunk: &Chunk, source: &str) -> bool {
        chunk.is_gap()
            && chunk.children.is_empty()
            && self.measure(source, &chunk.span) < self.config.min_unit_size
    }

    fn merge_trivial(&self, chunks: &mut ChunkTree, source: &str, lines: &LineIndex) {
        let roots = chunks.roots().to_vec();
        let mut merged_roots = Vec::with_capacity(roots.len());
        let mut run: Vec<ChunkIndex> = Vec::new();
        let mut leading = true;

        for idx in roots {
            if !self.is_trivial(chunks.get(idx), source) {
                self.flush_run(chunks, lines, &mut run, leading, &mut merged_roots);
                leading = false;
                merged_roots.push(idx);
                continue;
            }

            if let Some(&first) = run.first() {
                let candidate = lines.span(
                    chunks.get(first).span.start_byte,
                    chunks.get(idx).span.end_byte,
                );
                if self.measure(source, &candidate) > self.config.max_unit_size {
                    self.flush_run(chunks, lines, &mut run, leading, &mut merged_roots);
                    leading = false;
                }
            }
            run.push(idx);
        }
        self.flush_run(chunks, lines, &mut run, leading, &mut merged_roots);

        chunks.set_roots(merged_roots);
    }

    fn flush_run(
        &self,
        chunks: &mut ChunkTree,
        lines: &LineIndex,
        run: &mut Vec<ChunkIndex>,
        leading: bool,
        roots: &mut Vec<ChunkIndex>,
    ) {
        if run.is_empty() {
            return;
        }
        if !leading && run.len() < 2 {
            roots.append(run);
            return;
        }

        let start = chunks.get(run[0]).span.start_byte;
        let end = chunks.get(run[run.len() - 1]).span.end_byte;
        let span = lines.span(start, end);
        let name = if leading {
            "<preamble>".to_string()
        } else {
            format!("<module@{}:{}>", span.start_line, lines.column_of(start))
        };

        let file_path = chunks.file_path.clone();
        let merged = Chunk::new(
            &file_path,
            ChunkKind::Module,
            name,
            span,
            0,
            ChunkOrigin::Synthetic,
        );
        let idx = chunks.insert(merged, None);
        log::debug!(
            "{file_path}: merged {} trivial units into '{}'",
            run.len(),
            chunks.get(idx).name
        );
        roots.push(idx);
        run.clear();
    }

    fn split_oversized(&self, chunks: &mut ChunkTree, source: &str, lines: &LineIndex) {
        for idx in chunks.preorder() {
            if self.measure(source, &chunks.get(idx).span) > self.config.max_unit_size {
                self.split(chunks, idx, source, lines);
            }
        }
    }

    /// Replace `idx` with fragments tiling its span; returns false when no cut is possible
    fn split(
        &self,
        chunks: &mut ChunkTree,
        idx: ChunkIndex,
        source: &str,
        lines: &LineIndex,
    ) -> bool {
        let original = chunks.get(idx).clone();
        let (start, end) = (original.span.start_byte, original.span.end_byte);

        let mut cuts: Vec<usize> = if original.children.is_empty() {
            lines.line_starts_within(start, end).collect()
        } else {
            original
                .children
                .iter()
                .flat_map(|c| {
                    let span = chunks.get(*c).span;
                    [span.start_byte, span.end_byte]
                })
                .filter(|offset| *offset > start && *offset < end)
                .collect()
        };
        cuts.sort_unstable();
        cuts.dedup();

        let pieces = self.pack(source, lines, start, end, &cuts);
        if pieces.len() < 2 {
            log::debug!(
                "{}: chunk '{}' exceeds max size but has no usable cut point",
                chunks.file_path,
                original.name
            );
            return false;
        }

        let file_path = chunks.file_path.clone();
        let mut fragments = Vec::with_capacity(pieces.len());
        for (pos, (piece_start, piece_end)) in pieces.iter().copied().enumerate() {
            let mut fragment = Chunk::new(
                &file_path,
                original.kind,
                original.name.clone(),
                lines.span(piece_start, piece_end),
                original.depth,
                ChunkOrigin::Synthetic,
            );
            fragment.split_from = Some(original.id.clone());
            if pos == 0 {
                fragment.docstring = original.docstring.clone();
                fragment.decorators = original.decorators.clone();
                fragment.signature = original.signature.clone();
                fragment.extends = original.extends.clone();
                fragment.diagnostics = original.diagnostics.clone();
            }
            fragments.push(chunks.insert(fragment, original.parent));
        }

        for child in &original.children {
            let child_span = chunks.get(*child).span;
            let owner = fragments
                .iter()
                .copied()
                .find(|f| chunks.get(*f).span.contains(&child_span))
                .unwrap_or(fragments[0]);
            chunks.get_mut(owner).children.push(*child);
            chunks.get_mut(*child).parent = Some(owner);
        }
        chunks.get_mut(idx).children.clear();

        match original.parent {
            Some(parent) => chunks.get_mut(parent).children.retain(|c| *c != idx),
            None => {
                let roots: Vec<ChunkIndex> = chunks
                    .roots()
                    .iter()
                    .copied()
                    .filter(|c| *c != idx)
                    .collect();
                chunks.set_roots(roots);
            }
        }

        log::debug!(
            "{file_path}: split '{}' into {} fragments",
            original.name,
            fragments.len()
        );
        true
    }

    /// Greedy packing of `[start, end)` into pieces no larger than the maximum, cutting only
    /// at `cuts`. A piece that cannot fit ends at the first cut after it.
    fn pack(
        &self,
        source: &str,
        lines: &LineIndex,
        start: usize,
        end: usize,
        cuts: &[usize],
    ) -> Vec<(usize, usize)> {
        let max = self.config.max_unit_size;
        let size = |a: usize, b: usize| self.measure(source, &lines.span(a, b));

        let mut pieces = Vec::new();
        let mut piece_start = start;
        let mut last_fit: Option<usize> = None;
        let mut i = 0;

        while i < cuts.len() {
            let cut = cuts[i];
            if cut <= piece_start {
                i += 1;
                continue;
            }
            if size(piece_start, cut) <= max {
                last_fit = Some(cut);
                i += 1;
            } else if let Some(fit) = last_fit.take() {
                pieces.push((piece_start, fit));
                piece_start = fit;
            } else {
                pieces.push((piece_start, cut));
                piece_start = cut;
                i += 1;
            }
        }

        if let Some(fit) = last_fit {
            if size(piece_start, end) > max {
                pieces.push((piece_start, fit));
                piece_start = fit;
            }
        }
        pieces.push((piece_start, end));
        pieces
    }
}
