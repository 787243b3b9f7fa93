// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A whole Markdown document, assembled from segments.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use log::debug;

use crate::bridge::{CodeBlockView, TextRunView};
use crate::highlight::{CodeSyntaxHighlighter, HighlightedBlock, highlight_block};
use crate::{
    BlockNode, ColorScheme, FontSystem, RenderEnvironment, RichText, Segment, TextEngine,
    filter_images_matching, segment,
};

/// One vertically stacked item of a [`HybridDocument`].
#[derive(Clone, Debug)]
pub enum DocumentItem {
    /// A run of flowing blocks shown by one text view.
    TextRun(TextRunView),
    /// A code block shown by a native code view.
    CodeBlock(CodeBlockView),
    /// A code block the host renders itself from highlighted semantic text.
    CodeText {
        /// The fence info.
        language: Option<String>,
        /// The highlighted code.
        text: RichText,
    },
    /// Any other block the host renders itself.
    Declarative(BlockNode),
}

/// A document rendered as a vertical stack of text runs and standalone blocks.
#[derive(Clone, Debug, Default)]
pub struct HybridDocument {
    blocks: Vec<BlockNode>,
    segmented_for: Option<ColorScheme>,
    segments: Vec<Segment>,
    items: Vec<DocumentItem>,
    text_run_spacing: f32,
}

impl HybridDocument {
    /// Creates a document showing `blocks`.
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Replaces the blocks. Segments are recomputed by the next [`HybridDocument::update`].
    pub fn set_blocks(&mut self, blocks: Vec<BlockNode>) {
        if self.blocks != blocks {
            self.blocks = blocks;
            self.segmented_for = None;
        }
    }

    /// The blocks, before image filtering.
    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// The segments of the last update.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The items of the last update, top to bottom.
    pub fn items(&self) -> &[DocumentItem] {
        &self.items
    }

    /// Mutable access to the items.
    pub fn items_mut(&mut self) -> &mut [DocumentItem] {
        &mut self.items
    }

    /// Re-renders the document under `env`.
    ///
    /// Text run views at the same position are kept and updated in place, so unchanged runs keep
    /// their measurements. Returns `true` if any item changed.
    pub fn update<H, F>(&mut self, env: &RenderEnvironment, highlighter: &H, fonts: &mut F) -> bool
    where
        H: CodeSyntaxHighlighter + ?Sized,
        F: FontSystem + ?Sized,
    {
        self.text_run_spacing = env.config.text_run_spacing;
        if self.segmented_for != Some(env.color_scheme) {
            let visible = filter_images_matching(&self.blocks, env.color_scheme);
            self.segments = segment(&visible);
            self.segmented_for = Some(env.color_scheme);
            debug!(
                "segmented {} blocks into {} segments",
                visible.len(),
                self.segments.len()
            );
        }

        let mut previous: Vec<Option<DocumentItem>> =
            mem::take(&mut self.items).into_iter().map(Some).collect();
        let mut changed = previous.len() != self.segments.len();
        for (ix, seg) in self.segments.iter().enumerate() {
            let reused = previous.get_mut(ix).and_then(Option::take);
            let item = match seg {
                Segment::TextRun(blocks) => match reused {
                    Some(DocumentItem::TextRun(mut view)) => {
                        changed |= view.update(blocks, env, fonts);
                        DocumentItem::TextRun(view)
                    }
                    _ => {
                        changed = true;
                        DocumentItem::TextRun(TextRunView::with_blocks(blocks, env, fonts))
                    }
                },
                Segment::Declarative(block) => {
                    let item = declarative_item(block, env, highlighter, fonts);
                    changed |= !reused.is_some_and(|old| same_declarative(&old, &item));
                    item
                }
            };
            self.items.push(item);
        }
        changed
    }

    /// The height of the whole document at `width`.
    ///
    /// Text runs and native code blocks are measured here; `host_height` measures the items the
    /// host renders itself. Every text run is followed by the configured text run spacing.
    pub fn height_for_width<E>(
        &mut self,
        width: f32,
        engine: &mut E,
        mut host_height: impl FnMut(&DocumentItem) -> f32,
    ) -> f32
    where
        E: TextEngine + ?Sized,
    {
        let spacing = self.text_run_spacing;
        let mut height = 0.0;
        for item in &mut self.items {
            height += match item {
                DocumentItem::TextRun(view) => view.height_for_width(width, engine) + spacing,
                DocumentItem::CodeBlock(view) => view.measure(width, engine).height,
                _ => host_height(item),
            };
        }
        height
    }

    /// Lays out every text run at `width` and redraws its decorations.
    pub fn layout_pass<E>(&mut self, width: f32, engine: &mut E)
    where
        E: TextEngine + ?Sized,
    {
        for item in &mut self.items {
            if let DocumentItem::TextRun(view) = item {
                view.layout_pass(width, engine);
            }
        }
    }
}

fn declarative_item<H, F>(
    block: &BlockNode,
    env: &RenderEnvironment,
    highlighter: &H,
    fonts: &mut F,
) -> DocumentItem
where
    H: CodeSyntaxHighlighter + ?Sized,
    F: FontSystem + ?Sized,
{
    let BlockNode::CodeBlock {
        fence_info,
        content,
    } = block
    else {
        return DocumentItem::Declarative(block.clone());
    };
    let language = fence_info.as_deref();
    match highlight_block(highlighter, content, language) {
        HighlightedBlock::Styled(code) => {
            DocumentItem::CodeBlock(CodeBlockView::new(&code, language, env, fonts))
        }
        HighlightedBlock::Semantic(text) => DocumentItem::CodeText {
            language: fence_info.clone(),
            text,
        },
    }
}

fn same_declarative(a: &DocumentItem, b: &DocumentItem) -> bool {
    match (a, b) {
        (DocumentItem::CodeBlock(a), DocumentItem::CodeBlock(b)) => a == b,
        (
            DocumentItem::CodeText {
                language: a_language,
                text: a_text,
            },
            DocumentItem::CodeText {
                language: b_language,
                text: b_text,
            },
        ) => a_language == b_language && a_text == b_text,
        (DocumentItem::Declarative(a), DocumentItem::Declarative(b)) => a == b,
        _ => false,
    }
}
