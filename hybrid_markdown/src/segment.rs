// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting a block sequence into native text runs and declarative blocks.

use alloc::vec::Vec;

use crate::BlockNode;

/// A maximal group of blocks rendered by one presentation path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Blocks that flow as a single piece of native text.
    TextRun(Vec<BlockNode>),
    /// A block rendered outside the native text view.
    Declarative(BlockNode),
}

impl Segment {
    /// The blocks of this segment, in order.
    pub fn blocks(&self) -> &[BlockNode] {
        match self {
            Self::TextRun(blocks) => blocks,
            Self::Declarative(block) => core::slice::from_ref(block),
        }
    }
}

/// Splits `blocks` into segments, preserving order.
///
/// Headings, block quotes, lists, thematic breaks and image-free paragraphs accumulate into a
/// text run. Code blocks, tables, HTML blocks and paragraphs containing an inline image end the
/// current run and become declarative segments of their own.
pub fn segment(blocks: &[BlockNode]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut buffer = Vec::new();

    for block in blocks {
        let flows = match block {
            BlockNode::Paragraph(_) => !block.has_inline_image(),
            BlockNode::Heading { .. }
            | BlockNode::Blockquote(_)
            | BlockNode::BulletedList { .. }
            | BlockNode::NumberedList { .. }
            | BlockNode::TaskList { .. }
            | BlockNode::ThematicBreak => true,
            BlockNode::CodeBlock { .. } | BlockNode::Table { .. } | BlockNode::HtmlBlock(_) => {
                false
            }
        };
        if flows {
            buffer.push(block.clone());
        } else {
            flush(&mut buffer, &mut segments);
            segments.push(Segment::Declarative(block.clone()));
        }
    }
    flush(&mut buffer, &mut segments);

    segments
}

fn flush(buffer: &mut Vec<BlockNode>, segments: &mut Vec<Segment>) {
    if !buffer.is_empty() {
        segments.push(Segment::TextRun(core::mem::take(buffer)));
    }
}
