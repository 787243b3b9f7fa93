// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CommonMark front end for [`hybrid_markdown`].
//!
//! [`parse`] reads Markdown with [`pulldown_cmark`] (tables, task lists and strikethrough enabled)
//! and builds the [`BlockNode`] tree the hybrid renderer consumes. [`from_events`] builds the same
//! tree from an existing event stream, for callers that configure their own parser.
//!
//! A list is tight unless one of its items contains a paragraph block, which is how
//! `pulldown-cmark` reports loose lists. A bulleted list with a task marker on any item becomes
//! a [`BlockNode::TaskList`]; items without a marker are not completed.
//!
//! ```
//! use hybrid_markdown::{BlockNode, InlineNode};
//!
//! let blocks = hybrid_markdown_cmark::parse("# Title\n\n> quoted\n");
//! assert_eq!(
//!     blocks,
//!     [
//!         BlockNode::Heading {
//!             level: 1,
//!             content: vec![InlineNode::Text("Title".into())],
//!         },
//!         BlockNode::Blockquote(vec![BlockNode::Paragraph(vec![InlineNode::Text(
//!             "quoted".into()
//!         )])]),
//!     ]
//! );
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::mem;

use hybrid_markdown::{
    BlockNode, ColumnAlignment, InlineNode, ListItem, TableCell, TableRow, TaskListItem,
};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag};

/// The parser options used by [`parse`].
pub fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH
}

/// Parses `markdown` into top-level blocks.
pub fn parse(markdown: &str) -> Vec<BlockNode> {
    from_events(Parser::new_ext(markdown, options()))
}

/// Builds top-level blocks from a `pulldown-cmark` event stream.
pub fn from_events<'a>(events: impl IntoIterator<Item = Event<'a>>) -> Vec<BlockNode> {
    let mut builder = TreeBuilder::default();
    for event in events {
        builder.event(event);
    }
    builder.finish()
}

#[derive(Clone, Copy)]
enum Wrapper {
    Emphasis,
    Strong,
    Strikethrough,
    /// Tags without a node of their own; their content is kept.
    Transparent,
}

struct PendingItem {
    checked: Option<bool>,
    loose: bool,
    blocks: Vec<BlockNode>,
    /// Bare text of a tight item, not yet wrapped in a paragraph.
    inlines: Vec<InlineNode>,
}

impl PendingItem {
    fn flush_inlines(&mut self) {
        if !self.inlines.is_empty() {
            let inlines = mem::take(&mut self.inlines);
            self.blocks.push(BlockNode::Paragraph(inlines));
        }
    }
}

enum Frame {
    Blockquote(Vec<BlockNode>),
    List {
        start: Option<u64>,
        loose: bool,
        items: Vec<(Option<bool>, Vec<BlockNode>)>,
    },
    Item(PendingItem),
    Paragraph(Vec<InlineNode>),
    Heading(u8, Vec<InlineNode>),
    CodeBlock(Option<String>, String),
    HtmlBlock(String),
    Table(Vec<ColumnAlignment>, Vec<TableRow>),
    Row(Vec<TableCell>),
    Cell(Vec<InlineNode>),
    Inline(Wrapper, Vec<InlineNode>),
    Link(String, Vec<InlineNode>),
    Image(String, Vec<InlineNode>),
}

impl Frame {
    fn inlines_mut(&mut self) -> Option<&mut Vec<InlineNode>> {
        match self {
            Self::Item(item) => Some(&mut item.inlines),
            Self::Paragraph(inlines)
            | Self::Heading(_, inlines)
            | Self::Cell(inlines)
            | Self::Inline(_, inlines)
            | Self::Link(_, inlines)
            | Self::Image(_, inlines) => Some(inlines),
            _ => None,
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    blocks: Vec<BlockNode>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => match self.stack.last_mut() {
                Some(Frame::CodeBlock(_, content)) => content.push_str(&text),
                Some(Frame::HtmlBlock(html)) => html.push_str(&text),
                _ => self.push_inline(InlineNode::Text(text.into_string())),
            },
            Event::Html(html) => match self.stack.last_mut() {
                Some(Frame::HtmlBlock(block)) => block.push_str(&html),
                _ => self.push_block(BlockNode::HtmlBlock(html.into_string())),
            },
            Event::Code(code) | Event::InlineMath(code) | Event::DisplayMath(code) => {
                self.push_inline(InlineNode::Code(code.into_string()));
            }
            Event::InlineHtml(html) => self.push_inline(InlineNode::Html(html.into_string())),
            Event::FootnoteReference(label) => {
                self.push_inline(InlineNode::Text(format!("[^{label}]")));
            }
            Event::SoftBreak => self.push_inline(InlineNode::SoftBreak),
            Event::HardBreak => self.push_inline(InlineNode::LineBreak),
            Event::Rule => self.push_block(BlockNode::ThematicBreak),
            Event::TaskListMarker(checked) => {
                if let Some(item) = self.stack.iter_mut().rev().find_map(|frame| match frame {
                    Frame::Item(item) => Some(item),
                    _ => None,
                }) {
                    item.checked = Some(checked);
                }
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => {
                if let Some(Frame::Item(item)) = self.stack.last_mut() {
                    item.loose = true;
                    item.flush_inlines();
                }
                Frame::Paragraph(Vec::new())
            }
            Tag::Heading { level, .. } => Frame::Heading(level as u8, Vec::new()),
            Tag::BlockQuote(_) => Frame::Blockquote(Vec::new()),
            Tag::CodeBlock(kind) => {
                let fence_info = match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.into_string()),
                    _ => None,
                };
                Frame::CodeBlock(fence_info, String::new())
            }
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::List(start) => Frame::List {
                start,
                loose: false,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item(PendingItem {
                checked: None,
                loose: false,
                blocks: Vec::new(),
                inlines: Vec::new(),
            }),
            Tag::Table(alignments) => {
                Frame::Table(alignments.into_iter().map(column_alignment).collect(), Vec::new())
            }
            Tag::TableHead | Tag::TableRow => Frame::Row(Vec::new()),
            Tag::TableCell => Frame::Cell(Vec::new()),
            Tag::Emphasis => Frame::Inline(Wrapper::Emphasis, Vec::new()),
            Tag::Strong => Frame::Inline(Wrapper::Strong, Vec::new()),
            Tag::Strikethrough => Frame::Inline(Wrapper::Strikethrough, Vec::new()),
            Tag::Link { dest_url, .. } => Frame::Link(dest_url.into_string(), Vec::new()),
            Tag::Image { dest_url, .. } => Frame::Image(dest_url.into_string(), Vec::new()),
            _ => Frame::Inline(Wrapper::Transparent, Vec::new()),
        };
        self.stack.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Blockquote(children) => self.push_block(BlockNode::Blockquote(children)),
            Frame::List {
                start,
                loose,
                items,
            } => self.push_block(list_block(start, !loose, items)),
            Frame::Item(mut item) => {
                item.flush_inlines();
                if let Some(Frame::List { loose, items, .. }) = self.stack.last_mut() {
                    *loose |= item.loose;
                    items.push((item.checked, item.blocks));
                }
            }
            Frame::Paragraph(inlines) => self.push_block(BlockNode::Paragraph(inlines)),
            Frame::Heading(level, content) => {
                self.push_block(BlockNode::Heading { level, content });
            }
            Frame::CodeBlock(fence_info, content) => self.push_block(BlockNode::CodeBlock {
                fence_info,
                content,
            }),
            Frame::HtmlBlock(html) => self.push_block(BlockNode::HtmlBlock(html)),
            Frame::Table(alignments, rows) => {
                self.push_block(BlockNode::Table { alignments, rows });
            }
            Frame::Row(cells) => {
                if let Some(Frame::Table(_, rows)) = self.stack.last_mut() {
                    rows.push(TableRow { cells });
                }
            }
            Frame::Cell(content) => {
                if let Some(Frame::Row(cells)) = self.stack.last_mut() {
                    cells.push(TableCell { content });
                }
            }
            Frame::Inline(wrapper, children) => match wrapper {
                Wrapper::Emphasis => self.push_inline(InlineNode::Emphasis(children)),
                Wrapper::Strong => self.push_inline(InlineNode::Strong(children)),
                Wrapper::Strikethrough => self.push_inline(InlineNode::Strikethrough(children)),
                Wrapper::Transparent => children.into_iter().for_each(|c| self.push_inline(c)),
            },
            Frame::Link(destination, children) => self.push_inline(InlineNode::Link {
                destination,
                children,
            }),
            Frame::Image(source, children) => {
                self.push_inline(InlineNode::Image { source, children });
            }
        }
    }

    fn push_block(&mut self, block: BlockNode) {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Blockquote(children) => {
                    children.push(block);
                    return;
                }
                Frame::Item(item) => {
                    item.flush_inlines();
                    item.blocks.push(block);
                    return;
                }
                _ => {}
            }
        }
        self.blocks.push(block);
    }

    fn push_inline(&mut self, node: InlineNode) {
        let Some(inlines) = self.stack.last_mut().and_then(Frame::inlines_mut) else {
            return;
        };
        // The parser splits text at escapes and brackets.
        match (inlines.last_mut(), node) {
            (Some(InlineNode::Text(last)), InlineNode::Text(text)) => last.push_str(&text),
            (_, node) => inlines.push(node),
        }
    }

    fn finish(mut self) -> Vec<BlockNode> {
        while !self.stack.is_empty() {
            self.end();
        }
        self.blocks
    }
}

fn list_block(
    start: Option<u64>,
    is_tight: bool,
    items: Vec<(Option<bool>, Vec<BlockNode>)>,
) -> BlockNode {
    match start {
        Some(start) => BlockNode::NumberedList {
            is_tight,
            start,
            items: items
                .into_iter()
                .map(|(_, children)| ListItem::new(children))
                .collect(),
        },
        None if items.iter().any(|(checked, _)| checked.is_some()) => BlockNode::TaskList {
            is_tight,
            items: items
                .into_iter()
                .map(|(checked, children)| TaskListItem {
                    is_completed: checked.unwrap_or(false),
                    children,
                })
                .collect(),
        },
        None => BlockNode::BulletedList {
            is_tight,
            items: items
                .into_iter()
                .map(|(_, children)| ListItem::new(children))
                .collect(),
        },
    }
}

fn column_alignment(alignment: Alignment) -> ColumnAlignment {
    match alignment {
        Alignment::None => ColumnAlignment::None,
        Alignment::Left => ColumnAlignment::Left,
        Alignment::Center => ColumnAlignment::Center,
        Alignment::Right => ColumnAlignment::Right,
    }
}
