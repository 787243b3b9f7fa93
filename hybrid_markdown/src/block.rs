// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The block/inline tree consumed by the rendering bridge.
//!
//! Trees are produced once by a parser front end (for example `hybrid_markdown_cmark`) and are
//! only ever read here.

use alloc::string::String;
use alloc::vec::Vec;

/// Inline content of a paragraph, heading or list item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InlineNode {
    /// Plain text.
    Text(String),
    /// A soft line break, rendered according to [`SoftBreakMode`].
    SoftBreak,
    /// A hard line break.
    LineBreak,
    /// Inline code.
    Code(String),
    /// Raw inline HTML.
    Html(String),
    /// Emphasized content.
    Emphasis(Vec<InlineNode>),
    /// Strongly emphasized content.
    Strong(Vec<InlineNode>),
    /// Struck-through content.
    Strikethrough(Vec<InlineNode>),
    /// A link to `destination`.
    Link {
        /// The link destination as written in the source.
        destination: String,
        /// The link text.
        children: Vec<InlineNode>,
    },
    /// An inline image.
    Image {
        /// The image source as written in the source.
        source: String,
        /// The alternative text.
        children: Vec<InlineNode>,
    },
}

impl InlineNode {
    /// Returns `true` if this node is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Returns the children of container nodes, or an empty slice for leaves.
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Strikethrough(children)
            | Self::Link { children, .. }
            | Self::Image { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenates the plain text content of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_plain_text(&mut out);
        out
    }

    fn collect_plain_text(&self, out: &mut String) {
        match self {
            Self::Text(text) | Self::Code(text) | Self::Html(text) => out.push_str(text),
            Self::SoftBreak => out.push(' '),
            Self::LineBreak => out.push('\n'),
            _ => {
                for child in self.children() {
                    child.collect_plain_text(out);
                }
            }
        }
    }
}

/// How soft breaks inside a paragraph are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SoftBreakMode {
    /// Render soft breaks as a single space.
    #[default]
    Space,
    /// Render soft breaks as line breaks.
    LineBreak,
}

/// An item of a bulleted or numbered list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ListItem {
    /// The item content.
    pub children: Vec<BlockNode>,
}

impl ListItem {
    /// Creates a list item with the given children.
    pub fn new(children: Vec<BlockNode>) -> Self {
        Self { children }
    }
}

/// An item of a task list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TaskListItem {
    /// Whether the task is checked.
    pub is_completed: bool,
    /// The item content.
    pub children: Vec<BlockNode>,
}

/// Horizontal alignment of a table column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColumnAlignment {
    /// No alignment specified.
    #[default]
    None,
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
}

/// A table cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TableCell {
    /// Inline content of the cell.
    pub content: Vec<InlineNode>,
}

/// A table row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TableRow {
    /// The cells of this row.
    pub cells: Vec<TableCell>,
}

/// A block-level node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockNode {
    /// A paragraph.
    Paragraph(Vec<InlineNode>),
    /// A heading of `level` 1 through 6.
    Heading {
        /// The heading level.
        level: u8,
        /// The heading content.
        content: Vec<InlineNode>,
    },
    /// A block quote.
    Blockquote(Vec<BlockNode>),
    /// A bulleted list.
    BulletedList {
        /// Tight lists omit the blank line between items.
        is_tight: bool,
        /// The list items.
        items: Vec<ListItem>,
    },
    /// A numbered list.
    NumberedList {
        /// Tight lists omit the blank line between items.
        is_tight: bool,
        /// The number of the first item.
        start: u64,
        /// The list items.
        items: Vec<ListItem>,
    },
    /// A task list.
    TaskList {
        /// Tight lists omit the blank line between items.
        is_tight: bool,
        /// The list items.
        items: Vec<TaskListItem>,
    },
    /// A fenced or indented code block.
    CodeBlock {
        /// The info string of a fenced block, if any.
        fence_info: Option<String>,
        /// The code.
        content: String,
    },
    /// A table.
    Table {
        /// Column alignments.
        alignments: Vec<ColumnAlignment>,
        /// Rows, the header row first.
        rows: Vec<TableRow>,
    },
    /// A raw HTML block.
    HtmlBlock(String),
    /// A thematic break.
    ThematicBreak,
}

impl BlockNode {
    /// Returns `true` for the list variants.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Self::BulletedList { .. } | Self::NumberedList { .. } | Self::TaskList { .. }
        )
    }

    /// Returns `true` if this is a paragraph containing at least one inline image.
    ///
    /// Only top-level inlines are considered, which matches where images are placed by
    /// CommonMark parsers for standalone images.
    pub fn has_inline_image(&self) -> bool {
        match self {
            Self::Paragraph(inlines) => inlines.iter().any(InlineNode::is_image),
            _ => false,
        }
    }
}

/// The appearance the content is rendered for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorScheme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

const DARK_MODE_ONLY: &str = "#gh-dark-mode-only";
const LIGHT_MODE_ONLY: &str = "#gh-light-mode-only";

/// Removes images that are tagged for the other color scheme.
///
/// Images whose source ends in `#gh-dark-mode-only` are removed in light mode and images ending
/// in `#gh-light-mode-only` are removed in dark mode. Paragraphs that end up empty are dropped.
pub fn filter_images_matching(blocks: &[BlockNode], scheme: ColorScheme) -> Vec<BlockNode> {
    blocks
        .iter()
        .filter_map(|block| filter_block(block, scheme))
        .collect()
}

fn filter_block(block: &BlockNode, scheme: ColorScheme) -> Option<BlockNode> {
    Some(match block {
        BlockNode::Paragraph(inlines) => {
            let filtered = filter_inlines(inlines, scheme);
            if filtered.is_empty() {
                return None;
            }
            BlockNode::Paragraph(filtered)
        }
        BlockNode::Heading { level, content } => BlockNode::Heading {
            level: *level,
            content: filter_inlines(content, scheme),
        },
        BlockNode::Blockquote(children) => {
            BlockNode::Blockquote(filter_images_matching(children, scheme))
        }
        BlockNode::BulletedList { is_tight, items } => BlockNode::BulletedList {
            is_tight: *is_tight,
            items: items
                .iter()
                .map(|item| ListItem::new(filter_images_matching(&item.children, scheme)))
                .collect(),
        },
        BlockNode::NumberedList {
            is_tight,
            start,
            items,
        } => BlockNode::NumberedList {
            is_tight: *is_tight,
            start: *start,
            items: items
                .iter()
                .map(|item| ListItem::new(filter_images_matching(&item.children, scheme)))
                .collect(),
        },
        BlockNode::TaskList { is_tight, items } => BlockNode::TaskList {
            is_tight: *is_tight,
            items: items
                .iter()
                .map(|item| TaskListItem {
                    is_completed: item.is_completed,
                    children: filter_images_matching(&item.children, scheme),
                })
                .collect(),
        },
        other => other.clone(),
    })
}

fn filter_inlines(inlines: &[InlineNode], scheme: ColorScheme) -> Vec<InlineNode> {
    inlines
        .iter()
        .filter_map(|inline| match inline {
            InlineNode::Image { source, .. } if !image_matches(source, scheme) => None,
            InlineNode::Emphasis(children) => {
                Some(InlineNode::Emphasis(filter_inlines(children, scheme)))
            }
            InlineNode::Strong(children) => {
                Some(InlineNode::Strong(filter_inlines(children, scheme)))
            }
            InlineNode::Strikethrough(children) => {
                Some(InlineNode::Strikethrough(filter_inlines(children, scheme)))
            }
            InlineNode::Link {
                destination,
                children,
            } => Some(InlineNode::Link {
                destination: destination.clone(),
                children: filter_inlines(children, scheme),
            }),
            other => Some(other.clone()),
        })
        .collect()
}

fn image_matches(source: &str, scheme: ColorScheme) -> bool {
    match scheme {
        ColorScheme::Light => !source.ends_with(DARK_MODE_ONLY),
        ColorScheme::Dark => !source.ends_with(LIGHT_MODE_ONLY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn image(source: &str) -> InlineNode {
        InlineNode::Image {
            source: source.to_string(),
            children: vec![InlineNode::Text("alt".to_string())],
        }
    }

    #[test]
    fn dark_only_images_are_removed_in_light_mode() {
        let blocks = vec![
            BlockNode::Paragraph(vec![image("logo.png#gh-dark-mode-only")]),
            BlockNode::Paragraph(vec![
                InlineNode::Text("see ".to_string()),
                image("logo.png#gh-light-mode-only"),
            ]),
        ];

        let light = filter_images_matching(&blocks, ColorScheme::Light);
        assert_eq!(light.len(), 1, "the image-only paragraph should be dropped");
        assert!(light[0].has_inline_image());

        let dark = filter_images_matching(&blocks, ColorScheme::Dark);
        assert_eq!(dark.len(), 2);
        assert!(dark[0].has_inline_image());
        assert!(!dark[1].has_inline_image());
    }

    #[test]
    fn plain_text_flattens_nested_inlines() {
        let node = InlineNode::Strong(vec![
            InlineNode::Text("a".to_string()),
            InlineNode::SoftBreak,
            InlineNode::Emphasis(vec![InlineNode::Code("b".to_string())]),
        ]);
        assert_eq!(node.plain_text(), "a b");
    }
}
