// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening a text run's block tree into one piece of semantic rich text.
//!
//! The walk is explicit recursion over the (acyclic) block tree. Every block appends to a
//! [`RichText`] accumulator; block quotes render their children into a fresh accumulator first so
//! that the quote level can be raised on exactly the quoted runs.
//!
//! Layout of the produced text:
//! - sibling blocks are separated by `"\n\n"` carrying the base attributes
//! - each list item starts with a marker followed by `'\t'`, both tagged as a list marker
//! - tight list items are separated by `"\n"`, loose ones by `"\n\n"`
//! - a thematic break is a single zero-width space tagged as a thematic break

use alloc::format;
use alloc::string::String;
use log::trace;
use url::Url;

use crate::{
    Attribute, AttributeSet, BlockNode, HeadingMetricsTable, InlineNode, RenderEnvironment,
    RichText, SoftBreakMode, TextTheme,
};

/// The zero-width anchor emitted for a thematic break.
pub const THEMATIC_BREAK_ANCHOR: &str = "\u{200B}";

/// The glyph used as the marker of bulleted list items.
pub const BULLET: &str = "\u{2022}";

/// Everything the flattener reads.
#[derive(Clone, Debug)]
pub struct FlattenContext<'a> {
    /// Attributes of unstyled text.
    pub base: AttributeSet,
    /// Inline style overrides.
    pub theme: &'a TextTheme,
    /// Heading typography.
    pub headings: &'a HeadingMetricsTable,
    /// How soft breaks render.
    pub soft_break: SoftBreakMode,
    /// Base URL for relative link destinations.
    pub base_url: Option<&'a str>,
    /// Base URL for relative image sources.
    pub image_base_url: Option<&'a str>,
}

impl<'a> FlattenContext<'a> {
    /// Creates a context reading from `env`.
    pub fn new(env: &'a RenderEnvironment) -> Self {
        Self {
            base: env.theme.base_attributes(&env.text_style),
            theme: &env.theme,
            headings: &env.config.heading_metrics,
            soft_break: env.soft_break,
            base_url: env.base_url.as_deref(),
            image_base_url: env.image_base_url(),
        }
    }
}

/// Flattens `blocks` into semantic rich text.
pub fn flatten(blocks: &[BlockNode], cx: &FlattenContext<'_>) -> RichText {
    let mut out = RichText::new();
    render_blocks(blocks, 0, cx, &mut out);
    debug_assert!(out.is_partition(), "flattened runs must tile the text");
    out
}

fn render_blocks(blocks: &[BlockNode], indent: u8, cx: &FlattenContext<'_>, out: &mut RichText) {
    for (ix, block) in blocks.iter().enumerate() {
        render_block(block, indent, cx, out);
        if ix + 1 < blocks.len() {
            out.push_str("\n\n", cx.base.clone());
        }
    }
}

fn render_block(block: &BlockNode, indent: u8, cx: &FlattenContext<'_>, out: &mut RichText) {
    match block {
        BlockNode::Paragraph(inlines) => {
            let attrs = indented(&cx.base, indent);
            render_inlines(inlines, &attrs, cx, out);
        }
        BlockNode::Heading { level, content } => {
            let metrics = cx.headings.metrics(*level);
            let mut attrs = indented(&cx.base, indent);
            metrics.text_style().collect_into(&mut attrs);
            if let Some(before) = metrics.spacing_before {
                attrs.apply(Attribute::ParagraphSpacingBefore(before));
            }
            if let Some(after) = metrics.spacing_after {
                attrs.apply(Attribute::ParagraphSpacingAfter(after));
            }
            attrs.apply(Attribute::HeadingLevel(*level));
            render_inlines(content, &attrs, cx, out);
        }
        BlockNode::Blockquote(children) => {
            let level = indent.saturating_add(1);
            let mut quoted = RichText::new();
            render_blocks(children, level, cx, &mut quoted);
            // Never lower a level set by a deeper quote.
            quoted.update_all(|attrs| {
                if attrs.quote_level() < level {
                    attrs.apply(Attribute::QuoteLevel(level));
                }
            });
            out.append(quoted);
        }
        BlockNode::BulletedList { is_tight, items } => {
            render_list(
                items.iter().map(|item| (String::from(BULLET), &item.children[..])),
                *is_tight,
                indent,
                cx,
                out,
            );
        }
        BlockNode::NumberedList {
            is_tight,
            start,
            items,
        } => {
            render_list(
                items.iter().enumerate().map(|(offset, item)| {
                    let number = start.saturating_add(offset as u64);
                    (format!("{number}."), &item.children[..])
                }),
                *is_tight,
                indent,
                cx,
                out,
            );
        }
        BlockNode::TaskList { is_tight, items } => {
            render_list(
                items.iter().map(|item| {
                    let marker = if item.is_completed { "[x]" } else { "[ ]" };
                    (String::from(marker), &item.children[..])
                }),
                *is_tight,
                indent,
                cx,
                out,
            );
        }
        BlockNode::ThematicBreak => {
            let attrs = indented(&cx.base, indent).with(Attribute::ThematicBreak(true));
            out.push_str(THEMATIC_BREAK_ANCHOR, attrs);
        }
        BlockNode::CodeBlock { content, .. } => {
            // Only reachable inside list items; top-level code blocks are declarative.
            let mut attrs = indented(&cx.base, indent);
            cx.theme.code.collect_into(&mut attrs);
            out.push_str(content.strip_suffix('\n').unwrap_or(content.as_str()), attrs);
        }
        BlockNode::Table { .. } | BlockNode::HtmlBlock(_) => {
            trace!("skipping a block that cannot flow as text");
        }
    }
}

fn render_list<'b>(
    items: impl ExactSizeIterator<Item = (String, &'b [BlockNode])>,
    is_tight: bool,
    indent: u8,
    cx: &FlattenContext<'_>,
    out: &mut RichText,
) {
    let level = indent.saturating_add(1);
    let content = indented(&cx.base, level);
    let marker = content.clone().with(Attribute::ListItem(true));
    let separator = if is_tight { "\n" } else { "\n\n" };
    let count = items.len();

    for (ix, (label, children)) in items.enumerate() {
        out.push_str(&label, marker.clone());
        out.push_str("\t", marker.clone());

        let mut line_has_content = false;
        for child in children {
            match child {
                BlockNode::Paragraph(inlines) => {
                    if line_has_content {
                        out.push_str("\n", cx.base.clone());
                    }
                    render_inlines(inlines, &content, cx, out);
                }
                BlockNode::Table { .. } | BlockNode::HtmlBlock(_) => {
                    trace!("skipping a list item block that cannot flow as text");
                    continue;
                }
                _ => {
                    out.push_str("\n", cx.base.clone());
                    render_block(child, level, cx, out);
                }
            }
            line_has_content = true;
        }

        if ix + 1 < count {
            out.push_str(separator, cx.base.clone());
        }
    }
}

fn render_inlines(
    inlines: &[InlineNode],
    attrs: &AttributeSet,
    cx: &FlattenContext<'_>,
    out: &mut RichText,
) {
    for inline in inlines {
        render_inline(inline, attrs, cx, out);
    }
}

fn render_inline(
    inline: &InlineNode,
    attrs: &AttributeSet,
    cx: &FlattenContext<'_>,
    out: &mut RichText,
) {
    match inline {
        InlineNode::Text(text) | InlineNode::Html(text) => out.push_str(text, attrs.clone()),
        InlineNode::SoftBreak => {
            let text = match cx.soft_break {
                SoftBreakMode::Space => " ",
                SoftBreakMode::LineBreak => "\n",
            };
            out.push_str(text, attrs.clone());
        }
        InlineNode::LineBreak => out.push_str("\n", attrs.clone()),
        InlineNode::Code(code) => {
            let attrs = cx
                .theme
                .code
                .applied_to(attrs)
                .with(Attribute::InlineCode(true));
            out.push_str(code, attrs);
        }
        InlineNode::Emphasis(children) => {
            render_inlines(children, &cx.theme.emphasis.applied_to(attrs), cx, out);
        }
        InlineNode::Strong(children) => {
            render_inlines(children, &cx.theme.strong.applied_to(attrs), cx, out);
        }
        InlineNode::Strikethrough(children) => {
            render_inlines(children, &cx.theme.strikethrough.applied_to(attrs), cx, out);
        }
        InlineNode::Link {
            destination,
            children,
        } => {
            let attrs = cx
                .theme
                .link
                .applied_to(attrs)
                .with(Attribute::Link(resolve_url(destination, cx.base_url)));
            render_inlines(children, &attrs, cx, out);
        }
        // Images inside a text run fall back to their alternative text, linked to the image.
        InlineNode::Image { source, children } => {
            if source.is_empty() {
                render_inlines(children, attrs, cx, out);
            } else {
                let link = resolve_url(source, cx.image_base_url);
                render_inlines(children, &attrs.clone().with(Attribute::Link(link)), cx, out);
            }
        }
    }
}

fn indented(base: &AttributeSet, indent: u8) -> AttributeSet {
    if indent > 0 {
        base.clone().with(Attribute::IndentLevel(indent))
    } else {
        base.clone()
    }
}

/// Resolves a link destination against an optional base URL.
///
/// Resolution follows RFC 3986 through [`Url::join`]. Empty destinations, destinations without a
/// base, and destinations whose base does not parse as an absolute URL are returned unchanged.
pub fn resolve_url(destination: &str, base: Option<&str>) -> String {
    let Some(base) = base.filter(|_| !destination.is_empty()) else {
        return destination.into();
    };
    match Url::parse(base).and_then(|base| base.join(destination)) {
        Ok(url) => url.into(),
        Err(error) => {
            trace!("keeping {destination:?} unresolved against {base:?}: {error}");
            destination.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListItem, TaskListItem};
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    fn text(s: &str) -> InlineNode {
        InlineNode::Text(s.to_string())
    }

    fn paragraph(s: &str) -> BlockNode {
        BlockNode::Paragraph(vec![text(s)])
    }

    fn bulleted(is_tight: bool, items: &[&str]) -> BlockNode {
        BlockNode::BulletedList {
            is_tight,
            items: items
                .iter()
                .map(|s| ListItem::new(vec![paragraph(s)]))
                .collect(),
        }
    }

    fn flatten_default(blocks: &[BlockNode]) -> RichText {
        let env = RenderEnvironment::default();
        flatten(blocks, &FlattenContext::new(&env))
    }

    #[test]
    fn siblings_are_separated_by_blank_lines() {
        let out = flatten_default(&[paragraph("a"), paragraph("b"), paragraph("c")]);
        assert_eq!(out.as_str(), "a\n\nb\n\nc");
        assert_eq!(out.runs().len(), 1, "uniform attributes coalesce");
    }

    #[test]
    fn tight_and_loose_separators() {
        let tight = flatten_default(&[bulleted(true, &["a", "b", "c"])]);
        assert_eq!(tight.as_str(), "\u{2022}\ta\n\u{2022}\tb\n\u{2022}\tc");
        assert_eq!(tight.as_str().matches("\n\n").count(), 0);
        assert_eq!(tight.as_str().matches('\n').count(), 2);

        let loose = flatten_default(&[bulleted(false, &["a", "b", "c"])]);
        assert_eq!(loose.as_str().matches("\n\n").count(), 2);
        assert_eq!(loose.as_str().matches('\n').count(), 4);
    }

    #[test]
    fn list_markers_are_tagged() {
        let out = flatten_default(&[BlockNode::NumberedList {
            is_tight: true,
            start: 9,
            items: vec![
                ListItem::new(vec![paragraph("nine")]),
                ListItem::new(vec![paragraph("ten")]),
            ],
        }]);
        assert_eq!(out.as_str(), "9.\tnine\n10.\tten");
        let markers = out.ranges_where(|attrs| attrs.list_item);
        assert_eq!(markers[0], (0..3, true));
        let ten = out.as_str().find("10.").unwrap();
        assert_eq!(out.attributes_at(ten).unwrap().indent_level(), 1);
        assert!(out.attributes_at(ten).unwrap().is_list_item());
        assert!(!out.attributes_at(ten + 4).unwrap().is_list_item());
    }

    #[test]
    fn task_list_markers() {
        let out = flatten_default(&[BlockNode::TaskList {
            is_tight: true,
            items: vec![
                TaskListItem {
                    is_completed: true,
                    children: vec![paragraph("done")],
                },
                TaskListItem {
                    is_completed: false,
                    children: vec![paragraph("todo")],
                },
            ],
        }]);
        assert_eq!(out.as_str(), "[x]\tdone\n[ ]\ttodo");
    }

    #[test]
    fn nested_lists_start_on_a_new_line() {
        let out = flatten_default(&[BlockNode::BulletedList {
            is_tight: true,
            items: vec![ListItem::new(vec![
                paragraph("outer"),
                bulleted(true, &["inner"]),
            ])],
        }]);
        assert_eq!(out.as_str(), "\u{2022}\touter\n\u{2022}\tinner");
        let inner = out.as_str().rfind("inner").unwrap();
        assert_eq!(out.attributes_at(inner).unwrap().indent_level(), 2);
    }

    #[test]
    fn nested_quotes_accumulate_levels() {
        let blocks = [BlockNode::Blockquote(vec![
            paragraph("outer"),
            BlockNode::Blockquote(vec![paragraph("inner")]),
        ])];
        let out = flatten_default(&blocks);
        assert_eq!(out.as_str(), "outer\n\ninner");
        let levels: Vec<u8> = out
            .as_str()
            .char_indices()
            .map(|(ix, _)| out.attributes_at(ix).unwrap().quote_level())
            .collect();
        assert!(levels[..5].iter().all(|&l| l == 1), "{levels:?}");
        assert!(levels[7..].iter().all(|&l| l == 2), "{levels:?}");
        assert!(out.is_partition());
    }

    #[test]
    fn headings_carry_level_and_metrics() {
        let out = flatten_default(&[BlockNode::Heading {
            level: 2,
            content: vec![text("Title")],
        }]);
        let attrs = out.attributes_at(0).unwrap();
        assert_eq!(attrs.heading_level(), 2);
        let font = attrs.font_or_default();
        assert_eq!(font.scale, 1.5);
        assert_eq!(font.weight, crate::FontWeight::Semibold);
    }

    #[test]
    fn thematic_break_is_a_zero_width_anchor() {
        let out = flatten_default(&[paragraph("a"), BlockNode::ThematicBreak, paragraph("b")]);
        assert_eq!(out.as_str(), "a\n\n\u{200B}\n\nb");
        let anchors = out.ranges_where(|attrs| attrs.thematic_break);
        assert_eq!(anchors, [(3..6, true)]);
    }

    #[test]
    fn inline_code_and_links() {
        let env = RenderEnvironment {
            base_url: Some("https://example.com/docs/index.md".to_string()),
            ..RenderEnvironment::default()
        };
        let blocks = [BlockNode::Paragraph(vec![
            text("run "),
            InlineNode::Code("cargo".to_string()),
            InlineNode::SoftBreak,
            InlineNode::Link {
                destination: "guide.md".to_string(),
                children: vec![text("guide")],
            },
        ])];
        let out = flatten(&blocks, &FlattenContext::new(&env));
        assert_eq!(out.as_str(), "run cargo guide");
        let code = out.attributes_at(4).unwrap();
        assert!(code.is_inline_code());
        assert!(code.background_color.is_some());
        let link = out.attributes_at(10).unwrap();
        assert_eq!(
            link.link.as_deref(),
            Some("https://example.com/docs/guide.md")
        );
    }

    #[test]
    fn soft_breaks_follow_mode() {
        let env = RenderEnvironment {
            soft_break: SoftBreakMode::LineBreak,
            ..RenderEnvironment::default()
        };
        let blocks = [BlockNode::Paragraph(vec![
            text("a"),
            InlineNode::SoftBreak,
            text("b"),
        ])];
        assert_eq!(flatten(&blocks, &FlattenContext::new(&env)).as_str(), "a\nb");
    }

    #[test]
    fn url_resolution() {
        let base = Some("https://example.com/a/b.md");
        assert_eq!(resolve_url("c.md", base), "https://example.com/a/c.md");
        assert_eq!(resolve_url("./c.md", base), "https://example.com/a/c.md");
        assert_eq!(resolve_url("/c.md", base), "https://example.com/c.md");
        assert_eq!(resolve_url("#top", base), "https://example.com/a/b.md#top");
        assert_eq!(resolve_url("//cdn.example.com/x", base), "https://cdn.example.com/x");
        assert_eq!(resolve_url("mailto:me@example.com", base), "mailto:me@example.com");
        assert_eq!(resolve_url("c.md", None), "c.md");
        assert_eq!(resolve_url("c.md", Some("https://example.com")), "https://example.com/c.md");
        assert_eq!(resolve_url("", base), "");
    }

    #[test]
    fn url_resolution_follows_rfc_3986() {
        let base = Some("https://e.com/a/b.md");
        assert_eq!(resolve_url("../c.md", base), "https://e.com/c.md");
        assert_eq!(resolve_url("../../../c.md", base), "https://e.com/c.md");
        assert_eq!(
            resolve_url("c.md", Some("https://e.com/a/b.md?p=x/y")),
            "https://e.com/a/c.md",
            "slashes in the query are not directories"
        );
        assert_eq!(
            resolve_url("?q=1", Some("https://e.com/a.md#x")),
            "https://e.com/a.md?q=1"
        );
        assert_eq!(
            resolve_url("#top", Some("https://e.com/a.md?q=1#x")),
            "https://e.com/a.md?q=1#top"
        );
    }

    #[test]
    fn url_resolution_keeps_destinations_with_unusable_bases() {
        assert_eq!(resolve_url("c.md", Some("docs/")), "c.md");
        assert_eq!(resolve_url("c.md", Some("")), "c.md");
    }

    #[test]
    fn images_in_text_link_alt_text_to_the_source() {
        let env = RenderEnvironment {
            base_url: Some("https://example.com/docs/".to_string()),
            image_base_url: Some("https://cdn.example.com/img/".to_string()),
            ..RenderEnvironment::default()
        };
        let blocks = [BlockNode::Paragraph(vec![
            InlineNode::Image {
                source: "logo.png".to_string(),
                children: vec![text("logo")],
            },
            text(" and "),
            InlineNode::Link {
                destination: "page.md".to_string(),
                children: vec![text("page")],
            },
        ])];
        let rich = flatten(&blocks, &FlattenContext::new(&env));
        let link_at = |needle: &str| {
            let ix = rich.as_str().find(needle).unwrap();
            rich.attributes_at(ix).unwrap().link.clone()
        };
        assert_eq!(rich.as_str(), "logo and page");
        assert_eq!(
            link_at("logo").as_deref(),
            Some("https://cdn.example.com/img/logo.png")
        );
        assert_eq!(link_at("and"), None);
        assert_eq!(
            link_at("page").as_deref(),
            Some("https://example.com/docs/page.md")
        );

        let fallback = RenderEnvironment {
            base_url: Some("https://example.com/docs/".to_string()),
            ..RenderEnvironment::default()
        };
        let rich = flatten(&blocks, &FlattenContext::new(&fallback));
        let ix = rich.as_str().find("logo").unwrap();
        assert_eq!(
            rich.attributes_at(ix).unwrap().link.as_deref(),
            Some("https://example.com/docs/logo.png")
        );
    }
}
