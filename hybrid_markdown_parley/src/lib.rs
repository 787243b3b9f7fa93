// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parley backend for [`hybrid_markdown`].
//!
//! [`ParleyEngine`] lowers each paragraph of a [`StyledString`] into Parley builder calls and
//! reports line and cluster geometry back through [`ParagraphLayout`]. Paragraph styles (indents,
//! list marker tab stops, spacing) are applied by [`hybrid_markdown::stack_paragraphs`]; Parley
//! only sees the text of one paragraph at a time.
//!
//! Every call to [`TextEngine::layout`] creates its own [`LayoutContext`]. Only the
//! [`FontContext`] is shared between calls.
//!
//! ## Scope
//!
//! Backgrounds are not drawn by Parley. Hosts paint [`ConcreteAttributes::background`] themselves
//! from the cluster geometry, or leave inline code backgrounds to the decoration overlay.
//!
//! ## Example
//!
//! ```no_run
//! use hybrid_markdown::{ConcreteAttributes, LayoutConstraint, ResolvedFont, StyledString};
//! use hybrid_markdown::{TextEngine, TextLayout};
//! use hybrid_markdown_parley::ParleyEngine;
//! use peniko::color::Rgba8;
//!
//! let mut engine = ParleyEngine::new();
//! let attrs = ConcreteAttributes::plain(ResolvedFont::default(), Rgba8::from_u8_array([0, 0, 0, 0]));
//! let styled = StyledString::from_text("Hello\nworld", attrs);
//! let layout = engine.layout(&styled, LayoutConstraint::wrapping(320.0));
//! assert_eq!(layout.fragments().len(), 2);
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
#![no_std]

extern crate alloc;

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use hashbrown::HashMap;
use hybrid_markdown::{
    ConcreteAttributes, FontSystem, LayoutConstraint, LineBox, ParagraphLayout, ParagraphSource,
    ResolvedFamily, ResolvedFont, StackedLayout, StyledString, TextEngine, stack_paragraphs,
};
use log::trace;
use parley::style::{
    FontFamily, FontSettings, FontStack, FontStyle, FontWeight, GenericFamily, LineHeight,
    StyleProperty,
};
use parley::{
    Alignment, AlignmentOptions, FontContext, Layout, LayoutContext, PositionedLayoutItem,
    RangedBuilder,
};
use peniko::color::Rgba8;

#[cfg(test)]
mod tests;

const DISPLAY_SCALE: f32 = 1.0;
const QUANTIZE: bool = true;

/// The brush of laid out glyphs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorBrush {
    /// The text colour.
    pub color: Rgba8,
}

impl Default for ColorBrush {
    fn default() -> Self {
        Self {
            color: Rgba8 {
                r: 0,
                g: 0,
                b: 0,
                a: 255,
            },
        }
    }
}

/// A [`TextEngine`] backed by Parley.
pub struct ParleyEngine {
    font_cx: FontContext,
    families: HashMap<String, bool>,
}

impl core::fmt::Debug for ParleyEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyEngine")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl Default for ParleyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyEngine {
    /// Creates an engine with a new font context.
    pub fn new() -> Self {
        Self::with_font_context(FontContext::new())
    }

    /// Creates an engine using `font_cx`, for example one with registered fonts.
    pub fn with_font_context(font_cx: FontContext) -> Self {
        Self {
            font_cx,
            families: HashMap::new(),
        }
    }

    /// The font context.
    pub fn font_context_mut(&mut self) -> &mut FontContext {
        // Fonts registered through here may change which families exist.
        self.families.clear();
        &mut self.font_cx
    }
}

impl FontSystem for ParleyEngine {
    fn has_family(&mut self, name: &str) -> bool {
        if let Some(&known) = self.families.get(name) {
            return known;
        }
        let known = self.font_cx.collection.family_by_name(name).is_some();
        trace!("font family {name:?} available: {known}");
        self.families.insert(name.into(), known);
        known
    }

    fn text_width(&mut self, text: &str, font: &ResolvedFont) -> f32 {
        let mut layout_cx = LayoutContext::new();
        let mut builder =
            layout_cx.ranged_builder(&mut self.font_cx, text, DISPLAY_SCALE, QUANTIZE);
        push_font_defaults(&mut builder, font);
        let mut layout: Layout<ColorBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout.width()
    }
}

impl TextEngine for ParleyEngine {
    type Paragraph = ParleyParagraph;

    fn layout(
        &mut self,
        styled: &StyledString,
        constraint: LayoutConstraint,
    ) -> StackedLayout<ParleyParagraph> {
        let mut layout_cx = LayoutContext::new();
        let font_cx = &mut self.font_cx;
        stack_paragraphs(styled, constraint, |source, max_width| {
            ParleyParagraph::build(&mut layout_cx, font_cx, &source, max_width)
        })
    }
}

#[derive(Clone, Debug)]
struct ClusterExtent {
    text_range: Range<usize>,
    x0: f64,
    x1: f64,
}

/// One paragraph laid out by Parley.
#[derive(Clone)]
pub struct ParleyParagraph {
    layout: Layout<ColorBrush>,
    lines: Vec<LineBox>,
    clusters: Vec<Vec<ClusterExtent>>,
}

impl core::fmt::Debug for ParleyParagraph {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParleyParagraph")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl ParleyParagraph {
    fn build(
        layout_cx: &mut LayoutContext<ColorBrush>,
        font_cx: &mut FontContext,
        source: &ParagraphSource<'_>,
        max_width: Option<f32>,
    ) -> Self {
        let text = source.text();
        let style = source.paragraph_style();
        let mut builder = layout_cx.ranged_builder(font_cx, text, DISPLAY_SCALE, QUANTIZE);
        // The leading attributes also size empty paragraphs.
        if let Some(leading) = source.leading_attributes() {
            push_font_defaults(&mut builder, &leading.font);
            builder.push_default(StyleProperty::Brush(ColorBrush {
                color: leading.color,
            }));
        }
        if let Some(multiple) = style.line_height_multiple {
            builder.push_default(StyleProperty::LineHeight(LineHeight::MetricsRelative(
                multiple,
            )));
        }
        for (range, attrs) in source.runs() {
            push_run(&mut builder, attrs, range);
        }

        let mut layout: Layout<ColorBrush> = builder.build(text);
        layout.break_all_lines(max_width);
        layout.align(max_width, Alignment::Start, AlignmentOptions::default());

        let mut lines = Vec::new();
        let mut clusters = Vec::new();
        for line in layout.lines() {
            let metrics = line.metrics();
            lines.push(LineBox {
                text_range: line.text_range(),
                y0: f64::from(metrics.min_coord),
                y1: f64::from(metrics.max_coord),
                width: f64::from(metrics.advance - metrics.trailing_whitespace),
            });
            let mut extents = Vec::new();
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                for cluster in glyph_run.run().visual_clusters() {
                    let advance = cluster.advance();
                    extents.push(ClusterExtent {
                        text_range: cluster.text_range(),
                        x0: f64::from(x),
                        x1: f64::from(x + advance),
                    });
                    x += advance;
                }
            }
            clusters.push(extents);
        }
        Self {
            layout,
            lines,
            clusters,
        }
    }

    /// The Parley layout, for drawing.
    pub fn layout(&self) -> &Layout<ColorBrush> {
        &self.layout
    }
}

impl ParagraphLayout for ParleyParagraph {
    fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    fn range_extent(&self, line: usize, range: Range<usize>) -> Option<(f64, f64)> {
        self.clusters
            .get(line)?
            .iter()
            .filter(|cluster| {
                cluster.text_range.start < range.end && range.start < cluster.text_range.end
            })
            .fold(None, |extent, cluster| match extent {
                None => Some((cluster.x0, cluster.x1)),
                Some((x0, x1)) => Some((f64::min(x0, cluster.x0), f64::max(x1, cluster.x1))),
            })
    }
}

fn font_stack(family: &ResolvedFamily) -> FontStack<'_> {
    FontStack::Single(match family {
        ResolvedFamily::System => FontFamily::Generic(GenericFamily::SystemUi),
        ResolvedFamily::Monospace => FontFamily::Generic(GenericFamily::Monospace),
        ResolvedFamily::Named(name) => FontFamily::Named(Cow::Borrowed(name.as_str())),
    })
}

fn font_style(font: &ResolvedFont) -> FontStyle {
    if font.italic {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    }
}

fn push_font_defaults(builder: &mut RangedBuilder<'_, ColorBrush>, font: &ResolvedFont) {
    builder.push_default(StyleProperty::FontStack(font_stack(&font.family)));
    builder.push_default(StyleProperty::FontSize(font.size));
    builder.push_default(StyleProperty::FontWeight(FontWeight::new(f32::from(
        font.weight,
    ))));
    builder.push_default(StyleProperty::FontStyle(font_style(font)));
    if font.small_caps {
        builder.push_default(StyleProperty::FontFeatures(FontSettings::Source(
            Cow::Borrowed("\"smcp\" on"),
        )));
    }
}

fn push_run(
    builder: &mut RangedBuilder<'_, ColorBrush>,
    attrs: &ConcreteAttributes,
    range: Range<usize>,
) {
    let font = &attrs.font;
    builder.push(
        StyleProperty::FontStack(font_stack(&font.family)),
        range.clone(),
    );
    builder.push(StyleProperty::FontSize(font.size), range.clone());
    builder.push(
        StyleProperty::FontWeight(FontWeight::new(f32::from(font.weight))),
        range.clone(),
    );
    builder.push(StyleProperty::FontStyle(font_style(font)), range.clone());
    if font.small_caps {
        builder.push(
            StyleProperty::FontFeatures(FontSettings::Source(Cow::Borrowed("\"smcp\" on"))),
            range.clone(),
        );
    }
    builder.push(
        StyleProperty::Brush(ColorBrush { color: attrs.color }),
        range.clone(),
    );
    builder.push(StyleProperty::Underline(attrs.underline), range.clone());
    builder.push(
        StyleProperty::Strikethrough(attrs.strikethrough),
        range.clone(),
    );
    if let Some(kerning) = attrs.kerning {
        builder.push(StyleProperty::LetterSpacing(kerning), range);
    }
}
