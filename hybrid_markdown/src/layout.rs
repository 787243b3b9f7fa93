// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract with the native text engine and the layout geometry read by the overlay.
//!
//! An engine lays out one paragraph at a time ([`ParagraphLayout`]); [`stack_paragraphs`] applies
//! paragraph styles and stacks the paragraphs of a [`StyledString`] from top to bottom. Each
//! stacked paragraph becomes one [`LayoutFragment`].

use alloc::vec::Vec;
use core::ops::Range;

use peniko::kurbo::Rect;

use crate::{ConcreteAttributes, LineBreakMode, ParagraphStyle, ResolvedFont, StyledString};

/// Font queries answered by the text engine.
pub trait FontSystem {
    /// Returns `true` if a family named `name` is installed.
    fn has_family(&mut self, name: &str) -> bool;

    /// The advance width of `text` set in `font`, on a single line.
    fn text_width(&mut self, text: &str, font: &ResolvedFont) -> f32;
}

/// A text engine able to lay out styled strings.
///
/// Every call to [`TextEngine::layout`] builds its own layout state; nothing is shared between
/// calls except font data.
pub trait TextEngine: FontSystem {
    /// The per-paragraph layout produced by this engine.
    type Paragraph: ParagraphLayout;

    /// Lays out `styled` under `constraint`.
    fn layout(
        &mut self,
        styled: &StyledString,
        constraint: LayoutConstraint,
    ) -> StackedLayout<Self::Paragraph>;
}

/// The space available to a layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConstraint {
    /// Maximum line width, or `None` for unbounded lines.
    pub max_width: Option<f32>,
    /// How lines that do not fit are handled.
    pub line_break: LineBreakMode,
}

impl LayoutConstraint {
    /// Lines wrap at `width`.
    pub fn wrapping(width: f32) -> Self {
        Self {
            max_width: Some(width),
            line_break: LineBreakMode::WordWrap,
        }
    }

    /// Lines never wrap.
    pub fn unbounded() -> Self {
        Self {
            max_width: None,
            line_break: LineBreakMode::Clip,
        }
    }

    /// Lines are clipped at `width` instead of wrapping.
    pub fn clipping(width: f32) -> Self {
        Self {
            max_width: Some(width),
            line_break: LineBreakMode::Clip,
        }
    }
}

/// One line of a paragraph layout, in paragraph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBox {
    /// Byte range of the line, relative to the paragraph text.
    pub text_range: Range<usize>,
    /// Top of the line box.
    pub y0: f64,
    /// Bottom of the line box.
    pub y1: f64,
    /// Advance width of the line, excluding trailing whitespace.
    pub width: f64,
}

/// A laid out paragraph.
pub trait ParagraphLayout {
    /// The line boxes, top to bottom.
    fn lines(&self) -> &[LineBox];

    /// The horizontal extent `(x0, x1)` of the paragraph-relative byte `range` on line `line`,
    /// or `None` if the range has no glyphs on that line.
    fn range_extent(&self, line: usize, range: Range<usize>) -> Option<(f64, f64)>;
}

/// The text of one paragraph handed to an engine.
#[derive(Clone, Debug)]
pub struct ParagraphSource<'a> {
    styled: &'a StyledString,
    range: Range<usize>,
}

impl<'a> ParagraphSource<'a> {
    /// The paragraph text, without its terminating newline.
    pub fn text(&self) -> &'a str {
        &self.styled.as_str()[self.range.clone()]
    }

    /// The byte range of the paragraph within the styled string.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The runs of the paragraph, with ranges relative to [`ParagraphSource::text`].
    pub fn runs(&self) -> impl Iterator<Item = (Range<usize>, &'a ConcreteAttributes)> + 'a {
        let range = self.range.clone();
        self.styled.runs().iter().filter_map(move |run| {
            let start = run.range.start.max(range.start);
            let end = run.range.end.min(range.end);
            (start < end).then(|| (start - range.start..end - range.start, &run.attributes))
        })
    }

    /// Attributes governing the paragraph as a whole, including empty paragraphs.
    pub fn leading_attributes(&self) -> Option<&'a ConcreteAttributes> {
        self.styled
            .attributes_at(self.range.start)
            .or_else(|| self.styled.attributes_at(self.range.start.checked_sub(1)?))
    }

    /// The paragraph style, or the defaults.
    pub fn paragraph_style(&self) -> ParagraphStyle {
        self.leading_attributes()
            .and_then(|attrs| attrs.paragraph.clone())
            .unwrap_or_default()
    }

    fn sub(&self, range: Range<usize>) -> Self {
        Self {
            styled: self.styled,
            range,
        }
    }
}

/// One stacked paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutFragment {
    /// Byte range of the paragraph, including its terminating newline.
    pub text_range: Range<usize>,
    /// The frame of the paragraph, including paragraph spacing.
    pub frame: Rect,
}

/// Geometry of a laid out styled string.
pub trait TextLayout {
    /// The paragraph fragments, in document order.
    fn fragments(&self) -> &[LayoutFragment];

    /// One rectangle per visual line segment covered by `range`.
    fn selection_rects(&self, range: Range<usize>) -> Vec<Rect>;

    /// The bottom of the lowest fragment.
    fn height(&self) -> f64 {
        self.fragments()
            .iter()
            .fold(0.0, |height, fragment| height.max(fragment.frame.y1))
    }

    /// The width of the widest fragment.
    fn max_fragment_width(&self) -> f64 {
        self.fragments()
            .iter()
            .fold(0.0, |width, fragment| width.max(fragment.frame.width()))
    }
}

#[derive(Clone, Debug)]
struct Piece<P> {
    layout: P,
    text_offset: usize,
    x: f64,
    y: f64,
    line_spacing: f64,
}

impl<P: ParagraphLayout> Piece<P> {
    fn line_rect(&self, ix: usize, line: &LineBox, x0: f64, x1: f64) -> Rect {
        let shift = self.y + self.line_spacing * ix as f64;
        Rect::new(self.x + x0, shift + line.y0, self.x + x1, shift + line.y1)
    }

    fn bounds(&self) -> Option<Rect> {
        self.layout
            .lines()
            .iter()
            .enumerate()
            .map(|(ix, line)| self.line_rect(ix, line, 0.0, line.width))
            .reduce(|a, b| a.union(b))
    }
}

/// Paragraph layouts stacked into one text layout.
#[derive(Clone, Debug)]
pub struct StackedLayout<P> {
    pieces: Vec<Piece<P>>,
    fragments: Vec<LayoutFragment>,
}

impl<P> Default for StackedLayout<P> {
    fn default() -> Self {
        Self {
            pieces: Vec::new(),
            fragments: Vec::new(),
        }
    }
}

impl<P: ParagraphLayout> StackedLayout<P> {
    /// The paragraph layouts with their text offsets and origins.
    pub fn paragraphs(&self) -> impl Iterator<Item = (&P, usize, (f64, f64))> + '_ {
        self.pieces
            .iter()
            .map(|piece| (&piece.layout, piece.text_offset, (piece.x, piece.y)))
    }
}

impl<P: ParagraphLayout> TextLayout for StackedLayout<P> {
    fn fragments(&self) -> &[LayoutFragment] {
        &self.fragments
    }

    fn selection_rects(&self, range: Range<usize>) -> Vec<Rect> {
        let mut rects = Vec::new();
        for piece in &self.pieces {
            for (ix, line) in piece.layout.lines().iter().enumerate() {
                let line_start = piece.text_offset + line.text_range.start;
                let line_end = piece.text_offset + line.text_range.end;
                let start = range.start.max(line_start);
                let end = range.end.min(line_end);
                if start >= end {
                    continue;
                }
                let local = start - piece.text_offset..end - piece.text_offset;
                if let Some((x0, x1)) = piece.layout.range_extent(ix, local) {
                    let rect = piece.line_rect(ix, line, x0, x1);
                    if !rect.is_zero_area() {
                        rects.push(rect);
                    }
                }
            }
        }
        rects
    }
}

/// Splits `styled` into paragraphs at `'\n'`, lays each out with `build`, and stacks them.
///
/// `build` receives the paragraph text and the maximum line width, or `None` when lines must not
/// wrap. Paragraph styles are applied here:
/// - the paragraph is indented by its head indent and spaced by its spacing before and after
/// - the line spacing is added between consecutive lines
/// - when the paragraph has a tab stop, the text before the first tab is placed at the first line
///   indent and the rest at the tab stop, top-aligned
pub fn stack_paragraphs<P, B>(
    styled: &StyledString,
    constraint: LayoutConstraint,
    mut build: B,
) -> StackedLayout<P>
where
    P: ParagraphLayout,
    B: FnMut(ParagraphSource<'_>, Option<f32>) -> P,
{
    let mut stacked = StackedLayout::default();
    if styled.is_empty() {
        return stacked;
    }
    let text = styled.as_str();
    let mut y = 0.0;
    let mut start = 0;
    loop {
        let end = text[start..].find('\n').map_or(text.len(), |ix| start + ix);
        let source = ParagraphSource {
            styled,
            range: start..end,
        };
        let style = source.paragraph_style();
        let clip = constraint.line_break == LineBreakMode::Clip
            || style.line_break == LineBreakMode::Clip;
        let width_at = |indent: f32| match constraint.max_width {
            Some(width) if !clip => Some((width - indent).max(1.0)),
            _ => None,
        };

        let top = y + f64::from(style.spacing_before);
        let first = stacked.pieces.len();
        let tab = source.text().find('\t').filter(|_| !style.tab_stops.is_empty());
        match (tab, style.tab_stops.first()) {
            (Some(tab), Some(&stop)) => {
                let marker = source.sub(start..start + tab);
                let body = source.sub(start + tab + 1..end);
                stacked.pieces.push(Piece {
                    layout: build(marker, None),
                    text_offset: start,
                    x: f64::from(style.first_line_head_indent),
                    y: top,
                    line_spacing: f64::from(style.line_spacing),
                });
                stacked.pieces.push(Piece {
                    layout: build(body, width_at(stop)),
                    text_offset: start + tab + 1,
                    x: f64::from(stop),
                    y: top,
                    line_spacing: f64::from(style.line_spacing),
                });
            }
            _ => {
                stacked.pieces.push(Piece {
                    layout: build(source.clone(), width_at(style.head_indent)),
                    text_offset: start,
                    x: f64::from(style.head_indent),
                    y: top,
                    line_spacing: f64::from(style.line_spacing),
                });
            }
        }

        let bounds = stacked.pieces[first..]
            .iter()
            .filter_map(Piece::bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::new(0.0, top, 0.0, top));
        let bottom = bounds.y1 + f64::from(style.spacing_after);
        stacked.fragments.push(LayoutFragment {
            text_range: start..(end + 1).min(text.len()),
            frame: Rect::new(bounds.x0, y, bounds.x1, bottom),
        });
        y = bottom;

        if end >= text.len() {
            break;
        }
        start = end + 1;
    }
    stacked
}
