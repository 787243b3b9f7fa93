// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic text engine for tests.
//!
//! Every character advances by `0.6 ×` its font size (zero-width spaces advance by nothing) and
//! every line is `1.2 ×` the largest font size on it, scaled by the paragraph's line height
//! multiple. Lines wrap greedily after spaces. The engine counts layout and measurement calls so
//! tests can observe caching.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::{
    FontSystem, LayoutConstraint, LineBox, ParagraphLayout, ParagraphSource, ResolvedFont,
    StackedLayout, StyledString, TextEngine, stack_paragraphs,
};

/// Advance of one character, as a fraction of the font size.
pub const ADVANCE: f32 = 0.6;

/// Line height, as a fraction of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

/// A text engine with fixed-pitch metrics.
#[derive(Clone, Debug, Default)]
pub struct MonospaceEngine {
    families: Vec<String>,
    layout_calls: usize,
    measure_calls: usize,
}

impl MonospaceEngine {
    /// Creates an engine that knows no named families.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an installed family.
    #[must_use]
    pub fn with_family(mut self, name: &str) -> Self {
        self.families.push(name.into());
        self
    }

    /// How many times [`TextEngine::layout`] ran.
    pub fn layout_calls(&self) -> usize {
        self.layout_calls
    }

    /// How many times [`FontSystem::text_width`] ran.
    pub fn measure_calls(&self) -> usize {
        self.measure_calls
    }
}

fn advance(ch: char, size: f32) -> f32 {
    match ch {
        '\u{200B}' => 0.0,
        _ => ADVANCE * size,
    }
}

impl FontSystem for MonospaceEngine {
    fn has_family(&mut self, name: &str) -> bool {
        self.families.iter().any(|family| family == name)
    }

    fn text_width(&mut self, text: &str, font: &ResolvedFont) -> f32 {
        self.measure_calls += 1;
        text.chars().map(|ch| advance(ch, font.size)).sum()
    }
}

impl TextEngine for MonospaceEngine {
    type Paragraph = MonospaceParagraph;

    fn layout(
        &mut self,
        styled: &StyledString,
        constraint: LayoutConstraint,
    ) -> StackedLayout<MonospaceParagraph> {
        self.layout_calls += 1;
        stack_paragraphs(styled, constraint, MonospaceParagraph::build)
    }
}

#[derive(Clone, Debug)]
struct Glyph {
    index: usize,
    x0: f64,
    x1: f64,
}

/// A paragraph laid out by [`MonospaceEngine`].
#[derive(Clone, Debug, Default)]
pub struct MonospaceParagraph {
    lines: Vec<LineBox>,
    glyphs: Vec<Vec<Glyph>>,
}

struct Char {
    index: usize,
    ch: char,
    advance: f32,
    size: f32,
}

impl MonospaceParagraph {
    fn build(source: ParagraphSource<'_>, max_width: Option<f32>) -> Self {
        let text = source.text();
        let fallback_size = source
            .leading_attributes()
            .map_or(crate::DEFAULT_FONT_SIZE, |attrs| attrs.font.size);
        let multiple = source
            .paragraph_style()
            .line_height_multiple
            .unwrap_or(1.0);

        let mut chars = Vec::new();
        for (range, attrs) in source.runs() {
            for (offset, ch) in text[range.clone()].char_indices() {
                chars.push(Char {
                    index: range.start + offset,
                    ch,
                    advance: advance(ch, attrs.font.size),
                    size: attrs.font.size,
                });
            }
        }

        let mut breaks: Vec<Range<usize>> = Vec::new();
        let mut line_start = 0;
        let mut x = 0.0;
        let mut last_space: Option<usize> = None;
        let mut ix = 0;
        while ix < chars.len() {
            let ch = &chars[ix];
            let overflows = max_width.is_some_and(|max| x + ch.advance > max);
            if overflows && ix > line_start && ch.ch != ' ' {
                let brk = last_space.map_or(ix, |space| space + 1);
                breaks.push(line_start..brk);
                line_start = brk;
                x = chars[brk..ix].iter().map(|c| c.advance).sum();
                last_space = (brk..ix).rev().find(|&i| chars[i].ch == ' ');
                continue;
            }
            if ch.ch == ' ' {
                last_space = Some(ix);
            }
            x += ch.advance;
            ix += 1;
        }
        breaks.push(line_start..chars.len());

        let mut paragraph = Self::default();
        let mut y = 0.0;
        for line in breaks {
            let line_chars = &chars[line.clone()];
            let size = line_chars
                .iter()
                .map(|c| c.size)
                .fold(None, |max: Option<f32>, size| Some(max.map_or(size, |m| m.max(size))))
                .unwrap_or(fallback_size);
            let height = f64::from(LINE_HEIGHT * size * multiple);

            let mut glyphs = Vec::with_capacity(line_chars.len());
            let mut pen = 0.0;
            let mut width = 0.0;
            for c in line_chars {
                let x1 = pen + f64::from(c.advance);
                glyphs.push(Glyph {
                    index: c.index,
                    x0: pen,
                    x1,
                });
                pen = x1;
                if c.ch != ' ' {
                    width = pen;
                }
            }
            let text_range = match (line_chars.first(), line_chars.last()) {
                (Some(first), Some(last)) => first.index..last.index + last.ch.len_utf8(),
                _ => text.len()..text.len(),
            };
            paragraph.lines.push(LineBox {
                text_range,
                y0: y,
                y1: y + height,
                width,
            });
            paragraph.glyphs.push(glyphs);
            y += height;
        }
        paragraph
    }
}

impl ParagraphLayout for MonospaceParagraph {
    fn lines(&self) -> &[LineBox] {
        &self.lines
    }

    fn range_extent(&self, line: usize, range: Range<usize>) -> Option<(f64, f64)> {
        let glyphs = self.glyphs.get(line)?;
        glyphs
            .iter()
            .filter(|glyph| range.contains(&glyph.index))
            .fold(None, |extent, glyph| match extent {
                None => Some((glyph.x0, glyph.x1)),
                Some((x0, x1)) => Some((f64::min(x0, glyph.x0), f64::max(x1, glyph.x1))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConcreteAttributes, TextLayout};
    use peniko::color::Rgba8;

    #[test]
    fn counts_calls() {
        let mut engine = MonospaceEngine::new();
        let font = ResolvedFont::monospace(10.0);
        assert_eq!(engine.text_width("abc", &font), 18.0);
        let attrs = ConcreteAttributes::plain(font, Rgba8::from_u8_array([0, 0, 0, 0]));
        let styled = StyledString::from_text("abc", attrs);
        let layout = engine.layout(&styled, LayoutConstraint::wrapping(100.0));
        assert_eq!(layout.fragments().len(), 1);
        assert_eq!(engine.layout_calls(), 1);
        assert_eq!(engine.measure_calls(), 1);
    }

    #[test]
    fn long_words_break_anywhere() {
        let font = ResolvedFont::monospace(10.0);
        let attrs = ConcreteAttributes::plain(font, Rgba8::from_u8_array([0, 0, 0, 0]));
        let styled = StyledString::from_text("abcdefghij", attrs);
        let layout = MonospaceEngine::new().layout(&styled, LayoutConstraint::wrapping(30.0));
        assert_eq!(layout.selection_rects(0..10).len(), 2);
        assert_eq!(layout.height(), 24.0);
    }
}
