// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// These tests do not depend on which system fonts are installed.

use alloc::string::ToString;

use hybrid_markdown::{
    ConcreteAttributes, FontSystem, LayoutConstraint, LineBreakMode, ParagraphLayout,
    ParagraphStyle, ResolvedFamily, ResolvedFont, StyledString, TextEngine, TextLayout,
};
use parley::style::{FontFamily, FontStack, GenericFamily};
use peniko::color::Rgba8;

use crate::{ColorBrush, ParleyEngine, font_stack};

fn plain() -> ConcreteAttributes {
    ConcreteAttributes::plain(ResolvedFont::default(), Rgba8::from_u8_array([0, 0, 0, 0]))
}

#[test]
fn resolved_families_map_to_font_stacks() {
    assert!(matches!(
        font_stack(&ResolvedFamily::Monospace),
        FontStack::Single(FontFamily::Generic(GenericFamily::Monospace))
    ));
    assert!(matches!(
        font_stack(&ResolvedFamily::System),
        FontStack::Single(FontFamily::Generic(GenericFamily::SystemUi))
    ));
    let named = ResolvedFamily::Named("Inter".to_string());
    assert!(matches!(
        font_stack(&named),
        FontStack::Single(FontFamily::Named(name)) if name == "Inter"
    ));
}

#[test]
fn default_brush_is_opaque_black() {
    assert_eq!(ColorBrush::default().color.a, 255);
}

#[test]
fn unknown_families_are_cached() {
    let mut engine = ParleyEngine::new();
    let name = "No Such Family 7f3a";
    assert!(!engine.has_family(name));
    assert!(!engine.has_family(name));
    assert_eq!(engine.families.len(), 1);
    engine.font_context_mut();
    assert!(engine.families.is_empty());
}

#[test]
fn empty_text_has_no_fragments() {
    let mut engine = ParleyEngine::new();
    let layout = engine.layout(&StyledString::new(), LayoutConstraint::wrapping(100.0));
    assert!(layout.fragments().is_empty());
}

#[test]
fn one_fragment_per_paragraph() {
    let mut engine = ParleyEngine::new();
    let styled = StyledString::from_text("one\ntwo\n\nfour", plain());
    let layout = engine.layout(&styled, LayoutConstraint::wrapping(300.0));
    let fragments = layout.fragments();
    assert_eq!(fragments.len(), 4);
    assert_eq!(fragments[1].text_range, 4..8);
    for pair in fragments.windows(2) {
        assert!(pair[0].frame.y1 <= pair[1].frame.y0);
    }
}

#[test]
fn line_ranges_are_paragraph_relative() {
    let mut engine = ParleyEngine::new();
    let styled = StyledString::from_text("first\nsecond", plain());
    let layout = engine.layout(&styled, LayoutConstraint::wrapping(300.0));
    let (paragraph, offset, _) = layout.paragraphs().nth(1).unwrap();
    assert_eq!(offset, 6);
    let lines = paragraph.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text_range.start, 0);
    assert!(lines[0].text_range.end <= "second".len());
}

#[test]
fn clipped_paragraphs_keep_one_line() {
    let mut engine = ParleyEngine::new();
    let mut attrs = plain();
    attrs.paragraph = Some(ParagraphStyle {
        line_break: LineBreakMode::Clip,
        ..ParagraphStyle::default()
    });
    let styled = StyledString::from_text("let value = some_function(argument);", attrs);
    let layout = engine.layout(&styled, LayoutConstraint::wrapping(10.0));
    let (paragraph, _, _) = layout.paragraphs().next().unwrap();
    assert_eq!(paragraph.lines().len(), 1);
}
