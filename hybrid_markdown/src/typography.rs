// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving semantic rich text into a concrete styled string.
//!
//! Every semantic attribute is turned into its concrete form: font properties become a
//! [`ResolvedFont`], colours fall back to the theme and colour scheme, and paragraph attributes
//! become a [`ParagraphStyle`]. The resulting [`StyledString`] never holds unresolved attributes.

use alloc::string::String;
use log::debug;
use peniko::color::Rgba8;
use smallvec::SmallVec;

use crate::style::palette;
use crate::{
    AttributeSet, AttributedString, FamilyVariant, FontFamily, FontProperties, FontStyle,
    FontSystem, RenderEnvironment, RichText,
};

/// Indentation per nesting level, in points.
pub const INDENT_STEP: f32 = 16.0;

/// Gap between a list marker and the item content, as a fraction of the font size.
pub const LIST_MARKER_GAP: f32 = 0.3;

/// A font family after availability checks.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedFamily {
    /// The system UI font.
    System,
    /// The system monospaced font.
    Monospace,
    /// An installed named family.
    Named(String),
}

/// A concrete font.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedFont {
    /// The family.
    pub family: ResolvedFamily,
    /// The point size.
    pub size: f32,
    /// The OpenType weight.
    pub weight: u16,
    /// Italic.
    pub italic: bool,
    /// Small caps via the `smcp` feature.
    pub small_caps: bool,
}

impl Default for ResolvedFont {
    fn default() -> Self {
        Self {
            family: ResolvedFamily::System,
            size: crate::DEFAULT_FONT_SIZE,
            weight: 400,
            italic: false,
            small_caps: false,
        }
    }
}

impl ResolvedFont {
    /// The system monospaced font at `size`.
    pub fn monospace(size: f32) -> Self {
        Self {
            family: ResolvedFamily::Monospace,
            size,
            ..Self::default()
        }
    }
}

/// Resolves font properties to a concrete font.
///
/// Custom families that `fonts` does not know fall back to the system font at the same size and
/// weight.
pub fn resolve_font<F: FontSystem + ?Sized>(
    properties: &FontProperties,
    fonts: &mut F,
) -> ResolvedFont {
    let family = match &properties.family {
        FontFamily::System => match properties.family_variant {
            FamilyVariant::Normal => ResolvedFamily::System,
            FamilyVariant::Monospaced => ResolvedFamily::Monospace,
        },
        FontFamily::Custom(name) if fonts.has_family(name) => ResolvedFamily::Named(name.clone()),
        FontFamily::Custom(name) => {
            debug!("font family {name:?} is unavailable, using the system font");
            ResolvedFamily::System
        }
    };
    ResolvedFont {
        family,
        size: properties.scaled_size(),
        weight: properties.weight.value(),
        italic: properties.style == FontStyle::Italic,
        small_caps: properties.caps_variant.is_small_caps(),
    }
}

/// How lines that do not fit are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineBreakMode {
    /// Wrap at word boundaries.
    #[default]
    WordWrap,
    /// Never wrap; overflowing text is clipped.
    Clip,
}

/// Paragraph-level layout parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphStyle {
    /// Indent of the first line.
    pub first_line_head_indent: f32,
    /// Indent of the remaining lines.
    pub head_indent: f32,
    /// Tab stop positions, measured from the leading edge.
    pub tab_stops: SmallVec<[f32; 2]>,
    /// Extra space between lines.
    pub line_spacing: f32,
    /// Line height as a multiple of the natural line height.
    pub line_height_multiple: Option<f32>,
    /// Space above the paragraph.
    pub spacing_before: f32,
    /// Space below the paragraph.
    pub spacing_after: f32,
    /// How lines that do not fit are handled.
    pub line_break: LineBreakMode,
}

/// Markdown decorations carried through to the overlay.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecorationTags {
    /// Block quote depth; `0` outside quotes.
    pub quote_level: u8,
    /// Heading level; `0` outside headings.
    pub heading_level: u8,
    /// The run is a thematic break anchor.
    pub thematic_break: bool,
    /// The run is inline code.
    pub inline_code: bool,
    /// Background of inline code drawn by the overlay instead of the text engine.
    pub inline_code_background: Option<Rgba8>,
}

/// Fully resolved attributes of one styled run.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcreteAttributes {
    /// The font.
    pub font: ResolvedFont,
    /// The text colour.
    pub color: Rgba8,
    /// Background fill painted by the text engine.
    pub background: Option<Rgba8>,
    /// Link target.
    pub link: Option<String>,
    /// Strikethrough.
    pub strikethrough: bool,
    /// Underline.
    pub underline: bool,
    /// Kerning, in points.
    pub kerning: Option<f32>,
    /// Paragraph style, when it differs from the defaults.
    pub paragraph: Option<ParagraphStyle>,
    /// Decorations for the overlay.
    pub tags: DecorationTags,
}

impl ConcreteAttributes {
    /// Plain attributes with `font` and `color`.
    pub fn plain(font: ResolvedFont, color: Rgba8) -> Self {
        Self {
            font,
            color,
            background: None,
            link: None,
            strikethrough: false,
            underline: false,
            kerning: None,
            paragraph: None,
            tags: DecorationTags::default(),
        }
    }

    /// The line-break mode of the paragraph this run belongs to.
    pub fn line_break(&self) -> LineBreakMode {
        self.paragraph
            .as_ref()
            .map_or(LineBreakMode::WordWrap, |paragraph| paragraph.line_break)
    }
}

/// A concrete styled string, ready for a text engine.
pub type StyledString = AttributedString<ConcreteAttributes>;

/// Paragraph style resolution state for one pass over a rich text.
///
/// The width of a list marker is measured once, at the marker, and reused by every run of the
/// item's first paragraph. It is dropped at the first line break outside the item content, that
/// is a break whose indent level is below the marker's.
#[derive(Clone, Debug, Default)]
pub struct ParagraphContext {
    line_spacing: Option<f32>,
    line_height: Option<f32>,
    /// The measured marker width and the indent level of its item.
    marker: Option<(f32, u8)>,
}

impl ParagraphContext {
    /// Creates a context with the given line spacing overrides.
    pub fn new(line_spacing: Option<f32>, line_height: Option<f32>) -> Self {
        Self {
            line_spacing,
            line_height,
            marker: None,
        }
    }

    /// Resolves the paragraph style of a run, or `None` when the defaults apply.
    pub fn resolve_paragraph_style<F: FontSystem + ?Sized>(
        &mut self,
        attributes: &AttributeSet,
        text: &str,
        font: &ResolvedFont,
        fonts: &mut F,
    ) -> Option<ParagraphStyle> {
        let indent = attributes.indent_level();
        if attributes.is_list_item() && self.marker.is_none() {
            let marker = text.split('\t').next().unwrap_or_default();
            self.marker = Some((fonts.text_width(marker, font), indent));
        }
        let marker_width = self.marker.map(|(width, _)| width);
        if text.contains('\n') && self.marker.is_some_and(|(_, level)| indent < level) {
            self.marker = None;
        }

        let needed = self.line_spacing.is_some()
            || self.line_height.is_some()
            || attributes.has_paragraph_attributes()
            || marker_width.is_some();
        if !needed {
            return None;
        }

        let base_indent = INDENT_STEP * f32::from(indent);
        let mut style = ParagraphStyle {
            first_line_head_indent: base_indent,
            head_indent: base_indent,
            line_spacing: self.line_spacing.unwrap_or(0.0),
            line_height_multiple: self.line_height,
            spacing_before: attributes.paragraph_spacing_before.unwrap_or(0.0),
            spacing_after: attributes.paragraph_spacing_after.unwrap_or(0.0),
            ..ParagraphStyle::default()
        };
        if let Some(width) = marker_width {
            let content_indent = base_indent + width + LIST_MARKER_GAP * font.size;
            style.head_indent = content_indent;
            style.tab_stops.push(content_indent);
        }
        Some(style)
    }
}

/// Resolves `rich` against `env`.
pub fn resolve<F: FontSystem + ?Sized>(
    rich: &RichText,
    env: &RenderEnvironment,
    fonts: &mut F,
) -> StyledString {
    let mut base = AttributeSet::new();
    env.theme.text.collect_into(&mut base);
    let base_font = resolve_font(&base.font_or_default(), fonts);
    let base_color = base
        .foreground_color
        .unwrap_or_else(|| palette::label(env.color_scheme));
    let overlay = env.config.inline_code_overlay.enabled;

    let mut paragraphs = ParagraphContext::new(env.config.line_spacing, env.config.line_height);
    let mut out = StyledString::new();
    for run in rich.runs() {
        let text = &rich.as_str()[run.range.clone()];
        let attrs = &run.attributes;
        let font = match &attrs.font {
            Some(properties) => resolve_font(properties, fonts),
            None => base_font.clone(),
        };
        let paragraph = paragraphs.resolve_paragraph_style(attrs, text, &font, fonts);

        let inline_code = attrs.is_inline_code();
        let code_background = attrs.background_color.filter(|_| inline_code);
        let mut concrete = ConcreteAttributes {
            color: attrs.foreground_color.unwrap_or(base_color),
            background: code_background.filter(|_| !overlay),
            link: attrs.link.clone(),
            strikethrough: attrs.strikethrough.unwrap_or(false),
            underline: attrs.underline.unwrap_or(false),
            kerning: attrs.kerning,
            paragraph,
            ..ConcreteAttributes::plain(font, base_color)
        };
        concrete.tags = DecorationTags {
            quote_level: attrs.quote_level(),
            heading_level: attrs.heading_level(),
            thematic_break: attrs.is_thematic_break(),
            inline_code,
            inline_code_background: code_background.filter(|_| overlay),
        };
        out.push_str(text, concrete);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{FlattenContext, flatten};
    use crate::testing::MonospaceEngine;
    use crate::{Attribute, BlockNode, InlineNode, ListItem};
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn unknown_custom_family_falls_back_to_system() {
        let mut fonts = MonospaceEngine::new().with_family("Fira Sans");
        let known = FontProperties {
            family: FontFamily::Custom("Fira Sans".to_string()),
            ..FontProperties::default()
        };
        assert_eq!(
            resolve_font(&known, &mut fonts).family,
            ResolvedFamily::Named("Fira Sans".to_string())
        );

        let unknown = FontProperties {
            family: FontFamily::Custom("Nope".to_string()),
            weight: crate::FontWeight::Bold,
            ..FontProperties::default()
        };
        let font = resolve_font(&unknown, &mut fonts);
        assert_eq!(font.family, ResolvedFamily::System);
        assert_eq!(font.weight, 700);
        assert_eq!(font.size, 17.0);
    }

    #[test]
    fn small_caps_and_italic_map_to_flags() {
        let properties = FontProperties {
            style: FontStyle::Italic,
            caps_variant: crate::CapsVariant::LowercaseSmallCaps,
            family_variant: FamilyVariant::Monospaced,
            ..FontProperties::default()
        };
        let font = resolve_font(&properties, &mut MonospaceEngine::new());
        assert!(font.italic);
        assert!(font.small_caps);
        assert_eq!(font.family, ResolvedFamily::Monospace);
    }

    #[test]
    fn default_paragraphs_have_no_style() {
        let rich = RichText::from_text("plain", AttributeSet::new());
        let styled = resolve(&rich, &RenderEnvironment::default(), &mut MonospaceEngine::new());
        assert_eq!(styled.runs().len(), 1);
        assert_eq!(styled.runs()[0].attributes.paragraph, None);
        assert_eq!(styled.runs()[0].attributes.color, palette::LABEL);
    }

    #[test]
    fn list_marker_sets_head_indent_and_tab_stop() {
        let env = RenderEnvironment::default();
        let blocks = [BlockNode::NumberedList {
            is_tight: true,
            start: 1,
            items: vec![ListItem::new(vec![BlockNode::Paragraph(vec![
                InlineNode::Text("item".to_string()),
            ])])],
        }];
        let rich = flatten(&blocks, &FlattenContext::new(&env));
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        assert_eq!(styled.runs().len(), 1, "marker and content share attributes");

        let paragraph = styled.runs()[0].attributes.paragraph.clone().unwrap();
        // "1." is two characters of 0.6 × 17 each, plus a 0.3 × 17 gap.
        let expected = INDENT_STEP + 2.0 * 0.6 * 17.0 + 0.3 * 17.0;
        assert_eq!(paragraph.first_line_head_indent, INDENT_STEP);
        assert!((paragraph.head_indent - expected).abs() < 1e-4);
        assert_eq!(paragraph.tab_stops.as_slice(), [paragraph.head_indent]);
    }

    #[test]
    fn marker_width_is_measured_once_per_item() {
        let mut engine = MonospaceEngine::new();
        let marker = AttributeSet::new()
            .with(Attribute::IndentLevel(1))
            .with(Attribute::ListItem(true));
        let content = AttributeSet::new().with(Attribute::IndentLevel(1));
        let mut rich = RichText::new();
        rich.push_str("10.\t", marker.clone());
        rich.push_str("ten", content.clone());
        rich.push_str("\n", AttributeSet::new());
        rich.push_str("9.\t", marker);
        rich.push_str("nine", content);

        let styled = resolve(&rich, &RenderEnvironment::default(), &mut engine);
        assert_eq!(engine.measure_calls(), 2);
        let first = styled.attributes_at(0).unwrap().paragraph.clone().unwrap();
        let second = styled
            .attributes_at(rich.as_str().find('9').unwrap())
            .unwrap()
            .paragraph
            .clone()
            .unwrap();
        assert!(first.head_indent > second.head_indent);
    }

    #[test]
    fn marker_indent_survives_hard_breaks_in_the_item() {
        let env = RenderEnvironment::default();
        let blocks = [BlockNode::BulletedList {
            is_tight: true,
            items: vec![ListItem::new(vec![BlockNode::Paragraph(vec![
                InlineNode::Text("a".to_string()),
                InlineNode::LineBreak,
                InlineNode::Text("b ".to_string()),
                InlineNode::Strong(vec![InlineNode::Text("c".to_string())]),
            ])])],
        }];
        let rich = flatten(&blocks, &FlattenContext::new(&env));
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        let paragraph_at = |needle: char| {
            let ix = styled.as_str().find(needle).unwrap();
            styled.attributes_at(ix).unwrap().paragraph.clone().unwrap()
        };
        let first = paragraph_at('a');
        let strong = paragraph_at('c');
        assert_eq!(strong.head_indent, first.head_indent);
        assert_eq!(strong.tab_stops, first.tab_stops);
        assert!(first.head_indent > INDENT_STEP);
    }

    #[test]
    fn spacing_attributes_force_paragraph_style() {
        let mut fonts = MonospaceEngine::new();
        let mut cx = ParagraphContext::new(None, None);
        let font = ResolvedFont::default();
        let plain = AttributeSet::new();
        assert!(cx.resolve_paragraph_style(&plain, "x", &font, &mut fonts).is_none());
        let spaced = AttributeSet::new().with(Attribute::ParagraphSpacingAfter(6.0));
        let style = cx.resolve_paragraph_style(&spaced, "x", &font, &mut fonts);
        assert_eq!(style.map(|style| style.spacing_after), Some(6.0));
    }

    #[test]
    fn inline_code_background_moves_to_overlay() {
        let background = Rgba8 {
            r: 1,
            g: 2,
            b: 3,
            a: 4,
        };
        let code = AttributeSet::new()
            .with(Attribute::InlineCode(true))
            .with(Attribute::BackgroundColor(background));
        let not_code = AttributeSet::new().with(Attribute::BackgroundColor(background));
        let mut rich = RichText::new();
        rich.push_str("x", code);
        rich.push_str("y", not_code);

        let mut env = RenderEnvironment::default();
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        let x = &styled.runs()[0].attributes;
        assert_eq!(x.background, None);
        assert_eq!(x.tags.inline_code_background, Some(background));
        assert!(x.tags.inline_code);
        assert_eq!(styled.runs()[1].attributes.background, None);

        env.config.inline_code_overlay.enabled = false;
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        let x = &styled.runs()[0].attributes;
        assert_eq!(x.background, Some(background));
        assert_eq!(x.tags.inline_code_background, None);
    }

    #[test]
    fn line_spacing_forces_paragraph_style() {
        let mut env = RenderEnvironment::default();
        env.config.line_spacing = Some(4.0);
        let rich = RichText::from_text("plain", AttributeSet::new());
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        let paragraph = styled.runs()[0].attributes.paragraph.clone().unwrap();
        assert_eq!(paragraph.line_spacing, 4.0);
        assert_eq!(paragraph.head_indent, 0.0);
    }

    #[test]
    fn dark_scheme_uses_light_text() {
        let env = RenderEnvironment {
            color_scheme: crate::ColorScheme::Dark,
            ..RenderEnvironment::default()
        };
        let rich = RichText::from_text("plain", AttributeSet::new());
        let styled = resolve(&rich, &env, &mut MonospaceEngine::new());
        assert_eq!(styled.runs()[0].attributes.color, palette::LABEL_DARK);
    }
}
