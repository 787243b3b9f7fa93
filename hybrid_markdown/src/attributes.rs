// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The semantic attribute vocabulary.
//!
//! Attributes are sparse: every field of an [`AttributeSet`] is optional, and unset fields
//! inherit from an ambient base (usually the theme's text style) when the rich text is resolved
//! by [`crate::typography`].

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the float methods")]
use core_maths::CoreFloat;
use alloc::string::String;
use peniko::color::Rgba8;

/// The default body font size, in points.
pub const DEFAULT_FONT_SIZE: f32 = 17.0;

/// A font family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// The platform's system font.
    #[default]
    System,
    /// A named font family. Falls back to the system font when unavailable.
    Custom(String),
}

/// A variant of the font family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FamilyVariant {
    /// The regular design.
    #[default]
    Normal,
    /// The monospaced design.
    Monospaced,
}

/// Small-caps variants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapsVariant {
    /// No caps transformation.
    #[default]
    Normal,
    /// Small caps for lowercase letters.
    SmallCaps,
    /// Small caps for lowercase letters only.
    LowercaseSmallCaps,
    /// Small caps for uppercase letters.
    UppercaseSmallCaps,
}

impl CapsVariant {
    /// Returns `true` for any small-caps variant.
    pub fn is_small_caps(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// The nine standard font weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    /// 100.
    UltraLight,
    /// 200.
    Thin,
    /// 300.
    Light,
    /// 400.
    #[default]
    Regular,
    /// 500.
    Medium,
    /// 600.
    Semibold,
    /// 700.
    Bold,
    /// 800.
    Heavy,
    /// 900.
    Black,
}

impl FontWeight {
    /// The numeric OpenType weight value.
    pub fn value(self) -> u16 {
        match self {
            Self::UltraLight => 100,
            Self::Thin => 200,
            Self::Light => 300,
            Self::Regular => 400,
            Self::Medium => 500,
            Self::Semibold => 600,
            Self::Bold => 700,
            Self::Heavy => 800,
            Self::Black => 900,
        }
    }
}

/// Upright or italic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Font description carried by semantic attributes.
///
/// The rendered point size is `size * scale`, rounded.
#[derive(Clone, Debug, PartialEq)]
pub struct FontProperties {
    /// The font family.
    pub family: FontFamily,
    /// The family variant.
    pub family_variant: FamilyVariant,
    /// The caps variant.
    pub caps_variant: CapsVariant,
    /// The weight.
    pub weight: FontWeight,
    /// The style.
    pub style: FontStyle,
    /// The base size, in points.
    pub size: f32,
    /// A multiplier applied to `size`.
    pub scale: f32,
}

impl Default for FontProperties {
    fn default() -> Self {
        Self {
            family: FontFamily::System,
            family_variant: FamilyVariant::Normal,
            caps_variant: CapsVariant::Normal,
            weight: FontWeight::Regular,
            style: FontStyle::Normal,
            size: DEFAULT_FONT_SIZE,
            scale: 1.0,
        }
    }
}

impl FontProperties {
    /// The point size after applying `scale`, rounded to the nearest point.
    pub fn scaled_size(&self) -> f32 {
        (self.size * self.scale).round()
    }
}

/// A single semantic attribute.
///
/// This is the closed set of attributes a span of rich text can carry. Use
/// [`AttributeSet::apply`] to fold attributes into a set.
#[derive(Clone, Debug, PartialEq)]
pub enum Attribute {
    /// Font description.
    Font(FontProperties),
    /// Text color.
    ForegroundColor(Rgba8),
    /// Background color.
    BackgroundColor(Rgba8),
    /// Link target.
    Link(String),
    /// Strikethrough.
    Strikethrough(bool),
    /// Underline.
    Underline(bool),
    /// Kerning adjustment, in points.
    Kerning(f32),
    /// Nesting level used for paragraph indentation.
    IndentLevel(u8),
    /// Block quote depth; `1` is a top-level quote.
    QuoteLevel(u8),
    /// Heading level, `1` through `6`.
    HeadingLevel(u8),
    /// Marks the list marker of a list item.
    ListItem(bool),
    /// Extra space above the paragraph, in points.
    ParagraphSpacingBefore(f32),
    /// Extra space below the paragraph, in points.
    ParagraphSpacingAfter(f32),
    /// Marks inline code.
    InlineCode(bool),
    /// Marks the anchor character of a thematic break.
    ThematicBreak(bool),
}

/// A sparse set of semantic attributes applying to one run of rich text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSet {
    /// Font description.
    pub font: Option<FontProperties>,
    /// Text color.
    pub foreground_color: Option<Rgba8>,
    /// Background color.
    pub background_color: Option<Rgba8>,
    /// Link target.
    pub link: Option<String>,
    /// Strikethrough.
    pub strikethrough: Option<bool>,
    /// Underline.
    pub underline: Option<bool>,
    /// Kerning adjustment, in points.
    pub kerning: Option<f32>,
    /// Nesting level used for paragraph indentation.
    pub indent_level: Option<u8>,
    /// Block quote depth.
    pub quote_level: Option<u8>,
    /// Heading level.
    pub heading_level: Option<u8>,
    /// Marks the list marker of a list item.
    pub list_item: Option<bool>,
    /// Extra space above the paragraph.
    pub paragraph_spacing_before: Option<f32>,
    /// Extra space below the paragraph.
    pub paragraph_spacing_after: Option<f32>,
    /// Marks inline code.
    pub inline_code: Option<bool>,
    /// Marks the anchor character of a thematic break.
    pub thematic_break: Option<bool>,
}

impl AttributeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one attribute, replacing any previous value of the same kind.
    pub fn apply(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Font(value) => self.font = Some(value),
            Attribute::ForegroundColor(value) => self.foreground_color = Some(value),
            Attribute::BackgroundColor(value) => self.background_color = Some(value),
            Attribute::Link(value) => self.link = Some(value),
            Attribute::Strikethrough(value) => self.strikethrough = Some(value),
            Attribute::Underline(value) => self.underline = Some(value),
            Attribute::Kerning(value) => self.kerning = Some(value),
            Attribute::IndentLevel(value) => self.indent_level = Some(value),
            Attribute::QuoteLevel(value) => self.quote_level = Some(value),
            Attribute::HeadingLevel(value) => self.heading_level = Some(value),
            Attribute::ListItem(value) => self.list_item = Some(value),
            Attribute::ParagraphSpacingBefore(value) => {
                self.paragraph_spacing_before = Some(value);
            }
            Attribute::ParagraphSpacingAfter(value) => self.paragraph_spacing_after = Some(value),
            Attribute::InlineCode(value) => self.inline_code = Some(value),
            Attribute::ThematicBreak(value) => self.thematic_break = Some(value),
        }
    }

    /// Builder-style [`AttributeSet::apply`].
    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.apply(attribute);
        self
    }

    /// The font description, or the default one when unset.
    pub fn font_or_default(&self) -> FontProperties {
        self.font.clone().unwrap_or_default()
    }

    /// Mutable access to the font description, materializing the default when unset.
    pub fn font_mut(&mut self) -> &mut FontProperties {
        self.font.get_or_insert_with(FontProperties::default)
    }

    /// The quote level, treating unset as `0`.
    pub fn quote_level(&self) -> u8 {
        self.quote_level.unwrap_or(0)
    }

    /// The indent level, treating unset as `0`.
    pub fn indent_level(&self) -> u8 {
        self.indent_level.unwrap_or(0)
    }

    /// The heading level, treating unset as `0`.
    pub fn heading_level(&self) -> u8 {
        self.heading_level.unwrap_or(0)
    }

    /// Whether the run is a list marker.
    pub fn is_list_item(&self) -> bool {
        self.list_item.unwrap_or(false)
    }

    /// Whether the run is inline code.
    pub fn is_inline_code(&self) -> bool {
        self.inline_code.unwrap_or(false)
    }

    /// Whether the run is a thematic break anchor.
    pub fn is_thematic_break(&self) -> bool {
        self.thematic_break.unwrap_or(false)
    }

    /// Returns `true` when any attribute that affects paragraph layout is set.
    pub fn has_paragraph_attributes(&self) -> bool {
        self.indent_level() > 0
            || self.is_list_item()
            || self.paragraph_spacing_before.is_some()
            || self.paragraph_spacing_after.is_some()
    }
}

/// Semantic rich text: text partitioned into runs of sparse [`AttributeSet`]s.
pub type RichText = crate::AttributedString<AttributeSet>;
