// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Theme text styles.
//!
//! A [`TextStyle`] is a declaration list: declarations are folded into an [`AttributeSet`] in
//! authoring order, and when the same property is declared twice the last declaration wins.
//! Relative font sizes compose with whatever the set already holds, so the order in which styles
//! are collected matters.

use alloc::vec::Vec;
use peniko::color::Rgba8;

use crate::{AttributeSet, CapsVariant, FamilyVariant, FontFamily, FontStyle, FontWeight};

/// Default palette used by the themes and configuration in this crate.
pub mod palette {
    use peniko::color::Rgba8;

    use crate::ColorScheme;

    /// Primary text in the light scheme.
    pub const LABEL: Rgba8 = Rgba8 {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
    /// Primary text in the dark scheme.
    pub const LABEL_DARK: Rgba8 = Rgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Primary text colour for `scheme`.
    pub fn label(scheme: ColorScheme) -> Rgba8 {
        match scheme {
            ColorScheme::Light => LABEL,
            ColorScheme::Dark => LABEL_DARK,
        }
    }

    /// Secondary content such as quote bars and rules.
    pub const SECONDARY: Rgba8 = Rgba8 {
        r: 60,
        g: 60,
        b: 67,
        a: 153,
    };
    /// Hairline separators.
    pub const SEPARATOR: Rgba8 = Rgba8 {
        r: 60,
        g: 60,
        b: 67,
        a: 73,
    };
    /// Fill behind inline code when no other colour is known.
    pub const TERTIARY_FILL: Rgba8 = Rgba8 {
        r: 118,
        g: 118,
        b: 128,
        a: 31,
    };
    /// Link text.
    pub const LINK: Rgba8 = Rgba8 {
        r: 0,
        g: 122,
        b: 255,
        a: 255,
    };
    /// Background of inline code in the default theme.
    pub const CODE_BACKGROUND: Rgba8 = Rgba8 {
        r: 118,
        g: 118,
        b: 128,
        a: 20,
    };
}

/// A specified font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FontSize {
    /// An absolute size in points. Resets any accumulated scale.
    Points(f32),
    /// A multiplier applied to the current scale.
    Em(f32),
}

/// A single text style declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleDeclaration {
    /// Font size.
    FontSize(FontSize),
    /// Font family.
    FontFamily(FontFamily),
    /// Family variant.
    FamilyVariant(FamilyVariant),
    /// Font weight.
    FontWeight(FontWeight),
    /// Font style.
    FontStyle(FontStyle),
    /// Caps variant.
    CapsVariant(CapsVariant),
    /// Text colour.
    ForegroundColor(Rgba8),
    /// Background colour.
    BackgroundColor(Rgba8),
    /// Strikethrough.
    Strikethrough(bool),
    /// Underline.
    Underline(bool),
    /// Kerning, in points.
    Kerning(f32),
}

/// A list of text style declarations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    declarations: Vec<StyleDeclaration>,
}

impl TextStyle {
    /// Creates an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a style from an iterator of declarations.
    pub fn from_declarations<I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = StyleDeclaration>,
    {
        Self {
            declarations: declarations.into_iter().collect(),
        }
    }

    /// The declarations, in authoring order.
    pub fn declarations(&self) -> &[StyleDeclaration] {
        &self.declarations
    }

    /// Returns `true` if the style has no declarations.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Appends a declaration.
    #[must_use]
    pub fn push(mut self, declaration: StyleDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Sets the font size.
    #[must_use]
    pub fn font_size(self, size: FontSize) -> Self {
        self.push(StyleDeclaration::FontSize(size))
    }

    /// Sets the font family.
    #[must_use]
    pub fn font_family(self, family: FontFamily) -> Self {
        self.push(StyleDeclaration::FontFamily(family))
    }

    /// Selects the monospaced family variant.
    #[must_use]
    pub fn monospaced(self) -> Self {
        self.push(StyleDeclaration::FamilyVariant(FamilyVariant::Monospaced))
    }

    /// Sets the font weight.
    #[must_use]
    pub fn font_weight(self, weight: FontWeight) -> Self {
        self.push(StyleDeclaration::FontWeight(weight))
    }

    /// Selects the italic style.
    #[must_use]
    pub fn italic(self) -> Self {
        self.push(StyleDeclaration::FontStyle(FontStyle::Italic))
    }

    /// Sets the caps variant.
    #[must_use]
    pub fn caps_variant(self, caps: CapsVariant) -> Self {
        self.push(StyleDeclaration::CapsVariant(caps))
    }

    /// Sets the text colour.
    #[must_use]
    pub fn foreground_color(self, color: Rgba8) -> Self {
        self.push(StyleDeclaration::ForegroundColor(color))
    }

    /// Sets the background colour.
    #[must_use]
    pub fn background_color(self, color: Rgba8) -> Self {
        self.push(StyleDeclaration::BackgroundColor(color))
    }

    /// Enables or disables strikethrough.
    #[must_use]
    pub fn strikethrough(self, enabled: bool) -> Self {
        self.push(StyleDeclaration::Strikethrough(enabled))
    }

    /// Enables or disables underline.
    #[must_use]
    pub fn underline(self, enabled: bool) -> Self {
        self.push(StyleDeclaration::Underline(enabled))
    }

    /// Sets kerning, in points.
    #[must_use]
    pub fn kerning(self, kerning: f32) -> Self {
        self.push(StyleDeclaration::Kerning(kerning))
    }

    /// Folds the declarations into `attributes`.
    pub fn collect_into(&self, attributes: &mut AttributeSet) {
        for declaration in &self.declarations {
            match declaration {
                StyleDeclaration::FontSize(FontSize::Points(size)) => {
                    let font = attributes.font_mut();
                    font.size = *size;
                    font.scale = 1.0;
                }
                StyleDeclaration::FontSize(FontSize::Em(em)) => attributes.font_mut().scale *= em,
                StyleDeclaration::FontFamily(family) => {
                    attributes.font_mut().family = family.clone();
                }
                StyleDeclaration::FamilyVariant(variant) => {
                    attributes.font_mut().family_variant = *variant;
                }
                StyleDeclaration::FontWeight(weight) => attributes.font_mut().weight = *weight,
                StyleDeclaration::FontStyle(style) => attributes.font_mut().style = *style,
                StyleDeclaration::CapsVariant(caps) => attributes.font_mut().caps_variant = *caps,
                StyleDeclaration::ForegroundColor(color) => {
                    attributes.foreground_color = Some(*color);
                }
                StyleDeclaration::BackgroundColor(color) => {
                    attributes.background_color = Some(*color);
                }
                StyleDeclaration::Strikethrough(on) => attributes.strikethrough = Some(*on),
                StyleDeclaration::Underline(on) => attributes.underline = Some(*on),
                StyleDeclaration::Kerning(kern) => attributes.kerning = Some(*kern),
            }
        }
    }

    /// Returns `base` with this style collected into it.
    pub fn applied_to(&self, base: &AttributeSet) -> AttributeSet {
        let mut out = base.clone();
        self.collect_into(&mut out);
        out
    }
}

/// The text styles of a theme.
#[derive(Clone, Debug, PartialEq)]
pub struct TextTheme {
    /// The base style of all text.
    pub text: TextStyle,
    /// Inline code.
    pub code: TextStyle,
    /// Emphasized text.
    pub emphasis: TextStyle,
    /// Strongly emphasized text.
    pub strong: TextStyle,
    /// Struck-through text.
    pub strikethrough: TextStyle,
    /// Links.
    pub link: TextStyle,
}

impl Default for TextTheme {
    fn default() -> Self {
        Self {
            text: TextStyle::new(),
            code: TextStyle::new()
                .monospaced()
                .font_size(FontSize::Em(0.85))
                .background_color(palette::CODE_BACKGROUND),
            emphasis: TextStyle::new().italic(),
            strong: TextStyle::new().font_weight(FontWeight::Semibold),
            strikethrough: TextStyle::new().strikethrough(true),
            link: TextStyle::new().foreground_color(palette::LINK),
        }
    }
}

impl TextTheme {
    /// The base attributes every run starts from: the theme's text style collected into
    /// `inherited`.
    pub fn base_attributes(&self, inherited: &TextStyle) -> AttributeSet {
        let mut attributes = AttributeSet::new();
        self.text.collect_into(&mut attributes);
        inherited.collect_into(&mut attributes);
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_FONT_SIZE;

    #[test]
    fn em_sizes_compose_and_points_reset() {
        let style = TextStyle::new()
            .font_size(FontSize::Em(2.0))
            .font_size(FontSize::Em(0.5));
        let attrs = style.applied_to(&AttributeSet::new());
        let font = attrs.font.unwrap();
        assert_eq!(font.size, DEFAULT_FONT_SIZE);
        assert_eq!(font.scale, 1.0);

        let style = TextStyle::new()
            .font_size(FontSize::Em(2.0))
            .font_size(FontSize::Points(12.0));
        let font = style.applied_to(&AttributeSet::new()).font.unwrap();
        assert_eq!(font.size, 12.0);
        assert_eq!(font.scale, 1.0);
    }

    #[test]
    fn last_declaration_wins() {
        let style = TextStyle::new()
            .font_weight(FontWeight::Bold)
            .font_weight(FontWeight::Light);
        let attrs = style.applied_to(&AttributeSet::new());
        assert_eq!(attrs.font.unwrap().weight, FontWeight::Light);
    }

    #[test]
    fn default_code_style_is_small_monospace() {
        let theme = TextTheme::default();
        let attrs = theme.code.applied_to(&AttributeSet::new());
        let font = attrs.font_or_default();
        assert_eq!(font.family_variant, FamilyVariant::Monospaced);
        assert_eq!(font.scaled_size(), 14.0);
        assert_eq!(attrs.background_color, Some(palette::CODE_BACKGROUND));
    }

    #[test]
    fn empty_styles_leave_attributes_untouched() {
        let theme = TextTheme::default();
        assert!(theme.text.is_empty());
        assert_eq!(theme.base_attributes(&TextStyle::new()), AttributeSet::new());
    }
}
