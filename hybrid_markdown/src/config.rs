// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration threaded through the render call chain.
//!
//! Nothing here is global: a [`RenderEnvironment`] is built by the host and passed down, and each
//! component reads only the fields it needs.

use alloc::string::String;
use peniko::color::Rgba8;

use crate::style::{FontSize, TextStyle, palette};
use crate::{ColorScheme, FontWeight, SoftBreakMode, TextTheme};

/// The size of a heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeadingSize {
    /// A multiplier of the body size.
    Scale(f32),
    /// An absolute size in points.
    Points(f32),
}

/// Typography of one heading level.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingMetrics {
    /// The size.
    pub size: HeadingSize,
    /// The weight, if overridden.
    pub weight: Option<FontWeight>,
    /// The colour, if overridden.
    pub foreground_color: Option<Rgba8>,
    /// Space above the heading paragraph.
    pub spacing_before: Option<f32>,
    /// Space below the heading paragraph.
    pub spacing_after: Option<f32>,
}

impl HeadingMetrics {
    /// Metrics scaling the body size by `scale`.
    pub fn scale(scale: f32) -> Self {
        Self {
            size: HeadingSize::Scale(scale),
            weight: None,
            foreground_color: None,
            spacing_before: None,
            spacing_after: None,
        }
    }

    /// Metrics with an absolute size in points.
    pub fn points(points: f32) -> Self {
        Self {
            size: HeadingSize::Points(points),
            ..Self::scale(1.0)
        }
    }

    /// Sets the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the colour.
    #[must_use]
    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.foreground_color = Some(color);
        self
    }

    /// Sets the paragraph spacing around the heading.
    #[must_use]
    pub fn with_spacing(mut self, before: Option<f32>, after: Option<f32>) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }

    /// The declarations this heading adds on top of the base text style.
    pub fn text_style(&self) -> TextStyle {
        let mut style = TextStyle::new().font_size(match self.size {
            HeadingSize::Scale(scale) => FontSize::Em(scale),
            HeadingSize::Points(points) => FontSize::Points(points),
        });
        if let Some(weight) = self.weight {
            style = style.font_weight(weight);
        }
        if let Some(color) = self.foreground_color {
            style = style.foreground_color(color);
        }
        style
    }
}

const DEFAULT_HEADING_SCALES: [f32; 6] = [2.0, 1.5, 1.25, 1.0, 0.875, 0.85];

fn default_metrics(scale: f32) -> HeadingMetrics {
    HeadingMetrics::scale(scale).with_weight(FontWeight::Semibold)
}

/// Heading metrics for levels 1 through 6.
///
/// Levels without configured metrics use the default scale table.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadingMetricsTable {
    levels: [Option<HeadingMetrics>; 6],
}

impl Default for HeadingMetricsTable {
    fn default() -> Self {
        Self {
            levels: DEFAULT_HEADING_SCALES.map(|scale| Some(default_metrics(scale))),
        }
    }
}

impl HeadingMetricsTable {
    /// A table with no configured levels; every lookup uses the defaults.
    pub fn empty() -> Self {
        Self {
            levels: [const { None }; 6],
        }
    }

    /// Sets the metrics of `level`. Levels outside `1..=6` are ignored.
    pub fn set(&mut self, level: u8, metrics: Option<HeadingMetrics>) {
        if let Some(slot) = Self::index(level).and_then(|ix| self.levels.get_mut(ix)) {
            *slot = metrics;
        }
    }

    /// Builder-style [`HeadingMetricsTable::set`].
    #[must_use]
    pub fn with(mut self, level: u8, metrics: HeadingMetrics) -> Self {
        self.set(level, Some(metrics));
        self
    }

    /// The metrics for `level`, clamped to `1..=6`.
    pub fn metrics(&self, level: u8) -> HeadingMetrics {
        let ix = Self::index(level.clamp(1, 6)).unwrap_or(0);
        match &self.levels[ix] {
            Some(metrics) => metrics.clone(),
            None => default_metrics(DEFAULT_HEADING_SCALES[ix]),
        }
    }

    fn index(level: u8) -> Option<usize> {
        (1..=6).contains(&level).then(|| usize::from(level - 1))
    }
}

/// Rounded backgrounds drawn behind inline code.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineCodeOverlay {
    /// When enabled, backgrounds are drawn as overlay layers and not as text background fills.
    pub enabled: bool,
    /// Overrides the fill colour of every overlay.
    pub color: Option<Rgba8>,
    /// Horizontal padding around the code; vertical padding is 40% of this.
    pub padding: f64,
    /// Corner radius.
    pub corner_radius: f64,
}

impl Default for InlineCodeOverlay {
    fn default() -> Self {
        Self {
            enabled: true,
            color: None,
            padding: 2.0,
            corner_radius: 4.0,
        }
    }
}

/// Insets of the text container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextInsets {
    /// Left inset.
    pub left: f64,
    /// Right inset.
    pub right: f64,
}

/// All options of the hybrid renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridConfig {
    /// Minimum height of a native code block.
    pub code_block_min_height: f32,
    /// Maximum height of a native code block, if bounded.
    pub code_block_max_height: Option<f32>,
    /// Colour of block quote bars.
    pub quote_bar_color: Rgba8,
    /// Colour of heading dividers.
    pub heading_divider_color: Rgba8,
    /// Draw dividers below level 1 and 2 headings.
    pub heading_divider_enabled: bool,
    /// Colour of thematic break rules.
    pub thematic_break_color: Rgba8,
    /// Thickness of thematic break rules, never thinner than a hairline.
    pub thematic_break_thickness: f64,
    /// Per-level heading typography.
    pub heading_metrics: HeadingMetricsTable,
    /// Inline code backgrounds.
    pub inline_code_overlay: InlineCodeOverlay,
    /// Extra space between lines, in points.
    pub line_spacing: Option<f32>,
    /// Line height as a multiple of the font's natural line height.
    pub line_height: Option<f32>,
    /// Vertical space after each text run.
    pub text_run_spacing: f32,
    /// Insets of the text container.
    pub text_insets: TextInsets,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            code_block_min_height: 44.0,
            code_block_max_height: None,
            quote_bar_color: palette::SECONDARY,
            heading_divider_color: palette::SECONDARY,
            heading_divider_enabled: false,
            thematic_break_color: palette::SECONDARY,
            thematic_break_thickness: 2.0,
            heading_metrics: HeadingMetricsTable::default(),
            inline_code_overlay: InlineCodeOverlay::default(),
            line_spacing: None,
            line_height: None,
            text_run_spacing: 8.0,
            text_insets: TextInsets::default(),
        }
    }
}

impl HybridConfig {
    /// Clamps a measured code block height to the configured bounds.
    pub fn clamp_code_block_height(&self, height: f32) -> f32 {
        let height = height.max(self.code_block_min_height);
        match self.code_block_max_height {
            Some(max) => height.min(max),
            None => height,
        }
    }

    /// The options read by the decoration overlay.
    pub fn decoration(&self, display_scale: f64) -> DecorationConfig {
        DecorationConfig {
            quote_bar_color: self.quote_bar_color,
            heading_divider_color: self.heading_divider_color,
            heading_divider_enabled: self.heading_divider_enabled,
            thematic_break_color: self.thematic_break_color,
            thematic_break_thickness: self.thematic_break_thickness,
            inline_code_overlay: self.inline_code_overlay.clone(),
            insets: self.text_insets,
            display_scale,
        }
    }
}

/// The subset of [`HybridConfig`] read by the decoration overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct DecorationConfig {
    /// Colour of block quote bars.
    pub quote_bar_color: Rgba8,
    /// Colour of heading dividers.
    pub heading_divider_color: Rgba8,
    /// Draw dividers below level 1 and 2 headings.
    pub heading_divider_enabled: bool,
    /// Colour of thematic break rules.
    pub thematic_break_color: Rgba8,
    /// Thickness of thematic break rules.
    pub thematic_break_thickness: f64,
    /// Inline code backgrounds.
    pub inline_code_overlay: InlineCodeOverlay,
    /// Insets of the text container.
    pub insets: TextInsets,
    /// Device pixels per point.
    pub display_scale: f64,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        HybridConfig::default().decoration(1.0)
    }
}

impl DecorationConfig {
    /// The thinnest visible line at the display scale.
    pub fn hairline(&self) -> f64 {
        1.0 / self.display_scale.max(1.0)
    }
}

/// Everything a render pass reads from its surroundings.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderEnvironment {
    /// The theme's text styles.
    pub theme: TextTheme,
    /// A text style inherited from the host, collected after the theme's base style.
    pub text_style: TextStyle,
    /// Renderer options.
    pub config: HybridConfig,
    /// How soft breaks render.
    pub soft_break: SoftBreakMode,
    /// Base URL that relative link destinations resolve against.
    pub base_url: Option<String>,
    /// Base URL that relative image sources resolve against. Defaults to `base_url`.
    pub image_base_url: Option<String>,
    /// The active colour scheme.
    pub color_scheme: ColorScheme,
    /// Device pixels per point.
    pub display_scale: f64,
}

impl Default for RenderEnvironment {
    fn default() -> Self {
        Self {
            theme: TextTheme::default(),
            text_style: TextStyle::new(),
            config: HybridConfig::default(),
            soft_break: SoftBreakMode::Space,
            base_url: None,
            image_base_url: None,
            color_scheme: ColorScheme::Light,
            display_scale: 1.0,
        }
    }
}

impl RenderEnvironment {
    /// The base URL for image sources.
    pub fn image_base_url(&self) -> Option<&str> {
        self.image_base_url.as_deref().or(self.base_url.as_deref())
    }

    /// The options read by the decoration overlay.
    pub fn decoration(&self) -> DecorationConfig {
        self.config.decoration(self.display_scale)
    }
}
