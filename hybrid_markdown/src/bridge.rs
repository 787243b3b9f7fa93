// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bridge views between the block tree and the native text engine.
//!
//! A [`TextRunView`] shows one text run segment as a single wrapped styled string with
//! decorations; a [`CodeBlockView`] shows highlighted code without wrapping, for horizontal
//! scrolling. Both build a fresh engine layout for every measurement.

#[cfg(feature = "libm")]
#[allow(unused_imports, reason = "unused when std provides the float methods")]
use core_maths::CoreFloat;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace};
use peniko::color::Rgba8;

use crate::decoration::{DecorationOverlay, LayerStack};
use crate::flatten::{FlattenContext, flatten};
use crate::highlight::HighlightedCode;
use crate::style::palette;
use crate::typography::{resolve, resolve_font};
use crate::{
    BlockNode, ConcreteAttributes, DEFAULT_FONT_SIZE, FontSystem, HybridConfig, LayoutConstraint,
    LineBreakMode, ParagraphStyle, RenderEnvironment, ResolvedFont, StackedLayout, StyledString,
    TextEngine, TextLayout,
};

#[derive(Clone, Copy, Debug, PartialEq)]
struct CacheEntry {
    width: f32,
    generation: u64,
    height: f32,
}

/// The last measured height of a view, keyed by width and content generation.
///
/// The cache holds a single entry. It is invalidated whenever the content changes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasurementCache {
    entry: Option<CacheEntry>,
}

impl MeasurementCache {
    /// The cached height for `width` and `generation`.
    pub fn get(&self, width: f32, generation: u64) -> Option<f32> {
        self.entry
            .filter(|entry| entry.width == width && entry.generation == generation)
            .map(|entry| entry.height)
    }

    /// Replaces the cached entry.
    pub fn store(&mut self, width: f32, generation: u64, height: f32) {
        self.entry = Some(CacheEntry {
            width,
            generation,
            height,
        });
    }

    /// Drops the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Returns `true` if an entry is cached.
    pub fn is_valid(&self) -> bool {
        self.entry.is_some()
    }
}

/// A wrapped text view showing one text run.
#[derive(Clone, Debug, Default)]
pub struct TextRunView {
    blocks: Vec<BlockNode>,
    content: StyledString,
    generation: u64,
    cache: MeasurementCache,
    overlay: DecorationOverlay,
    layers: LayerStack,
}

impl TextRunView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a view showing `blocks`.
    pub fn with_blocks<F>(blocks: &[BlockNode], env: &RenderEnvironment, fonts: &mut F) -> Self
    where
        F: FontSystem + ?Sized,
    {
        let mut view = Self::new();
        view.update(blocks, env, fonts);
        view
    }

    /// Re-renders `blocks` under `env`.
    ///
    /// The content is replaced, and the measurement cache invalidated, only when the newly
    /// rendered styled string differs from the current one. Returns `true` if it was replaced.
    pub fn update<F>(
        &mut self,
        blocks: &[BlockNode],
        env: &RenderEnvironment,
        fonts: &mut F,
    ) -> bool
    where
        F: FontSystem + ?Sized,
    {
        self.overlay.set_config(env.decoration());
        if self.blocks != blocks {
            self.blocks = blocks.to_vec();
        }
        let rich = flatten(blocks, &FlattenContext::new(env));
        let styled = resolve(&rich, env, fonts);
        if styled == self.content {
            trace!("text run unchanged, keeping content");
            return false;
        }
        debug!(
            "replacing text run content ({} bytes in {} runs)",
            styled.len(),
            styled.runs().len()
        );
        self.content = styled;
        self.generation += 1;
        self.cache.invalidate();
        true
    }

    /// The blocks shown.
    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// The styled string shown.
    pub fn content(&self) -> &StyledString {
        &self.content
    }

    /// Incremented every time the content is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The measurement cache.
    pub fn cache(&self) -> &MeasurementCache {
        &self.cache
    }

    /// The view's content layers, including decorations.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Mutable access to the content layers, for layers owned by the host.
    pub fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    /// The height needed to show the content at `proposed_width`, rounded up.
    pub fn height_for_width<E>(&mut self, proposed_width: f32, engine: &mut E) -> f32
    where
        E: TextEngine + ?Sized,
    {
        let width = proposed_width.max(1.0);
        if let Some(height) = self.cache.get(width, self.generation) {
            trace!("text run height cache hit at width {width}");
            return height;
        }
        let layout = engine.layout(&self.content, LayoutConstraint::wrapping(width));
        let height = whole_points(layout.height());
        debug!("measured text run at width {width}: {height}");
        self.cache.store(width, self.generation, height);
        height
    }

    /// Lays out the content at `width` and redraws the decorations.
    pub fn layout_pass<E>(&mut self, width: f32, engine: &mut E) -> StackedLayout<E::Paragraph>
    where
        E: TextEngine + ?Sized,
    {
        let width = width.max(1.0);
        let layout = engine.layout(&self.content, LayoutConstraint::wrapping(width));
        self.overlay
            .redraw(&self.content, &layout, f64::from(width), &mut self.layers);
        layout
    }
}

/// Rounds a layout extent up to whole points.
#[expect(
    clippy::cast_possible_truncation,
    reason = "layout extents are far inside the f32 range"
)]
fn whole_points(extent: f64) -> f32 {
    extent.ceil() as f32
}

/// Sizes of a code block at an available width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodeBlockMetrics {
    /// Width of the scrollable content: the available width or the longest line, whichever is
    /// larger.
    pub content_width: f32,
    /// Height, clamped to the configured bounds.
    pub height: f32,
}

/// A horizontally scrolling, non-wrapping code view.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeBlockView {
    language: Option<String>,
    content: StyledString,
    config: HybridConfig,
}

impl CodeBlockView {
    /// Creates a view showing `code`.
    ///
    /// Runs missing a font, colour or kerning take them from the ambient text style, and every
    /// paragraph is set to clip.
    pub fn new<F>(
        code: &HighlightedCode,
        language: Option<&str>,
        env: &RenderEnvironment,
        fonts: &mut F,
    ) -> Self
    where
        F: FontSystem + ?Sized,
    {
        let mut base = env.theme.base_attributes(&env.text_style);
        env.theme.code.collect_into(&mut base);
        let base_font = match &base.font {
            Some(properties) => resolve_font(properties, fonts),
            None => ResolvedFont::monospace(DEFAULT_FONT_SIZE),
        };
        let base_color: Rgba8 = base
            .foreground_color
            .unwrap_or_else(|| palette::label(env.color_scheme));
        let clip = ParagraphStyle {
            line_break: LineBreakMode::Clip,
            ..ParagraphStyle::default()
        };

        let mut content = StyledString::new();
        for run in code.runs() {
            let attrs = &run.attributes;
            let concrete = ConcreteAttributes {
                kerning: attrs.kerning.or(base.kerning),
                paragraph: Some(clip.clone()),
                ..ConcreteAttributes::plain(
                    attrs.font.clone().unwrap_or_else(|| base_font.clone()),
                    attrs.color.unwrap_or(base_color),
                )
            };
            content.push_str(&code.as_str()[run.range.clone()], concrete);
        }

        Self {
            language: language.map(String::from),
            content,
            config: env.config.clone(),
        }
    }

    /// The fence info of the block.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The styled code shown.
    pub fn content(&self) -> &StyledString {
        &self.content
    }

    /// The width of the longest line, rounded up.
    pub fn max_line_width<E>(&self, engine: &mut E) -> f32
    where
        E: TextEngine + ?Sized,
    {
        let layout = engine.layout(&self.content, LayoutConstraint::unbounded());
        whole_points(layout.max_fragment_width())
    }

    /// The height at `width`, clamped to the configured bounds and rounded up.
    pub fn height<E>(&self, width: f32, engine: &mut E) -> f32
    where
        E: TextEngine + ?Sized,
    {
        let layout = engine.layout(&self.content, LayoutConstraint::clipping(width.max(1.0)));
        self.config
            .clamp_code_block_height(whole_points(layout.height()))
            .ceil()
    }

    /// The scroll content size at `available_width`.
    pub fn measure<E>(&self, available_width: f32, engine: &mut E) -> CodeBlockMetrics
    where
        E: TextEngine + ?Sized,
    {
        let available = available_width.max(1.0);
        let metrics = CodeBlockMetrics {
            content_width: available.max(self.max_line_width(engine)),
            height: self.height(available, engine),
        };
        debug!(
            "measured code block ({:?}) at width {available}: {metrics:?}",
            self.language
        );
        metrics
    }
}
