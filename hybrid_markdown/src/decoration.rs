// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Decoration layers synthesized from layout geometry.
//!
//! After every layout pass, [`DecorationOverlay::redraw`] removes every layer it may have drawn
//! before and draws block quote bars, heading dividers, inline code backgrounds and thematic break
//! rules from the current geometry. Layers are never reused between passes.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use log::trace;
use peniko::color::Rgba8;
use peniko::kurbo::Rect;
use smallvec::SmallVec;

use crate::style::palette;
use crate::{DecorationConfig, StyledString, TextLayout};

/// Name prefix of block quote bars.
pub const QUOTE_BAR: &str = "markdownQuoteBar";
/// Name prefix of heading dividers.
pub const HEADING_DIVIDER: &str = "markdownHeadingDivider";
/// Name prefix of thematic break rules.
pub const THEMATIC_BREAK: &str = "markdownThematicBreak";
/// Name prefix of inline code backgrounds.
pub const INLINE_CODE: &str = "markdownInlineCode";

const PREFIXES: [&str; 4] = [QUOTE_BAR, HEADING_DIVIDER, THEMATIC_BREAK, INLINE_CODE];

/// Offset of the first quote bar from the leading inset.
pub const QUOTE_BAR_OFFSET: f64 = 6.0;
/// Horizontal distance between the bars of consecutive quote levels.
pub const QUOTE_BAR_STEP: f64 = 12.0;
/// Width of a quote bar.
pub const QUOTE_BAR_WIDTH: f64 = 3.0;
/// Gap between a heading and its divider.
pub const HEADING_DIVIDER_GAP: f64 = 8.0;

/// A named visual layer.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// The name, `"<kind>-<discriminator>"` for decorations.
    pub name: String,
    /// The frame, in text view coordinates.
    pub frame: Rect,
    /// The fill.
    pub color: Rgba8,
    /// Corner radius.
    pub corner_radius: f64,
}

impl Layer {
    /// Returns `true` if this layer was drawn by a [`DecorationOverlay`].
    pub fn is_decoration(&self) -> bool {
        PREFIXES.iter().any(|prefix| self.name.starts_with(prefix))
    }
}

/// The content layer of a text view.
pub trait LayerHost {
    /// Removes every layer for which `predicate` returns `true`.
    fn remove_layers(&mut self, predicate: impl FnMut(&Layer) -> bool);

    /// Adds a layer on top.
    fn add_layer(&mut self, layer: Layer);

    /// Runs `f` with implicit animations disabled.
    fn without_actions<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R;
}

/// An in-memory [`LayerHost`].
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    actions_disabled: usize,
    animated_mutations: usize,
}

impl LayerStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The layers, bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The layers whose name starts with `prefix`.
    pub fn layers_named<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Layer> + 'a {
        self.layers
            .iter()
            .filter(move |layer| layer.name.starts_with(prefix))
    }

    /// How many mutations happened while implicit animations were enabled.
    pub fn animated_mutations(&self) -> usize {
        self.animated_mutations
    }

    fn record_mutation(&mut self) {
        if self.actions_disabled == 0 {
            self.animated_mutations += 1;
        }
    }
}

impl LayerHost for LayerStack {
    fn remove_layers(&mut self, mut predicate: impl FnMut(&Layer) -> bool) {
        let before = self.layers.len();
        self.layers.retain(|layer| !predicate(layer));
        if self.layers.len() != before {
            self.record_mutation();
        }
    }

    fn add_layer(&mut self, layer: Layer) {
        self.record_mutation();
        self.layers.push(layer);
    }

    fn without_actions<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.actions_disabled += 1;
        let result = f(self);
        self.actions_disabled -= 1;
        result
    }
}

/// Draws Markdown decorations from layout geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecorationOverlay {
    config: DecorationConfig,
}

impl DecorationOverlay {
    /// Creates an overlay with `config`.
    pub fn new(config: DecorationConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &DecorationConfig {
        &self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: DecorationConfig) {
        self.config = config;
    }

    /// Clears previous decorations from `host` and draws new ones for `layout`.
    ///
    /// `bounds_width` is the width of the text view; rules span it minus the insets.
    pub fn redraw<L, H>(&self, styled: &StyledString, layout: &L, bounds_width: f64, host: &mut H)
    where
        L: TextLayout + ?Sized,
        H: LayerHost,
    {
        host.without_actions(|host| {
            host.remove_layers(Layer::is_decoration);
            let content_width = (bounds_width - self.config.insets.left - self.config.insets.right)
                .max(1.0);
            self.draw_quote_bars(styled, layout, host);
            if self.config.heading_divider_enabled {
                self.draw_heading_dividers(styled, layout, content_width, host);
            }
            if self.config.inline_code_overlay.enabled {
                self.draw_inline_code(styled, layout, host);
            }
            self.draw_thematic_breaks(styled, layout, content_width, host);
        });
    }

    fn draw_quote_bars<L, H>(&self, styled: &StyledString, layout: &L, host: &mut H)
    where
        L: TextLayout + ?Sized,
        H: LayerHost,
    {
        // Index `level - 1` holds the union of the fragments of the open quote at `level`.
        let mut unions: SmallVec<[Option<Rect>; 4]> = SmallVec::new();
        let mut active = 0_usize;

        for fragment in layout.fragments() {
            let start = fragment.text_range.start;
            if start >= styled.len() {
                continue;
            }
            let depth = styled
                .attributes_at(start)
                .map_or(0, |attrs| usize::from(attrs.tags.quote_level));

            for level in depth + 1..=active {
                if let Some(rect) = unions.get_mut(level - 1).and_then(Option::take) {
                    self.add_quote_bar(rect, level, host);
                }
            }
            if unions.len() < depth {
                unions.resize(depth, None);
            }
            for union in &mut unions[..depth] {
                *union = Some(match union {
                    Some(rect) => rect.union(fragment.frame),
                    None => fragment.frame,
                });
            }
            active = depth;
        }

        for (ix, union) in unions.into_iter().enumerate() {
            if let Some(rect) = union {
                self.add_quote_bar(rect, ix + 1, host);
            }
        }
    }

    fn add_quote_bar<H: LayerHost>(&self, union: Rect, level: usize, host: &mut H) {
        if union.height() <= 0.0 {
            trace!("skipping quote bar {level}: empty geometry");
            return;
        }
        let x = self.config.insets.left + QUOTE_BAR_OFFSET + (level - 1) as f64 * QUOTE_BAR_STEP;
        host.add_layer(Layer {
            name: format!("{QUOTE_BAR}-{level}"),
            frame: Rect::new(x, union.y0, x + QUOTE_BAR_WIDTH, union.y1),
            color: self.config.quote_bar_color,
            corner_radius: 0.0,
        });
    }

    fn draw_heading_dividers<L, H>(
        &self,
        styled: &StyledString,
        layout: &L,
        content_width: f64,
        host: &mut H,
    ) where
        L: TextLayout + ?Sized,
        H: LayerHost,
    {
        let headings = styled.ranges_where(|attrs| {
            let level = attrs.tags.heading_level;
            (level == 1 || level == 2).then_some(level)
        });
        for (range, level) in headings {
            let Some(union) = union_of(layout.selection_rects(range)) else {
                trace!("skipping heading divider {level}: empty geometry");
                continue;
            };
            let left = self.config.insets.left;
            let y = union.y1 + HEADING_DIVIDER_GAP;
            host.add_layer(Layer {
                name: format!("{HEADING_DIVIDER}-{level}"),
                frame: Rect::new(left, y, left + content_width, y + self.config.hairline()),
                color: self.config.heading_divider_color,
                corner_radius: 0.0,
            });
        }
    }

    fn draw_inline_code<L, H>(&self, styled: &StyledString, layout: &L, host: &mut H)
    where
        L: TextLayout + ?Sized,
        H: LayerHost,
    {
        let overlay = &self.config.inline_code_overlay;
        let spans = styled.ranges_where(|attrs| attrs.tags.inline_code.then_some(()));
        for (range, ()) in spans {
            let color = overlay
                .color
                .or_else(|| {
                    let attrs = styled.attributes_at(range.start)?;
                    attrs.tags.inline_code_background.or(attrs.background)
                })
                .unwrap_or(palette::TERTIARY_FILL);
            let rects = layout.selection_rects(range.clone());
            if rects.is_empty() {
                trace!("skipping inline code at {}: empty geometry", range.start);
            }
            for (ix, rect) in rects.into_iter().enumerate() {
                host.add_layer(Layer {
                    name: format!("{INLINE_CODE}-{}-{ix}", range.start),
                    frame: rect.inflate(overlay.padding, overlay.padding * 0.4),
                    color,
                    corner_radius: overlay.corner_radius,
                });
            }
        }
    }

    fn draw_thematic_breaks<L, H>(
        &self,
        styled: &StyledString,
        layout: &L,
        content_width: f64,
        host: &mut H,
    ) where
        L: TextLayout + ?Sized,
        H: LayerHost,
    {
        let anchors = styled.ranges_where(|attrs| attrs.tags.thematic_break.then_some(()));
        let thickness = self
            .config
            .hairline()
            .max(self.config.thematic_break_thickness);
        for (range, ()) in anchors {
            let Some(frame) = fragment_containing(layout, range.start) else {
                trace!("skipping thematic break at {}: no fragment", range.start);
                continue;
            };
            let left = self.config.insets.left;
            let y = frame.center().y;
            host.add_layer(Layer {
                name: format!("{THEMATIC_BREAK}-{}", frame.y0),
                frame: Rect::new(left, y, left + content_width, y + thickness),
                color: self.config.thematic_break_color,
                corner_radius: 0.0,
            });
        }
    }
}

fn union_of(rects: Vec<Rect>) -> Option<Rect> {
    rects
        .into_iter()
        .filter(|rect| !rect.is_zero_area())
        .reduce(|a, b| a.union(b))
}

fn fragment_containing<L: TextLayout + ?Sized>(layout: &L, index: usize) -> Option<Rect> {
    layout
        .fragments()
        .iter()
        .find(|fragment| fragment.text_range.contains(&index))
        .map(|fragment| fragment.frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MonospaceEngine;
    use crate::{
        ConcreteAttributes, DecorationTags, LayoutConstraint, ResolvedFont, TextEngine,
        TextInsets,
    };

    fn attrs(tags: DecorationTags) -> ConcreteAttributes {
        ConcreteAttributes {
            tags,
            ..ConcreteAttributes::plain(ResolvedFont::monospace(10.0), Rgba8::from_u8_array([0, 0, 0, 0]))
        }
    }

    fn quoted(level: u8) -> ConcreteAttributes {
        attrs(DecorationTags {
            quote_level: level,
            ..DecorationTags::default()
        })
    }

    fn redraw(styled: &StyledString, config: DecorationConfig, host: &mut LayerStack) {
        let layout = MonospaceEngine::new().layout(styled, LayoutConstraint::wrapping(200.0));
        DecorationOverlay::new(config).redraw(styled, &layout, 200.0, host);
    }

    #[test]
    fn nested_quotes_get_one_bar_per_level() {
        let mut styled = StyledString::new();
        styled.push_str("plain\n", quoted(0));
        styled.push_str("outer\n", quoted(1));
        styled.push_str("inner\n", quoted(2));
        styled.push_str("outer again\n", quoted(1));
        styled.push_str("plain", quoted(0));

        let mut host = LayerStack::new();
        redraw(&styled, DecorationConfig::default(), &mut host);
        let bars: Vec<&Layer> = host.layers_named(QUOTE_BAR).collect();
        assert_eq!(bars.len(), 2);

        let inner = bars.iter().find(|bar| bar.name == "markdownQuoteBar-2").unwrap();
        let outer = bars.iter().find(|bar| bar.name == "markdownQuoteBar-1").unwrap();
        assert_eq!(outer.frame.x0, 6.0);
        assert_eq!(inner.frame.x0 - outer.frame.x0, QUOTE_BAR_STEP);
        assert_eq!(outer.frame.width(), QUOTE_BAR_WIDTH);
        assert_eq!(outer.frame.y0, 12.0);
        assert_eq!(outer.frame.y1, 48.0);
        assert_eq!(inner.frame.y0, 24.0);
        assert_eq!(inner.frame.y1, 36.0);
    }

    #[test]
    fn separate_quotes_get_separate_bars() {
        let mut styled = StyledString::new();
        styled.push_str("a\n", quoted(1));
        styled.push_str("b\n", quoted(0));
        styled.push_str("c", quoted(1));
        let mut host = LayerStack::new();
        redraw(&styled, DecorationConfig::default(), &mut host);
        assert_eq!(host.layers_named(QUOTE_BAR).count(), 2);
    }

    #[test]
    fn redraw_is_idempotent_and_keeps_host_layers() {
        let mut styled = StyledString::new();
        styled.push_str("quote\n", quoted(1));
        styled.push_str(
            "\u{200B}",
            attrs(DecorationTags {
                thematic_break: true,
                ..DecorationTags::default()
            }),
        );
        let mut host = LayerStack::new();
        host.add_layer(Layer {
            name: "selection".into(),
            frame: Rect::new(0.0, 0.0, 1.0, 1.0),
            color: Rgba8::from_u8_array([0, 0, 0, 0]),
            corner_radius: 0.0,
        });

        redraw(&styled, DecorationConfig::default(), &mut host);
        let first = host.layers().to_vec();
        redraw(&styled, DecorationConfig::default(), &mut host);
        assert_eq!(host.layers(), first.as_slice());
        assert_eq!(host.layers()[0].name, "selection");
        assert_eq!(host.layers().len(), 3);
        assert_eq!(host.animated_mutations(), 1, "only the host's own layer was animated");
    }

    #[test]
    fn thematic_break_spans_content_width() {
        let mut styled = StyledString::new();
        styled.push_str("a\n", quoted(0));
        styled.push_str(
            "\u{200B}",
            attrs(DecorationTags {
                thematic_break: true,
                ..DecorationTags::default()
            }),
        );
        let config = DecorationConfig {
            insets: TextInsets {
                left: 10.0,
                right: 20.0,
            },
            thematic_break_thickness: 0.25,
            display_scale: 2.0,
            ..DecorationConfig::default()
        };
        let mut host = LayerStack::new();
        redraw(&styled, config, &mut host);
        let rule = host.layers_named(THEMATIC_BREAK).next().unwrap();
        assert_eq!(rule.name, "markdownThematicBreak-12");
        assert_eq!(rule.frame.x0, 10.0);
        assert_eq!(rule.frame.width(), 170.0);
        assert_eq!(rule.frame.y0, 18.0);
        assert_eq!(rule.frame.height(), 0.5, "never thinner than a hairline");
    }

    #[test]
    fn inline_code_follows_wrapping() {
        let code = attrs(DecorationTags {
            inline_code: true,
            inline_code_background: Some(Rgba8 {
                r: 9,
                g: 9,
                b: 9,
                a: 9,
            }),
            ..DecorationTags::default()
        });
        let mut styled = StyledString::new();
        styled.push_str("see ", quoted(0));
        // 38 characters of 6pt do not fit next to "see " and wrap once more after 33.
        styled.push_str("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", code);
        let mut host = LayerStack::new();
        redraw(&styled, DecorationConfig::default(), &mut host);
        let layers: Vec<&Layer> = host.layers_named(INLINE_CODE).collect();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name, "markdownInlineCode-4-0");
        assert_eq!(layers[1].name, "markdownInlineCode-4-1");
        assert_eq!(layers[0].color.r, 9);
        assert_eq!(layers[0].corner_radius, 4.0);
        assert_eq!(layers[0].frame.x0, -2.0);
        assert!((layers[0].frame.y0 - 11.2).abs() < 1e-9);
        assert_eq!(layers[0].frame.width(), 33.0 * 6.0 + 4.0);
        assert_eq!(layers[1].frame.width(), 5.0 * 6.0 + 4.0);
    }

    #[test]
    fn disabled_decorations_are_not_drawn() {
        let heading = attrs(DecorationTags {
            heading_level: 1,
            inline_code: true,
            ..DecorationTags::default()
        });
        let styled = StyledString::from_text("Title", heading);
        let mut config = DecorationConfig::default();
        config.inline_code_overlay.enabled = false;
        let mut host = LayerStack::new();
        redraw(&styled, config.clone(), &mut host);
        assert!(host.layers().is_empty());

        config.heading_divider_enabled = true;
        redraw(&styled, config, &mut host);
        let divider = host.layers_named(HEADING_DIVIDER).next().unwrap();
        assert_eq!(divider.name, "markdownHeadingDivider-1");
        assert_eq!(divider.frame.y0, 12.0 + HEADING_DIVIDER_GAP);
        assert_eq!(divider.frame.height(), 1.0);
    }
}
