// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions shared across tests.

use hybrid_markdown::bridge::TextRunView;
use hybrid_markdown::decoration::Layer;
use hybrid_markdown::flatten::{FlattenContext, flatten};
use hybrid_markdown::testing::{MonospaceEngine, MonospaceParagraph};
use hybrid_markdown::{BlockNode, RenderEnvironment, RichText, StackedLayout};

/// Width of the text view in most tests.
pub(crate) const VIEW_WIDTH: f32 = 320.0;

/// Parses `markdown` and returns its blocks, asserting it forms exactly one text run.
pub(crate) fn text_run_blocks(markdown: &str) -> Vec<BlockNode> {
    let blocks = hybrid_markdown_cmark::parse(markdown);
    let segments = hybrid_markdown::segment(&blocks);
    assert_eq!(segments.len(), 1, "expected one text run for {markdown:?}");
    segments[0].blocks().to_vec()
}

/// Flattens `markdown` under the default environment.
pub(crate) fn flattened(markdown: &str) -> RichText {
    let env = RenderEnvironment::default();
    flatten(&text_run_blocks(markdown), &FlattenContext::new(&env))
}

/// A text run view rendered from Markdown, after one layout pass.
pub(crate) struct Rendered {
    pub(crate) view: TextRunView,
    pub(crate) layout: StackedLayout<MonospaceParagraph>,
    pub(crate) engine: MonospaceEngine,
}

impl Rendered {
    pub(crate) fn new(markdown: &str, env: &RenderEnvironment) -> Self {
        let mut engine = MonospaceEngine::new();
        let mut view = TextRunView::with_blocks(&text_run_blocks(markdown), env, &mut engine);
        let layout = view.layout_pass(VIEW_WIDTH, &mut engine);
        Self {
            view,
            layout,
            engine,
        }
    }

    /// The decoration layer called `name`.
    pub(crate) fn layer(&self, name: &str) -> &Layer {
        self.view
            .layers()
            .layers()
            .iter()
            .find(|layer| layer.name == name)
            .unwrap_or_else(|| panic!("no layer {name:?} in {:#?}", self.view.layers()))
    }

    /// The number of layers whose name starts with `prefix`.
    pub(crate) fn count(&self, prefix: &str) -> usize {
        self.view.layers().layers_named(prefix).count()
    }

    /// The byte offset of `needle` in the rendered text.
    pub(crate) fn offset_of(&self, needle: &str) -> usize {
        self.view
            .content()
            .as_str()
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not rendered"))
    }
}
