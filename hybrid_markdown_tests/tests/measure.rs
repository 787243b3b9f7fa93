// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hybrid_markdown::RenderEnvironment;
use hybrid_markdown::bridge::TextRunView;
use hybrid_markdown::testing::MonospaceEngine;

use crate::util::text_run_blocks;

#[test]
fn measure_height_is_cached_per_width_and_content() {
    let blocks = text_run_blocks("A paragraph long enough to wrap at narrow widths.\n");
    let env = RenderEnvironment::default();
    let mut engine = MonospaceEngine::new();
    let mut view = TextRunView::with_blocks(&blocks, &env, &mut engine);

    let wide = view.height_for_width(600.0, &mut engine);
    assert_eq!(view.height_for_width(600.0, &mut engine), wide);
    assert_eq!(engine.layout_calls(), 1);

    let narrow = view.height_for_width(100.0, &mut engine);
    assert!(narrow > wide);
    assert_eq!(engine.layout_calls(), 2);

    // Same blocks, same measurement.
    assert!(!view.update(&blocks, &env, &mut engine));
    view.height_for_width(100.0, &mut engine);
    assert_eq!(engine.layout_calls(), 2);

    let other = text_run_blocks("Different text.\n");
    assert!(view.update(&other, &env, &mut engine));
    assert!(!view.cache().is_valid());
    view.height_for_width(100.0, &mut engine);
    assert_eq!(engine.layout_calls(), 3);
}

#[test]
fn measure_heights_are_whole_points() {
    let blocks = text_run_blocks("# Heading\n\ntext\n");
    let env = RenderEnvironment::default();
    let mut engine = MonospaceEngine::new();
    let mut view = TextRunView::with_blocks(&blocks, &env, &mut engine);
    let height = view.height_for_width(250.0, &mut engine);
    assert_eq!(height, height.ceil());
    assert!(height > 0.0);
}

#[test]
fn measure_clamps_tiny_widths() {
    let blocks = text_run_blocks("text\n");
    let env = RenderEnvironment::default();
    let mut engine = MonospaceEngine::new();
    let mut view = TextRunView::with_blocks(&blocks, &env, &mut engine);
    let zero = view.height_for_width(0.0, &mut engine);
    let negative = view.height_for_width(-20.0, &mut engine);
    assert_eq!(zero, negative);
    assert_eq!(engine.layout_calls(), 1, "both widths clamp to one point");
}
