// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hybrid Markdown rendering: flowing text through a native text engine, everything else
//! through the host.
//!
//! A parsed Markdown document (a tree of [`BlockNode`]s) is rendered in stages:
//!
//! - [`segment()`] splits the top-level blocks into *text runs* of flowing blocks (paragraphs,
//!   headings, quotes, lists, thematic breaks) and *declarative* blocks (code blocks, tables,
//!   HTML, paragraphs with images) that the host renders itself.
//! - [`flatten`](flatten::flatten) turns each text run into one [`RichText`]: text tagged with a
//!   sparse [`AttributeSet`] per run, including Markdown tags like the quote level.
//! - [`resolve`](typography::resolve) turns semantic rich text into a [`StyledString`] of
//!   [`ConcreteAttributes`]: resolved fonts, colours and paragraph styles.
//! - A [`TextEngine`] lays the styled string out; [`bridge::TextRunView`] caches its height.
//! - After each layout pass, [`decoration::DecorationOverlay`] reads the layout geometry and draws
//!   block quote bars, heading dividers, inline code backgrounds and thematic break rules as
//!   named layers.
//!
//! [`document::HybridDocument`] runs the whole pipeline for a document. This crate does not parse
//! Markdown and does not shape text: see `hybrid_markdown_cmark` and `hybrid_markdown_parley`.
//!
//! ## Indices
//!
//! All ranges are byte indices into UTF-8 text, on character boundaries.
//!
//! ## Example
//!
//! ```
//! use hybrid_markdown::testing::MonospaceEngine;
//! use hybrid_markdown::{BlockNode, InlineNode, RenderEnvironment, TextLayout, TextEngine};
//! use hybrid_markdown::{LayoutConstraint, flatten, typography};
//!
//! let blocks = [BlockNode::Blockquote(vec![BlockNode::Paragraph(vec![
//!     InlineNode::Text("quoted".into()),
//! ])])];
//! let env = RenderEnvironment::default();
//! let mut engine = MonospaceEngine::new();
//!
//! let rich = flatten::flatten(&blocks, &flatten::FlattenContext::new(&env));
//! assert_eq!(rich.runs()[0].attributes.quote_level(), 1);
//!
//! let styled = typography::resolve(&rich, &env, &mut engine);
//! let layout = engine.layout(&styled, LayoutConstraint::wrapping(200.0));
//! assert_eq!(layout.fragments().len(), 1);
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("hybrid_markdown requires either the `std` or `libm` feature to be enabled");

extern crate alloc;

pub mod bridge;
pub mod decoration;
pub mod document;
pub mod flatten;
pub mod highlight;
pub mod style;
pub mod testing;
pub mod typography;

mod attributed;
mod attributes;
mod block;
mod config;
mod error;
mod layout;
mod segment;

pub use attributed::{AttributedString, Run};
pub use attributes::{
    Attribute, AttributeSet, CapsVariant, DEFAULT_FONT_SIZE, FamilyVariant, FontFamily,
    FontProperties, FontStyle, FontWeight, RichText,
};
pub use block::{
    BlockNode, ColorScheme, ColumnAlignment, InlineNode, ListItem, SoftBreakMode, TableCell,
    TableRow, TaskListItem, filter_images_matching,
};
pub use config::{
    DecorationConfig, HeadingMetrics, HeadingMetricsTable, HeadingSize, HybridConfig,
    InlineCodeOverlay, RenderEnvironment, TextInsets,
};
pub use error::{Error, ErrorKind};
pub use layout::{
    FontSystem, LayoutConstraint, LayoutFragment, LineBox, ParagraphLayout, ParagraphSource,
    StackedLayout, TextEngine, TextLayout, stack_paragraphs,
};
pub use segment::{Segment, segment};
pub use style::{FontSize, StyleDeclaration, TextStyle, TextTheme};
pub use typography::{
    ConcreteAttributes, DecorationTags, LineBreakMode, ParagraphStyle, ResolvedFamily,
    ResolvedFont, StyledString,
};
