// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the end-to-end test suite for `hybrid_markdown`.
//!
//! Every test starts from Markdown text, parsed by `hybrid_markdown_cmark`, and lays text out with
//! the deterministic [`MonospaceEngine`](hybrid_markdown::testing::MonospaceEngine), so geometry
//! can be asserted exactly.
//!
//! - `util` holds the shared render helpers.
//! - Put the "topic" of a test at the start of its name, for example `quote_bars_nest`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod measure;
mod util;
