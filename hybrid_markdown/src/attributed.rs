// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text with attributes stored as a flat partition of runs.
//!
//! Unlike general attributed text, runs never overlap and never leave gaps: every byte of the
//! text belongs to exactly one run. Adjacent runs with equal attributes are merged as they are
//! appended, so the partition is always maximal.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::Error;

/// One run of an [`AttributedString`].
#[derive(Clone, Debug, PartialEq)]
pub struct Run<A> {
    /// The byte range of the run.
    pub range: Range<usize>,
    /// The attributes of every byte in `range`.
    pub attributes: A,
}

/// A string partitioned into attributed runs.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributedString<A> {
    text: String,
    runs: Vec<Run<A>>,
}

impl<A> Default for AttributedString<A> {
    fn default() -> Self {
        Self {
            text: String::new(),
            runs: Vec::new(),
        }
    }
}

impl<A: Clone + PartialEq> AttributedString<A> {
    /// Creates an empty string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a string with a single run covering `text`.
    pub fn from_text(text: &str, attributes: A) -> Self {
        let mut out = Self::new();
        out.push_str(text, attributes);
        out
    }

    /// The underlying text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The length of the text, in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The runs, in text order.
    pub fn runs(&self) -> &[Run<A>] {
        &self.runs
    }

    /// Appends `text` with `attributes`, merging with the last run when the attributes match.
    ///
    /// Empty text is ignored so that runs are never empty.
    pub fn push_str(&mut self, text: &str, attributes: A) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        let end = self.text.len();
        match self.runs.last_mut() {
            Some(last) if last.attributes == attributes => last.range.end = end,
            _ => self.runs.push(Run {
                range: start..end,
                attributes,
            }),
        }
    }

    /// Appends all runs of `other`.
    pub fn append(&mut self, other: Self) {
        for run in other.runs {
            self.push_str(&other.text[run.range], run.attributes);
        }
    }

    /// Returns the attributes of the run containing byte `index`.
    pub fn attributes_at(&self, index: usize) -> Option<&A> {
        self.run_index_at(index).map(|ix| &self.runs[ix].attributes)
    }

    /// Returns the index of the run containing byte `index`.
    pub fn run_index_at(&self, index: usize) -> Option<usize> {
        self.runs
            .binary_search_by(|run| {
                if index < run.range.start {
                    core::cmp::Ordering::Greater
                } else if index >= run.range.end {
                    core::cmp::Ordering::Less
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .ok()
    }

    /// Rewrites the attributes of every run, then re-merges equal neighbours.
    pub fn update_all(&mut self, mut f: impl FnMut(&mut A)) {
        for run in &mut self.runs {
            f(&mut run.attributes);
        }
        self.coalesce();
    }

    /// Rewrites the attributes of the bytes in `range`, splitting runs at its boundaries.
    pub fn update_range(
        &mut self,
        range: Range<usize>,
        mut f: impl FnMut(&mut A),
    ) -> Result<(), Error> {
        Error::check(&self.text, range.start, range.end)?;
        if range.is_empty() {
            return Ok(());
        }
        self.split_at(range.start);
        self.split_at(range.end);
        for run in &mut self.runs {
            if run.range.start >= range.start && run.range.end <= range.end {
                f(&mut run.attributes);
            }
        }
        self.coalesce();
        Ok(())
    }

    /// Copies the bytes in `range` with their attributes.
    pub fn slice(&self, range: Range<usize>) -> Result<Self, Error> {
        Error::check(&self.text, range.start, range.end)?;
        let mut out = Self::new();
        for run in &self.runs {
            let start = run.range.start.max(range.start);
            let end = run.range.end.min(range.end);
            if start < end {
                out.push_str(&self.text[start..end], run.attributes.clone());
            }
        }
        Ok(out)
    }

    /// Enumerates maximal ranges over which `key` yields the same `Some` value.
    ///
    /// Ranges where `key` yields `None` are skipped.
    pub fn ranges_where<K: PartialEq>(
        &self,
        mut key: impl FnMut(&A) -> Option<K>,
    ) -> Vec<(Range<usize>, K)> {
        let mut out: Vec<(Range<usize>, K)> = Vec::new();
        for run in &self.runs {
            let Some(value) = key(&run.attributes) else {
                continue;
            };
            match out.last_mut() {
                Some((range, last)) if range.end == run.range.start && *last == value => {
                    range.end = run.range.end;
                }
                _ => out.push((run.range.clone(), value)),
            }
        }
        out
    }

    /// Returns `true` if the runs tile the text exactly, with no empty runs.
    pub fn is_partition(&self) -> bool {
        let mut expected = 0;
        for run in &self.runs {
            if run.range.start != expected || run.range.is_empty() {
                return false;
            }
            expected = run.range.end;
        }
        expected == self.text.len()
    }

    fn split_at(&mut self, index: usize) {
        let Some(ix) = self.run_index_at(index) else {
            return;
        };
        let run = &mut self.runs[ix];
        if run.range.start == index {
            return;
        }
        let tail = Run {
            range: index..run.range.end,
            attributes: run.attributes.clone(),
        };
        run.range.end = index;
        self.runs.insert(ix + 1, tail);
    }

    fn coalesce(&mut self) {
        let mut merged: Vec<Run<A>> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.attributes == run.attributes => last.range.end = run.range.end,
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}
