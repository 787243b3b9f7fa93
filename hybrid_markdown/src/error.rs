// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Error returned when a byte range cannot be used with an [`AttributedString`].
///
/// Carries a non-exhaustive [`ErrorKind`] together with the attempted range and the length of
/// the text at the time of failure.
///
/// [`AttributedString`]: crate::AttributedString
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    start: usize,
    end: usize,
    len: usize,
    /// The offending index for boundary errors.
    index: Option<usize>,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "the length belongs to the text that was sliced, not to the error"
)]
impl Error {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The start byte index of the range provided by the caller.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The end byte index (exclusive) of the range provided by the caller.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The length in bytes of the text at the time of the error.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The index that was not on a character boundary, for [`ErrorKind::NotOnCharBoundary`].
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Validates `start..end` against `text`.
    pub(crate) fn check(text: &str, start: usize, end: usize) -> Result<(), Self> {
        let len = text.len();
        let base = Self {
            kind: ErrorKind::InvalidRange,
            start,
            end,
            len,
            index: None,
        };
        if start > end {
            return Err(base);
        }
        if end > len {
            return Err(Self {
                kind: ErrorKind::InvalidBounds,
                ..base
            });
        }
        for index in [start, end] {
            if !text.is_char_boundary(index) {
                return Err(Self {
                    kind: ErrorKind::NotOnCharBoundary,
                    index: Some(index),
                    ..base
                });
            }
        }
        Ok(())
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::InvalidBounds => write!(
                f,
                "range {}..{} out of bounds for len {}",
                self.start, self.end, self.len
            ),
            ErrorKind::InvalidRange => {
                write!(f, "invalid range {}..{}: start > end", self.start, self.end)
            }
            ErrorKind::NotOnCharBoundary => match self.index {
                Some(index) => write!(
                    f,
                    "range {}..{}: index {} not on UTF-8 boundary",
                    self.start, self.end, index
                ),
                None => write!(
                    f,
                    "range {}..{} not on UTF-8 boundary",
                    self.start, self.end
                ),
            },
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The range extends past the end of the text.
    InvalidBounds,
    /// The range had `start > end`.
    InvalidRange,
    /// Either endpoint was not on a UTF-8 character boundary.
    NotOnCharBoundary,
}
