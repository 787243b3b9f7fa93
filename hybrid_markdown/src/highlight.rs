// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Syntax highlighting of code blocks.

use log::debug;
use peniko::color::Rgba8;

use crate::{AttributeSet, AttributedString, ResolvedFont, RichText};

/// Attributes of highlighted code. Missing values are filled in from the ambient text style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CodeAttributes {
    /// The font.
    pub font: Option<ResolvedFont>,
    /// The text colour.
    pub color: Option<Rgba8>,
    /// Kerning, in points.
    pub kerning: Option<f32>,
}

/// Partially attributed code, as produced by a highlighter for native code blocks.
pub type HighlightedCode = AttributedString<CodeAttributes>;

/// Provides syntax highlighting to code blocks.
pub trait CodeSyntaxHighlighter {
    /// Highlights `code` as semantic rich text.
    fn highlight_code(&self, code: &str, language: Option<&str>) -> RichText;

    /// Highlights `code` for a native code block, or returns `None` if only
    /// [`CodeSyntaxHighlighter::highlight_code`] is supported.
    fn highlight_code_styled(&self, code: &str, language: Option<&str>) -> Option<HighlightedCode> {
        let _ = (code, language);
        None
    }

    /// Use the native code block whenever a styled form is available.
    fn prefer_styled_when_available(&self) -> bool {
        false
    }
}

/// A highlighter that returns unstyled code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlainTextHighlighter {
    /// See [`CodeSyntaxHighlighter::prefer_styled_when_available`].
    pub prefer_styled: bool,
}

impl PlainTextHighlighter {
    /// Creates a highlighter.
    pub fn new(prefer_styled: bool) -> Self {
        Self { prefer_styled }
    }
}

impl CodeSyntaxHighlighter for PlainTextHighlighter {
    fn highlight_code(&self, code: &str, _language: Option<&str>) -> RichText {
        RichText::from_text(code, AttributeSet::new())
    }

    fn highlight_code_styled(
        &self,
        code: &str,
        _language: Option<&str>,
    ) -> Option<HighlightedCode> {
        Some(HighlightedCode::from_text(code, CodeAttributes::default()))
    }

    fn prefer_styled_when_available(&self) -> bool {
        self.prefer_styled
    }
}

/// The rendering chosen for one code block.
#[derive(Clone, Debug, PartialEq)]
pub enum HighlightedBlock {
    /// Rendered by a native code block view.
    Styled(HighlightedCode),
    /// Rendered declaratively by the host.
    Semantic(RichText),
}

/// The content of a code block: one trailing newline is dropped.
pub fn code_block_content(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

/// Highlights a code block, choosing the native path when the highlighter prefers it and can
/// provide a styled form.
pub fn highlight_block<H: CodeSyntaxHighlighter + ?Sized>(
    highlighter: &H,
    content: &str,
    language: Option<&str>,
) -> HighlightedBlock {
    let code = code_block_content(content);
    if highlighter.prefer_styled_when_available() {
        match highlighter.highlight_code_styled(code, language) {
            Some(styled) => return HighlightedBlock::Styled(styled),
            None => debug!("no styled highlighting for {language:?}, using semantic text"),
        }
    }
    HighlightedBlock::Semantic(highlighter.highlight_code(code, language))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SemanticOnly;

    impl CodeSyntaxHighlighter for SemanticOnly {
        fn highlight_code(&self, code: &str, _language: Option<&str>) -> RichText {
            RichText::from_text(code, AttributeSet::new())
        }
    }

    #[test]
    fn one_trailing_newline_is_dropped() {
        assert_eq!(code_block_content("fn main() {}\n"), "fn main() {}");
        assert_eq!(code_block_content("a\n\n"), "a\n");
        assert_eq!(code_block_content("a"), "a");
    }

    #[test]
    fn plain_text_supports_both_paths() {
        let highlighter = PlainTextHighlighter::new(false);
        assert_eq!(highlighter.highlight_code("x", None).as_str(), "x");
        let styled = highlighter.highlight_code_styled("x", Some("rust")).unwrap();
        assert_eq!(styled.runs()[0].attributes, CodeAttributes::default());
    }

    #[test]
    fn path_selection() {
        let content = "let x = 1;\n";
        assert!(matches!(
            highlight_block(&PlainTextHighlighter::new(false), content, None),
            HighlightedBlock::Semantic(text) if text.as_str() == "let x = 1;"
        ));
        assert!(matches!(
            highlight_block(&PlainTextHighlighter::new(true), content, None),
            HighlightedBlock::Styled(code) if code.as_str() == "let x = 1;"
        ));
        assert!(!SemanticOnly.prefer_styled_when_available());
        assert!(SemanticOnly.highlight_code_styled(content, None).is_none());
        assert!(matches!(
            highlight_block(&SemanticOnly, content, None),
            HighlightedBlock::Semantic(_)
        ));
    }
}
