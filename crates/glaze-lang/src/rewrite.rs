//! Span-based rewriting over the lossless token stream.

use crate::lexer::{Lexer, Span, Token, TokenKind};

/// Tokens of a source text, indexed by significant (non-trivia) position.
pub(crate) struct TokenView {
    tokens: Vec<Token>,
    significant: Vec<usize>,
}

impl TokenView {
    pub fn new(source: &str) -> Self {
        Self::from_tokens(Lexer::new(source).tokenize())
    }

    /// View where comment markers are plain operators.
    pub fn without_comments(source: &str) -> Self {
        Self::from_tokens(Lexer::without_comments(source).tokenize())
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia() && t.kind != TokenKind::Eof)
            .map(|(i, _)| i)
            .collect();
        Self { tokens, significant }
    }

    pub fn len(&self) -> usize {
        self.significant.len()
    }

    pub fn kind(&self, k: usize) -> Option<&TokenKind> {
        self.significant.get(k).map(|&i| &self.tokens[i].kind)
    }

    pub fn is(&self, k: usize, kind: &TokenKind) -> bool {
        self.kind(k) == Some(kind)
    }

    pub fn ident(&self, k: usize) -> Option<&str> {
        match self.kind(k) {
            Some(TokenKind::Identifier(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_ident(&self, k: usize, word: &str) -> bool {
        self.ident(k) == Some(word)
    }

    pub fn number(&self, k: usize) -> Option<&str> {
        match self.kind(k) {
            Some(TokenKind::NumberLiteral(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn span(&self, k: usize) -> Span {
        self.tokens[self.significant[k]].span
    }

    /// True when significant tokens `k` and `k + 1` touch with nothing between them.
    pub fn adjacent(&self, k: usize) -> bool {
        k + 1 < self.len() && self.significant[k] + 1 == self.significant[k + 1]
    }

    /// True when only whitespace (no comments) separates `k` and `k + 1`.
    pub fn whitespace_between(&self, k: usize) -> bool {
        k + 1 < self.len()
            && self.tokens[self.significant[k] + 1..self.significant[k + 1]]
                .iter()
                .all(|t| t.kind == TokenKind::Whitespace)
    }

    /// True when every gap between significant tokens `from..=to` is whitespace only.
    pub fn whitespace_run(&self, from: usize, to: usize) -> bool {
        to < self.len() && (from..to).all(|k| self.whitespace_between(k))
    }

    /// End offset of token `k` extended over an immediately following whitespace run.
    pub fn end_with_trailing_whitespace(&self, k: usize) -> usize {
        let next = self.significant[k] + 1;
        match self.tokens.get(next) {
            Some(t) if t.kind == TokenKind::Whitespace => t.span.end,
            _ => self.span(k).end,
        }
    }
}

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// A set of non-overlapping replacements applied in one pass.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    edits: Vec<Edit>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, start: usize, end: usize, replacement: impl Into<String>) {
        self.edits.push(Edit {
            start,
            end,
            replacement: replacement.into(),
        });
    }

    /// Apply all edits to `source`. Every replaced region is followed by as
    /// many newlines as it contained, so line numbers after it do not move.
    /// When two edits overlap the earlier one wins.
    pub fn apply(mut self, source: &str) -> String {
        self.edits.sort_by_key(|e| e.start);

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in self.edits {
            if edit.start < cursor {
                continue;
            }
            out.push_str(&source[cursor..edit.start]);
            out.push_str(&edit.replacement);
            let newlines = source[edit.start..edit.end].matches('\n').count();
            out.extend(std::iter::repeat('\n').take(newlines));
            cursor = edit.end;
        }
        out.push_str(&source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_skips_trivia() {
        let view = TokenView::new("uniform /* c */ float x ;");
        assert_eq!(view.len(), 4);
        assert!(view.is_ident(0, "uniform"));
        assert!(view.is_ident(1, "float"));
        assert!(view.is(3, &TokenKind::Semicolon));
        assert!(!view.whitespace_between(0));
        assert!(view.whitespace_between(1));
    }

    #[test]
    fn test_adjacent() {
        let view = TokenView::new("tex.eval (p)");
        assert!(view.adjacent(0));
        assert!(view.adjacent(1));
        assert!(!view.adjacent(2));
    }

    #[test]
    fn test_edits_preserve_line_count() {
        let src = "a\nuniform float\n  iTime;\nb\n";
        let start = src.find("uniform").unwrap();
        let end = src.find(';').unwrap() + 1;
        let mut edits = Edits::new();
        edits.replace(start, end, "/* iTime removed */");
        let out = edits.apply(src);
        assert_eq!(out, "a\n/* iTime removed */\n\nb\n");
        assert_eq!(out.lines().count(), src.lines().count());
    }

    #[test]
    fn test_overlapping_edits_keep_first() {
        let mut edits = Edits::new();
        edits.replace(0, 3, "X");
        edits.replace(1, 2, "Y");
        assert_eq!(edits.apply("abcd"), "Xd");
    }
}
