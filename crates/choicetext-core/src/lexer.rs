//! Marker-aware tokenizer with SIMD-accelerated literal scanning.
//!
//! Tokenizing runs in three passes over an owned token buffer:
//!
//! 1. **Labeling.** A greedy left-to-right scan. A start marker is always
//!    recognised; end and choice markers only while a group is open, so
//!    outside any group they are ordinary text.
//! 2. **Correction.** Labeling never looks ahead, so a start marker that is
//!    never closed was not really opening a group. The last `open_starts`
//!    start tokens (in stream order) are turned back into literal text, and
//!    any choice token left outside every group by that rewrite follows it.
//! 3. **Grouping.** Adjacent literal tokens are merged into a single run.
//!
//! The resulting stream is always balanced: every end and choice token sits
//! inside a group opened by an earlier start token.
//!
//! # Performance
//!
//! - Zero-copy: literal text borrows directly from the input
//! - `memchr` skips over bytes that cannot begin any marker

use log::{debug, trace};
use memchr::{memchr, memchr3};
use serde::Serialize;

use crate::config::MarkerConfig;
use crate::span::Span;

/// What a token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Opens a group.
    Start,
    /// Closes the innermost open group.
    End,
    /// Separates two alternatives of the innermost open group.
    Choice,
    /// Plain text copied to the output unchanged.
    Literal(&'a str),
}

/// A single token with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token payload.
    pub kind: TokenKind<'a>,
    /// Byte span in the original input.
    pub span: Span,
}

impl<'a> Token<'a> {
    #[inline]
    fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    /// Check if this token is literal text.
    #[inline(always)]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::Literal(_))
    }

    /// The literal text, if this is a literal token.
    #[inline]
    pub fn text(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// Number of marker tokens demoted to literal text by the correction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Corrections {
    /// Start markers that never found a matching end marker.
    pub starts: usize,
    /// Choice markers that ended up outside every group.
    pub choices: usize,
}

impl Corrections {
    /// Check if the labeling pass needed no correction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.starts == 0 && self.choices == 0
    }
}

/// Output of a full tokenizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized<'a> {
    /// Balanced token stream with literal runs merged.
    pub tokens: Vec<Token<'a>>,
    /// What the correction pass had to rewrite.
    pub corrections: Corrections,
}

/// Tokenize `input` with the given markers.
///
/// Never fails: any input yields a balanced stream.
///
/// ```rust
/// use choicetext_core::lexer::{tokenize, TokenKind};
/// use choicetext_core::MarkerConfig;
///
/// let config = MarkerConfig::new("<<", ">>", "|").unwrap();
/// let kinds: Vec<_> = tokenize("a<<b|c>>", &config)
///     .into_iter()
///     .map(|t| t.kind)
///     .collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Literal("a"),
///         TokenKind::Start,
///         TokenKind::Literal("b"),
///         TokenKind::Choice,
///         TokenKind::Literal("c"),
///         TokenKind::End,
///     ]
/// );
/// ```
pub fn tokenize<'a>(input: &'a str, config: &MarkerConfig) -> Vec<Token<'a>> {
    Lexer::new(input, config).finish().tokens
}

/// Per-call tokenizer state.
pub struct Lexer<'a, 'c> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for marker matching.
    bytes: &'a [u8],
    config: &'c MarkerConfig,
    /// Current byte offset, always on a char boundary.
    offset: usize,
    /// Start tokens emitted but not yet matched by an end token.
    open_starts: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a, 'c> Lexer<'a, 'c> {
    /// Create a new lexer for the given input.
    #[inline]
    pub fn new(input: &'a str, config: &'c MarkerConfig) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            config,
            offset: 0,
            open_starts: 0,
            tokens: Vec::new(),
        }
    }

    /// Run all three passes.
    pub fn finish(mut self) -> Tokenized<'a> {
        self.label();
        let corrections = self.correct();
        let tokens = group(self.input, self.tokens);

        trace!(
            "tokenized {} bytes into {} tokens",
            self.input.len(),
            tokens.len()
        );

        Tokenized {
            tokens,
            corrections,
        }
    }

    /// Pass 1: greedy labeling.
    fn label(&mut self) {
        while self.offset < self.bytes.len() {
            if self.eat(self.config.start()) {
                self.emit(TokenKind::Start, self.config.start_len());
                self.open_starts += 1;
            } else if self.open_starts > 0 && self.eat(self.config.end()) {
                self.emit(TokenKind::End, self.config.end_len());
                self.open_starts -= 1;
            } else if self.open_starts > 0 && self.eat(self.config.choice()) {
                self.emit(TokenKind::Choice, self.config.choice_len());
            } else {
                self.literal_run();
            }
        }
    }

    /// Check whether `marker` occurs at the current offset.
    #[inline(always)]
    fn eat(&self, marker: &str) -> bool {
        self.bytes[self.offset..].starts_with(marker.as_bytes())
    }

    #[inline]
    fn emit(&mut self, kind: TokenKind<'a>, len: usize) {
        let span = Span::from_offsets(self.offset, self.offset + len);
        self.tokens.push(Token::new(kind, span));
        self.offset += len;
    }

    /// Emit the current character plus every following byte that cannot
    /// begin a marker as one literal.
    ///
    /// Equivalent to emitting one literal per character, since grouping
    /// merges them anyway.
    fn literal_run(&mut self) {
        let input = self.input;
        let start = self.offset;
        let first_len = input[start..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        let from = start + first_len;
        let end = self.next_candidate(from);

        let span = Span::from_offsets(start, end);
        self.tokens
            .push(Token::new(TokenKind::Literal(&input[span.range()]), span));
        self.offset = end;
    }

    /// Offset of the next byte at or after `from` that could begin a marker
    /// in the current state, or the input length.
    ///
    /// Marker first bytes are UTF-8 lead bytes, so every hit is a char
    /// boundary.
    #[inline]
    fn next_candidate(&self, from: usize) -> usize {
        let haystack = &self.bytes[from..];
        let start = self.config.start().as_bytes()[0];
        let hit = if self.open_starts > 0 {
            let end = self.config.end().as_bytes()[0];
            let choice = self.config.choice().as_bytes()[0];
            memchr3(start, end, choice, haystack)
        } else {
            memchr(start, haystack)
        };
        hit.map_or(self.bytes.len(), |pos| from + pos)
    }

    /// Pass 2: demote unmatched start tokens, rightmost first.
    fn correct(&mut self) -> Corrections {
        let mut corrections = Corrections::default();
        if self.open_starts == 0 {
            return corrections;
        }

        let input = self.input;
        for token in self.tokens.iter_mut().rev() {
            if token.kind != TokenKind::Start {
                continue;
            }
            token.kind = TokenKind::Literal(&input[token.span.range()]);
            corrections.starts += 1;
            self.open_starts -= 1;
            if self.open_starts == 0 {
                break;
            }
        }

        // A choice emitted under a start that was just demoted may now sit
        // outside every group. End tokens cannot: each still has an open
        // start before it.
        let mut depth = 0usize;
        for token in &mut self.tokens {
            match token.kind {
                TokenKind::Start => depth += 1,
                TokenKind::End => depth = depth.saturating_sub(1),
                TokenKind::Choice if depth == 0 => {
                    token.kind = TokenKind::Literal(&input[token.span.range()]);
                    corrections.choices += 1;
                }
                _ => {}
            }
        }

        debug!(
            "demoted {} unmatched start marker(s) and {} stray choice marker(s)",
            corrections.starts, corrections.choices
        );
        corrections
    }
}

/// Pass 3: merge adjacent literal tokens.
///
/// Tokens cover the input contiguously, so a merged run is a single slice.
fn group<'a>(input: &'a str, tokens: Vec<Token<'a>>) -> Vec<Token<'a>> {
    let mut grouped: Vec<Token<'a>> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(last) = grouped.last_mut() {
            if last.is_literal() && token.is_literal() {
                let span = last.span.merge(token.span);
                *last = Token::new(TokenKind::Literal(&input[span.range()]), span);
                continue;
            }
        }
        grouped.push(token);
    }
    grouped
}
