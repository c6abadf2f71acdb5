//! Stack-machine evaluator for balanced token streams.
//!
//! Groups resolve bottom-up: a nested group's end token precedes its
//! parent's, so by the time a group closes every alternative it holds is
//! already plain text.

use log::trace;
use rand::Rng;

use crate::error::InvariantViolation;
use crate::lexer::{Token, TokenKind};
use crate::span::Span;

/// Picks one alternative out of a group.
///
/// Implemented for every [`rand::Rng`], so both `rand::rng()` and a seeded
/// `StdRng` can be passed directly. Implement it by hand to script exact
/// outcomes.
pub trait RandomSource {
    /// Return an index in `0..count`. `count` is never zero.
    fn pick(&mut self, count: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn pick(&mut self, count: usize) -> usize {
        self.random_range(0..count)
    }
}

/// Evaluate a token stream, picking one alternative per group.
///
/// Only fails if `tokens` is not balanced, which [`tokenize`] never
/// produces.
///
/// [`tokenize`]: crate::lexer::tokenize
pub fn evaluate<R>(tokens: &[Token<'_>], rng: &mut R) -> Result<String, InvariantViolation>
where
    R: RandomSource + ?Sized,
{
    let mut stack = EvalStack::new();
    for token in tokens {
        match token.kind {
            TokenKind::Start => stack.open(),
            TokenKind::Choice => stack.separate(token.span)?,
            TokenKind::End => stack.close(token.span, rng)?,
            TokenKind::Literal(text) => stack.push_str(text),
        }
    }

    trace!("evaluated {} tokens", tokens.len());
    stack.finish()
}

/// One buffer per open level plus one alternative list per open group.
///
/// `buffers` always holds exactly `groups.len() + 1` entries; the last one is
/// the current buffer.
struct EvalStack {
    buffers: Vec<String>,
    groups: Vec<Vec<String>>,
}

impl EvalStack {
    fn new() -> Self {
        Self {
            buffers: vec![String::new()],
            groups: Vec::new(),
        }
    }

    #[inline]
    fn current(&mut self) -> &mut String {
        let last = self.buffers.len() - 1;
        &mut self.buffers[last]
    }

    fn open(&mut self) {
        self.buffers.push(String::new());
        self.groups.push(Vec::new());
    }

    fn push_str(&mut self, text: &str) {
        self.current().push_str(text);
    }

    fn separate(&mut self, span: Span) -> Result<(), InvariantViolation> {
        if self.groups.is_empty() {
            return Err(InvariantViolation::UnmatchedChoice { span });
        }
        let alternative = std::mem::take(self.current());
        if let Some(group) = self.groups.last_mut() {
            group.push(alternative);
        }
        Ok(())
    }

    fn close<R>(&mut self, span: Span, rng: &mut R) -> Result<(), InvariantViolation>
    where
        R: RandomSource + ?Sized,
    {
        let Some(mut alternatives) = self.groups.pop() else {
            return Err(InvariantViolation::UnmatchedEnd { span });
        };
        alternatives.extend(self.buffers.pop());

        let count = alternatives.len();
        let index = rng.pick(count);
        if index >= count {
            return Err(InvariantViolation::PickOutOfRange { index, count });
        }
        let chosen = alternatives.swap_remove(index);
        self.current().push_str(&chosen);
        Ok(())
    }

    fn finish(mut self) -> Result<String, InvariantViolation> {
        if !self.groups.is_empty() {
            return Err(InvariantViolation::UnclosedGroups {
                open: self.groups.len(),
            });
        }
        Ok(self.buffers.pop().unwrap_or_default())
    }
}
