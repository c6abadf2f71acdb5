//! Structural summary of a template.

use serde::Serialize;

use crate::config::MarkerConfig;
use crate::lexer::{Corrections, Lexer, TokenKind};

/// Counts describing a template's group structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    /// Number of groups.
    pub groups: usize,
    /// Alternatives across all groups.
    pub alternatives: usize,
    /// Deepest group nesting (0 for plain text).
    pub max_depth: usize,
    /// Markers demoted to literal text during tokenizing.
    pub corrections: Corrections,
    /// Number of distinct choice paths, saturating at `u128::MAX`.
    ///
    /// Counts paths, not strings: `(a|a)` has two paths and one output.
    pub paths: u128,
}

/// Path counts for one open level.
struct Frame {
    /// Paths through alternatives already closed by a separator.
    closed: u128,
    /// Paths through the alternative being read.
    current: u128,
}

impl Frame {
    fn new() -> Self {
        Self {
            closed: 0,
            current: 1,
        }
    }
}

/// Tokenize `input` and summarise its groups.
///
/// ```rust
/// use choicetext_core::{analyze, MarkerConfig};
///
/// let config = MarkerConfig::new("<<", ">>", "|").unwrap();
/// let stats = analyze("<<a|<<b|c>>>> and <<d|e>>", &config);
/// assert_eq!(stats.groups, 3);
/// assert_eq!(stats.max_depth, 2);
/// assert_eq!(stats.paths, 6);
/// ```
pub fn analyze(input: &str, config: &MarkerConfig) -> TemplateStats {
    let tokenized = Lexer::new(input, config).finish();
    let mut stats = TemplateStats {
        corrections: tokenized.corrections,
        ..TemplateStats::default()
    };

    let mut frames = vec![Frame::new()];
    for token in &tokenized.tokens {
        match token.kind {
            TokenKind::Start => {
                frames.push(Frame::new());
                stats.groups += 1;
                stats.max_depth = stats.max_depth.max(frames.len() - 1);
            }
            TokenKind::Choice => {
                if let Some(frame) = frames.last_mut() {
                    frame.closed = frame.closed.saturating_add(frame.current);
                    frame.current = 1;
                }
                stats.alternatives += 1;
            }
            TokenKind::End => {
                if frames.len() < 2 {
                    continue;
                }
                if let Some(frame) = frames.pop() {
                    let total = frame.closed.saturating_add(frame.current);
                    if let Some(parent) = frames.last_mut() {
                        parent.current = parent.current.saturating_mul(total);
                    }
                }
                stats.alternatives += 1;
            }
            TokenKind::Literal(_) => {}
        }
    }

    stats.paths = frames.first().map_or(1, |root| root.current);
    stats
}
