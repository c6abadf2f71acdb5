//! Template resolution entry points for host integrations.

use rand::rngs::{StdRng, ThreadRng};
use rand::SeedableRng;

use crate::config::MarkerConfig;
use crate::error::InvariantViolation;
use crate::evaluator::{evaluate, RandomSource};
use crate::lexer::tokenize;

/// Resolve every group in `input`, innermost first.
///
/// ```rust
/// use choicetext_core::{resolve, MarkerConfig};
///
/// let config = MarkerConfig::new("<<", ">>", "|").unwrap();
/// let out = resolve("<<hello|world>>", &config, &mut rand::rng()).unwrap();
/// assert!(out == "hello" || out == "world");
/// ```
pub fn resolve<R>(input: &str, config: &MarkerConfig, rng: &mut R) -> Result<String, InvariantViolation>
where
    R: RandomSource + ?Sized,
{
    let tokens = tokenize(input, config);
    evaluate(&tokens, rng)
}

/// The two rendered sides of a flashcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Card {
    /// Front side text.
    pub question: String,
    /// Back side text.
    pub answer: String,
}

impl Card {
    /// Create a card from its two sides.
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A marker configuration paired with a random source.
///
/// Holds no state between calls besides the generator itself.
pub struct Resolver<R> {
    config: MarkerConfig,
    rng: R,
}

impl Resolver<ThreadRng> {
    /// Resolver backed by the thread-local generator.
    pub fn with_thread_rng(config: MarkerConfig) -> Self {
        Self::new(config, rand::rng())
    }
}

impl Resolver<StdRng> {
    /// Resolver with reproducible output for a given seed.
    pub fn seeded(config: MarkerConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> Resolver<R> {
    /// Create a resolver from a configuration and a random source.
    pub fn new(config: MarkerConfig, rng: R) -> Self {
        Self { config, rng }
    }

    /// The markers this resolver uses.
    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Resolve a single template.
    pub fn resolve(&mut self, input: &str) -> Result<String, InvariantViolation> {
        resolve(input, &self.config, &mut self.rng)
    }

    /// Resolve both sides of a rendered card in place.
    ///
    /// The sides are resolved independently, question first.
    pub fn render_card(&mut self, card: &mut Card) -> Result<(), InvariantViolation> {
        card.question = self.resolve(&card.question)?;
        card.answer = self.resolve(&card.answer)?;
        Ok(())
    }
}
