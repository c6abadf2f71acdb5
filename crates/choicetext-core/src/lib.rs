//! # choicetext Core
//!
//! Resolves "choice templates": text with nested groups of alternatives, each
//! collapsed to one uniformly random pick.
//!
//! A template uses three configurable markers. With a start marker of `'(`,
//! an end marker of `)` and a choice marker of `|`, the template
//! `'(hello|good '(morning|evening))` resolves to `hello`, `good morning` or
//! `good evening`.
//!
//! ## Quick Start
//!
//! ```rust
//! use choicetext_core::{Card, MarkerConfig, Resolver};
//!
//! let config = MarkerConfig::default();
//! let mut resolver = Resolver::seeded(config, 7);
//!
//! let mut card = Card::new("'(Bonjour|Salut)", "'(Hello|Hi)");
//! resolver.render_card(&mut card).unwrap();
//! assert!(card.question == "Bonjour" || card.question == "Salut");
//! ```
//!
//! ## Lenient Input
//!
//! There is no malformed template. Markers that cannot open, close or split a
//! group are kept as literal text:
//!
//! ```rust
//! use choicetext_core::{resolve, MarkerConfig};
//!
//! let config = MarkerConfig::default();
//! let out = resolve("it's a '(trap", &config, &mut rand::rng()).unwrap();
//! assert_eq!(out, "it's a '(trap");
//! ```
//!
//! ## Pipeline
//!
//! - [`lexer`] - marker-aware tokenizer (labeling, correction, grouping)
//! - [`evaluator`] - stack machine that picks one alternative per group
//! - [`resolver`] - `resolve` entry point and the card render hook

pub mod config;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod resolver;
pub mod span;
pub mod stats;

pub use config::{MarkerConfig, MarkerRole};
pub use error::{ConfigError, InvariantViolation};
pub use evaluator::{evaluate, RandomSource};
pub use lexer::{tokenize, Token, TokenKind};
pub use resolver::{resolve, Card, Resolver};
pub use stats::{analyze, TemplateStats};
