//! Integration tests for the evaluator, resolver and card render hook

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use choicetext_core::span::Span;
use choicetext_core::{
    analyze, evaluate, resolve, tokenize, Card, InvariantViolation, MarkerConfig, RandomSource,
    Resolver, Token, TokenKind,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn angle() -> MarkerConfig {
    MarkerConfig::new("<<", ">>", "|").unwrap()
}

/// Returns a fixed sequence of picks, in the order groups close.
struct Scripted {
    picks: Vec<usize>,
    next: usize,
}

impl Scripted {
    fn new(picks: &[usize]) -> Self {
        Self {
            picks: picks.to_vec(),
            next: 0,
        }
    }
}

impl RandomSource for Scripted {
    fn pick(&mut self, _count: usize) -> usize {
        let index = self.picks[self.next];
        self.next += 1;
        index
    }
}

fn scripted(input: &str, picks: &[usize]) -> String {
    resolve(input, &angle(), &mut Scripted::new(picks)).unwrap()
}

// ============================================================================
// Evaluation Tests
// ============================================================================

#[test]
fn test_plain_text_unchanged() {
    let mut rng = StdRng::seed_from_u64(1);
    for input in ["", "hello", "a | b >> c", "no groups here"] {
        assert_eq!(resolve(input, &angle(), &mut rng).unwrap(), input);
    }
}

#[test]
fn test_flat_group_picks_by_index() {
    assert_eq!(scripted("<<a|b|c>>", &[0]), "a");
    assert_eq!(scripted("<<a|b|c>>", &[1]), "b");
    assert_eq!(scripted("<<a|b|c>>", &[2]), "c");
}

#[test]
fn test_text_around_groups_is_kept() {
    assert_eq!(scripted("x<<a|b>>y<<c|d>>z", &[1, 0]), "xbycz");
}

#[test]
fn test_inner_group_resolves_first() {
    // Picks are consumed inner group first.
    assert_eq!(scripted("<<a<<b|c>>|d>>", &[0, 0]), "ab");
    assert_eq!(scripted("<<a<<b|c>>|d>>", &[1, 0]), "ac");
    assert_eq!(scripted("<<a<<b|c>>|d>>", &[1, 1]), "d");
}

#[test]
fn test_nested_outputs_are_complete() {
    let mut seen = HashMap::new();
    for seed in 0..300 {
        let mut rng = StdRng::seed_from_u64(seed);
        let out = resolve("<<a<<b|c>>|d>>", &angle(), &mut rng).unwrap();
        *seen.entry(out).or_insert(0) += 1;
    }
    let mut outputs: Vec<_> = seen.keys().cloned().collect();
    outputs.sort();
    assert_eq!(outputs, vec!["ab", "ac", "d"]);
}

#[test]
fn test_empty_alternatives() {
    assert_eq!(scripted("<<|a>>", &[0]), "");
    assert_eq!(scripted("<<|a>>", &[1]), "a");
    assert_eq!(scripted("x<<>>y", &[0]), "xy");
    assert_eq!(scripted("<<a||>>", &[1]), "");
}

#[test]
fn test_single_alternative_is_deterministic() {
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        assert_eq!(
            resolve("say <<only this>>!", &angle(), &mut rng).unwrap(),
            "say only this!"
        );
    }
}

#[test]
fn test_trailing_start_degrades_to_text() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(resolve("abc<<", &angle(), &mut rng).unwrap(), "abc<<");
}

#[test]
fn test_unmatched_starts_keep_first_group() {
    assert_eq!(scripted("<<a<<b<<c>>", &[0]), "a<<b<<c");
}

#[test]
fn test_stray_choice_after_correction() {
    assert_eq!(scripted("<<a>><<b|c", &[0]), "a<<b|c");
}

#[test]
fn test_default_markers() {
    let config = MarkerConfig::default();
    let mut source = Scripted::new(&[0, 1]);
    let out = resolve("'(hello|good '(morning|evening))", &config, &mut source).unwrap();
    assert_eq!(out, "good morning");
}

#[test]
fn test_multibyte_alternatives() {
    let config = MarkerConfig::new("«", "»", "·").unwrap();
    let out = resolve("«café·thé» ☕", &config, &mut Scripted::new(&[1])).unwrap();
    assert_eq!(out, "thé ☕");
}

// ============================================================================
// Invariant Tests
// ============================================================================

fn token(kind: TokenKind<'static>) -> Token<'static> {
    Token {
        kind,
        span: Span::new(0, 1),
    }
}

#[test]
fn test_evaluate_rejects_unmatched_end() {
    let tokens = [token(TokenKind::Literal("a")), token(TokenKind::End)];
    assert_eq!(
        evaluate(&tokens, &mut Scripted::new(&[])),
        Err(InvariantViolation::UnmatchedEnd {
            span: Span::new(0, 1)
        })
    );
}

#[test]
fn test_evaluate_rejects_unmatched_choice() {
    let tokens = [token(TokenKind::Choice)];
    assert!(matches!(
        evaluate(&tokens, &mut Scripted::new(&[])),
        Err(InvariantViolation::UnmatchedChoice { .. })
    ));
}

#[test]
fn test_evaluate_rejects_unclosed_group() {
    let tokens = [
        token(TokenKind::Start),
        token(TokenKind::Start),
        token(TokenKind::Literal("a")),
        token(TokenKind::End),
    ];
    assert_eq!(
        evaluate(&tokens, &mut Scripted::new(&[0])),
        Err(InvariantViolation::UnclosedGroups { open: 1 })
    );
}

#[test]
fn test_evaluate_rejects_out_of_range_pick() {
    let tokens = tokenize("<<a|b>>", &angle());
    assert_eq!(
        evaluate(&tokens, &mut Scripted::new(&[5])),
        Err(InvariantViolation::PickOutOfRange { index: 5, count: 2 })
    );
}

#[test]
fn test_tokenizer_output_never_violates_invariants() {
    let inputs = [
        "<<", ">>", "|", "<<|", "|>>", ">><<", "<<a>>>>", "<<<<>>", "<<a>><<b|c", "<<|<<|>>",
        "a<<b>>c<<d|e<<f", "<<<<<<|>>", "|<<>>|",
    ];
    let mut rng = StdRng::seed_from_u64(11);
    for input in inputs {
        let tokens = tokenize(input, &angle());
        assert!(
            evaluate(&tokens, &mut rng).is_ok(),
            "invariant violated for {:?}",
            input
        );
    }
}

// ============================================================================
// Distribution Tests
// ============================================================================

#[test]
fn test_selection_is_uniform() {
    const ROUNDS: usize = 40_000;
    let alternatives = ["a", "b", "c", "d"];
    let tokens = tokenize("<<a|b|c|d>>", &angle());
    let mut rng = StdRng::seed_from_u64(42);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..ROUNDS {
        *counts.entry(evaluate(&tokens, &mut rng).unwrap()).or_insert(0) += 1;
    }

    let expected = ROUNDS as f64 / alternatives.len() as f64;
    let chi_square: f64 = alternatives
        .iter()
        .map(|alt| {
            let observed = *counts.get(*alt).unwrap_or(&0) as f64;
            (observed - expected).powi(2) / expected
        })
        .sum();

    // 3 degrees of freedom; far past the 0.999 quantile (16.27).
    assert!(chi_square < 25.0, "chi-square {} too large", chi_square);
    assert_eq!(counts.len(), alternatives.len());
}

// ============================================================================
// Resolver and Card Tests
// ============================================================================

#[test]
fn test_seeded_resolver_is_reproducible() {
    let templates = ["<<a|b|c>>", "<<x<<y|z>>|w>> <<1|2>>", "plain"];
    let mut first = Resolver::seeded(angle(), 99);
    let mut second = Resolver::seeded(angle(), 99);
    for _ in 0..20 {
        for template in templates {
            assert_eq!(
                first.resolve(template).unwrap(),
                second.resolve(template).unwrap()
            );
        }
    }
}

#[test]
fn test_render_card_resolves_both_sides() {
    let mut resolver = Resolver::new(angle(), Scripted::new(&[1, 0]));
    let mut card = Card::new("<<Bonjour|Salut>> !", "<<Hello|Hi>>!");
    resolver.render_card(&mut card).unwrap();
    assert_eq!(card.question, "Salut !");
    assert_eq!(card.answer, "Hello!");
}

#[test]
fn test_render_card_plain_sides_untouched() {
    let mut resolver = Resolver::with_thread_rng(angle());
    let mut card = Card::new("What is 2 + 2?", "4");
    resolver.render_card(&mut card).unwrap();
    assert_eq!(card, Card::new("What is 2 + 2?", "4"));
    assert_eq!(resolver.config(), &angle());
}

#[test]
fn test_shared_config_across_threads() {
    let config = Arc::new(angle());
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            let config = Arc::clone(&config);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..500)
                    .map(|_| resolve("<<a|b>><<c|d>>", &config, &mut rng).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for out in handle.join().unwrap() {
            assert!(["ac", "ad", "bc", "bd"].contains(&out.as_str()));
        }
    }
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_analyze_plain_text() {
    let stats = analyze("nothing to see", &angle());
    assert_eq!(stats.groups, 0);
    assert_eq!(stats.alternatives, 0);
    assert_eq!(stats.max_depth, 0);
    assert_eq!(stats.paths, 1);
    assert!(stats.corrections.is_empty());
}

#[test]
fn test_analyze_nested() {
    let stats = analyze("<<a<<b|c>>|d>> <<e|f|g>>", &angle());
    assert_eq!(stats.groups, 3);
    assert_eq!(stats.alternatives, 7);
    assert_eq!(stats.max_depth, 2);
    assert_eq!(stats.paths, 9);
}

#[test]
fn test_analyze_reports_corrections() {
    let stats = analyze("<<a>><<b|c", &angle());
    assert_eq!(stats.groups, 1);
    assert_eq!(stats.corrections.starts, 1);
    assert_eq!(stats.corrections.choices, 1);
}

#[test]
fn test_analyze_paths_saturate() {
    let template = "<<a|b|c|d>>".repeat(80);
    let stats = analyze(&template, &angle());
    assert_eq!(stats.groups, 80);
    assert_eq!(stats.paths, u128::MAX);
}
