//! Python bindings for the choicetext resolver.
//!
//! Built for host applications that render text in Python, such as a
//! flashcard add-on resolving each card's question and answer on render.

use choicetext_core::{
    resolve as core_resolve, tokenize as core_tokenize, Card, ConfigError, InvariantViolation,
    MarkerConfig as CoreMarkerConfig, Resolver as CoreResolver, TokenKind,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config_err(e: ConfigError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn invariant_err(e: InvariantViolation) -> PyErr {
    PyRuntimeError::new_err(format!("internal error: {}", e))
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

// ============================================================================
// MarkerConfig
// ============================================================================

/// Start, end and choice markers.
///
/// Args:
///     start: Group start marker (default: "'(")
///     end: Group end marker (default: ")")
///     choice: Alternative separator (default: "|")
///
/// Raises:
///     ValueError: If a marker is empty, duplicated, or a prefix of another
#[pyclass(frozen, name = "MarkerConfig")]
#[derive(Clone)]
pub struct PyMarkerConfig {
    inner: CoreMarkerConfig,
}

#[pymethods]
impl PyMarkerConfig {
    #[new]
    #[pyo3(signature = (start=None, end=None, choice=None), text_signature = "(start=None, end=None, choice=None)")]
    fn new(start: Option<String>, end: Option<String>, choice: Option<String>) -> PyResult<Self> {
        let defaults = CoreMarkerConfig::default();
        let inner = CoreMarkerConfig::new(
            start.unwrap_or_else(|| defaults.start().to_string()),
            end.unwrap_or_else(|| defaults.end().to_string()),
            choice.unwrap_or_else(|| defaults.choice().to_string()),
        )
        .map_err(config_err)?;
        Ok(PyMarkerConfig { inner })
    }

    /// Read an add-on settings object (START_TAG, END_TAG, CHOICE_TAG).
    #[staticmethod]
    #[pyo3(text_signature = "(settings)")]
    fn from_json(settings: &str) -> PyResult<Self> {
        let inner = CoreMarkerConfig::from_json(settings).map_err(config_err)?;
        Ok(PyMarkerConfig { inner })
    }

    #[getter]
    fn start(&self) -> &str {
        self.inner.start()
    }

    #[getter]
    fn end(&self) -> &str {
        self.inner.end()
    }

    #[getter]
    fn choice(&self) -> &str {
        self.inner.choice()
    }

    fn __repr__(&self) -> String {
        format!(
            "MarkerConfig(start={:?}, end={:?}, choice={:?})",
            self.inner.start(),
            self.inner.end(),
            self.inner.choice()
        )
    }
}

fn config_or_default(config: Option<PyRef<'_, PyMarkerConfig>>) -> CoreMarkerConfig {
    config.map(|c| c.inner.clone()).unwrap_or_default()
}

// ============================================================================
// Token
// ============================================================================

/// A token with its byte span in the input.
#[pyclass(frozen, get_all, name = "Token")]
#[derive(Clone)]
pub struct PyToken {
    pub kind: String,
    pub text: Option<String>,
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PyToken {
    fn __repr__(&self) -> String {
        match &self.text {
            Some(text) => format!("Token({}, {:?}, {}..{})", self.kind, text, self.start, self.end),
            None => format!("Token({}, {}..{})", self.kind, self.start, self.end),
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolver holding a marker configuration and its own generator.
///
/// Args:
///     config: MarkerConfig (default markers if omitted)
///     seed: Seed for reproducible output (OS entropy if omitted)
#[pyclass(name = "Resolver")]
pub struct PyResolver {
    inner: CoreResolver<StdRng>,
}

#[pymethods]
impl PyResolver {
    #[new]
    #[pyo3(signature = (config=None, seed=None), text_signature = "(config=None, seed=None)")]
    fn new(config: Option<PyRef<'_, PyMarkerConfig>>, seed: Option<u64>) -> Self {
        PyResolver {
            inner: CoreResolver::new(config_or_default(config), make_rng(seed)),
        }
    }

    /// Resolve every group in a template.
    #[pyo3(text_signature = "(self, input)")]
    fn resolve(&mut self, input: &str) -> PyResult<String> {
        self.inner.resolve(input).map_err(invariant_err)
    }

    /// Resolve a card's question and answer independently.
    ///
    /// Returns:
    ///     tuple[str, str]: The resolved (question, answer)
    #[pyo3(text_signature = "(self, question, answer)")]
    fn render_card(&mut self, question: String, answer: String) -> PyResult<(String, String)> {
        let mut card = Card::new(question, answer);
        self.inner.render_card(&mut card).map_err(invariant_err)?;
        Ok((card.question, card.answer))
    }

    fn __repr__(&self) -> String {
        let config = self.inner.config();
        format!(
            "Resolver(start={:?}, end={:?}, choice={:?})",
            config.start(),
            config.end(),
            config.choice()
        )
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Resolve a template.
///
/// Args:
///     input: Template string
///     config: MarkerConfig (default markers if omitted)
///     seed: Seed for reproducible output
///
/// Returns:
///     str: The resolved text
#[pyfunction]
#[pyo3(signature = (input, config=None, seed=None), text_signature = "(input, config=None, seed=None)")]
fn resolve(
    input: &str,
    config: Option<PyRef<'_, PyMarkerConfig>>,
    seed: Option<u64>,
) -> PyResult<String> {
    let config = config_or_default(config);
    core_resolve(input, &config, &mut make_rng(seed)).map_err(invariant_err)
}

/// Tokenize a template.
///
/// Returns:
///     list[Token]: Balanced token stream
#[pyfunction]
#[pyo3(signature = (input, config=None), text_signature = "(input, config=None)")]
fn tokenize(input: &str, config: Option<PyRef<'_, PyMarkerConfig>>) -> Vec<PyToken> {
    let config = config_or_default(config);
    core_tokenize(input, &config)
        .into_iter()
        .map(|t| {
            let (kind, text) = match t.kind {
                TokenKind::Start => ("start", None),
                TokenKind::End => ("end", None),
                TokenKind::Choice => ("choice", None),
                TokenKind::Literal(text) => ("literal", Some(text.to_string())),
            };
            PyToken {
                kind: kind.to_string(),
                text,
                start: t.span.start,
                end: t.span.end,
            }
        })
        .collect()
}

// ============================================================================
// Module
// ============================================================================

/// choicetext - nested random-choice templates.
#[pymodule]
fn pychoice(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMarkerConfig>()?;
    m.add_class::<PyToken>()?;
    m.add_class::<PyResolver>()?;
    m.add_function(wrap_pyfunction!(resolve, m)?)?;
    m.add_function(wrap_pyfunction!(tokenize, m)?)?;
    Ok(())
}
