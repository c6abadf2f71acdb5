//! Marker configuration.
//!
//! A [`MarkerConfig`] holds the three delimiter strings that drive the
//! tokenizer. It is validated once at construction and never mutated, so a
//! single instance can be shared across threads and calls.
//!
//! Hosts persist markers as a JSON object with `START_TAG`, `END_TAG` and
//! `CHOICE_TAG` keys; [`MarkerConfig::from_json`] reads that shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default group-start marker.
pub const DEFAULT_START: &str = "'(";
/// Default group-end marker.
pub const DEFAULT_END: &str = ")";
/// Default alternative separator.
pub const DEFAULT_CHOICE: &str = "|";

/// The role a marker plays in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    /// Opens a group.
    Start,
    /// Closes a group.
    End,
    /// Separates alternatives inside a group.
    Choice,
}

impl MarkerRole {
    /// All roles, in tokenizer priority order.
    pub const ALL: [MarkerRole; 3] = [MarkerRole::Start, MarkerRole::End, MarkerRole::Choice];
}

impl fmt::Display for MarkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkerRole::Start => "start",
            MarkerRole::End => "end",
            MarkerRole::Choice => "choice",
        };
        f.write_str(name)
    }
}

/// Validated set of start, end and choice markers.
///
/// # Example
///
/// ```rust
/// use choicetext_core::MarkerConfig;
///
/// let config = MarkerConfig::new("<<", ">>", "|").unwrap();
/// assert_eq!(config.start(), "<<");
/// assert_eq!(config.end_len(), 2);
///
/// assert!(MarkerConfig::new("<<", "<<", "|").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerConfig {
    #[serde(rename = "START_TAG")]
    start: String,
    #[serde(rename = "END_TAG")]
    end: String,
    #[serde(rename = "CHOICE_TAG")]
    choice: String,
}

/// On-disk settings shape. Missing keys fall back to the defaults.
#[derive(Deserialize)]
struct Settings {
    #[serde(rename = "START_TAG", default = "default_start")]
    start: String,
    #[serde(rename = "END_TAG", default = "default_end")]
    end: String,
    #[serde(rename = "CHOICE_TAG", default = "default_choice")]
    choice: String,
}

fn default_start() -> String {
    DEFAULT_START.to_string()
}

fn default_end() -> String {
    DEFAULT_END.to_string()
}

fn default_choice() -> String {
    DEFAULT_CHOICE.to_string()
}

impl MarkerConfig {
    /// Build a configuration, checking that every marker is non-empty, that
    /// all three are pairwise distinct, and that none is a proper prefix of
    /// another.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        choice: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            start: start.into(),
            end: end.into(),
            choice: choice.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON settings object (`START_TAG`, `END_TAG`, `CHOICE_TAG`).
    pub fn from_json(settings: &str) -> Result<Self, ConfigError> {
        let Settings { start, end, choice } = serde_json::from_str(settings)?;
        Self::new(start, end, choice)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for role in MarkerRole::ALL {
            if self.get(role).is_empty() {
                return Err(ConfigError::EmptyMarker { role });
            }
        }

        for (i, &first) in MarkerRole::ALL.iter().enumerate() {
            for &second in &MarkerRole::ALL[i + 1..] {
                let (a, b) = (self.get(first), self.get(second));
                if a == b {
                    return Err(ConfigError::DuplicateMarker {
                        first,
                        second,
                        marker: a.to_string(),
                    });
                }
                if b.starts_with(a) {
                    return Err(ConfigError::PrefixOverlap {
                        shorter: first,
                        longer: second,
                    });
                }
                if a.starts_with(b) {
                    return Err(ConfigError::PrefixOverlap {
                        shorter: second,
                        longer: first,
                    });
                }
            }
        }

        Ok(())
    }

    /// The marker for the given role.
    #[inline]
    pub fn get(&self, role: MarkerRole) -> &str {
        match role {
            MarkerRole::Start => &self.start,
            MarkerRole::End => &self.end,
            MarkerRole::Choice => &self.choice,
        }
    }

    /// Group-start marker.
    #[inline]
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Group-end marker.
    #[inline]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Alternative separator.
    #[inline]
    pub fn choice(&self) -> &str {
        &self.choice
    }

    /// Byte length of the start marker.
    #[inline]
    pub fn start_len(&self) -> usize {
        self.start.len()
    }

    /// Byte length of the end marker.
    #[inline]
    pub fn end_len(&self) -> usize {
        self.end.len()
    }

    /// Byte length of the choice marker.
    #[inline]
    pub fn choice_len(&self) -> usize {
        self.choice.len()
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            choice: default_choice(),
        }
    }
}
