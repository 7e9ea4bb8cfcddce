// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named, validated configuration slots realized against an item.
//!
//! Mirrors seesaw-kit's `ConfigValue` / `StringConfigValue` /
//! `NumberConfigValue` (`seesaw/config.py`): a slot carries a name, a
//! default, and an optional validator. Realization never reads live
//! process configuration — the slot's current value is fixed when the
//! pipeline is built.

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation error raised when a new value is rejected by a slot's kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("invalid value for {title}: does not match required pattern")]
    PatternMismatch { title: String },

    #[error("invalid number for {title}")]
    NotANumber { title: String },

    #[error("{title} must be {min} or greater")]
    TooSmall { title: String, min: i64 },

    #[error("{title} must be {max} or smaller")]
    TooLarge { title: String, max: i64 },
}

/// The validation rule attached to a [`ConfigSlot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigKind {
    /// Free-form string, optionally constrained by a regex (seesaw-kit
    /// calls `re.search`, not `re.match` — a substring match).
    String {
        #[serde(default)]
        regex: Option<String>,
    },
    /// Integer, optionally bounded.
    Number {
        #[serde(default)]
        min: Option<i64>,
        #[serde(default)]
        max: Option<i64>,
    },
}

/// A named, independently-editable configuration value.
///
/// Distinct from [`crate::Realize::ItemValue`]: a `ConfigSlot` is set once
/// per pipeline (by an operator or the project's defaults), not derived
/// from the item being processed.
#[derive(Debug)]
pub struct ConfigSlot {
    pub name: String,
    pub title: String,
    pub kind: ConfigKind,
    value: RwLock<ConfigScalar>,
}

/// The concrete value stored in a slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigScalar {
    Str(String),
    Num(i64),
}

impl ConfigScalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigScalar::Str(s) => Some(s),
            ConfigScalar::Num(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigScalar::Num(n) => Some(*n),
            ConfigScalar::Str(s) => s.parse().ok(),
        }
    }
}

impl ConfigSlot {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: ConfigKind, default: ConfigScalar) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            value: RwLock::new(default),
        }
    }

    /// Current value of the slot.
    pub fn value(&self) -> ConfigScalar {
        self.value.read().clone()
    }

    /// Validate and, on success, install a new value. Mirrors
    /// `ConfigValue.set_value`: on failure the previous value is kept.
    pub fn set_value(&self, candidate: ConfigScalar) -> Result<(), ConfigValidationError> {
        self.check(&candidate)?;
        *self.value.write() = candidate;
        Ok(())
    }

    fn check(&self, candidate: &ConfigScalar) -> Result<(), ConfigValidationError> {
        match &self.kind {
            ConfigKind::String { regex } => {
                let s = candidate.as_str().unwrap_or_default().trim();
                if let Some(pattern) = regex {
                    // seesaw-kit uses `re.search`, i.e. unanchored substring search.
                    let compiled = Regex::new(pattern).map_err(|_| ConfigValidationError::PatternMismatch {
                        title: self.title.clone(),
                    })?;
                    if !compiled.is_match(s) {
                        return Err(ConfigValidationError::PatternMismatch {
                            title: self.title.clone(),
                        });
                    }
                }
                Ok(())
            }
            ConfigKind::Number { min, max } => {
                let n = candidate
                    .as_i64()
                    .ok_or_else(|| ConfigValidationError::NotANumber {
                        title: self.title.clone(),
                    })?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(ConfigValidationError::TooSmall {
                            title: self.title.clone(),
                            min: *min,
                        });
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(ConfigValidationError::TooLarge {
                            title: self.title.clone(),
                            max: *max,
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
