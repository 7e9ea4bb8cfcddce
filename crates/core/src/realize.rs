// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deferred-value descriptors and the recursive realization walker.
//!
//! Mirrors `seesaw/config.py`'s `realize()` and `seesaw/item.py`'s
//! `ItemValue` / `ItemInterpolation`: a pipeline is declared once with
//! placeholders that refer to per-item values, and realization resolves
//! those placeholders against a specific [`crate::Item`] at the moment a
//! task needs a concrete value (spec §4.1).

use crate::config::ConfigSlot;
use crate::item::Item;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealizeError {
    #[error("item has no property '{0}'")]
    MissingProperty(String),

    #[error("template references missing property '{0}'")]
    MissingTemplateKey(String),

    #[error("config slot '{0}' holds a value that cannot be realized")]
    UnrealizableConfig(String),
}

/// A deferred value descriptor. Resolved to a concrete [`serde_json::Value`]
/// by [`Realize::realize`].
#[derive(Debug, Clone)]
pub enum Realize {
    /// A concrete value, passed through unchanged (the "otherwise return
    /// unchanged" arm of seesaw-kit's `realize()`).
    Literal(serde_json::Value),
    /// `ItemValue(key)` — `item[key]`.
    ItemValue(String),
    /// `ItemInterpolation(template)` — percent-style `%(key)s` substitution
    /// against the item's property map.
    Template(String),
    /// `ConfigValue(name, default)` — a named, independently validated slot.
    Config(Arc<ConfigSlot>),
    /// A mapping of realize-able values, keys preserved.
    Mapping(BTreeMap<String, Realize>),
    /// A sequence of realize-able values, order preserved.
    Sequence(Vec<Realize>),
}

impl Realize {
    pub fn literal(value: impl Into<serde_json::Value>) -> Self {
        Realize::Literal(value.into())
    }

    pub fn item_value(key: impl Into<String>) -> Self {
        Realize::ItemValue(key.into())
    }

    pub fn template(s: impl Into<String>) -> Self {
        Realize::Template(s.into())
    }

    /// Resolve this descriptor against `item`, recursing into mappings and
    /// sequences. Deterministic and side-effect-free (spec §4.1).
    pub fn realize(&self, item: &Item) -> Result<serde_json::Value, RealizeError> {
        match self {
            Realize::Literal(v) => Ok(v.clone()),
            Realize::ItemValue(key) => item
                .get(key)
                .ok_or_else(|| RealizeError::MissingProperty(key.clone())),
            Realize::Template(template) => interpolate(template, item).map(serde_json::Value::String),
            Realize::Config(slot) => {
                let scalar = slot.value();
                serde_json::to_value(&scalar)
                    .map_err(|_| RealizeError::UnrealizableConfig(slot.name.clone()))
            }
            Realize::Mapping(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.realize(item)?);
                }
                Ok(serde_json::Value::Object(out))
            }
            Realize::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for value in items {
                    out.push(value.realize(item)?);
                }
                Ok(serde_json::Value::Array(out))
            }
        }
    }

    /// Convenience for the common case of wanting a realized string.
    pub fn realize_string(&self, item: &Item) -> Result<String, RealizeError> {
        let value = self.realize(item)?;
        Ok(match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        })
    }

    /// Convenience for the common case of wanting a realized integer (used
    /// by `LimitConcurrent`'s admission cap).
    pub fn realize_i64(&self, item: &Item) -> Result<i64, RealizeError> {
        let value = self.realize(item)?;
        value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .ok_or_else(|| RealizeError::UnrealizableConfig("<anonymous>".into()))
    }
}

/// `%(key)s`-style interpolation against the item's property map, matching
/// `ItemInterpolation.realize`'s `self.s % item`.
fn interpolate(template: &str, item: &Item) -> Result<String, RealizeError> {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && template[i..].starts_with("%(") {
            let rest = &template[i + 2..];
            let close = rest
                .find(")s")
                .ok_or_else(|| RealizeError::MissingTemplateKey(template.to_string()))?;
            let key = &rest[..close];
            let value = item
                .get(key)
                .ok_or_else(|| RealizeError::MissingTemplateKey(key.to_string()))?;
            match value {
                serde_json::Value::String(s) => out.push_str(&s),
                other => out.push_str(&other.to_string()),
            }
            i += 2 + close + 2;
        } else {
            let ch = template[i..].chars().next().unwrap_or('\u{0}');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "realize_tests.rs"]
mod tests;
