// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The callout API a project-specific binary uses to supply logic a
//! declarative pipeline file cannot express (Design Notes: "a small
//! callout API (a plugin interface with a narrow surface)").

use std::collections::HashMap;
use std::sync::Arc;
use warrior_core::Item;
use warrior_engine::TaskError;

type CustomBody = dyn Fn(&Item) -> Result<(), TaskError> + Send + Sync;
type Predicate = dyn Fn(&Item) -> bool + Send + Sync;

/// Named `custom` task bodies and `conditional` predicates a pipeline
/// file can refer to by name.
#[derive(Default)]
pub struct StepRegistry {
    customs: HashMap<String, Arc<CustomBody>>,
    predicates: HashMap<String, Arc<Predicate>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_custom(&mut self, name: impl Into<String>, body: impl Fn(&Item) -> Result<(), TaskError> + Send + Sync + 'static) {
        self.customs.insert(name.into(), Arc::new(body));
    }

    pub fn register_predicate(&mut self, name: impl Into<String>, predicate: impl Fn(&Item) -> bool + Send + Sync + 'static) {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    pub fn custom(&self, name: &str) -> Option<Arc<CustomBody>> {
        self.customs.get(name).cloned()
    }

    pub fn predicate(&self, name: &str) -> Option<Arc<Predicate>> {
        self.predicates.get(name).cloned()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
