//! Trigger-to-descriptor taxonomy and selection validation.
//!
//! A taxonomy binds the trigger keys emitted by the host UI to descriptor
//! strings such as `PBMC-FSC_70k`. The text before the first `_` (or the
//! first space when there is no underscore) is the descriptor's category.
//! At most one descriptor per category may be selected for a sample, except
//! for the `CUSTOM` category which is unrestricted.
//!
//! Taxonomies are immutable values. Rebinding the custom slots produces a new
//! taxonomy so records committed under an earlier slot value keep meaning
//! what they meant when they were written.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use crate::error::{Result, ReviewError};

/// Category exempt from the one-per-category rule.
pub const CUSTOM_CATEGORY: &str = "CUSTOM";

/// Trigger keys of the three free-text custom slots.
pub const CUSTOM_SLOT_KEYS: [&str; 3] = ["Custom 1", "Custom 2", "Custom 3"];

/// A single trigger key and the descriptor it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub key: String,
    pub descriptor: String,
}

/// Immutable mapping from trigger key to descriptor.
///
/// Bindings keep the order they were declared in so hosts can lay out and
/// number them consistently between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    bindings: Vec<Binding>,
}

/// Why a pending selection cannot be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Trigger {0:?} is not bound in the taxonomy")]
    UnknownTrigger(String),

    #[error("More than one selection in category {category}: {}", triggers.join(", "))]
    CategoryConflict {
        category: String,
        triggers: Vec<String>,
    },
}

/// Extract the category token of a descriptor.
///
/// Splits on the first `_`, falling back to the first space, and returns the
/// whole descriptor when neither separator is present.
pub fn category_of(descriptor: &str) -> &str {
    if let Some((head, _)) = descriptor.split_once('_') {
        head
    } else if let Some((head, _)) = descriptor.split_once(' ') {
        head
    } else {
        descriptor
    }
}

pub fn is_custom(category: &str) -> bool {
    category == CUSTOM_CATEGORY
}

/// Whether `key` names one of the three custom slots.
pub fn is_custom_slot(key: &str) -> bool {
    CUSTOM_SLOT_KEYS.contains(&key)
}

fn custom_descriptor(value: &str) -> String {
    format!("{CUSTOM_CATEGORY}_{value}")
}

/// Rebind the custom slots of `existing` from free-text input.
///
/// Slot `i` becomes `CUSTOM_<values[i]>`. Blank input leaves that slot's
/// current binding in place. `existing` is not modified.
pub fn apply_custom_values(existing: &Taxonomy, values: [&str; 3]) -> Taxonomy {
    let mut bindings = existing.bindings.clone();
    for (slot_key, value) in CUSTOM_SLOT_KEYS.iter().zip(values) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if let Some(binding) = bindings.iter_mut().find(|b| b.key == *slot_key) {
            binding.descriptor = custom_descriptor(value);
        }
    }
    Taxonomy { bindings }
}

impl Taxonomy {
    /// Build a taxonomy from `(trigger key, descriptor)` pairs.
    ///
    /// Later duplicates of a key replace earlier ones. Custom slots missing
    /// from `bindings` are appended as `CUSTOM_1`..`CUSTOM_3`.
    pub fn new<I, K, D>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        let mut out: Vec<Binding> = Vec::new();
        for (key, descriptor) in bindings {
            let key = key.into();
            let descriptor = descriptor.into();
            match out.iter_mut().find(|b| b.key == key) {
                Some(existing) => existing.descriptor = descriptor,
                None => out.push(Binding { key, descriptor }),
            }
        }
        for (idx, slot_key) in CUSTOM_SLOT_KEYS.iter().enumerate() {
            if !out.iter().any(|b| b.key == *slot_key) {
                out.push(Binding {
                    key: (*slot_key).to_string(),
                    descriptor: custom_descriptor(&(idx + 1).to_string()),
                });
            }
        }
        Self { bindings: out }
    }

    /// Resolve a trigger key to its descriptor.
    pub fn resolve(&self, trigger_key: &str) -> Result<&str> {
        self.bindings
            .iter()
            .find(|b| b.key == trigger_key)
            .map(|b| b.descriptor.as_str())
            .ok_or_else(|| ReviewError::UnknownTrigger(trigger_key.to_string()))
    }

    pub fn contains(&self, trigger_key: &str) -> bool {
        self.bindings.iter().any(|b| b.key == trigger_key)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Distinct categories in declaration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.bindings
            .iter()
            .map(|b| category_of(&b.descriptor))
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Validate a pending selection and resolve it to descriptors.
    ///
    /// Duplicate trigger keys collapse first. Fails if any key is unbound or
    /// if two distinct non-custom keys share a category. Descriptors are
    /// returned in first-selection order.
    pub fn validate<'a, I>(&self, pending: I) -> std::result::Result<Vec<String>, SelectionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut resolved: Vec<(&str, &str)> = Vec::new();
        for key in pending {
            if !seen.insert(key) {
                continue;
            }
            let descriptor = self
                .resolve(key)
                .map_err(|_| SelectionError::UnknownTrigger(key.to_string()))?;
            resolved.push((key, descriptor));
        }

        let non_custom: Vec<(&str, &str)> = resolved
            .iter()
            .copied()
            .filter(|(_, d)| !is_custom(category_of(d)))
            .collect();
        let categories: BTreeSet<&str> = non_custom.iter().map(|(_, d)| category_of(d)).collect();

        if categories.len() != non_custom.len() {
            let conflict = categories
                .iter()
                .find_map(|category| {
                    let triggers: Vec<String> = non_custom
                        .iter()
                        .filter(|(_, d)| category_of(d) == *category)
                        .map(|(k, _)| (*k).to_string())
                        .collect();
                    (triggers.len() > 1).then(|| SelectionError::CategoryConflict {
                        category: (*category).to_string(),
                        triggers,
                    })
                })
                .unwrap_or_else(|| SelectionError::CategoryConflict {
                    category: String::new(),
                    triggers: Vec::new(),
                });
            return Err(conflict);
        }

        Ok(resolved.into_iter().map(|(_, d)| d.to_string()).collect())
    }
}
