//! The error accumulator for one validation run.
//!
//! A [`Report`] keeps two views of the same errors: the flat list in
//! insertion order (depth-first, field-declaration order across nested
//! dives) and a map grouped by field name. Every error appears in both;
//! `push` is the only way in, so the views cannot drift. Nothing is ever
//! deduplicated or discarded.
//!
//! Grouping is keyed by the field's *declared* name, not a dotted path:
//! two same-named fields at different nesting depths land under one key.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// One recorded field failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Error {
    /// Declared field name (grouping key).
    pub field: String,
    /// Human-readable display label.
    pub label: String,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    errors: Vec<Error>,
    by_field: HashMap<String, Vec<Error>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one error under `field`. Both views are updated together.
    ///
    /// Public so a record's custom-validation hook can add cross-field
    /// errors the per-field rules cannot express.
    pub fn push(&mut self, field: &str, label: &str, message: impl Into<String>) {
        let error = Error {
            field: field.to_string(),
            label: label.to_string(),
            message: message.into(),
        };
        self.by_field
            .entry(error.field.clone())
            .or_default()
            .push(error.clone());
        self.errors.push(error);
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Flat view, in insertion order.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Grouped view, keyed by declared field name.
    pub fn by_field(&self) -> &HashMap<String, Vec<Error>> {
        &self.by_field
    }

    /// Errors recorded for one field; empty when the field is clean.
    pub fn field_errors(&self, field: &str) -> &[Error] {
        self.by_field.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
