// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt::Debug;

use crate::redaction_engine::RedactionEngine;
use crate::redactors::Redactors;
use crate::{DataClass, Redactor};

/// A builder for creating a [`RedactionEngine`].
pub struct RedactionEngineBuilder {
    redactors: Redactors,
}

impl RedactionEngineBuilder {
    /// Creates a new instance of `RedactionEngineBuilder`.
    ///
    /// This is initialized with no registered redactors and a fallback redactor that erases the input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            redactors: Redactors::default(),
        }
    }

    /// Adds a redactor for a specific data class.
    ///
    /// Whenever the redaction engine encounters data of this class, it will use the provided redactor.
    #[must_use]
    pub fn add_class_redactor(mut self, data_class: &DataClass, redactor: impl Redactor + Send + Sync + 'static) -> Self {
        self.redactors.insert(data_class.clone(), redactor);
        self
    }

    /// Adds a redactor that's a fallback for when there is no redactor registered for a particular
    /// data class.
    ///
    /// The default fallback is to use an `ErasingRedactor`, which simply erases the original string.
    #[must_use]
    pub fn set_fallback_redactor(mut self, redactor: impl Redactor + Send + Sync + 'static) -> Self {
        self.redactors.set_fallback(redactor);
        self
    }

    /// Builds the `RedactionEngine`.
    #[must_use]
    pub fn build(self) -> RedactionEngine {
        RedactionEngine::new(self.redactors)
    }
}

impl Default for RedactionEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RedactionEngineBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.redactors.fmt(f)
    }
}
