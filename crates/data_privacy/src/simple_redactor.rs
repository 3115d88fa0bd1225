// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{DataClass, Redactor};
use std::borrow::Cow;

/// Mode of operation for the `SimpleRedactor`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleRedactorMode {
    /// Erases the original string.
    Erase,

    /// Erases the original string and tags it with the class id.
    EraseAndTag,

    /// Passes the original string through without modification.
    Passthrough,

    /// Passes the original string through and tags it with the class id.
    PassthroughAndTag,

    /// Replaces the original string with a repeated character.
    Replace(char),

    /// Replaces the original string with a repeated character and tags it with the class id.
    ReplaceAndTag(char),

    /// Inserts a custom string in place of the original string.
    Insert(Cow<'static, str>),

    /// Inserts a custom string in place of the original string and tags it with the class id.
    InsertAndTag(Cow<'static, str>),
}

/// A redactor that performs a variety of simple transformations on the input text.
#[derive(Clone, Debug)]
pub struct SimpleRedactor {
    mode: SimpleRedactorMode,
}

impl SimpleRedactor {
    /// Creates a new instance with the default mode of `SimpleRedactorMode::Replace('*')`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: SimpleRedactorMode::Replace('*'),
        }
    }

    /// Creates a new instance with an explicit mode of operation.
    #[must_use]
    pub const fn with_mode(mode: SimpleRedactorMode) -> Self {
        Self { mode }
    }
}

impl Redactor for SimpleRedactor {
    #[cfg_attr(test, mutants::skip)]
    fn redact(&self, data_class: &DataClass, value: &str, output: &mut dyn FnMut(&str)) {
        static ASTERISKS: &str = "********************************";

        match &self.mode {
            SimpleRedactorMode::Erase => {
                // nothing
            }
            SimpleRedactorMode::EraseAndTag => {
                output(format!("<{data_class}:>").as_str());
            }
            SimpleRedactorMode::Passthrough => {
                output(value);
            }
            SimpleRedactorMode::PassthroughAndTag => {
                output(format!("<{data_class}:{value}>").as_str());
            }

            #[expect(clippy::string_slice, reason = "No problem with UTF-8 here")]
            SimpleRedactorMode::Replace(c) => {
                let len = value.len();
                if *c == '*' && len < ASTERISKS.len() {
                    output(&ASTERISKS[0..len]);
                } else {
                    output(c.to_string().repeat(len).as_str());
                }
            }

            #[expect(clippy::string_slice, reason = "No problem with UTF-8 here")]
            SimpleRedactorMode::ReplaceAndTag(c) => {
                let len = value.len();
                if *c == '*' && len < ASTERISKS.len() {
                    output(format!("<{data_class}:{}>", &ASTERISKS[0..len]).as_str());
                } else {
                    output(format!("<{data_class}:{}>", (*c.to_string()).repeat(len).as_str()).as_str());
                }
            }
            SimpleRedactorMode::Insert(s) => {
                output(s);
            }
            SimpleRedactorMode::InsertAndTag(s) => {
                output(format!("<{data_class}:{s}>").as_str());
            }
        }
    }

    fn exact_len(&self) -> Option<usize> {
        matches!(&self.mode, SimpleRedactorMode::Erase).then_some(0)
    }
}

impl Default for SimpleRedactor {
    fn default() -> Self {
        Self::new()
    }
}
