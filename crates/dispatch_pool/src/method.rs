// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The method a task submission targets: either a name registered on the worker, or an
//! inline callable serialized to source text.

use serde_json::Value;

/// What a submitted task asks a worker to run.
#[derive(Debug, Clone)]
pub enum Method {
    /// A method name the worker has registered (e.g. via its script's exports).
    Named(String),

    /// A callable serialized to source text. The dispatcher rewrites this into a call to
    /// the worker's built-in `"run"` method before it ever reaches `select_worker`.
    Inline(String),
}

impl Method {
    /// The built-in method name workers expose for running inline callables.
    pub const RUN: &'static str = "run";

    /// Rewrites an inline callable into `("run", [source, original_params])`. Named
    /// methods pass through unchanged.
    pub(crate) fn rewrite(self, params: Vec<Value>) -> (String, Vec<Value>) {
        match self {
            Self::Named(name) => (name, params),
            Self::Inline(source) => (
                Self::RUN.to_owned(),
                vec![Value::String(source), Value::Array(params)],
            ),
        }
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for Method {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}
