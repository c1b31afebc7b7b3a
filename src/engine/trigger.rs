//! Extension host for authored triggers.
//!
//! Game data attaches [`TriggerSpec`] descriptors to events (visiting a
//! location, using or picking up an object, choosing a response, winning).
//! The host registers named functions; when an event fires, the engine calls
//! the function the descriptor names, handing it the authored parameters and
//! a handle back into the session so extensions can drive core actions.

use log::{debug, warn};
use std::collections::HashMap;

use crate::engine::session::Session;
use crate::engine::types::TriggerSpec;

/// A registered extension function: `(parameters, session handle)`.
pub type ExtensionFn = Box<dyn FnMut(&serde_json::Value, &mut Session)>;

/// Registry of named extension functions.
#[derive(Default)]
pub struct Extensions {
    functions: HashMap<String, ExtensionFn>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under the name trigger descriptors refer to.
    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: FnMut(&serde_json::Value, &mut Session) + 'static,
    {
        self.functions.insert(name.to_string(), Box::new(function));
    }

    /// Fire a trigger descriptor. A missing descriptor or an empty
    /// `function_call` is a silent no-op; a name with no registered
    /// function logs and is otherwise ignored.
    pub fn fire(&mut self, spec: Option<&TriggerSpec>, session: &mut Session) {
        let Some(spec) = spec else {
            return;
        };
        if spec.function_call.is_empty() {
            return;
        }
        match self.functions.get_mut(&spec.function_call) {
            Some(function) => {
                debug!("firing trigger '{}'", spec.function_call);
                function(&spec.function_parameters, session);
            }
            None => warn!(
                "trigger names unregistered function '{}'; ignoring",
                spec.function_call
            ),
        }
    }
}
