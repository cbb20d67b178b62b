//! Prompt templates rendered against the hub's entity states
//!
//! Templates use the Jinja dialect (via `minijinja`). Besides the standard
//! filters, three globals give access to the hub:
//!
//! * `states(entity_id)` - current state string, `"unknown"` if absent
//! * `is_state(entity_id, value)` - whether the entity currently has `value`
//! * `now()` - local time in RFC 3339 format

use minijinja::Environment;
use std::sync::Arc;
use thiserror::Error;

use crate::hub::{StateStore, STATE_UNKNOWN};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template syntax error: {message}")]
    Syntax { message: String },

    #[error("Template render error: {message}")]
    Render { message: String },
}

/// Something that can produce the user prompt for one update
///
/// Rendering reads whatever context the implementation was built with; the
/// caller supplies nothing.
pub trait Renderable: Send + Sync {
    fn render(&self) -> Result<String, TemplateError>;
}

/// Jinja environment with the hub's globals registered
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new(states: Arc<StateStore>) -> Self {
        let mut env = Environment::new();

        let store = Arc::clone(&states);
        env.add_function("states", move |entity_id: String| -> String {
            store
                .get(&entity_id)
                .unwrap_or_else(|| STATE_UNKNOWN.to_string())
        });

        let store = Arc::clone(&states);
        env.add_function("is_state", move |entity_id: String, value: String| -> bool {
            store.get(&entity_id).as_deref() == Some(value.as_str())
        });

        env.add_function("now", || -> String { chrono::Local::now().to_rfc3339() });

        Self { env }
    }

    /// Check that `source` parses, without rendering it
    pub fn compile(&self, source: &str) -> Result<(), TemplateError> {
        let env = Environment::new();
        env.template_from_str(source)
            .map(|_| ())
            .map_err(|e| TemplateError::Syntax {
                message: describe(&e),
            })
    }

    pub fn render_str(&self, source: &str) -> Result<String, TemplateError> {
        self.env
            .render_str(source, minijinja::context! {})
            .map_err(|e| TemplateError::Render {
                message: describe(&e),
            })
    }
}

fn describe(error: &minijinja::Error) -> String {
    match error.line() {
        Some(line) => format!("{error} (line {line})"),
        None => error.to_string(),
    }
}

/// A compiled user-prompt template bound to a `TemplateEngine`
#[derive(Clone)]
pub struct PromptTemplate {
    source: String,
    engine: Arc<TemplateEngine>,
}

impl PromptTemplate {
    /// Compile `source`; syntax errors are reported here rather than on render
    pub fn new(
        source: impl Into<String>,
        engine: Arc<TemplateEngine>,
    ) -> Result<Self, TemplateError> {
        let source = source.into();
        engine.compile(&source)?;
        Ok(Self { source, engine })
    }

    /// The unrendered source
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Renderable for PromptTemplate {
    fn render(&self) -> Result<String, TemplateError> {
        self.engine.render_str(&self.source)
    }
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .finish()
    }
}
