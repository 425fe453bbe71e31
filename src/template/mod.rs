//! Template retrieval and rendering.
//!
//! Rendering itself is delegated to [`tera`]. A [`TemplateGettable`] hands the
//! builder a [`CompiledTemplate`], which renders against a [`RenderContext`].
//!
//! Templates compiled by templa render top-level variables missing from the
//! context as empty text (see [`EngineOptions::lenient_undefined`]); tera
//! itself rejects them.

mod options;

pub use options::{EngineOptions, ENV_PREFIX};

use std::error::Error as StdError;
use std::sync::Arc;

use serde_json::Value;
use tera::{Context, Tera};
use tracing::trace;

use crate::config::RenderContext;
use crate::error::Result;

/// Capability of producing a compiled template.
pub trait TemplateGettable {
    /// Return the compiled template.
    fn get_template(&self) -> Result<CompiledTemplate>;
}

impl<F> TemplateGettable for F
where
    F: Fn() -> Result<CompiledTemplate>,
{
    fn get_template(&self) -> Result<CompiledTemplate> {
        self()
    }
}

/// A named template inside a tera engine, ready to render.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    engine: Arc<Tera>,
    name: String,
    lenient_undefined: bool,
}

impl CompiledTemplate {
    /// Compile `source` into a fresh engine under `name`.
    pub fn from_source(
        name: impl Into<String>,
        source: &str,
        options: &EngineOptions,
    ) -> Result<Self> {
        let name = name.into();
        let mut engine = options.new_engine();
        engine.add_raw_template(&name, source)?;
        Ok(Self {
            engine: Arc::new(engine),
            name,
            lenient_undefined: options.lenient_undefined,
        })
    }

    /// Use the template registered as `name` in an existing engine.
    ///
    /// Undefined variables fail the render, as they do in tera, unless
    /// [`CompiledTemplate::with_lenient_undefined`] says otherwise.
    pub fn from_engine(engine: Arc<Tera>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !engine.get_template_names().any(|registered| registered == name) {
            return Err(tera::Error::template_not_found(&name).into());
        }
        Ok(Self {
            engine,
            name,
            lenient_undefined: false,
        })
    }

    pub fn with_lenient_undefined(mut self, lenient: bool) -> Self {
        self.lenient_undefined = lenient;
        self
    }

    /// Name the template is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template against a mapping of variable names to values.
    pub fn render(&self, context: &RenderContext) -> Result<String> {
        let mut context = Context::from_serialize(context)?;
        let rendered = loop {
            match self.engine.render(&self.name, &context) {
                Ok(rendered) => break rendered,
                Err(err) => match self.undefined_to_fill(&err, &context) {
                    Some(variable) => {
                        trace!(template = %self.name, %variable, "rendering undefined variable as empty");
                        context.insert(variable, &Value::Null);
                    }
                    None => return Err(err.into()),
                },
            }
        };
        trace!(template = %self.name, bytes = rendered.len(), "rendered template");
        Ok(rendered)
    }

    /// The top-level variable a failed render tripped over, if it may be
    /// filled with null and retried. Each name is filled at most once.
    fn undefined_to_fill(&self, err: &tera::Error, context: &Context) -> Option<String> {
        if !self.lenient_undefined {
            return None;
        }
        undefined_variable(err).filter(|name| !context.contains_key(name))
    }
}

/// Name of the plain variable reported missing anywhere in `err`'s chain.
fn undefined_variable(err: &tera::Error) -> Option<String> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(cause) = current {
        let message = cause.to_string();
        let name = message
            .split_once("Variable `")
            .and_then(|(_, rest)| rest.split_once('`'))
            .filter(|(_, tail)| tail.trim_start().starts_with("not found in context"))
            .map(|(name, _)| name);
        if let Some(name) = name {
            let plain = !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            return plain.then(|| name.to_string());
        }
        current = cause.source();
    }
    None
}

/// Template source held in memory, compiled on every `get_template` call.
#[derive(Debug, Clone)]
pub struct InlineTemplate {
    name: Option<String>,
    source: String,
    options: EngineOptions,
}

impl InlineTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            name: None,
            source: source.into(),
            options: EngineOptions::default(),
        }
    }

    /// A template with an explicit name. The name's suffix decides
    /// autoescaping when [`EngineOptions::autoescape_html`] is set.
    pub fn named(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(source)
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl TemplateGettable for InlineTemplate {
    fn get_template(&self) -> Result<CompiledTemplate> {
        let name = self
            .name
            .as_deref()
            .unwrap_or(&self.options.inline_template_name);
        CompiledTemplate::from_source(name, &self.source, &self.options)
    }
}

/// A template looked up by name in a caller-owned engine.
#[derive(Debug, Clone)]
pub struct EngineTemplate {
    engine: Arc<Tera>,
    name: String,
    lenient_undefined: bool,
}

impl EngineTemplate {
    pub fn new(engine: impl Into<Arc<Tera>>, name: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            name: name.into(),
            lenient_undefined: false,
        }
    }

    /// Render undefined top-level variables as empty text.
    pub fn with_lenient_undefined(mut self, lenient: bool) -> Self {
        self.lenient_undefined = lenient;
        self
    }
}

impl TemplateGettable for EngineTemplate {
    fn get_template(&self) -> Result<CompiledTemplate> {
        Ok(
            CompiledTemplate::from_engine(Arc::clone(&self.engine), self.name.clone())?
                .with_lenient_undefined(self.lenient_undefined),
        )
    }
}
