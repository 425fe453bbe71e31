//! Engine options applied to templates compiled by templa.

use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::error::{ErrorCode, ErrorExt, Result};

/// Prefix of environment variables that override [`EngineOptions`].
pub const ENV_PREFIX: &str = "TEMPLA_";

/// Options for the template engine instances templa creates itself.
///
/// Templates fetched from a caller-owned engine (see
/// [`EngineTemplate`](super::EngineTemplate)) keep that engine's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Keep tera's HTML autoescaping for `.html`, `.htm` and `.xml` template
    /// names. Off by default since most artifacts are not markup.
    pub autoescape_html: bool,

    /// Name registered for inline templates that were not given one.
    pub inline_template_name: String,

    /// Render top-level variables missing from the context as empty text
    /// instead of failing.
    pub lenient_undefined: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            autoescape_html: false,
            inline_template_name: "template".to_string(),
            lenient_undefined: true,
        }
    }
}

impl EngineOptions {
    /// Parse options from an in-memory YAML document. Missing keys keep
    /// their defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .to_config_error_with_code(ErrorCode::CONFIG_INVALID_OPTIONS, "invalid engine options")
    }

    /// Apply `TEMPLA_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `TEMPLA_*` overrides from an arbitrary lookup.
    ///
    /// - `TEMPLA_AUTOESCAPE_HTML` → `autoescape_html`
    /// - `TEMPLA_INLINE_TEMPLATE_NAME` → `inline_template_name`
    /// - `TEMPLA_LENIENT_UNDEFINED` → `lenient_undefined`
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(&format!("{ENV_PREFIX}AUTOESCAPE_HTML")) {
            self.autoescape_html = parse_flag(&value)
                .to_config_error_with_code(
                    ErrorCode::CONFIG_INVALID_OPTIONS,
                    format!("invalid {ENV_PREFIX}AUTOESCAPE_HTML value '{value}'"),
                )?;
        }
        if let Some(value) = lookup(&format!("{ENV_PREFIX}LENIENT_UNDEFINED")) {
            self.lenient_undefined = parse_flag(&value)
                .to_config_error_with_code(
                    ErrorCode::CONFIG_INVALID_OPTIONS,
                    format!("invalid {ENV_PREFIX}LENIENT_UNDEFINED value '{value}'"),
                )?;
        }
        if let Some(name) = lookup(&format!("{ENV_PREFIX}INLINE_TEMPLATE_NAME")) {
            if !name.trim().is_empty() {
                self.inline_template_name = name;
            }
        }
        Ok(self)
    }

    /// A fresh engine configured with these options.
    pub(crate) fn new_engine(&self) -> Tera {
        let mut engine = Tera::default();
        if !self.autoescape_html {
            engine.autoescape_on(vec![]);
        }
        engine
    }
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}
