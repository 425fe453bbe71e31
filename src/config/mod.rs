//! Typed configuration data and the rendering context derived from it.
//!
//! A [`Config`] owns the raw, already-parsed mapping handed over by the
//! caller. The mapping is converted into a typed record (any type implementing
//! [`ConfigData`]) on demand, and the record's field/value pairs become the
//! rendering context passed to the template engine.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use templa::Config;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Greeting {
//!     name: String,
//!     times: u32,
//! }
//!
//! let mut config = Config::<Greeting>::from_value(json!({"name": "world", "times": 2})).unwrap();
//! let context = config.get_render_context().unwrap();
//! assert_eq!(context["name"], "world");
//! assert_eq!(context["times"], 2);
//! ```

pub mod coerce;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ErrorCode, ErrorExt, Result, TemplaError};

/// Raw, untyped configuration mapping as supplied by the caller.
pub type RawConfig = serde_json::Map<String, Value>;

/// Mapping of variable names to values handed to the template engine.
pub type RenderContext = serde_json::Map<String, Value>;

/// A passive typed record describing the shape of a rendering context.
///
/// Any serde record qualifies. Construction from the raw mapping goes through
/// the record's `Deserialize` impl, so validation and coercion rules live on
/// the record type itself (see [`coerce`]).
pub trait ConfigData: Serialize + DeserializeOwned {}

impl<T> ConfigData for T where T: Serialize + DeserializeOwned {}

/// Config data record without fields. Produces an empty rendering context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyConfigData {}

/// Provides a rendering context created from a typed config data record.
#[derive(Debug, Clone)]
pub struct Config<D> {
    raw_config_dict: RawConfig,
    data: Option<D>,
    render_context: Option<RenderContext>,
}

impl<D: ConfigData> Config<D> {
    /// Create a config from an already-parsed raw mapping.
    pub fn new(raw_config_dict: RawConfig) -> Self {
        Self {
            raw_config_dict,
            data: None,
            render_context: None,
        }
    }

    /// Create a config from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(raw) => Ok(Self::new(raw)),
            other => Err(TemplaError::config_with_code(
                ErrorCode::CONFIG_NOT_A_MAPPING,
                format!("raw config must be a mapping, got {}", value_kind(&other)),
            )),
        }
    }

    /// Create a config from any serializable raw source, such as a parsed
    /// YAML document or a map built in code.
    pub fn from_serialize<T: Serialize + ?Sized>(raw: &T) -> Result<Self> {
        let value = serde_json::to_value(raw).to_config_error_with_code(
            ErrorCode::CONFIG_NOT_A_MAPPING,
            "raw config could not be represented as a mapping",
        )?;
        Self::from_value(value)
    }

    /// The raw mapping this config was created with.
    pub fn raw_config_dict(&self) -> &RawConfig {
        &self.raw_config_dict
    }

    /// Convert the raw mapping into the typed config data record.
    ///
    /// Errors raised by the record's own construction are returned as
    /// [`TemplaError::ConfigData`] without any additional wrapping. Loading
    /// again discards a previously cached rendering context.
    pub fn load_config(&mut self) -> Result<()> {
        let data = D::deserialize(Value::Object(self.raw_config_dict.clone()))
            .map_err(TemplaError::ConfigData)?;
        debug!(
            fields = self.raw_config_dict.len(),
            record = std::any::type_name::<D>(),
            "loaded config data"
        );
        self.data = Some(data);
        self.render_context = None;
        Ok(())
    }

    /// Whether `load_config` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// The loaded config data record.
    pub fn data(&self) -> Result<&D> {
        self.data.as_ref().ok_or(TemplaError::ConfigDataNotLoaded)
    }

    /// The rendering context: exactly the field/value pairs of [`Config::data`].
    ///
    /// Loads the config on first use, then caches the context; later calls
    /// return the cached mapping without constructing the record again.
    pub fn get_render_context(&mut self) -> Result<&RenderContext> {
        let context = match self.render_context.take() {
            Some(context) => context,
            None => {
                if !self.is_loaded() {
                    self.load_config()?;
                }
                let context = render_context_of(self.data()?)?;
                trace!(keys = context.len(), "derived render context");
                context
            }
        };
        Ok(self.render_context.insert(context))
    }
}

fn render_context_of<D: Serialize>(data: &D) -> Result<RenderContext> {
    let value = serde_json::to_value(data).to_config_error_with_code(
        ErrorCode::CONFIG_CONTEXT_NOT_A_MAPPING,
        "config data could not be serialized",
    )?;
    match value {
        Value::Object(context) => Ok(context),
        Value::Null => Ok(RenderContext::new()),
        other => Err(TemplaError::config_with_code(
            ErrorCode::CONFIG_CONTEXT_NOT_A_MAPPING,
            format!(
                "config data must serialize to a mapping, got {}",
                value_kind(&other)
            ),
        )),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
