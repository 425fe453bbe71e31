//! # templa
//!
//! Typed, staged build pipelines for generating artifacts from templates and
//! typed configuration data:
//!
//! config → render → parse → build
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use templa::{yaml_builder, Config, InlineTemplate, YamlBuilder};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Service {
//!     name: String,
//!     port: u16,
//! }
//!
//! let config = Config::<Service>::from_value(serde_json::json!({"name": "api", "port": 8080}))?;
//! let mut builder: YamlBuilder<serde_yaml::Value, Service> = yaml_builder(
//!     config,
//!     InlineTemplate::new("service:\n  name: {{ name }}\n  port: {{ port }}\n"),
//! );
//!
//! let initialized = builder.init_builder_target();
//! let processed = builder.process_template(initialized)?;
//! let built = builder.build(processed)?;
//!
//! assert_eq!(
//!     builder.fetch_built(&built)?,
//!     "service:\n  name: api\n  port: 8080\n"
//! );
//! # Ok::<(), templa::TemplaError>(())
//! ```
//!
//! ## Modules
//!
//! - `config` - Raw config mapping, typed config data and the rendering context
//! - `template` - Template retrieval and rendering through tera
//! - `builder` - The staged builder and its stage targets
//! - `yaml` - Order preserving YAML parse/dump steps
//! - `error` - Error type and codes
//! - `logging` - Optional tracing subscriber setup
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod template;
pub mod yaml;

pub use builder::{
    BuildSteps, Builder, BuilderId, BuilderTarget, Built, FnSteps, Initialized, Processed,
    ProcessedOrLater, Stage, StageTag,
};
pub use config::{Config, ConfigData, EmptyConfigData, RawConfig, RenderContext};
pub use error::{ErrorCode, ErrorExt, Result, TemplaError};
pub use template::{CompiledTemplate, EngineOptions, EngineTemplate, InlineTemplate, TemplateGettable};
pub use yaml::{yaml_builder, OrderedMapping, YamlBuilder, YamlSteps};
