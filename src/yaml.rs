//! YAML builder that keeps mapping keys in document order.
//!
//! `serde_yaml::Mapping` is insertion ordered, and so is
//! [`OrderedMapping`] for typed maps: decoding keeps the order keys appear in
//! the rendered text, encoding emits them in in-memory order. Decoding and
//! re-encoding a document therefore reproduces the key order of every
//! mapping node.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::builder::{BuildSteps, Builder};
use crate::config::{Config, ConfigData};
use crate::template::TemplateGettable;

/// Insertion ordered map for typed processed values.
pub type OrderedMapping<V> = indexmap::IndexMap<String, V>;

/// Builder that parses a rendered YAML template into `P` and dumps it back
/// to YAML text.
pub type YamlBuilder<P, D> = Builder<P, String, D>;

/// Parse rendered YAML text into `P`.
pub fn load_rendered_yaml_str<P: DeserializeOwned>(rendered: &str) -> serde_yaml::Result<P> {
    serde_yaml::from_str(rendered)
}

/// Serialize a processed value to YAML text.
pub fn dump_parsed_obj<P: Serialize + ?Sized>(processed: &P) -> serde_yaml::Result<String> {
    serde_yaml::to_string(processed)
}

/// [`BuildSteps`] for YAML in, YAML out.
pub struct YamlSteps<P> {
    _processed: PhantomData<fn() -> P>,
}

impl<P> YamlSteps<P> {
    pub fn new() -> Self {
        Self {
            _processed: PhantomData,
        }
    }
}

impl<P> Default for YamlSteps<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for YamlSteps<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("YamlSteps")
    }
}

impl<P> BuildSteps<P, String> for YamlSteps<P>
where
    P: DeserializeOwned + Serialize,
{
    fn parse_rendered_template(&self, rendered: &str) -> anyhow::Result<P> {
        Ok(load_rendered_yaml_str(rendered)?)
    }

    fn build_processed(&self, processed: P) -> anyhow::Result<String> {
        Ok(dump_parsed_obj(&processed)?)
    }
}

/// Create a [`YamlBuilder`] rendering the YAML template from `template_getter`.
pub fn yaml_builder<P, D, T>(config: Config<D>, template_getter: T) -> YamlBuilder<P, D>
where
    P: DeserializeOwned + Serialize + 'static,
    D: ConfigData,
    T: TemplateGettable + 'static,
{
    Builder::new(config, template_getter, YamlSteps::new())
}
