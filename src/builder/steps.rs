//! User supplied steps run by a [`Builder`](super::Builder).

use std::fmt;

use crate::config::RenderContext;

/// The customizable steps of a build.
///
/// `parse_rendered_template` turns rendered template text into the processed
/// value, `build_processed` turns the processed value into the built
/// artifact. Each is called exactly once per advance, in that order.
///
/// To change one step of an existing implementation, wrap it and delegate:
///
/// ```
/// use templa::{BuildSteps, YamlSteps};
///
/// struct Stamped(YamlSteps<Vec<String>>);
///
/// impl BuildSteps<Vec<String>, String> for Stamped {
///     fn parse_rendered_template(&self, rendered: &str) -> anyhow::Result<Vec<String>> {
///         self.0.parse_rendered_template(rendered)
///     }
///
///     fn build_processed(&self, mut processed: Vec<String>) -> anyhow::Result<String> {
///         processed.push("stamped".to_string());
///         self.0.build_processed(processed)
///     }
/// }
/// ```
pub trait BuildSteps<P, B> {
    /// Adjust the rendering context right before the template is rendered.
    fn extend_render_context(&self, context: &mut RenderContext) -> anyhow::Result<()> {
        let _ = context;
        Ok(())
    }

    /// Parse the rendered template into the processed value.
    fn parse_rendered_template(&self, rendered: &str) -> anyhow::Result<P>;

    /// Build the artifact from (a copy of) the processed value.
    fn build_processed(&self, processed: P) -> anyhow::Result<B>;
}

type ParseFn<P> = dyn Fn(&str) -> anyhow::Result<P>;
type BuildFn<P, B> = dyn Fn(P) -> anyhow::Result<B>;

/// [`BuildSteps`] backed by two closures.
pub struct FnSteps<P, B> {
    parse: Box<ParseFn<P>>,
    build: Box<BuildFn<P, B>>,
}

impl<P, B> FnSteps<P, B> {
    pub fn new<F, G>(parse: F, build: G) -> Self
    where
        F: Fn(&str) -> anyhow::Result<P> + 'static,
        G: Fn(P) -> anyhow::Result<B> + 'static,
    {
        Self {
            parse: Box::new(parse),
            build: Box::new(build),
        }
    }
}

impl<P, B> BuildSteps<P, B> for FnSteps<P, B> {
    fn parse_rendered_template(&self, rendered: &str) -> anyhow::Result<P> {
        (self.parse)(rendered)
    }

    fn build_processed(&self, processed: P) -> anyhow::Result<B> {
        (self.build)(processed)
    }
}

impl<P, B> fmt::Debug for FnSteps<P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSteps").finish_non_exhaustive()
    }
}
