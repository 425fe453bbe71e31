//! The staged builder.
//!
//! A [`Builder`] advances one artifact through the stages
//! initialized → processed → built. Each stage is represented by a typed
//! [`BuilderTarget`], so calling an operation out of order does not compile:
//!
//! ```
//! use templa::{Builder, Config, EmptyConfigData, FnSteps, InlineTemplate};
//!
//! let mut builder = Builder::new(
//!     Config::<EmptyConfigData>::from_value(serde_json::json!({})).unwrap(),
//!     InlineTemplate::new("hello"),
//!     FnSteps::new(
//!         |rendered: &str| Ok(rendered.to_uppercase()),
//!         |processed: String| Ok(processed.len()),
//!     ),
//! );
//!
//! let initialized = builder.init_builder_target();
//! let processed = builder.process_template(initialized).unwrap();
//! let built = builder.build(processed).unwrap();
//!
//! assert_eq!(builder.fetch_processed(&built).unwrap(), "HELLO");
//! assert_eq!(*builder.fetch_built(&built).unwrap(), 5);
//! ```
//!
//! Targets additionally carry the identity of the builder that minted them,
//! and the builder keeps its own stage, so a target from another builder or a
//! second attempt to advance the same stage fails at runtime.

mod stage;
mod steps;

pub use stage::{
    BuilderId, BuilderTarget, Built, Initialized, Processed, ProcessedOrLater, Stage, StageTag,
};
pub use steps::{BuildSteps, FnSteps};

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::{Config, ConfigData, RenderContext};
use crate::error::{Result, TemplaError};
use crate::template::TemplateGettable;

/// Derived state accumulated while advancing.
#[derive(Clone)]
enum Progress<P, B> {
    Initialized,
    Processed {
        rendered: String,
        processed: P,
    },
    Built {
        rendered: String,
        processed: P,
        built: B,
    },
}

impl<P, B> Progress<P, B> {
    fn stage(&self) -> Stage {
        match self {
            Progress::Initialized => Stage::Initialized,
            Progress::Processed { .. } => Stage::Processed,
            Progress::Built { .. } => Stage::Built,
        }
    }
}

/// Runs the config → render → parse → build pipeline for one artifact.
///
/// `P` is the processed type (the parsed rendered template), `B` the built
/// type, `D` the config data record providing the rendering context.
pub struct Builder<P, B, D> {
    id: BuilderId,
    config: Config<D>,
    template_getter: Arc<dyn TemplateGettable>,
    steps: Arc<dyn BuildSteps<P, B>>,
    progress: Progress<P, B>,
}

impl<P, B, D> Builder<P, B, D>
where
    P: 'static,
    B: 'static,
    D: ConfigData,
{
    pub fn new<T, S>(config: Config<D>, template_getter: T, steps: S) -> Self
    where
        T: TemplateGettable + 'static,
        S: BuildSteps<P, B> + 'static,
    {
        let id = BuilderId::next();
        debug!(builder = %id, "created builder");
        Self {
            id,
            config,
            template_getter: Arc::new(template_getter),
            steps: Arc::new(steps),
            progress: Progress::Initialized,
        }
    }

    /// Create a builder from a parse function and a build function.
    pub fn from_fns<T, F, G>(config: Config<D>, template_getter: T, parse: F, build: G) -> Self
    where
        T: TemplateGettable + 'static,
        F: Fn(&str) -> anyhow::Result<P> + 'static,
        G: Fn(P) -> anyhow::Result<B> + 'static,
    {
        Self::new(config, template_getter, FnSteps::new(parse, build))
    }
}

impl<P, B, D> Builder<P, B, D>
where
    D: ConfigData,
{
    /// Identity of this builder instance.
    pub fn id(&self) -> BuilderId {
        self.id
    }

    /// How far this builder has advanced.
    pub fn stage(&self) -> Stage {
        self.progress.stage()
    }

    pub fn config(&self) -> &Config<D> {
        &self.config
    }

    pub fn template_getter(&self) -> &dyn TemplateGettable {
        self.template_getter.as_ref()
    }

    fn check_same_instance<S: StageTag>(&self, target: &BuilderTarget<S>) -> Result<()> {
        if target.builder_id() != self.id {
            let stage = S::STAGE;
            warn!(
                builder = %self.id,
                target = %target.builder_id(),
                stage = %stage,
                "rejected target of another builder instance"
            );
            return Err(TemplaError::NotSameBuilderInstance {
                expected: self.id,
                found: target.builder_id(),
            });
        }
        Ok(())
    }

    fn stage_violation(&self, operation: &'static str) -> TemplaError {
        warn!(builder = %self.id, stage = %self.stage(), operation, "rejected out of order operation");
        TemplaError::StageViolation {
            current: self.stage(),
            operation,
        }
    }

    /// The initial target of this builder.
    pub fn init_builder_target(&self) -> BuilderTarget<Initialized> {
        trace!(builder = %self.id, "minted initial target");
        BuilderTarget::new(self.id)
    }

    /// A copy of the rendering context derived from the config, loading the
    /// config data on first use.
    pub fn fetch_render_context<S: StageTag>(
        &mut self,
        target: &BuilderTarget<S>,
    ) -> Result<RenderContext> {
        self.check_same_instance(target)?;
        Ok(self.config.get_render_context()?.clone())
    }

    /// Render the template against the rendering context and parse the
    /// result into the processed value.
    ///
    /// Fails with [`TemplaError::StageViolation`] when the template has
    /// already been processed, even with a freshly minted initial target.
    pub fn process_template(
        &mut self,
        target: BuilderTarget<Initialized>,
    ) -> Result<BuilderTarget<Processed>> {
        self.check_same_instance(&target)?;
        if self.stage() != Stage::Initialized {
            return Err(self.stage_violation("process_template"));
        }

        let mut context = self.fetch_render_context(&target)?;
        self.steps
            .extend_render_context(&mut context)
            .map_err(TemplaError::Context)?;

        let template = self.template_getter.get_template()?;
        let rendered = template.render(&context)?;
        let processed = self
            .steps
            .parse_rendered_template(&rendered)
            .map_err(TemplaError::Parse)?;

        debug!(
            builder = %self.id,
            template = template.name(),
            bytes = rendered.len(),
            "processed template"
        );
        self.progress = Progress::Processed {
            rendered,
            processed,
        };
        Ok(BuilderTarget::new(self.id))
    }

    /// Build the artifact from a copy of the processed value.
    ///
    /// Only a processed target is accepted; building straight from the
    /// initial target is a type error:
    ///
    /// ```compile_fail
    /// use templa::{Builder, Config, EmptyConfigData, FnSteps, InlineTemplate};
    ///
    /// let mut builder = Builder::new(
    ///     Config::<EmptyConfigData>::new(Default::default()),
    ///     InlineTemplate::new("x"),
    ///     FnSteps::new(|s: &str| Ok(s.to_string()), |p: String| Ok(p)),
    /// );
    /// let initialized = builder.init_builder_target();
    /// builder.build(initialized).unwrap();
    /// ```
    pub fn build(&mut self, target: BuilderTarget<Processed>) -> Result<BuilderTarget<Built>>
    where
        P: Clone,
    {
        self.check_same_instance(&target)?;
        let processed = match &self.progress {
            Progress::Processed { processed, .. } => processed.clone(),
            _ => return Err(self.stage_violation("build")),
        };

        let built = self
            .steps
            .build_processed(processed)
            .map_err(TemplaError::Build)?;

        self.progress = match std::mem::replace(&mut self.progress, Progress::Initialized) {
            Progress::Processed {
                rendered,
                processed,
            } => Progress::Built {
                rendered,
                processed,
                built,
            },
            other => other,
        };
        debug!(builder = %self.id, "built artifact");
        Ok(BuilderTarget::new(self.id))
    }

    /// The processed value, unaffected by anything the build step did to
    /// its copy.
    pub fn fetch_processed<S: ProcessedOrLater>(&self, target: &BuilderTarget<S>) -> Result<&P> {
        self.check_same_instance(target)?;
        match &self.progress {
            Progress::Processed { processed, .. } | Progress::Built { processed, .. } => {
                Ok(processed)
            }
            Progress::Initialized => Err(self.stage_violation("fetch_processed")),
        }
    }

    /// The rendered template text the processed value was parsed from.
    pub fn fetch_rendered<S: ProcessedOrLater>(&self, target: &BuilderTarget<S>) -> Result<&str> {
        self.check_same_instance(target)?;
        match &self.progress {
            Progress::Processed { rendered, .. } | Progress::Built { rendered, .. } => {
                Ok(rendered)
            }
            Progress::Initialized => Err(self.stage_violation("fetch_rendered")),
        }
    }

    /// The built artifact.
    pub fn fetch_built(&self, target: &BuilderTarget<Built>) -> Result<&B> {
        self.check_same_instance(target)?;
        match &self.progress {
            Progress::Built { built, .. } => Ok(built),
            _ => Err(self.stage_violation("fetch_built")),
        }
    }

    /// Consume the builder and return the built artifact.
    pub fn into_built(self, target: BuilderTarget<Built>) -> Result<B> {
        self.check_same_instance(&target)?;
        match self.progress {
            Progress::Built { built, .. } => Ok(built),
            _ => Err(self.stage_violation("into_built")),
        }
    }
}

/// Cloning yields a separate builder instance with its own identity; targets
/// of the original are rejected by the clone.
impl<P, B, D> Clone for Builder<P, B, D>
where
    P: Clone,
    B: Clone,
    D: Clone,
{
    fn clone(&self) -> Self {
        Self {
            id: BuilderId::next(),
            config: self.config.clone(),
            template_getter: Arc::clone(&self.template_getter),
            steps: Arc::clone(&self.steps),
            progress: self.progress.clone(),
        }
    }
}

impl<P, B, D> fmt::Debug for Builder<P, B, D>
where
    D: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("id", &self.id)
            .field("stage", &self.progress.stage())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
