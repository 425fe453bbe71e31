//! Stage markers and the typed builder targets that carry them.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a single builder instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderId(u64);

impl BuilderId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime view of how far a builder has advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Initialized,
    Processed,
    Built,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Initialized => "initialized",
            Stage::Processed => "processed",
            Stage::Built => "built",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level stage marker.
pub trait StageTag: sealed::Sealed {
    const STAGE: Stage;
}

/// Stages at which a processed value exists.
pub trait ProcessedOrLater: StageTag {}

#[derive(Debug)]
pub enum Initialized {}

#[derive(Debug)]
pub enum Processed {}

#[derive(Debug)]
pub enum Built {}

impl sealed::Sealed for Initialized {}
impl sealed::Sealed for Processed {}
impl sealed::Sealed for Built {}

impl StageTag for Initialized {
    const STAGE: Stage = Stage::Initialized;
}

impl StageTag for Processed {
    const STAGE: Stage = Stage::Processed;
}

impl StageTag for Built {
    const STAGE: Stage = Stage::Built;
}

impl ProcessedOrLater for Processed {}
impl ProcessedOrLater for Built {}

/// A stage-tagged reference to one builder instance.
///
/// Only the builder mints targets. A target is neither `Clone` nor `Copy`:
/// advancing consumes the target of the previous stage.
#[must_use = "a builder target is needed to advance or read the builder"]
pub struct BuilderTarget<S: StageTag> {
    builder: BuilderId,
    _stage: PhantomData<fn() -> S>,
}

impl<S: StageTag> BuilderTarget<S> {
    pub(crate) fn new(builder: BuilderId) -> Self {
        Self {
            builder,
            _stage: PhantomData,
        }
    }

    /// The builder instance this target was minted by.
    pub fn builder_id(&self) -> BuilderId {
        self.builder
    }

    /// The stage this target is tagged with.
    pub fn stage(&self) -> Stage {
        S::STAGE
    }
}

impl<S: StageTag> fmt::Debug for BuilderTarget<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderTarget")
            .field("builder", &self.builder)
            .field("stage", &S::STAGE)
            .finish()
    }
}
