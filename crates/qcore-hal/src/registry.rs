//! A construction-time registry of provider factories.
//!
//! This is distinct from the dispatcher's runtime registry of *initialized*
//! providers and their devices (see `qcore-sched`): this one only answers
//! "given a provider tag, how do I build one?" — the dispatcher calls
//! `create` once per `register_provider`, then owns the resulting instance.

use rustc_hash::FxHashMap;
use tracing::debug;

use qcore_types::CoreResult;

use crate::provider::Provider;

type ProviderFactory = Box<dyn Fn() -> CoreResult<Box<dyn Provider>> + Send + Sync>;

/// Maps provider tags to constructors for the `Provider` implementations
/// compiled into this binary.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: FxHashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Register a constructor under `tag`. Re-registering the same tag
    /// replaces the previous constructor.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        factory: impl Fn() -> CoreResult<Box<dyn Provider>> + Send + Sync + 'static,
    ) {
        let tag = tag.into();
        debug!(tag = %tag, "registering provider factory");
        self.factories.insert(tag, Box::new(factory));
    }

    /// Construct a fresh provider instance for `tag`.
    pub fn create(&self, tag: &str) -> CoreResult<Box<dyn Provider>> {
        let factory = self.factories.get(tag).ok_or_else(|| {
            qcore_types::ErrorKind::DeviceNotFound(format!("no provider factory registered for '{tag}'"))
        })?;
        factory()
    }

    /// Tags with a registered factory, sorted.
    pub fn available_tags(&self) -> Vec<String> {
        let mut tags: Vec<_> = self.factories.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub fn has(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }
}
