//! Global registry of kernel family declarations.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use snafu::OptionExt;

use crate::declaration::TuningDeclaration;
use crate::error::{Result, UnknownFamilySnafu};
use crate::kernels::xgemm_direct;

/// Builds a fresh declaration for one kernel family.
pub type DeclarationFactory = Arc<dyn Fn() -> Result<TuningDeclaration> + Send + Sync>;

pub struct KernelRegistry {
    families: RwLock<BTreeMap<String, DeclarationFactory>>,
}

impl KernelRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { families: RwLock::new(BTreeMap::new()) }
    }

    /// A registry holding the built-in kernel families.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(xgemm_direct::LIMITED, xgemm_direct::limited);
        registry.register(xgemm_direct::SAMPLED, xgemm_direct::sampled);
        registry
    }

    /// Register `factory` under `family`, returning the factory it replaces.
    pub fn register(
        &self,
        family: impl Into<String>,
        factory: impl Fn() -> Result<TuningDeclaration> + Send + Sync + 'static,
    ) -> Option<DeclarationFactory> {
        self.families.write().insert(family.into(), Arc::new(factory))
    }

    /// Build the declaration registered under `family`.
    pub fn get(&self, family: &str) -> Result<TuningDeclaration> {
        // Factory runs outside the lock.
        let factory = self.families.read().get(family).cloned().context(UnknownFamilySnafu { name: family })?;
        factory()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.read().contains_key(family)
    }

    /// Registered family names, sorted.
    pub fn families(&self) -> Vec<String> {
        self.families.read().keys().cloned().collect()
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Global kernel registry instance.
static REGISTRY: Lazy<KernelRegistry> = Lazy::new(KernelRegistry::with_builtin);

/// Get the global kernel registry.
pub fn registry() -> &'static KernelRegistry {
    &REGISTRY
}

/// Convenience function to build a registered declaration by family name.
pub fn declaration(family: &str) -> Result<TuningDeclaration> {
    registry().get(family)
}
