//! Named probe registry.
//!
//! # Design Decisions
//! - Names are unique and immutable once registered
//! - Mutation needs `&mut self`; a check pass works on a `snapshot()`, so
//!   registration cannot race a pass
//! - Iteration order is unspecified

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::health::Probe;

/// Errors raised while registering probes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("probe name must not be empty")]
    EmptyName,

    #[error("probe '{0}' is already registered")]
    Duplicate(String),
}

/// Mapping from probe name to probe.
#[derive(Clone, Default)]
pub struct Registry {
    probes: HashMap<String, Arc<dyn Probe>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one named probe.
    pub fn register<P>(&mut self, name: impl Into<String>, probe: P) -> Result<(), RegistryError>
    where
        P: Probe + 'static,
    {
        self.register_arc(name, Arc::new(probe))
    }

    /// Add a probe that is already shared.
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        probe: Arc<dyn Probe>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.probes.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!(probe = %name, "Probe registered");
        self.probes.insert(name, probe);
        Ok(())
    }

    /// Name/probe pairs for one check pass.
    pub fn snapshot(&self) -> Vec<(String, Arc<dyn Probe>)> {
        self.probes
            .iter()
            .map(|(name, probe)| (name.clone(), Arc::clone(probe)))
            .collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.probes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("probes", &self.names())
            .finish()
    }
}
