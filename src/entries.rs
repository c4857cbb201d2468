//! Process-wide table of global functions.
//!
//! The host registers entries once at start-up (`t`, `site`, ...); every
//! evaluation can then reach them as variables or as `name(args)` calls.
//! The table is append-only and can be frozen once initialization is done.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{RegistryError, ResolutionError};
use crate::value::{Function, Value};

static GLOBAL: LazyLock<Arc<Entries>> = LazyLock::new(|| Arc::new(Entries::new()));

/// Append-only name → function table.
#[derive(Debug, Default)]
pub struct Entries {
    table: RwLock<HashMap<String, Function>>,
    frozen: AtomicBool,
}

impl Entries {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`crate::evaluate`].
    pub fn global() -> Arc<Entries> {
        Arc::clone(&GLOBAL)
    }

    /// Add an entry. Names cannot be replaced and nothing can be added
    /// after [`Entries::freeze`].
    pub fn register<F>(&self, name: impl Into<String>, func: F) -> Result<(), RegistryError>
    where
        F: Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.is_frozen() {
            warn!(name = %name, "rejected entry registration on frozen registry");
            return Err(RegistryError::Frozen(name));
        }

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains_key(&name) {
            warn!(name = %name, "rejected duplicate entry registration");
            return Err(RegistryError::AlreadyRegistered(name));
        }
        debug!(name = %name, "registered query entry");
        table.insert(name.clone(), Function::new(name, func));
        Ok(())
    }

    /// Register an entry that always returns `value`.
    pub fn register_value(
        &self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<(), RegistryError> {
        self.register(name, move |_| Ok(value.clone()))
    }

    /// Make the table read-only.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn get(&self, name: &str) -> Option<Function> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Register an entry in the process-wide registry.
pub fn register_entry<F>(name: impl Into<String>, func: F) -> Result<(), RegistryError>
where
    F: Fn(&[Value]) -> Result<Value, ResolutionError> + Send + Sync + 'static,
{
    Entries::global().register(name, func)
}
