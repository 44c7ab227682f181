//! # Engine registry.
//!
//! [`Registry`] keeps engines under unique names, in registration order, and
//! drives them by name ([`execute`](Registry::execute)) or as an ordered
//! flow ([`flow`](Registry::flow)).
//!
//! ## Rules
//! - Names are unique; a collision leaves the registry unchanged.
//! - Registration order is kept across deletions.
//! - Engines are cloned out of the lock before any run is awaited.

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::core::{Delegator, Launch, Returns};
use crate::error::RegistryError;

use super::target::Target;

/// Name-keyed, ordered collection of engines.
#[derive(Default)]
pub struct Registry {
    engines: RwLock<IndexMap<String, Delegator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `engine` under `name`.
    pub fn register(&self, engine: Delegator, name: impl Into<String>) -> Result<(), RegistryError> {
        let name = name.into();
        let mut engines = self.engines.write();
        if engines.contains_key(&name) {
            return Err(RegistryError::NameTaken { name });
        }
        engines.insert(name, engine);
        Ok(())
    }

    /// Returns a handle to the engine registered under `name`.
    pub fn get(&self, name: &str) -> Result<Delegator, RegistryError> {
        self.engines
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    /// Removes the engine registered under `name`, keeping the others in order.
    pub fn delete(&self, name: &str) -> Result<Delegator, RegistryError> {
        self.engines
            .write()
            .shift_remove(name)
            .ok_or_else(|| not_found(name))
    }

    /// Runs the engine registered under `name`.
    pub async fn execute(&self, name: &str, launch: Launch) -> Result<(), RegistryError> {
        let engine = self.get(name)?;
        if let Err(e) = engine.run(launch).await {
            tracing::warn!(engine = %name, error = %e, "registry execute failed");
            return Err(e.into());
        }
        Ok(())
    }

    /// Runs the engine at `index`, or every engine in registration order when
    /// `index` is negative.
    ///
    /// A flow over every engine stops at the first failure.
    pub async fn flow(&self, index: isize, launch: Launch) -> Result<(), RegistryError> {
        let selected: Vec<(usize, String, Delegator)> = {
            let engines = self.engines.read();
            match usize::try_from(index) {
                Err(_) => engines
                    .iter()
                    .enumerate()
                    .map(|(i, (name, d))| (i, name.clone(), d.clone()))
                    .collect(),
                Ok(i) => {
                    let (name, d) = engines.get_index(i).ok_or(RegistryError::IndexOutOfRange {
                        index: i,
                        len: engines.len(),
                    })?;
                    vec![(i, name.clone(), d.clone())]
                }
            }
        };

        for (position, name, engine) in selected {
            if let Err(e) = engine.run(launch).await {
                tracing::warn!(position, engine = %name, error = %e, "registry flow stopped");
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Takes the latest snapshot of the selected engine.
    pub async fn back_return(&self, target: impl Into<Target>) -> Result<Returns, RegistryError> {
        let engine = match target.into() {
            Target::Name(name) => self.get(&name)?,
            Target::Index(index) => {
                let engines = self.engines.read();
                engines
                    .get_index(index)
                    .map(|(_, d)| d.clone())
                    .ok_or(RegistryError::IndexOutOfRange {
                        index,
                        len: engines.len(),
                    })?
            }
        };
        Ok(engine.get_returns().await?)
    }

    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.engines.read().keys().cloned().collect()
    }
}

fn not_found(name: &str) -> RegistryError {
    RegistryError::NotFound {
        name: name.to_string(),
    }
}
