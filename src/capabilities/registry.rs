use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use super::{CapabilityDeclaration, GetTime, GetWeather, Handler};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("capability '{name}' is already registered")]
    Duplicate { name: String },
}

/// Name-to-handler map, filled once at startup and read-only afterwards.
#[derive(Default)]
pub struct CapabilityRegistry {
    handlers: Vec<Box<dyn Handler>>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed set offered to the model: `getWeather` and `getTime`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for handler in [
            Box::new(GetWeather) as Box<dyn Handler>,
            Box::new(GetTime) as Box<dyn Handler>,
        ] {
            registry.register_or_warn(handler);
        }
        registry
    }

    /// Registers `handler`, logging and skipping it when the name is taken.
    pub fn register_or_warn(&mut self, handler: Box<dyn Handler>) -> bool {
        match self.register(handler) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "skipping capability registration");
                false
            }
        }
    }

    pub fn register(&mut self, handler: Box<dyn Handler>) -> Result<(), RegistryError> {
        let name = handler.declaration().name;
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate { name });
        }
        debug!(capability = %name, "registered capability");
        self.index.insert(name, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn Handler> {
        self.index
            .get(name)
            .map(|&position| self.handlers[position].as_ref())
    }

    /// Declarations in registration order.
    pub fn declarations(&self) -> Vec<CapabilityDeclaration> {
        self.handlers
            .iter()
            .map(|handler| handler.declaration())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
