use anyhow::{Result, anyhow};
use std::collections::HashMap;

use super::{AsyncBlockSorter, BarrierSorter, FarmSorter, ParallelForSorter, SequentialSorter, Sorter};

/// Central lookup of sort variants by name.
///
/// The built-in variants are registered on construction; callers can add
/// their own implementations with [`SorterRegistry::register`].
#[derive(Debug)]
pub struct SorterRegistry {
    sorters: HashMap<String, Box<dyn Sorter>>,
}

impl SorterRegistry {
    /// Create a registry with every built-in variant registered
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_sorters();
        registry
    }

    pub fn empty() -> Self {
        Self {
            sorters: HashMap::new(),
        }
    }

    fn register_builtin_sorters(&mut self) {
        self.register(Box::new(SequentialSorter::new()));
        self.register(Box::new(BarrierSorter::new()));
        self.register(Box::new(AsyncBlockSorter::new()));
        self.register(Box::new(ParallelForSorter::new()));
        self.register(Box::new(FarmSorter::new()));
    }

    /// Register a sorter under its own name, replacing any previous entry
    pub fn register(&mut self, sorter: Box<dyn Sorter>) {
        self.sorters.insert(sorter.name().to_string(), sorter);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Sorter> {
        self.sorters.get(name).map(|boxed| boxed.as_ref()).ok_or_else(|| {
            anyhow!(
                "Sort variant '{}' not found (available: {})",
                name,
                self.names().join(", ")
            )
        })
    }

    /// Registered names in lexical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sorters.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, description)` pairs in lexical order
    pub fn describe(&self) -> Vec<(String, String)> {
        self.names()
            .into_iter()
            .map(|name| {
                let description = self.sorters[&name].description().to_string();
                (name, description)
            })
            .collect()
    }
}

impl Default for SorterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
