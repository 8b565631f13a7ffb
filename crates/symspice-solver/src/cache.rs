//! Version-keyed result cache.
//!
//! Results are keyed by the quantity queried; the whole cache belongs to
//! one netlist version. Any topology or value change bumps the netlist
//! version and the next lookup drops every stored result. There is no
//! partial invalidation. Failed solves store nothing.

use indexmap::IndexMap;
use symspice_core::NodeId;

use crate::error::Result;
use crate::superpose::CompositeResult;

/// What a cached entry answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Quantity {
    NodeVoltage(NodeId),
    BranchCurrent(String),
}

#[derive(Debug, Default)]
pub struct ResultCache {
    version: u64,
    entries: IndexMap<Quantity, CompositeResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything if the netlist has changed since the last access.
    fn sync(&mut self, version: u64) {
        if self.version != version {
            self.entries.clear();
            self.version = version;
        }
    }

    /// Fetch the cached result for a quantity at the given netlist
    /// version, computing and storing it on a miss.
    pub fn get_or_compute(
        &mut self,
        version: u64,
        quantity: Quantity,
        compute: impl FnOnce() -> Result<CompositeResult>,
    ) -> Result<CompositeResult> {
        self.sync(version);
        if let Some(hit) = self.entries.get(&quantity) {
            return Ok(hit.clone());
        }
        let result = compute()?;
        self.entries.insert(quantity, result.clone());
        Ok(result)
    }

    /// Number of live entries (test probe).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
