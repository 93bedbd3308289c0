//! Named record catalogs.
//!
//! Every process record (wafer, layer, assembly, test, interconnect) is looked
//! up by a unique name. A [`Catalog`] keeps records in insertion order and
//! hands out shared handles so that many chips, possibly evaluated on
//! different threads, can refer to the same record.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A record that is identified by its name.
pub trait Named {
    /// Unique name within the record's catalog.
    fn name(&self) -> &str;
}

/// An insertion-ordered collection of named records.
///
/// Once [`freeze`](Catalog::freeze) is called the catalog rejects further
/// inserts, which allows it to be published to evaluators safely.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    kind: &'static str,
    entries: IndexMap<String, Arc<T>>,
    frozen: bool,
}

impl<T: Named> Catalog<T> {
    /// Create an empty catalog. `kind` is used in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
            frozen: false,
        }
    }

    /// Build a catalog from a list of records, rejecting duplicate names.
    pub fn from_records(kind: &'static str, records: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut catalog = Self::new(kind);
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    /// Add a record.
    pub fn insert(&mut self, record: T) -> Result<()> {
        let name = record.name().to_string();
        if self.frozen {
            return Err(Error::Frozen {
                kind: self.kind,
                name,
            });
        }
        if name.is_empty() {
            return Err(Error::EmptyName(self.kind));
        }
        if self.entries.contains_key(&name) {
            return Err(Error::Duplicate {
                kind: self.kind,
                name,
            });
        }
        self.entries.insert(name, Arc::new(record));
        Ok(())
    }

    /// Get a record by name.
    pub fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.entries.get(name)
    }

    /// Get a shared handle to a record, failing if the name is unknown.
    pub fn lookup(&self, name: &str) -> Result<Arc<T>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    /// Reject all further inserts.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the catalog has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Record kind used in diagnostics.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.entries.values()
    }

    /// Record names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
