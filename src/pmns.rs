/*!
The metric namespace (PMNS) is an external collaborator — an opaque
insertable tree mapping names to `pmid`s. This module defines the seam
([NameTree]) the loader and catalog write through, plus a minimal in-memory
implementation that is good enough to exercise the insert semantics in
tests. Production deployments are expected to supply their own tree.
*/

use std::collections::HashMap;

/// A name-to-pmid mapping, standing in for the real PMNS tree.
///
/// `insert` mirrors the PMNS's own duplicate handling: inserting a name that
/// already maps to a *different* pmid is reported via the `bool` return
/// (`false` means "duplicate name, different pmid") rather than an error,
/// since [`crate::loader::load_archive`] downgrades that case to success
/// rather than rejecting the whole archive.
pub trait NameTree {
    /// Insert `name -> pmid`. Returns `true` if the name was newly inserted
    /// or already mapped to the same pmid, `false` if it already mapped to a
    /// different pmid (a conflict the caller is expected to tolerate).
    fn insert(&mut self, name: &str, pmid: u32) -> bool;

    /// Look up the pmid registered for `name`, if any.
    fn lookup(&self, name: &str) -> Option<u32>;
}

/// A flat, in-memory [NameTree] backed by a hash map.
///
/// Real PMNS trees are hierarchical (dotted metric names form a namespace
/// tree); this implementation only needs to preserve the duplicate-name
/// contract the catalog relies on, so it skips the tree structure entirely.
#[derive(Debug, Default)]
pub struct FlatNameTree {
    names: HashMap<String, u32>,
}

impl FlatNameTree {
    /// Create an empty name tree.
    pub fn new() -> Self {
        FlatNameTree::default()
    }
}

impl NameTree for FlatNameTree {
    fn insert(&mut self, name: &str, pmid: u32) -> bool {
        match self.names.get(name) {
            Some(&existing) if existing != pmid => false,
            _ => {
                self.names.insert(name.to_owned(), pmid);
                true
            }
        }
    }

    fn lookup(&self, name: &str) -> Option<u32> {
        self.names.get(name).copied()
    }
}
