/*!
The descriptor store: a map from `pmid` to its frozen [Desc].
*/

use std::collections::HashMap;

use crate::codec::desc::Desc;
use crate::error::{DescriptorField, Error, Result};

/// Outcome of [DescStore::add_desc].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescInsert {
    /// No descriptor existed for this `pmid`; it was inserted.
    Inserted,
    /// A descriptor already existed and matched field-for-field; nothing
    /// changed.
    Unchanged,
}

/// Map from metric id to its descriptor. Descriptors are frozen after their
/// first insert: `(type_, sem, indom, units)` must never change for a given
/// `pmid`.
#[derive(Debug, Default)]
pub struct DescStore {
    descs: HashMap<u32, Desc>,
}

impl DescStore {
    /// Create an empty descriptor store.
    pub fn new() -> Self {
        DescStore::default()
    }

    /// Insert `desc`, or validate it against the existing descriptor for the
    /// same `pmid`. Returns the first field that changed as a typed error;
    /// it does not matter that later fields might also differ, since the
    /// record is rejected on the first mismatch either way.
    pub fn add_desc(&mut self, desc: Desc) -> Result<DescInsert> {
        match self.descs.get(&desc.pmid) {
            None => {
                self.descs.insert(desc.pmid, desc);
                Ok(DescInsert::Inserted)
            }
            Some(existing) => {
                if existing.type_ != desc.type_ {
                    return Err(Error::DescriptorChanged {
                        pmid: desc.pmid,
                        field: DescriptorField::Type,
                    });
                }
                if existing.sem != desc.sem {
                    return Err(Error::DescriptorChanged {
                        pmid: desc.pmid,
                        field: DescriptorField::Semantics,
                    });
                }
                if existing.indom != desc.indom {
                    return Err(Error::DescriptorChanged {
                        pmid: desc.pmid,
                        field: DescriptorField::Indom,
                    });
                }
                if existing.units != desc.units {
                    return Err(Error::DescriptorChanged {
                        pmid: desc.pmid,
                        field: DescriptorField::Units,
                    });
                }
                Ok(DescInsert::Unchanged)
            }
        }
    }

    /// Look up the descriptor registered for `pmid`.
    pub fn lookup(&self, pmid: u32) -> Result<&Desc> {
        self.descs.get(&pmid).ok_or(Error::PmidNotFound(pmid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(pmid: u32, type_: i32, sem: i32, indom: u32, units: u32) -> Desc {
        Desc {
            pmid,
            type_,
            sem,
            indom,
            units,
        }
    }

    #[test]
    fn s1_descriptor_conflict() {
        let mut store = DescStore::new();
        assert_eq!(
            store.add_desc(desc(1, 10, 20, 42, 1)).unwrap(),
            DescInsert::Inserted
        );

        let err = store.add_desc(desc(1, 99, 20, 42, 1)).unwrap_err();
        assert!(matches!(
            err,
            Error::DescriptorChanged {
                field: DescriptorField::Type,
                pmid: 1
            }
        ));

        let err = store.add_desc(desc(1, 10, 20, 42, 2)).unwrap_err();
        assert!(matches!(
            err,
            Error::DescriptorChanged {
                field: DescriptorField::Units,
                pmid: 1
            }
        ));
    }

    #[test]
    fn reinsert_identical_descriptor_is_unchanged() {
        let mut store = DescStore::new();
        store.add_desc(desc(1, 10, 20, 42, 1)).unwrap();
        assert_eq!(
            store.add_desc(desc(1, 10, 20, 42, 1)).unwrap(),
            DescInsert::Unchanged
        );
    }

    #[test]
    fn lookup_missing_pmid_is_not_found() {
        let store = DescStore::new();
        assert!(matches!(store.lookup(1), Err(Error::PmidNotFound(1))));
    }
}
