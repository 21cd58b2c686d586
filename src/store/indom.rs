/*!
The instance domain history store: a time-ordered, de-duplicated chain of
[InDomSnapshot]s per indom.
*/

use std::collections::HashMap;

use crate::codec::indom::Instance;
use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// A point-in-time snapshot of one instance domain's instances.
///
/// Chains are modeled as plain owned `Vec<InDomSnapshot>`, not intrusive
/// linked nodes, so there is no manual free/ownership bookkeeping to get
/// right. `instances` is always kept sorted ascending by id, which both
/// satisfies the data-model invariant and makes content equality a plain
/// `Vec` comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InDomSnapshot {
    /// The instance domain this snapshot belongs to.
    pub indom: u32,
    /// When this snapshot was recorded.
    pub stamp: Timestamp,
    /// Instances, sorted ascending by id.
    pub instances: Vec<Instance>,
}

impl InDomSnapshot {
    /// Two snapshots are content-equal iff they have the same instances:
    /// same count, identical `(id, name)` pairs elementwise once both are
    /// sorted, which they always are here.
    fn content_eq(&self, other: &InDomSnapshot) -> bool {
        self.instances == other.instances
    }
}

/// Outcome of [IndomStore::add_indom].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndomInsert {
    /// The snapshot was new content and was inserted into its chain.
    Inserted,
    /// The snapshot's content duplicated an existing snapshot at the same
    /// timestamp; the existing one was moved to the head of that
    /// timestamp's run and the new instances were discarded.
    Duplicate,
}

/// Insertion sort by ascending instance id, used instead of a general-purpose
/// sort because wire order is expected to already be near-sorted, which
/// makes insertion sort's near-linear best case the right tool, and it is
/// stable and simple to reason about for the small `numinst` this format
/// sees in practice.
fn insertion_sort_by_id(instances: &mut [Instance]) {
    for i in 1..instances.len() {
        let mut j = i;
        while j > 0 && instances[j - 1].id > instances[j].id {
            instances.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Map from indom id to its time-ordered (descending) chain of snapshots.
#[derive(Debug, Default)]
pub struct IndomStore {
    chains: HashMap<u32, Vec<InDomSnapshot>>,
}

impl IndomStore {
    /// Create an empty indom store.
    pub fn new() -> Self {
        IndomStore::default()
    }

    /// Insert a new snapshot, sorting its instances and applying the
    /// time-slot-head duplicate rule.
    pub fn add_indom(
        &mut self,
        indom: u32,
        stamp: Timestamp,
        mut instances: Vec<Instance>,
    ) -> IndomInsert {
        insertion_sort_by_id(&mut instances);
        let snapshot = InDomSnapshot {
            indom,
            stamp,
            instances,
        };
        let chain = self.chains.entry(indom).or_default();

        if chain.is_empty() {
            chain.push(snapshot);
            return IndomInsert::Inserted;
        }

        // Advance while strictly newer than the candidate; this lands on
        // either the first entry <= stamp, or the end of the chain.
        let mut i = 0;
        while i < chain.len() && chain[i].stamp > stamp {
            i += 1;
        }

        if i == chain.len() || chain[i].stamp < stamp {
            chain.insert(i, snapshot);
            return IndomInsert::Inserted;
        }

        // chain[i].stamp == stamp: i is the time-slot anchor, the head of
        // the run of equal timestamps. Scan the run for a content match.
        let anchor = i;
        let mut j = i;
        while j < chain.len() && chain[j].stamp == stamp {
            if chain[j].content_eq(&snapshot) {
                let existing = chain.remove(j);
                chain.insert(anchor, existing);
                return IndomInsert::Duplicate;
            }
            j += 1;
        }

        chain.insert(anchor, snapshot);
        IndomInsert::Inserted
    }

    /// Return the snapshot at or before `stamp`, or the latest snapshot if
    /// `stamp` is `None`.
    pub fn search_indom(&self, indom: u32, stamp: Option<Timestamp>) -> Result<&InDomSnapshot> {
        let chain = self
            .chains
            .get(&indom)
            .filter(|c| !c.is_empty())
            .ok_or(Error::IndomNotFound(indom))?;

        match stamp {
            None => Ok(&chain[0]),
            Some(stamp) => chain
                .iter()
                .find(|s| s.stamp <= stamp)
                .ok_or(Error::InstanceNotFound { indom }),
        }
    }

    /// Resolve an instance name to its id within the snapshot at or before
    /// `stamp`. Tries an exact match first, then falls back to a
    /// prefix-up-to-first-space match — the fallback exists for backward
    /// compatibility only and must not be used as the primary lookup
    /// strategy.
    pub fn lookup_indom(&self, indom: u32, stamp: Option<Timestamp>, name: &str) -> Result<i32> {
        let snapshot = self.search_indom(indom, stamp)?;
        if let Some(inst) = snapshot.instances.iter().find(|i| i.name == name) {
            return Ok(inst.id);
        }
        let prefix = name.split(' ').next().unwrap_or(name);
        snapshot
            .instances
            .iter()
            .find(|i| i.name.split(' ').next().unwrap_or(&i.name) == prefix)
            .map(|i| i.id)
            .ok_or(Error::InstanceNotFound { indom })
    }

    /// Resolve an instance id to its name within the snapshot at or before
    /// `stamp`.
    pub fn name_in_indom(&self, indom: u32, stamp: Option<Timestamp>, inst: i32) -> Result<&str> {
        let snapshot = self.search_indom(indom, stamp)?;
        snapshot
            .instances
            .iter()
            .find(|i| i.id == inst)
            .map(|i| i.name.as_str())
            .ok_or(Error::InstanceNotFound { indom })
    }

    /// The union of instances across every snapshot ever recorded for
    /// `indom`, deduplicated by id, preserving first-seen names.
    ///
    /// Chains are stored newest-first, so the walk below runs oldest-first
    /// to make "first-seen" mean the oldest recorded name for a given id.
    /// The dedup table is built on the stack, local to this call — never as
    /// shared state — so there is no shared scratch structure for concurrent
    /// callers to race on.
    pub fn get_indom_union(&self, indom: u32) -> Result<Vec<Instance>> {
        let chain = self
            .chains
            .get(&indom)
            .filter(|c| !c.is_empty())
            .ok_or(Error::IndomNotFound(indom))?;

        let mut seen = HashMap::new();
        let mut union = Vec::new();
        for snapshot in chain.iter().rev() {
            for inst in &snapshot.instances {
                if seen.insert(inst.id, ()).is_none() {
                    union.push(inst.clone());
                }
            }
        }
        Ok(union)
    }
}
