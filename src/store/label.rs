/*!
The label history store: a two-level `type -> ident -> chain` map of
[LabelSnapshotGroup]s, with post-load de-duplication.
*/

use std::collections::HashMap;

use crate::codec::label::LabelSet;
use crate::codec::{LABEL_TYPE_COMPOUND, LABEL_TYPE_CONTEXT, LABEL_TYPE_OPTIONAL, PM_ID_NULL};
use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// All label sets recorded for one `(type, ident)` at one point in time.
#[derive(Clone, Debug)]
pub struct LabelSnapshotGroup {
    /// Label type, with `COMPOUND`/`OPTIONAL` already masked off.
    pub label_type: u32,
    /// Identifier this group is scoped to.
    pub ident: u32,
    /// When this group was recorded.
    pub stamp: Timestamp,
    /// The label sets themselves.
    pub sets: Vec<LabelSet>,
}

/// Two-level map from `(type, ident)` to its time-ordered (descending) chain
/// of [LabelSnapshotGroup]s.
#[derive(Debug, Default)]
pub struct LabelStore {
    chains: HashMap<(u32, u32), Vec<LabelSnapshotGroup>>,
}

impl LabelStore {
    /// Create an empty label store.
    pub fn new() -> Self {
        LabelStore::default()
    }

    /// Insert a new group. Masks `COMPOUND`/`OPTIONAL` off `label_type` and
    /// forces `ident` to [PM_ID_NULL] for `CONTEXT`-scoped labels.
    ///
    /// Insertion does not check content equality against existing groups —
    /// duplicates introduced by insertion order are only reaped by a
    /// subsequent [LabelStore::check_dup_labels] pass, not prevented here.
    pub fn add_label(
        &mut self,
        label_type: u32,
        ident: u32,
        stamp: Timestamp,
        sets: Vec<LabelSet>,
    ) {
        let label_type = label_type & !(LABEL_TYPE_COMPOUND | LABEL_TYPE_OPTIONAL);
        let ident = if label_type == LABEL_TYPE_CONTEXT {
            PM_ID_NULL
        } else {
            ident
        };

        let group = LabelSnapshotGroup {
            label_type,
            ident,
            stamp,
            sets,
        };
        let chain = self.chains.entry((label_type, ident)).or_default();

        if chain.is_empty() {
            chain.push(group);
            return;
        }

        // Stop at the first position not newer than the candidate, so equal
        // timestamps land before (ahead of) the existing run: new sorts
        // first among ties.
        let mut i = 0;
        while i < chain.len() && chain[i].stamp > stamp {
            i += 1;
        }
        chain.insert(i, group);
    }

    /// Reap duplicates between adjacent groups in every chain. Must run once
    /// after a load completes; `add_label` alone can leave temporary
    /// duplicates behind for out-of-order writers.
    pub fn check_dup_labels(&mut self) {
        for chain in self.chains.values_mut() {
            let mut k = 0;
            while k + 1 < chain.len() {
                let (head, tail) = chain.split_at_mut(k + 1);
                let newer = &mut head[k];
                let older = &tail[0];
                newer
                    .sets
                    .retain(|set| !older.sets.iter().any(|other| set.content_eq(other)));

                if newer.sets.is_empty() {
                    chain.remove(k);
                } else {
                    k += 1;
                }
            }
        }
    }

    /// Return the label sets for `(type, ident)` at or before `stamp`, or
    /// the latest group if `stamp` is `None`.
    pub fn lookup_label(
        &self,
        label_type: u32,
        ident: u32,
        stamp: Option<Timestamp>,
    ) -> Result<&[LabelSet]> {
        let label_type = label_type & !(LABEL_TYPE_COMPOUND | LABEL_TYPE_OPTIONAL);
        let ident = if label_type == LABEL_TYPE_CONTEXT {
            PM_ID_NULL
        } else {
            ident
        };
        let chain = self
            .chains
            .get(&(label_type, ident))
            .filter(|c| !c.is_empty())
            .ok_or(Error::NoLabels { label_type, ident })?;

        let group = match stamp {
            None => &chain[0],
            Some(stamp) => chain
                .iter()
                .find(|g| g.stamp <= stamp)
                .ok_or(Error::NoLabels { label_type, ident })?,
        };
        Ok(&group.sets)
    }
}
