/*!
[MetadataCatalog] composes the four stores behind a single query API, and
exposes `put_*` writers that serialize a record via `codec` and then apply
the same update the loader would.
*/

use std::io::Write;

use crate::codec::desc::Desc;
use crate::codec::indom::Instance;
use crate::codec::label::LabelSet;
use crate::codec::{self, framing, RecordType, TimestampVersion};
use crate::error::Result;
use crate::pmns::NameTree;
use crate::store::desc::{DescInsert, DescStore};
use crate::store::indom::{IndomInsert, IndomStore};
use crate::store::label::LabelStore;
use crate::store::text::TextStore;
use crate::timestamp::Timestamp;

/// The in-memory indexed store populated by scanning an archive's metadata
/// stream. A catalog is single-writer, multi-reader per archive context:
/// callers take `&mut MetadataCatalog` to load or write, `&MetadataCatalog`
/// to query.
#[derive(Debug, Default)]
pub struct MetadataCatalog {
    pub(crate) descs: DescStore,
    pub(crate) indoms: IndomStore,
    pub(crate) labels: LabelStore,
    pub(crate) texts: TextStore,
}

impl MetadataCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        MetadataCatalog::default()
    }

    // ---- Query API ------------------------------------------------------

    /// Look up the descriptor registered for `pmid`.
    pub fn lookup_desc(&self, pmid: u32) -> Result<&Desc> {
        self.descs.lookup(pmid)
    }

    /// Return `(inst_ids, names)` for the instance domain snapshot at or
    /// before `stamp`, or the latest snapshot if `stamp` is `None`.
    pub fn get_indom(
        &self,
        indom: u32,
        stamp: Option<Timestamp>,
    ) -> Result<(Vec<i32>, Vec<String>)> {
        let snapshot = self.indoms.search_indom(indom, stamp)?;
        let ids = snapshot.instances.iter().map(|i| i.id).collect();
        let names = snapshot.instances.iter().map(|i| i.name.clone()).collect();
        Ok((ids, names))
    }

    /// Resolve an instance name to its id, exact match first then
    /// prefix-up-to-first-space fallback.
    pub fn lookup_indom(&self, indom: u32, stamp: Option<Timestamp>, name: &str) -> Result<i32> {
        self.indoms.lookup_indom(indom, stamp, name)
    }

    /// Resolve an instance id to its name.
    pub fn name_in_indom(&self, indom: u32, stamp: Option<Timestamp>, inst: i32) -> Result<&str> {
        self.indoms.name_in_indom(indom, stamp, inst)
    }

    /// Look up the label sets for `(label_type, ident)` at or before
    /// `stamp`.
    pub fn lookup_label(
        &self,
        label_type: u32,
        ident: u32,
        stamp: Option<Timestamp>,
    ) -> Result<&[LabelSet]> {
        self.labels.lookup_label(label_type, ident, stamp)
    }

    /// Look up the help/oneline text for `(ident, text_type)`.
    pub fn lookup_text(&self, ident: u32, text_type: u32) -> Result<&str> {
        self.texts.lookup_text(ident, text_type)
    }

    /// The deduplicated union of instances across every snapshot ever
    /// recorded for `indom`.
    pub fn get_indom_union(&self, indom: u32) -> Result<Vec<Instance>> {
        self.indoms.get_indom_union(indom)
    }

    /// Run the label store's post-load de-duplication pass. The loader calls
    /// this once after scanning an archive; incremental writers may call it
    /// again if they want duplicate equal-timestamp label groups reaped
    /// sooner.
    pub fn check_dup_labels(&mut self) {
        self.labels.check_dup_labels();
    }

    // ---- Writers (the inverse of the loader) -----------------------------

    /// Write a `DESC` record to `sink`, apply the same descriptor-conflict
    /// rules the loader would, and register each name in `names` the way
    /// [`crate::loader::load_archive`] does.
    pub fn put_desc<W: Write>(
        &mut self,
        sink: &mut W,
        desc: Desc,
        record_names: &[String],
        names: &mut dyn NameTree,
    ) -> Result<DescInsert> {
        let payload = codec::desc::encode(&desc, record_names)?;
        framing::write_record(sink, RecordType::Desc.to_tag(), &payload)?;
        let outcome = self.descs.add_desc(desc)?;
        for name in record_names {
            let _ = names.insert(name, desc.pmid);
        }
        Ok(outcome)
    }

    /// Write an `INDOM` record (V3 timestamp encoding) to `sink` and apply
    /// the time-ordered dedup insert the loader would.
    pub fn put_indom<W: Write>(
        &mut self,
        sink: &mut W,
        indom: u32,
        stamp: Timestamp,
        instances: Vec<Instance>,
    ) -> Result<IndomInsert> {
        let payload = codec::indom::encode(indom, stamp, &instances, TimestampVersion::V3)?;
        framing::write_record(sink, RecordType::Indom.to_tag(), &payload)?;
        Ok(self.indoms.add_indom(indom, stamp, instances))
    }

    /// Write a `LABEL` record (V3 timestamp encoding) to `sink` and apply
    /// the insert-ordered-by-time update the loader would. Callers that
    /// write at equal timestamps out of chronological order should call
    /// [MetadataCatalog::check_dup_labels] afterwards.
    pub fn put_label<W: Write>(
        &mut self,
        sink: &mut W,
        label_type: u32,
        ident: u32,
        stamp: Timestamp,
        sets: Vec<LabelSet>,
    ) -> Result<()> {
        let payload =
            codec::label::encode(label_type, ident, stamp, &sets, TimestampVersion::V3)?;
        framing::write_record(sink, RecordType::Label.to_tag(), &payload)?;
        self.labels.add_label(label_type, ident, stamp, sets);
        Ok(())
    }

    /// Write a `TEXT` record to `sink` and apply the overwrite-or-no-op
    /// update the loader would.
    pub fn put_text<W: Write>(
        &mut self,
        sink: &mut W,
        ident: u32,
        text_type: u32,
        text: String,
    ) -> Result<()> {
        let payload = codec::text::encode(text_type, ident, &text)?;
        framing::write_record(sink, RecordType::Text.to_tag(), &payload)?;
        self.texts.add_text(ident, text_type, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::text::{TEXT_HELP, TEXT_PMID};
    use crate::pmns::FlatNameTree;

    #[test]
    fn put_desc_round_trips_through_the_sink() {
        let mut catalog = MetadataCatalog::new();
        let mut sink = Vec::new();
        let mut names = FlatNameTree::new();
        let desc = Desc {
            pmid: 1,
            type_: 0,
            sem: 0,
            indom: 0,
            units: 0,
        };
        catalog
            .put_desc(&mut sink, desc, &["disk.dev.read".to_string()], &mut names)
            .unwrap();

        let mut cursor = &sink[..];
        let header = framing::read_header(&mut cursor).unwrap().unwrap();
        assert_eq!(RecordType::from_tag(header.tag), RecordType::Desc);
        let payload = framing::read_payload(&mut cursor, header.payload_len().unwrap()).unwrap();
        let (decoded, decoded_names) = codec::desc::decode(&payload).unwrap();
        assert_eq!(decoded, desc);
        assert_eq!(decoded_names, vec!["disk.dev.read".to_string()]);

        assert_eq!(catalog.lookup_desc(1).unwrap(), &desc);
        assert_eq!(names.lookup("disk.dev.read"), Some(1));
    }

    #[test]
    fn put_text_then_query_round_trips() {
        let mut catalog = MetadataCatalog::new();
        let mut sink = Vec::new();
        catalog
            .put_text(&mut sink, 9, TEXT_HELP | TEXT_PMID, "disk reads".to_string())
            .unwrap();
        assert_eq!(
            catalog.lookup_text(9, TEXT_HELP | TEXT_PMID).unwrap(),
            "disk reads"
        );
    }
}
