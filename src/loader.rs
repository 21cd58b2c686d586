/*!
The sequential scanner that drives the codec and stores while opening an
archive. The loader owns no state of its own: it reads one record at a
time from an opened handle, decodes it, and applies the update the matching
store would apply for a `put_*` write.
*/

use std::io::Read;

use tracing::{debug, warn};

use crate::catalog::MetadataCatalog;
use crate::codec::{self, framing, RecordType, TimestampVersion};
use crate::error::{Error, Result};
use crate::limits::DecodeLimits;
use crate::pmns::NameTree;

/// Load every record in `reader` into `catalog`, inserting discovered names
/// into `names`.
///
/// A decode or framing failure aborts the load immediately: a failed load
/// leaves no committed state worth trusting for that archive, so callers
/// should discard `catalog` on `Err` rather than trust a partial load.
pub fn load_archive<R: Read>(
    reader: &mut R,
    catalog: &mut MetadataCatalog,
    names: &mut dyn NameTree,
    limits: &DecodeLimits,
) -> Result<()> {
    let mut descs_seen = 0usize;

    loop {
        let header = match framing::read_header(reader)? {
            None => break,
            Some(header) => header,
        };
        let payload_len = header.payload_len()?;
        let record_type = RecordType::from_tag(header.tag);
        debug!(tag = header.tag, payload_len, "scanning record");

        match record_type {
            RecordType::Desc => {
                let payload = framing::read_payload(reader, payload_len)?;
                let (desc, names_list) = codec::desc::decode(&payload)?;
                match catalog.descs.add_desc(desc) {
                    Ok(_) => {
                        descs_seen += 1;
                        for name in &names_list {
                            // A duplicate-name-different-pmid conflict is
                            // downgraded to success: a partially readable
                            // archive beats rejecting the whole load.
                            let _ = names.insert(name, desc.pmid);
                        }
                    }
                    Err(Error::DescriptorChanged { pmid, field }) => {
                        // A semantic conflict aborts only this record, not
                        // the whole load.
                        warn!(pmid, %field, "descriptor conflict, skipping record");
                    }
                    Err(e) => return Err(e),
                }
            }
            RecordType::IndomV2 | RecordType::Indom | RecordType::IndomDelta => {
                let version = if record_type == RecordType::IndomV2 {
                    TimestampVersion::V2
                } else {
                    TimestampVersion::V3
                };
                let payload = framing::read_payload(reader, payload_len)?;
                let decoded = codec::indom::decode(&payload, version)?;
                if !decoded.instances.is_empty() {
                    catalog
                        .indoms
                        .add_indom(decoded.indom, decoded.stamp, decoded.instances);
                }
            }
            RecordType::LabelV2 | RecordType::Label => {
                let version = if record_type == RecordType::LabelV2 {
                    TimestampVersion::V2
                } else {
                    TimestampVersion::V3
                };
                let payload = framing::read_payload(reader, payload_len)?;
                let decoded = codec::label::decode(&payload, version, limits)?;
                catalog
                    .labels
                    .add_label(decoded.label_type, decoded.ident, decoded.stamp, decoded.sets);
            }
            RecordType::Text => {
                let payload = framing::read_payload(reader, payload_len)?;
                let decoded = codec::text::decode(&payload)?;
                catalog.texts.add_text(decoded.ident, decoded.text_type, decoded.text);
            }
            RecordType::Unknown(tag) => {
                warn!(tag, "skipping unrecognized record type");
                framing::skip_payload(reader, payload_len)?;
            }
        }

        framing::read_trailer(reader, header.total_len)?;
    }

    catalog.check_dup_labels();

    if descs_seen == 0 {
        return Err(Error::MalformedRecord(
            "archive contains no descriptor records".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::desc::Desc;
    use crate::codec::indom::Instance;
    use crate::codec::text::{TEXT_HELP, TEXT_PMID};
    use crate::pmns::FlatNameTree;
    use crate::timestamp::Timestamp;

    fn write_desc<W: std::io::Write>(w: &mut W, desc: Desc, names: &[String]) {
        let payload = codec::desc::encode(&desc, names).unwrap();
        framing::write_record(w, RecordType::Desc.to_tag(), &payload).unwrap();
    }

    #[test]
    fn loads_a_small_archive_end_to_end() {
        let mut bytes = Vec::new();
        write_desc(
            &mut bytes,
            Desc {
                pmid: 1,
                type_: 0,
                sem: 0,
                indom: 42,
                units: 0,
            },
            &["disk.dev.read".to_string()],
        );
        let indom_payload = codec::indom::encode(
            42,
            Timestamp::new(10, 0),
            &[Instance {
                id: 0,
                name: "sda".to_string(),
            }],
            TimestampVersion::V3,
        )
        .unwrap();
        framing::write_record(&mut bytes, RecordType::Indom.to_tag(), &indom_payload).unwrap();

        let text_payload =
            codec::text::encode(TEXT_HELP | TEXT_PMID, 1, "disk read count").unwrap();
        framing::write_record(&mut bytes, RecordType::Text.to_tag(), &text_payload).unwrap();

        let mut catalog = MetadataCatalog::new();
        let mut names = FlatNameTree::new();
        let limits = DecodeLimits::default();
        load_archive(&mut bytes.as_slice(), &mut catalog, &mut names, &limits).unwrap();

        assert_eq!(catalog.lookup_desc(1).unwrap().indom, 42);
        let (ids, inst_names) = catalog.get_indom(42, None).unwrap();
        assert_eq!(ids, vec![0]);
        assert_eq!(inst_names, vec!["sda".to_string()]);
        assert_eq!(
            catalog.lookup_text(1, TEXT_HELP | TEXT_PMID).unwrap(),
            "disk read count"
        );
        assert_eq!(names.lookup("disk.dev.read"), Some(1));
    }

    #[test]
    fn unknown_record_type_is_skipped_but_still_trailer_checked() {
        let mut bytes = Vec::new();
        write_desc(
            &mut bytes,
            Desc {
                pmid: 1,
                type_: 0,
                sem: 0,
                indom: 0,
                units: 0,
            },
            &[],
        );
        framing::write_record(&mut bytes, 999, b"whatever this is").unwrap();

        let mut catalog = MetadataCatalog::new();
        let mut names = FlatNameTree::new();
        let limits = DecodeLimits::default();
        load_archive(&mut bytes.as_slice(), &mut catalog, &mut names, &limits).unwrap();
        assert!(catalog.lookup_desc(1).is_ok());
    }

    #[test]
    fn descriptor_conflict_skips_the_record_but_does_not_abort_the_load() {
        let mut bytes = Vec::new();
        write_desc(
            &mut bytes,
            Desc {
                pmid: 1,
                type_: 0,
                sem: 0,
                indom: 42,
                units: 0,
            },
            &["disk.dev.read".to_string()],
        );
        // Same pmid, conflicting type: a semantic conflict, not a decode
        // failure.
        write_desc(
            &mut bytes,
            Desc {
                pmid: 1,
                type_: 99,
                sem: 0,
                indom: 42,
                units: 0,
            },
            &["disk.dev.read".to_string()],
        );
        write_desc(
            &mut bytes,
            Desc {
                pmid: 2,
                type_: 0,
                sem: 0,
                indom: 0,
                units: 0,
            },
            &["disk.dev.write".to_string()],
        );

        let mut catalog = MetadataCatalog::new();
        let mut names = FlatNameTree::new();
        let limits = DecodeLimits::default();
        load_archive(&mut bytes.as_slice(), &mut catalog, &mut names, &limits).unwrap();

        assert_eq!(catalog.lookup_desc(1).unwrap().type_, 0);
        assert!(catalog.lookup_desc(2).is_ok());
    }

    #[test]
    fn s7_malformed_trailer_aborts_the_load() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x44u32.to_be_bytes());
        bytes.extend_from_slice(&RecordType::Desc.to_tag().to_be_bytes());
        bytes.extend_from_slice(&[0u8; 0x44 - 12]);
        bytes.extend_from_slice(&0x40u32.to_be_bytes());

        let mut catalog = MetadataCatalog::new();
        let mut names = FlatNameTree::new();
        let limits = DecodeLimits::default();
        let err = load_archive(&mut bytes.as_slice(), &mut catalog, &mut names, &limits)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn zero_descriptors_is_malformed() {
        let mut catalog = MetadataCatalog::new();
        let mut names = FlatNameTree::new();
        let limits = DecodeLimits::default();
        let err = load_archive(&mut [].as_slice(), &mut catalog, &mut names, &limits)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn idempotent_load_into_a_fresh_catalog() {
        let mut bytes = Vec::new();
        write_desc(
            &mut bytes,
            Desc {
                pmid: 1,
                type_: 0,
                sem: 0,
                indom: 42,
                units: 0,
            },
            &["disk.dev.read".to_string()],
        );

        let limits = DecodeLimits::default();

        let mut first = MetadataCatalog::new();
        let mut names_a = FlatNameTree::new();
        load_archive(&mut bytes.as_slice(), &mut first, &mut names_a, &limits).unwrap();

        let mut second = MetadataCatalog::new();
        let mut names_b = FlatNameTree::new();
        load_archive(&mut bytes.as_slice(), &mut second, &mut names_b, &limits).unwrap();

        assert_eq!(
            first.lookup_desc(1).unwrap(),
            second.lookup_desc(1).unwrap()
        );
    }
}
