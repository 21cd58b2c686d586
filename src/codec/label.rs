/*!
Codec for `LABEL`/`LABEL_V2` records: a timestamp, `(type, ident)`, and a
sequence of [LabelSet]s, each carrying a raw JSON blob and offset/length
spans into it for each `(name, value)` pair.
*/

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{timestamp_wire, TimestampVersion};
use crate::error::{Error, Result};
use crate::limits::DecodeLimits;
use crate::timestamp::Timestamp;

/// The on-disk 12-byte label struct: offsets and lengths are spans into the
/// owning [LabelSet]'s `json` buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label {
    /// Byte offset of the label name within `json`.
    pub name_off: u16,
    /// Byte length of the label name.
    pub name_len: u16,
    /// Byte offset of the label value within `json`.
    pub value_off: u16,
    /// Byte length of the label value.
    pub value_len: u16,
    /// Implementation-defined flags (preserved opaquely across round-trips).
    pub flags: u16,
}

const LABEL_WIRE_LEN: usize = 12;

/// One label set: the instance it's scoped to, its raw JSON text, and the
/// `(name, value)` spans within it.
#[derive(Clone, Debug)]
pub struct LabelSet {
    /// Instance this label set applies to.
    pub inst: i32,
    /// Raw JSON object text the label spans index into.
    pub json: Vec<u8>,
    /// The labels themselves.
    pub labels: Vec<Label>,
}

impl LabelSet {
    /// The name bytes a label spans within this set's `json`.
    pub fn name_bytes(&self, label: &Label) -> &[u8] {
        let start = label.name_off as usize;
        let end = start + label.name_len as usize;
        &self.json[start..end]
    }

    /// The value bytes a label spans within this set's `json`.
    pub fn value_bytes(&self, label: &Label) -> &[u8] {
        let start = label.value_off as usize;
        let end = start + label.value_len as usize;
        &self.json[start..end]
    }

    /// Two label sets are content-equal when `inst` matches, the label
    /// counts match, and every `(name, value)` pair in one has a
    /// byte-identical match in the other.
    pub fn content_eq(&self, other: &LabelSet) -> bool {
        if self.inst != other.inst || self.labels.len() != other.labels.len() {
            return false;
        }
        self.labels.iter().all(|a| {
            other.labels.iter().any(|b| {
                self.name_bytes(a) == other.name_bytes(b) && self.value_bytes(a) == other.value_bytes(b)
            })
        })
    }
}

/// A decoded `LABEL`/`LABEL_V2` payload.
pub struct DecodedLabel {
    /// Label type (before the `COMPOUND`/`OPTIONAL` mask is applied).
    pub label_type: u32,
    /// Identifier the label sets are scoped to.
    pub ident: u32,
    /// When this group was recorded.
    pub stamp: Timestamp,
    /// The label sets themselves. Sets whose wire `nlabels` was an error
    /// code (negative) are dropped here.
    pub sets: Vec<LabelSet>,
}

/// Decode a `LABEL`/`LABEL_V2` payload.
pub fn decode(
    payload: &[u8],
    version: TimestampVersion,
    limits: &DecodeLimits,
) -> Result<DecodedLabel> {
    let mut cursor = payload;
    let stamp = timestamp_wire::decode(&mut cursor, version)?;
    let label_type = cursor.read_u32::<BigEndian>()?;
    let ident = cursor.read_u32::<BigEndian>()?;
    let nsets = cursor.read_u32::<BigEndian>()?;

    let mut sets = Vec::new();
    for _ in 0..nsets {
        let inst = cursor.read_u32::<BigEndian>()? as i32;
        let jsonlen = cursor.read_u32::<BigEndian>()?;
        if jsonlen > limits.max_label_json_len {
            return Err(Error::MalformedRecord(format!(
                "label set json length {jsonlen} exceeds the configured limit of {}",
                limits.max_label_json_len
            )));
        }
        if (cursor.len() as u64) < jsonlen as u64 {
            return Err(Error::MalformedRecord(
                "label set json truncated".to_string(),
            ));
        }
        let (json_bytes, rest) = cursor.split_at(jsonlen as usize);
        let json = json_bytes.to_vec();
        cursor = rest;

        let nlabels = cursor.read_i32::<BigEndian>()?;
        if nlabels <= 0 {
            // Negative nlabels is an inline error code from the writer; the
            // set carries no labels and is dropped rather than retained.
            continue;
        }
        let nlabels = nlabels as usize;
        let needed = nlabels
            .checked_mul(LABEL_WIRE_LEN)
            .ok_or_else(|| Error::MalformedRecord("label count overflow".to_string()))?;
        if cursor.len() < needed {
            return Err(Error::MalformedRecord(
                "label set truncated before its label array".to_string(),
            ));
        }

        let mut labels = Vec::with_capacity(nlabels);
        for _ in 0..nlabels {
            let name_off = cursor.read_u16::<BigEndian>()?;
            let name_len = cursor.read_u16::<BigEndian>()?;
            let value_off = cursor.read_u16::<BigEndian>()?;
            let value_len = cursor.read_u16::<BigEndian>()?;
            let flags = cursor.read_u16::<BigEndian>()?;
            let _reserved = cursor.read_u16::<BigEndian>()?;
            labels.push(Label {
                name_off,
                name_len,
                value_off,
                value_len,
                flags,
            });
        }

        sets.push(LabelSet { inst, json, labels });
    }

    Ok(DecodedLabel {
        label_type,
        ident,
        stamp,
        sets,
    })
}

/// Encode a `LABEL`/`LABEL_V2` payload.
pub fn encode(
    label_type: u32,
    ident: u32,
    stamp: Timestamp,
    sets: &[LabelSet],
    version: TimestampVersion,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    timestamp_wire::encode(&mut out, stamp, version)?;
    out.write_u32::<BigEndian>(label_type)?;
    out.write_u32::<BigEndian>(ident)?;
    out.write_u32::<BigEndian>(sets.len() as u32)?;

    for set in sets {
        out.write_u32::<BigEndian>(set.inst as u32)?;
        out.write_u32::<BigEndian>(set.json.len() as u32)?;
        out.extend_from_slice(&set.json);
        out.write_i32::<BigEndian>(set.labels.len() as i32)?;
        for label in &set.labels {
            out.write_u16::<BigEndian>(label.name_off)?;
            out.write_u16::<BigEndian>(label.name_len)?;
            out.write_u16::<BigEndian>(label.value_off)?;
            out.write_u16::<BigEndian>(label.value_len)?;
            out.write_u16::<BigEndian>(label.flags)?;
            out.write_u16::<BigEndian>(0)?; // reserved
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> LabelSet {
        let json = br#"{"hostname":"server1"}"#.to_vec();
        // "hostname" starts at byte 1, "server1" at byte 13 inside the quotes.
        let name_off = json.iter().position(|&b| b == b'h').unwrap() as u16;
        let name_len = "hostname".len() as u16;
        let value_off = json
            .windows(7)
            .position(|w| w == b"server1")
            .unwrap() as u16;
        let value_len = "server1".len() as u16;
        LabelSet {
            inst: -1,
            json,
            labels: vec![Label {
                name_off,
                name_len,
                value_off,
                value_len,
                flags: 0,
            }],
        }
    }

    #[test]
    fn round_trips_label_sets() {
        let set = sample_set();
        let stamp = Timestamp::new(20, 0);
        let payload = encode(7, 3, stamp, &[set.clone()], TimestampVersion::V3).unwrap();

        let limits = DecodeLimits::default();
        let decoded = decode(&payload, TimestampVersion::V3, &limits).unwrap();
        assert_eq!(decoded.label_type, 7);
        assert_eq!(decoded.ident, 3);
        assert_eq!(decoded.stamp, stamp);
        assert_eq!(decoded.sets.len(), 1);
        assert!(decoded.sets[0].content_eq(&set));
    }

    #[test]
    fn oversized_json_is_rejected() {
        let mut payload = Vec::new();
        timestamp_wire::encode(&mut payload, Timestamp::new(1, 0), TimestampVersion::V3).unwrap();
        payload.write_u32::<BigEndian>(1).unwrap(); // label_type
        payload.write_u32::<BigEndian>(1).unwrap(); // ident
        payload.write_u32::<BigEndian>(1).unwrap(); // nsets
        payload.write_u32::<BigEndian>(0).unwrap(); // inst
        payload.write_u32::<BigEndian>(100).unwrap(); // jsonlen, way over the test limit

        let limits = DecodeLimits {
            max_label_json_len: 8,
        };
        assert!(decode(&payload, TimestampVersion::V3, &limits).is_err());
    }

    #[test]
    fn negative_nlabels_drops_the_set() {
        let mut payload = Vec::new();
        timestamp_wire::encode(&mut payload, Timestamp::new(1, 0), TimestampVersion::V3).unwrap();
        payload.write_u32::<BigEndian>(1).unwrap(); // label_type
        payload.write_u32::<BigEndian>(1).unwrap(); // ident
        payload.write_u32::<BigEndian>(1).unwrap(); // nsets
        payload.write_u32::<BigEndian>(0).unwrap(); // inst
        payload.write_u32::<BigEndian>(0).unwrap(); // jsonlen
        payload.write_i32::<BigEndian>(-5).unwrap(); // nlabels: error code

        let limits = DecodeLimits::default();
        let decoded = decode(&payload, TimestampVersion::V3, &limits).unwrap();
        assert!(decoded.sets.is_empty());
    }
}
