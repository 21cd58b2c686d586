/*!
Codec for `INDOM`/`INDOM_V2` records: a timestamp, an indom id, and a set of
`(id, name)` instances.

The wire layout is two parallel arrays — instance ids, then name offsets —
followed by a single packed, NUL-terminated name blob. Decoding that layout
directly, rather than treating it as an opaque helper's output, is what lets
the codec round-trip without any manual buffer/ownership bookkeeping: every
decoded name becomes an owned `String` immediately.
*/

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::{timestamp_wire, TimestampVersion};
use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// One `(id, name)` pair inside an instance domain snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    /// Instance id, unique within its snapshot.
    pub id: i32,
    /// Instance name.
    pub name: String,
}

/// A decoded `INDOM`/`INDOM_V2` payload.
pub struct DecodedIndom {
    /// The instance domain these instances belong to.
    pub indom: u32,
    /// When this snapshot was recorded.
    pub stamp: Timestamp,
    /// The instances themselves, in wire order (not yet sorted by id).
    pub instances: Vec<Instance>,
}

/// Decode an `INDOM`/`INDOM_V2` payload.
pub fn decode(payload: &[u8], version: TimestampVersion) -> Result<DecodedIndom> {
    let mut cursor = payload;
    let stamp = timestamp_wire::decode(&mut cursor, version)?;
    let indom = cursor.read_u32::<BigEndian>()?;
    let numinst = cursor.read_i32::<BigEndian>()?;

    if numinst <= 0 {
        return Ok(DecodedIndom {
            indom,
            stamp,
            instances: Vec::new(),
        });
    }
    let numinst = numinst as usize;
    let needed = numinst
        .checked_mul(8)
        .ok_or_else(|| Error::MalformedRecord("instance count overflow".to_string()))?;
    if cursor.len() < needed {
        return Err(Error::MalformedRecord(
            "INDOM record truncated before its instance arrays".to_string(),
        ));
    }

    let mut ids = Vec::with_capacity(numinst);
    for _ in 0..numinst {
        ids.push(cursor.read_i32::<BigEndian>()?);
    }
    let mut offsets = Vec::with_capacity(numinst);
    for _ in 0..numinst {
        offsets.push(cursor.read_u32::<BigEndian>()? as usize);
    }

    let blob = cursor;
    let mut instances = Vec::with_capacity(numinst);
    for (id, offset) in ids.into_iter().zip(offsets) {
        if offset > blob.len() {
            return Err(Error::MalformedRecord(
                "INDOM instance name offset out of range".to_string(),
            ));
        }
        let nul_at = blob[offset..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| {
                Error::MalformedRecord("INDOM instance name is not NUL-terminated".to_string())
            })?;
        let name = String::from_utf8(blob[offset..offset + nul_at].to_vec()).map_err(|e| {
            Error::MalformedRecord(format!("INDOM instance name is not valid UTF-8: {e}"))
        })?;
        instances.push(Instance { id, name });
    }

    Ok(DecodedIndom {
        indom,
        stamp,
        instances,
    })
}

/// Encode an `INDOM`/`INDOM_V2` payload.
pub fn encode(
    indom: u32,
    stamp: Timestamp,
    instances: &[Instance],
    version: TimestampVersion,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    timestamp_wire::encode(&mut out, stamp, version)?;
    out.write_u32::<BigEndian>(indom)?;
    out.write_i32::<BigEndian>(instances.len() as i32)?;

    for inst in instances {
        out.write_i32::<BigEndian>(inst.id)?;
    }

    let mut blob = Vec::new();
    let mut offsets = Vec::with_capacity(instances.len());
    for inst in instances {
        offsets.push(blob.len() as u32);
        blob.extend_from_slice(inst.name.as_bytes());
        blob.push(0);
    }
    for offset in offsets {
        out.write_u32::<BigEndian>(offset)?;
    }
    out.extend_from_slice(&blob);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(id: i32, name: &str) -> Instance {
        Instance {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn round_trips_instances() {
        let instances = vec![inst(2, "b"), inst(1, "a"), inst(3, "")];
        let stamp = Timestamp::new(10, 0);
        let payload = encode(5, stamp, &instances, TimestampVersion::V3).unwrap();

        let decoded = decode(&payload, TimestampVersion::V3).unwrap();
        assert_eq!(decoded.indom, 5);
        assert_eq!(decoded.stamp, stamp);
        assert_eq!(decoded.instances, instances);
    }

    #[test]
    fn oversized_numinst_is_rejected_before_allocating() {
        let mut payload = Vec::new();
        timestamp_wire::encode(&mut payload, Timestamp::new(10, 0), TimestampVersion::V3).unwrap();
        payload.write_u32::<BigEndian>(5).unwrap(); // indom
        payload.write_i32::<BigEndian>(i32::MAX).unwrap(); // numinst, no data follows

        assert!(decode(&payload, TimestampVersion::V3).is_err());
    }

    #[test]
    fn non_positive_numinst_decodes_to_empty() {
        let payload = encode(5, Timestamp::new(10, 0), &[], TimestampVersion::V3).unwrap();
        let decoded = decode(&payload, TimestampVersion::V3).unwrap();
        assert!(decoded.instances.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn prop_round_trips_arbitrary_instance_lists(
            instances in proptest::collection::vec(
                (proptest::prelude::any::<i32>(), "[a-z]{0,8}")
                    .prop_map(|(id, name)| Instance { id, name }),
                0..8,
            )
        ) {
            let stamp = Timestamp::new(10, 0);
            let payload = encode(5, stamp, &instances, TimestampVersion::V3).unwrap();
            let decoded = decode(&payload, TimestampVersion::V3).unwrap();
            proptest::prop_assert_eq!(decoded.instances, instances);
        }
    }
}
