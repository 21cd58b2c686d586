/*!
The two timestamp wire encodings used across record payloads: V2 ("timeval",
32-bit seconds + 32-bit microseconds) and V3 ("timestamp", 64-bit seconds +
32-bit nanoseconds).
*/

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::TimestampVersion;
use crate::error::Result;
use crate::timestamp::Timestamp;

/// Number of bytes a timestamp occupies on the wire for `version`.
pub fn wire_len(version: TimestampVersion) -> usize {
    match version {
        TimestampVersion::V2 => 8,
        TimestampVersion::V3 => 12,
    }
}

/// Decode a timestamp in the given wire version from `cursor`, advancing it.
pub fn decode(cursor: &mut &[u8], version: TimestampVersion) -> Result<Timestamp> {
    match version {
        TimestampVersion::V2 => {
            let sec = cursor.read_i32::<BigEndian>()?;
            let usec = cursor.read_i32::<BigEndian>()?;
            Ok(Timestamp::from_timeval(sec, usec))
        }
        TimestampVersion::V3 => {
            let sec = cursor.read_i64::<BigEndian>()?;
            let nsec = cursor.read_i32::<BigEndian>()?;
            Ok(Timestamp::new(sec, nsec))
        }
    }
}

/// Encode `stamp` in the given wire version into `out`.
pub fn encode(out: &mut Vec<u8>, stamp: Timestamp, version: TimestampVersion) -> Result<()> {
    match version {
        TimestampVersion::V2 => {
            out.write_i32::<BigEndian>(stamp.sec as i32)?;
            out.write_i32::<BigEndian>(stamp.nsec / 1000)?;
        }
        TimestampVersion::V3 => {
            out.write_i64::<BigEndian>(stamp.sec)?;
            out.write_i32::<BigEndian>(stamp.nsec)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v3_round_trips_exactly() {
        let stamp = Timestamp::new(1_700_000_000, 123_456);
        let mut buf = Vec::new();
        encode(&mut buf, stamp, TimestampVersion::V3).unwrap();
        let mut cursor = &buf[..];
        let decoded = decode(&mut cursor, TimestampVersion::V3).unwrap();
        assert_eq!(decoded, stamp);
        assert!(cursor.is_empty());
    }

    #[test]
    fn v2_round_trips_to_millisecond_precision() {
        // usec -> nsec -> usec loses nothing as long as nsec is a multiple of 1000.
        let stamp = Timestamp::new(1_700_000_000, 654_000);
        let mut buf = Vec::new();
        encode(&mut buf, stamp, TimestampVersion::V2).unwrap();
        let mut cursor = &buf[..];
        let decoded = decode(&mut cursor, TimestampVersion::V2).unwrap();
        assert_eq!(decoded, stamp);
    }
}
