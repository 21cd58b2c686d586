/*!
Record framing: the `[len][type][payload][len]` envelope every record shares,
independent of payload shape.
*/

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Bytes of framing overhead outside the payload: a `u32` length and `u32`
/// type in the header, plus a `u32` length in the trailer.
pub const FRAME_OVERHEAD: u32 = 12;

/// A decoded record header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    /// Total record length, including the 12 bytes of framing overhead.
    pub total_len: u32,
    /// Record type tag.
    pub tag: u32,
}

impl RecordHeader {
    /// Length of this record's payload, i.e. `total_len - FRAME_OVERHEAD`.
    pub fn payload_len(&self) -> Result<u32> {
        self.total_len.checked_sub(FRAME_OVERHEAD).ok_or_else(|| {
            Error::MalformedRecord(format!(
                "record length {} is smaller than the framing overhead",
                self.total_len
            ))
        })
    }
}

/// Read a record header, or `None` on a clean EOF (no bytes read at all).
///
/// A short read that consumes *some* but not all 8 header bytes is a
/// malformed record, not a clean EOF.
pub fn read_header<R: Read>(r: &mut R) -> Result<Option<RecordHeader>> {
    let mut first = [0u8; 4];
    let n = read_partial(r, &mut first)?;
    if n == 0 {
        return Ok(None);
    }
    if n < 4 {
        return Err(Error::MalformedRecord(
            "truncated record header".to_string(),
        ));
    }
    let mut first_slice = &first[..];
    let total_len = first_slice.read_u32::<BigEndian>()?;
    let tag = r.read_u32::<BigEndian>()?;
    Ok(Some(RecordHeader { total_len, tag }))
}

/// Read the 4-byte trailer length and check it against the header length.
pub fn read_trailer<R: Read>(r: &mut R, header_len: u32) -> Result<()> {
    let trailer_len = r.read_u32::<BigEndian>()?;
    if trailer_len != header_len {
        return Err(Error::MalformedRecord(format!(
            "trailer length {trailer_len} does not match header length {header_len}"
        )));
    }
    Ok(())
}

/// Read `len` bytes of payload.
pub fn read_payload<R: Read>(r: &mut R, len: u32) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Skip `len` bytes of payload without retaining them (unknown record
/// types).
pub fn skip_payload<R: Read>(r: &mut R, len: u32) -> Result<()> {
    let mut remaining = len as u64;
    let mut scratch = [0u8; 4096];
    while remaining > 0 {
        let chunk = remaining.min(scratch.len() as u64) as usize;
        r.read_exact(&mut scratch[..chunk])?;
        remaining -= chunk as u64;
    }
    Ok(())
}

/// Write a complete record: header, payload, trailer.
pub fn write_record<W: Write>(w: &mut W, tag: u32, payload: &[u8]) -> Result<()> {
    let total_len = FRAME_OVERHEAD
        .checked_add(payload.len() as u32)
        .ok_or_else(|| Error::MalformedRecord("payload too large to frame".to_string()))?;
    w.write_u32::<BigEndian>(total_len)?;
    w.write_u32::<BigEndian>(tag)?;
    w.write_all(payload)?;
    w.write_u32::<BigEndian>(total_len)?;
    Ok(())
}

/// Read into `buf`, returning the number of bytes actually read before EOF.
/// Unlike `Read::read`, this keeps reading across short reads so a caller
/// can distinguish "zero bytes available" from "fewer bytes than requested".
fn read_partial<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
