/*!
Codec for `TEXT` records: help/oneline strings keyed by `(type, ident)`.

`type` must carry at least one of `ONELINE`/`HELP` and exactly one of
`PMID`/`INDOM`. A violation is treated the same way as every other malformed
record: decode returns [`Error::MalformedRecord`] and the loader aborts the
whole load, rather than silently dropping just this one record.
*/

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Text record carries a one-line summary.
pub const TEXT_ONELINE: u32 = 0x1;
/// Text record carries the full help text.
pub const TEXT_HELP: u32 = 0x2;
/// Text is scoped to a metric id.
pub const TEXT_PMID: u32 = 0x4;
/// Text is scoped to an instance domain.
pub const TEXT_INDOM: u32 = 0x8;

/// A decoded `TEXT` payload.
pub struct DecodedText {
    /// Text type bit flags (`ONELINE`/`HELP` combined with `PMID`/`INDOM`).
    pub text_type: u32,
    /// Identifier (a `pmid` or `indom`) the text is scoped to.
    pub ident: u32,
    /// The text itself.
    pub text: String,
}

fn validate_type(text_type: u32) -> Result<()> {
    let has_kind = text_type & (TEXT_ONELINE | TEXT_HELP) != 0;
    let scope_bits = (text_type & TEXT_PMID != 0) as u32 + (text_type & TEXT_INDOM != 0) as u32;
    if !has_kind || scope_bits != 1 {
        return Err(Error::MalformedRecord(format!(
            "text type {text_type:#x} must set one of ONELINE/HELP and exactly one of PMID/INDOM"
        )));
    }
    Ok(())
}

/// Decode a `TEXT` payload.
pub fn decode(payload: &[u8]) -> Result<DecodedText> {
    let mut cursor = payload;
    let text_type = cursor.read_u32::<BigEndian>()?;
    let ident = cursor.read_u32::<BigEndian>()?;
    validate_type(text_type)?;

    let nul_at = cursor
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::MalformedRecord("TEXT record is not NUL-terminated".to_string()))?;
    let text = String::from_utf8(cursor[..nul_at].to_vec())
        .map_err(|e| Error::MalformedRecord(format!("TEXT is not valid UTF-8: {e}")))?;

    Ok(DecodedText {
        text_type,
        ident,
        text,
    })
}

/// Encode a `TEXT` payload.
pub fn encode(text_type: u32, ident: u32, text: &str) -> Result<Vec<u8>> {
    validate_type(text_type)?;
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(text_type)?;
    out.write_u32::<BigEndian>(ident)?;
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    Ok(out)
}
