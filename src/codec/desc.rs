/*!
Codec for `DESC` records: a [Desc] followed by its registered names.
*/

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// A metric descriptor. Identity is `pmid`; `(type_, sem, indom, units)` must
/// not change across records for the same `pmid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Desc {
    /// Unique metric identifier.
    pub pmid: u32,
    /// Value type (opaque to the catalog beyond equality).
    pub type_: i32,
    /// Semantics (counter, instant, discrete, ...).
    pub sem: i32,
    /// Instance domain this metric's values are scoped to.
    pub indom: u32,
    /// Packed units encoding.
    pub units: u32,
}

/// Decode a `DESC` payload into its descriptor and registered names.
pub fn decode(payload: &[u8]) -> Result<(Desc, Vec<String>)> {
    let mut cursor = payload;
    let pmid = cursor.read_u32::<BigEndian>()?;
    let type_ = cursor.read_i32::<BigEndian>()?;
    let sem = cursor.read_i32::<BigEndian>()?;
    let indom = cursor.read_u32::<BigEndian>()?;
    let units = cursor.read_u32::<BigEndian>()?;
    let numnames = cursor.read_u32::<BigEndian>()?;
    if (cursor.len() as u64) < (numnames as u64) * 4 {
        return Err(Error::MalformedRecord(
            "DESC record claims more names than its payload could hold".to_string(),
        ));
    }

    let mut names = Vec::with_capacity(numnames as usize);
    for _ in 0..numnames {
        let name_len = cursor.read_u32::<BigEndian>()? as usize;
        if cursor.len() < name_len {
            return Err(Error::MalformedRecord(
                "DESC record truncated while reading a name".to_string(),
            ));
        }
        let (name_bytes, rest) = cursor.split_at(name_len);
        let name = String::from_utf8(name_bytes.to_vec())
            .map_err(|e| Error::MalformedRecord(format!("DESC name is not valid UTF-8: {e}")))?;
        names.push(name);
        cursor = rest;
    }

    Ok((
        Desc {
            pmid,
            type_,
            sem,
            indom,
            units,
        },
        names,
    ))
}

/// Encode a descriptor and its names into a `DESC` payload.
pub fn encode(desc: &Desc, names: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(desc.pmid)?;
    out.write_i32::<BigEndian>(desc.type_)?;
    out.write_i32::<BigEndian>(desc.sem)?;
    out.write_u32::<BigEndian>(desc.indom)?;
    out.write_u32::<BigEndian>(desc.units)?;
    out.write_u32::<BigEndian>(names.len() as u32)?;
    for name in names {
        out.write_u32::<BigEndian>(name.len() as u32)?;
        out.extend_from_slice(name.as_bytes());
    }
    Ok(out)
}
