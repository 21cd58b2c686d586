/*!
Encodes and decodes the on-disk metadata record stream: a versioned,
length-prefixed, network-byte-order format.

Every record is framed the same way regardless of payload:

```text
[len: u32 BE][type: u32 BE][payload: len - 12 bytes][len: u32 BE (trailer)]
```

`framing` handles that envelope; `desc`, `indom`, `label` and `text` decode
and encode the payload for each record family. [`TimestampVersion`] selects
which of the two timestamp wire encodings a payload uses.
*/

pub mod desc;
pub mod framing;
pub mod indom;
pub mod label;
pub mod text;
pub mod timestamp_wire;

/// Record type tags, as they appear in a record header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    /// Metric descriptor record.
    Desc,
    /// Instance domain record, V2 timestamp encoding.
    IndomV2,
    /// Instance domain record, V3 timestamp encoding.
    Indom,
    /// Incremental instance domain delta (decoded the same as `Indom`).
    IndomDelta,
    /// Label set record, V2 timestamp encoding.
    LabelV2,
    /// Label set record, V3 timestamp encoding.
    Label,
    /// Help/oneline text record.
    Text,
    /// Any tag not recognized above; payload is skipped by the loader.
    Unknown(u32),
}

const TAG_DESC: u32 = 1;
const TAG_INDOM_V2: u32 = 2;
const TAG_INDOM: u32 = 3;
const TAG_INDOM_DELTA: u32 = 4;
const TAG_LABEL_V2: u32 = 5;
const TAG_LABEL: u32 = 6;
const TAG_TEXT: u32 = 7;

impl RecordType {
    /// Decode a wire tag into a [RecordType].
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            TAG_DESC => RecordType::Desc,
            TAG_INDOM_V2 => RecordType::IndomV2,
            TAG_INDOM => RecordType::Indom,
            TAG_INDOM_DELTA => RecordType::IndomDelta,
            TAG_LABEL_V2 => RecordType::LabelV2,
            TAG_LABEL => RecordType::Label,
            TAG_TEXT => RecordType::Text,
            other => RecordType::Unknown(other),
        }
    }

    /// Encode this record type back to its wire tag.
    pub fn to_tag(self) -> u32 {
        match self {
            RecordType::Desc => TAG_DESC,
            RecordType::IndomV2 => TAG_INDOM_V2,
            RecordType::Indom => TAG_INDOM,
            RecordType::IndomDelta => TAG_INDOM_DELTA,
            RecordType::LabelV2 => TAG_LABEL_V2,
            RecordType::Label => TAG_LABEL,
            RecordType::Text => TAG_TEXT,
            RecordType::Unknown(tag) => tag,
        }
    }
}

/// Which timestamp wire encoding a record family uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampVersion {
    /// 32-bit seconds, 32-bit microseconds ("timeval").
    V2,
    /// 64-bit seconds, 32-bit nanoseconds ("timestamp").
    V3,
}

/// Label-type bit flags masked off before a `(type, ident)` chain is chosen.
pub const LABEL_TYPE_COMPOUND: u32 = 0x1;
/// See [LABEL_TYPE_COMPOUND].
pub const LABEL_TYPE_OPTIONAL: u32 = 0x2;
/// Label type value meaning "this label set is scoped to the whole context".
pub const LABEL_TYPE_CONTEXT: u32 = 0x8;
/// Sentinel identifier meaning "no identifier" (used for context-scoped
/// label sets).
pub const PM_ID_NULL: u32 = 0xFFFF_FFFF;
