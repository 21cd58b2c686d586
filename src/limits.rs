/*!
Tunable limits enforced while decoding records.

This is the crate's configuration surface: a small, `Copy` struct threaded
through the codec rather than a file-based configuration layer, since the
hard limits here are archive-format constants, not deployment settings.
*/

/// Hard limits enforced while decoding a record stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum accepted `jsonlen` for a single label set, in bytes.
    pub max_label_json_len: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits {
            max_label_json_len: 65536,
        }
    }
}
