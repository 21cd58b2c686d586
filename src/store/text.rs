/*!
The text store: the latest help/oneline string seen for each
`(type, ident)`.
*/

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Map from `(type, ident)` to the latest text registered for it. Only the
/// most recent value is ever retained — there is no history here, unlike
/// the indom and label stores.
#[derive(Debug, Default)]
pub struct TextStore {
    entries: HashMap<(u32, u32), String>,
}

impl TextStore {
    /// Create an empty text store.
    pub fn new() -> Self {
        TextStore::default()
    }

    /// Register `text` for `(text_type, ident)`. A differing value replaces
    /// the stored one; an identical value is a no-op.
    pub fn add_text(&mut self, ident: u32, text_type: u32, text: String) {
        match self.entries.get(&(text_type, ident)) {
            Some(existing) if existing == &text => {}
            _ => {
                self.entries.insert((text_type, ident), text);
            }
        }
    }

    /// Look up the text registered for `(ident, text_type)`.
    pub fn lookup_text(&self, ident: u32, text_type: u32) -> Result<&str> {
        self.entries
            .get(&(text_type, ident))
            .map(|s| s.as_str())
            .ok_or(Error::TextNotFound { text_type, ident })
    }
}
