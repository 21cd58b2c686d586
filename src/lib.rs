#![deny(missing_docs)]
/*!
# pcp-archive-catalog

An in-memory, indexed catalog of Performance Co-Pilot archive metadata:
metric descriptors, instance domains, labels, and help text.

The catalog is populated by scanning an archive's metadata record stream
(see [loader]) and answers time-scoped lookups afterwards (see
[catalog::MetadataCatalog]). The hard engineering lives in three places:

* [codec] decodes/encodes the versioned, length-prefixed, network-byte-order
  on-disk record format, including its two timestamp encodings.
* [store] maintains time-ordered, de-duplicated histories per key (instance
  domain, `(label type, ident)`, descriptor, text) across a single archive's
  lifetime.
* [loader] drives the codec and stores while sequentially scanning an
  archive, aborting the whole load on the first malformed record.

Out of scope: HTTP/REST servlets, the PMNS metric-namespace tree (see
[pmns] for the seam this catalog writes through), and query planning or
compression beyond duplicate suppression.
*/

pub mod catalog;
pub mod codec;
pub mod error;
pub mod limits;
pub mod loader;
pub mod pmns;
pub mod store;
pub mod timestamp;
