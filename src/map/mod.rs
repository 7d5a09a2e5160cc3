//! Flat shared-buffer type maps.
//!
//! Both record stores (node and edge) are specializations of one layout:
//!
//! ```text
//! [ header | bucket table (capacity words) | item region ]
//! ```
//!
//! Buckets hold the head offsets of hash chains; items carry their chain
//! `next` and a nonzero `type` tag, plus schema-specific payload words.
//! Every stored "pointer" is a word offset into the owning buffer, with
//! `0` meaning null.

pub(crate) mod edge;
pub(crate) mod node;
pub(crate) mod shared;

/// Average number of items a bucket holds at target load.
pub(crate) const BUCKET_SIZE: u32 = 2;

/// Smallest capacity a map is ever constructed with.
pub const MIN_CAPACITY: u32 = 2;

// Header schema shared by both maps (concrete maps extend with a third word).
pub(crate) const HDR_CAPACITY: u32 = 0;
pub(crate) const HDR_COUNT: u32 = 1;

// Item field offsets shared by both maps.
pub(crate) const ITEM_NEXT: u32 = 0;
pub(crate) const ITEM_TYPE: u32 = 1;
