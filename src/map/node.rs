//! Node-side type map.
//!
//! One record per (node id, edge type) pair actually used by an edge.
//! Records carry the head and tail offsets of that pair's inbound and
//! outbound intrusive edge lists, which live in the *edge* map's buffer.
//!
//! The bucket index for a record is the node id itself: the load policy
//! (which folds `next_id / capacity` into the load) grows the table before
//! an id could reach the bucket-table edge, so ids never need masking and
//! records need no stored id. A minted id is nothing but a counter tick;
//! records appear lazily when an edge first touches the (id, type) pair.
//!
//! ```text
//! header: capacity | count | next_id
//! item:   next | type | first_in | first_out | last_in | last_out
//! ```

use crate::error::{GraphError, Result};
use crate::word::Word;

use super::shared::SharedTypeMap;
use super::BUCKET_SIZE;

pub(crate) const HEADER_WORDS: u32 = 3;
pub(crate) const ITEM_WORDS: u32 = 6;

const HDR_NEXT_ID: u32 = 2;

const ITEM_FIRST_IN: u32 = 2;
const ITEM_FIRST_OUT: u32 = 3;
const ITEM_LAST_IN: u32 = 4;
const ITEM_LAST_OUT: u32 = 5;

#[derive(Debug, Clone)]
pub(crate) struct NodeTypeMap<W: Word> {
    map: SharedTypeMap<W>,
}

impl<W: Word> NodeTypeMap<W> {
    pub(crate) fn with_capacity(capacity: u32) -> Self {
        Self {
            map: SharedTypeMap::with_capacity(HEADER_WORDS, ITEM_WORDS, capacity),
        }
    }

    pub(crate) fn from_words(buf: Vec<W>) -> Result<Self> {
        Ok(Self {
            map: SharedTypeMap::from_words(HEADER_WORDS, ITEM_WORDS, buf, "node")?,
        })
    }

    /// Largest capacity whose buffer still fits the width's address range.
    pub(crate) fn max_capacity() -> u32 {
        (W::MAX_ADDR - HEADER_WORDS) / (ITEM_WORDS * BUCKET_SIZE)
    }

    // ── Header ──────────────────────────────────────────────────────

    pub(crate) fn capacity(&self) -> u32 {
        self.map.capacity()
    }

    pub(crate) fn count(&self) -> u32 {
        self.map.count()
    }

    /// Next unminted node id.
    pub(crate) fn next_id(&self) -> u32 {
        self.map.get(HDR_NEXT_ID)
    }

    pub(crate) fn set_next_id(&mut self, next_id: u32) {
        self.map.set(HDR_NEXT_ID, next_id);
    }

    /// Mint a fresh node id. The sole source of ids; does not allocate a
    /// record.
    pub(crate) fn mint_id(&mut self) -> u32 {
        let id = self.next_id();
        self.map.set(HDR_NEXT_ID, id + 1);
        id
    }

    /// Load folds id consumption into hash density: the table must stay
    /// ahead of both record count and minted ids.
    pub(crate) fn load(&self, count: u32) -> f64 {
        let id_load = self.next_id() as f64 / self.capacity() as f64;
        id_load.max(self.map.load(count))
    }

    // ── Records ─────────────────────────────────────────────────────

    /// Offset of the (node, type) record, or 0 if the pair has never been
    /// linked. Ids at or past the bucket-table edge have no records.
    pub(crate) fn address_of(&self, node: u32, ty: u32) -> u32 {
        if node >= self.capacity() {
            return 0;
        }
        let mut item = self.map.head(node);
        while item != 0 {
            if self.map.type_of(item) == ty {
                return item;
            }
            item = self.map.next_of(item);
        }
        0
    }

    /// Append a record for the (node, type) pair. The id must have been
    /// minted first.
    pub(crate) fn add(&mut self, node: u32, ty: u32) -> Result<u32> {
        if node >= self.next_id() {
            return Err(GraphError::InvalidNodeId {
                id: node,
                next_id: self.next_id(),
            });
        }
        if self.count() >= self.capacity() * BUCKET_SIZE {
            return Err(GraphError::CapacityOverflow {
                map: "node",
                max: Self::max_capacity(),
            });
        }
        let addr = self.map.next_address();
        self.map.link(node, addr, ty);
        Ok(addr)
    }

    // ── Adjacency list heads/tails ──────────────────────────────────

    pub(crate) fn first_in(&self, rec: u32) -> u32 {
        self.map.get(rec + ITEM_FIRST_IN)
    }

    pub(crate) fn first_out(&self, rec: u32) -> u32 {
        self.map.get(rec + ITEM_FIRST_OUT)
    }

    pub(crate) fn last_in(&self, rec: u32) -> u32 {
        self.map.get(rec + ITEM_LAST_IN)
    }

    pub(crate) fn last_out(&self, rec: u32) -> u32 {
        self.map.get(rec + ITEM_LAST_OUT)
    }

    /// Make `edge` the tail of the record's inbound list and return the
    /// previous tail (0 if the list was empty). Splicing the edge-level
    /// list is the caller's job.
    pub(crate) fn link_in(&mut self, rec: u32, edge: u32) -> u32 {
        let prev = self.last_in(rec);
        if self.first_in(rec) == 0 {
            self.map.set(rec + ITEM_FIRST_IN, edge);
        }
        self.map.set(rec + ITEM_LAST_IN, edge);
        prev
    }

    /// Outbound counterpart of [`Self::link_in`].
    pub(crate) fn link_out(&mut self, rec: u32, edge: u32) -> u32 {
        let prev = self.last_out(rec);
        if self.first_out(rec) == 0 {
            self.map.set(rec + ITEM_FIRST_OUT, edge);
        }
        self.map.set(rec + ITEM_LAST_OUT, edge);
        prev
    }

    /// Patch the record's inbound head/tail around a departing edge.
    /// `prev`/`next` are the edge's own inbound neighbors, read before the
    /// edge-level splice.
    pub(crate) fn unlink_in(&mut self, rec: u32, edge: u32, prev: u32, next: u32) {
        if self.last_in(rec) == edge {
            self.map.set(rec + ITEM_LAST_IN, prev);
        }
        if self.first_in(rec) == edge {
            self.map.set(rec + ITEM_FIRST_IN, next);
        }
    }

    /// Outbound counterpart of [`Self::unlink_in`].
    pub(crate) fn unlink_out(&mut self, rec: u32, edge: u32, prev: u32, next: u32) {
        if self.last_out(rec) == edge {
            self.map.set(rec + ITEM_LAST_OUT, prev);
        }
        if self.first_out(rec) == edge {
            self.map.set(rec + ITEM_FIRST_OUT, next);
        }
    }

    // ── Chain walking / iteration ───────────────────────────────────

    /// Head of the record chain for a node id (0 if none).
    pub(crate) fn head(&self, node: u32) -> u32 {
        if node >= self.capacity() {
            return 0;
        }
        self.map.head(node)
    }

    pub(crate) fn next_of(&self, rec: u32) -> u32 {
        self.map.next_of(rec)
    }

    pub(crate) fn type_of(&self, rec: u32) -> u32 {
        self.map.type_of(rec)
    }

    // ── Buffer access / rebuild ─────────────────────────────────────

    pub(crate) fn words(&self) -> &[W] {
        self.map.words()
    }

    pub(crate) fn copy_rebased(&mut self, src: &Self) -> Result<()> {
        self.map.copy_rebased(&src.map)
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.words().len() * W::BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_ids(capacity: u32, ids: u32) -> NodeTypeMap<u32> {
        let mut map = NodeTypeMap::with_capacity(capacity);
        for _ in 0..ids {
            map.mint_id();
        }
        map
    }

    #[test]
    fn test_mint_is_monotone() {
        let mut map = NodeTypeMap::<u32>::with_capacity(4);
        assert_eq!(map.mint_id(), 0);
        assert_eq!(map.mint_id(), 1);
        assert_eq!(map.mint_id(), 2);
        assert_eq!(map.next_id(), 3);
        assert_eq!(map.count(), 0, "minting must not allocate records");
    }

    #[test]
    fn test_add_requires_minted_id() {
        let mut map = map_with_ids(4, 1);
        let err = map.add(1, 1).unwrap_err();
        assert_eq!(err.code(), "INVALID_NODE_ID");
        assert!(map.add(0, 1).is_ok());
    }

    #[test]
    fn test_address_of_distinguishes_types() {
        let mut map = map_with_ids(4, 2);
        let a = map.add(1, 1).unwrap();
        let b = map.add(1, 2).unwrap();

        assert_eq!(map.address_of(1, 1), a);
        assert_eq!(map.address_of(1, 2), b);
        assert_eq!(map.address_of(1, 3), 0);
        assert_eq!(map.address_of(0, 1), 0);
        // Out-of-table id is a miss, not a panic.
        assert_eq!(map.address_of(99, 1), 0);
    }

    #[test]
    fn test_link_in_returns_previous_tail() {
        let mut map = map_with_ids(4, 1);
        let rec = map.add(0, 1).unwrap();

        assert_eq!(map.link_in(rec, 100), 0);
        assert_eq!(map.first_in(rec), 100);
        assert_eq!(map.last_in(rec), 100);

        assert_eq!(map.link_in(rec, 200), 100);
        assert_eq!(map.first_in(rec), 100);
        assert_eq!(map.last_in(rec), 200);

        // The outbound list is independent.
        assert_eq!(map.first_out(rec), 0);
        assert_eq!(map.link_out(rec, 300), 0);
        assert_eq!(map.last_out(rec), 300);
    }

    #[test]
    fn test_unlink_in_patches_head_and_tail_only() {
        let mut map = map_with_ids(4, 1);
        let rec = map.add(0, 1).unwrap();
        map.link_in(rec, 100);
        map.link_in(rec, 200);
        map.link_in(rec, 300);

        // Middle edge: neither head nor tail moves.
        map.unlink_in(rec, 200, 100, 300);
        assert_eq!(map.first_in(rec), 100);
        assert_eq!(map.last_in(rec), 300);

        // Head edge.
        map.unlink_in(rec, 100, 0, 300);
        assert_eq!(map.first_in(rec), 300);

        // Last remaining edge empties the list.
        map.unlink_in(rec, 300, 0, 0);
        assert_eq!(map.first_in(rec), 0);
        assert_eq!(map.last_in(rec), 0);
    }

    #[test]
    fn test_load_tracks_id_exhaustion() {
        let mut map = NodeTypeMap::<u32>::with_capacity(4);
        assert_eq!(map.load(0), 0.0);
        map.mint_id();
        map.mint_id();
        map.mint_id();
        // 3 ids on capacity 4 dominates 0 records on 8 slots.
        assert_eq!(map.load(0), 0.75);
        // A big record count dominates instead.
        assert_eq!(map.load(7), 7.0 / 8.0);
    }

    #[test]
    fn test_copy_rebased_keeps_edge_offsets_untouched() {
        let mut small = NodeTypeMap::<u32>::with_capacity(2);
        small.mint_id();
        let rec = small.add(0, 1).unwrap();
        small.link_in(rec, 1234);
        small.link_out(rec, 5678);

        let mut big = NodeTypeMap::<u32>::with_capacity(8);
        big.copy_rebased(&small).unwrap();
        let delta = 8 - 2;

        assert_eq!(big.next_id(), 1);
        assert_eq!(big.count(), 1);
        let moved = big.address_of(0, 1);
        assert_eq!(moved, rec + delta);
        // Edge-buffer offsets must not be rebased by a node-map rebuild.
        assert_eq!(big.first_in(moved), 1234);
        assert_eq!(big.last_in(moved), 1234);
        assert_eq!(big.first_out(moved), 5678);
    }

    #[test]
    fn test_max_capacity_scales_with_width() {
        assert_eq!(NodeTypeMap::<u8>::max_capacity(), (127 - 3) / 12);
        assert_eq!(NodeTypeMap::<u16>::max_capacity(), (32_767 - 3) / 12);
        assert_eq!(NodeTypeMap::<u32>::max_capacity(), (2_147_483_647 - 3) / 12);
    }
}
