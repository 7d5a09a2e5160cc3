//! Edge-side type map.
//!
//! One record per live (from, to, type) triple. Records sit on a hash
//! chain keyed by the triple and on two intrusive doubly-linked lists:
//! the `to` node's inbound list and the `from` node's outbound list for
//! that edge type.
//!
//! Deletion tombstones: removing an edge zeroes its record but never
//! reclaims the slot — `next_address` advances past dead slots, and the
//! `deletes` header word feeds the orchestrator's compaction policy.
//! Slots come back only when a rebuild copies the live records into a
//! fresh buffer.
//!
//! ```text
//! header: capacity | count | deletes
//! item:   next | type | from | to | next_in | prev_in | next_out | prev_out
//! ```

use crate::error::Result;
use crate::word::Word;

use super::shared::{LiveItems, SharedTypeMap};
use super::BUCKET_SIZE;

pub(crate) const HEADER_WORDS: u32 = 3;
pub(crate) const ITEM_WORDS: u32 = 8;

/// Capacity at which the grow factor bottoms out at `MIN_GROW_FACTOR`.
pub(crate) const PEAK_CAPACITY: u32 = 1 << 18;

const HDR_DELETES: u32 = 2;

const ITEM_FROM: u32 = 2;
const ITEM_TO: u32 = 3;
const ITEM_NEXT_IN: u32 = 4;
const ITEM_PREV_IN: u32 = 5;
const ITEM_NEXT_OUT: u32 = 6;
const ITEM_PREV_OUT: u32 = 7;

/// 32-bit mix. All arithmetic wraps modulo 2^32; the constants are part
/// of the wire-stable bucket layout, so this function must never change.
#[inline]
fn mix(mut k: u32) -> u32 {
    k = (!k).wrapping_add(k << 15);
    k ^= k >> 12;
    k = k.wrapping_add(k << 2);
    k ^= k >> 4;
    k = k.wrapping_mul(2057);
    k ^= k >> 16;
    k
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeTypeMap<W: Word> {
    map: SharedTypeMap<W>,
}

impl<W: Word> EdgeTypeMap<W> {
    pub(crate) fn with_capacity(capacity: u32) -> Self {
        Self {
            map: SharedTypeMap::with_capacity(HEADER_WORDS, ITEM_WORDS, capacity),
        }
    }

    pub(crate) fn from_words(buf: Vec<W>) -> Result<Self> {
        Ok(Self {
            map: SharedTypeMap::from_words(HEADER_WORDS, ITEM_WORDS, buf, "edge")?,
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

    pub(crate) fn deletes(&self) -> u32 {
        self.map.get(HDR_DELETES)
    }

    pub(crate) fn load(&self, count: u32) -> f64 {
        self.map.load(count)
    }

    // ── Hashing ─────────────────────────────────────────────────────

    /// Bucket index for a triple. Bit-reproducible: mixed modulo 2^32,
    /// reduced modulo capacity.
    pub(crate) fn hash(&self, from: u32, to: u32, ty: u32) -> u32 {
        let mut h: u32 = 17;
        h = h.wrapping_mul(37).wrapping_add(mix(from));
        h = h.wrapping_mul(37).wrapping_add(mix(to));
        h = h.wrapping_mul(37).wrapping_add(mix(ty));
        h % self.capacity()
    }

    // ── Records ─────────────────────────────────────────────────────

    /// Next unused slot, counting tombstones: dead slots are skipped, not
    /// reused.
    fn next_address(&self) -> u32 {
        self.map.slot_address(self.count() + self.deletes())
    }

    /// Append a record for the triple and put it on its hash chain.
    pub(crate) fn add(&mut self, hash: u32, from: u32, to: u32, ty: u32) -> u32 {
        debug_assert!(hash < self.capacity());
        debug_assert!(self.count() + self.deletes() < self.capacity() * BUCKET_SIZE);
        let addr = self.next_address();
        self.map.link(hash, addr, ty);
        self.map.set(addr + ITEM_FROM, from);
        self.map.set(addr + ITEM_TO, to);
        addr
    }

    /// Offset of the live record for the triple, or 0.
    pub(crate) fn address_of(&self, hash: u32, from: u32, to: u32, ty: u32) -> u32 {
        let mut item = self.map.head(hash);
        while item != 0 {
            if self.map.type_of(item) == ty
                && self.map.get(item + ITEM_FROM) == from
                && self.map.get(item + ITEM_TO) == to
            {
                return item;
            }
            item = self.map.next_of(item);
        }
        0
    }

    /// Turn an unlinked record into a tombstone. `type` was already
    /// cleared by `unlink`; this wipes the endpoints and counts the hole.
    pub(crate) fn delete(&mut self, edge: u32) {
        self.map.set(edge + ITEM_FROM, 0);
        self.map.set(edge + ITEM_TO, 0);
        let deletes = self.deletes() + 1;
        self.map.set(HDR_DELETES, deletes);
    }

    pub(crate) fn unlink(&mut self, hash: u32, edge: u32) {
        self.map.unlink(hash, edge);
    }

    // ── Record fields ───────────────────────────────────────────────

    pub(crate) fn from_of(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_FROM)
    }

    pub(crate) fn to_of(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_TO)
    }

    pub(crate) fn type_of(&self, edge: u32) -> u32 {
        self.map.type_of(edge)
    }

    pub(crate) fn next_in(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_NEXT_IN)
    }

    pub(crate) fn prev_in(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_PREV_IN)
    }

    pub(crate) fn next_out(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_NEXT_OUT)
    }

    pub(crate) fn prev_out(&self, edge: u32) -> u32 {
        self.map.get(edge + ITEM_PREV_OUT)
    }

    // ── Intrusive lists ─────────────────────────────────────────────

    /// Chain `next` behind `edge` at the tail of an inbound list.
    pub(crate) fn link_in(&mut self, edge: u32, next: u32) {
        self.map.set(edge + ITEM_NEXT_IN, next);
        self.map.set(next + ITEM_PREV_IN, edge);
    }

    /// Chain `next` behind `edge` at the tail of an outbound list.
    pub(crate) fn link_out(&mut self, edge: u32, next: u32) {
        self.map.set(edge + ITEM_NEXT_OUT, next);
        self.map.set(next + ITEM_PREV_OUT, edge);
    }

    /// Splice `edge` out of its inbound list and clear its links.
    pub(crate) fn unlink_in(&mut self, edge: u32) {
        let prev = self.prev_in(edge);
        let next = self.next_in(edge);
        if prev != 0 {
            self.map.set(prev + ITEM_NEXT_IN, next);
        }
        if next != 0 {
            self.map.set(next + ITEM_PREV_IN, prev);
        }
        self.map.set(edge + ITEM_NEXT_IN, 0);
        self.map.set(edge + ITEM_PREV_IN, 0);
    }

    /// Splice `edge` out of its outbound list and clear its links.
    pub(crate) fn unlink_out(&mut self, edge: u32) {
        let prev = self.prev_out(edge);
        let next = self.next_out(edge);
        if prev != 0 {
            self.map.set(prev + ITEM_NEXT_OUT, next);
        }
        if next != 0 {
            self.map.set(next + ITEM_PREV_OUT, prev);
        }
        self.map.set(edge + ITEM_NEXT_OUT, 0);
        self.map.set(edge + ITEM_PREV_OUT, 0);
    }

    // ── Iteration / stats / buffer access ───────────────────────────

    pub(crate) fn live_items(&self) -> LiveItems<'_, W> {
        self.map.live_items()
    }

    pub(crate) fn bucket_lens(&self) -> impl Iterator<Item = u32> + '_ {
        self.map.bucket_lens()
    }

    pub(crate) fn words(&self) -> &[W] {
        self.map.words()
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.words().len() * W::BYTES
    }
}
