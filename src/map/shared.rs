//! Base flat hash-map primitive shared by the node and edge maps.
//!
//! One contiguous word buffer holds a small header, the bucket table and a
//! fixed-width item region. Collisions chain through each item's `next`
//! word; a zero `type` word marks a slot that is free (or tombstoned, for
//! maps that delete). The buffer is the map's only state, so handing it
//! across a thread or process boundary hands over the whole map.

use crate::error::{GraphError, Result};
use crate::word::Word;

use super::{BUCKET_SIZE, HDR_CAPACITY, HDR_COUNT, ITEM_NEXT, ITEM_TYPE, MIN_CAPACITY};

/// Flat fixed-width hash map with chaining.
///
/// `header_words` and `item_words` are fixed by the concrete map wrapping
/// this (node: 3/6, edge: 3/8) and never change over the map's lifetime.
#[derive(Debug, Clone)]
pub(crate) struct SharedTypeMap<W: Word> {
    buf: Vec<W>,
    header_words: u32,
    item_words: u32,
}

impl<W: Word> SharedTypeMap<W> {
    // ── Construction ────────────────────────────────────────────────

    /// Allocate a zeroed map of the given capacity.
    pub(crate) fn with_capacity(header_words: u32, item_words: u32, capacity: u32) -> Self {
        debug_assert!(capacity >= MIN_CAPACITY);
        let len = Self::len_words_for(header_words, item_words, capacity);
        let mut map = Self {
            buf: vec![W::default(); len as usize],
            header_words,
            item_words,
        };
        map.set(HDR_CAPACITY, capacity);
        map
    }

    /// Adopt an existing buffer, validating that its length matches the
    /// length implied by the capacity word in its header.
    pub(crate) fn from_words(
        header_words: u32,
        item_words: u32,
        buf: Vec<W>,
        map_name: &'static str,
    ) -> Result<Self> {
        if (buf.len() as u64) < header_words as u64 {
            return Err(GraphError::Corrupt(format!(
                "{} buffer too small for header ({} words)",
                map_name,
                buf.len()
            )));
        }
        let capacity = buf[HDR_CAPACITY as usize].to_u32();
        if capacity < MIN_CAPACITY {
            return Err(GraphError::Corrupt(format!(
                "{} capacity {} below minimum {}",
                map_name, capacity, MIN_CAPACITY
            )));
        }
        let expected = Self::len_words_for(header_words, item_words, capacity) as usize;
        if expected != buf.len() {
            return Err(GraphError::Corrupt(format!(
                "{} buffer length {} does not match header-implied length {}",
                map_name,
                buf.len(),
                expected
            )));
        }
        Ok(Self {
            buf,
            header_words,
            item_words,
        })
    }

    /// Buffer length in words for a map of `capacity`:
    /// header + bucket table + `capacity * BUCKET_SIZE` item slots.
    pub(crate) fn len_words_for(header_words: u32, item_words: u32, capacity: u32) -> u32 {
        header_words + capacity + capacity * BUCKET_SIZE * item_words
    }

    // ── Raw word access ─────────────────────────────────────────────

    #[inline]
    pub(crate) fn get(&self, at: u32) -> u32 {
        self.buf[at as usize].to_u32()
    }

    #[inline]
    pub(crate) fn set(&mut self, at: u32, v: u32) {
        self.buf[at as usize] = W::from_u32(v);
    }

    pub(crate) fn words(&self) -> &[W] {
        &self.buf
    }

    // ── Layout ──────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.get(HDR_CAPACITY)
    }

    #[inline]
    pub(crate) fn count(&self) -> u32 {
        self.get(HDR_COUNT)
    }

    /// First word of the item region.
    #[inline]
    pub(crate) fn items_start(&self) -> u32 {
        self.header_words + self.capacity()
    }

    /// Address of item slot `k`.
    #[inline]
    pub(crate) fn slot_address(&self, k: u32) -> u32 {
        self.items_start() + k * self.item_words
    }

    /// Next unused item slot. Maps that tombstone (the edge map) account
    /// for dead slots on top of this.
    pub(crate) fn next_address(&self) -> u32 {
        self.slot_address(self.count())
    }

    // ── Hash chains ─────────────────────────────────────────────────

    /// Head of the chain for `hash`, or 0.
    #[inline]
    pub(crate) fn head(&self, hash: u32) -> u32 {
        debug_assert!(hash < self.capacity());
        self.get(self.header_words + hash)
    }

    /// Chain successor of `item`, or 0.
    #[inline]
    pub(crate) fn next_of(&self, item: u32) -> u32 {
        self.get(item + ITEM_NEXT)
    }

    /// Type tag of `item`; 0 means free or tombstoned.
    #[inline]
    pub(crate) fn type_of(&self, item: u32) -> u32 {
        self.get(item + ITEM_TYPE)
    }

    /// Tag `item` with `ty` and append it to the chain for `hash`.
    pub(crate) fn link(&mut self, hash: u32, item: u32, ty: u32) {
        debug_assert!(ty != 0);
        self.set(item + ITEM_TYPE, ty);
        let bucket = self.header_words + hash;
        let head = self.get(bucket);
        if head == 0 {
            self.set(bucket, item);
        } else {
            let mut tail = head;
            loop {
                let next = self.next_of(tail);
                if next == 0 {
                    break;
                }
                tail = next;
            }
            self.set(tail + ITEM_NEXT, item);
        }
        let count = self.count() + 1;
        self.set(HDR_COUNT, count);
    }

    /// Clear `item`'s tag and splice it out of the chain for `hash`.
    ///
    /// Walks the chain from the bucket head to find the predecessor; the
    /// linear walk is part of the observable contract.
    pub(crate) fn unlink(&mut self, hash: u32, item: u32) {
        self.set(item + ITEM_TYPE, 0);
        let bucket = self.header_words + hash;
        let next = self.next_of(item);
        let head = self.get(bucket);
        if head == item {
            self.set(bucket, next);
        } else {
            let mut prev = head;
            while prev != 0 {
                let n = self.next_of(prev);
                if n == item {
                    self.set(prev + ITEM_NEXT, next);
                    break;
                }
                prev = n;
            }
        }
        self.set(item + ITEM_NEXT, 0);
        let count = self.count() - 1;
        self.set(HDR_COUNT, count);
    }

    // ── Load ────────────────────────────────────────────────────────

    /// Hash-density load for a hypothetical live count.
    pub(crate) fn load(&self, count: u32) -> f64 {
        count as f64 / (self.capacity() * BUCKET_SIZE) as f64
    }

    // ── Iteration ───────────────────────────────────────────────────

    /// Scan the item region in slot order, yielding the addresses of live
    /// (nonzero-typed) items until `count` have been seen or the region
    /// ends. Slot order approximates insertion order.
    pub(crate) fn live_items(&self) -> LiveItems<'_, W> {
        LiveItems {
            map: self,
            addr: self.items_start(),
            end: self.slot_address(self.capacity() * BUCKET_SIZE),
            remaining: self.count(),
        }
    }

    /// Chain lengths per bucket, for distribution stats.
    pub(crate) fn bucket_lens(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.capacity()).map(move |b| {
            let mut len = 0;
            let mut item = self.head(b);
            while item != 0 {
                len += 1;
                item = self.next_of(item);
            }
            len
        })
    }

    // ── Snapshot copy ───────────────────────────────────────────────

    /// Copy a smaller-capacity snapshot into this map, rebasing the bucket
    /// table and every item `next` pointer by the item-region shift.
    ///
    /// Item payload words are copied position-for-position untouched; only
    /// chain pointers address this buffer and therefore move with it.
    pub(crate) fn copy_rebased(&mut self, src: &Self) -> Result<()> {
        debug_assert_eq!(self.header_words, src.header_words);
        debug_assert_eq!(self.item_words, src.item_words);
        if src.capacity() > self.capacity() {
            return Err(GraphError::CapacityTooSmall {
                target: self.capacity(),
                source_capacity: src.capacity(),
            });
        }
        let delta = self.capacity() - src.capacity();

        // Header: everything but the capacity word.
        for h in (HDR_CAPACITY + 1)..self.header_words {
            self.set(h, src.get(h));
        }

        // Bucket table, shifted into the wider item region.
        for b in 0..src.capacity() {
            let head = src.get(src.header_words + b);
            if head != 0 {
                self.set(self.header_words + b, head + delta);
            }
        }

        // Item region, position-for-position.
        let src_start = src.items_start() as usize;
        let dst_start = self.items_start() as usize;
        let region = (src.capacity() * BUCKET_SIZE * src.item_words) as usize;
        self.buf[dst_start..dst_start + region]
            .copy_from_slice(&src.buf[src_start..src_start + region]);

        // Rebase the chain pointers that moved with the region.
        for slot in 0..src.capacity() * BUCKET_SIZE {
            let addr = self.slot_address(slot);
            let next = self.get(addr + ITEM_NEXT);
            if next != 0 {
                self.set(addr + ITEM_NEXT, next + delta);
            }
        }
        Ok(())
    }
}

/// Forward scan over live item addresses. See [`SharedTypeMap::live_items`].
pub(crate) struct LiveItems<'a, W: Word> {
    map: &'a SharedTypeMap<W>,
    addr: u32,
    end: u32,
    remaining: u32,
}

impl<W: Word> Iterator for LiveItems<'_, W> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.remaining > 0 && self.addr < self.end {
            let cur = self.addr;
            self.addr += self.map.item_words;
            if self.map.type_of(cur) != 0 {
                self.remaining -= 1;
                return Some(cur);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 2-word item schema (next, type) with a 2-word header, the base
    // layout with no payload.
    fn base_map(capacity: u32) -> SharedTypeMap<u32> {
        SharedTypeMap::with_capacity(2, 2, capacity)
    }

    #[test]
    fn test_len_words_for() {
        // header 2 + table 4 + 4 buckets * 2 items * 2 words
        assert_eq!(SharedTypeMap::<u32>::len_words_for(2, 2, 4), 22);
        // node schema: header 3 + table 4 + 4 * 2 * 6
        assert_eq!(SharedTypeMap::<u32>::len_words_for(3, 6, 4), 55);
        // edge schema: header 3 + table 4 + 4 * 2 * 8
        assert_eq!(SharedTypeMap::<u32>::len_words_for(3, 8, 4), 71);
    }

    #[test]
    fn test_link_builds_chain_in_append_order() {
        let mut map = base_map(4);
        let a = map.next_address();
        map.link(1, a, 7);
        let b = map.next_address();
        map.link(1, b, 8);
        let c = map.next_address();
        map.link(1, c, 9);

        assert_eq!(map.count(), 3);
        assert_eq!(map.head(1), a);
        assert_eq!(map.next_of(a), b);
        assert_eq!(map.next_of(b), c);
        assert_eq!(map.next_of(c), 0);
        assert_eq!(map.type_of(b), 8);
        // Other buckets untouched.
        assert_eq!(map.head(0), 0);
    }

    #[test]
    fn test_unlink_head_middle_tail() {
        let mut map = base_map(4);
        let a = map.next_address();
        map.link(2, a, 1);
        let b = map.next_address();
        map.link(2, b, 2);
        let c = map.next_address();
        map.link(2, c, 3);

        // Middle.
        map.unlink(2, b);
        assert_eq!(map.head(2), a);
        assert_eq!(map.next_of(a), c);
        assert_eq!(map.type_of(b), 0);
        assert_eq!(map.next_of(b), 0);

        // Head.
        map.unlink(2, a);
        assert_eq!(map.head(2), c);

        // Tail (now also head).
        map.unlink(2, c);
        assert_eq!(map.head(2), 0);
        assert_eq!(map.count(), 0);
    }

    #[test]
    fn test_live_items_skips_holes() {
        let mut map = base_map(4);
        let a = map.next_address();
        map.link(0, a, 1);
        let b = map.next_address();
        map.link(0, b, 2);
        let c = map.next_address();
        map.link(3, c, 3);

        map.unlink(0, b);

        let live: Vec<u32> = map.live_items().collect();
        assert_eq!(live, vec![a, c]);
    }

    #[test]
    fn test_load() {
        let mut map = base_map(4);
        assert_eq!(map.load(map.count()), 0.0);
        let a = map.next_address();
        map.link(0, a, 1);
        assert_eq!(map.load(map.count()), 1.0 / 8.0);
        assert_eq!(map.load(8), 1.0);
    }

    #[test]
    fn test_copy_rebased_shifts_chain_pointers() {
        let mut small = base_map(2);
        let a = small.next_address();
        small.link(1, a, 5);
        let b = small.next_address();
        small.link(1, b, 6);

        let mut big = base_map(8);
        big.copy_rebased(&small).unwrap();
        let delta = 8 - 2;

        assert_eq!(big.count(), 2);
        assert_eq!(big.head(1), a + delta);
        assert_eq!(big.next_of(a + delta), b + delta);
        assert_eq!(big.type_of(a + delta), 5);
        assert_eq!(big.type_of(b + delta), 6);

        // Chains keep working after the copy.
        let c = big.next_address();
        big.link(1, c, 7);
        assert_eq!(big.next_of(b + delta), c);
    }

    #[test]
    fn test_copy_rebased_rejects_smaller_target() {
        let small = base_map(2);
        let mut smaller = base_map(2);
        // Same capacity is allowed...
        assert!(smaller.copy_rebased(&small).is_ok());
        // ...but a larger source is not.
        let big = base_map(4);
        let err = smaller.copy_rebased(&big).unwrap_err();
        assert_eq!(err.code(), "CAPACITY_TOO_SMALL");
    }

    #[test]
    fn test_from_words_validates_length() {
        let map = base_map(4);
        let mut words = map.words().to_vec();
        words.pop();
        let err = SharedTypeMap::<u32>::from_words(2, 2, words, "test").unwrap_err();
        assert_eq!(err.code(), "CORRUPT");

        let ok = SharedTypeMap::<u32>::from_words(2, 2, map.words().to_vec(), "test");
        assert!(ok.is_ok());
    }
}
