//! Storage word widths for the flat maps.
//!
//! Every map buffer is a `Vec<W>` of fixed-width unsigned words; node ids,
//! edge types and intra-buffer offsets are all stored as words. The engine
//! does its arithmetic in `u32` space and converts at the buffer boundary,
//! so the same operation sequence produces the same word values at every
//! width (smaller widths just cap capacity sooner).

/// A fixed-width unsigned storage word (`u8`, `u16` or `u32`).
pub trait Word: Copy + Eq + Default + std::fmt::Debug + Send + Sync + 'static {
    /// Width in bits.
    const BITS: u32;

    /// Width in bytes (little-endian on the wire).
    const BYTES: usize;

    /// Highest buffer offset a map of this width may address:
    /// `2^(BITS-1) - 1`. The `u32` ceiling keeps offsets inside the
    /// signed-31-bit range, and narrower widths shrink proportionally.
    const MAX_ADDR: u32;

    /// Largest value a single word can hold (`2^BITS - 1`).
    const MAX_VALUE: u32;

    /// Narrow a `u32` into a word. Callers guarantee `v <= MAX_VALUE`.
    fn from_u32(v: u32) -> Self;

    /// Widen a word back into `u32`.
    fn to_u32(self) -> u32;
}

impl Word for u8 {
    const BITS: u32 = 8;
    const BYTES: usize = 1;
    const MAX_ADDR: u32 = (1 << 7) - 1;
    const MAX_VALUE: u32 = u8::MAX as u32;

    #[inline]
    fn from_u32(v: u32) -> Self {
        debug_assert!(v <= Self::MAX_VALUE);
        v as u8
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl Word for u16 {
    const BITS: u32 = 16;
    const BYTES: usize = 2;
    const MAX_ADDR: u32 = (1 << 15) - 1;
    const MAX_VALUE: u32 = u16::MAX as u32;

    #[inline]
    fn from_u32(v: u32) -> Self {
        debug_assert!(v <= Self::MAX_VALUE);
        v as u16
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl Word for u32 {
    const BITS: u32 = 32;
    const BYTES: usize = 4;
    const MAX_ADDR: u32 = (1 << 31) - 1;
    const MAX_VALUE: u32 = u32::MAX;

    #[inline]
    fn from_u32(v: u32) -> Self {
        v
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self
    }
}
