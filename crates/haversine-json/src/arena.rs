//! Typed bump arenas.
//!
//! An [`Arena`] hands out contiguous [`Region`]s carved sequentially from
//! one block. Regions are never released one at a time: the whole block is
//! given back by [`Arena::reset`] or by dropping the arena.
//!
//! Handles are indices rather than pointers. A `Region<T>` is plain `Copy`
//! data and stays meaningful for as long as the arena that produced it has
//! not been reset; reading it through another arena panics on out-of-range
//! access instead of reading foreign memory.
//!
//! Every element handed out reads as `T::default()` until it is written,
//! which is the zero-fill guarantee of the block. The capacity is a limit,
//! not a reservation: backing storage grows on demand up to it, and since
//! handles are indices a reallocation never invalidates one. `used` only
//! ever grows between resets.

use alloc::vec::Vec;
use core::{fmt, marker::PhantomData, mem::size_of, ops::Range};

use bstr::BStr;
use thiserror::Error;

/// A byte range inside the literal arena.
pub type Buffer = Region<u8>;

/// Allocation failures.
///
/// Capacities are chosen by the caller for a known input size, so running
/// out is treated as fatal: there is no retry with a larger arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("`{arena}` arena exhausted: requested {requested} more, {used} of {capacity} used")]
    Exhausted {
        arena: &'static str,
        requested: usize,
        used: usize,
        capacity: usize,
    },
    /// The allocator refused to grow the backing storage, even though the
    /// request fits the arena's capacity.
    #[error("`{arena}` arena out of memory: could not grow by {requested}")]
    OutOfMemory {
        arena: &'static str,
        requested: usize,
    },
}

/// A contiguous run of `len` elements starting at index `start`.
pub struct Region<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Region<T> {
    /// The empty region at offset zero.
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    // Callers only construct regions inside an arena, whose capacity is
    // clamped to `u32::MAX` elements.
    #[expect(clippy::cast_possible_truncation)]
    fn new(start: usize, len: usize) -> Self {
        Self {
            start: start as u32,
            len: len as u32,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn start(self) -> usize {
        self.start as usize
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    fn range(self) -> Range<usize> {
        self.start()..self.start() + self.len()
    }
}

impl<T> Clone for Region<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Region<T> {}

impl<T> Default for Region<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> PartialEq for Region<T> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<T> Eq for Region<T> {}

impl<T> fmt::Debug for Region<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// Point-in-time accounting for one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaUsage {
    pub name: &'static str,
    pub used: usize,
    pub capacity: usize,
    /// Bytes currently held by the backing storage.
    pub reserved_bytes: usize,
}

/// A linear allocator over elements of `T`.
pub struct Arena<T> {
    name: &'static str,
    slots: Vec<T>,
    capacity: usize,
}

impl<T: Copy + Default> Arena<T> {
    /// An empty arena that will hand out at most `capacity` elements.
    /// Nothing is allocated until the first request. `name` identifies the
    /// arena in [`ArenaError`].
    #[must_use]
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            slots: Vec::new(),
            capacity: capacity.min(u32::MAX as usize),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn used(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used()
    }

    #[must_use]
    pub fn usage(&self) -> ArenaUsage {
        ArenaUsage {
            name: self.name,
            used: self.used(),
            capacity: self.capacity,
            reserved_bytes: self.slots.capacity() * size_of::<T>(),
        }
    }

    /// Allocates `count` fresh elements, each equal to `T::default()`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Exhausted`] if fewer than `count` elements remain,
    /// [`ArenaError::OutOfMemory`] if the storage cannot grow. The arena is
    /// left untouched in both cases.
    pub fn alloc(&mut self, count: usize) -> Result<Region<T>, ArenaError> {
        let start = self.reserve(count)?;
        self.slots.resize(start + count, T::default());
        Ok(Region::new(start, count))
    }

    /// Allocates a single element holding `value`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Exhausted`] if the arena is full.
    pub fn push(&mut self, value: T) -> Result<Region<T>, ArenaError> {
        let start = self.reserve(1)?;
        self.slots.push(value);
        Ok(Region::new(start, 1))
    }

    /// Allocates a copy of `values`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Exhausted`] if fewer than `values.len()` elements remain.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<Region<T>, ArenaError> {
        let start = self.reserve(values.len())?;
        self.slots.extend_from_slice(values);
        Ok(Region::new(start, values.len()))
    }

    /// Copies the first `count` elements of `src` to the front of `dst`.
    ///
    /// # Panics
    ///
    /// If `count` exceeds either region or a region lies outside the arena.
    pub fn copy_within(&mut self, src: Region<T>, dst: Region<T>, count: usize) {
        assert!(count <= src.len() && count <= dst.len());
        self.slots
            .copy_within(src.start()..src.start() + count, dst.start());
    }

    /// # Panics
    ///
    /// If `region` was not produced by this arena since its last reset.
    #[must_use]
    pub fn get(&self, region: Region<T>) -> &[T] {
        &self.slots[region.range()]
    }

    /// # Panics
    ///
    /// If `region` was not produced by this arena since its last reset.
    pub fn get_mut(&mut self, region: Region<T>) -> &mut [T] {
        &mut self.slots[region.range()]
    }

    /// Everything allocated so far, in allocation order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    /// Releases every allocation at once. The backing storage is kept for
    /// reuse.
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    /// Checks `count` against the capacity and makes room for it, so that
    /// the following write cannot reallocate.
    fn reserve(&mut self, count: usize) -> Result<usize, ArenaError> {
        if count > self.remaining() {
            return Err(ArenaError::Exhausted {
                arena: self.name,
                requested: count,
                used: self.used(),
                capacity: self.capacity,
            });
        }
        self.slots
            .try_reserve(count)
            .map_err(|_| ArenaError::OutOfMemory {
                arena: self.name,
                requested: count,
            })?;
        Ok(self.used())
    }
}

impl Arena<u8> {
    /// The content of `buffer`. Comparing the result against a `&str` or
    /// `&[u8]` compares bytes, not positions.
    #[must_use]
    pub fn bytes(&self, buffer: Buffer) -> &BStr {
        BStr::new(self.get(buffer))
    }

    /// Stores `value` as its 8 little-endian bytes.
    ///
    /// # Errors
    ///
    /// [`ArenaError::Exhausted`] if fewer than 8 bytes remain.
    pub fn push_f64(&mut self, value: f64) -> Result<Buffer, ArenaError> {
        self.extend_from_slice(&value.to_le_bytes())
    }

    /// Reads back a value written by [`Arena::push_f64`]. `None` when
    /// `buffer` is not 8 bytes wide.
    #[must_use]
    pub fn read_f64(&self, buffer: Buffer) -> Option<f64> {
        self.get(buffer).try_into().ok().map(f64::from_le_bytes)
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("name", &self.name)
            .field("used", &self.slots.len())
            .field("capacity", &self.capacity)
            .field("reserved", &self.slots.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_disjoint_and_default_filled() {
        let mut arena = Arena::<u32>::with_capacity("test", 8);
        let a = arena.alloc(3).unwrap();
        arena.get_mut(a).copy_from_slice(&[7, 8, 9]);
        let b = arena.alloc(5).unwrap();

        assert_eq!(a.start(), 0);
        assert_eq!(b.start(), 3);
        assert_eq!(arena.get(a), &[7, 8, 9]);
        assert_eq!(arena.get(b), &[0; 5]);
        assert_eq!(arena.used(), 8);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn exhaustion_is_reported_and_leaves_arena_untouched() {
        let mut arena = Arena::<u8>::with_capacity("literals", 4);
        arena.extend_from_slice(b"abc").unwrap();

        let err = arena.alloc(2).unwrap_err();
        assert_eq!(
            err,
            ArenaError::Exhausted {
                arena: "literals",
                requested: 2,
                used: 3,
                capacity: 4,
            }
        );
        assert_eq!(arena.used(), 3);

        // The remaining byte is still usable.
        arena.push(b'd').unwrap();
        assert_eq!(arena.as_slice(), b"abcd");
        assert!(arena.push(b'e').is_err());
    }

    #[test]
    fn zero_sized_requests_always_succeed() {
        let mut arena = Arena::<u8>::with_capacity("empty", 0);
        let region = arena.alloc(0).unwrap();
        assert!(region.is_empty());
        assert_eq!(arena.get(region), b"");
    }

    #[test]
    fn bytes_compare_by_content() {
        let mut arena = Arena::<u8>::with_capacity("literals", 16);
        let first = arena.extend_from_slice(b"hello").unwrap();
        let second = arena.extend_from_slice(b"hello").unwrap();

        assert_ne!(first, second);
        assert_eq!(arena.bytes(first), arena.bytes(second));
        assert_eq!(arena.bytes(first), "hello");
        assert_eq!(arena.bytes(first), &b"hello"[..]);
    }

    #[test]
    fn f64_payload_round_trips() {
        let mut arena = Arena::<u8>::with_capacity("literals", 16);
        let buffer = arena.push_f64(3.25).unwrap();
        assert_eq!(buffer.len(), 8);
        assert_eq!(arena.read_f64(buffer), Some(3.25));

        let short = arena.extend_from_slice(b"ab").unwrap();
        assert_eq!(arena.read_f64(short), None);
    }

    #[test]
    fn copy_within_moves_prefix() {
        let mut arena = Arena::<u16>::with_capacity("values", 10);
        let old = arena.extend_from_slice(&[1, 2, 3]).unwrap();
        let new = arena.alloc(6).unwrap();
        arena.copy_within(old, new, 2);

        assert_eq!(arena.get(new), &[1, 2, 0, 0, 0, 0]);
        // The old storage is dead space but still readable.
        assert_eq!(arena.get(old), &[1, 2, 3]);
    }

    #[test]
    fn reset_releases_everything() {
        let mut arena = Arena::<u8>::with_capacity("literals", 4);
        arena.extend_from_slice(b"abcd").unwrap();
        arena.reset();

        assert_eq!(arena.used(), 0);
        let region = arena.alloc(4).unwrap();
        assert_eq!(arena.get(region), &[0; 4]);
        let usage = arena.usage();
        assert_eq!((usage.name, usage.used, usage.capacity), ("literals", 4, 4));
        // The storage from before the reset is reused.
        assert!(usage.reserved_bytes >= 4);
    }

    #[test]
    fn capacity_is_a_limit_not_a_reservation() {
        let mut arena = Arena::<u64>::with_capacity("values", usize::MAX);
        assert_eq!(arena.capacity(), u32::MAX as usize);
        assert_eq!(arena.usage().reserved_bytes, 0);

        let first = arena.extend_from_slice(&[1, 2, 3]).unwrap();
        for i in 0..1_000 {
            arena.push(i).unwrap();
        }
        // Growing the storage keeps earlier handles valid.
        assert_eq!(arena.get(first), &[1, 2, 3]);
        assert_eq!(arena.used(), 1_003);

        let reserved = arena.usage().reserved_bytes;
        assert!(reserved >= 1_003 * 8);
        assert!(reserved <= 2 * 1_003 * 8, "reserved {reserved} bytes");
    }
}
