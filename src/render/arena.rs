//! Byte arena backing the per-frame scratch buffers.
//!
//! Batches reference their vertex/index/instance storage through
//! [`Region`] handles (offset + length into the arena) instead of raw
//! pointers, so growth and reuse stay bounds-checkable. The arena is reset
//! once per frame and its allocation is retained across frames.

/// Index-based handle into a [`ScratchArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    offset: usize,
    len: usize,
}

impl Region {
    /// Zero-length region, used by batches that don't need a buffer kind.
    pub const EMPTY: Region = Region { offset: 0, len: 0 };

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Growable byte arena with frame-scoped allocation.
#[derive(Default)]
pub struct ScratchArena {
    bytes: Vec<u8>,
    head: usize,
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            head: 0,
        }
    }

    /// Allocate `len` bytes, growing the backing storage if needed.
    pub fn alloc(&mut self, len: usize) -> Region {
        let offset = self.head;
        self.head += len;
        if self.bytes.len() < self.head {
            self.bytes.resize(self.head, 0);
        }
        Region { offset, len }
    }

    /// Read back up to `len` bytes of a region.
    pub fn slice(&self, region: Region, len: usize) -> &[u8] {
        debug_assert!(len <= region.len);
        &self.bytes[region.offset..region.offset + len]
    }

    pub fn slice_mut(&mut self, region: Region) -> &mut [u8] {
        &mut self.bytes[region.offset..region.offset + region.len]
    }

    /// Drop all regions, keeping the backing allocation for reuse.
    pub fn reset(&mut self) {
        self.head = 0;
    }

    /// Bytes currently allocated out of the arena.
    pub fn len(&self) -> usize {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head == 0
    }

    /// Capacity of the backing storage, surviving resets.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }
}
