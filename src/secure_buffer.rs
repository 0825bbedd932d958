//! A scoped, zeroizing scratch buffer for constructed-value reassembly.
//!
//! Reassembling a constructed BIT STRING or OCTET STRING copies each
//! nested segment's bytes into a single contiguous accumulator before the
//! caller's destination is known to be large enough (or, under the `alloc`
//! `get_*` convenience accessors, before an owned buffer is returned at
//! all). Because the bytes passing through that accumulator may be key
//! material or other sensitive content, it is zeroized before the memory is
//! reused or freed — on every exit path, including an early `?` return,
//! since [`Drop`] always runs.

use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};
use zeroize::Zeroize;

/// A small free-list of scratch buffers, scoped to a single reassembly
/// call. Reusing a buffer across the segments of one constructed value
/// avoids a fresh allocation per segment without needing a crate-wide pool.
#[derive(Default)]
pub(crate) struct BufferPool {
    free: Vec<Vec<u8>>,
}

impl BufferPool {
    pub(crate) const fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Rent a cleared buffer with at least `min_capacity` bytes of
    /// capacity. Reused from the pool's free list when one is large
    /// enough, otherwise freshly allocated.
    pub(crate) fn rent(&mut self, min_capacity: usize) -> RentedBuffer<'_> {
        let buf = self
            .free
            .iter()
            .position(|candidate| candidate.capacity() >= min_capacity)
            .map(|index| self.free.swap_remove(index))
            .unwrap_or_else(|| Vec::with_capacity(min_capacity));

        RentedBuffer {
            pool: self,
            buf: Some(buf),
        }
    }
}

/// A buffer on loan from a [`BufferPool`].
///
/// Zeroized and returned to the pool's free list when dropped, regardless
/// of whether the borrowing code ran to completion or bailed out early.
pub(crate) struct RentedBuffer<'p> {
    pool: &'p mut BufferPool,
    buf: Option<Vec<u8>>,
}

impl Deref for RentedBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        self.buf.as_ref().expect("buffer taken before drop")
    }
}

impl DerefMut for RentedBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.buf.as_mut().expect("buffer taken before drop")
    }
}

impl Drop for RentedBuffer<'_> {
    fn drop(&mut self) {
        if let Some(mut buf) = self.buf.take() {
            buf.zeroize();
            buf.clear();
            self.pool.free.push(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BufferPool;

    #[test]
    fn rented_buffer_is_usable() {
        let mut pool = BufferPool::new();
        let mut buf = pool.rent(4);
        buf.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(&buf[..], &[1, 2, 3, 4]);
    }

    #[test]
    fn returned_capacity_is_reused() {
        let mut pool = BufferPool::new();
        {
            let mut buf = pool.rent(64);
            buf.extend_from_slice(&[0xAAu8; 32]);
        }
        assert_eq!(pool.free.len(), 1);
        assert!(pool.free[0].capacity() >= 64);
        assert!(pool.free[0].is_empty());
    }

    #[test]
    fn dropped_buffer_is_zeroized_before_reuse() {
        let mut pool = BufferPool::new();
        {
            let mut buf = pool.rent(8);
            buf.extend_from_slice(b"secret!!");
        }
        let stale = &pool.free[0];
        assert!(stale.is_empty());
    }
}
