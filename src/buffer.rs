//! Growable output buffer
//!
//! The buffer is a length/capacity pair over a block owned by an
//! [`AllocationStrategy`]. Capacity only grows, always to a power of two, so
//! appends are amortized linear. Every append is a single capacity-checked
//! operation returning a `Result`; a failed growth leaves the buffer exactly
//! as it was.
//!
//! The block is released exactly once: by `Drop` on every failure path, or
//! by whoever takes it over through [`NamespacedHtml::into_raw_parts`].

use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::{self, NonNull};
use std::slice;

use log::debug;

use crate::alloc::{AllocationStrategy, SystemHeap};
use crate::error::NamespacingError;

/// First power of two that is `>= len` (and at least 1)
fn round_to_power_of_two(len: usize) -> Option<usize> {
    len.max(1).checked_next_power_of_two()
}

/// Growable byte buffer backed by an allocation strategy
pub struct OutputBuffer<A: AllocationStrategy = SystemHeap> {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    strategy: A,
}

// SAFETY: the buffer exclusively owns its block; moving it between threads
// is as safe as moving the strategy.
unsafe impl<A: AllocationStrategy + Send> Send for OutputBuffer<A> {}
// SAFETY: shared access only reads the initialized prefix.
unsafe impl<A: AllocationStrategy + Sync> Sync for OutputBuffer<A> {}

impl<A: AllocationStrategy> OutputBuffer<A> {
    /// Allocate a buffer whose capacity is the next power of two `>= capacity`
    pub fn with_capacity(capacity: usize, strategy: A) -> Result<Self, NamespacingError> {
        let capacity = round_to_power_of_two(capacity).ok_or(NamespacingError::OutOfMemory)?;
        let ptr = strategy.allocate(capacity).ok_or_else(|| {
            debug!("initial output allocation of {} bytes failed", capacity);
            NamespacingError::OutOfMemory
        })?;

        Ok(Self {
            ptr,
            len: 0,
            capacity,
            strategy,
        })
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes currently allocated
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is live for `capacity >= len` bytes and the first
        // `len` bytes are initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Grow so that at least `min_len` bytes fit
    ///
    /// Capacity is doubled until it reaches `min_len`. On failure the
    /// pointer, length and capacity are unchanged.
    pub fn ensure_capacity(&mut self, min_len: usize) -> Result<(), NamespacingError> {
        if self.capacity >= min_len {
            return Ok(());
        }

        let mut new_capacity = self.capacity.max(1);
        while new_capacity < min_len {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or(NamespacingError::OutOfMemory)?;
        }

        // SAFETY: `self.ptr` is the live block from this strategy. On failure
        // realloc leaves it untouched and we keep owning it.
        let new_ptr = unsafe { self.strategy.reallocate(self.ptr, new_capacity) }.ok_or_else(
            || {
                debug!(
                    "growing output buffer from {} to {} bytes failed",
                    self.capacity, new_capacity
                );
                NamespacingError::OutOfMemory
            },
        )?;

        self.ptr = new_ptr;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Append raw bytes, growing first if necessary
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), NamespacingError> {
        if bytes.is_empty() {
            return Ok(());
        }

        let new_len = self
            .len
            .checked_add(bytes.len())
            .ok_or(NamespacingError::OutOfMemory)?;
        self.ensure_capacity(new_len)?;

        // SAFETY: capacity >= new_len after ensure_capacity, and `bytes`
        // cannot alias the block we hold mutably.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.as_ptr().add(self.len), bytes.len());
        }
        self.len = new_len;
        Ok(())
    }

    /// Append a string literal
    pub fn append_literal(&mut self, literal: &str) -> Result<(), NamespacingError> {
        self.append_bytes(literal.as_bytes())
    }

    /// Terminate with a NUL byte (not counted in the length) and hand over
    /// ownership of the block
    pub fn finalize(mut self) -> Result<NamespacedHtml<A>, NamespacingError> {
        let with_nul = self
            .len
            .checked_add(1)
            .ok_or(NamespacingError::OutOfMemory)?;
        self.ensure_capacity(with_nul)?;

        // SAFETY: capacity > len after ensure_capacity.
        unsafe { self.ptr.as_ptr().add(self.len).write(0) };

        Ok(NamespacedHtml { buffer: self })
    }
}

impl<A: AllocationStrategy> Drop for OutputBuffer<A> {
    fn drop(&mut self) {
        // SAFETY: the block is live and owned by this buffer; Drop runs once.
        unsafe { self.strategy.release(self.ptr) };
    }
}

/// Namespaced HTML owned by the caller
///
/// The bytes are followed by a single NUL byte that is not part of
/// [`len`](Self::len), so the block can be handed to C as a C string.
/// Dropping the value releases the block through the strategy that
/// allocated it.
pub struct NamespacedHtml<A: AllocationStrategy = SystemHeap> {
    buffer: OutputBuffer<A>,
}

impl<A: AllocationStrategy> NamespacedHtml<A> {
    /// Length in bytes, excluding the NUL terminator
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// View as UTF-8; valid whenever the input HTML and namespace were
    pub fn as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }

    /// Copy into a `Vec<u8>` and release the original block
    pub fn into_vec(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Give up ownership of the block
    ///
    /// Returns the pointer, the used length (excluding the NUL terminator)
    /// and the strategy that must be used to release it.
    pub fn into_raw_parts(self) -> (NonNull<u8>, usize, A) {
        let buffer = ManuallyDrop::new(self.buffer);
        // SAFETY: `buffer` is never dropped, so the strategy is moved out
        // exactly once and the block is not released here.
        let strategy = unsafe { ptr::read(&buffer.strategy) };
        (buffer.ptr, buffer.len, strategy)
    }
}

impl<A: AllocationStrategy> Deref for NamespacedHtml<A> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: AllocationStrategy> AsRef<[u8]> for NamespacedHtml<A> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<A: AllocationStrategy> fmt::Debug for NamespacedHtml<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamespacedHtml")
            .field(&String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_round_to_power_of_two() {
        assert_eq!(round_to_power_of_two(0), Some(1));
        assert_eq!(round_to_power_of_two(1), Some(1));
        assert_eq!(round_to_power_of_two(5), Some(8));
        assert_eq!(round_to_power_of_two(64), Some(64));
        assert_eq!(round_to_power_of_two(usize::MAX), None);
    }

    #[test]
    fn test_initial_capacity_is_power_of_two() {
        let buffer = OutputBuffer::with_capacity(100, SystemHeap).expect("allocation");
        assert_eq!(buffer.capacity(), 128);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_append_grows_geometrically() {
        let mut buffer = OutputBuffer::with_capacity(4, SystemHeap).expect("allocation");
        buffer.append_literal("abcd").expect("fits");
        assert_eq!(buffer.capacity(), 4);

        buffer.append_literal("e").expect("grows");
        assert_eq!(buffer.capacity(), 8);

        buffer.append_bytes(&[b'x'; 20]).expect("grows");
        assert_eq!(buffer.capacity(), 32);
        assert_eq!(buffer.len(), 25);
        assert!(buffer.as_bytes().starts_with(b"abcde"));
    }

    #[test]
    fn test_empty_append_is_noop() {
        let mut buffer = OutputBuffer::with_capacity(1, SystemHeap).expect("allocation");
        buffer.append_bytes(b"").expect("noop");
        buffer.append_literal("").expect("noop");
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 1);
    }

    #[test]
    fn test_finalize_adds_uncounted_nul() {
        let mut buffer = OutputBuffer::with_capacity(4, SystemHeap).expect("allocation");
        buffer.append_literal("abcd").expect("fits");
        let html = buffer.finalize().expect("finalize");
        assert_eq!(html.len(), 4);
        assert_eq!(html.as_str(), Ok("abcd"));

        let (ptr, len, strategy) = html.into_raw_parts();
        // SAFETY: the block holds len + 1 initialized bytes and is released once.
        unsafe {
            assert_eq!(*ptr.as_ptr().add(len), 0);
            strategy.release(ptr);
        }
    }

    proptest! {
        #[test]
        fn prop_appends_preserve_content(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..20)) {
            let mut buffer = OutputBuffer::with_capacity(1, SystemHeap).expect("allocation");
            let mut expected = Vec::new();

            for chunk in &chunks {
                buffer.append_bytes(chunk).expect("append");
                expected.extend_from_slice(chunk);
                prop_assert!(buffer.capacity() >= buffer.len());
                prop_assert!(buffer.capacity().is_power_of_two());
            }

            prop_assert_eq!(buffer.as_bytes(), expected.as_slice());
        }
    }
}
