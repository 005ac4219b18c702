//! Pluggable allocation strategy for the output buffer
//!
//! The rewriter never talks to an allocator directly. Every allocation,
//! reallocation and release of the output buffer goes through an
//! [`AllocationStrategy`], so hosts can hand the engine an arena, a pool, or
//! the allocator of a managed runtime.
//!
//! The contract is the one of C's `malloc`/`realloc`/`free`:
//!
//! - failure is reported as `None`, never as a dangling pointer
//! - `reallocate` preserves the first `min(old_size, new_size)` bytes
//! - when `reallocate` fails the original block is still valid and owned by
//!   the caller
//!
//! # Example
//!
//! ```
//! use html_namespacing::alloc::{AllocationStrategy, SystemHeap};
//!
//! let heap = SystemHeap;
//! let block = heap.allocate(16).expect("16 bytes");
//! // SAFETY: `block` came from `heap.allocate` and is released exactly once.
//! unsafe { heap.release(block) };
//! ```

use std::ptr::NonNull;

/// The three operations the engine needs from an allocator
///
/// Implementations must be usable through a shared reference; strategies
/// that keep statistics should use interior mutability.
pub trait AllocationStrategy {
    /// Allocate `size` bytes, returning `None` on failure
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// Resize the block at `ptr` to `new_size` bytes
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` or `reallocate` of this
    /// same strategy and must not have been released. On success the old
    /// pointer must no longer be used.
    unsafe fn reallocate(&self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>>;

    /// Release the block at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` or `reallocate` of this
    /// same strategy and must not have been released already.
    unsafe fn release(&self, ptr: NonNull<u8>);
}

impl<A: AllocationStrategy + ?Sized> AllocationStrategy for &A {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        (**self).allocate(size)
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
        // SAFETY: forwarded contract.
        unsafe { (**self).reallocate(ptr, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        // SAFETY: forwarded contract.
        unsafe { (**self).release(ptr) }
    }
}

/// Default strategy backed by the process heap (`malloc`/`realloc`/`free`)
///
/// Buffers produced with this strategy can be handed to C code and released
/// there with `free()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemHeap;

impl AllocationStrategy for SystemHeap {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        // malloc(0) may legally return NULL; always ask for at least a byte.
        // SAFETY: malloc has no preconditions.
        NonNull::new(unsafe { libc::malloc(size.max(1)) }.cast::<u8>())
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
        // SAFETY: caller guarantees `ptr` is a live block from this heap.
        NonNull::new(unsafe { libc::realloc(ptr.as_ptr().cast(), new_size.max(1)) }.cast::<u8>())
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        // SAFETY: caller guarantees `ptr` is a live block from this heap.
        unsafe { libc::free(ptr.as_ptr().cast()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_heap_roundtrip() {
        let heap = SystemHeap;
        let block = heap.allocate(4).expect("allocation");

        // SAFETY: block is 4 bytes, live, and released once below.
        unsafe {
            std::ptr::copy_nonoverlapping(b"abcd".as_ptr(), block.as_ptr(), 4);
            let grown = heap.reallocate(block, 64).expect("reallocation");
            let prefix = std::slice::from_raw_parts(grown.as_ptr(), 4);
            assert_eq!(prefix, b"abcd");
            heap.release(grown);
        }
    }

    #[test]
    fn test_zero_sized_request_succeeds() {
        let heap = SystemHeap;
        let block = heap.allocate(0).expect("zero-size allocation");
        // SAFETY: live block from this heap.
        unsafe { heap.release(block) };
    }

    #[test]
    fn test_reference_is_a_strategy() {
        fn takes_strategy<A: AllocationStrategy>(a: A) -> Option<NonNull<u8>> {
            a.allocate(8)
        }

        let heap = SystemHeap;
        let block = takes_strategy(&heap).expect("allocation");
        // SAFETY: live block from this heap.
        unsafe { heap.release(block) };
    }
}
