//! Plugging a custom allocation strategy into the rewriter
//!
//! `TrackingHeap` forwards to the process heap and records every call, the
//! way a host runtime would account for memory it hands to native code.

use std::cell::Cell;
use std::ptr::NonNull;

use html_namespacing::{AllocationStrategy, SystemHeap, add_namespace_to_html_with_strategy};

#[derive(Default)]
struct TrackingHeap {
    allocations: Cell<usize>,
    reallocations: Cell<usize>,
    releases: Cell<usize>,
}

impl AllocationStrategy for TrackingHeap {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        self.allocations.set(self.allocations.get() + 1);
        println!("  allocate({size})");
        SystemHeap.allocate(size)
    }

    unsafe fn reallocate(&self, ptr: NonNull<u8>, new_size: usize) -> Option<NonNull<u8>> {
        self.reallocations.set(self.reallocations.get() + 1);
        println!("  reallocate(.., {new_size})");
        // SAFETY: forwarded contract; blocks only ever come from SystemHeap.
        unsafe { SystemHeap.reallocate(ptr, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>) {
        self.releases.set(self.releases.get() + 1);
        println!("  release(..)");
        // SAFETY: forwarded contract.
        unsafe { SystemHeap.release(ptr) }
    }
}

fn main() {
    println!("=== HTML Namespacing - Custom Allocator ===\n");

    let heap = TrackingHeap::default();
    let html: String = (0..8).map(|i| format!("<li>item {i}</li>")).collect();

    println!("Namespacing {} bytes:", html.len());
    match add_namespace_to_html_with_strategy(html.as_bytes(), "menu-items", &heap) {
        Ok(out) => {
            println!("Output ({} bytes): {}", out.len(), String::from_utf8_lossy(&out));
            drop(out);
        }
        Err(e) => println!("Error: {e}"),
    }

    println!("\nBadly formed input:");
    if let Err(e) = add_namespace_to_html_with_strategy(b"<ul><li>open", "menu-items", &heap) {
        println!("Error: {e}");
    }

    println!(
        "\nallocations={} reallocations={} releases={}",
        heap.allocations.get(),
        heap.reallocations.get(),
        heap.releases.get()
    );
}
