//! Heap Allocator - Global Allocator over a fixed carve-out
//!
//! Provides `#[global_allocator]` support using `linked_list_allocator`
//! over a fixed memory region handed to [`init_heap_with_region`] by the
//! entry routine. There is no growth path: the carve-out between the
//! firmware configuration area and the payload staging region is all the
//! heap this stage gets.
//!
//! # Usage
//!
//! ```ignore
//! // In the boot binary:
//! #[global_allocator]
//! static ALLOCATOR: cinder_hwinit::heap::HeapAllocator =
//!     cinder_hwinit::heap::HeapAllocator::new();
//!
//! // From the entry routine, once:
//! unsafe {
//!     cinder_hwinit::heap::init_heap_with_region(HEAP_START, HEAP_SIZE);
//! }
//! ```

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

/// Global heap state
static HEAP: Mutex<Option<linked_list_allocator::Heap>> = Mutex::new(None);

/// Fast-path initialized flag, so alloc failures before init are cheap
static HEAP_READY: AtomicBool = AtomicBool::new(false);

/// Global heap allocator.
///
/// This is the type you use with `#[global_allocator]`.
pub struct HeapAllocator;

impl HeapAllocator {
    /// Create new (uninitialized) heap allocator.
    pub const fn new() -> Self {
        Self
    }
}

unsafe impl GlobalAlloc for HeapAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !HEAP_READY.load(Ordering::Acquire) {
            return ptr::null_mut();
        }

        let mut guard = HEAP.lock();
        match guard.as_mut() {
            Some(heap) => heap
                .allocate_first_fit(layout)
                .map(|p| p.as_ptr())
                .unwrap_or(ptr::null_mut()),
            None => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if ptr.is_null() || !HEAP_READY.load(Ordering::Acquire) {
            return;
        }

        let mut guard = HEAP.lock();
        if let Some(heap) = guard.as_mut() {
            if let Some(nn) = NonNull::new(ptr) {
                heap.deallocate(nn, layout);
            }
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // Simple implementation: alloc new, copy, dealloc old
        let new_layout = match Layout::from_size_align(new_size, layout.align()) {
            Ok(l) => l,
            Err(_) => return ptr::null_mut(),
        };

        let new_ptr = self.alloc(new_layout);
        if !new_ptr.is_null() && !ptr.is_null() {
            let copy_size = layout.size().min(new_size);
            ptr::copy_nonoverlapping(ptr, new_ptr, copy_size);
            self.dealloc(ptr, layout);
        }
        new_ptr
    }
}

/// Initialize the heap over the fixed region at `base`.
///
/// # Safety
/// - The region `[base, base + size)` must be ordinary RAM owned by
///   this stage and used for nothing else
/// - Must be called exactly once
pub unsafe fn init_heap_with_region(base: u32, size: usize) -> Result<(), &'static str> {
    if HEAP_READY.load(Ordering::Acquire) {
        return Err("heap already initialized");
    }

    if size < 4096 {
        return Err("heap region too small");
    }

    let mut heap = linked_list_allocator::Heap::empty();
    heap.init(base as usize as *mut u8, size);

    *HEAP.lock() = Some(heap);
    HEAP_READY.store(true, Ordering::Release);

    Ok(())
}

/// Check if heap is initialized.
pub fn is_heap_initialized() -> bool {
    HEAP_READY.load(Ordering::Acquire)
}

/// Get heap statistics as (used, free) bytes.
pub fn heap_stats() -> Option<(usize, usize)> {
    let guard = HEAP.lock();
    guard.as_ref().map(|heap| (heap.used(), heap.free()))
}
