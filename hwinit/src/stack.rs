//! Execution stack pivot.

/// Move the stack pointer to `top`.
///
/// Called once by the entry routine before anything touches the heap;
/// the boot ROM leaves us on a tiny IRAM stack that cannot hold the
/// menu and chainload paths.
///
/// # Safety
/// - `top` must point at the end of a valid, otherwise-unused stack
///   region
/// - Nothing on the old stack may be referenced after the pivot
#[cfg(target_arch = "arm")]
#[inline(always)]
pub unsafe fn pivot_stack(top: u32) {
    core::arch::asm!("mov sp, {0}", in(reg) top, options(nomem, nostack));
}

#[cfg(not(target_arch = "arm"))]
#[inline(always)]
pub unsafe fn pivot_stack(_top: u32) {
    // Other architectures: implement as needed
    panic!("stack pivot is only implemented for arm");
}
