//! The heap provider: the one external collaborator this crate consumes.
//!
//! `sbrk` enlarges the process's data segment contiguously and hands back
//! the previous break. This module is the only place that touches
//! `libc::sbrk` directly; everything above it works in terms of block
//! pointers.

use libc::{c_void, intptr_t, sbrk};

/// Requests `n_bytes` more heap from the OS and returns the address of
/// the first newly-available byte, or `None` if the provider refused.
///
/// Successive successful calls return successive adjacent ranges — the
/// allocator above relies on this to treat the heap as one contiguous,
/// monotonically-growing region.
pub fn extend(n_bytes: usize) -> Option<*mut u8> {
  let raw = unsafe { sbrk(n_bytes as intptr_t) };
  if raw == usize::MAX as *mut c_void {
    None
  } else {
    Some(raw as *mut u8)
  }
}

/// Current program break, for diagnostics only.
pub fn current_break() -> *mut u8 {
  (unsafe { sbrk(0) }) as *mut u8
}
