//! Error type for the allocator's non-hot-path operations.
//!
//! The hot path (`allocate`/`free`/`resize`/`zero_allocate`) follows the
//! C `malloc` family's null-is-failure convention: allocator operations
//! never fail except via a null/none return. This type exists only for
//! [`init`](crate::ExplicitFreeListAllocator::init),
//! whose `ok | failure` contract needs a reason, and for what the
//! consistency checker reports.

use std::fmt;

/// Failure reasons surfaced outside the null/none convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// The heap provider (`sbrk`) refused to extend the heap.
  OutOfMemory,
  /// A consistency check found the heap in an invalid state. The payload
  /// names the violated invariant, not the reason it matters.
  Corruption(&'static str),
}

impl fmt::Display for AllocError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AllocError::OutOfMemory => write!(f, "heap provider refused to extend the heap"),
      AllocError::Corruption(what) => write!(f, "heap corruption detected: {what}"),
    }
  }
}

impl std::error::Error for AllocError {}
