//! # freelist-alloc - An Explicit Free-List Memory Allocator
//!
//! This crate provides a **boundary-tag, explicit free-list allocator**
//! that manages a single contiguous heap grown via `sbrk`.
//!
//! ## Overview
//!
//! Unlike a bump allocator, this allocator reuses freed memory: every
//! block (allocated or free) carries a header and footer recording its
//! size and allocation state, and every free block additionally carries
//! predecessor/successor links so it can sit on an explicit doubly-linked
//! free list. Freed blocks are found again by a first-fit scan of that
//! list, and physically adjacent free blocks are coalesced into one on
//! every free and every heap extension.
//!
//! ```text
//!   Explicit Free List Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │  ┌──────┬────────┬──────┬────────┬──────┬────────┬───────────────┐  │
//!   │  │ PROLG│ alloc A│ free │ alloc B│ free │ alloc C│  ...  EPILOG   │  │
//!   │  └──────┴────────┴──┬───┴────────┴──┬───┴────────┴───────────────┘  │
//!   │                     │                │                              │
//!   │                     └────────────────┴──► threaded through an       │
//!   │                                           explicit free list        │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Free blocks are found by walking the free list, not the whole heap.
//!   Adjacent free blocks never persist: every free/extend re-coalesces.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   freelist_alloc
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── block      - Header/footer packing, block-relative addressing
//!   ├── freelist   - The explicit doubly-linked free list
//!   ├── heap       - The sbrk-backed heap provider
//!   ├── error      - AllocError
//!   └── allocator  - ExplicitFreeListAllocator (the public facade)
//! ```
//!
//! ## Block Format
//!
//! ```text
//!   Single block (allocated or free):
//!   ┌─────────┬──────────────────────────────────────┬─────────┐
//!   │ header  │               payload                │ footer  │
//!   │ (WSIZE) │ (free: pred | succ, 8 bytes each)     │ (WSIZE) │
//!   └─────────┴──────────────────────────────────────┴─────────┘
//!             ▲
//!             └── address returned to/received from the caller
//! ```
//!
//! ## Heap Layout
//!
//! ```text
//!   ┌──────┬───────────────────┬───────────────┬─── ··· ───┬──────────┐
//!   │ pad  │  prologue (alloc) │ regular blocks│           │ epilogue │
//!   │ word │  MINIMUM bytes    │ (alloc/free)  │           │ (header) │
//!   └──────┴───────────────────┴───────────────┴───────────┴──────────┘
//! ```
//!
//! The prologue is a permanently allocated sentinel block; the epilogue
//! is a single header word marking the current end of the heap. The
//! free list's head, when the list is empty, equals the prologue's own
//! payload address — the fit finder terminates on the first allocated
//! block it meets, and the prologue always is one, so an empty list
//! naturally yields "no fit" without a separate empty check.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use freelist_alloc::ExplicitFreeListAllocator;
//!
//! fn main() {
//!     let mut allocator = ExplicitFreeListAllocator::new();
//!
//!     unsafe {
//!         allocator.init().expect("heap provider refused to start the heap");
//!
//!         let p = allocator.allocate(100);
//!         assert!(!p.is_null());
//!
//!         allocator.free(p);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **Block reuse**: freed blocks are found again via first-fit.
//! - **O(1) coalescing**: boundary tags let the coalescer inspect both
//!   physical neighbors directly, without walking the heap.
//! - **Direct OS interaction**: uses `sbrk` via `libc`, same as the
//!   bump-allocator ancestor of this crate.
//! - **Consistency checker**: a debug-only heap walk that verifies the
//!   boundary-tag invariants without mutating state.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; see
//!   [`ExplicitFreeListAllocator`] for the full concurrency contract.
//! - **No shrink-to-OS**: freed memory stays in the free list; the heap
//!   only ever grows (`sbrk` is never called with a negative delta).
//! - **First-fit only**: no best-fit, no segregated size classes.
//! - **Unix-only**: requires `libc` and `sbrk` (POSIX systems).
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory
//! management. All allocation, deallocation, and resize operations
//! require `unsafe` blocks and assume the allocator has already been
//! initialized via [`ExplicitFreeListAllocator::init`].

pub mod align;
mod allocator;
mod block;
mod error;
mod freelist;
pub mod heap;

pub use allocator::ExplicitFreeListAllocator;
pub use error::AllocError;
