//! The allocator facade: `init`, `allocate`, `free`, `resize`, `zero_allocate`
//! and the debug-only consistency checker, wired on top of [`crate::block`],
//! [`crate::freelist`] and [`crate::heap`].
//!
//! ```text
//!   ExplicitFreeListAllocator
//!   ┌─────────────────────────┐
//!   │ heap_start  ──────────┐ │   prologue payload address, null pre-init
//!   │ free_list_head ─────┐ │ │
//!   └──────────────────────┼─┼─┘
//!                          ▼ ▼
//!    pad  ┌─────────┬──────┬──────┐                    ┌──────────┐
//!    word │ prologue│ free │alloc │ ... regular blocks ... │ epilogue │
//!         │ (min sz)│      │      │                    └──────────┘
//!         └─────────┴──────┴──────┘
//! ```
//!
//! `heap_start` and `free_list_head` are the two process-wide pointers the
//! design calls for; they live on one struct instance instead of in
//! `static mut`s so the allocator has no hidden global state, but the
//! crate makes no attempt at thread safety: every public method takes
//! `&mut self` and the type is not `Sync`.

use std::ptr;

use log::{trace, warn};

use crate::block::{
  self, CHUNK_SIZE, DSIZE, MIN_BLOCK_SIZE, WSIZE,
};
use crate::error::AllocError;
use crate::freelist;
use crate::heap;

/// A single-heap, boundary-tag, explicit free-list allocator.
///
/// # Concurrency
///
/// Not thread-safe: every method mutates process-wide heap state through
/// `&mut self`, and the type carries raw pointers so it is neither `Send`
/// nor `Sync`. Callers must serialize all access, including across signal
/// handlers.
///
/// # Safety
///
/// [`init`](Self::init) must run and succeed before any other method is
/// called; calling `allocate`/`free`/`resize`/`zero_allocate` before that
/// (or after a failed `init`) is undefined behavior, matching the
/// original `mm_malloc`'s lack of a null check on `heap_listp`.
pub struct ExplicitFreeListAllocator {
  /// The prologue block's payload address, or null before `init`.
  heap_start: *mut u8,
  /// Head of the explicit free list. Equals `heap_start` when the list
  /// is empty, since the prologue's own header is permanently allocated
  /// and so terminates [`freelist::first_fit`] immediately.
  free_list_head: *mut u8,
}

impl Default for ExplicitFreeListAllocator {
  fn default() -> Self {
    Self::new()
  }
}

impl ExplicitFreeListAllocator {
  /// Creates an allocator with no heap yet. Call [`init`](Self::init)
  /// before using it.
  pub fn new() -> Self {
    Self {
      heap_start: ptr::null_mut(),
      free_list_head: ptr::null_mut(),
    }
  }

  /// Returns `true` once [`init`](Self::init) has run successfully.
  pub fn is_initialized(&self) -> bool {
    !self.heap_start.is_null()
  }

  /// Creates the initial empty heap: alignment padding, prologue,
  /// epilogue, then one chunk-sized free block.
  ///
  /// # Safety
  /// Must be called at most meaningfully once per process, since the
  /// underlying heap provider (`sbrk`) is process-global; calling it
  /// again after a prior successful call starts a second, unrelated
  /// heap region layered on top of the first one's high-water mark.
  pub unsafe fn init(&mut self) -> Result<(), AllocError> {
    let base = heap::extend(2 * MIN_BLOCK_SIZE).ok_or(AllocError::OutOfMemory)?;

    unsafe {
      block::put(base, 0); // alignment padding

      let prologue_bp = base.add(DSIZE);
      block::put(block::header_of(prologue_bp), block::pack(MIN_BLOCK_SIZE, true));
      block::put_link(block::pred_of(prologue_bp), freelist::none());
      block::put_link(block::succ_of(prologue_bp), freelist::none());
      block::put(block::footer_of(prologue_bp), block::pack(MIN_BLOCK_SIZE, true));

      let epilogue_bp = block::next_blkp(prologue_bp);
      block::put(block::header_of(epilogue_bp), block::pack(0, true));

      self.heap_start = prologue_bp;
      self.free_list_head = prologue_bp;
    }

    unsafe { self.extend_heap(CHUNK_SIZE / WSIZE) }.ok_or(AllocError::OutOfMemory)?;
    Ok(())
  }

  /// Allocates a block with at least `size` bytes of usable payload.
  /// Returns null on a zero-size request or heap exhaustion.
  ///
  /// # Safety
  /// The allocator must already be initialized via [`init`](Self::init).
  pub unsafe fn allocate(&mut self, size: usize) -> *mut u8 {
    if size == 0 {
      return ptr::null_mut();
    }

    let asize = block::adjusted_block_size(size);

    unsafe {
      if let Some(bp) = freelist::first_fit(self.free_list_head, asize) {
        self.place(bp, asize);
        return bp;
      }

      let extend_words = asize.max(CHUNK_SIZE) / WSIZE;
      match self.extend_heap(extend_words) {
        Some(bp) => {
          self.place(bp, asize);
          bp
        }
        None => ptr::null_mut(),
      }
    }
  }

  /// Frees a previously-allocated block. A null `ptr` is a no-op.
  /// Double-free is undefined behavior.
  ///
  /// # Safety
  /// `ptr` must be null or a payload address previously returned by
  /// `allocate`/`resize`/`zero_allocate` on this allocator, not yet freed.
  pub unsafe fn free(&mut self, ptr: *mut u8) {
    if ptr.is_null() {
      return;
    }

    unsafe {
      let size = block::size_of_word(block::get(block::header_of(ptr)));
      block::put(block::header_of(ptr), block::pack(size, false));
      block::put(block::footer_of(ptr), block::pack(size, false));
      self.coalesce(ptr);
    }
  }

  /// Resizes a block, preserving contents up to the smaller of the two
  /// sizes. `ptr = null` behaves as `allocate`; `size = 0` behaves as
  /// `free` and returns null.
  ///
  /// # Safety
  /// `ptr` must be null or a live payload address from this allocator.
  pub unsafe fn resize(&mut self, ptr: *mut u8, size: usize) -> *mut u8 {
    unsafe {
      if ptr.is_null() {
        return self.allocate(size);
      }
      if size == 0 {
        self.free(ptr);
        return ptr::null_mut();
      }

      let asize = block::adjusted_block_size(size);
      let csize = block::size_of_word(block::get(block::header_of(ptr)));

      if asize == csize {
        return ptr;
      }

      if asize < csize {
        // Shrink too small to be worth splitting: leave the block as-is.
        if csize - asize <= MIN_BLOCK_SIZE {
          return ptr;
        }

        block::put(block::header_of(ptr), block::pack(asize, true));
        block::put(block::footer_of(ptr), block::pack(asize, true));

        let remainder = block::next_blkp(ptr);
        // Size only; `free` below rewrites the allocated bit and footer
        // once it re-reads this header, and its coalesce reads past
        // `remainder` into the (possibly epilogue) block after it.
        block::put(block::header_of(remainder), block::pack(csize - asize, true));
        self.free(remainder);
        return ptr;
      }

      let new_ptr = self.allocate(size);
      if new_ptr.is_null() {
        return ptr::null_mut();
      }
      let copy_len = size.min(csize - 2 * WSIZE);
      ptr::copy_nonoverlapping(ptr, new_ptr, copy_len);
      self.free(ptr);
      new_ptr
    }
  }

  /// Allocates `count * elem_size` bytes and zero-fills them. Runs
  /// [`init`](Self::init) first if the allocator hasn't been initialized
  /// yet. Returns null on multiplicative overflow or allocation failure,
  /// without touching the payload in either case.
  ///
  /// # Safety
  /// Same preconditions as `allocate`, except that an uninitialized
  /// allocator is handled rather than being undefined behavior.
  pub unsafe fn zero_allocate(&mut self, count: usize, elem_size: usize) -> *mut u8 {
    unsafe {
      if !self.is_initialized() && self.init().is_err() {
        return ptr::null_mut();
      }

      let total = match count.checked_mul(elem_size) {
        Some(total) => total,
        None => return ptr::null_mut(),
      };

      let p = self.allocate(total);
      if !p.is_null() {
        ptr::write_bytes(p, 0, total);
      }
      p
    }
  }

  /// Walks the heap from the prologue to the epilogue, logging any
  /// invariant violation it finds (bad prologue/epilogue, misalignment,
  /// header/footer mismatch). Never mutates state. With `verbose`, also
  /// logs one line per block visited.
  pub fn check(&self, verbose: bool) {
    if self.heap_start.is_null() {
      return;
    }

    unsafe {
      let prologue = self.heap_start;
      let prologue_header = block::get(block::header_of(prologue));
      if block::size_of_word(prologue_header) != MIN_BLOCK_SIZE || !block::alloc_of_word(prologue_header) {
        warn!("{} at {:p}", AllocError::Corruption("bad prologue header"), prologue);
      }
      self.check_block(prologue);

      let mut bp = prologue;
      loop {
        let header = block::get(block::header_of(bp));
        if block::size_of_word(header) == 0 {
          break;
        }
        if verbose {
          self.print_block(bp);
        }
        self.check_block(bp);
        bp = block::next_blkp(bp);
      }

      if verbose {
        self.print_block(bp);
      }
      let epilogue_header = block::get(block::header_of(bp));
      if block::size_of_word(epilogue_header) != 0 || !block::alloc_of_word(epilogue_header) {
        warn!("{} at {:p}", AllocError::Corruption("bad epilogue header"), bp);
      }
    }
  }

  /// Extends the heap by at least `n_words` words (clamped to
  /// [`MIN_BLOCK_SIZE`], rounded to an even word count), frames the new
  /// region as one free block, and runs it through the coalescer.
  ///
  /// # Safety
  /// The heap must already be initialized.
  unsafe fn extend_heap(&mut self, n_words: usize) -> Option<*mut u8> {
    let size = if n_words % 2 != 0 {
      (n_words + 1) * WSIZE
    } else {
      n_words * WSIZE
    };
    let size = size.max(MIN_BLOCK_SIZE);

    let bp = heap::extend(size)?;

    unsafe {
      block::put(block::header_of(bp), block::pack(size, false));
      block::put(block::footer_of(bp), block::pack(size, false));

      let epilogue_bp = block::next_blkp(bp);
      block::put(block::header_of(epilogue_bp), block::pack(0, true));

      Some(self.coalesce(bp))
    }
  }

  /// Transitions a free block `bp` of size `csize` into an allocated
  /// block delivering `asize` bytes, splitting off and coalescing a
  /// remainder when the split would leave at least [`MIN_BLOCK_SIZE`].
  ///
  /// # Safety
  /// `bp` must currently be a free-list member of size at least `asize`.
  unsafe fn place(&mut self, bp: *mut u8, asize: usize) {
    unsafe {
      let csize = block::size_of_word(block::get(block::header_of(bp)));

      if csize - asize >= MIN_BLOCK_SIZE {
        block::put(block::header_of(bp), block::pack(asize, true));
        block::put(block::footer_of(bp), block::pack(asize, true));
        freelist::remove(&mut self.free_list_head, bp);

        let remainder = block::next_blkp(bp);
        block::put(block::header_of(remainder), block::pack(csize - asize, false));
        block::put(block::footer_of(remainder), block::pack(csize - asize, false));
        self.coalesce(remainder);
      } else {
        block::put(block::header_of(bp), block::pack(csize, true));
        block::put(block::footer_of(bp), block::pack(csize, true));
        freelist::remove(&mut self.free_list_head, bp);
      }
    }
  }

  /// Boundary-tag coalescing (spec cases 1-4): merges `bp` with whichever
  /// physical neighbors are free, then inserts the (possibly merged)
  /// block at the free list's head. Returns the resulting block pointer.
  ///
  /// # Safety
  /// `bp` must be a freshly-freed or freshly-extended block not currently
  /// on the free list.
  unsafe fn coalesce(&mut self, bp: *mut u8) -> *mut u8 {
    unsafe {
      let prev_bp = block::prev_blkp(bp);
      let next_bp = block::next_blkp(bp);

      let prev_alloc = block::alloc_of_word(block::get(block::footer_of(prev_bp)));
      let next_alloc = block::alloc_of_word(block::get(block::header_of(next_bp)));
      let mut size = block::size_of_word(block::get(block::header_of(bp)));

      let bp = if prev_alloc && next_alloc {
        bp
      } else if prev_alloc && !next_alloc {
        size += block::size_of_word(block::get(block::header_of(next_bp)));
        freelist::remove(&mut self.free_list_head, next_bp);
        block::put(block::header_of(bp), block::pack(size, false));
        block::put(block::footer_of(bp), block::pack(size, false));
        bp
      } else if !prev_alloc && next_alloc {
        size += block::size_of_word(block::get(block::header_of(prev_bp)));
        freelist::remove(&mut self.free_list_head, prev_bp);
        block::put(block::header_of(prev_bp), block::pack(size, false));
        block::put(block::footer_of(prev_bp), block::pack(size, false));
        prev_bp
      } else {
        size += block::size_of_word(block::get(block::header_of(prev_bp)))
          + block::size_of_word(block::get(block::header_of(next_bp)));
        freelist::remove(&mut self.free_list_head, prev_bp);
        freelist::remove(&mut self.free_list_head, next_bp);
        block::put(block::header_of(prev_bp), block::pack(size, false));
        block::put(block::footer_of(prev_bp), block::pack(size, false));
        prev_bp
      };

      freelist::insert(&mut self.free_list_head, bp);
      bp
    }
  }

  /// Checks alignment and header/footer agreement for one block.
  unsafe fn check_block(&self, bp: *mut u8) {
    unsafe {
      if (bp as usize) % DSIZE != 0 {
        warn!("{} at {:p}", AllocError::Corruption("block is not double-word aligned"), bp);
      }
      if block::get(block::header_of(bp)) != block::get(block::footer_of(bp)) {
        warn!("{} at {:p}", AllocError::Corruption("header does not match footer"), bp);
      }
    }
  }

  /// Logs one line describing the block at `bp`, or that it's the
  /// end-of-list epilogue.
  unsafe fn print_block(&self, bp: *mut u8) {
    unsafe {
      let header = block::get(block::header_of(bp));
      let size = block::size_of_word(header);
      if size == 0 {
        trace!("{:p}: EOL", bp);
        return;
      }
      trace!(
        "{:p}: size {} [{}]",
        bp,
        size,
        if block::alloc_of_word(header) { "alloc" } else { "free" }
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn is_aligned(ptr: *mut u8) -> bool {
    (ptr as usize) % DSIZE == 0
  }

  #[test]
  fn init_then_allocate_returns_aligned_distinct_pointers() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().expect("heap provider should accept the initial chunk");

      let p1 = a.allocate(1);
      let p2 = a.allocate(1);
      assert!(!p1.is_null() && !p2.is_null());
      assert!(is_aligned(p1));
      assert!(is_aligned(p2));
      assert_ne!(p1, p2);

      a.check(false);
    }
  }

  #[test]
  fn free_then_allocate_reuses_the_block_lifo() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();

      let p1 = a.allocate(1);
      let _p2 = a.allocate(1);
      a.free(p1);
      let p3 = a.allocate(1);

      assert_eq!(p1, p3, "first-fit should reuse the freshly coalesced block");
      a.check(false);
    }
  }

  #[test]
  fn freeing_adjacent_blocks_coalesces_them() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();

      let pa = a.allocate(100);
      let pb = a.allocate(100);
      let _pc = a.allocate(100);

      a.free(pb);
      a.free(pa);

      // If coalescing didn't run, a subsequent large-enough allocation
      // would not fit in the merged region.
      let merged = a.allocate(100 + 100);
      assert_eq!(merged, pa);
      a.check(false);
    }
  }

  #[test]
  fn zero_size_allocate_returns_null() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      assert!(a.allocate(0).is_null());
    }
  }

  #[test]
  fn free_of_null_is_a_noop() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      a.free(ptr::null_mut());
      a.check(false);
    }
  }

  #[test]
  fn resize_identity_returns_same_pointer() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      let p = a.allocate(16);
      let q = a.resize(p, 16);
      assert_eq!(p, q);
    }
  }

  #[test]
  fn resize_to_zero_frees_and_returns_null() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      let p = a.allocate(16);
      assert!(a.resize(p, 0).is_null());
      // the freed block should be reusable
      let q = a.allocate(16);
      assert_eq!(p, q);
    }
  }

  #[test]
  fn resize_null_behaves_as_allocate() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      let p = a.resize(ptr::null_mut(), 32);
      assert!(!p.is_null());
    }
  }

  #[test]
  fn resize_grow_preserves_content() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      let p = a.allocate(64);
      ptr::write_bytes(p, 0xAB, 64);

      let q = a.resize(p, 256);
      assert!(!q.is_null());
      for i in 0..64 {
        assert_eq!(*q.add(i), 0xAB);
      }
      a.check(false);
    }
  }

  #[test]
  fn zero_allocate_zero_fills_and_inits_lazily() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      assert!(!a.is_initialized());
      let p = a.zero_allocate(64, 8);
      assert!(a.is_initialized());
      assert!(!p.is_null());
      for i in 0..512 {
        assert_eq!(*p.add(i), 0);
      }
    }
  }

  #[test]
  fn zero_allocate_overflow_returns_null_without_allocating() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();
      let p = a.zero_allocate(usize::MAX, 2);
      assert!(p.is_null());
    }
  }

  #[test]
  fn repeated_allocation_eventually_extends_the_heap_without_corrupting_existing_blocks() {
    let mut a = ExplicitFreeListAllocator::new();
    unsafe {
      a.init().unwrap();

      let mut pointers = Vec::new();
      for _ in 0..16 {
        let p = a.allocate(4096);
        assert!(!p.is_null());
        pointers.push(p);
      }

      for (i, &p) in pointers.iter().enumerate() {
        assert!(is_aligned(p), "pointer {i} not aligned");
      }
      let unique: std::collections::HashSet<_> = pointers.iter().collect();
      assert_eq!(unique.len(), pointers.len(), "allocations must be distinct");

      a.check(false);
    }
  }
}
