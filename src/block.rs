//! Block format: header/footer boundary tags and the pred/succ slots a
//! free block's payload carries.
//!
//! A block, whether allocated or free, looks like this in memory (`bp` is
//! the payload address, the value handed to/received from callers):
//!
//! ```text
//!   bp - WSIZE        bp                                bp + size - DSIZE
//!   ┌─────────┬───────────────────────────────────────┬─────────┐
//!   │ header  │                payload                │ footer  │
//!   │ (WSIZE) │   size - WSIZE - WSIZE bytes           │ (WSIZE) │
//!   └─────────┴───────────────────────────────────────┴─────────┘
//! ```
//!
//! When the block is free, the first two double-words of the payload are
//! reused to hold the free list's predecessor and successor links:
//!
//! ```text
//!   bp              bp + DSIZE
//!   ┌───────────────┬───────────────┬─────────────────────────┐
//!   │ pred (DSIZE)  │ succ (DSIZE)  │   unused (opaque once    │
//!   │               │               │   reallocated)          │
//!   └───────────────┴───────────────┴─────────────────────────┘
//! ```
//!
//! This module only knows about offsets and bit-packing; it holds no
//! state of its own and every function here is a pure address/word
//! computation (or, where memory must actually be touched, a thin
//! `unsafe` read/write at a computed offset).

use std::mem;

use crate::align_to;

/// Machine word size in bytes. Header and footer are one word each.
pub const WSIZE: usize = 4;

/// Double-word size in bytes. All block sizes are a multiple of this.
pub const DSIZE: usize = 8;

/// Initial/minimum heap extension size in bytes.
pub const CHUNK_SIZE: usize = 1 << 12;

/// Smallest possible block: header + pred + succ + footer.
pub const MIN_BLOCK_SIZE: usize = 24;

const ALLOC_BIT: u32 = 0x1;

/// Packs a `size` and `allocated` flag into a single header/footer word.
///
/// `size` must already be a multiple of [`DSIZE`]; the low three bits are
/// reserved for flags (only bit 0 is used today).
pub fn pack(size: usize, allocated: bool) -> u32 {
  debug_assert_eq!(size & 0x7, 0, "block size must be double-word aligned");
  size as u32 | if allocated { ALLOC_BIT } else { 0 }
}

/// Extracts the size field from a packed header/footer word.
pub fn size_of_word(word: u32) -> usize {
  (word & !0x7) as usize
}

/// Extracts the allocated flag from a packed header/footer word.
pub fn alloc_of_word(word: u32) -> bool {
  word & ALLOC_BIT != 0
}

/// Reads a word at an arbitrary byte address.
///
/// # Safety
/// `addr` must be valid for a 4-byte aligned read within the heap.
pub unsafe fn get(addr: *mut u8) -> u32 {
  unsafe { (addr as *mut u32).read() }
}

/// Writes a word at an arbitrary byte address.
///
/// # Safety
/// `addr` must be valid for a 4-byte aligned write within the heap.
pub unsafe fn put(addr: *mut u8, value: u32) {
  unsafe { (addr as *mut u32).write(value) }
}

/// Reads a pointer-sized free-list link at an arbitrary byte address.
///
/// # Safety
/// `addr` must be valid for a pointer-sized aligned read within the heap.
pub unsafe fn get_link(addr: *mut u8) -> *mut u8 {
  unsafe { (addr as *mut *mut u8).read() }
}

/// Writes a pointer-sized free-list link at an arbitrary byte address.
///
/// # Safety
/// `addr` must be valid for a pointer-sized aligned write within the heap.
pub unsafe fn put_link(addr: *mut u8, value: *mut u8) {
  unsafe { (addr as *mut *mut u8).write(value) }
}

/// Address of `bp`'s header word.
pub fn header_of(bp: *mut u8) -> *mut u8 {
  unsafe { bp.sub(WSIZE) }
}

/// Address of `bp`'s footer word. Requires the header to already carry
/// the block's current size.
///
/// # Safety
/// `bp`'s header must hold a valid, already-written size.
pub unsafe fn footer_of(bp: *mut u8) -> *mut u8 {
  let size = unsafe { size_of_word(get(header_of(bp))) };
  unsafe { bp.add(size).sub(DSIZE) }
}

/// Address of `bp`'s predecessor link slot (valid only while `bp` is free).
pub fn pred_of(bp: *mut u8) -> *mut u8 {
  bp
}

/// Address of `bp`'s successor link slot (valid only while `bp` is free).
pub fn succ_of(bp: *mut u8) -> *mut u8 {
  unsafe { bp.add(DSIZE) }
}

/// Address of the block physically following `bp`.
///
/// # Safety
/// `bp`'s header must hold a valid, already-written size.
pub unsafe fn next_blkp(bp: *mut u8) -> *mut u8 {
  let size = unsafe { size_of_word(get(header_of(bp))) };
  unsafe { bp.add(size) }
}

/// Address of the block physically preceding `bp`, read via the footer
/// that sits immediately before `bp`'s header.
///
/// # Safety
/// The word immediately preceding `bp`'s header must be a valid footer.
pub unsafe fn prev_blkp(bp: *mut u8) -> *mut u8 {
  let prev_footer = unsafe { bp.sub(DSIZE) };
  let prev_size = unsafe { size_of_word(get(prev_footer)) };
  unsafe { bp.sub(prev_size) }
}

/// Rounds an allocation request (payload bytes) up to a valid block size:
/// header + footer overhead, double-word aligned, never below [`MIN_BLOCK_SIZE`].
pub fn adjusted_block_size(payload_size: usize) -> usize {
  let raw = payload_size + 2 * WSIZE;
  align_to!(raw, DSIZE).max(MIN_BLOCK_SIZE)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pack_roundtrips_size_and_flag() {
    let w = pack(32, true);
    assert_eq!(size_of_word(w), 32);
    assert!(alloc_of_word(w));

    let w = pack(64, false);
    assert_eq!(size_of_word(w), 64);
    assert!(!alloc_of_word(w));
  }

  #[test]
  fn adjusted_block_size_never_below_minimum() {
    assert_eq!(adjusted_block_size(0), MIN_BLOCK_SIZE);
    assert_eq!(adjusted_block_size(1), MIN_BLOCK_SIZE);
  }

  #[test]
  fn adjusted_block_size_is_double_word_aligned() {
    for payload in 0..64 {
      let size = adjusted_block_size(payload);
      assert_eq!(size % DSIZE, 0);
      assert!(size >= payload + 2 * WSIZE);
    }
  }

  #[test]
  fn header_and_mem_words_agree() {
    // mem::size_of::<usize>() drives the pointer-sized free-list slots;
    // sanity check the assumption MIN_BLOCK_SIZE's doc comment relies on.
    assert!(mem::size_of::<usize>() <= DSIZE);
  }
}
