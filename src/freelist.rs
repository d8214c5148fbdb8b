//! The explicit doubly-linked free list, threaded through free blocks'
//! own payloads. No ordering guarantee among free blocks — every
//! insertion happens at the head (LIFO).
//!
//! `head` is always a valid block pointer to start a successor-walk
//! from: when the list is empty it equals the prologue's own payload
//! address, whose header is permanently marked allocated, so the fit
//! finder's "allocated means end of list" termination fires immediately.

use crate::block::{alloc_of_word, get, get_link, header_of, pred_of, put_link, succ_of};

/// Sentinel meaning "no node" for a pred/succ slot.
pub fn none() -> *mut u8 {
  std::ptr::null_mut()
}

pub fn is_none(bp: *mut u8) -> bool {
  bp.is_null()
}

/// Reads `bp`'s predecessor link. `bp` must currently be free (or be the
/// prologue, which carries a permanent zeroed pred/succ pair).
///
/// # Safety
/// `bp` must be a valid free-list node.
pub unsafe fn pred(bp: *mut u8) -> *mut u8 {
  unsafe { get_link(pred_of(bp)) }
}

/// Reads `bp`'s successor link.
///
/// # Safety
/// `bp` must be a valid free-list node.
pub unsafe fn succ(bp: *mut u8) -> *mut u8 {
  unsafe { get_link(succ_of(bp)) }
}

/// # Safety
/// `bp` must be a valid free-list node.
unsafe fn set_pred(bp: *mut u8, value: *mut u8) {
  unsafe { put_link(pred_of(bp), value) }
}

/// # Safety
/// `bp` must be a valid free-list node.
unsafe fn set_succ(bp: *mut u8, value: *mut u8) {
  unsafe { put_link(succ_of(bp), value) }
}

/// Inserts `bp` at the head of the free list.
///
/// # Safety
/// `bp` must be a free block not already on the list; `*head` must be a
/// valid node (the prologue when the list is empty).
pub unsafe fn insert(head: &mut *mut u8, bp: *mut u8) {
  unsafe {
    set_succ(bp, *head);
    set_pred(*head, bp);
    set_pred(bp, none());
    *head = bp;
  }
}

/// Removes `bp` from the free list.
///
/// # Safety
/// `bp` must currently be a member of the list rooted at `*head`.
pub unsafe fn remove(head: &mut *mut u8, bp: *mut u8) {
  unsafe {
    let p = pred(bp);
    let s = succ(bp);
    if !is_none(p) {
      set_succ(p, s);
    } else {
      *head = s;
    }
    set_pred(s, p);
  }
}

/// Walks the free list from `head`, returning the first block whose
/// recorded size is at least `size`. Stops at the first allocated block
/// encountered, which is guaranteed to be the prologue.
///
/// # Safety
/// `head` must be a valid block pointer to start walking from.
pub unsafe fn first_fit(head: *mut u8, size: usize) -> Option<*mut u8> {
  let mut bp = head;
  loop {
    let header = unsafe { get(header_of(bp)) };
    if alloc_of_word(header) {
      return None;
    }
    if crate::block::size_of_word(header) >= size {
      return Some(bp);
    }
    bp = unsafe { succ(bp) };
  }
}
