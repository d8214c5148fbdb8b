use std::{alloc::Layout, io::Read, ptr};

use freelist_alloc::{heap, ExplicitFreeListAllocator};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, `gdb`, or just visually track how allocations change the
/// program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break via the heap provider.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break = {:?}",
    label,
    std::process::id(),
    heap::current_break(),
  );
}

fn main() {
  env_logger::init();

  // Our allocator holds just two pointers: the prologue's payload
  // address (heap_start) and the free list's head. Everything else —
  // block sizes, allocation state, free-list links — lives inside the
  // heap itself as boundary tags.
  let mut allocator = ExplicitFreeListAllocator::new();

  unsafe {
    allocator.init().expect("heap provider refused to start the heap");

    print_program_break("start");
    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 1) Allocate space for a u32.
    // ------------------------------------------------------------------
    let layout_u32 = Layout::new::<u32>();
    let first_block = allocator.allocate(layout_u32.size());
    println!("\n[1] Allocate u32 -> {:?}", first_block);

    let first_ptr = first_block as *mut u32;
    first_ptr.write(0xDEADBEEF);
    println!("[1] Value written to first_block = 0x{:X}", first_ptr.read());

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 2) Allocate 12 bytes (u8[12]).
    // ------------------------------------------------------------------
    let second_block = allocator.allocate(12);
    println!("\n[2] Allocate [u8; 12] -> {:?}", second_block);
    ptr::write_bytes(second_block, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 3) Allocate a u64, to observe alignment.
    // ------------------------------------------------------------------
    let layout_u64 = Layout::new::<u64>();
    let third_block = allocator.allocate(layout_u64.size());
    println!("\n[3] Allocate u64 -> {:?}", third_block);

    let third_ptr = third_block as *mut u64;
    third_ptr.write(0x1122334455667788);
    println!(
      "[3] Address = {:p}, addr % 8 = {}",
      third_block,
      (third_block as usize) % 8
    );

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 4) Free the first block, then allocate a small block: the explicit
    //    free list means this one can come back from first-fit instead
    //    of the heap growing again.
    // ------------------------------------------------------------------
    allocator.free(first_block);
    println!("\n[4] Freed first_block at {:?}", first_block);

    let fifth_block = allocator.allocate(2);
    println!(
      "[4] allocate(2) -> {:?} (reused first_block? {})",
      fifth_block,
      fifth_block == first_block
    );

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 5) Resize the second block upward and verify its contents moved.
    // ------------------------------------------------------------------
    let grown = allocator.resize(second_block, 256);
    println!("\n[5] Resize [u8; 12] -> 256 bytes: {:?}", grown);
    for i in 0..12 {
      assert_eq!(*grown.add(i), 0xAB);
    }
    println!("[5] Original 12 bytes preserved across resize");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 6) Allocate a large block to observe heap growth.
    // ------------------------------------------------------------------
    print_program_break("before large alloc");
    let big_block = allocator.allocate(64 * 1024);
    println!("\n[6] Allocate large 64 KiB block -> {:?}", big_block);
    print_program_break("after large alloc");

    block_until_enter_pressed();

    // ------------------------------------------------------------------
    // 7) Run the consistency checker before exiting.
    // ------------------------------------------------------------------
    allocator.check(true);
    println!("\n[7] End of demo. The heap is never shrunk back to the OS.");
  }
}
