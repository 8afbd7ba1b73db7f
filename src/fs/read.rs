//! Byte-range reads over a file's block list.
//!
//! A read is clamped to `[offset, inode.size)`, then split into a possibly
//! partial head block, a run of whole middle blocks, and a possibly partial
//! tail block.

use crate::error::Result;
use crate::fs::inode::{block_list, Inode};
use crate::io::BackingStore;

pub fn read_range(backing: &BackingStore, inode: &Inode, offset: u64, size: u64) -> Result<Vec<u8>> {
    if size == 0 || offset >= inode.size {
        return Ok(Vec::new());
    }

    let end = (offset + size).min(inode.size);
    let block_size = backing.block_size();

    let start_block_idx = offset / block_size;
    let end_block_idx = (end - 1) / block_size;

    let blocks = block_list(backing, inode)?;
    let mut out = Vec::with_capacity((end - offset) as usize);

    for block_idx in start_block_idx..=end_block_idx {
        let block_num = blocks
            .get(block_idx as usize)
            .copied()
            .unwrap_or(crate::fs::types::BlockNumber::NULL);

        let data = if block_num.is_null() {
            vec![0u8; block_size as usize]
        } else {
            backing.read_block(block_num.0 as u64)?
        };

        let block_start_offset = block_idx * block_size;
        let slice_start = if block_idx == start_block_idx {
            (offset - block_start_offset) as usize
        } else {
            0
        };
        let slice_end = if block_idx == end_block_idx {
            (end - block_start_offset) as usize
        } else {
            block_size as usize
        };

        out.extend_from_slice(&data[slice_start..slice_end]);
    }

    Ok(out)
}
