//! Block-group descriptor table decoding. The table starts at block
//! `first_data_block + 1` and holds one 32-byte record per block group
//! (spec.md §4.3 / §6).

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::fs::superblock::Superblock;
use crate::io::BackingStore;

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct RawGroupDescriptor {
    block_bitmap: u32,
    inode_bitmap: u32,
    inode_table: u32,
    free_blocks_count: u16,
    free_inodes_count: u16,
    used_dirs_count: u16,
    pad: u16,
    reserved: [u32; 3],
}

#[derive(Clone, Copy, Debug)]
pub struct GroupDescriptor {
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    pub inode_table: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
    pub used_dirs_count: u16,
}

/// Loads and range-checks the whole block-group descriptor table.
pub fn load_group_descriptors(
    backing: &BackingStore,
    sb: &Superblock,
) -> Result<Vec<GroupDescriptor>> {
    let table_block = sb.first_data_block as u64 + 1;
    let group_count = sb.group_count();
    let rec_size = std::mem::size_of::<RawGroupDescriptor>();
    let table_bytes = backing.read_at_vec(
        table_block * sb.block_size as u64,
        group_count as usize * rec_size,
    )?;

    let mut groups = Vec::with_capacity(group_count as usize);
    for i in 0..group_count {
        let start = i as usize * rec_size;
        let raw: RawGroupDescriptor =
            *bytemuck::from_bytes(&table_bytes[start..start + rec_size]);

        let group_start = sb.first_data_block as u64 + i as u64 * sb.blocks_per_group as u64;
        let group_end = group_start + sb.blocks_per_group as u64;
        let in_range = |b: u32| (b as u64) >= group_start && (b as u64) < group_end;

        if !in_range(raw.block_bitmap) {
            return Err(Error::CorruptGroupDescriptor {
                group: i,
                reason: "block_bitmap out of group range",
            });
        }
        if !in_range(raw.inode_bitmap) {
            return Err(Error::CorruptGroupDescriptor {
                group: i,
                reason: "inode_bitmap out of group range",
            });
        }
        if !in_range(raw.inode_table) {
            return Err(Error::CorruptGroupDescriptor {
                group: i,
                reason: "inode_table out of group range",
            });
        }

        groups.push(GroupDescriptor {
            block_bitmap: raw.block_bitmap,
            inode_bitmap: raw.inode_bitmap,
            inode_table: raw.inode_table,
            free_blocks_count: raw.free_blocks_count,
            free_inodes_count: raw.free_inodes_count,
            used_dirs_count: raw.used_dirs_count,
        });
    }

    Ok(groups)
}
