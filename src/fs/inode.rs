//! Inode decoding and the block-list builder.
//!
//! The block-list builder walks the 12 direct pointers followed by the
//! single/double/triple indirect pointers. A zero pointer terminates that
//! level of the tree (spec.md's inode invariants). The triple-indirect
//! level is built as triple -> indirect-of-double-indirect: each pointer in
//! the triple-indirect block is itself a double-indirect block, expanded
//! with the same routine used for `i2b`.

use bytemuck::{Pod, Zeroable};

use crate::error::Result;
use crate::fs::superblock::Superblock;
use crate::fs::types::{BlockGroupNumber, BlockNumber, InodeNumber};
use crate::io::BackingStore;

const DIRECT_POINTERS: usize = 12;
pub const SHORT_SYMLINK_MAX_LEN: u64 = 60;

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RawInode {
    pub mode: u16,
    pub uid: u16,
    pub size_lo: u32,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub dtime: u32,
    pub gid: u16,
    pub links_count: u16,
    pub blocks: u32,
    pub flags: u32,
    pub osd1: u32,
    pub block: [u32; 15],
    pub generation: u32,
    pub file_acl: u32,
    pub dir_acl: u32,
    pub faddr: u32,
    pub osd2: [u32; 3],
}

const S_IFMT: u16 = 0xF000;
pub const S_IFDIR: u16 = 0x4000;
pub const S_IFREG: u16 = 0x8000;
pub const S_IFLNK: u16 = 0xA000;

#[derive(Clone, Copy, Debug)]
pub struct Inode {
    pub number: InodeNumber,
    pub mode: u16,
    pub uid: u16,
    pub gid: u16,
    pub size: u64,
    pub links_count: u16,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub block: [u32; 15],
}

impl Inode {
    pub fn file_type_bits(&self) -> u16 {
        self.mode & S_IFMT
    }

    pub fn is_directory(&self) -> bool {
        self.file_type_bits() == S_IFDIR
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type_bits() == S_IFLNK
    }

    /// Fast symlinks store their target in the 15 block-pointer slots
    /// instead of in data blocks, whenever the target fits (<= 60 bytes).
    pub fn is_fast_symlink(&self) -> bool {
        self.is_symlink() && self.size <= SHORT_SYMLINK_MAX_LEN
    }

    /// Raw bytes of the 15 pointer slots, packed little-endian, used for
    /// fast symlinks.
    pub fn fast_symlink_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(60);
        for ptr in &self.block {
            out.extend_from_slice(&ptr.to_le_bytes());
        }
        out
    }
}

pub fn read_inode(
    backing: &BackingStore,
    sb: &Superblock,
    groups: &[crate::fs::group::GroupDescriptor],
    ino: InodeNumber,
) -> Result<Inode> {
    let (group, slot) = sb.locate_inode(ino);
    let group: BlockGroupNumber = group;
    let desc = groups
        .get(group.0 as usize)
        .ok_or(crate::error::Error::NoSuchInode(ino.0))?;

    let byte_index = slot as u64 * sb.inode_size as u64;
    let block_offset = byte_index / sb.block_size as u64;
    let byte_in_block = byte_index % sb.block_size as u64;

    let offset =
        (desc.inode_table as u64 + block_offset) * sb.block_size as u64 + byte_in_block;
    let size = std::mem::size_of::<RawInode>().min(sb.inode_size as usize);
    let bytes = backing.read_at_vec(offset, size)?;

    let mut padded = vec![0u8; std::mem::size_of::<RawInode>()];
    padded[..bytes.len()].copy_from_slice(&bytes);
    let raw: RawInode = *bytemuck::from_bytes(&padded);

    Ok(Inode {
        number: ino,
        mode: raw.mode,
        uid: raw.uid,
        gid: raw.gid,
        size: raw.size_lo as u64,
        links_count: raw.links_count,
        atime: raw.atime,
        ctime: raw.ctime,
        mtime: raw.mtime,
        block: raw.block,
    })
}

/// Reads one block of pointers, stopping at (and excluding) the first zero
/// entry.
fn read_pointer_block(backing: &BackingStore, block_num: u32) -> Result<Vec<u32>> {
    let bytes = backing.read_block(block_num as u64)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .take_while(|&p| p != 0)
        .collect())
}

/// Expands an indirect block tree `levels` deep into a flat list of data
/// block numbers. `levels == 1` means `block_num` itself is an indirect
/// block of data-block pointers; higher levels recurse one level down per
/// step.
fn expand_indirect(backing: &BackingStore, block_num: u32, levels: u32) -> Result<Vec<BlockNumber>> {
    if block_num == 0 {
        return Ok(Vec::new());
    }
    let pointers = read_pointer_block(backing, block_num)?;
    if levels == 1 {
        return Ok(pointers.into_iter().map(BlockNumber).collect());
    }
    let mut out = Vec::new();
    for p in pointers {
        out.extend(expand_indirect(backing, p, levels - 1)?);
    }
    Ok(out)
}

/// Builds the full list of data blocks belonging to `inode`, in file order:
/// direct pointers, then single/double/triple indirect.
pub fn block_list(backing: &BackingStore, inode: &Inode) -> Result<Vec<BlockNumber>> {
    let mut blocks = Vec::new();

    for &ptr in &inode.block[..DIRECT_POINTERS] {
        if ptr == 0 {
            break;
        }
        blocks.push(BlockNumber(ptr));
    }

    let i1b = inode.block[12];
    let i2b = inode.block[13];
    let i3b = inode.block[14];

    if i1b != 0 {
        blocks.extend(expand_indirect(backing, i1b, 1)?);
    }
    if i2b != 0 {
        blocks.extend(expand_indirect(backing, i2b, 2)?);
    }
    if i3b != 0 {
        blocks.extend(expand_indirect(backing, i3b, 3)?);
    }

    Ok(blocks)
}
