//! Superblock decoding. Layout and offsets per spec.md §6: the superblock
//! lives at byte offset 1024, is 1024 bytes long, with the magic number at
//! offset 56.

use bytemuck::{Pod, Zeroable};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::fs::types::{BlockGroupNumber, InodeNumber};
use crate::io::BackingStore;

pub const SUPERBLOCK_OFFSET: u64 = 1024;
pub const SUPERBLOCK_SIZE: usize = 1024;
const EXT2_MAGIC: u16 = 0xEF53;

/// Raw on-disk superblock, decoded with a direct `Pod` cast. Fields beyond
/// those spec.md names are kept so the struct's size matches the real
/// on-disk layout; most are never read.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RawSuperblock {
    pub inodes_count: u32,
    pub blocks_count: u32,
    pub r_blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    pub log_block_size: u32,
    pub log_frag_size: u32,
    pub blocks_per_group: u32,
    pub frags_per_group: u32,
    pub inodes_per_group: u32,
    pub mtime: u32,
    pub wtime: u32,
    pub mnt_count: u16,
    pub max_mnt_count: u16,
    pub magic: u16,
    pub state: u16,
    pub errors: u16,
    pub minor_rev_level: u16,
    pub lastcheck: u32,
    pub checkinterval: u32,
    pub creator_os: u32,
    pub rev_level: u32,
    pub def_resuid: u16,
    pub def_resgid: u16,
    // -- rev 1 only, valid when rev_level >= 1 --
    pub first_ino: u32,
    pub inode_size: u16,
    pub block_group_nr: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub uuid: [u8; 16],
    pub volume_name: [u8; 16],
    pub last_mounted: [u8; 64],
}

/// Decoded superblock plus the derived values other components need
/// (block size, inode size, block-group count).
#[derive(Clone, Debug)]
pub struct Superblock {
    pub raw_inodes_count: u32,
    pub blocks_count: u32,
    pub r_blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    pub block_size: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub inode_size: u32,
    pub rev_level: u32,
    pub uuid: Uuid,
    pub volume_name: String,
}

impl Superblock {
    pub fn decode(backing: &BackingStore) -> Result<Self> {
        let bytes = backing.read_at_vec(SUPERBLOCK_OFFSET, SUPERBLOCK_SIZE)?;
        let raw: RawSuperblock = *bytemuck::from_bytes(&bytes[..std::mem::size_of::<RawSuperblock>()]);

        if raw.magic != EXT2_MAGIC {
            return Err(Error::BadMagic);
        }

        let inode_size = if raw.rev_level == 0 {
            128
        } else {
            raw.inode_size as u32
        };

        let volume_name = raw
            .volume_name
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>();

        Ok(Self {
            raw_inodes_count: raw.inodes_count,
            blocks_count: raw.blocks_count,
            r_blocks_count: raw.r_blocks_count,
            free_blocks_count: raw.free_blocks_count,
            free_inodes_count: raw.free_inodes_count,
            first_data_block: raw.first_data_block,
            block_size: 1024u32 << raw.log_block_size,
            blocks_per_group: raw.blocks_per_group,
            inodes_per_group: raw.inodes_per_group,
            inode_size,
            rev_level: raw.rev_level,
            uuid: Uuid::from_bytes(raw.uuid),
            volume_name,
        })
    }

    pub fn inodes_count(&self) -> u32 {
        self.raw_inodes_count
    }

    /// Number of block groups covering the filesystem.
    pub fn group_count(&self) -> u32 {
        self.blocks_count.div_ceil(self.blocks_per_group)
    }

    pub fn locate_inode(&self, ino: InodeNumber) -> (BlockGroupNumber, u32) {
        ino.locate(self.inodes_per_group)
    }
}
