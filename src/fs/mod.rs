//! The ext2 decoder façade.
//!
//! `Ext2Fs` exclusively owns the backing I/O handle, the superblock and the
//! group descriptor table; all three are immutable after mount. This is the
//! only type the FUSE adapter talks to.

pub mod dir;
pub mod group;
pub mod inode;
pub mod path;
pub mod read;
pub mod superblock;
pub mod types;

use std::path::Path;

use log::info;

use crate::error::Result;
use crate::io::BackingStore;
use dir::DirEntry;
use group::GroupDescriptor;
use inode::Inode;
use superblock::Superblock;
use types::InodeNumber;

#[derive(Debug, Clone, Copy)]
pub struct Statfs {
    pub block_size: u32,
    pub blocks: u64,
    pub blocks_free: u64,
    pub blocks_avail: u64,
    pub inodes: u64,
    pub inodes_free: u64,
    pub max_name_len: u32,
}

pub struct Ext2Fs {
    pub(crate) backing: BackingStore,
    pub(crate) superblock: Superblock,
    pub(crate) groups: Vec<GroupDescriptor>,
}

impl Ext2Fs {
    pub fn mount(image: &Path) -> Result<Self> {
        let mut backing = BackingStore::open(image)?;
        let superblock = Superblock::decode(&backing)?;
        backing.set_block_size(superblock.block_size as u64);
        let groups = group::load_group_descriptors(&backing, &superblock)?;

        info!(
            "mounted ext2 image {:?}: label={:?} uuid={} inodes={} blocks={}",
            image,
            superblock.volume_name,
            superblock.uuid,
            superblock.inodes_count(),
            superblock.blocks_count,
        );

        Ok(Self {
            backing,
            superblock,
            groups,
        })
    }

    pub fn root_inode_number(&self) -> InodeNumber {
        InodeNumber::ROOT
    }

    pub fn inode(&self, ino: InodeNumber) -> Result<Inode> {
        inode::read_inode(&self.backing, &self.superblock, &self.groups, ino)
    }

    pub fn resolve(&self, path: &str) -> Result<Inode> {
        path::resolve(self, path)
    }

    pub fn read_dir(&self, inode: &Inode) -> Result<Vec<DirEntry>> {
        dir::read_directory(&self.backing, inode)
    }

    pub fn read(&self, inode: &Inode, offset: u64, size: u64) -> Result<Vec<u8>> {
        read::read_range(&self.backing, inode, offset, size)
    }

    /// Resolves the symlink target of `inode`: the in-place bytes for a
    /// fast symlink, or the NUL-terminated contents of its data blocks for
    /// a long one.
    pub fn readlink(&self, inode: &Inode) -> Result<Vec<u8>> {
        if inode.is_fast_symlink() {
            let mut bytes = inode.fast_symlink_bytes();
            bytes.truncate(inode.size as usize);
            return Ok(bytes);
        }

        let mut out = Vec::new();
        for block in inode::block_list(&self.backing, inode)? {
            let data = self.backing.read_block(block.0 as u64)?;
            match data.iter().position(|&b| b == 0) {
                Some(nul) => {
                    out.extend_from_slice(&data[..nul]);
                    break;
                }
                None => out.extend_from_slice(&data),
            }
        }
        Ok(out)
    }

    pub fn statfs(&self) -> Statfs {
        let blocks_avail = self
            .superblock
            .free_blocks_count
            .saturating_sub(self.superblock.r_blocks_count);
        Statfs {
            block_size: self.superblock.block_size,
            blocks: self.superblock.blocks_count as u64,
            blocks_free: self.superblock.free_blocks_count as u64,
            blocks_avail: blocks_avail as u64,
            inodes: self.superblock.inodes_count() as u64,
            inodes_free: self.superblock.free_inodes_count as u64,
            max_name_len: 256,
        }
    }
}
