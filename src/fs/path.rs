//! Path resolution: split the path into components and walk the directory
//! tree one component at a time from the root inode.

use crate::error::Result;
use crate::fs::dir::read_directory;
use crate::fs::inode::{read_inode, Inode};
use crate::fs::types::InodeNumber;
use crate::fs::Ext2Fs;

/// Resolves `path` (an absolute, `/`-separated path) to its inode, starting
/// at the filesystem root (inode 2).
pub fn resolve(fs: &Ext2Fs, path: &str) -> Result<Inode> {
    let mut current = read_inode(&fs.backing, &fs.superblock, &fs.groups, InodeNumber::ROOT)?;

    for component in path.split('/').filter(|c| !c.is_empty()) {
        let entries = read_directory(&fs.backing, &current)?;
        let entry = entries
            .iter()
            .find(|e| e.name == component)
            .ok_or(crate::error::Error::NoEntry)?;
        current = read_inode(&fs.backing, &fs.superblock, &fs.groups, entry.inode)?;
    }

    Ok(current)
}

/// Resolves `path` to an inode number (path resolution used by the FUSE
/// adapter's `lookup`, which needs the number more often than the struct).
pub fn resolve_number(fs: &Ext2Fs, path: &str) -> Result<InodeNumber> {
    Ok(resolve(fs, path)?.number)
}
