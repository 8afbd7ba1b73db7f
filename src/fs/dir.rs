//! Directory entry stream decoding.
//!
//! A directory's data blocks each hold a packed stream of variable-length
//! entries; `entry_size` always advances to the next entry and the stream
//! fills exactly one block per block in the directory's block list. Entries
//! with `inode == 0` are holes left by deletions and are skipped, while
//! still being used to advance through the stream.

use crate::error::{Error, Result};
use crate::fs::inode::{block_list, Inode};
use crate::fs::types::InodeNumber;
use crate::io::BackingStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileType {
    Unknown,
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    Symlink,
}

impl FileType {
    /// `0` is the legitimate "unknown" code (`EXT2_FT_UNKNOWN`); any code
    /// past `7` is not a defined file-type and marks the directory as
    /// corrupt rather than being folded into `Unknown`.
    fn from_raw(v: u8) -> Result<FileType> {
        match v {
            0 => Ok(FileType::Unknown),
            1 => Ok(FileType::Regular),
            2 => Ok(FileType::Directory),
            3 => Ok(FileType::CharDevice),
            4 => Ok(FileType::BlockDevice),
            5 => Ok(FileType::Fifo),
            6 => Ok(FileType::Socket),
            7 => Ok(FileType::Symlink),
            _ => Err(Error::CorruptDirectory),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirEntry {
    pub inode: InodeNumber,
    pub file_type: FileType,
    pub name: String,
}

/// Parses one data block's worth of directory entries, honoring
/// `entry_size` to advance even across holes.
fn parse_block(block: &[u8]) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    while pos + 8 <= block.len() {
        let inode = u32::from_le_bytes(block[pos..pos + 4].try_into().unwrap());
        let entry_size = u16::from_le_bytes(block[pos + 4..pos + 6].try_into().unwrap()) as usize;
        let name_len = block[pos + 6] as usize;
        let file_type = block[pos + 7];

        if entry_size < 8 {
            return Err(Error::CorruptDirectory);
        }
        if pos + entry_size > block.len() {
            return Err(Error::CorruptDirectory);
        }

        if inode != 0 {
            let name_bytes = &block[pos + 8..pos + 8 + name_len];
            entries.push(DirEntry {
                inode: InodeNumber(inode),
                file_type: FileType::from_raw(file_type)?,
                name: String::from_utf8_lossy(name_bytes).into_owned(),
            });
        }

        pos += entry_size;
    }
    Ok(entries)
}

/// Decodes the full directory entry list for `inode`, walking every data
/// block in its block list (extending spec.md's one-block minimum).
pub fn read_directory(backing: &BackingStore, inode: &Inode) -> Result<Vec<DirEntry>> {
    if !inode.is_directory() {
        return Err(Error::NotADirectory);
    }

    let blocks = block_list(backing, inode)?;
    let mut entries = Vec::new();
    for block in blocks {
        let data = backing.read_block(block.0 as u64)?;
        entries.extend(parse_block(&data)?);
    }
    Ok(entries)
}
