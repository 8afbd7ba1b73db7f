//! Error types returned by the decoder. See spec.md's error table for the
//! mapping these variants are grounded on; `fuse_adapter` is the only place
//! that turns one of these into a negative errno.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad superblock magic")]
    BadMagic,

    #[error("corrupt group descriptor {group}: {reason}")]
    CorruptGroupDescriptor { group: u32, reason: &'static str },

    #[error("no such inode: {0}")]
    NoSuchInode(u32),

    #[error("no such entry")]
    NoEntry,

    #[error("not a directory")]
    NotADirectory,

    #[error("corrupt directory entry stream")]
    CorruptDirectory,

    #[error("truncated read: expected {expected} bytes, got {got}")]
    TruncatedRead { expected: usize, got: usize },

    #[error("read-only filesystem")]
    ReadOnly,

    #[error("operation not supported")]
    NotSupported,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
