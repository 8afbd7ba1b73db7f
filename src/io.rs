//! Backing I/O.
//!
//! All reads go through absolute offsets (`pread`-style) rather than an
//! ambient file cursor, so a single `BackingStore` can be shared behind an
//! `Arc` without a lock guarding a seek position.

use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct BackingStore {
    file: File,
    block_size: u64,
}

impl BackingStore {
    /// Opens `path` read-only. The block size is not yet known at this
    /// point (it is a superblock field); callers set it once the
    /// superblock has been decoded via [`BackingStore::set_block_size`].
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            file,
            block_size: 1024,
        })
    }

    pub fn set_block_size(&mut self, block_size: u64) {
        self.block_size = block_size;
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Reads exactly `buf.len()` bytes starting at absolute byte `offset`.
    /// Short reads (past real end-of-file) are reported as
    /// [`Error::TruncatedRead`].
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let expected = buf.len();
        let mut got = 0;
        while got < expected {
            let n = self.file.read_at(&mut buf[got..], offset + got as u64)?;
            if n == 0 {
                return Err(Error::TruncatedRead { expected, got });
            }
            got += n;
        }
        Ok(())
    }

    pub fn read_at_vec(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_at(offset, &mut buf)?;
        Ok(buf)
    }

    /// Reads one whole block by block number.
    pub fn read_block(&self, block_num: u64) -> Result<Vec<u8>> {
        self.read_at_vec(block_num * self.block_size, self.block_size as usize)
    }
}
