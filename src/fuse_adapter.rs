//! Maps the decoder façade onto `fuser`'s synchronous `Filesystem` trait.
//!
//! This module is the only place that knows about POSIX errno values or
//! FUSE inode numbers; everything else in the crate works in terms of
//! [`crate::fs::types::InodeNumber`] and [`crate::error::Error`].

use std::ffi::OsStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
    FileAttr, FileType as FuseFileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEntry, ReplyOpen, ReplyStatfs, Request,
};
use log::{error, warn};

use crate::error::Error;
use crate::fs::dir::FileType as Ext2FileType;
use crate::fs::inode::{Inode, S_IFDIR, S_IFLNK, S_IFREG};
use crate::fs::types::InodeNumber;
use crate::fs::Ext2Fs;

const TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Adapter-level configuration (spec.md's `-o user` mount option).
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterOptions {
    pub substitute_caller_uid: bool,
}

pub struct Ext2FuseAdapter {
    fs: Ext2Fs,
    options: AdapterOptions,
}

impl Ext2FuseAdapter {
    pub fn new(fs: Ext2Fs, options: AdapterOptions) -> Self {
        Self { fs, options }
    }

    fn ino_to_number(&self, ino: u64) -> InodeNumber {
        if ino == fuser::FUSE_ROOT_ID {
            self.fs.root_inode_number()
        } else {
            InodeNumber(ino as u32)
        }
    }

    fn number_to_ino(&self, number: InodeNumber) -> u64 {
        if number == self.fs.root_inode_number() {
            fuser::FUSE_ROOT_ID
        } else {
            number.0 as u64
        }
    }

    fn attr_of(&self, req: &Request<'_>, inode: &Inode) -> FileAttr {
        let (uid, gid) = if self.options.substitute_caller_uid {
            (req.uid(), req.gid())
        } else {
            (inode.uid as u32, inode.gid as u32)
        };

        FileAttr {
            ino: self.number_to_ino(inode.number),
            size: inode.size,
            blocks: inode.size.div_ceil(512),
            atime: unix_time(inode.atime),
            mtime: unix_time(inode.mtime),
            ctime: unix_time(inode.ctime),
            crtime: UNIX_EPOCH,
            kind: file_kind(inode),
            perm: inode.mode & 0o7777,
            nlink: inode.links_count as u32,
            uid,
            gid,
            rdev: 0,
            blksize: self.fs.statfs().block_size,
            flags: 0,
        }
    }
}

fn unix_time(secs: u32) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs as u64)
}

fn file_kind(inode: &Inode) -> FuseFileType {
    match inode.file_type_bits() {
        S_IFDIR => FuseFileType::Directory,
        S_IFLNK => FuseFileType::Symlink,
        S_IFREG => FuseFileType::RegularFile,
        0x2000 => FuseFileType::CharDevice,
        0x6000 => FuseFileType::BlockDevice,
        0x1000 => FuseFileType::NamedPipe,
        0xC000 => FuseFileType::Socket,
        other => {
            warn!("inode has unrecognized mode bits {:#x}, reporting as regular file", other);
            FuseFileType::RegularFile
        }
    }
}

fn ext2_to_fuse_kind(ft: Ext2FileType) -> FuseFileType {
    match ft {
        Ext2FileType::Directory => FuseFileType::Directory,
        Ext2FileType::Symlink => FuseFileType::Symlink,
        Ext2FileType::CharDevice => FuseFileType::CharDevice,
        Ext2FileType::BlockDevice => FuseFileType::BlockDevice,
        Ext2FileType::Fifo => FuseFileType::NamedPipe,
        Ext2FileType::Socket => FuseFileType::Socket,
        Ext2FileType::Regular | Ext2FileType::Unknown => FuseFileType::RegularFile,
    }
}

fn errno_of(err: &Error) -> i32 {
    match err {
        Error::NoSuchInode(_) | Error::NoEntry => libc::ENOENT,
        Error::NotADirectory => libc::ENOTDIR,
        Error::ReadOnly => libc::EROFS,
        Error::NotSupported => libc::ENOSYS,
        Error::BadMagic | Error::CorruptGroupDescriptor { .. } | Error::CorruptDirectory => {
            libc::EIO
        }
        Error::TruncatedRead { .. } | Error::Io(_) => libc::EIO,
    }
}

impl Filesystem for Ext2FuseAdapter {
    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let parent_number = self.ino_to_number(parent);
        let parent_inode = match self.fs.inode(parent_number) {
            Ok(i) => i,
            Err(e) => return reply.error(errno_of(&e)),
        };
        let entries = match self.fs.read_dir(&parent_inode) {
            Ok(e) => e,
            Err(e) => return reply.error(errno_of(&e)),
        };
        let name = name.to_string_lossy();
        let Some(entry) = entries.iter().find(|e| e.name == name) else {
            return reply.error(libc::ENOENT);
        };
        match self.fs.inode(entry.inode) {
            Ok(inode) => reply.entry(&TTL, &self.attr_of(req, &inode), 0),
            Err(e) => reply.error(errno_of(&e)),
        }
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        let number = self.ino_to_number(ino);
        match self.fs.inode(number) {
            Ok(inode) => reply.attr(&TTL, &self.attr_of(req, &inode)),
            Err(e) => {
                error!("getattr({ino}) failed: {e}");
                reply.error(errno_of(&e));
            }
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        let number = self.ino_to_number(ino);
        let inode = match self.fs.inode(number) {
            Ok(i) => i,
            Err(e) => return reply.error(errno_of(&e)),
        };
        match self.fs.readlink(&inode) {
            Ok(target) => reply.data(&target),
            Err(e) => reply.error(errno_of(&e)),
        }
    }

    fn open(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        reply.opened(0, 0);
    }

    fn opendir(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        reply.opened(0, 0);
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let number = self.ino_to_number(ino);
        let inode = match self.fs.inode(number) {
            Ok(i) => i,
            Err(e) => return reply.error(errno_of(&e)),
        };
        match self.fs.read(&inode, offset as u64, size as u64) {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(errno_of(&e)),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let number = self.ino_to_number(ino);
        let inode = match self.fs.inode(number) {
            Ok(i) => i,
            Err(e) => return reply.error(errno_of(&e)),
        };
        let entries = match self.fs.read_dir(&inode) {
            Ok(e) => e,
            Err(e) => return reply.error(errno_of(&e)),
        };

        for (i, entry) in entries.into_iter().enumerate().skip(offset as usize) {
            let full = reply.add(
                self.number_to_ino(entry.inode),
                (i + 1) as i64,
                ext2_to_fuse_kind(entry.file_type),
                entry.name,
            );
            if full {
                break;
            }
        }
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        let s = self.fs.statfs();
        reply.statfs(
            s.blocks,
            s.blocks_free,
            s.blocks_avail,
            s.inodes,
            s.inodes_free,
            s.block_size,
            s.max_name_len,
            0,
        );
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, _mask: i32, reply: fuser::ReplyEmpty) {
        let number = self.ino_to_number(ino);
        match self.fs.inode(number) {
            Ok(_) => reply.ok(),
            Err(e) => reply.error(errno_of(&e)),
        }
    }

    fn bmap(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _blocksize: u32,
        _idx: u64,
        reply: fuser::ReplyBmap,
    ) {
        reply.error(libc::ENOSYS);
    }

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<fuser::TimeOrNow>,
        _mtime: Option<fuser::TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        reply.error(libc::EROFS);
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn unlink(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: fuser::ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: fuser::ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _link: &std::path::Path,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: fuser::ReplyEmpty,
    ) {
        reply.error(libc::EROFS);
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _newparent: u64,
        _newname: &OsStr,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: fuser::ReplyWrite,
    ) {
        reply.error(libc::EROFS);
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: fuser::ReplyCreate,
    ) {
        reply.error(libc::EROFS);
    }

    fn setxattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _name: &OsStr,
        _value: &[u8],
        _flags: i32,
        _position: u32,
        reply: fuser::ReplyEmpty,
    ) {
        reply.error(libc::EROFS);
    }

    fn removexattr(&mut self, _req: &Request<'_>, _ino: u64, _name: &OsStr, reply: fuser::ReplyEmpty) {
        reply.error(libc::EROFS);
    }
}
