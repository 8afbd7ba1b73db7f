//! Boundary-scenario tests (spec.md §8, S1-S8), built against a small
//! synthetic ext2 image assembled by hand rather than a checked-in binary
//! fixture.

use std::io::Write;

use bytemuck::Zeroable;
use ext2fs::fs::superblock::RawSuperblock;
use ext2fs::fs::Ext2Fs;

const BLOCK_SIZE: u32 = 1024;

struct ImageBuilder {
    blocks: Vec<[u8; BLOCK_SIZE as usize]>,
}

impl ImageBuilder {
    fn new(block_count: usize) -> Self {
        Self {
            blocks: vec![[0u8; BLOCK_SIZE as usize]; block_count],
        }
    }

    fn block_mut(&mut self, n: usize) -> &mut [u8; BLOCK_SIZE as usize] {
        &mut self.blocks[n]
    }

    /// Writes a 128-byte inode record at `slot` within the inode table
    /// starting at `inode_table_block`, accounting for the table spanning
    /// more than one block once `slot * 128` exceeds the block size.
    fn write_inode(&mut self, inode_table_block: usize, slot: usize, raw: &RawInodeBytes) {
        let byte_index = slot * 128;
        let block_offset = byte_index / BLOCK_SIZE as usize;
        let local_offset = byte_index % BLOCK_SIZE as usize;
        let block = self.block_mut(inode_table_block + block_offset);
        block[local_offset..local_offset + raw.0.len()].copy_from_slice(&raw.0);
    }

    fn finish(self) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for block in &self.blocks {
            f.write_all(block).unwrap();
        }
        f.flush().unwrap();
        f
    }
}

/// 128-byte raw inode record, matching `RawInode`'s field order, built by
/// hand since the struct's constructor isn't exposed across the crate
/// boundary.
struct RawInodeBytes([u8; 128]);

impl RawInodeBytes {
    fn new(mode: u16, size: u32, links_count: u16, direct_blocks: &[u32]) -> Self {
        let mut buf = [0u8; 128];
        buf[0..2].copy_from_slice(&mode.to_le_bytes());
        buf[4..8].copy_from_slice(&size.to_le_bytes());
        buf[26..28].copy_from_slice(&links_count.to_le_bytes());
        for (i, &b) in direct_blocks.iter().enumerate().take(15) {
            let off = 40 + i * 4;
            buf[off..off + 4].copy_from_slice(&b.to_le_bytes());
        }
        Self(buf)
    }
}

const S_IFDIR: u16 = 0x4000;
const S_IFREG: u16 = 0x8000;
const S_IFLNK: u16 = 0xA000;

fn pack_dirent(out: &mut Vec<u8>, inode: u32, name: &str, file_type: u8, entry_size: u16) {
    out.extend_from_slice(&inode.to_le_bytes());
    out.extend_from_slice(&entry_size.to_le_bytes());
    out.push(name.len() as u8);
    out.push(file_type);
    out.extend_from_slice(name.as_bytes());
    out.resize(out.len() + (entry_size as usize - 8 - name.len()), 0);
}

fn write_group_descriptor(block: &mut [u8], offset: usize, block_bitmap: u32, inode_bitmap: u32, inode_table: u32) {
    block[offset..offset + 4].copy_from_slice(&block_bitmap.to_le_bytes());
    block[offset + 4..offset + 8].copy_from_slice(&inode_bitmap.to_le_bytes());
    block[offset + 8..offset + 12].copy_from_slice(&inode_table.to_le_bytes());
}

/// Builds a minimal single-group ext2 image:
///   block 1:    superblock
///   block 2:    group descriptor table
///   block 3:    block bitmap (contents unchecked)
///   block 4:    inode bitmap (contents unchecked)
///   block 5-6:  inode table (spans two blocks once a slot's byte offset
///               crosses the 1024-byte boundary)
///   block 7:    root directory data
///   block 8:    "hello.txt" contents (< 1 block)
///   block 9,10: "big.bin" contents (spans two blocks)
///   block 11:   "link.txt" symlink target (over 60 bytes, so out of line)
fn build_fixture() -> tempfile::NamedTempFile {
    let mut img = ImageBuilder::new(16);

    // Superblock.
    let mut sb = RawSuperblock::zeroed();
    sb.inodes_count = 32;
    sb.blocks_count = 16;
    sb.free_blocks_count = 4;
    sb.r_blocks_count = 1;
    sb.free_inodes_count = 20;
    sb.first_data_block = 1;
    sb.log_block_size = 0;
    sb.blocks_per_group = 16;
    sb.inodes_per_group = 32;
    sb.magic = 0xEF53;
    sb.rev_level = 0;
    sb.inode_size = 0;
    let sb_bytes = bytemuck::bytes_of(&sb);
    img.block_mut(1)[..sb_bytes.len()].copy_from_slice(sb_bytes);

    // Group descriptor table (one descriptor, 32 bytes).
    write_group_descriptor(img.block_mut(2), 0, 3, 4, 5);

    // Root directory (inode 2): "." ".." and "hello.txt", "big.bin",
    // "link.txt" (long symlink) and "short.txt" (fast/inline symlink).
    let mut root_dir = Vec::new();
    pack_dirent(&mut root_dir, 2, ".", 2, 12);
    pack_dirent(&mut root_dir, 2, "..", 2, 12);
    pack_dirent(&mut root_dir, 0, "", 0, 12); // a hole from a deleted entry
    pack_dirent(&mut root_dir, 11, "hello.txt", 1, 20);
    pack_dirent(&mut root_dir, 12, "big.bin", 1, 20);
    pack_dirent(&mut root_dir, 13, "link.txt", 7, 32);
    pack_dirent(&mut root_dir, 14, "short.txt", 7, (BLOCK_SIZE as usize - root_dir.len()) as u16);
    assert_eq!(root_dir.len(), BLOCK_SIZE as usize);
    img.block_mut(7).copy_from_slice(&root_dir);

    // hello.txt contents.
    let hello = b"hello, ext2fs!";
    img.block_mut(8)[..hello.len()].copy_from_slice(hello);

    // big.bin spans two blocks.
    let pattern: Vec<u8> = (0..(BLOCK_SIZE as usize * 2)).map(|i| (i % 251) as u8).collect();
    img.block_mut(9).copy_from_slice(&pattern[..BLOCK_SIZE as usize]);
    img.block_mut(10).copy_from_slice(&pattern[BLOCK_SIZE as usize..]);

    // link.txt: a target over 60 bytes so it is stored in its own data
    // block rather than packed into the inode's pointer slots.
    let target = format!("/{}", "a".repeat(70));
    let target = target.as_bytes();
    img.block_mut(11)[..target.len()].copy_from_slice(target);

    // Inode table starts at block 5. Slot = (ino - 1) % inodes_per_group.
    img.write_inode(5, 1, &RawInodeBytes::new(S_IFDIR | 0o755, BLOCK_SIZE, 2, &[7])); // ino 2 (root)
    img.write_inode(5, 10, &RawInodeBytes::new(S_IFREG | 0o644, hello.len() as u32, 1, &[8])); // ino 11
    img.write_inode(
        5,
        11,
        &RawInodeBytes::new(S_IFREG | 0o644, BLOCK_SIZE * 2, 1, &[9, 10]),
    ); // ino 12
    img.write_inode(
        5,
        12,
        &RawInodeBytes::new(S_IFLNK | 0o777, target.len() as u32, 1, &[11]),
    ); // ino 13

    // short.txt: a fast symlink, its target packed directly into the
    // inode's 15 block-pointer slots instead of a data block.
    let short_target = b"/hello.txt";
    let mut short_symlink = RawInodeBytes::new(S_IFLNK | 0o777, short_target.len() as u32, 1, &[]);
    short_symlink.0[40..40 + short_target.len()].copy_from_slice(short_target);
    img.write_inode(5, 13, &short_symlink); // ino 14

    img.finish()
}

#[test]
fn s1_root_readdir_contains_dot_and_dotdot() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let root = fs.inode(fs.root_inode_number()).unwrap();
    let entries = fs.read_dir(&root).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"."));
    assert!(names.contains(&".."));
    assert!(names.contains(&"hello.txt"));
    // the deleted hole entry must not surface
    assert!(!names.iter().any(|n| n.is_empty()));
}

#[test]
fn s2_small_file_read_returns_full_contents() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let file = fs.resolve("hello.txt").unwrap();
    let data = fs.read(&file, 0, 4096).unwrap();
    assert_eq!(data, b"hello, ext2fs!");
}

#[test]
fn s3_cross_block_read_stitches_both_blocks() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let file = fs.resolve("big.bin").unwrap();
    let data = fs.read(&file, 1000, 48).unwrap();
    let expected: Vec<u8> = (1000..1048).map(|i| (i % 251) as u8).collect();
    assert_eq!(data, expected);
}

#[test]
fn s4_read_is_prefix_stable() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let file = fs.resolve("big.bin").unwrap();
    let whole = fs.read(&file, 0, file.size).unwrap();
    let prefix = fs.read(&file, 0, 100).unwrap();
    assert_eq!(&whole[..100], &prefix[..]);
}

#[test]
fn s4b_splice_law_holds() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let file = fs.resolve("big.bin").unwrap();
    let a = fs.read(&file, 0, 600).unwrap();
    let b = fs.read(&file, 600, 600).unwrap();
    let whole = fs.read(&file, 0, 1200).unwrap();
    let mut spliced = a;
    spliced.extend(b);
    assert_eq!(spliced, whole);
}

#[test]
fn s6_long_symlink_reads_nul_terminated_target() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let link = fs.resolve("link.txt").unwrap();
    assert!(!link.is_fast_symlink());
    let target = fs.readlink(&link).unwrap();
    let expected = format!("/{}", "a".repeat(70));
    assert_eq!(target, expected.as_bytes());
}

#[test]
fn s5_short_symlink_is_stored_inline() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let link = fs.resolve("short.txt").unwrap();
    assert!(link.is_fast_symlink());
    let target = fs.readlink(&link).unwrap();
    assert_eq!(target, b"/hello.txt");
}

#[test]
fn s7_statfs_reports_configured_block_size() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let statfs = fs.statfs();
    assert_eq!(statfs.block_size, BLOCK_SIZE);
    // free_blocks_count=4, r_blocks_count=1 in the fixture's superblock.
    assert_eq!(statfs.blocks_free, 4);
    assert_eq!(statfs.blocks_avail, 3);
}

#[test]
fn s8_missing_path_is_reported_as_no_entry() {
    let img = build_fixture();
    let fs = Ext2Fs::mount(img.path()).unwrap();
    let err = fs.resolve("does/not/exist").unwrap_err();
    assert!(matches!(err, ext2fs::Error::NoEntry));
}
