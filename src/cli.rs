//! Command-line surface: `ext2fs-mount <IMAGE> <MOUNTPOINT> [-o OPTION]...`

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Debug, Parser)]
#[command(name = "ext2fs-mount", about = "Mount a read-only ext2 image over FUSE")]
pub struct Cli {
    /// Path to the ext2 image file or block device.
    pub image: PathBuf,

    /// Existing directory to mount the filesystem onto.
    pub mountpoint: PathBuf,

    /// Mount option, may be repeated. Currently recognized: `user` (report
    /// the calling process's uid/gid as every inode's owner).
    #[arg(short = 'o', long = "option")]
    pub options: Vec<String>,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

impl Cli {
    pub fn wants_caller_uid(&self) -> bool {
        self.options.iter().any(|o| o == "user")
    }
}
