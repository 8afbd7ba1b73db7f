#![allow(clippy::too_many_arguments)]

pub mod error;
pub mod fs;
pub mod fuse_adapter;
pub mod io;

pub use error::Error;
pub use fs::Ext2Fs;
