//! Small newtypes wrapping the raw on-disk integer fields, so that an inode
//! number can never be silently used as a block number or vice versa.

use bytemuck::{Pod, Zeroable};

/// Derives [`core::fmt::Display`] for a tuple newtype wrapping a single
/// integer field.
macro_rules! uint_newtype_display {
    ($name:ident) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Defines a `Pod`/`Zeroable` newtype over a raw on-disk integer, with the
/// conversions needed to use it as an index/offset.
macro_rules! uint_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name(pub $inner);

        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }

        impl From<$name> for u64 {
            fn from(v: $name) -> u64 {
                v.0 as u64
            }
        }

        uint_newtype_display!($name);
    };
}

uint_newtype!(InodeNumber, u32);
uint_newtype!(BlockNumber, u32);
uint_newtype!(BlockGroupNumber, u32);

impl InodeNumber {
    /// Inode numbers are 1-based; inode 2 is always the filesystem root.
    pub const ROOT: InodeNumber = InodeNumber(2);

    /// Returns `(group, slot)` where `group` is 0-based and `slot` is the
    /// inode's 0-based index within that group's inode table.
    pub fn locate(self, inodes_per_group: u32) -> (BlockGroupNumber, u32) {
        let index = self.0 - 1;
        (
            BlockGroupNumber(index / inodes_per_group),
            index % inodes_per_group,
        )
    }
}

impl BlockNumber {
    pub const NULL: BlockNumber = BlockNumber(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}
