mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ext2fs::fs::Ext2Fs;
use ext2fs::fuse_adapter::{AdapterOptions, Ext2FuseAdapter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .init();

    let image = cli
        .image
        .canonicalize()
        .with_context(|| format!("opening image {:?}", cli.image))?;

    let fs = Ext2Fs::mount(&image).with_context(|| format!("mounting {image:?}"))?;

    let options = AdapterOptions {
        substitute_caller_uid: cli.wants_caller_uid(),
    };
    let adapter = Ext2FuseAdapter::new(fs, options);

    let mount_options = vec![
        fuser::MountOption::RO,
        fuser::MountOption::FSName("ext2fs".to_string()),
    ];

    info!("mounting {:?} at {:?}", image, cli.mountpoint);
    fuser::mount2(adapter, &cli.mountpoint, &mount_options)
        .with_context(|| format!("mounting at {:?}", cli.mountpoint))?;

    Ok(())
}
