//! `wick files`: list the files inside a decrypted pak.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use wick_core::ServiceState;

#[derive(Args)]
pub struct FilesArgs {
    /// Pak file name, as printed by `wick paks`
    pub pak: String,

    /// AES key for the pak index, hex
    #[arg(long)]
    pub key: String,

    /// Print the mount point before the file list
    #[arg(long)]
    pub mount: bool,
}

pub async fn run(service: &ServiceState, args: FilesArgs) -> Result<()> {
    let encrypted = service
        .get_pak(&args.pak)
        .await
        .with_context(|| format!("fetching {}", args.pak))?;
    let pak = service
        .decrypt_pak(encrypted, &args.key)
        .await
        .context("decrypting pak index")?;

    if args.mount {
        println!("{}", style(pak.get_mount_point()).dim());
    }
    for name in pak.get_file_names() {
        println!("{}", name);
    }
    Ok(())
}
