//! `wick get`: extract one file from a pak.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use wick_core::ServiceState;

#[derive(Args)]
pub struct GetArgs {
    /// Pak file name, as printed by `wick paks`
    pub pak: String,

    /// File inside the pak, as printed by `wick files`
    pub file: String,

    /// AES key for the pak, hex
    #[arg(long)]
    pub key: String,

    /// Output path; defaults to the file's base name
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(service: &ServiceState, args: GetArgs) -> Result<()> {
    let encrypted = service
        .get_pak(&args.pak)
        .await
        .with_context(|| format!("fetching {}", args.pak))?;
    let pak = service
        .decrypt_pak(encrypted, &args.key)
        .await
        .context("decrypting pak index")?;

    let data = pak
        .get_file_data(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file))?;

    let output = args.output.unwrap_or_else(|| {
        let base = args.file.rsplit('/').next().unwrap_or(&args.file);
        PathBuf::from(base)
    });
    tokio::fs::write(&output, &data)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!("wrote {} ({} bytes)", output.display(), data.len());
    Ok(())
}
