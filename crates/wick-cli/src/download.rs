//! `wick download`: stream a raw pak to disk with a progress bar.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use wick_core::ServiceState;

#[derive(Args)]
pub struct DownloadArgs {
    /// Pak file name, as printed by `wick paks`
    pub pak: String,

    /// Where to write the pak
    pub target: PathBuf,
}

pub async fn run(service: &ServiceState, args: DownloadArgs) -> Result<()> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar.set_message(args.pak.clone());

    let progress = {
        let bar = bar.clone();
        move |written: u64, total: u64| {
            bar.set_length(total);
            bar.set_position(written);
        }
    };

    service
        .download_pak(&args.pak, &args.target, Some(progress))
        .await
        .with_context(|| format!("downloading {}", args.pak))?;

    bar.finish();
    println!("wrote {}", args.target.display());
    Ok(())
}
