mod download;
mod files;
mod get;
mod paks;
mod service;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wick",
    version,
    about = "Asynchronous partial Epic Games Store pak downloader"
)]
struct Cli {
    #[command(flatten)]
    service: ServiceOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
pub struct ServiceOpts {
    /// Override the launcher manifest endpoint
    #[arg(long, global = true)]
    pub manifest_url: Option<String>,

    /// Platform of the build to target
    #[arg(long, global = true, default_value = "Windows")]
    pub platform: String,

    /// Label of the build to target
    #[arg(long, global = true, default_value = "Live")]
    pub label: String,

    /// Read the app manifest from a local file instead of the launcher
    #[arg(long, global = true, value_name = "FILE", requires = "chunk_manifest")]
    pub app_manifest: Option<PathBuf>,

    /// Read the chunk manifest from a local file
    #[arg(long, global = true, value_name = "FILE", requires = "app_manifest")]
    pub chunk_manifest: Option<PathBuf>,

    /// Override the chunk CDN base URL
    #[arg(long, global = true)]
    pub chunk_base: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the pak files of the current build
    Paks,
    /// List the files inside a pak
    Files(files::FilesArgs),
    /// Extract one file from a pak
    Get(get::GetArgs),
    /// Download a raw pak to disk
    Download(download::DownloadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let service = service::build(&cli.service).await?;

    match cli.command {
        Command::Paks => paks::run(&service),
        Command::Files(args) => files::run(&service, args).await,
        Command::Get(args) => get::run(&service, args).await,
        Command::Download(args) => download::run(&service, args).await,
    }
}
