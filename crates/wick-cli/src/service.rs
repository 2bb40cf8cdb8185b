//! Service construction from command-line options.

use anyhow::{Context, Result};
use wick_core::{ServiceConfig, ServiceState};

use crate::ServiceOpts;

pub async fn build(opts: &ServiceOpts) -> Result<ServiceState> {
    let mut config = ServiceConfig::new()
        .with_platform(opts.platform.clone())
        .with_label(opts.label.clone());

    if let Some(url) = &opts.manifest_url {
        config = config.with_manifest_url(url.clone());
    }
    if let Some(base) = &opts.chunk_base {
        config = config.with_chunk_base(base.clone());
    }

    if let (Some(app_path), Some(chunk_path)) = (&opts.app_manifest, &opts.chunk_manifest) {
        let app_json = std::fs::read_to_string(app_path)
            .with_context(|| format!("reading {}", app_path.display()))?;
        let chunk_json = std::fs::read_to_string(chunk_path)
            .with_context(|| format!("reading {}", chunk_path.display()))?;
        ServiceState::from_manifests_with_config(config, &app_json, &chunk_json)
            .context("parsing local manifests")
    } else {
        ServiceState::with_config(config)
            .await
            .context("starting downloader service")
    }
}
