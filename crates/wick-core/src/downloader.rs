//! High-level downloader handle.
//!
//! The intended call sequence is construct, `start_service`, then operate:
//!
//! ```no_run
//! use wick_core::WickDownloader;
//!
//! # async fn example() -> wick_core::Result<()> {
//! let mut downloader = WickDownloader::new();
//! downloader.start_service().await?;
//! let pak_name = downloader.get_paks()?[0].clone();
//! let encrypted = downloader.get_pak(&pak_name).await?;
//! let pak = downloader.decrypt_pak(encrypted, "0x...").await?;
//! println!("{}", pak.get_file_names()[0]);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::config::ServiceConfig;
use crate::error::{Result, WickError};
use crate::service::{EncryptedPak, PakService, ServiceState};

/// Facade over [`ServiceState`] with explicit start-up.
///
/// Construction is free of I/O; [`WickDownloader::start_service`] performs
/// the manifest fetches and the handle is ready once it resolves.
pub struct WickDownloader {
    config: ServiceConfig,
    service: Option<ServiceState>,
}

impl WickDownloader {
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Self {
        Self {
            config,
            service: None,
        }
    }

    /// Fetch and parse the manifests. Calling again replaces the service
    /// with a freshly fetched one.
    pub async fn start_service(&mut self) -> Result<()> {
        let service = ServiceState::with_config(self.config.clone()).await?;
        self.service = Some(service);
        Ok(())
    }

    /// Start from local manifest documents instead of the network.
    pub fn start_with_manifests(&mut self, app_json: &str, chunk_json: &str) -> Result<()> {
        let service =
            ServiceState::from_manifests_with_config(self.config.clone(), app_json, chunk_json)?;
        self.service = Some(service);
        Ok(())
    }

    /// The underlying service, once started.
    pub fn service(&self) -> Result<&ServiceState> {
        self.service.as_ref().ok_or(WickError::ServiceNotStarted)
    }

    pub fn get_paks(&self) -> Result<Vec<String>> {
        Ok(self.service()?.get_paks())
    }

    pub async fn get_pak(&self, name: &str) -> Result<EncryptedPak> {
        self.service()?.get_pak(name).await
    }

    pub async fn decrypt_pak(&self, pak: EncryptedPak, key: &str) -> Result<PakService> {
        self.service()?.decrypt_pak(pak, key).await
    }

    pub async fn download_pak(&self, name: &str, target: &Path) -> Result<()> {
        self.service()?
            .download_pak(name, target, None::<fn(u64, u64)>)
            .await
    }
}

impl Default for WickDownloader {
    fn default() -> Self {
        Self::new()
    }
}
