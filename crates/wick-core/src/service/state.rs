//! Service construction and pak-level operations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::reader::PakService;
use crate::chunk::{decode_chunk, plan_range};
use crate::config::ServiceConfig;
use crate::error::{Result, WickError};
use crate::http::HttpClient;
use crate::manifest::{AppManifest, ChunkManifest, FileManifest};
use crate::pak::{parse_key, PakFooter, PakIndex, FOOTER_SIZE};

/// Shared internals behind every handle the service gives out.
#[derive(Debug)]
pub(crate) struct ServiceInner {
    http: HttpClient,
    manifest: ChunkManifest,
    chunk_base: Option<String>,
    /// Decoded chunk payloads for ranged reads. Whole-pak downloads bypass
    /// this so multi-gigabyte transfers do not pin their chunks in memory.
    cache: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl ServiceInner {
    fn new(http: HttpClient, manifest: ChunkManifest, chunk_base: Option<String>) -> Self {
        Self {
            http,
            manifest,
            chunk_base,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn manifest(&self) -> &ChunkManifest {
        &self.manifest
    }

    fn chunk_url(&self, guid: &str) -> Result<String> {
        let base = self.chunk_base.as_deref().ok_or_else(|| WickError::InvalidManifest {
            message: "no chunk distribution endpoint configured".to_string(),
        })?;
        let path = self.manifest.chunk_path(guid)?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    async fn fetch_chunk_uncached(&self, guid: &str) -> Result<Vec<u8>> {
        let url = self.chunk_url(guid)?;
        debug!("fetching chunk {}", guid);
        let raw = self.http.get_bytes(&url).await?;
        decode_chunk(&raw)
    }

    async fn fetch_chunk(&self, guid: &str) -> Result<Arc<Vec<u8>>> {
        {
            let cache = self.cache.lock().await;
            if let Some(payload) = cache.get(guid) {
                return Ok(Arc::clone(payload));
            }
        }

        let payload = Arc::new(self.fetch_chunk_uncached(guid).await?);
        let mut cache = self.cache.lock().await;
        let entry = cache.entry(guid.to_string()).or_insert(payload);
        Ok(Arc::clone(entry))
    }

    /// Read `[offset, offset + len)` of a file by assembling chunk slices.
    pub(crate) async fn read_range(
        &self,
        file: &FileManifest,
        offset: u64,
        len: u64,
    ) -> Result<Vec<u8>> {
        let plan = plan_range(&file.parts, offset, len)?;

        let mut out = Vec::with_capacity(len as usize);
        for slice in plan {
            let part = &file.parts[slice.part_index];
            let payload = self.fetch_chunk(&part.guid).await?;

            let start = slice.chunk_offset as usize;
            let end = start + slice.len as usize;
            if end > payload.len() {
                return Err(WickError::InvalidChunk {
                    reason: format!(
                        "chunk {} payload of {} bytes does not cover {}..{}",
                        part.guid,
                        payload.len(),
                        start,
                        end
                    ),
                });
            }
            out.extend_from_slice(&payload[start..end]);
        }

        Ok(out)
    }
}

/// A pak that has been fetched but not yet decrypted.
///
/// Produced by [`ServiceState::get_pak`]; consumed by
/// [`ServiceState::decrypt_pak`], so a pak cannot be decrypted twice.
#[derive(Debug)]
pub struct EncryptedPak {
    pub(crate) file: FileManifest,
    pub(crate) footer: PakFooter,
    pub(crate) index_data: Vec<u8>,
}

impl EncryptedPak {
    /// Full manifest path of the pak file.
    pub fn name(&self) -> &str {
        &self.file.name
    }

    pub fn is_encrypted(&self) -> bool {
        self.footer.encrypted_index
    }
}

/// Ready downloader service over one build.
#[derive(Debug)]
pub struct ServiceState {
    inner: Arc<ServiceInner>,
    app_name: String,
    build_version: String,
}

impl ServiceState {
    /// Fetch both manifests from the default endpoints. The returned
    /// service is ready: every later operation works off parsed manifests.
    pub async fn new() -> Result<Self> {
        Self::with_config(ServiceConfig::default()).await
    }

    pub async fn with_config(config: ServiceConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.http.clone())
            .map_err(|e| WickError::Network(e.into()))?;

        let app_url = config.resolved_manifest_url();
        info!("fetching app manifest");
        let app: AppManifest = http.get_json(&app_url).await?;
        let element = app.select_element(&config.element_label())?;

        let chunk_base = match config.chunk_base.clone() {
            Some(base) => Some(base),
            None => Some(element.cloud_dir()?),
        };

        info!(
            "fetching chunk manifest for {} ({})",
            element.app_name, element.build_version
        );
        let manifest_url = element.manifest_url()?;
        let bytes = http.get_bytes(&manifest_url).await?;
        let text = std::str::from_utf8(&bytes).map_err(|_| WickError::InvalidManifest {
            message: "chunk manifest is not UTF-8".to_string(),
        })?;
        let manifest = ChunkManifest::parse(text)?;

        info!(
            "service ready: {} files, {} paks",
            manifest.file_names().len(),
            manifest.pak_names().len()
        );

        Ok(Self {
            app_name: element.app_name.clone(),
            build_version: element.build_version.clone(),
            inner: Arc::new(ServiceInner::new(http, manifest, chunk_base)),
        })
    }

    /// Build a service from already-fetched manifest documents. No network
    /// traffic happens until chunks are requested.
    pub fn from_manifests(app_json: &str, chunk_json: &str) -> Result<Self> {
        Self::from_manifests_with_config(ServiceConfig::default(), app_json, chunk_json)
    }

    pub fn from_manifests_with_config(
        config: ServiceConfig,
        app_json: &str,
        chunk_json: &str,
    ) -> Result<Self> {
        let http = HttpClient::with_config(config.http.clone())
            .map_err(|e| WickError::Network(e.into()))?;

        let app = AppManifest::parse(app_json)?;
        let element = app.select_element(&config.element_label())?;
        let chunk_base = config.chunk_base.clone().or_else(|| element.cloud_dir().ok());

        let manifest = ChunkManifest::parse(chunk_json)?;

        Ok(Self {
            app_name: element.app_name.clone(),
            build_version: element.build_version.clone(),
            inner: Arc::new(ServiceInner::new(http, manifest, chunk_base)),
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn build_version(&self) -> &str {
        &self.build_version
    }

    /// Pak file names of the build, manifest order.
    pub fn get_paks(&self) -> Vec<String> {
        self.inner.manifest().pak_names()
    }

    fn lookup(&self, name: &str) -> Result<FileManifest> {
        self.inner
            .manifest()
            .file(name)
            .cloned()
            .ok_or_else(|| WickError::PakNotFound {
                name: name.to_string(),
            })
    }

    /// Fetch a pak's footer and raw index without decrypting anything.
    pub async fn get_pak(&self, name: &str) -> Result<EncryptedPak> {
        let file = self.lookup(name)?;
        let total = file.total_size();
        if total < FOOTER_SIZE {
            return Err(WickError::InvalidPak {
                reason: format!("{} bytes is too small for a pak archive", total),
            });
        }

        let footer_bytes = self.inner.read_range(&file, total - FOOTER_SIZE, FOOTER_SIZE).await?;
        let footer = PakFooter::parse(&footer_bytes)?;

        let stored = footer.stored_index_size();
        let index_end = footer.index_offset.checked_add(stored);
        if stored == 0 || index_end.is_none() || index_end.unwrap_or(u64::MAX) > total {
            return Err(WickError::InvalidPak {
                reason: format!(
                    "index region {}+{} out of bounds for {} bytes",
                    footer.index_offset, stored, total
                ),
            });
        }

        debug!("fetched footer for {}; index is {} bytes", file.name, stored);
        let index_data = self.inner.read_range(&file, footer.index_offset, stored).await?;

        Ok(EncryptedPak {
            file,
            footer,
            index_data,
        })
    }

    /// Decrypt and parse a fetched pak's index, yielding a reader over its
    /// files. Consumes the pak.
    pub async fn decrypt_pak(&self, pak: EncryptedPak, key: &str) -> Result<PakService> {
        let key = parse_key(key)?;
        let EncryptedPak {
            file,
            footer,
            index_data,
        } = pak;

        let index = PakIndex::from_stored(&footer, index_data, &key)?;
        info!(
            "decrypted index of {}: {} files mounted at {}",
            file.name,
            index.len(),
            index.mount_point
        );

        Ok(PakService::new(
            Arc::clone(&self.inner),
            file,
            footer,
            index,
            key,
        ))
    }

    /// Stream a whole pak to disk, part by part.
    pub async fn download_pak<F>(
        &self,
        name: &str,
        target: &Path,
        progress: Option<F>,
    ) -> Result<()>
    where
        F: Fn(u64, u64),
    {
        let file = self.lookup(name)?;
        let total = file.total_size();

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut out = tokio::fs::File::create(target).await?;

        let mut written: u64 = 0;
        for part in &file.parts {
            let payload = self.inner.fetch_chunk_uncached(&part.guid).await?;

            let start = part.offset as usize;
            let end = start + part.size as usize;
            if end > payload.len() {
                return Err(WickError::InvalidChunk {
                    reason: format!(
                        "chunk {} payload of {} bytes does not cover {}..{}",
                        part.guid,
                        payload.len(),
                        start,
                        end
                    ),
                });
            }

            out.write_all(&payload[start..end]).await?;
            written += part.size;
            if let Some(ref callback) = progress {
                callback(written, total);
            }
        }

        out.flush().await?;
        info!("downloaded {} ({} bytes) to {}", file.name, written, target.display());
        Ok(())
    }
}
