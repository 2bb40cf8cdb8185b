//! Reader over a decrypted pak.

use std::sync::Arc;

use log::debug;

use super::state::ServiceInner;
use crate::error::{Result, WickError};
use crate::manifest::FileManifest;
use crate::pak::{PakFooter, PakIndex};

/// A decrypted pak: parsed index plus the machinery to fetch file data.
///
/// Created by [`ServiceState::decrypt_pak`](super::ServiceState::decrypt_pak).
/// Holds the AES key so entry payloads flagged as encrypted can be decoded
/// on demand.
#[derive(Debug)]
pub struct PakService {
    inner: Arc<ServiceInner>,
    file: FileManifest,
    footer: PakFooter,
    index: PakIndex,
    key: [u8; 32],
}

impl PakService {
    pub(crate) fn new(
        inner: Arc<ServiceInner>,
        file: FileManifest,
        footer: PakFooter,
        index: PakIndex,
        key: [u8; 32],
    ) -> Self {
        Self {
            inner,
            file,
            footer,
            index,
            key,
        }
    }

    /// Full manifest path of the pak file this reader came from.
    pub fn pak_name(&self) -> &str {
        &self.file.name
    }

    pub fn get_mount_point(&self) -> &str {
        &self.index.mount_point
    }

    /// File names stored in the pak, index order.
    pub fn get_files(&self) -> Vec<String> {
        self.index.file_names()
    }

    /// Alias of [`PakService::get_files`].
    pub fn get_file_names(&self) -> Vec<String> {
        self.get_files()
    }

    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    /// Fetch and decode one file's contents.
    pub async fn get_file_data(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.index.entry(name).ok_or_else(|| WickError::FileNotFound {
            name: name.to_string(),
        })?;

        let method = self.footer.method_name(entry.compression)?.map(str::to_string);
        let region_len = entry.header_size() + entry.stored_size();
        debug!("reading {} ({} bytes on disk)", name, region_len);

        let raw = self.inner.read_range(&self.file, entry.offset, region_len).await?;
        entry.decode_data(&raw, &self.key, method.as_deref())
    }
}
