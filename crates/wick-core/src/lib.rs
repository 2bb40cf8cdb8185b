pub mod chunk;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod manifest;
pub mod pak;
pub mod service;

pub use config::ServiceConfig;
pub use downloader::WickDownloader;
pub use error::{Result, WickError};
pub use http::{HttpClient, HttpClientConfig};
pub use manifest::{AppManifest, ChunkManifest, FileManifest};
pub use pak::{PakEntry, PakFooter, PakIndex};
pub use service::{EncryptedPak, PakService, ServiceState};
