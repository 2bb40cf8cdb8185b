//! Launcher manifest model.
//!
//! The service consumes two JSON documents: the *app manifest* returned by
//! the launcher endpoint (which element to install and where its build
//! manifest lives) and the *chunk manifest* describing every file of the
//! build as an ordered list of chunk parts.

mod app;
mod blob;
mod chunk;

pub use app::{AppElement, AppManifest, ManifestLocation, QueryParam};
pub use blob::{blob_to_u32, blob_to_u64};
pub use chunk::{ChunkInfo, ChunkManifest, ChunkPart, FileManifest};
