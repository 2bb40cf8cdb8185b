//! Chunk manifest: the build description the service operates on.
//!
//! Numeric fields arrive as blob strings (see [`blob`](super::blob)); the
//! raw serde model is converted into decoded types at parse time so the
//! rest of the crate never sees a blob.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use super::blob::{blob_to_u32, blob_to_u64};
use crate::error::{Result, WickError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawChunkManifest {
    #[serde(default)]
    #[allow(dead_code)]
    manifest_file_version: Option<String>,
    app_name_string: String,
    build_version_string: String,
    file_manifest_list: Vec<RawFileManifest>,
    #[serde(default)]
    chunk_hash_list: IndexMap<String, String>,
    #[serde(default)]
    data_group_list: IndexMap<String, String>,
    #[serde(default)]
    chunk_filesize_list: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFileManifest {
    filename: String,
    #[serde(default)]
    file_hash: String,
    file_chunk_parts: Vec<RawChunkPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawChunkPart {
    guid: String,
    offset: String,
    size: String,
}

/// A contiguous slice of a chunk payload belonging to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPart {
    pub guid: String,
    /// Offset of this part within the chunk's decoded payload.
    pub offset: u64,
    pub size: u64,
}

/// One file of the build, as an ordered run of chunk parts.
#[derive(Debug, Clone)]
pub struct FileManifest {
    pub name: String,
    pub hash: String,
    pub parts: Vec<ChunkPart>,
}

impl FileManifest {
    /// Size of the file, the sum of its part sizes.
    pub fn total_size(&self) -> u64 {
        self.parts.iter().map(|p| p.size).sum()
    }
}

/// Download metadata for one chunk.
#[derive(Debug, Clone, Copy)]
pub struct ChunkInfo {
    pub hash: u64,
    pub group: u32,
    pub file_size: Option<u64>,
}

/// Parsed chunk manifest.
#[derive(Debug, Clone)]
pub struct ChunkManifest {
    pub app_name: String,
    pub build_version: String,
    files: IndexMap<String, FileManifest>,
    chunks: HashMap<String, ChunkInfo>,
}

impl ChunkManifest {
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawChunkManifest = serde_json::from_str(json)?;

        let mut chunks = HashMap::with_capacity(raw.chunk_hash_list.len());
        for (guid, hash_blob) in &raw.chunk_hash_list {
            let guid = guid.to_uppercase();
            let hash = blob_to_u64(hash_blob)?;
            let group = match raw.data_group_list.get(guid.as_str()) {
                Some(blob) => blob_to_u32(blob)?,
                None => match raw.data_group_list.iter().find(|(g, _)| g.to_uppercase() == guid) {
                    Some((_, blob)) => blob_to_u32(blob)?,
                    None => 0,
                },
            };
            let file_size = match raw.chunk_filesize_list.get(guid.as_str()) {
                Some(blob) => Some(blob_to_u64(blob)?),
                None => None,
            };
            chunks.insert(guid, ChunkInfo { hash, group, file_size });
        }

        let mut files = IndexMap::with_capacity(raw.file_manifest_list.len());
        for raw_file in raw.file_manifest_list {
            let mut parts = Vec::with_capacity(raw_file.file_chunk_parts.len());
            for raw_part in raw_file.file_chunk_parts {
                parts.push(ChunkPart {
                    guid: raw_part.guid.to_uppercase(),
                    offset: blob_to_u64(&raw_part.offset)?,
                    size: blob_to_u64(&raw_part.size)?,
                });
            }
            let file = FileManifest {
                name: raw_file.filename.clone(),
                hash: raw_file.file_hash,
                parts,
            };
            files.insert(raw_file.filename, file);
        }

        Ok(Self {
            app_name: raw.app_name_string,
            build_version: raw.build_version_string,
            files,
            chunks,
        })
    }

    /// Pak file names, manifest order, path stripped.
    pub fn pak_names(&self) -> Vec<String> {
        self.files
            .keys()
            .filter(|name| name.ends_with(".pak"))
            .map(|name| basename(name).to_string())
            .collect()
    }

    /// All file names of the build, manifest order.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Look up a file by full manifest path or by bare file name.
    pub fn file(&self, name: &str) -> Option<&FileManifest> {
        if let Some(file) = self.files.get(name) {
            return Some(file);
        }
        self.files.values().find(|f| basename(&f.name) == name)
    }

    pub fn chunk_info(&self, guid: &str) -> Option<&ChunkInfo> {
        self.chunks.get(guid)
    }

    /// CDN path of a chunk relative to the cloud directory, e.g.
    /// `ChunksV3/05/8D14B...E1_A76EAD...2C.chunk`.
    pub fn chunk_path(&self, guid: &str) -> Result<String> {
        let info = self.chunks.get(guid).ok_or_else(|| WickError::ChunkNotFound {
            guid: guid.to_string(),
        })?;
        Ok(format!(
            "ChunksV3/{:02}/{:016X}_{}.chunk",
            info.group, info.hash, guid
        ))
    }
}

fn basename(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK_JSON: &str = r#"{
        "ManifestFileVersion": "013000000000",
        "AppNameString": "FortniteGame",
        "BuildVersionString": "++Fortnite+Release-12.41",
        "FileManifestList": [
            {
                "Filename": "FortniteGame/Content/Paks/pakchunk0-WindowsClient.pak",
                "FileHash": "00a1b2",
                "FileChunkParts": [
                    {"Guid": "AAAA0000AAAA0000AAAA0000AAAA0000", "Offset": "000000000000000000000000", "Size": "000001000000000000000000"},
                    {"Guid": "BBBB0000BBBB0000BBBB0000BBBB0000", "Offset": "128000000000000000000000", "Size": "064000000000000000000000"}
                ]
            },
            {
                "Filename": "FortniteGame/Content/Paks/pakchunk0-WindowsClient.sig",
                "FileHash": "00c3d4",
                "FileChunkParts": [
                    {"Guid": "BBBB0000BBBB0000BBBB0000BBBB0000", "Offset": "000000000000000000000000", "Size": "128000000000000000000000"}
                ]
            }
        ],
        "ChunkHashList": {
            "AAAA0000AAAA0000AAAA0000AAAA0000": "016000000000000000000000",
            "BBBB0000BBBB0000BBBB0000BBBB0000": "255255000000000000000000"
        },
        "DataGroupList": {
            "AAAA0000AAAA0000AAAA0000AAAA0000": "005",
            "BBBB0000BBBB0000BBBB0000BBBB0000": "017"
        },
        "ChunkFilesizeList": {
            "AAAA0000AAAA0000AAAA0000AAAA0000": "000004000000000000000000"
        }
    }"#;

    #[test]
    fn test_parse_basics() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        assert_eq!(manifest.app_name, "FortniteGame");
        assert_eq!(manifest.build_version, "++Fortnite+Release-12.41");
        assert_eq!(manifest.file_names().len(), 2);
    }

    #[test]
    fn test_pak_names_order_and_filter() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        // Only the .pak entry, path stripped, manifest order preserved
        assert_eq!(manifest.pak_names(), vec!["pakchunk0-WindowsClient.pak"]);
    }

    #[test]
    fn test_file_lookup_by_basename() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        let file = manifest.file("pakchunk0-WindowsClient.pak").unwrap();
        assert_eq!(file.name, "FortniteGame/Content/Paks/pakchunk0-WindowsClient.pak");
        // 256 + 64 bytes from the two parts
        assert_eq!(file.total_size(), 256 + 64);
        assert_eq!(file.parts[1].offset, 128);
    }

    #[test]
    fn test_file_lookup_by_full_path() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        assert!(manifest
            .file("FortniteGame/Content/Paks/pakchunk0-WindowsClient.sig")
            .is_some());
        assert!(manifest.file("nope.pak").is_none());
    }

    #[test]
    fn test_chunk_path() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        // hash 16, group 5
        assert_eq!(
            manifest
                .chunk_path("AAAA0000AAAA0000AAAA0000AAAA0000")
                .unwrap(),
            "ChunksV3/05/0000000000000010_AAAA0000AAAA0000AAAA0000AAAA0000.chunk"
        );
        // hash 0xFFFF, group 17
        assert_eq!(
            manifest
                .chunk_path("BBBB0000BBBB0000BBBB0000BBBB0000")
                .unwrap(),
            "ChunksV3/17/000000000000FFFF_BBBB0000BBBB0000BBBB0000BBBB0000.chunk"
        );
    }

    #[test]
    fn test_chunk_path_unknown_guid() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        let err = manifest.chunk_path("CCCC0000CCCC0000CCCC0000CCCC0000").unwrap_err();
        assert!(matches!(err, WickError::ChunkNotFound { .. }));
    }

    #[test]
    fn test_chunk_file_size_optional() {
        let manifest = ChunkManifest::parse(CHUNK_JSON).unwrap();
        let a = manifest.chunk_info("AAAA0000AAAA0000AAAA0000AAAA0000").unwrap();
        assert_eq!(a.file_size, Some(1 << 10));
        let b = manifest.chunk_info("BBBB0000BBBB0000BBBB0000BBBB0000").unwrap();
        assert!(b.file_size.is_none());
    }

    #[test]
    fn test_bad_blob_rejected() {
        let json = CHUNK_JSON.replace("128000000000000000000000", "9x8");
        assert!(ChunkManifest::parse(&json).is_err());
    }
}
