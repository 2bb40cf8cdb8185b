//! Pak footer and index parsing.
//!
//! Layout handled here:
//! - Footer, fixed size at the end of the archive: 16-byte encryption key
//!   guid, encrypted-index flag, magic, version, index offset, index size,
//!   20-byte SHA-1 of the plaintext index, five 32-byte compression method
//!   name slots.
//! - Index: mount point string, entry count, then name + record per entry.
//!   Strings are i32-length-prefixed and NUL-terminated; a negative length
//!   marks UTF-16 data, which is not supported.
//! - Each entry's payload on disk is preceded by a copy of its record
//!   (without the name); [`PakEntry::header_size`] accounts for it.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use sha1::{Digest, Sha1};

use super::crypto::{self, align_to_block};
use crate::error::{Result, WickError};

pub const PAK_MAGIC: u32 = 0x5A6F_12E1;
pub const PAK_VERSION: u32 = 8;

const COMPRESSION_NAME_COUNT: usize = 5;
const COMPRESSION_NAME_LEN: usize = 32;

/// Size of the footer trailer in bytes.
pub const FOOTER_SIZE: u64 =
    (16 + 1 + 4 + 4 + 8 + 8 + 20 + COMPRESSION_NAME_COUNT * COMPRESSION_NAME_LEN) as u64;

const FLAG_ENCRYPTED: u8 = 0x01;

/// Parsed pak footer.
#[derive(Debug, Clone)]
pub struct PakFooter {
    pub key_guid: [u8; 16],
    pub encrypted_index: bool,
    pub version: u32,
    pub index_offset: u64,
    pub index_size: u64,
    pub index_hash: [u8; 20],
    /// Names from the non-empty compression method slots, slot order.
    pub compression_methods: Vec<String>,
}

impl PakFooter {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != FOOTER_SIZE as usize {
            return Err(WickError::InvalidPak {
                reason: format!("footer must be {} bytes, got {}", FOOTER_SIZE, data.len()),
            });
        }

        let mut cursor = Cursor::new(data);

        let mut key_guid = [0u8; 16];
        cursor.read_exact(&mut key_guid)?;
        let encrypted_index = cursor.read_u8()? != 0;

        let magic = cursor.read_u32::<LittleEndian>()?;
        if magic != PAK_MAGIC {
            return Err(WickError::InvalidPak {
                reason: format!("bad footer magic 0x{:08X}", magic),
            });
        }

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != PAK_VERSION {
            return Err(WickError::InvalidPak {
                reason: format!("unsupported pak version {}", version),
            });
        }

        let index_offset = cursor.read_u64::<LittleEndian>()?;
        let index_size = cursor.read_u64::<LittleEndian>()?;
        let mut index_hash = [0u8; 20];
        cursor.read_exact(&mut index_hash)?;

        let mut compression_methods = Vec::new();
        for _ in 0..COMPRESSION_NAME_COUNT {
            let mut slot = [0u8; COMPRESSION_NAME_LEN];
            cursor.read_exact(&mut slot)?;
            let end = slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
            if end > 0 {
                let name = std::str::from_utf8(&slot[..end]).map_err(|_| WickError::InvalidPak {
                    reason: "compression method name is not UTF-8".to_string(),
                })?;
                compression_methods.push(name.to_string());
            }
        }

        Ok(Self {
            key_guid,
            encrypted_index,
            version,
            index_offset,
            index_size,
            index_hash,
            compression_methods,
        })
    }

    /// Bytes the index occupies on disk (block-aligned when encrypted).
    pub fn stored_index_size(&self) -> u64 {
        if self.encrypted_index {
            align_to_block(self.index_size)
        } else {
            self.index_size
        }
    }

    /// Resolve an entry's compression method index to a name.
    ///
    /// `0` means uncompressed; other values are 1-based slot indexes.
    pub fn method_name(&self, index: u32) -> Result<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.compression_methods
            .get(index as usize - 1)
            .map(|name| Some(name.as_str()))
            .ok_or_else(|| WickError::InvalidPak {
                reason: format!("compression method index {} out of range", index),
            })
    }
}

/// One file entry of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Offset of the entry's on-disk region within the archive.
    pub offset: u64,
    /// Stored payload size, before block alignment.
    pub size: u64,
    pub uncompressed_size: u64,
    /// 0 = none, otherwise a 1-based index into the footer method slots.
    pub compression: u32,
    /// SHA-1 of the decoded payload.
    pub hash: [u8; 20],
    /// Compression block ranges, relative to the payload start.
    pub blocks: Vec<(u64, u64)>,
    pub encrypted: bool,
    pub block_size: u32,
}

impl PakEntry {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let offset = cursor.read_u64::<LittleEndian>()?;
        let size = cursor.read_u64::<LittleEndian>()?;
        let uncompressed_size = cursor.read_u64::<LittleEndian>()?;
        let compression = cursor.read_u32::<LittleEndian>()?;
        let mut hash = [0u8; 20];
        cursor.read_exact(&mut hash)?;

        let mut blocks = Vec::new();
        if compression != 0 {
            let block_count = cursor.read_u32::<LittleEndian>()?;
            if block_count as u64 > (cursor.get_ref().len() as u64) / 16 {
                return Err(WickError::InvalidPak {
                    reason: format!("implausible compression block count {}", block_count),
                });
            }
            for _ in 0..block_count {
                let start = cursor.read_u64::<LittleEndian>()?;
                let end = cursor.read_u64::<LittleEndian>()?;
                blocks.push((start, end));
            }
        }

        let flags = cursor.read_u8()?;
        let block_size = cursor.read_u32::<LittleEndian>()?;

        Ok(Self {
            offset,
            size,
            uncompressed_size,
            compression,
            hash,
            blocks,
            encrypted: flags & FLAG_ENCRYPTED != 0,
            block_size,
        })
    }

    /// Serialized size of the record copy preceding the payload on disk.
    pub fn header_size(&self) -> u64 {
        let mut size = 8 + 8 + 8 + 4 + 20 + 1 + 4;
        if self.compression != 0 {
            size += 4 + 16 * self.blocks.len() as u64;
        }
        size
    }

    /// Bytes the payload occupies on disk (block-aligned when encrypted).
    pub fn stored_size(&self) -> u64 {
        if self.encrypted {
            align_to_block(self.size)
        } else {
            self.size
        }
    }

    /// Decode the entry's on-disk region into the file's bytes.
    ///
    /// `raw` must hold the full region starting at [`PakEntry::offset`]:
    /// the record copy followed by the stored payload. `method` is the
    /// resolved compression method name from the footer.
    pub fn decode_data(
        &self,
        raw: &[u8],
        key: &[u8; 32],
        method: Option<&str>,
    ) -> Result<Vec<u8>> {
        let header = self.header_size() as usize;
        let stored = self.stored_size() as usize;
        if raw.len() < header + stored {
            return Err(WickError::InvalidPak {
                reason: format!(
                    "entry region of {} bytes is shorter than {}",
                    raw.len(),
                    header + stored
                ),
            });
        }

        let mut payload = raw[header..header + stored].to_vec();
        if self.encrypted {
            crypto::decrypt_in_place(&mut payload, key)?;
            payload.truncate(self.size as usize);
        }

        let data = match method {
            None => {
                if self.compression != 0 {
                    return Err(WickError::InvalidPak {
                        reason: "compressed entry without a method name".to_string(),
                    });
                }
                payload
            }
            Some(name) if name.eq_ignore_ascii_case("zlib") => self.inflate_blocks(&payload)?,
            Some(name) => {
                return Err(WickError::InvalidPak {
                    reason: format!("unsupported compression method '{}'", name),
                });
            }
        };

        if data.len() as u64 != self.uncompressed_size {
            return Err(WickError::InvalidPak {
                reason: format!(
                    "decoded {} bytes, expected {}",
                    data.len(),
                    self.uncompressed_size
                ),
            });
        }

        let digest = Sha1::digest(&data);
        if digest.as_slice() != self.hash {
            return Err(WickError::ChecksumMismatch {
                context: "pak entry payload".to_string(),
            });
        }

        Ok(data)
    }

    fn inflate_blocks(&self, payload: &[u8]) -> Result<Vec<u8>> {
        use flate2::read::ZlibDecoder;

        let mut out = Vec::with_capacity(self.uncompressed_size as usize);
        for (start, end) in &self.blocks {
            let (start, end) = (*start as usize, *end as usize);
            if start > end || end > payload.len() {
                return Err(WickError::InvalidPak {
                    reason: format!("compression block {}..{} out of bounds", start, end),
                });
            }
            let mut decoder = ZlibDecoder::new(&payload[start..end]);
            decoder
                .read_to_end(&mut out)
                .map_err(|e| WickError::InvalidPak {
                    reason: format!("zlib inflate failed: {}", e),
                })?;
        }
        Ok(out)
    }
}

/// Parsed pak index.
#[derive(Debug, Clone)]
pub struct PakIndex {
    pub mount_point: String,
    entries: IndexMap<String, PakEntry>,
}

impl PakIndex {
    /// Decrypt (when flagged), verify and parse an index region.
    ///
    /// `data` is the stored index as read from the archive. The SHA-1 in
    /// the footer covers the plaintext index, so a wrong key surfaces as
    /// [`WickError::ChecksumMismatch`] here.
    pub fn from_stored(footer: &PakFooter, mut data: Vec<u8>, key: &[u8; 32]) -> Result<Self> {
        if data.len() as u64 != footer.stored_index_size() {
            return Err(WickError::InvalidPak {
                reason: format!(
                    "index region of {} bytes, footer says {}",
                    data.len(),
                    footer.stored_index_size()
                ),
            });
        }

        if footer.encrypted_index {
            crypto::decrypt_in_place(&mut data, key)?;
            data.truncate(footer.index_size as usize);
        }

        let digest = Sha1::digest(&data);
        if digest.as_slice() != footer.index_hash {
            return Err(WickError::ChecksumMismatch {
                context: "pak index".to_string(),
            });
        }

        Self::parse(&data)
    }

    /// Parse a plaintext index.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mount_point = read_string(&mut cursor)?;
        let count = cursor.read_u32::<LittleEndian>()?;
        if count as usize > data.len() {
            return Err(WickError::InvalidPak {
                reason: format!("implausible entry count {}", count),
            });
        }

        let mut entries = IndexMap::with_capacity(count as usize);
        for _ in 0..count {
            let name = read_string(&mut cursor)?;
            let entry = PakEntry::read(&mut cursor)?;
            entries.insert(name, entry);
        }

        Ok(Self { mount_point, entries })
    }

    /// File names in index order.
    pub fn file_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entry(&self, name: &str) -> Option<&PakEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read an i32-length-prefixed, NUL-terminated string.
fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let len = cursor.read_i32::<LittleEndian>()?;
    if len < 0 {
        return Err(WickError::InvalidPak {
            reason: "UTF-16 strings are not supported".to_string(),
        });
    }
    if len == 0 {
        return Ok(String::new());
    }
    if len as u64 > cursor.get_ref().len() as u64 {
        return Err(WickError::InvalidPak {
            reason: format!("implausible string length {}", len),
        });
    }

    let mut bytes = vec![0u8; len as usize];
    cursor.read_exact(&mut bytes)?;
    if bytes.pop() != Some(0) {
        return Err(WickError::InvalidPak {
            reason: "string is not NUL-terminated".to_string(),
        });
    }

    String::from_utf8(bytes).map_err(|_| WickError::InvalidPak {
        reason: "string is not UTF-8".to_string(),
    })
}
