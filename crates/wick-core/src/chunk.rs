//! Chunk payload decoding and byte-range planning.
//!
//! Files are stored on the CDN as chunks. Each chunk file carries a small
//! fixed header followed by the payload, which may be zlib-compressed.
//! Reading a byte range of a file means mapping the range onto the file's
//! ordered chunk parts and slicing the decoded payloads.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;

use crate::error::{Result, WickError};
use crate::manifest::ChunkPart;

pub const CHUNK_MAGIC: u32 = 0xB1FE_3AA2;
pub const CHUNK_HEADER_SIZE: usize = 41;

const STORED_COMPRESSED: u8 = 0x01;

/// Header of a chunk file as stored on the CDN.
#[derive(Debug, Clone)]
pub struct ChunkHeader {
    pub version: u32,
    pub header_size: u32,
    pub data_size: u32,
    pub guid: [u8; 16],
    pub rolling_hash: u64,
    pub stored_as: u8,
}

impl ChunkHeader {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CHUNK_HEADER_SIZE {
            return Err(WickError::InvalidChunk {
                reason: format!("{} bytes is too short for a chunk header", data.len()),
            });
        }

        let magic = LittleEndian::read_u32(&data[0..4]);
        if magic != CHUNK_MAGIC {
            return Err(WickError::InvalidChunk {
                reason: format!("bad magic 0x{:08X}", magic),
            });
        }

        let mut guid = [0u8; 16];
        guid.copy_from_slice(&data[16..32]);

        Ok(Self {
            version: LittleEndian::read_u32(&data[4..8]),
            header_size: LittleEndian::read_u32(&data[8..12]),
            data_size: LittleEndian::read_u32(&data[12..16]),
            guid,
            rolling_hash: LittleEndian::read_u64(&data[32..40]),
            stored_as: data[40],
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.stored_as & STORED_COMPRESSED != 0
    }
}

/// Decode a raw chunk file into its payload, inflating if needed.
pub fn decode_chunk(data: &[u8]) -> Result<Vec<u8>> {
    let header = ChunkHeader::parse(data)?;

    let start = header.header_size as usize;
    let end = start + header.data_size as usize;
    if start < CHUNK_HEADER_SIZE || end > data.len() {
        return Err(WickError::InvalidChunk {
            reason: format!(
                "payload range {}..{} out of bounds for {} bytes",
                start,
                end,
                data.len()
            ),
        });
    }
    let payload = &data[start..end];

    if header.is_compressed() {
        let mut decoder = ZlibDecoder::new(payload);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| WickError::InvalidChunk {
                reason: format!("zlib inflate failed: {}", e),
            })?;
        Ok(out)
    } else {
        Ok(payload.to_vec())
    }
}

/// One slice of the plan produced by [`plan_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSlice {
    /// Index into the part list the plan was built from.
    pub part_index: usize,
    /// Offset within the part's chunk payload.
    pub chunk_offset: u64,
    pub len: u64,
}

/// Map a byte range of a file onto its chunk parts.
///
/// Returns the minimal ordered list of payload slices covering
/// `[offset, offset + len)`. The range must lie within the file.
pub fn plan_range(parts: &[ChunkPart], offset: u64, len: u64) -> Result<Vec<RangeSlice>> {
    let total: u64 = parts.iter().map(|p| p.size).sum();
    let end = offset.checked_add(len).ok_or_else(|| WickError::InvalidPak {
        reason: "byte range overflows".to_string(),
    })?;
    if end > total {
        return Err(WickError::InvalidPak {
            reason: format!("range {}..{} exceeds file size {}", offset, end, total),
        });
    }

    let mut slices = Vec::new();
    if len == 0 {
        return Ok(slices);
    }

    let mut file_pos: u64 = 0;
    for (index, part) in parts.iter().enumerate() {
        let part_start = file_pos;
        let part_end = file_pos + part.size;
        file_pos = part_end;

        if part_end <= offset {
            continue;
        }
        if part_start >= end {
            break;
        }

        let slice_start = offset.max(part_start) - part_start;
        let slice_end = end.min(part_end) - part_start;
        slices.push(RangeSlice {
            part_index: index,
            chunk_offset: part.offset + slice_start,
            len: slice_end - slice_start,
        });
    }

    Ok(slices)
}
