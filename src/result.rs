//! The owned output of a bake.

use crate::bake::input::SpecialIndex;

/// Storage width of the output index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexFormat {
    /// 16-bit entries.
    I16Uint,
    /// 32-bit entries.
    I32Uint,
}

/// One packed OMM in the array blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OmmDescriptor {
    /// Byte offset of the payload inside the array blob.
    pub offset: u32,
    /// Subdivision level of the payload.
    pub subdivision_level: u16,
    /// Wire value of the payload format (see [`crate::OmmFormat::to_u16`]).
    pub format: u16,
}

/// One histogram record: how many OMMs (or triangle references) exist for a
/// (format, subdivision level) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageRecord {
    /// Number of OMMs or references.
    pub count: u32,
    /// Subdivision level of the bucket.
    pub subdivision_level: u16,
    /// Wire value of the format of the bucket.
    pub format: u16,
}

/// Per-triangle OMM indices; entries are either a descriptor index or a
/// negative [`SpecialIndex`] sentinel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OmmIndexBuffer {
    /// Narrowed 16-bit storage.
    I16(Vec<i16>),
    /// 32-bit storage.
    I32(Vec<i32>),
}

impl OmmIndexBuffer {
    /// Storage format tag.
    pub fn format(&self) -> IndexFormat {
        match self {
            OmmIndexBuffer::I16(_) => IndexFormat::I16Uint,
            OmmIndexBuffer::I32(_) => IndexFormat::I32Uint,
        }
    }

    /// Number of entries (one per triangle).
    pub fn len(&self) -> usize {
        match self {
            OmmIndexBuffer::I16(v) => v.len(),
            OmmIndexBuffer::I32(v) => v.len(),
        }
    }

    /// Whether the buffer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry `i` widened to 32 bits.
    pub fn get(&self, i: usize) -> i32 {
        match self {
            OmmIndexBuffer::I16(v) => i32::from(v[i]),
            OmmIndexBuffer::I32(v) => v[i],
        }
    }
}

/// Everything a bake produces. Owns all buffers; dropping the value
/// releases them.
#[derive(Clone, Debug, PartialEq)]
pub struct BakeResult {
    /// Packed micro-triangle states, one payload per descriptor.
    pub omm_array_data: Vec<u8>,
    /// Descriptors into the array blob, ordered by non-increasing
    /// subdivision level.
    pub omm_desc_array: Vec<OmmDescriptor>,
    /// Per-triangle descriptor indices or special sentinels.
    pub omm_index_buffer: OmmIndexBuffer,
    /// Distinct OMMs per (format, level).
    pub omm_array_histogram: Vec<UsageRecord>,
    /// Triangle references per (format, level).
    pub omm_index_histogram: Vec<UsageRecord>,
}

impl BakeResult {
    /// Storage format of the index buffer.
    pub fn omm_index_format(&self) -> IndexFormat {
        self.omm_index_buffer.format()
    }
}

/// Default fill for triangles without a work item (degenerate or disabled).
pub(crate) const DEFAULT_FILL: SpecialIndex = SpecialIndex::FullyUnknownTransparent;
