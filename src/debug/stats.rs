//! Decode a bake result back into per-state totals.
//!
//! The counts weigh each OMM by how many triangles reference it, so they
//! describe what a ray tracer would actually observe. This is also the
//! unpacking counterpart of the serializer and is used by the round-trip
//! tests.

use crate::bake::input::SpecialIndex;
use crate::bake::state::OpacityState;
use crate::result::BakeResult;

/// Micro-triangle and special-index totals of one bake result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Opaque micro-triangles, summed over referencing triangles.
    pub total_opaque: u64,
    /// Transparent micro-triangles, summed over referencing triangles.
    pub total_transparent: u64,
    /// Unknown-opaque micro-triangles, summed over referencing triangles.
    pub total_unknown_opaque: u64,
    /// Unknown-transparent micro-triangles, summed over referencing triangles.
    pub total_unknown_transparent: u64,
    /// Triangles resolved to the fully-opaque sentinel.
    pub total_fully_opaque: u64,
    /// Triangles resolved to the fully-transparent sentinel.
    pub total_fully_transparent: u64,
    /// Triangles resolved to the fully-unknown-opaque sentinel.
    pub total_fully_unknown_opaque: u64,
    /// Triangles resolved to the fully-unknown-transparent sentinel.
    pub total_fully_unknown_transparent: u64,
}

/// State of micro-triangle `u_tri` of descriptor `desc_index`.
pub fn decode_state(result: &BakeResult, desc_index: usize, u_tri: u32) -> OpacityState {
    let desc = &result.omm_desc_array[desc_index];
    let payload = &result.omm_array_data[desc.offset as usize..];
    let is_2state = desc.format == 1;

    let (byte_index, shift, mask) = if is_2state {
        ((u_tri >> 3) as usize, u_tri & 7, 1)
    } else {
        ((u_tri >> 2) as usize, (u_tri & 3) << 1, 3)
    };
    OpacityState::from_u8((payload[byte_index] >> shift) & mask)
}

/// Tally a result.
pub fn collect(result: &BakeResult) -> Stats {
    let mut stats = Stats::default();

    // Per-descriptor totals first; triangles referencing the same OMM then
    // re-count it once per reference.
    let mut desc_totals = vec![[0u64; 4]; result.omm_desc_array.len()];
    for (i, desc) in result.omm_desc_array.iter().enumerate() {
        let num = 1u32 << (u32::from(desc.subdivision_level) << 1);
        for u_tri in 0..num {
            desc_totals[i][decode_state(result, i, u_tri) as usize] += 1;
        }
    }

    for i in 0..result.omm_index_buffer.len() {
        let index = result.omm_index_buffer.get(i);
        if index >= 0 {
            let totals = &desc_totals[index as usize];
            stats.total_transparent += totals[OpacityState::Transparent as usize];
            stats.total_opaque += totals[OpacityState::Opaque as usize];
            stats.total_unknown_transparent += totals[OpacityState::UnknownTransparent as usize];
            stats.total_unknown_opaque += totals[OpacityState::UnknownOpaque as usize];
        } else if index == SpecialIndex::FullyOpaque as i32 {
            stats.total_fully_opaque += 1;
        } else if index == SpecialIndex::FullyTransparent as i32 {
            stats.total_fully_transparent += 1;
        } else if index == SpecialIndex::FullyUnknownOpaque as i32 {
            stats.total_fully_unknown_opaque += 1;
        } else if index == SpecialIndex::FullyUnknownTransparent as i32 {
            stats.total_fully_unknown_transparent += 1;
        }
    }

    stats
}
