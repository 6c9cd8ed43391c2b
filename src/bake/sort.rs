//! Spatial ordering of work items for the serializer.
//!
//! Larger subdivision levels first (keeps array payloads aligned by size),
//! then Morton order of the UV centroid so nearby OMMs land in nearby cache
//! lines on the consumer. Special work items carry no payload and sink into
//! a stable group of their own.

use glam::IVec2;
use rayon::prelude::*;

use crate::bake::workitem::OmmWorkItem;
use crate::foundation::math::xy_to_morton;
use crate::texture::sampler::{AddressMode, remap};

/// Quantization bits per axis for the centroid Morton code.
const MORTON_BITS: u32 = 13;

fn sort_key(index: u32, item: &OmmWorkItem) -> (u64, u32) {
    if !item.is_active() {
        // Keep special and disabled items grouped, in index order.
        return ((1u64 << 63) | u64::from(index), index);
    }

    let q_size = IVec2::splat(1 << MORTON_BITS);
    let centroid = (item.uv_tri.p0 + item.uv_tri.p1 + item.uv_tri.p2) / 3.0;
    let q_uv = (q_size.as_vec2() * centroid).as_ivec2();
    let folded = remap(AddressMode::MirrorOnce, q_uv, q_size);
    let morton = xy_to_morton(folded.x as u32, folded.y as u32);

    let key = (u64::from(item.subdivision_level) << 60) | morton;
    (key, index)
}

/// Descending `(key, index)` pairs for every work item.
pub(crate) fn spatial_sort_keys(
    pool: Option<&rayon::ThreadPool>,
    work_items: &[OmmWorkItem],
) -> Vec<(u64, u32)> {
    let mut keys: Vec<(u64, u32)> = match pool {
        Some(pool) => pool.install(|| {
            work_items
                .par_iter()
                .enumerate()
                .map(|(i, item)| sort_key(i as u32, item))
                .collect()
        }),
        None => work_items
            .iter()
            .enumerate()
            .map(|(i, item)| sort_key(i as u32, item))
            .collect(),
    };

    // Descending by key; ties keep work-item order so equal OMMs serialize
    // in discovery order.
    keys.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    keys
}

#[cfg(test)]
#[path = "../../tests/unit/bake/sort.rs"]
mod tests;
