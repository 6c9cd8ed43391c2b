//! Work-item construction: one work item per unique (UV triangle, level,
//! format) tuple, carrying the micro-triangle states for every source
//! primitive that shares it.

use glam::Vec2;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use xxhash_rust::xxh64::xxh64;

use crate::bake::input::{
    BakeInput, DISABLED_SUBDIVISION_LEVEL, MAX_SUBDIVISION_LEVEL, OmmFormat, SpecialIndex,
};
use crate::bake::pipeline::Options;
use crate::bake::state::OmmStates;
use crate::foundation::error::{OmmError, OmmResult};
use crate::foundation::math::f16_to_f32;
use crate::raster::Triangle;
use crate::texture::store::Texture;

const HASH_SEED: u64 = 42;

/// Where a work item ends up in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Consumes an array slot and a descriptor.
    Array,
    /// Merged away by a dedup pass; holds no primitives.
    Disabled,
    /// Uniformly classified; resolves to a special index, no array slot.
    Special(SpecialIndex),
}

pub(crate) struct OmmWorkItem {
    pub subdivision_level: u32,
    pub format: OmmFormat,
    pub uv_tri: Triangle,
    /// Source primitives sharing this OMM; grows through deduplication.
    pub primitive_indices: SmallVec<[u32; 2]>,
    pub states: OmmStates,
    pub slot: Slot,
    /// Descriptor index, assigned by the serializer.
    pub desc_offset: u32,
}

impl OmmWorkItem {
    pub(crate) fn new(
        format: OmmFormat,
        subdivision_level: u32,
        primitive: u32,
        uv_tri: Triangle,
    ) -> Self {
        let mut primitive_indices = SmallVec::new();
        primitive_indices.push(primitive);
        Self {
            subdivision_level,
            format,
            uv_tri,
            primitive_indices,
            states: OmmStates::new(subdivision_level),
            slot: Slot::Array,
            desc_offset: u32::MAX,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.slot == Slot::Array
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(bytes.get(offset..offset + 2)?.try_into().ok()?))
}

fn read_f32(bytes: &[u8], offset: usize) -> Option<f32> {
    Some(f32::from_le_bytes(bytes.get(offset..offset + 4)?.try_into().ok()?))
}

fn fetch_uv(input: &BakeInput<'_>, vertex: u32) -> OmmResult<Vec2> {
    let stride = if input.tex_coord_stride == 0 {
        input.tex_coord_format.size() as usize
    } else {
        input.tex_coord_stride as usize
    };
    let base = vertex as usize * stride;

    let oob = || OmmError::invalid_argument(format!("tex coord for vertex {vertex} out of range"));

    match input.tex_coord_format {
        crate::bake::input::TexCoordFormat::Uv16Unorm => {
            let u = read_u16(input.tex_coords, base).ok_or_else(oob)?;
            let v = read_u16(input.tex_coords, base + 2).ok_or_else(oob)?;
            Ok(Vec2::new(f32::from(u) / 65535.0, f32::from(v) / 65535.0))
        }
        crate::bake::input::TexCoordFormat::Uv16Float => {
            let u = read_u16(input.tex_coords, base).ok_or_else(oob)?;
            let v = read_u16(input.tex_coords, base + 2).ok_or_else(oob)?;
            Ok(Vec2::new(f16_to_f32(u), f16_to_f32(v)))
        }
        crate::bake::input::TexCoordFormat::Uv32Float => {
            let u = read_f32(input.tex_coords, base).ok_or_else(oob)?;
            let v = read_f32(input.tex_coords, base + 4).ok_or_else(oob)?;
            Ok(Vec2::new(u, v))
        }
    }
}

fn area(p0: Vec2, p1: Vec2, p2: Vec2) -> f32 {
    0.5 * (p1 - p0).perp_dot(p2 - p0).abs()
}

fn is_degenerate(t: &Triangle) -> bool {
    let any_bad = [t.p0, t.p1, t.p2]
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite());

    let n = t.signed_area_x2();
    any_bad || n * n < 1e-9
}

/// Pick the subdivision level that makes one micro-triangle cover roughly
/// `dynamic_subdivision_scale^2` texels: solves
/// `pixel_area / 4^level = scale^2` and clamps to the max level.
fn dynamic_subdivision_level(input: &BakeInput<'_>, uv_tri: &Triangle, tex_size: Vec2) -> u32 {
    let pixel_area = area(uv_tri.p0 * tex_size, uv_tri.p1 * tex_size, uv_tri.p2 * tex_size);
    let target_area = input.dynamic_subdivision_scale * input.dynamic_subdivision_scale;

    let ratio = (pixel_area / target_area).max(0.0).min(u64::MAX as f32) as u64;
    let log2_ratio = ratio.max(1).next_power_of_two().trailing_zeros();

    (log2_ratio >> 1).min(input.max_subdivision_level)
}

/// Subdivision level for primitive `i`, or the disabled sentinel.
fn subdivision_level_for_primitive(
    input: &BakeInput<'_>,
    i: usize,
    uv_tri: &Triangle,
    tex_size: Vec2,
) -> u32 {
    if let Some(levels) = input.subdivision_levels {
        let level = levels[i];
        if u32::from(level) <= MAX_SUBDIVISION_LEVEL {
            return u32::from(level);
        }
        if level == DISABLED_SUBDIVISION_LEVEL {
            return u32::from(level);
        }
    }

    if input.dynamic_subdivision_scale > 0.0 {
        dynamic_subdivision_level(input, uv_tri, tex_size)
    } else {
        input.max_subdivision_level
    }
}

fn reuse_key(uv_tri: &Triangle, level: u32, format: OmmFormat) -> u64 {
    let mut bytes = [0u8; 30];
    for (i, p) in [uv_tri.p0, uv_tri.p1, uv_tri.p2].iter().enumerate() {
        bytes[i * 8..i * 8 + 4].copy_from_slice(&p.x.to_le_bytes());
        bytes[i * 8 + 4..i * 8 + 8].copy_from_slice(&p.y.to_le_bytes());
    }
    bytes[24..28].copy_from_slice(&level.to_le_bytes());
    bytes[28..30].copy_from_slice(&format.to_u16().to_le_bytes());
    xxh64(&bytes, HASH_SEED)
}

/// Build the work-item list: one entry per unique (UVs, level, format)
/// tuple, unless duplicate detection is disabled. Degenerate and disabled
/// primitives get no work item and keep the default-fill index.
pub(crate) fn setup_work_items(
    input: &BakeInput<'_>,
    options: &Options,
    texture: &Texture,
) -> OmmResult<Vec<OmmWorkItem>> {
    let triangle_count = input.indices.len() / 3;
    let tex_size = texture.size(0).as_vec2();

    let mut by_key: FxHashMap<u64, u32> = FxHashMap::default();
    let mut work_items: Vec<OmmWorkItem> = Vec::with_capacity(triangle_count);

    for i in 0..triangle_count {
        let uv_tri = Triangle::new(
            fetch_uv(input, input.indices.get(3 * i))?,
            fetch_uv(input, input.indices.get(3 * i + 1))?,
            fetch_uv(input, input.indices.get(3 * i + 2))?,
        );

        let level = subdivision_level_for_primitive(input, i, &uv_tri, tex_size);

        if level == u32::from(DISABLED_SUBDIVISION_LEVEL) || is_degenerate(&uv_tri) {
            continue;
        }
        if level > MAX_SUBDIVISION_LEVEL {
            return Err(OmmError::invalid_argument(format!(
                "subdivision level {level} of primitive {i} exceeds {MAX_SUBDIVISION_LEVEL}"
            )));
        }

        let format = input
            .omm_formats
            .map_or(input.omm_format, |formats| formats[i]);

        let key = reuse_key(&uv_tri, level, format);
        let existing = if options.disable_duplicate_detection {
            None
        } else {
            by_key.get(&key).copied()
        };
        match existing {
            Some(existing) => {
                work_items[existing as usize].primitive_indices.push(i as u32);
            }
            None => {
                by_key.insert(key, work_items.len() as u32);
                work_items.push(OmmWorkItem::new(format, level, i as u32, uv_tri));
            }
        }
    }

    Ok(work_items)
}

/// Pre-flight guard against bakes that would rasterize an absurd number of
/// texels. The estimate deliberately uses mip 0 only.
pub(crate) fn validate_workload_size(
    options: &Options,
    texture: &Texture,
    work_items: &[OmmWorkItem],
) -> OmmResult<()> {
    if !options.enable_workload_validation {
        return Ok(());
    }

    const MAX_WORKLOAD_TEXELS: u64 = 1 << 27;

    let size = texture.size(0).as_vec2();
    let mut workload: u64 = 0;
    for item in work_items {
        let extent = (item.uv_tri.aabb_max - item.uv_tri.aabb_min) * size;
        workload += (extent.x as i64).max(0) as u64 * (extent.y as i64).max(0) as u64;
    }

    if workload > MAX_WORKLOAD_TEXELS {
        return Err(OmmError::workload_too_big(format!(
            "estimated workload of {workload} texels exceeds {MAX_WORKLOAD_TEXELS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bake/workitem.rs"]
mod tests;
