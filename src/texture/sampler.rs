//! Texture addressing: integer texel remapping for the five address modes,
//! plus the 2x2 gather used by bilinear fetches.
//!
//! `Border` does not remap; it flags the coordinate with [`TEXCOORD_BORDER`]
//! and the sampler substitutes the border alpha at load time.

use glam::IVec2;

/// Sentinel written into a texel coordinate that fell outside the texture
/// under [`AddressMode::Border`].
pub const TEXCOORD_BORDER: i32 = 0x7FFF_FFFE;

/// How out-of-range texel coordinates are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressMode {
    /// Repeat the texture in both directions.
    Wrap,
    /// Repeat, flipping every other tile.
    Mirror,
    /// Clamp to the edge texel.
    Clamp,
    /// Out-of-range texels read as the sampler's border alpha.
    Border,
    /// Mirror about zero once, then clamp.
    MirrorOnce,
}

/// Texture filtering used during classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Point sampling.
    Nearest,
    /// Bilinear interpolation of the four surrounding texels.
    Linear,
}

/// Runtime sampler state for a bake.
#[derive(Clone, Copy, Debug)]
pub struct SamplerDesc {
    /// Address mode applied on both axes.
    pub address_mode: AddressMode,
    /// Filter mode.
    pub filter: FilterMode,
    /// Alpha value substituted for border texels.
    pub border_alpha: f32,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            address_mode: AddressMode::Clamp,
            filter: FilterMode::Linear,
            border_alpha: 1.0,
        }
    }
}

/// Fold a coordinate across zero the way hardware mirroring does:
/// -1 maps to 0, -2 to 1, and so on.
fn mirror_fold(c: i32) -> i32 {
    if c < 0 { -c - 1 } else { c }
}

/// Remap an integer texel coordinate into `[0, size)` according to `mode`.
///
/// `Border` returns [`TEXCOORD_BORDER`] per out-of-range axis instead of
/// remapping.
pub fn remap(mode: AddressMode, coord: IVec2, size: IVec2) -> IVec2 {
    match mode {
        AddressMode::Wrap => coord.rem_euclid(size),
        AddressMode::Mirror => {
            let folded = IVec2::new(mirror_fold(coord.x), mirror_fold(coord.y));
            let flipped = (folded / size).rem_euclid(IVec2::splat(2));
            let wrapped = folded.rem_euclid(size);
            IVec2::new(
                if flipped.x == 1 { size.x - wrapped.x - 1 } else { wrapped.x },
                if flipped.y == 1 { size.y - wrapped.y - 1 } else { wrapped.y },
            )
        }
        AddressMode::Clamp => coord.clamp(IVec2::ZERO, size - 1),
        AddressMode::Border => IVec2::new(
            if coord.x < 0 || coord.x >= size.x { TEXCOORD_BORDER } else { coord.x },
            if coord.y < 0 || coord.y >= size.y { TEXCOORD_BORDER } else { coord.y },
        ),
        AddressMode::MirrorOnce => IVec2::new(
            mirror_fold(coord.x).clamp(0, size.x - 1),
            mirror_fold(coord.y).clamp(0, size.y - 1),
        ),
    }
}

/// The four texel coordinates of the bilinear footprint anchored at `coord`,
/// in (0,0), (1,0), (0,1), (1,1) order, each remapped by `mode`.
pub fn gather4(mode: AddressMode, coord: IVec2, size: IVec2) -> [IVec2; 4] {
    let o = remap(mode, coord, size);
    let o11 = remap(mode, coord + IVec2::ONE, size);
    [
        IVec2::new(o.x, o.y),
        IVec2::new(o11.x, o.y),
        IVec2::new(o.x, o11.y),
        IVec2::new(o11.x, o11.y),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/texture/sampler.rs"]
mod tests;
