//! Immutable alpha texture with a mip chain.
//!
//! Storage is either row-major (`Linear`) or Morton-Z tiled; Morton tiling
//! pads each mip to a square power-of-two footprint so the interleaved index
//! is always in range.

use glam::{IVec2, Vec2};

use crate::foundation::error::{OmmError, OmmResult};
use crate::foundation::math::{next_pow2, xy_to_morton};
use crate::texture::sampler::{AddressMode, TEXCOORD_BORDER, gather4};

/// Largest supported texture dimension per axis.
pub const MAX_DIM: u32 = 65536;

/// Physical layout of the texel storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TilingMode {
    /// Row-major rows.
    Linear,
    /// Morton (Z-order) interleaved.
    MortonZ,
}

/// Texel format of the source data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    /// One f32 alpha value per texel.
    Fp32,
}

/// Texture creation flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureFlags(pub u32);

impl TextureFlags {
    /// Store texels row-major instead of the default Morton-Z order.
    pub const DISABLE_Z_ORDER: Self = Self(1 << 0);

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// One mip level of source data.
#[derive(Clone, Copy, Debug)]
pub struct MipDesc<'a> {
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Row stride of `data` in texels; 0 means tightly packed (`width`).
    pub row_pitch: u32,
    /// Row-major texel data, `row_pitch * height` elements (at least).
    pub data: &'a [f32],
}

/// Texture creation descriptor.
#[derive(Clone, Copy, Debug)]
pub struct TextureDesc<'a> {
    /// Texel format.
    pub format: TextureFormat,
    /// Creation flags.
    pub flags: TextureFlags,
    /// Mip chain, most detailed first. At least one level.
    pub mips: &'a [MipDesc<'a>],
}

struct MipInfo {
    size: IVec2,
    rcp_size: Vec2,
    data_offset: usize,
    num_elements: usize,
}

/// Immutable alpha texture owned by a [`crate::Baker`].
pub struct Texture {
    mips: Vec<MipInfo>,
    tiling: TilingMode,
    data: Vec<f32>,
}

pub(crate) trait TilePath {
    const MODE: TilingMode;
    fn to_1d(coord: IVec2, size: IVec2) -> usize;
}

pub(crate) struct LinearTile;
pub(crate) struct MortonTile;

impl TilePath for LinearTile {
    const MODE: TilingMode = TilingMode::Linear;

    fn to_1d(coord: IVec2, size: IVec2) -> usize {
        coord.x as usize + coord.y as usize * size.x as usize
    }
}

impl TilePath for MortonTile {
    const MODE: TilingMode = TilingMode::MortonZ;

    fn to_1d(coord: IVec2, _size: IVec2) -> usize {
        xy_to_morton(coord.x as u32, coord.y as u32) as usize
    }
}

impl Texture {
    pub(crate) fn create(desc: &TextureDesc<'_>) -> OmmResult<Self> {
        Self::validate(desc)?;

        let tiling = if desc.flags.contains(TextureFlags::DISABLE_Z_ORDER) {
            TilingMode::Linear
        } else {
            TilingMode::MortonZ
        };

        let mut mips = Vec::with_capacity(desc.mips.len());
        let mut total = 0usize;
        for mip in desc.mips {
            let size = IVec2::new(mip.width as i32, mip.height as i32);
            let num_elements = match tiling {
                TilingMode::Linear => mip.width as usize * mip.height as usize,
                TilingMode::MortonZ => {
                    let dim = next_pow2(mip.width.max(mip.height)) as usize;
                    dim * dim
                }
            };
            mips.push(MipInfo {
                size,
                rcp_size: Vec2::ONE / size.as_vec2(),
                data_offset: total,
                num_elements,
            });
            total += num_elements;
        }

        let mut data = vec![0f32; total];
        for (mip, info) in desc.mips.iter().zip(&mips) {
            let row_pitch = (if mip.row_pitch == 0 { mip.width } else { mip.row_pitch }) as usize;
            let dst = &mut data[info.data_offset..info.data_offset + info.num_elements];
            match tiling {
                TilingMode::Linear => {
                    let w = mip.width as usize;
                    for y in 0..mip.height as usize {
                        dst[y * w..(y + 1) * w]
                            .copy_from_slice(&mip.data[y * row_pitch..y * row_pitch + w]);
                    }
                }
                TilingMode::MortonZ => {
                    for y in 0..mip.height as usize {
                        for x in 0..mip.width as usize {
                            let idx = xy_to_morton(x as u32, y as u32) as usize;
                            dst[idx] = mip.data[x + y * row_pitch];
                        }
                    }
                }
            }
        }

        Ok(Self { mips, tiling, data })
    }

    fn validate(desc: &TextureDesc<'_>) -> OmmResult<()> {
        if desc.mips.is_empty() {
            return Err(OmmError::invalid_argument("texture needs at least one mip"));
        }
        let TextureFormat::Fp32 = desc.format;
        for (i, mip) in desc.mips.iter().enumerate() {
            if mip.width == 0 || mip.height == 0 {
                return Err(OmmError::invalid_argument(format!("mip {i} has a zero dimension")));
            }
            if mip.width > MAX_DIM || mip.height > MAX_DIM {
                return Err(OmmError::invalid_argument(format!(
                    "mip {i} exceeds the {MAX_DIM} texel dimension limit"
                )));
            }
            let row_pitch = (if mip.row_pitch == 0 { mip.width } else { mip.row_pitch }) as usize;
            if row_pitch < mip.width as usize {
                return Err(OmmError::invalid_argument(format!("mip {i} row pitch below width")));
            }
            let needed = row_pitch * (mip.height as usize - 1) + mip.width as usize;
            if mip.data.len() < needed {
                return Err(OmmError::invalid_argument(format!(
                    "mip {i} data holds {} texels, needs {needed}",
                    mip.data.len()
                )));
            }
        }
        Ok(())
    }

    /// Storage layout chosen at creation.
    pub fn tiling(&self) -> TilingMode {
        self.tiling
    }

    /// Number of mip levels.
    pub fn mip_count(&self) -> usize {
        self.mips.len()
    }

    /// Dimensions of `mip` in texels.
    pub fn size(&self, mip: usize) -> IVec2 {
        self.mips[mip].size
    }

    /// `(1/w, 1/h)` of `mip`.
    pub fn rcp_size(&self, mip: usize) -> Vec2 {
        self.mips[mip].rcp_size
    }

    pub(crate) fn load<T: TilePath>(&self, coord: IVec2, mip: usize) -> f32 {
        debug_assert_eq!(T::MODE, self.tiling);
        let info = &self.mips[mip];
        self.data[info.data_offset + T::to_1d(coord, info.size)]
    }

    /// Load one texel of `mip` at an in-range coordinate.
    pub fn load_dyn(&self, coord: IVec2, mip: usize) -> f32 {
        match self.tiling {
            TilingMode::Linear => self.load::<LinearTile>(coord, mip),
            TilingMode::MortonZ => self.load::<MortonTile>(coord, mip),
        }
    }

    /// Remap `coord` with `mode` and load it, resolving border texels to
    /// `border_alpha`.
    pub(crate) fn fetch<T: TilePath>(
        &self,
        mode: AddressMode,
        border_alpha: f32,
        coord: IVec2,
        mip: usize,
    ) -> f32 {
        let c = crate::texture::sampler::remap(mode, coord, self.mips[mip].size);
        if c.x == TEXCOORD_BORDER || c.y == TEXCOORD_BORDER {
            border_alpha
        } else {
            self.load::<T>(c, mip)
        }
    }

    /// Bilinear fetch at a UV coordinate in `[0,1]^2` (values outside are
    /// resolved by the address mode).
    pub fn bilinear(&self, mode: AddressMode, border_alpha: f32, uv: Vec2, mip: usize) -> f32 {
        let info = &self.mips[mip];
        let pixel = uv * info.size.as_vec2() - 0.5;
        let floor = pixel.floor();
        let coords = gather4(mode, floor.as_ivec2(), info.size);

        let tap = |c: IVec2| {
            if c.x == TEXCOORD_BORDER || c.y == TEXCOORD_BORDER {
                border_alpha
            } else {
                self.load_dyn(c, mip)
            }
        };
        let (a, b, c, d) = (tap(coords[0]), tap(coords[1]), tap(coords[2]), tap(coords[3]));

        let w = pixel - floor;
        let ac = a + (b - a) * w.x;
        let bd = c + (d - c) * w.x;
        ac + (bd - ac) * w.y
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/store.rs"]
mod tests;
