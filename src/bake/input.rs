//! Bake input description: mesh buffers, formats, sampler state and flags.

use crate::baker::TextureHandle;
use crate::texture::sampler::SamplerDesc;

/// Highest supported subdivision level (`4^12` micro-triangles).
pub const MAX_SUBDIVISION_LEVEL: u32 = 12;

/// Per-primitive subdivision level that disables the primitive entirely;
/// disabled primitives keep the default-fill special index.
pub const DISABLED_SUBDIVISION_LEVEL: u8 = 14;

/// Number of representable subdivision levels (0 through 12).
pub(crate) const NUM_SUBDIVISION_LEVELS: usize = MAX_SUBDIVISION_LEVEL as usize + 1;

/// Packed payload format of one OMM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OmmFormat {
    /// 1 bit per micro-triangle: opaque / transparent.
    OC1_2State,
    /// 2 bits per micro-triangle: adds unknown-transparent / unknown-opaque.
    OC1_4State,
}

impl OmmFormat {
    /// Wire value used in descriptors and histogram records.
    pub fn to_u16(self) -> u16 {
        match self {
            OmmFormat::OC1_2State => 1,
            OmmFormat::OC1_4State => 2,
        }
    }
}

/// Alpha interpretation of the source texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaMode {
    /// Classic alpha testing against a cutoff.
    Test,
}

/// How a mixed micro-triangle resolves between the two unknown states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownStatePromotion {
    /// Follow the majority of the coverage counters.
    #[default]
    Majority,
    /// Always promote to unknown-opaque.
    ForceOpaque,
    /// Always promote to unknown-transparent.
    ForceTransparent,
}

/// Negative sentinel values written into the output index buffer for
/// uniformly-classified triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum SpecialIndex {
    /// Every micro-triangle is opaque.
    FullyOpaque = -1,
    /// Every micro-triangle is transparent.
    FullyTransparent = -2,
    /// Every micro-triangle is unknown-opaque.
    FullyUnknownOpaque = -3,
    /// Every micro-triangle is unknown-transparent. Also the default fill
    /// for degenerate and disabled primitives.
    FullyUnknownTransparent = -4,
}

/// Triangle index buffer of the source mesh.
#[derive(Clone, Copy, Debug)]
pub enum IndexSlice<'a> {
    /// 16-bit indices.
    U16(&'a [u16]),
    /// 32-bit indices.
    U32(&'a [u32]),
}

impl IndexSlice<'_> {
    /// Total number of indices.
    pub fn len(&self) -> usize {
        match self {
            IndexSlice::U16(s) => s.len(),
            IndexSlice::U32(s) => s.len(),
        }
    }

    /// Whether the buffer holds no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn get(&self, i: usize) -> u32 {
        match self {
            IndexSlice::U16(s) => u32::from(s[i]),
            IndexSlice::U32(s) => s[i],
        }
    }
}

/// Encoding of the texture coordinate stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TexCoordFormat {
    /// Two 16-bit unsigned-normalized values.
    Uv16Unorm,
    /// Two IEEE half-precision floats.
    Uv16Float,
    /// Two f32 values.
    Uv32Float,
}

impl TexCoordFormat {
    /// Tightly-packed element size in bytes.
    pub fn size(self) -> u32 {
        match self {
            TexCoordFormat::Uv16Unorm | TexCoordFormat::Uv16Float => 4,
            TexCoordFormat::Uv32Float => 8,
        }
    }
}

/// Bake behaviour flags. Combine with `|`; defaults to no bits set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeFlags(pub u32);

impl BakeFlags {
    /// Classify work items and compute sort keys on a worker pool.
    pub const ENABLE_INTERNAL_THREADS: Self = Self(1 << 0);
    /// Never collapse uniform OMMs to special indices.
    pub const DISABLE_SPECIAL_INDICES: Self = Self(1 << 1);
    /// Keep the output index buffer 32-bit even when it would fit in 16.
    pub const FORCE_32BIT_INDICES: Self = Self(1 << 2);
    /// Skip exact and near-duplicate detection.
    pub const DISABLE_DUPLICATE_DETECTION: Self = Self(1 << 3);
    /// Run the LSH near-duplicate pass.
    pub const ENABLE_NEAR_DUPLICATE_DETECTION: Self = Self(1 << 4);
    /// Reject bakes whose texel workload is unreasonably large.
    pub const ENABLE_WORKLOAD_VALIDATION: Self = Self(1 << 5);
    /// Replace the precise bilinear kernel with the AABB-tested one.
    pub const ENABLE_AABB_TESTING: Self = Self(1 << 6);
    /// Keep OMMs that the rejection threshold would discard.
    pub const DISABLE_REMOVE_POOR_QUALITY_OMM: Self = Self(1 << 7);
    /// Fall back from the precise level-line bilinear kernel.
    pub const DISABLE_LEVEL_LINE_INTERSECTION: Self = Self(1 << 8);
    /// Use the windowed O(n^2) near-duplicate scan instead of LSH.
    pub const ENABLE_NEAR_DUPLICATE_DETECTION_BRUTE_FORCE: Self = Self(1 << 9);

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for BakeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Everything a single bake needs. Buffers are borrowed for the duration of
/// the call; the bake reads them exactly once.
#[derive(Clone, Copy, Debug)]
pub struct BakeInput<'a> {
    /// Alpha texture previously created through the same baker.
    pub texture: TextureHandle,
    /// Alpha interpretation.
    pub alpha_mode: AlphaMode,
    /// Alpha-test cutoff; a sample is opaque when `cutoff < alpha`.
    pub alpha_cutoff: f32,
    /// Runtime sampler the renderer will use; classification must match it.
    pub sampler: SamplerDesc,
    /// Triangle index buffer (three indices per triangle).
    pub indices: IndexSlice<'a>,
    /// Texture coordinate stream, indexed by the index buffer.
    pub tex_coords: &'a [u8],
    /// Encoding of `tex_coords`.
    pub tex_coord_format: TexCoordFormat,
    /// Byte stride between consecutive tex coords; 0 means tightly packed.
    pub tex_coord_stride: u32,
    /// Payload format for every primitive without an override.
    pub omm_format: OmmFormat,
    /// Optional per-primitive payload format overrides.
    pub omm_formats: Option<&'a [OmmFormat]>,
    /// Optional per-primitive subdivision levels. Values above 12 fall back
    /// to the dynamic/max path, except [`DISABLED_SUBDIVISION_LEVEL`].
    pub subdivision_levels: Option<&'a [u8]>,
    /// Upper bound for subdivision; must be at most 12.
    pub max_subdivision_level: u32,
    /// When positive, derive per-primitive levels so one micro-triangle
    /// covers roughly `scale^2` texels; 0 disables the heuristic.
    pub dynamic_subdivision_scale: f32,
    /// Unknown-state disambiguation rule.
    pub unknown_state_promotion: UnknownStatePromotion,
    /// Minimum fraction of known micro-triangles an OMM must reach, else it
    /// is replaced by FullyUnknownTransparent; 0 disables rejection.
    pub rejection_threshold: f32,
    /// Behaviour flags.
    pub flags: BakeFlags,
}

impl<'a> BakeInput<'a> {
    /// A bake input with defaults for everything except the buffers.
    pub fn new(
        texture: TextureHandle,
        indices: IndexSlice<'a>,
        tex_coords: &'a [u8],
        tex_coord_format: TexCoordFormat,
    ) -> Self {
        Self {
            texture,
            alpha_mode: AlphaMode::Test,
            alpha_cutoff: 0.5,
            sampler: SamplerDesc::default(),
            indices,
            tex_coords,
            tex_coord_format,
            tex_coord_stride: 0,
            omm_format: OmmFormat::OC1_4State,
            omm_formats: None,
            subdivision_levels: None,
            max_subdivision_level: 8,
            dynamic_subdivision_scale: 2.0,
            unknown_state_promotion: UnknownStatePromotion::default(),
            rejection_threshold: 0.0,
            flags: BakeFlags::default(),
        }
    }
}
