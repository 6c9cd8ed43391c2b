//! The baker session object: owns textures, validates inputs, runs bakes.

use crate::bake::input::{BakeFlags, BakeInput, MAX_SUBDIVISION_LEVEL};
use crate::bake::pipeline;
use crate::foundation::error::{OmmError, OmmResult};
use crate::result::BakeResult;
use crate::texture::store::{Texture, TextureDesc};

/// Baker construction options.
#[derive(Clone, Copy, Debug)]
pub struct BakerDesc {
    /// Kept for API parity with GPU bakers; the CPU baker validates its
    /// inputs unconditionally.
    pub enable_validation: bool,
}

impl Default for BakerDesc {
    fn default() -> Self {
        Self { enable_validation: true }
    }
}

/// Handle to a texture owned by a [`Baker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// A handle that never resolves; useful as a placeholder in input
    /// structs before a real texture is assigned.
    pub const INVALID: Self = Self(u32::MAX);
}

/// A CPU opacity-micromap baker. Owns every texture created through it;
/// bakes are synchronous and read-only with respect to the baker.
pub struct Baker {
    textures: Vec<Option<Texture>>,
}

impl Baker {
    /// Create a baker.
    pub fn new(desc: &BakerDesc) -> OmmResult<Self> {
        let _ = desc.enable_validation;
        Ok(Self { textures: Vec::new() })
    }

    /// Upload an alpha texture, returning a handle for [`BakeInput::texture`].
    pub fn create_texture(&mut self, desc: &TextureDesc<'_>) -> OmmResult<TextureHandle> {
        let texture = Texture::create(desc)?;
        match self.textures.iter().position(Option::is_none) {
            Some(free) => {
                self.textures[free] = Some(texture);
                Ok(TextureHandle(free as u32))
            }
            None => {
                self.textures.push(Some(texture));
                Ok(TextureHandle(self.textures.len() as u32 - 1))
            }
        }
    }

    /// Release a texture. The handle (and any copy of it) becomes invalid.
    pub fn destroy_texture(&mut self, handle: TextureHandle) -> OmmResult<()> {
        let slot = self
            .textures
            .get_mut(handle.0 as usize)
            .ok_or_else(|| OmmError::invalid_argument("unknown texture handle"))?;
        if slot.take().is_none() {
            return Err(OmmError::invalid_argument("texture already destroyed"));
        }
        Ok(())
    }

    /// Borrow the texture behind a handle.
    pub fn texture(&self, handle: TextureHandle) -> OmmResult<&Texture> {
        self.textures
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| OmmError::invalid_argument("unknown texture handle"))
    }

    /// Bake opacity micromaps for every triangle of the input.
    #[tracing::instrument(skip_all)]
    pub fn bake(&self, input: &BakeInput<'_>) -> OmmResult<BakeResult> {
        self.validate_input(input)?;
        let texture = self.texture(input.texture)?;
        pipeline::bake(input, texture)
    }

    fn validate_input(&self, input: &BakeInput<'_>) -> OmmResult<()> {
        self.texture(input.texture)?;
        if input.indices.is_empty() {
            return Err(OmmError::invalid_argument("index buffer is empty"));
        }
        if input.tex_coords.is_empty() {
            return Err(OmmError::invalid_argument("tex coord buffer is empty"));
        }
        if input.max_subdivision_level > MAX_SUBDIVISION_LEVEL {
            return Err(OmmError::invalid_argument(format!(
                "max subdivision level {} exceeds {MAX_SUBDIVISION_LEVEL}",
                input.max_subdivision_level
            )));
        }
        if input.flags.contains(BakeFlags::ENABLE_AABB_TESTING)
            && !input.flags.contains(BakeFlags::DISABLE_LEVEL_LINE_INTERSECTION)
        {
            return Err(OmmError::invalid_argument(
                "AABB testing requires disabling level-line intersection",
            ));
        }

        let triangle_count = input.indices.len() / 3;
        if let Some(formats) = input.omm_formats
            && formats.len() < triangle_count
        {
            return Err(OmmError::invalid_argument("per-primitive format array too short"));
        }
        if let Some(levels) = input.subdivision_levels
            && levels.len() < triangle_count
        {
            return Err(OmmError::invalid_argument(
                "per-primitive subdivision level array too short",
            ));
        }
        Ok(())
    }
}
