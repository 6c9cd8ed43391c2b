//! ommbake is a CPU baker for opacity micromaps (OMMs).
//!
//! An OMM is a hierarchical opacity classification of a triangle against an
//! alpha texture, used by ray tracers to resolve most alpha-test hits without
//! invoking an any-hit shader. The baker is session-oriented:
//!
//! - Create a [`Baker`]
//! - Upload one or more alpha [`texture::Texture`]s through it
//! - Call [`Baker::bake`] with a [`BakeInput`] describing the mesh UVs
//! - Read the packed blob, descriptors, index buffer and histograms from the
//!   returned [`BakeResult`]
//!
//! Baking is synchronous; internal parallelism (enabled per bake with
//! [`BakeFlags::ENABLE_INTERNAL_THREADS`]) is invisible to the caller and
//! does not change any output bit.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod bake;
pub mod debug;
pub mod raster;
pub mod subdiv;
pub mod texture;

mod baker;
mod result;

pub use crate::bake::input::{
    AlphaMode, BakeFlags, BakeInput, IndexSlice, OmmFormat, SpecialIndex, TexCoordFormat,
    UnknownStatePromotion, MAX_SUBDIVISION_LEVEL,
};
pub use crate::bake::state::{OmmCoverage, OpacityState};
pub use crate::baker::{Baker, BakerDesc, TextureHandle};
pub use crate::foundation::error::{OmmError, OmmResult};
pub use crate::result::{BakeResult, IndexFormat, OmmDescriptor, OmmIndexBuffer, UsageRecord};
pub use crate::texture::store::{MipDesc, Texture, TextureDesc, TextureFlags, TextureFormat};
