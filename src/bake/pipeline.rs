//! Bake orchestration: flag parsing, the (tiling, address, filter) dispatch
//! and the fixed stage sequence.

use crate::bake::dedup::{deduplicate_exact, deduplicate_similar_brute_force, deduplicate_similar_lsh};
use crate::bake::histogram::build_histograms;
use crate::bake::input::{BakeFlags, BakeInput};
use crate::bake::resample::resample;
use crate::bake::serialize::serialize;
use crate::bake::sort::spatial_sort_keys;
use crate::bake::state::OpacityState;
use crate::bake::workitem::{OmmWorkItem, Slot, setup_work_items, validate_workload_size};
use crate::foundation::error::OmmResult;
use crate::result::BakeResult;
use crate::subdiv::bird;
use crate::texture::sampler::{AddressMode, FilterMode};
use crate::texture::store::{LinearTile, MortonTile, Texture, TilePath, TilingMode};

/// Flag set unpacked into plain booleans for the stages.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Options {
    pub enable_internal_threads: bool,
    pub disable_special_indices: bool,
    pub force_32bit_indices: bool,
    pub disable_duplicate_detection: bool,
    pub enable_near_duplicate_detection: bool,
    pub enable_workload_validation: bool,
    pub enable_aabb_testing: bool,
    pub disable_remove_poor_quality_omm: bool,
    pub disable_level_line_intersection: bool,
    pub enable_near_duplicate_detection_brute_force: bool,
}

impl Options {
    pub(crate) fn new(flags: BakeFlags) -> Self {
        Self {
            enable_internal_threads: flags.contains(BakeFlags::ENABLE_INTERNAL_THREADS),
            disable_special_indices: flags.contains(BakeFlags::DISABLE_SPECIAL_INDICES),
            force_32bit_indices: flags.contains(BakeFlags::FORCE_32BIT_INDICES),
            disable_duplicate_detection: flags.contains(BakeFlags::DISABLE_DUPLICATE_DETECTION),
            enable_near_duplicate_detection: flags
                .contains(BakeFlags::ENABLE_NEAR_DUPLICATE_DETECTION),
            enable_workload_validation: flags.contains(BakeFlags::ENABLE_WORKLOAD_VALIDATION),
            enable_aabb_testing: flags.contains(BakeFlags::ENABLE_AABB_TESTING),
            disable_remove_poor_quality_omm: flags
                .contains(BakeFlags::DISABLE_REMOVE_POOR_QUALITY_OMM),
            disable_level_line_intersection: flags
                .contains(BakeFlags::DISABLE_LEVEL_LINE_INTERSECTION),
            enable_near_duplicate_detection_brute_force: flags
                .contains(BakeFlags::ENABLE_NEAR_DUPLICATE_DETECTION_BRUTE_FORCE),
        }
    }
}

pub(crate) trait AddressPath {
    const MODE: AddressMode;
}

pub(crate) struct WrapAddr;
pub(crate) struct MirrorAddr;
pub(crate) struct ClampAddr;
pub(crate) struct BorderAddr;
pub(crate) struct MirrorOnceAddr;

impl AddressPath for WrapAddr {
    const MODE: AddressMode = AddressMode::Wrap;
}
impl AddressPath for MirrorAddr {
    const MODE: AddressMode = AddressMode::Mirror;
}
impl AddressPath for ClampAddr {
    const MODE: AddressMode = AddressMode::Clamp;
}
impl AddressPath for BorderAddr {
    const MODE: AddressMode = AddressMode::Border;
}
impl AddressPath for MirrorOnceAddr {
    const MODE: AddressMode = AddressMode::MirrorOnce;
}

pub(crate) trait FilterPath {
    const MODE: FilterMode;
}

pub(crate) struct NearestFilter;
pub(crate) struct LinearFilter;

impl FilterPath for NearestFilter {
    const MODE: FilterMode = FilterMode::Nearest;
}
impl FilterPath for LinearFilter {
    const MODE: FilterMode = FilterMode::Linear;
}

/// Pick the monomorphized bake implementation for the texture tiling and
/// sampler of this input. Every (tiling, address, filter) combination is
/// specialized at compile time.
pub(crate) fn bake(input: &BakeInput<'_>, texture: &Texture) -> OmmResult<BakeResult> {
    match texture.tiling() {
        TilingMode::Linear => bake_with_tiling::<LinearTile>(input, texture),
        TilingMode::MortonZ => bake_with_tiling::<MortonTile>(input, texture),
    }
}

fn bake_with_tiling<T: TilePath>(input: &BakeInput<'_>, texture: &Texture) -> OmmResult<BakeResult> {
    match input.sampler.address_mode {
        AddressMode::Wrap => bake_with_address::<T, WrapAddr>(input, texture),
        AddressMode::Mirror => bake_with_address::<T, MirrorAddr>(input, texture),
        AddressMode::Clamp => bake_with_address::<T, ClampAddr>(input, texture),
        AddressMode::Border => bake_with_address::<T, BorderAddr>(input, texture),
        AddressMode::MirrorOnce => bake_with_address::<T, MirrorOnceAddr>(input, texture),
    }
}

fn bake_with_address<T: TilePath, A: AddressPath>(
    input: &BakeInput<'_>,
    texture: &Texture,
) -> OmmResult<BakeResult> {
    match input.sampler.filter {
        FilterMode::Nearest => bake_impl::<T, A, NearestFilter>(input, texture),
        FilterMode::Linear => bake_impl::<T, A, LinearFilter>(input, texture),
    }
}

fn build_thread_pool() -> OmmResult<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

fn bake_impl<T: TilePath, A: AddressPath, F: FilterPath>(
    input: &BakeInput<'_>,
    texture: &Texture,
) -> OmmResult<BakeResult> {
    let options = Options::new(input.flags);

    let pool = if options.enable_internal_threads {
        Some(build_thread_pool()?)
    } else {
        None
    };

    let mut work_items = setup_work_items(input, &options, texture)?;
    tracing::debug!(work_items = work_items.len(), "work items built");

    validate_workload_size(&options, texture, &work_items)?;

    resample::<T, A, F>(input, &options, texture, pool.as_ref(), &mut work_items);

    promote_special_indices(input, &options, &mut work_items);

    deduplicate_exact(&options, &mut work_items);
    deduplicate_similar_lsh(&options, &mut work_items, 3);
    deduplicate_similar_brute_force(&options, &mut work_items);

    promote_special_indices(input, &options, &mut work_items);

    let (array_histogram, index_histogram) = build_histograms(&work_items);
    let sort_keys = spatial_sort_keys(pool.as_ref(), &work_items);

    serialize(input, &options, &mut work_items, &array_histogram, &index_histogram, &sort_keys)
}

/// Collapse uniformly-classified work items to special indices, and reject
/// low-quality ones when a rejection threshold is set. Runs before and
/// after deduplication: merging can make an item uniform.
fn promote_special_indices(input: &BakeInput<'_>, options: &Options, work_items: &mut [OmmWorkItem]) {
    for item in work_items {
        let n = bird::num_micro_triangles(item.subdivision_level);

        let mut all_equal = true;
        let mut common = item.states.get(0);
        for u_tri in 1..n {
            all_equal &= common == item.states.get(u_tri);
        }

        let reject = input.rejection_threshold > 0.0 && !options.disable_remove_poor_quality_omm;
        if !all_equal && reject {
            let known = (0..n).filter(|&u| item.states.get(u).is_known()).count();
            let known_frac = known as f32 / n as f32;
            if known_frac < input.rejection_threshold {
                all_equal = true;
                common = OpacityState::UnknownTransparent;
            }
        }

        if all_equal && !options.disable_special_indices {
            item.slot = Slot::Special(special_index_for(common));
        }
    }
}

fn special_index_for(state: OpacityState) -> crate::bake::input::SpecialIndex {
    use crate::bake::input::SpecialIndex;
    match state {
        OpacityState::Opaque => SpecialIndex::FullyOpaque,
        OpacityState::Transparent => SpecialIndex::FullyTransparent,
        OpacityState::UnknownOpaque => SpecialIndex::FullyUnknownOpaque,
        OpacityState::UnknownTransparent => SpecialIndex::FullyUnknownTransparent,
    }
}
