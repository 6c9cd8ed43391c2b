//! Classification stage: rasterize every micro-triangle of every work item
//! against the alpha texture and record the resulting opacity states.
//!
//! Work items are independent (disjoint state buffers, read-only texture),
//! so the loop parallelises across work items when internal threads are
//! enabled.

use glam::Vec2;
use rayon::prelude::*;

use crate::bake::input::BakeInput;
use crate::bake::kernels::{classify_level_line, classify_nearest, classify_patch_minmax, gather_patch};
use crate::bake::pipeline::{AddressPath, FilterPath, Options};
use crate::bake::state::{OmmCoverage, state_from_coverage};
use crate::bake::workitem::OmmWorkItem;
use crate::raster::{Triangle, rasterize_conservative, rasterize_conservative_with_offset};
use crate::subdiv::bird;
use crate::texture::sampler::FilterMode;
use crate::texture::store::{Texture, TilePath};

/// Sub-pixel offset aligning the raster grid with bilinear patches: the
/// interior of four alpha interpolants maps onto one raster cell. Nearest
/// sampling maps texels directly and uses no offset.
const BILINEAR_OFFSET: Vec2 = Vec2::new(-0.5, -0.5);

pub(crate) fn resample<T: TilePath, A: AddressPath, F: FilterPath>(
    input: &BakeInput<'_>,
    options: &Options,
    texture: &Texture,
    pool: Option<&rayon::ThreadPool>,
    work_items: &mut [OmmWorkItem],
) {
    let classify = |item: &mut OmmWorkItem| match F::MODE {
        FilterMode::Linear => classify_linear::<T, A>(input, options, texture, item),
        FilterMode::Nearest => classify_nearest_filter::<T, A>(input, texture, item),
    };

    match pool {
        Some(pool) => pool.install(|| work_items.par_iter_mut().for_each(classify)),
        None => work_items.iter_mut().for_each(classify),
    }
}

fn classify_linear<T: TilePath, A: AddressPath>(
    input: &BakeInput<'_>,
    options: &Options,
    texture: &Texture,
    item: &mut OmmWorkItem,
) {
    let cutoff = input.alpha_cutoff;
    let border_alpha = input.sampler.border_alpha;
    let promotion = input.unknown_state_promotion;

    for u_tri in 0..bird::num_micro_triangles(item.subdivision_level) {
        let sub_tri = bird::micro_triangle(&item.uv_tri, u_tri, item.subdivision_level);

        if !options.disable_level_line_intersection {
            let mut cov = OmmCoverage::default();
            for mip in 0..texture.mip_count() {
                let raster_size = texture.size(mip);
                let scale = raster_size.as_vec2();
                let pixel_space_tri =
                    [sub_tri.p0, sub_tri.p1, sub_tri.p2].map(|p| p * scale + BILINEAR_OFFSET);

                // Seed with the sample at the first vertex; the level-line
                // pass below only ever adds "mixed" evidence on top.
                if cutoff < texture.bilinear(A::MODE, border_alpha, sub_tri.p0, mip) {
                    cov.opaque += 1;
                } else {
                    cov.trans += 1;
                }

                rasterize_conservative_with_offset(
                    &sub_tri,
                    raster_size,
                    BILINEAR_OFFSET,
                    |pixel, _bc| {
                        classify_level_line::<T>(
                            texture,
                            A::MODE,
                            border_alpha,
                            cutoff,
                            pixel,
                            mip,
                            pixel_space_tri,
                            &mut cov,
                        );
                    },
                );

                if state_from_coverage(item.format, promotion, cov).is_unknown() {
                    break;
                }
            }
            item.states.set(u_tri, state_from_coverage(item.format, promotion, cov));
        } else if options.enable_aabb_testing {
            // Bound the micro-triangle by its AABB split into two triangles.
            let mip = 0;
            let raster_size = texture.size(mip);
            let lo = sub_tri.aabb_min;
            let hi = sub_tri.aabb_max;

            let mut cov = OmmCoverage::default();
            let mut kernel = |pixel, _bc: [f32; 3]| {
                let patch = gather_patch::<T>(texture, A::MODE, border_alpha, pixel, mip);
                classify_patch_minmax(patch, cutoff, &mut cov);
            };
            let t0 = Triangle::new(lo, Vec2::new(hi.x, lo.y), Vec2::new(lo.x, hi.y));
            let t1 = Triangle::new(hi, Vec2::new(hi.x, lo.y), Vec2::new(lo.x, hi.y));
            rasterize_conservative_with_offset(&t0, raster_size, BILINEAR_OFFSET, &mut kernel);
            rasterize_conservative_with_offset(&t1, raster_size, BILINEAR_OFFSET, &mut kernel);

            item.states.set(u_tri, state_from_coverage(item.format, promotion, cov));
        } else {
            let mip = 0;
            let raster_size = texture.size(mip);

            let mut cov = OmmCoverage::default();
            rasterize_conservative_with_offset(&sub_tri, raster_size, BILINEAR_OFFSET, |pixel, _bc| {
                let patch = gather_patch::<T>(texture, A::MODE, border_alpha, pixel, mip);
                classify_patch_minmax(patch, cutoff, &mut cov);
            });

            item.states.set(u_tri, state_from_coverage(item.format, promotion, cov));
        }
    }
}

fn classify_nearest_filter<T: TilePath, A: AddressPath>(
    input: &BakeInput<'_>,
    texture: &Texture,
    item: &mut OmmWorkItem,
) {
    let cutoff = input.alpha_cutoff;
    let border_alpha = input.sampler.border_alpha;
    let promotion = input.unknown_state_promotion;

    for u_tri in 0..bird::num_micro_triangles(item.subdivision_level) {
        let sub_tri = bird::micro_triangle(&item.uv_tri, u_tri, item.subdivision_level);

        let mut cov = OmmCoverage::default();
        for mip in 0..texture.mip_count() {
            rasterize_conservative(&sub_tri, texture.size(mip), |pixel, _bc| {
                classify_nearest::<T>(texture, A::MODE, border_alpha, cutoff, pixel, mip, &mut cov);
            });

            if state_from_coverage(item.format, promotion, cov).is_unknown() {
                break;
            }
        }
        item.states.set(u_tri, state_from_coverage(item.format, promotion, cov));
    }
}
