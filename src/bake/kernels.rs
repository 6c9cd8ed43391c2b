//! Per-pixel classification kernels.
//!
//! All three kernels accumulate into an [`OmmCoverage`]: the level-line
//! kernel marks a micro-triangle mixed only when the alpha iso-contour
//! provably crosses it, the conservative-bilinear kernel bounds the patch by
//! its corner extrema, and the nearest kernel classifies single texels.

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use crate::bake::state::OmmCoverage;
use crate::texture::sampler::{AddressMode, TEXCOORD_BORDER, remap};
use crate::texture::store::{Texture, TilePath};

/// The four bilinear interpolants anchored at `pixel`:
/// `[a00, a10, a01, a11]`, with border texels resolved to `border_alpha`.
pub(crate) fn gather_patch<T: TilePath>(
    texture: &Texture,
    mode: AddressMode,
    border_alpha: f32,
    pixel: IVec2,
    mip: usize,
) -> [f32; 4] {
    let size = texture.size(mip);
    let coords = crate::texture::sampler::gather4(mode, pixel, size);
    coords.map(|c| {
        if c.x == TEXCOORD_BORDER || c.y == TEXCOORD_BORDER {
            border_alpha
        } else {
            texture.load::<T>(c, mip)
        }
    })
}

/// Nearest-filter classification of one texel.
pub(crate) fn classify_nearest<T: TilePath>(
    texture: &Texture,
    mode: AddressMode,
    border_alpha: f32,
    cutoff: f32,
    pixel: IVec2,
    mip: usize,
    cov: &mut OmmCoverage,
) {
    let coord = remap(mode, pixel, texture.size(mip));
    let alpha = if coord.x == TEXCOORD_BORDER || coord.y == TEXCOORD_BORDER {
        border_alpha
    } else {
        texture.load::<T>(coord, mip)
    };
    if cutoff < alpha {
        cov.opaque += 1;
    } else {
        cov.trans += 1;
    }
}

/// Conservative classification of one bilinear patch by its corner extrema.
pub(crate) fn classify_patch_minmax(patch: [f32; 4], cutoff: f32, cov: &mut OmmCoverage) {
    let min = patch[0].min(patch[1]).min(patch[2]).min(patch[3]);
    let max = patch[0].max(patch[1]).max(patch[2]).max(patch[3]);
    if cutoff < min {
        cov.opaque += 1;
    } else if max <= cutoff {
        cov.trans += 1;
    } else {
        cov.opaque += 1;
        cov.trans += 1;
    }
}

/// Clip a triangle (cell-local coordinates) against the unit cell `[0,1]^2`.
///
/// Sutherland-Hodgman against the four half-planes; the result has at most
/// seven vertices.
pub(crate) fn clip_to_unit_cell(tri: [Vec2; 3]) -> SmallVec<[Vec2; 8]> {
    let mut poly: SmallVec<[Vec2; 8]> = SmallVec::from_slice(&tri);
    let mut next: SmallVec<[Vec2; 8]> = SmallVec::new();

    // (axis, keep-side): inside is value >= 0 on the min planes and
    // value <= 1 on the max planes.
    let planes: [(usize, f32, f32); 4] = [(0, 1.0, 0.0), (0, -1.0, 1.0), (1, 1.0, 0.0), (1, -1.0, 1.0)];

    for (axis, sign, bound) in planes {
        next.clear();
        let dist = |p: Vec2| sign * (p[axis] - bound);
        for i in 0..poly.len() {
            let a = poly[i];
            let b = poly[(i + 1) % poly.len()];
            let da = dist(a);
            let db = dist(b);
            if da >= 0.0 {
                next.push(a);
            }
            if (da > 0.0 && db < 0.0) || (da < 0.0 && db > 0.0) {
                let t = da / (da - db);
                next.push(a + (b - a) * t);
            }
        }
        std::mem::swap(&mut poly, &mut next);
        if poly.is_empty() {
            break;
        }
    }
    poly
}

/// Whether the iso-contour `alpha == cutoff` of the bilinear patch crosses
/// the region `cell ∩ micro-triangle`, given the triangle in cell-local
/// coordinates.
///
/// The patch `a(s,t)` is bilinear, so it has no interior extrema (its only
/// critical point is a saddle); min and max over the convex clipped region
/// are attained on the boundary, at a vertex or at the interior extremum of
/// an edge's quadratic restriction. The contour crosses iff some boundary
/// value is above the cutoff and some is at or below it.
pub(crate) fn level_line_crosses(patch: [f32; 4], cutoff: f32, local_tri: [Vec2; 3]) -> bool {
    let poly = clip_to_unit_cell(local_tri);
    if poly.len() < 3 {
        return false;
    }

    let [a00, a10, a01, a11] = patch;
    let b = a10 - a00;
    let c = a01 - a00;
    let d = a11 - a10 - a01 + a00;
    let eval = |p: Vec2| a00 + b * p.x + c * p.y + d * p.x * p.y;

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut take = |v: f32| {
        min = min.min(v);
        max = max.max(v);
    };

    for i in 0..poly.len() {
        let p = poly[i];
        let q = poly[(i + 1) % poly.len()];
        take(eval(p));

        // Quadratic restriction along the edge: alpha(l) = qa*l^2 + qb*l + qc.
        let dp = q - p;
        let qa = d * dp.x * dp.y;
        let qb = b * dp.x + c * dp.y + d * (p.x * dp.y + p.y * dp.x);
        if qa != 0.0 {
            let l = -qb / (2.0 * qa);
            if l > 0.0 && l < 1.0 {
                take(eval(p + dp * l));
            }
        }
    }

    max > cutoff && min <= cutoff
}

/// Level-line classification of one pixel: increments both counters when the
/// contour crosses the cell's share of the micro-triangle.
#[allow(clippy::too_many_arguments)]
pub(crate) fn classify_level_line<T: TilePath>(
    texture: &Texture,
    mode: AddressMode,
    border_alpha: f32,
    cutoff: f32,
    pixel: IVec2,
    mip: usize,
    pixel_space_tri: [Vec2; 3],
    cov: &mut OmmCoverage,
) {
    let offset = Vec2::new(pixel.x as f32, pixel.y as f32);
    let local = pixel_space_tri.map(|v| v - offset);

    let patch = gather_patch::<T>(texture, mode, border_alpha, pixel, mip);
    if level_line_crosses(patch, cutoff, local) {
        cov.opaque += 1;
        cov.trans += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/kernels.rs"]
mod tests;
