//! Conservative triangle rasterization over an integer cell grid.
//!
//! The rasterizer visits every grid cell `[x, x+1] x [y, y+1]` whose overlap
//! with the triangle has positive area, and invokes a kernel with the integer
//! cell coordinate and the barycentrics of the cell centre. A cell is never
//! visited twice, and the visit order is unspecified.
//!
//! Coordinates are *not* clamped to the raster size: UVs outside `[0,1]`
//! produce out-of-range cells, which the texture address mode resolves.

use glam::{IVec2, Vec2};
use rayon::prelude::*;

/// A 2D triangle with its cached axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub p0: Vec2,
    /// Second vertex.
    pub p1: Vec2,
    /// Third vertex.
    pub p2: Vec2,
    /// AABB minimum corner.
    pub aabb_min: Vec2,
    /// AABB maximum corner.
    pub aabb_max: Vec2,
}

impl Triangle {
    /// Build a triangle and cache its AABB.
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2) -> Self {
        Self {
            p0,
            p1,
            p2,
            aabb_min: p0.min(p1).min(p2),
            aabb_max: p0.max(p1).max(p2),
        }
    }

    /// Twice the signed area (positive when the winding is counter-clockwise).
    pub fn signed_area_x2(&self) -> f32 {
        (self.p1 - self.p0).perp_dot(self.p2 - self.p0)
    }
}

/// Triangle scaled into cell space, with winding-corrected edge data.
struct CellSpaceTri {
    v: [Vec2; 3],
    // Edge normals point outward; a cell is rejected when it lies fully on
    // the positive side of any edge.
    edge_n: [Vec2; 3],
    edge_c: [f32; 3],
    x_range: (i32, i32),
    y_range: (i32, i32),
    inv_det: f32,
}

impl CellSpaceTri {
    fn build(tri: &Triangle, raster_size: IVec2, offset: Vec2) -> Self {
        let scale = raster_size.as_vec2();
        let v = [
            tri.p0 * scale + offset,
            tri.p1 * scale + offset,
            tri.p2 * scale + offset,
        ];

        let det = (v[1] - v[0]).perp_dot(v[2] - v[0]);
        let flip = if det < 0.0 { -1.0 } else { 1.0 };

        let mut edge_n = [Vec2::ZERO; 3];
        let mut edge_c = [0f32; 3];
        for i in 0..3 {
            let a = v[i];
            let b = v[(i + 1) % 3];
            let e = b - a;
            // Outward normal for CCW winding is the clockwise perpendicular.
            let n = Vec2::new(e.y, -e.x) * flip;
            edge_n[i] = n;
            edge_c[i] = n.dot(a);
        }

        let lo = v[0].min(v[1]).min(v[2]).floor();
        let hi = v[0].max(v[1]).max(v[2]).floor();
        Self {
            v,
            edge_n,
            edge_c,
            x_range: (lo.x as i32, hi.x as i32),
            y_range: (lo.y as i32, hi.y as i32),
            inv_det: if det != 0.0 { 1.0 / det } else { 0.0 },
        }
    }

    /// Positive-area overlap between the triangle and cell `[x,x+1] x [y,y+1]`.
    /// Boundary-only contact does not count: a triangle edge lying exactly on
    /// a grid line claims the cell it has interior in, not both.
    fn overlaps_cell(&self, x: i32, y: i32) -> bool {
        let lo = Vec2::new(x as f32, y as f32);
        for i in 0..3 {
            let n = self.edge_n[i];
            // Cell corner most negative along n.
            let support = lo + Vec2::new(if n.x < 0.0 { 1.0 } else { 0.0 }, if n.y < 0.0 { 1.0 } else { 0.0 });
            if n.dot(support) >= self.edge_c[i] {
                return false;
            }
        }
        true
    }

    fn barycentrics(&self, p: Vec2) -> [f32; 3] {
        let d = (self.v[1] - self.v[0]).perp_dot(p - self.v[0]);
        let e = (p - self.v[0]).perp_dot(self.v[2] - self.v[0]);
        let w2 = d * self.inv_det;
        let w1 = e * self.inv_det;
        [1.0 - w1 - w2, w1, w2]
    }

    fn walk_row(&self, y: i32, kernel: &mut impl FnMut(IVec2, [f32; 3])) {
        for x in self.x_range.0..=self.x_range.1 {
            if self.overlaps_cell(x, y) {
                let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                kernel(IVec2::new(x, y), self.barycentrics(centre));
            }
        }
    }
}

/// Rasterize `tri` (in UV space) over a `raster_size` cell grid.
pub fn rasterize_conservative(
    tri: &Triangle,
    raster_size: IVec2,
    mut kernel: impl FnMut(IVec2, [f32; 3]),
) {
    rasterize_with(tri, raster_size, Vec2::ZERO, &mut kernel);
}

/// Rasterize with a sub-pixel offset applied to the triangle, aligning the
/// cell grid with bilinear interpolation patches (offset `(-1/2, -1/2)` for
/// bilinear kernels).
pub fn rasterize_conservative_with_offset(
    tri: &Triangle,
    raster_size: IVec2,
    offset: Vec2,
    mut kernel: impl FnMut(IVec2, [f32; 3]),
) {
    rasterize_with(tri, raster_size, offset, &mut kernel);
}

fn rasterize_with(
    tri: &Triangle,
    raster_size: IVec2,
    offset: Vec2,
    kernel: &mut impl FnMut(IVec2, [f32; 3]),
) {
    let cst = CellSpaceTri::build(tri, raster_size, offset);
    for y in cst.y_range.0..=cst.y_range.1 {
        cst.walk_row(y, kernel);
    }
}

/// Scanline-parallel variant. The kernel runs concurrently for disjoint
/// cells and must be safe to call from multiple threads.
pub fn rasterize_conservative_parallel(
    tri: &Triangle,
    raster_size: IVec2,
    kernel: impl Fn(IVec2, [f32; 3]) + Sync,
) {
    let cst = CellSpaceTri::build(tri, raster_size, Vec2::ZERO);
    (cst.y_range.0..=cst.y_range.1).into_par_iter().for_each(|y| {
        let mut k = |p, bc| kernel(p, bc);
        cst.walk_row(y, &mut k);
    });
}

#[cfg(test)]
#[path = "../tests/unit/raster.rs"]
mod tests;
