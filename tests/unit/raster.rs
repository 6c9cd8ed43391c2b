use super::*;
use std::collections::BTreeSet;
use std::sync::Mutex;

fn lower_left() -> Triangle {
    Triangle::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0))
}

fn visit_serial(tri: &Triangle, size: i32) -> BTreeSet<(i32, i32)> {
    let mut cells = BTreeSet::new();
    rasterize_conservative(tri, IVec2::splat(size), |p, _| {
        assert!(cells.insert((p.x, p.y)), "cell {p} visited twice");
    });
    cells
}

#[test]
fn covers_interior_and_skips_exterior() {
    // Lower-left half of a 4x4 grid; the hypotenuse runs through x+y=4 in
    // cell space.
    let cells = visit_serial(&lower_left(), 4);

    for x in 0..4 {
        for y in 0..4 {
            if x + y + 2 <= 4 {
                assert!(cells.contains(&(x, y)), "interior cell ({x},{y}) missed");
            }
        }
    }
    // Nothing strictly beyond the hypotenuse.
    for &(x, y) in &cells {
        assert!(x + y < 4, "exterior cell ({x},{y}) visited");
    }
}

#[test]
fn edge_on_grid_line_claims_one_side() {
    // Left half square: the right edge lies exactly on x=2.
    let tri0 = Triangle::new(Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.0), Vec2::new(0.0, 1.0));
    let tri1 = Triangle::new(Vec2::new(0.5, 1.0), Vec2::new(0.5, 0.0), Vec2::new(0.0, 1.0));
    let mut cells = visit_serial(&tri0, 4);
    cells.extend(visit_serial(&tri1, 4));
    assert!(cells.iter().all(|&(x, _)| x < 2));
    assert_eq!(cells.len(), 8);
}

#[test]
fn winding_does_not_matter() {
    let cw = Triangle::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
    assert_eq!(visit_serial(&lower_left(), 4), visit_serial(&cw, 4));
}

#[test]
fn offset_shifts_the_grid() {
    let tri = Triangle::new(Vec2::new(0.3, 0.3), Vec2::new(0.35, 0.3), Vec2::new(0.3, 0.35));
    let mut plain = Vec::new();
    rasterize_conservative(&tri, IVec2::splat(8), |p, _| plain.push((p.x, p.y)));

    let mut shifted = Vec::new();
    rasterize_conservative_with_offset(&tri, IVec2::splat(8), Vec2::new(-0.5, -0.5), |p, _| {
        shifted.push((p.x, p.y))
    });

    // The tiny triangle lands inside cell (2,2) unshifted; the half-pixel
    // offset moves its footprint across the (2,2)/(1,1) patch boundary.
    assert_eq!(plain, vec![(2, 2)]);
    assert!(!shifted.is_empty());
    assert!(shifted.iter().all(|&(x, y)| (1..=2).contains(&x) && (1..=2).contains(&y)));
}

#[test]
fn out_of_range_cells_are_not_clamped() {
    let tri = Triangle::new(Vec2::new(-0.5, 0.0), Vec2::new(0.25, 0.0), Vec2::new(-0.5, 0.25));
    let cells = visit_serial(&tri, 4);
    assert!(cells.iter().any(|&(x, _)| x < 0));
}

#[test]
fn barycentrics_of_interior_cells_are_convex() {
    rasterize_conservative(&lower_left(), IVec2::splat(8), |p, bc| {
        let sum = bc[0] + bc[1] + bc[2];
        assert!((sum - 1.0).abs() < 1e-4, "cell {p}: weights sum to {sum}");
    });
}

#[test]
fn parallel_visits_the_same_cells() {
    let tri = Triangle::new(Vec2::new(0.05, 0.1), Vec2::new(0.9, 0.2), Vec2::new(0.3, 0.95));
    let serial = visit_serial(&tri, 16);

    let parallel = Mutex::new(BTreeSet::new());
    rasterize_conservative_parallel(&tri, IVec2::splat(16), |p, _| {
        assert!(parallel.lock().unwrap().insert((p.x, p.y)));
    });
    assert_eq!(serial, parallel.into_inner().unwrap());
}
