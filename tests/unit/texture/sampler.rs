use super::*;

fn size4() -> IVec2 {
    IVec2::splat(4)
}

#[test]
fn wrap_is_euclidean() {
    assert_eq!(remap(AddressMode::Wrap, IVec2::new(-1, -1), size4()), IVec2::new(3, 3));
    assert_eq!(remap(AddressMode::Wrap, IVec2::new(4, 5), size4()), IVec2::new(0, 1));
    assert_eq!(remap(AddressMode::Wrap, IVec2::new(2, 3), size4()), IVec2::new(2, 3));
}

#[test]
fn mirror_folds_every_other_tile() {
    // First reflected tile runs backwards.
    assert_eq!(remap(AddressMode::Mirror, IVec2::new(-1, 0), size4()), IVec2::new(0, 0));
    assert_eq!(remap(AddressMode::Mirror, IVec2::new(-4, 0), size4()), IVec2::new(3, 0));
    assert_eq!(remap(AddressMode::Mirror, IVec2::new(4, 0), size4()), IVec2::new(3, 0));
    assert_eq!(remap(AddressMode::Mirror, IVec2::new(7, 0), size4()), IVec2::new(0, 0));
    // Second period repeats the original orientation.
    assert_eq!(remap(AddressMode::Mirror, IVec2::new(8, 0), size4()), IVec2::new(0, 0));
}

#[test]
fn clamp_pins_to_edges() {
    assert_eq!(remap(AddressMode::Clamp, IVec2::new(-7, 9), size4()), IVec2::new(0, 3));
}

#[test]
fn border_flags_out_of_range_axes() {
    let c = remap(AddressMode::Border, IVec2::new(-1, 2), size4());
    assert_eq!(c, IVec2::new(TEXCOORD_BORDER, 2));
    let c = remap(AddressMode::Border, IVec2::new(1, 4), size4());
    assert_eq!(c, IVec2::new(1, TEXCOORD_BORDER));
    assert_eq!(remap(AddressMode::Border, IVec2::new(3, 0), size4()), IVec2::new(3, 0));
}

#[test]
fn mirror_once_reflects_then_clamps() {
    assert_eq!(remap(AddressMode::MirrorOnce, IVec2::new(-2, 5), size4()), IVec2::new(1, 3));
    assert_eq!(remap(AddressMode::MirrorOnce, IVec2::new(-9, 2), size4()), IVec2::new(3, 2));
}

#[test]
fn gather4_clamps_footprint_at_edge() {
    let coords = gather4(AddressMode::Clamp, IVec2::new(3, 3), size4());
    assert_eq!(coords[0], IVec2::new(3, 3));
    assert_eq!(coords[1], IVec2::new(3, 3));
    assert_eq!(coords[2], IVec2::new(3, 3));
    assert_eq!(coords[3], IVec2::new(3, 3));

    let coords = gather4(AddressMode::Wrap, IVec2::new(3, 1), size4());
    assert_eq!(coords[1], IVec2::new(0, 1));
    assert_eq!(coords[3], IVec2::new(0, 2));
}
