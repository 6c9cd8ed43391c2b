use super::*;

use crate::bake::input::{BakeFlags, BakeInput, IndexSlice, TexCoordFormat};
use crate::baker::TextureHandle;
use crate::texture::store::{MipDesc, TextureDesc, TextureFlags, TextureFormat};

fn texture(w: u32, h: u32) -> Texture {
    let data = vec![1.0f32; (w * h) as usize];
    Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::default(),
        mips: &[MipDesc { width: w, height: h, row_pitch: 0, data: &data }],
    })
    .unwrap()
}

fn uvs_f32(points: &[[f32; 2]]) -> Vec<u8> {
    points.iter().flat_map(|p| [p[0].to_le_bytes(), p[1].to_le_bytes()]).flatten().collect()
}

fn input<'a>(indices: &'a [u32], tex_coords: &'a [u8]) -> BakeInput<'a> {
    let mut input = BakeInput::new(
        TextureHandle::INVALID,
        IndexSlice::U32(indices),
        tex_coords,
        TexCoordFormat::Uv32Float,
    );
    input.max_subdivision_level = 4;
    input.dynamic_subdivision_scale = 0.0;
    input
}

#[test]
fn identical_triangles_collapse_into_one_item() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let indices = [0u32, 1, 2, 0, 1, 2];
    let desc = input(&indices, &uvs);

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].primitive_indices.as_slice(), &[0, 1]);
    assert_eq!(items[0].subdivision_level, 4);

    let items = setup_work_items(
        &desc,
        &Options::new(BakeFlags::DISABLE_DUPLICATE_DETECTION),
        &texture(8, 8),
    )
    .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].primitive_indices.as_slice(), &[1]);
}

#[test]
fn degenerate_triangles_get_no_work_item() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [f32::NAN, 0.5]]);
    // Zero-area, then NaN, then a valid triangle.
    let indices = [0u32, 0, 0, 0, 1, 3, 0, 1, 2];
    let desc = input(&indices, &uvs);

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].primitive_indices.as_slice(), &[2]);
}

#[test]
fn per_primitive_levels_override_and_disable() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
    let indices = [0u32, 1, 2, 1, 3, 2];
    let mut desc = input(&indices, &uvs);
    let levels = [2u8, DISABLED_SUBDIVISION_LEVEL];
    desc.subdivision_levels = Some(&levels);

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].subdivision_level, 2);
    assert_eq!(items[0].primitive_indices.as_slice(), &[0]);
}

#[test]
fn out_of_range_levels_fall_back_to_max() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let indices = [0u32, 1, 2];
    let mut desc = input(&indices, &uvs);
    let levels = [13u8];
    desc.subdivision_levels = Some(&levels);

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    assert_eq!(items[0].subdivision_level, 4);
}

#[test]
fn dynamic_level_targets_the_scale_footprint() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let indices = [0u32, 1, 2];
    let mut desc = input(&indices, &uvs);
    desc.max_subdivision_level = 12;
    desc.dynamic_subdivision_scale = 2.0;

    // Half of a 64x64 texture is 2048 texels; 2048 / 4 = 512 -> 4^4.5, so
    // level 4 puts each micro-triangle at roughly a 2x2 texel footprint.
    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(64, 64)).unwrap();
    assert_eq!(items[0].subdivision_level, 4);

    // The max level still caps the heuristic.
    desc.max_subdivision_level = 2;
    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(64, 64)).unwrap();
    assert_eq!(items[0].subdivision_level, 2);
}

#[test]
fn unorm16_coords_decode() {
    let uvs: Vec<u8> = [[0u16, 0], [65535, 0], [0, 32768]]
        .iter()
        .flat_map(|p| [p[0].to_le_bytes(), p[1].to_le_bytes()])
        .flatten()
        .collect();
    let indices = [0u32, 1, 2];
    let mut desc = input(&indices, &uvs);
    desc.tex_coord_format = TexCoordFormat::Uv16Unorm;

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    let tri = &items[0].uv_tri;
    assert_eq!(tri.p0, Vec2::new(0.0, 0.0));
    assert_eq!(tri.p1, Vec2::new(1.0, 0.0));
    assert!((tri.p2.y - 0.5).abs() < 1e-4);
}

#[test]
fn strided_coords_skip_interleaved_attributes() {
    // Each vertex is [u, v, padding].
    let raw: Vec<u8> = [[0.0f32, 0.0, 9.9], [1.0, 0.0, 9.9], [0.0, 1.0, 9.9]]
        .iter()
        .flat_map(|p| [p[0].to_le_bytes(), p[1].to_le_bytes(), p[2].to_le_bytes()])
        .flatten()
        .collect();
    let indices = [0u32, 1, 2];
    let mut desc = input(&indices, &raw);
    desc.tex_coord_stride = 12;

    let items =
        setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8)).unwrap();
    assert_eq!(items[0].uv_tri.p1, Vec2::new(1.0, 0.0));
}

#[test]
fn short_tex_coord_buffer_is_an_error() {
    let uvs = uvs_f32(&[[0.0, 0.0], [1.0, 0.0]]);
    let indices = [0u32, 1, 2];
    let desc = input(&indices, &uvs);
    let result = setup_work_items(&desc, &Options::new(BakeFlags::default()), &texture(8, 8));
    assert!(matches!(result, Err(OmmError::InvalidArgument(_))));
}

#[test]
fn workload_guard_triggers_only_when_enabled() {
    let uvs = uvs_f32(&[[0.0, 0.0], [4000.0, 0.0], [0.0, 4000.0]]);
    let indices = [0u32, 1, 2];
    let desc = input(&indices, &uvs);
    let tex = texture(64, 64);

    let items = setup_work_items(&desc, &Options::new(BakeFlags::default()), &tex).unwrap();

    let off = validate_workload_size(&Options::new(BakeFlags::default()), &tex, &items);
    assert!(off.is_ok());

    let on = validate_workload_size(
        &Options::new(BakeFlags::ENABLE_WORKLOAD_VALIDATION),
        &tex,
        &items,
    );
    assert!(matches!(on, Err(OmmError::WorkloadTooBig(_))));
}
