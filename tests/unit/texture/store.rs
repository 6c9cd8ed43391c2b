use super::*;

fn tex(data: &[f32], w: u32, h: u32, flags: TextureFlags) -> Texture {
    Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags,
        mips: &[MipDesc { width: w, height: h, row_pitch: 0, data }],
    })
    .unwrap()
}

#[test]
fn linear_and_morton_tiling_load_the_same_values() {
    let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
    let linear = tex(&data, 4, 3, TextureFlags::DISABLE_Z_ORDER);
    let morton = tex(&data, 4, 3, TextureFlags::default());

    assert_eq!(linear.tiling(), TilingMode::Linear);
    assert_eq!(morton.tiling(), TilingMode::MortonZ);
    for y in 0..3 {
        for x in 0..4 {
            let c = IVec2::new(x, y);
            assert_eq!(linear.load_dyn(c, 0), (x + 4 * y) as f32);
            assert_eq!(morton.load_dyn(c, 0), (x + 4 * y) as f32);
        }
    }
}

#[test]
fn row_pitch_skips_padding() {
    // 2x2 image stored with a row pitch of 3 texels.
    let data = [1.0, 2.0, 99.0, 3.0, 4.0, 99.0];
    let t = Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::DISABLE_Z_ORDER,
        mips: &[MipDesc { width: 2, height: 2, row_pitch: 3, data: &data }],
    })
    .unwrap();
    assert_eq!(t.load_dyn(IVec2::new(0, 0), 0), 1.0);
    assert_eq!(t.load_dyn(IVec2::new(1, 1), 0), 4.0);
}

#[test]
fn bilinear_at_texel_center_is_exact() {
    let data = [0.0, 1.0, 0.25, 0.75];
    let t = tex(&data, 2, 2, TextureFlags::default());
    let sample = |u, v| t.bilinear(AddressMode::Clamp, 0.0, Vec2::new(u, v), 0);
    assert_eq!(sample(0.25, 0.25), 0.0);
    assert_eq!(sample(0.75, 0.25), 1.0);
    assert_eq!(sample(0.25, 0.75), 0.25);
    // Center of the quad is the average of the four texels.
    assert!((sample(0.5, 0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn bilinear_outside_border_returns_border_alpha() {
    let data = [0.0; 4];
    let t = tex(&data, 2, 2, TextureFlags::default());
    let a = t.bilinear(AddressMode::Border, 0.75, Vec2::new(-2.0, -2.0), 0);
    assert_eq!(a, 0.75);
}

#[test]
fn mip_chain_sizes_are_per_level() {
    let lvl0: Vec<f32> = vec![1.0; 16];
    let lvl1: Vec<f32> = vec![0.5; 4];
    let t = Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::default(),
        mips: &[
            MipDesc { width: 4, height: 4, row_pitch: 0, data: &lvl0 },
            MipDesc { width: 2, height: 2, row_pitch: 0, data: &lvl1 },
        ],
    })
    .unwrap();
    assert_eq!(t.mip_count(), 2);
    assert_eq!(t.size(0), IVec2::splat(4));
    assert_eq!(t.size(1), IVec2::splat(2));
    assert_eq!(t.rcp_size(1), Vec2::splat(0.5));
    assert_eq!(t.load_dyn(IVec2::new(1, 1), 1), 0.5);
}

#[test]
fn validation_rejects_bad_descriptors() {
    let empty = Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::default(),
        mips: &[],
    });
    assert!(matches!(empty, Err(OmmError::InvalidArgument(_))));

    let data = [0.0; 2];
    let short = Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::default(),
        mips: &[MipDesc { width: 2, height: 2, row_pitch: 0, data: &data }],
    });
    assert!(matches!(short, Err(OmmError::InvalidArgument(_))));

    let zero = Texture::create(&TextureDesc {
        format: TextureFormat::Fp32,
        flags: TextureFlags::default(),
        mips: &[MipDesc { width: 0, height: 2, row_pitch: 0, data: &data }],
    });
    assert!(matches!(zero, Err(OmmError::InvalidArgument(_))));
}
