use super::*;

#[test]
fn morton_interleave_known_values() {
    assert_eq!(xy_to_morton(0, 0), 0);
    assert_eq!(xy_to_morton(1, 0), 1);
    assert_eq!(xy_to_morton(0, 1), 2);
    assert_eq!(xy_to_morton(3, 5), 39);
    assert_eq!(xy_to_morton(0xFFFF, 0xFFFF), (1 << 32) - 1);
}

#[test]
fn extract_inverts_spread() {
    for v in [0u32, 1, 2, 0x55, 0x1234, 0xFFFF] {
        assert_eq!(extract_even_bits(spread_bits(v) as u32), v);
    }
}

#[test]
fn prefix_eor_is_suffix_parity() {
    assert_eq!(prefix_eor(0), 0);
    assert_eq!(prefix_eor(0b100), 0b111);
    assert_eq!(prefix_eor(0b101), 0b110);
}

#[test]
fn next_pow2_rounds_up() {
    assert_eq!(next_pow2(0), 1);
    assert_eq!(next_pow2(1), 1);
    assert_eq!(next_pow2(3), 4);
    assert_eq!(next_pow2(64), 64);
    assert_eq!(next_pow2(65), 128);
}

#[test]
fn f16_decodes_common_values() {
    assert_eq!(f16_to_f32(0x0000), 0.0);
    assert_eq!(f16_to_f32(0x3C00), 1.0);
    assert_eq!(f16_to_f32(0x3800), 0.5);
    assert_eq!(f16_to_f32(0xC000), -2.0);
    assert_eq!(f16_to_f32(0x7BFF), 65504.0);
    assert!(f16_to_f32(0x7C00).is_infinite());
}

#[test]
fn f16_decodes_subnormals() {
    // Smallest subnormal is 2^-24.
    assert_eq!(f16_to_f32(0x0001), 2.0f32.powi(-24));
    assert_eq!(f16_to_f32(0x03FF), 1023.0 * 2.0f32.powi(-24));
}
