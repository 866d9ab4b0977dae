//! Round trips through decomposed paths.

mod common;

use common::fixtures::{self, f32_bytes, f64_bytes};
use common::{assert_f32_eq, assert_f64_eq, run_fish, TestContext};
use pixfish::{FishKind, FormatDesc};
use pretty_assertions::assert_eq;

#[test]
fn test_gray_to_rgb_replicates_without_clipping() {
    let ctx = TestContext::new();
    let ids = fixtures::gray_rgb(&ctx);

    let fish = ctx.fish(ids.gray, ids.rgb).unwrap();
    assert_eq!(fish.kind(), FishKind::Decomposed);
    assert_eq!(fish.conversions(), &[ids.gray_to_rgb]);

    let input = f32_bytes(&[-0.1, 0.0, 0.4, 1.0, 2.0]);
    let output = run_fish(&fish, &input);
    assert_f32_eq(
        &output,
        &[
            -0.1, -0.1, -0.1, 0.0, 0.0, 0.0, 0.4, 0.4, 0.4, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0,
        ],
    );
}

#[test]
fn test_gray_to_rgb_by_name() {
    let ctx = TestContext::new();
    fixtures::gray_rgb(&ctx);

    let fish = ctx.fish("gray-float", "rgb-float").unwrap();
    let output = run_fish(&fish, &f32_bytes(&[0.25]));
    assert_f32_eq(&output, &[0.25, 0.25, 0.25]);
}

#[test]
fn test_planar_interleaved_round_trip() {
    let ctx = TestContext::with_base_set();
    let rgba = ctx.model_id("RGBA").unwrap();
    let double = ctx.type_id("double").unwrap();
    let planar = ctx
        .register_format(FormatDesc::new(rgba, double).planar(true))
        .unwrap();
    assert_eq!(ctx.get_name(planar).unwrap(), "RGBA double planar");

    let pixels = [0.1, 0.2, 0.3, 1.0, -0.5, 0.6, 2.5, 0.0, 0.9, 0.8, 0.7, 0.5];
    let interleaved = f64_bytes(&pixels);

    let to_planar = ctx.fish("RGBA double", planar).unwrap();
    let planes = run_fish(&to_planar, &interleaved);
    assert_f64_eq(
        &planes,
        &[0.1, -0.5, 0.9, 0.2, 0.6, 0.8, 0.3, 2.5, 0.7, 1.0, 0.0, 0.5],
    );

    let back = ctx.fish(planar, "RGBA double").unwrap();
    assert_f64_eq(&run_fish(&back, &planes), &pixels);
}

#[test]
fn test_u8_codes_survive_float_round_trip() {
    let ctx = TestContext::with_base_set();
    let codes: Vec<u8> = (0..=255).collect();

    let up = ctx.fish("Y u8", "Y float").unwrap();
    let down = ctx.fish("Y float", "Y u8").unwrap();
    let restored = run_fish(&down, &run_fish(&up, &codes));
    assert_eq!(restored, codes);
}

#[test]
fn test_srgb_gamma_round_trip_through_linear() {
    let ctx = TestContext::with_base_set();
    let codes: Vec<u8> = (0..=255).flat_map(|c| [c, c / 2, 255 - c, 255]).collect();

    let to_linear = ctx.fish("R'G'B'A u8", "RGBA double").unwrap();
    let to_srgb = ctx.fish("RGBA double", "R'G'B'A u8").unwrap();
    assert_eq!(run_fish(&to_srgb, &run_fish(&to_linear, &codes)), codes);
}
