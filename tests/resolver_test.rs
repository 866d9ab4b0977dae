//! Path selection, tie-breaking and caching.

mod common;

use std::sync::Arc;

use common::fixtures::{self, constant_edge, f32_bytes};
use common::{assert_f32_eq, assert_no_path, run_fish, TestContext};
use pixfish::{
    ComponentDesc, ConversionDesc, ConversionFn, Entity, FishKind, FormatDesc, Kind, ModelDesc,
    TypeDesc,
};
use pretty_assertions::assert_eq;

#[test]
fn test_identity_fish_copies() {
    let ctx = TestContext::with_base_set();
    let fish = ctx.fish("RGBA u8", "RGBA u8").unwrap();

    assert_eq!(fish.kind(), FishKind::Identity);
    assert_eq!(fish.cost(), 0.0);
    assert!(fish.conversions().is_empty());
    assert_eq!(run_fish(&fish, &[1, 2, 3, 4, 5, 6, 7, 8]), vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_repeated_requests_share_one_fish() {
    let ctx = TestContext::with_base_set();
    let first = ctx.fish("RGB u8", "Y float").unwrap();
    let second = ctx.fish("RGB u8", "Y float").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(ctx.cached_fishes(), 1);
}

#[test]
fn test_resolution_is_deterministic_across_contexts() {
    let a = TestContext::with_base_set();
    let b = TestContext::with_base_set();

    let fa = a.fish("R'G'B'A u8", "YA float").unwrap();
    let fb = b.fish("R'G'B'A u8", "YA float").unwrap();
    assert_eq!(fa.describe(), fb.describe());
    assert_eq!(fa.cost(), fb.cost());
    assert_eq!(fa.conversions().len(), fb.conversions().len());
}

#[test]
fn test_every_base_format_reaches_every_other() {
    let ctx = TestContext::with_base_set();
    let formats = ctx.entities(Kind::Format).unwrap();

    for source in &formats {
        for destination in &formats {
            let fish = ctx.fish(source.id(), destination.id());
            assert!(
                fish.is_ok(),
                "{} -> {}: {:?}",
                source.name(),
                destination.name(),
                fish.err()
            );
        }
    }
}

#[test]
fn test_direct_path_preferred() {
    let ctx = TestContext::with_base_set();
    let fish = ctx.fish("R'G'B' u8", "R'G'B'A u8").unwrap();
    assert_eq!(fish.kind(), FishKind::Direct);
    assert_eq!(fish.cost(), 0.5);
    assert_eq!(run_fish(&fish, &[10, 20, 30]), vec![10, 20, 30, 255]);
}

#[test]
fn test_unconnected_models_have_no_path() {
    let ctx = TestContext::with_base_set();
    let c = ctx.register_component(ComponentDesc::new("C")).unwrap();
    let m = ctx.register_component(ComponentDesc::new("M")).unwrap();
    let cm = ctx.register_model(ModelDesc::new(&[c, m])).unwrap();
    let u8_type = ctx.type_id("u8").unwrap();
    let cm_u8 = ctx.register_format(FormatDesc::new(cm, u8_type)).unwrap();

    let reason = assert_no_path(ctx.fish(cm_u8, "RGBA u8"));
    assert!(reason.contains("no model path"), "{reason}");
}

#[test]
fn test_type_without_reference_path_has_no_path() {
    let ctx = TestContext::with_base_set();
    let odd = ctx.register_type(TypeDesc::new("odd24", 24)).unwrap();
    let y = ctx.model_id("Y").unwrap();
    let y_odd = ctx.register_format(FormatDesc::new(y, odd)).unwrap();

    let reason = assert_no_path(ctx.fish(y_odd, "Y float"));
    assert!(reason.contains("no type path from 'odd24'"), "{reason}");
    let reason = assert_no_path(ctx.fish("Y float", y_odd));
    assert!(reason.contains("no type path"), "{reason}");
}

#[test]
fn test_anonymous_formats_connect_by_width() {
    let ctx = TestContext::with_base_set();
    let u8_type = ctx.type_id("u8").unwrap();
    let double = ctx.type_id("double").unwrap();

    let bytes3 = ctx.register_format_n(u8_type, 3).unwrap();
    assert_eq!(ctx.register_format_n(u8_type, 3).unwrap(), bytes3);
    assert_eq!(ctx.get_name(bytes3).unwrap(), "u8 x3");
    let doubles3 = ctx.register_format_n(double, 3).unwrap();
    let doubles4 = ctx.register_format_n(double, 4).unwrap();

    let fish = ctx.fish(bytes3, doubles3).unwrap();
    let out = run_fish(&fish, &[0, 255, 0]);
    common::assert_f64_eq(&out, &[0.0, 1.0, 0.0]);

    assert_no_path(ctx.fish(bytes3, doubles4));
    assert_no_path(ctx.fish(bytes3, "RGB u8"));
}

#[test]
fn test_equal_cost_tie_goes_to_first_registered() {
    let ctx = TestContext::new();
    let s = fixtures::scalars(&ctx);
    let first = ctx.register_conversion(constant_edge(s.a, s.b, 1.0)).unwrap();
    let second = ctx.register_conversion(constant_edge(s.a, s.b, 2.0)).unwrap();
    assert_ne!(first, second);

    let fish = ctx.fish(s.a, s.b).unwrap();
    assert_eq!(fish.conversions(), &[first]);
    assert_f32_eq(&run_fish(&fish, &f32_bytes(&[0.0, 0.0])), &[1.0, 1.0]);
}

#[test]
fn test_fewer_edges_win_equal_cost() {
    let ctx = TestContext::new();
    let s = fixtures::scalars(&ctx);
    let c = ctx
        .register_format(FormatDesc::new(s.model, s.float).name("c"))
        .unwrap();

    ctx.register_conversion(constant_edge(s.a, c, 5.0).cost(1.0))
        .unwrap();
    ctx.register_conversion(constant_edge(c, s.b, 6.0).cost(1.0))
        .unwrap();
    let direct = ctx
        .register_conversion(constant_edge(s.a, s.b, 7.0).cost(2.0))
        .unwrap();

    let fish = ctx.fish(s.a, s.b).unwrap();
    assert_eq!(fish.conversions(), &[direct]);
    assert_eq!(fish.cost(), 2.0);
}

#[test]
fn test_multi_edge_path_beats_expensive_edge() {
    let ctx = TestContext::new();
    let s = fixtures::scalars(&ctx);
    let c = ctx
        .register_format(FormatDesc::new(s.model, s.float).name("c"))
        .unwrap();

    ctx.register_conversion(constant_edge(s.a, s.b, 9.0).cost(10.0))
        .unwrap();
    let hop1 = ctx
        .register_conversion(constant_edge(s.a, c, 5.0).cost(1.0))
        .unwrap();
    let hop2 = ctx
        .register_conversion(ConversionDesc::formats(
            c,
            s.b,
            ConversionFn::linear(|src, dst, n| {
                for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)).take(n) {
                    let v = f32::from_ne_bytes([s[0], s[1], s[2], s[3]]) + 1.0;
                    d.copy_from_slice(&v.to_ne_bytes());
                }
            }),
        ))
        .unwrap();

    let fish = ctx.fish(s.a, s.b).unwrap();
    assert_eq!(fish.conversions(), &[hop1, hop2]);
    assert_eq!(fish.cost(), 2.0);
    assert_f32_eq(&run_fish(&fish, &f32_bytes(&[0.0; 3])), &[6.0; 3]);
}

#[test]
fn test_new_conversion_invalidates_cache_but_old_fish_survives() {
    let ctx = TestContext::new();
    let s = fixtures::scalars(&ctx);
    ctx.register_conversion(constant_edge(s.a, s.b, 1.0).cost(2.0))
        .unwrap();

    let old = ctx.fish(s.a, s.b).unwrap();
    assert_eq!(ctx.cached_fishes(), 1);

    ctx.register_conversion(constant_edge(s.a, s.b, 3.0).cost(1.0))
        .unwrap();
    assert_eq!(ctx.cached_fishes(), 0);

    let new = ctx.fish(s.a, s.b).unwrap();
    assert!(!Arc::ptr_eq(&old, &new));
    assert_f32_eq(&run_fish(&new, &f32_bytes(&[0.0])), &[3.0]);
    assert_f32_eq(&run_fish(&old, &f32_bytes(&[0.0])), &[1.0]);
}

#[test]
fn test_registering_formats_keeps_cache() {
    let ctx = TestContext::with_base_set();
    ctx.fish("RGB u8", "RGBA u8").unwrap();

    let rgba = ctx.model_id("RGBA").unwrap();
    let u16_type = ctx.type_id("u16").unwrap();
    ctx.register_format(FormatDesc::new(rgba, u16_type)).unwrap();
    assert_eq!(ctx.cached_fishes(), 1);
}

#[test]
fn test_decomposed_cost_counts_type_edges() {
    let ctx = TestContext::with_base_set();
    let fish = ctx.fish("Y u8", "RGB float").unwrap();

    assert_eq!(fish.kind(), FishKind::Decomposed);
    // u8 -> double, Y -> RGBA -> RGB, then double -> float for three channels
    assert_eq!(fish.conversions().len(), 6);
    assert_eq!(fish.cost(), 6.0);

    let names: Vec<String> = fish
        .conversions()
        .iter()
        .map(|id| ctx.get_name(*id).unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "u8 to double",
            "Y to RGBA",
            "RGBA to RGB",
            "double to float",
            "double to float",
            "double to float",
        ]
    );
}

#[test]
fn test_reference_type_falls_back_to_most_precise() {
    let ctx = TestContext::new();
    let ids = fixtures::gray_rgb(&ctx);
    assert_eq!(ctx.reference_type().unwrap().as_deref(), Some("float"));

    let entities = ctx.entities(Kind::Type).unwrap();
    assert!(matches!(&entities[0], Entity::Type(t) if t.id == ids.float));
}
