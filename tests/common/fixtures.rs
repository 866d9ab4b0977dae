//! Test fixtures: byte helpers and small hand-built registries.

use pixfish::{
    ComponentDesc, Context, ConversionDesc, ConversionFn, Encoding, FormatDesc, Id, ModelDesc,
    TypeDesc,
};

pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

pub fn f32_values(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

pub fn f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

pub fn f64_values(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
        .collect()
}

/// Gray and RGB over a single unbounded `float` type, with one model
/// conversion replicating gray into all three channels.
pub struct GrayRgb {
    pub float: Id,
    pub gray_model: Id,
    pub rgb_model: Id,
    pub gray_to_rgb: Id,
    pub gray: Id,
    pub rgb: Id,
}

pub fn gray_rgb(ctx: &Context) -> GrayRgb {
    let float = ctx
        .register_type(TypeDesc::new("float", 32).encoding(Encoding::Float))
        .unwrap();

    let y = ctx.register_component(ComponentDesc::new("Y")).unwrap();
    let r = ctx.register_component(ComponentDesc::new("R")).unwrap();
    let g = ctx.register_component(ComponentDesc::new("G")).unwrap();
    let b = ctx.register_component(ComponentDesc::new("B")).unwrap();

    let gray_model = ctx
        .register_model(ModelDesc::new(&[y]).name("gray"))
        .unwrap();
    let rgb_model = ctx
        .register_model(ModelDesc::new(&[r, g, b]).name("rgb"))
        .unwrap();

    let gray_to_rgb = ctx
        .register_conversion(ConversionDesc::models(
            gray_model,
            rgb_model,
            ConversionFn::linear(|src, dst, n| {
                for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(12)).take(n) {
                    for channel in d.chunks_exact_mut(4) {
                        channel.copy_from_slice(s);
                    }
                }
            }),
        ))
        .unwrap();

    let gray = ctx
        .register_format(FormatDesc::new(gray_model, float).name("gray-float"))
        .unwrap();
    let rgb = ctx
        .register_format(FormatDesc::new(rgb_model, float).name("rgb-float"))
        .unwrap();

    GrayRgb {
        float,
        gray_model,
        rgb_model,
        gray_to_rgb,
        gray,
        rgb,
    }
}

/// Two single-channel float formats with no conversions between them yet.
pub struct Scalars {
    pub float: Id,
    pub model: Id,
    pub a: Id,
    pub b: Id,
}

pub fn scalars(ctx: &Context) -> Scalars {
    let float = ctx
        .register_type(TypeDesc::new("float", 32).encoding(Encoding::Float))
        .unwrap();
    let v = ctx.register_component(ComponentDesc::new("v")).unwrap();
    let model = ctx.register_model(ModelDesc::new(&[v])).unwrap();
    let a = ctx
        .register_format(FormatDesc::new(model, float).name("a"))
        .unwrap();
    let b = ctx
        .register_format(FormatDesc::new(model, float).name("b"))
        .unwrap();
    Scalars { float, model, a, b }
}

/// Format edge for [`scalars`] formats that writes `value` into every pixel.
pub fn constant_edge(source: Id, destination: Id, value: f32) -> ConversionDesc {
    ConversionDesc::formats(
        source,
        destination,
        ConversionFn::linear(move |_, dst, n| {
            for d in dst.chunks_exact_mut(4).take(n) {
                d.copy_from_slice(&value.to_ne_bytes());
            }
        }),
    )
}
