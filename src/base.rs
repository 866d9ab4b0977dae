//! Built-in starter registry.
//!
//! Integer types map their declared range (the unit interval unless given)
//! onto their full code range and clip on the way back. Model conversions
//! all go through linear-light `RGBA` and operate on `double` model space.

use pixel_kernels::{luma, scalar, transfer, Range};

use crate::config::EngineConfig;
use crate::context::Context;
use crate::conversion::{ConversionFn, Planes, PlanesMut};
use crate::error::FishError;
use crate::registry::{
    ComponentDesc, ConversionDesc, Encoding, Entity, FormatDesc, Id, Kind, ModelDesc, Store,
    TypeDesc,
};

/// Type name base model conversions expect as model space
pub const BASE_REFERENCE: &str = "double";

const MAX_COMPONENTS: usize = 4;

type Decode = fn(&Planes<'_>, usize, Range) -> f64;
type Encode = fn(&mut PlanesMut<'_>, usize, f64, Range);

struct Types {
    u8: Id,
    float: Id,
    double: Id,
}

struct Models {
    rgba: Id,
    rgb: Id,
    y: Id,
    ya: Id,
    srgba: Id,
    srgb: Id,
    sy: Id,
}

/// Register the base types, components, models, conversions and formats
/// into `store`.
///
/// Fails with [`FishError::InvalidArgument`] before registering anything
/// when `config` names a reference type other than [`BASE_REFERENCE`]:
/// the base model conversions read and write `double` model space.
pub fn install(store: &mut Store, config: &EngineConfig) -> Result<(), FishError> {
    if config.reference_type != BASE_REFERENCE {
        return Err(FishError::invalid(format!(
            "base set needs reference type '{BASE_REFERENCE}', configured '{}'",
            config.reference_type
        )));
    }

    let types = install_types(store)?;
    let models = install_models(store)?;
    install_formats(store, &types, &models)?;

    tracing::debug!(
        formats = store.count(Kind::Format),
        conversions = store.count(Kind::Conversion),
        "Installed base set"
    );
    Ok(())
}

/// Register an unsigned integer type together with its edges to and from
/// `double`, scaled over the type's declared range.
///
/// Needs an initialized context holding the base set.
pub fn register_unsigned_type(ctx: &Context, desc: TypeDesc) -> Result<Id, FishError> {
    let desc = desc.encoding(Encoding::Unsigned);
    codecs(&desc.name, desc.bits)?;
    ctx.with_store_invalidating(|store| {
        let double = store
            .lookup_by_name(Kind::Type, BASE_REFERENCE)
            .map(Entity::id)
            .ok_or_else(|| FishError::not_found(Kind::Type, BASE_REFERENCE))?;
        let id = store.register_type(desc)?;
        unsigned_edges(store, id, double)?;
        Ok(id)
    })
}

fn install_types(store: &mut Store) -> Result<Types, FishError> {
    let unsigned = |name: &str, bits| {
        TypeDesc::new(name, bits)
            .range(0.0, 1.0)
            .encoding(Encoding::Unsigned)
    };
    let u8 = store.register_type(unsigned("u8", 8))?;
    let u16 = store.register_type(unsigned("u16", 16))?;
    let u32 = store.register_type(unsigned("u32", 32))?;
    let types = Types {
        u8,
        float: store.register_type(TypeDesc::new("float", 32).encoding(Encoding::Float))?,
        double: store
            .register_type(TypeDesc::new(BASE_REFERENCE, 64).encoding(Encoding::Float))?,
    };

    for id in [u8, u16, u32] {
        unsigned_edges(store, id, types.double)?;
    }

    let range = store.type_info(types.float)?.range();
    store.register_conversion(ConversionDesc::types(
        types.float,
        types.double,
        ConversionFn::planar(move |src, dst, n| {
            for i in 0..n {
                dst.write_f64(0, i, scalar::f32_to_f64(src.read_f32(0, i), range));
            }
        }),
    ))?;
    store.register_conversion(ConversionDesc::types(
        types.double,
        types.float,
        ConversionFn::planar(move |src, dst, n| {
            for i in 0..n {
                dst.write_f32(0, i, scalar::f64_to_f32(src.read_f64(0, i), range));
            }
        }),
    ))?;

    Ok(types)
}

fn codecs(name: &str, bits: u32) -> Result<(Decode, Encode), FishError> {
    match bits {
        8 => Ok((decode_u8, encode_u8)),
        16 => Ok((decode_u16, encode_u16)),
        32 => Ok((decode_u32, encode_u32)),
        _ => Err(FishError::invalid(format!(
            "unsigned type '{name}' must be 8, 16 or 32 bits, got {bits}"
        ))),
    }
}

fn decode_u8(p: &Planes<'_>, i: usize, range: Range) -> f64 {
    scalar::u8_to_f64(p.read_u8(0, i), range)
}

fn decode_u16(p: &Planes<'_>, i: usize, range: Range) -> f64 {
    scalar::u16_to_f64(p.read_u16(0, i), range)
}

fn decode_u32(p: &Planes<'_>, i: usize, range: Range) -> f64 {
    scalar::u32_to_f64(p.read_u32(0, i), range)
}

fn encode_u8(p: &mut PlanesMut<'_>, i: usize, v: f64, range: Range) {
    p.write_u8(0, i, scalar::f64_to_u8(v, range));
}

fn encode_u16(p: &mut PlanesMut<'_>, i: usize, v: f64, range: Range) {
    p.write_u16(0, i, scalar::f64_to_u16(v, range));
}

fn encode_u32(p: &mut PlanesMut<'_>, i: usize, v: f64, range: Range) {
    p.write_u32(0, i, scalar::f64_to_u32(v, range));
}

/// Edges between an unsigned type and `double` over the type's own range.
fn unsigned_edges(store: &mut Store, id: Id, double: Id) -> Result<(), FishError> {
    let info = store.type_info(id)?;
    let (decode, encode) = codecs(&info.name, info.bits)?;
    let range = info.range().unwrap_or(Range::UNIT);

    store.register_conversion(ConversionDesc::types(
        id,
        double,
        ConversionFn::planar(move |src, dst, n| {
            for i in 0..n {
                dst.write_f64(0, i, decode(src, i, range));
            }
        }),
    ))?;
    store.register_conversion(ConversionDesc::types(
        double,
        id,
        ConversionFn::planar(move |src, dst, n| {
            for i in 0..n {
                encode(dst, i, src.read_f64(0, i), range);
            }
        }),
    ))?;
    Ok(())
}

/// Wrap a per-pixel function over `double` model space as a linear edge.
fn per_pixel(inputs: usize, outputs: usize, f: fn(&[f64], &mut [f64])) -> ConversionFn {
    ConversionFn::linear(move |src, dst, n| {
        let mut input = [0.0f64; MAX_COMPONENTS];
        let mut output = [0.0f64; MAX_COMPONENTS];
        let src_pixels = src.chunks_exact(inputs * 8);
        let dst_pixels = dst.chunks_exact_mut(outputs * 8);
        for (s, d) in src_pixels.zip(dst_pixels).take(n) {
            for (value, bytes) in input.iter_mut().zip(s.chunks_exact(8)) {
                *value = f64::from_ne_bytes(bytes.try_into().unwrap_or([0; 8]));
            }
            f(&input[..inputs], &mut output[..outputs]);
            for (value, bytes) in output.iter().zip(d.chunks_exact_mut(8)) {
                bytes.copy_from_slice(&value.to_ne_bytes());
            }
        }
    })
}

fn install_models(store: &mut Store) -> Result<Models, FishError> {
    let r = store.register_component(ComponentDesc::new("R"))?;
    let g = store.register_component(ComponentDesc::new("G"))?;
    let b = store.register_component(ComponentDesc::new("B"))?;
    let a = store.register_component(ComponentDesc::new("A").alpha())?;
    let y = store.register_component(ComponentDesc::new("Y"))?;
    let sr = store.register_component(ComponentDesc::new("R'"))?;
    let sg = store.register_component(ComponentDesc::new("G'"))?;
    let sb = store.register_component(ComponentDesc::new("B'"))?;
    let sy = store.register_component(ComponentDesc::new("Y'"))?;

    let models = Models {
        rgba: store.register_model(ModelDesc::new(&[r, g, b, a]))?,
        rgb: store.register_model(ModelDesc::new(&[r, g, b]))?,
        y: store.register_model(ModelDesc::new(&[y]))?,
        ya: store.register_model(ModelDesc::new(&[y, a]))?,
        srgba: store.register_model(ModelDesc::new(&[sr, sg, sb, a]))?,
        srgb: store.register_model(ModelDesc::new(&[sr, sg, sb]))?,
        sy: store.register_model(ModelDesc::new(&[sy]))?,
    };

    let mut pair = |model: Id,
                    inputs: usize,
                    to_rgba: fn(&[f64], &mut [f64]),
                    from_rgba: fn(&[f64], &mut [f64])|
     -> Result<(), FishError> {
        store.register_conversion(ConversionDesc::models(
            model,
            models.rgba,
            per_pixel(inputs, 4, to_rgba),
        ))?;
        store.register_conversion(ConversionDesc::models(
            models.rgba,
            model,
            per_pixel(4, inputs, from_rgba),
        ))?;
        Ok(())
    };

    pair(
        models.rgb,
        3,
        |s, d| d.copy_from_slice(&[s[0], s[1], s[2], 1.0]),
        |s, d| d.copy_from_slice(&s[..3]),
    )?;
    pair(
        models.y,
        1,
        |s, d| d.copy_from_slice(&[s[0], s[0], s[0], 1.0]),
        |s, d| d[0] = luma::luminance(s[0], s[1], s[2]),
    )?;
    pair(
        models.ya,
        2,
        |s, d| d.copy_from_slice(&[s[0], s[0], s[0], s[1]]),
        |s, d| d.copy_from_slice(&[luma::luminance(s[0], s[1], s[2]), s[3]]),
    )?;
    pair(
        models.srgba,
        4,
        |s, d| {
            for (out, v) in d.iter_mut().zip(&s[..3]) {
                *out = transfer::srgb_to_linear(*v);
            }
            d[3] = s[3];
        },
        |s, d| {
            for (out, v) in d.iter_mut().zip(&s[..3]) {
                *out = transfer::linear_to_srgb(*v);
            }
            d[3] = s[3];
        },
    )?;
    pair(
        models.srgb,
        3,
        |s, d| {
            for (out, v) in d.iter_mut().zip(s) {
                *out = transfer::srgb_to_linear(*v);
            }
            d[3] = 1.0;
        },
        |s, d| {
            for (out, v) in d.iter_mut().zip(&s[..3]) {
                *out = transfer::linear_to_srgb(*v);
            }
        },
    )?;
    pair(
        models.sy,
        1,
        |s, d| {
            let y = transfer::srgb_to_linear(s[0]);
            d.copy_from_slice(&[y, y, y, 1.0]);
        },
        |s, d| d[0] = transfer::linear_to_srgb(luma::luminance(s[0], s[1], s[2])),
    )?;

    Ok(models)
}

fn install_formats(store: &mut Store, types: &Types, models: &Models) -> Result<(), FishError> {
    let mut format = |model: Id, type_id: Id| store.register_format(FormatDesc::new(model, type_id));

    format(models.rgba, types.double)?;
    format(models.rgba, types.float)?;
    format(models.rgba, types.u8)?;
    format(models.rgb, types.u8)?;
    format(models.rgb, types.float)?;
    let srgba_u8 = format(models.srgba, types.u8)?;
    let srgb_u8 = format(models.srgb, types.u8)?;
    format(models.y, types.u8)?;
    format(models.y, types.float)?;
    format(models.ya, types.float)?;
    format(models.sy, types.u8)?;

    // 8-bit sRGB alpha add/drop needs no trip through model space
    store.register_conversion(
        ConversionDesc::formats(
            srgba_u8,
            srgb_u8,
            ConversionFn::linear(|src, dst, n| {
                for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(3)).take(n) {
                    d.copy_from_slice(&s[..3]);
                }
            }),
        )
        .cost(0.5),
    )?;
    store.register_conversion(
        ConversionDesc::formats(
            srgb_u8,
            srgba_u8,
            ConversionFn::linear(|src, dst, n| {
                for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)).take(n) {
                    d[..3].copy_from_slice(s);
                    d[3] = u8::MAX;
                }
            }),
        )
        .cost(0.5),
    )?;

    Ok(())
}
