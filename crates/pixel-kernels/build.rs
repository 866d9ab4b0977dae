use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// IEC 61966-2-1 exact formula: sRGB to linear
fn srgb_to_linear_exact(srgb: f64) -> f64 {
    if srgb <= 0.04045 {
        srgb / 12.92
    } else {
        ((srgb + 0.055) / 1.055).powf(2.4)
    }
}

/// IEC 61966-2-1 exact formula: linear to sRGB
fn linear_to_srgb_exact(linear: f64) -> f64 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

fn write_table(file: &mut File, name: &str, doc: &str, f: fn(f64) -> f64) {
    writeln!(file, "/// {doc}").unwrap();
    writeln!(file, "/// Index: input value * 4095.0").unwrap();
    writeln!(file, "pub static {name}: [f64; 4096] = [").unwrap();
    for i in 0..4096 {
        if i > 0 && i % 4 == 0 {
            writeln!(file).unwrap();
        }
        write!(file, "    {:.17e},", f(i as f64 / 4095.0)).unwrap();
    }
    writeln!(file, "\n];").unwrap();
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("transfer_lut.rs");
    let mut file = File::create(&dest_path).unwrap();

    write_table(
        &mut file,
        "SRGB_TO_LINEAR",
        "Lookup table for sRGB to linear conversion",
        srgb_to_linear_exact,
    );
    writeln!(file).unwrap();
    write_table(
        &mut file,
        "LINEAR_TO_SRGB",
        "Lookup table for linear to sRGB conversion",
        linear_to_srgb_exact,
    );

    println!("cargo::rerun-if-changed=build.rs");
}
