use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixfish::config::CONFIG_ENV;
use pixfish::{Context, EngineConfig, Entity, Id, Kind};

#[derive(Parser)]
#[command(name = "pixfish")]
#[command(about = "pixfish - pixel format conversion engine")]
struct Cli {
    /// YAML engine configuration (overrides PIXFISH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered entities
    List {
        /// Only list one kind: type, component, model, format or conversion
        #[arg(short, long)]
        kind: Option<Kind>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the conversion path between two formats
    Path {
        /// Source format name (e.g. "RGBA u8")
        source: String,

        /// Destination format name
        destination: String,
    },
    /// Convert a raw pixel file from one format to another
    Convert {
        /// Source format name
        source: String,

        /// Destination format name
        destination: String,

        /// Raw input pixels
        #[arg(short, long)]
        input: PathBuf,

        /// Raw output pixels
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixfish=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = EngineConfig {
        base_set: true,
        ..EngineConfig::load(cli.config.as_deref())
    };
    let ctx = Context::new(config);
    ctx.init()?;

    let result = match cli.command {
        Some(Commands::List { kind, json }) => run_list_command(&ctx, kind, json),
        Some(Commands::Path {
            source,
            destination,
        }) => run_path_command(&ctx, &source, &destination),
        Some(Commands::Convert {
            source,
            destination,
            input,
            output,
        }) => run_convert_command(&ctx, &source, &destination, &input, &output),
        None => run_status_command(&ctx, cli.config.as_deref()),
    };

    ctx.exit()?;
    result
}

#[derive(Serialize)]
struct EntityEntry {
    id: String,
    kind: &'static str,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

fn describe_entity(ctx: &Context, entity: &Entity) -> EntityEntry {
    let name_of = |id: Id| ctx.get_name(id).unwrap_or_else(|_| id.to_string());
    let detail = match entity {
        Entity::Type(t) => Some(format!("{} bits, {:?}", t.bits, t.encoding)),
        Entity::Component(c) => c.alpha.then(|| "alpha".to_string()),
        Entity::Model(m) => Some(format!("{} components", m.n_components())),
        Entity::Format(f) => Some(format!(
            "{} bytes/pixel{}{}",
            f.bytes_per_pixel,
            if f.alpha { ", alpha" } else { "" },
            if f.planar { ", planar" } else { "" }
        )),
        Entity::Conversion(c) => Some(format!(
            "{} -> {}, {}, cost {}",
            name_of(c.source),
            name_of(c.destination),
            c.convention(),
            c.cost
        )),
    };
    EntityEntry {
        id: entity.id().to_string(),
        kind: entity.kind().as_str(),
        name: entity.name().to_string(),
        detail,
    }
}

fn run_list_command(ctx: &Context, kind: Option<Kind>, json: bool) -> anyhow::Result<()> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => Kind::ALL.to_vec(),
    };

    let mut entries = Vec::new();
    for kind in kinds {
        for entity in ctx.entities(kind)? {
            entries.push(describe_entity(ctx, &entity));
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "{:<6} {:<10} {:<width$}  {}",
            entry.id,
            entry.kind,
            entry.name,
            entry.detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn run_path_command(ctx: &Context, source: &str, destination: &str) -> anyhow::Result<()> {
    let fish = ctx.fish(source, destination)?;

    println!(
        "{} -> {} ({}, cost {})",
        fish.source().name,
        fish.destination().name,
        fish.kind(),
        fish.cost()
    );
    for (i, stage) in fish.describe().iter().enumerate() {
        println!("  {}. {stage}", i + 1);
    }
    Ok(())
}

fn run_convert_command(
    ctx: &Context,
    source: &str,
    destination: &str,
    input: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let fish = ctx.fish(source, destination)?;
    let pixels = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let bpp = fish.source().bytes_per_pixel;
    if pixels.len() % bpp != 0 {
        anyhow::bail!(
            "{} is {} bytes, not a whole number of '{}' pixels ({bpp} bytes each)",
            input.display(),
            pixels.len(),
            fish.source().name
        );
    }

    let n = pixels.len() / bpp;
    let mut converted = vec![0u8; n * fish.destination().bytes_per_pixel];
    fish.process(&pixels, &mut converted, n);

    std::fs::write(output, &converted)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Converted {n} pixels to {} ({} bytes)",
        output.display(),
        converted.len()
    );
    Ok(())
}

fn run_status_command(ctx: &Context, config_path: Option<&Path>) -> anyhow::Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("pixfish v{VERSION} - pixel format conversion engine\n");

    // Configuration section
    let env_config = std::env::var(CONFIG_ENV).ok();
    let config_source = match (config_path, env_config.as_deref()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) => format!("{path} ({CONFIG_ENV})"),
        (None, None) => "defaults".to_string(),
    };
    let config = ctx.config();
    println!("Configuration:");
    println!("  Source         = {config_source}");
    println!("  chunk_size     = {}", config.chunk_size);
    println!(
        "  reference_type = {}",
        ctx.reference_type()?.as_deref().unwrap_or("(none)")
    );

    println!("\nRegistry:");
    for kind in Kind::ALL {
        println!("  {:<12} {}", format!("{kind}s:"), ctx.count(kind)?);
    }

    println!("\nCommands:");
    println!("  pixfish list      List registered entities");
    println!("  pixfish path      Show the conversion path between two formats");
    println!("  pixfish convert   Convert a raw pixel file");
    println!("\nRun 'pixfish --help' for more details.");
    Ok(())
}
