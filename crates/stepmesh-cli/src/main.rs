//! stepmesh CLI - STEP to GLB conversion
//!
//! Converts STEP files to binary glTF and inspects inputs and outputs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use stepmesh::{glb, ConvertConfig, Converter, OutputFormat};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stepmesh", version)]
#[command(about = "Convert STEP (ISO 10303-21) models to binary glTF", long_about = None)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a STEP file to .glb or .gltf
    Convert {
        /// Input STEP file (.step or .stp)
        input: PathBuf,
        /// Output file (default: input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (default: from the output extension, else glb)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        /// TOML file with conversion settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Maximum chord deviation in model units
        #[arg(long)]
        linear_deflection: Option<f64>,
        /// Maximum angle between adjacent facets, in radians
        #[arg(long)]
        angular_deflection: Option<f64>,
        /// Keep each face in its surface's local frame
        #[arg(long)]
        no_placements: bool,
    },
    /// Display information about a STEP or GLB file
    Info {
        /// Path to the file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Glb,
    Gltf,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Glb => OutputFormat::Glb,
            Format::Gltf => OutputFormat::Gltf,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            config,
            linear_deflection,
            angular_deflection,
            no_placements,
        } => {
            let mut settings = match &config {
                Some(path) => ConvertConfig::from_path(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ConvertConfig::default(),
            };
            if let Some(v) = linear_deflection {
                settings.linear_deflection = v;
            }
            if let Some(v) = angular_deflection {
                settings.angular_deflection = v;
            }
            if no_placements {
                settings.apply_placements = false;
            }
            debug!(?settings, "resolved settings");
            let format = resolve_format(format, output.as_deref());
            let output = output.unwrap_or_else(|| input.with_extension(format.extension()));
            convert_file(&input, &output, format, settings)?;
        }
        Commands::Info { input } => {
            show_info(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit flag, then output extension, then GLB.
fn resolve_format(flag: Option<Format>, output: Option<&Path>) -> OutputFormat {
    if let Some(f) = flag {
        return f.into();
    }
    let ext = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("gltf") => OutputFormat::Gltf,
        _ => OutputFormat::Glb,
    }
}

fn convert_file(input: &Path, output: &Path, format: OutputFormat, config: ConvertConfig) -> Result<()> {
    let converter = Converter::new(config)?;
    let conversion = converter
        .convert_path(input, format)
        .with_context(|| format!("converting {}", input.display()))?;
    std::fs::write(output, &conversion.bytes)
        .with_context(|| format!("writing {}", output.display()))?;

    let report = &conversion.report;
    println!(
        "Converted {} faces to {} vertices, {} triangles",
        report.faces, report.vertices, report.triangles
    );
    println!(
        "  Welded {} vertices, dropped {} degenerate triangles",
        report.normalize.welded_vertices,
        report.assembly.degenerate_triangles + report.normalize.degenerate_triangles
    );
    println!("Wrote {} ({} bytes)", output.display(), report.output_bytes);
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    if bytes.starts_with(b"glTF") {
        let layout = glb::inspect(&bytes)?;
        println!("GLB container: {}", input.display());
        println!("  Version: {}", layout.version);
        println!("  Total length: {} bytes", layout.total_length);
        println!("  JSON chunk: {} bytes", layout.json_length);
        println!("  BIN chunk: {} bytes", layout.bin_length);
        if let Some(generator) = &layout.document.asset.generator {
            println!("  Generator: {}", generator);
        }
        if let (Some(v), Some(t)) = (layout.vertex_count(), layout.triangle_count()) {
            println!("  Vertices: {}", v);
            println!("  Triangles: {}", t);
        }
        return Ok(());
    }

    let shape = stepmesh::read_step_from_buffer(&bytes)?;
    println!("STEP file: {}", input.display());
    if !shape.schemas.is_empty() {
        println!("  Schemas: {}", shape.schemas.join(", "));
    }
    println!("  Bodies: {}", shape.bodies.len());
    for body in &shape.bodies {
        println!(
            "    #{}: {:?}, {} shell(s), {} face(s)",
            body.id,
            body.kind,
            body.shells.len(),
            body.face_count
        );
    }
    println!("  Faces: {}", shape.face_count());
    for (kind, count) in shape.surface_histogram() {
        println!("    {}: {}", kind, count);
    }
    Ok(())
}
