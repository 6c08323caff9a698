//! grayflow: command-line front end for the grayscale processing engine.
//!
//! Loads images into an [`ImageStore`], runs a flow document against them
//! and fulfils the flow's display, histogram and save requests on the
//! filesystem.
//!
//! # Usage
//!
//! ```text
//! grayflow run --flow edges.json --input photo.png --out-dir out/
//! grayflow run --flow-json '{"steps":[...]}' --input scan.raw --width 640 --height 480
//! grayflow info scan.raw
//! grayflow convert photo.jpg photo.raw
//! ```
//!
//! Set `RUST_LOG=debug` to trace every step and RAW header decision.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use grayflow_export::raw::HEADER_LEN;
use grayflow_pipeline::{Dimensions, Flow, GrayImage, ImageStore, RunReport, StepOutput};

/// Grayscale image-processing workbench.
///
/// Runs flows of point, neighbourhood and multi-image transforms over
/// 8-bit grayscale images, and converts between common image formats and
/// the RAW format.
#[derive(Parser)]
#[command(name = "grayflow", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a flow over one or more input images.
    Run(RunArgs),

    /// Report whether a RAW file carries a dimension header.
    Info {
        /// Path to the RAW file.
        path: PathBuf,
    },

    /// Convert an image or RAW file to RAW or PNG (chosen by extension).
    Convert {
        /// Input file (PNG, JPEG, BMP, WebP, or RAW).
        input: PathBuf,

        /// Output file; `.png` renders, anything else writes RAW.
        output: PathBuf,

        #[command(flatten)]
        dimensions: DimensionArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Flow document (JSON file).
    #[arg(long, conflicts_with = "flow_json", required_unless_present = "flow_json")]
    flow: Option<PathBuf>,

    /// Flow document as an inline JSON string.
    #[arg(long)]
    flow_json: Option<String>,

    /// Input images, stored in order as img_1, img_2, ...
    #[arg(long = "input", short, required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    dimensions: DimensionArgs,

    /// Directory for saved RAW files and PNG renders.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the run report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// Dimensions for legacy RAW files without a header.
#[derive(Args)]
struct DimensionArgs {
    /// Width of headerless RAW input.
    #[arg(long, requires = "height", value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    width: Option<u32>,

    /// Height of headerless RAW input.
    #[arg(long, requires = "width", value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    height: Option<u32>,
}

impl DimensionArgs {
    const fn get(&self) -> Option<Dimensions> {
        match (self.width, self.height) {
            (Some(width), Some(height)) => Some(Dimensions::new(width, height)),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(&args),
        Command::Info { path } => info(&path),
        Command::Convert {
            input,
            output,
            dimensions,
        } => convert(&input, &output, dimensions.get()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// Parse the flow document from `--flow` or `--flow-json`.
fn flow_from_args(args: &RunArgs) -> Result<Flow, String> {
    if let Some(ref json) = args.flow_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --flow-json: {e}"));
    }
    let path = args
        .flow
        .as_deref()
        .ok_or_else(|| "Either --flow or --flow-json is required".to_string())?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn run(args: &RunArgs) -> Result<(), String> {
    let mut flow = flow_from_args(args)?;

    let mut store = ImageStore::new();
    for path in &args.inputs {
        let image = load_image(path, args.dimensions.get())?;
        let id = store.put(image);
        eprintln!("Loaded {} as {id}", path.display());
    }
    eprintln!("Flow: {} steps", flow.len());
    eprintln!();

    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| format!("Error creating {}: {e}", args.out_dir.display()))?;

    let report = flow.run(&mut store).map_err(|e| format!("Flow error: {e}"))?;

    fulfil_requests(&report, &store, &args.out_dir)?;

    let final_image = store.get(report.final_image).map_err(|e| e.to_string())?;
    write_png(&args.out_dir.join("final.png"), &final_image)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Error serializing report: {e}"))?;
        println!("{json}");
    } else {
        println!("{}", report.report());
        println!("Store:");
        for entry in store.list() {
            println!("  {}  {}", entry.id, entry.dimensions);
        }
    }
    Ok(())
}

/// Carry out the display, histogram and save requests a run emitted, in
/// step order.
fn fulfil_requests(report: &RunReport, store: &ImageStore, out_dir: &Path) -> Result<(), String> {
    for record in &report.steps {
        match &record.output {
            StepOutput::Skipped | StepOutput::Produced { .. } => {}
            StepOutput::Display { image } => {
                let buffer = store.get(*image).map_err(|e| e.to_string())?;
                let name = format!("step_{}_{image}.png", record.index);
                write_png(&out_dir.join(name), &buffer)?;
            }
            StepOutput::Composite {
                first,
                second,
                canvas,
            } => {
                let name = format!("step_{}_{first}_vs_{second}.png", record.index);
                write_png(&out_dir.join(name), canvas)?;
            }
            StepOutput::Histogram { image, histogram } => {
                let mode = histogram
                    .mode()
                    .map_or_else(|| "-".to_string(), |v| v.to_string());
                eprintln!(
                    "Histogram {image}: {} px, mode {mode} ({} px)",
                    histogram.total(),
                    histogram.max_count(),
                );
                let path = out_dir.join(format!("step_{}_{image}_hist.png", record.index));
                let png = grayflow_export::histogram_png(histogram)
                    .map_err(|e| format!("Error rendering {}: {e}", path.display()))?;
                std::fs::write(&path, &png)
                    .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
                eprintln!("Rendered {} ({} bytes)", path.display(), png.len());
            }
            StepOutput::Save { image, filename } => {
                let buffer = store.get(*image).map_err(|e| e.to_string())?;
                let path = save_path(out_dir, filename)?;
                let bytes = grayflow_export::encode_raw(&buffer);
                std::fs::write(&path, &bytes)
                    .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
                eprintln!("Saved {image} to {} ({} bytes)", path.display(), bytes.len());
            }
        }
    }
    Ok(())
}

/// Resolve a `save_file` name inside `out_dir`.
///
/// The name must be a single plain file name: no directories, no `..`, no
/// root.
fn save_path(out_dir: &Path, filename: &str) -> Result<PathBuf, String> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Ok(out_dir.join(name)),
        _ => Err(format!(
            "Invalid save filename {filename:?}: must be a plain file name"
        )),
    }
}

/// Bytes after the header and the `width * height` payload.
fn trailing_bytes(file_len: usize, dimensions: Dimensions) -> u64 {
    (file_len as u64).saturating_sub(HEADER_LEN as u64 + dimensions.pixel_count())
}

fn info(path: &Path) -> Result<(), String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    println!("File: {} ({} bytes)", path.display(), bytes.len());
    match grayflow_export::detect_header(&bytes) {
        Some(dimensions) => {
            println!("Header: {dimensions}");
            println!(
                "Payload: {} bytes, {} trailing",
                dimensions.pixel_count(),
                trailing_bytes(bytes.len(), dimensions),
            );
        }
        None => println!("Header: none (pass --width and --height to read this file)"),
    }
    Ok(())
}

fn convert(input: &Path, output: &Path, dimensions: Option<Dimensions>) -> Result<(), String> {
    let image = load_image(input, dimensions)?;
    if has_extension(output, &["png"]) {
        write_png(output, &image)
    } else {
        let bytes = grayflow_export::encode_raw(&image);
        std::fs::write(output, &bytes)
            .map_err(|e| format!("Error writing {}: {e}", output.display()))?;
        eprintln!(
            "Wrote {} ({}, {} bytes)",
            output.display(),
            Dimensions::of(&image),
            bytes.len()
        );
        Ok(())
    }
}

/// Read an input file: `.raw`/`.bin` through the RAW codec, anything else
/// through the image decoder.
fn load_image(path: &Path, dimensions: Option<Dimensions>) -> Result<GrayImage, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    log::debug!("read {} ({} bytes)", path.display(), bytes.len());
    if has_extension(path, &["raw", "bin"]) {
        grayflow_export::decode_raw(&bytes, dimensions)
            .map_err(|e| format!("Error decoding {}: {e}", path.display()))
    } else {
        grayflow_pipeline::grayscale::decode_and_grayscale(&bytes)
            .map_err(|e| format!("Error decoding {}: {e}", path.display()))
    }
}

fn write_png(path: &Path, image: &GrayImage) -> Result<(), String> {
    let png = grayflow_export::encode_png(image)
        .map_err(|e| format!("Error rendering {}: {e}", path.display()))?;
    std::fs::write(path, &png).map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    eprintln!("Rendered {} ({} bytes)", path.display(), png.len());
    Ok(())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}
