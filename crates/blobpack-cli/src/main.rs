use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use blobpack_core::alpha::{expand_alpha, extract_alpha};
use blobpack_core::config::RecordOrder;
use blobpack_core::source::{decode_image, load_input, resize_image};
use blobpack_core::verify::{byte_differences, decode_pixels, verify_table, write_reconstructed};
use blobpack_core::{InputImage, PackConfig, Table, deserialize_table, pack_images, serialize_table};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::DynamicImage;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "blobpack",
    about = "Pack a folder of images into an embeddable header table",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into a header table
    Pack(PackArgs),
    /// Parse a header table, check every record and optionally write the images back out
    Verify(VerifyArgs),
    /// Print per-record metadata and totals for a header table
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output header path
    #[arg(short, long, default_value = "image_data.h", help_heading = "Input/Output")]
    out: PathBuf,
    /// YAML config file path (overrides packaging options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Packaging
    /// Store only the alpha channel of each image
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Packaging")]
    alpha_only: bool,
    /// Resize every image to WxH before packaging
    #[arg(long, default_value = "64x64", help_heading = "Packaging")]
    resize: String,
    /// Keep source dimensions (overrides --resize)
    #[arg(long, default_value_t = false, help_heading = "Packaging")]
    no_resize: bool,
    /// Record order: input|name_asc
    #[arg(long, default_value = "input", help_heading = "Packaging")]
    order: String,
    /// Package images in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Packaging")]
    parallel: bool,

    // Export
    /// Write reconstructed images to this directory after packing
    #[arg(long, help_heading = "Export")]
    verify_dir: Option<PathBuf>,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Export a JSON manifest of packaging decisions (no payload bytes)
    #[arg(long, help_heading = "Export")]
    manifest: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: package and report but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct VerifyArgs {
    /// Header file produced by `blobpack pack`
    header: PathBuf,
    /// Write reconstructed images to this directory
    #[arg(long)]
    out: Option<PathBuf>,
    /// Compare decoded records against the source images in this directory
    #[arg(long)]
    against: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// Header file produced by `blobpack pack`
    header: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Verify(args) => run_verify(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let base = PackConfig {
        alpha_only: cli.alpha_only,
        target_size: if cli.no_resize {
            None
        } else {
            Some(parse_size(&cli.resize)?)
        },
        order: parse_order(&cli.order)?,
        parallel: cli.parallel,
    };
    // Config file overrides CLI options field by field
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_pack_config(base)?
    } else {
        base
    };
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    let (inputs, load_failures) =
        load_inputs_with_progress(&cli.input, &paths, cfg.target_size, show_progress)?;
    info!(count = inputs.len(), "loaded input images");

    let out = pack_images(inputs, &cfg)?;

    for record in &out.table {
        let saved = record.rgba_len() as i64 - record.payload.len() as i64;
        println!("Image: {}\nSaved {} bytes!", record.name, saved);
    }
    for failure in &out.failures {
        error!(key = %failure.key, error = %failure.error, "failed to package");
    }

    if !cli.dry_run {
        let header = serialize_table(&out.table);
        fs::write(&cli.out, header).with_context(|| format!("write {}", cli.out.display()))?;
        info!(
            path = ?cli.out,
            records = out.table.len(),
            elapsed = %fmt_dur(start.elapsed()),
            "header written"
        );

        if let Some(dir) = &cli.verify_dir {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            for record in &out.table {
                write_reconstructed(dir, record)
                    .with_context(|| format!("reconstruct {}", record.name))?;
            }
            info!(?dir, "reconstructed images written");
        }

        if let Some(path) = &cli.manifest {
            let value = blobpack_core::to_json_manifest(&out.table);
            fs::write(path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", path.display()))?;
            info!(?path, "manifest exported");
        }
    }

    let failed = load_failures + out.failures.len();
    if let Some(stats_path) = &cli.export_stats {
        let value = serde_json::json!({
            "stats": out.stats,
            "succeeded": out.table.len(),
            "failed": failed,
        });
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        }
    }

    println!(
        "Compression saved {} bytes! ({:.3}%)",
        out.stats.bytes_saved,
        out.stats.saved_percentage()
    );
    println!("{} packed, {} failed", out.table.len(), failed);
    if failed > 0 {
        warn!(failed, "some images were skipped");
    }
    Ok(())
}

fn run_verify(args: &VerifyArgs) -> anyhow::Result<()> {
    let table = read_table(&args.header)?;
    verify_table(&table).with_context(|| format!("verify {}", args.header.display()))?;
    info!(records = table.len(), "all records reconstruct to their advertised size");

    if let Some(dir) = &args.out {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        for record in &table {
            write_reconstructed(dir, record)
                .with_context(|| format!("reconstruct {}", record.name))?;
        }
        info!(?dir, "reconstructed images written");
    }

    if let Some(src_dir) = &args.against {
        for record in table.iter().filter(|r| !r.is_raw_encoding) {
            let path = src_dir.join(&record.name);
            let (rgba, w, h) = match decode_image(&path) {
                Ok(v) => v,
                Err(e) => {
                    warn!(?path, error = %e, "cannot compare, source unreadable");
                    continue;
                }
            };
            let rgba = if (w, h) != (record.width, record.height) {
                let (resized, _) = resize_image(
                    &DynamicImage::ImageRgba8(rgba),
                    (record.width, record.height),
                )?;
                resized.to_rgba8()
            } else {
                rgba
            };
            let expected = if record.is_alpha_only {
                expand_alpha(&extract_alpha(rgba.as_raw()))
            } else {
                rgba.into_raw()
            };
            let decoded = decode_pixels(record)?;
            let diff = byte_differences(&decoded, &expected);
            if diff.is_identical() {
                info!(name = %record.name, "identical to source");
            } else {
                info!(
                    name = %record.name,
                    differences = diff.differences.len(),
                    "differs from source"
                );
                tracing::trace!("{}", diff);
            }
        }
    }
    println!("{} records verified", table.len());
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let table = read_table(&args.header)?;
    for r in &table {
        let mode = if r.is_raw_encoding {
            "raw"
        } else if r.is_alpha_only {
            "rle-alpha"
        } else {
            "rle-rgba"
        };
        println!(
            "{:<32} {:>5}x{:<5} {:>9} B  {:<9} decompressed={}",
            r.name,
            r.width,
            r.height,
            r.payload.len(),
            mode,
            r.decompressed_size
        );
    }
    println!("{}", table.stats().summary());
    Ok(())
}

fn read_table(path: &Path) -> anyhow::Result<Table> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let table = deserialize_table(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(table)
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn parse_size(s: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("invalid size {:?}, expected WxH", s))?;
    let w = w.trim().parse().with_context(|| format!("invalid width in {:?}", s))?;
    let h = h.trim().parse().with_context(|| format!("invalid height in {:?}", s))?;
    Ok((w, h))
}

fn parse_order(s: &str) -> anyhow::Result<RecordOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown record order: {}", s))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // sorted walk keeps table order stable across platforms
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

/// Record key for `p`: its path relative to the input root, with `/` separators.
fn record_key(root: &Path, p: &Path) -> String {
    let rel = if root.is_file() {
        p.file_name().map(Path::new).unwrap_or(p)
    } else {
        p.strip_prefix(root).unwrap_or(p)
    };
    rel.to_string_lossy().replace('\\', "/")
}

fn load_inputs_with_progress(
    root: &Path,
    paths: &[PathBuf],
    target_size: Option<(u32, u32)>,
    progress: bool,
) -> anyhow::Result<(Vec<InputImage>, usize)> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    let mut failed = 0;
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match load_input(p, record_key(root, p), target_size) {
            Ok(input) => {
                debug!(key = %input.key, bytes = input.encoded.len(), "loaded image");
                list.push(input);
            }
            Err(e) => {
                error!(?p, error = %e, "skip image");
                failed += 1;
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok((list, failed))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    alpha_only: Option<bool>,
    /// `"WxH"`, or `false`/`none` to keep source dimensions.
    resize: Option<String>,
    order: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_pack_config(self, mut cfg: PackConfig) -> anyhow::Result<PackConfig> {
        if let Some(v) = self.alpha_only {
            cfg.alpha_only = v;
        }
        if let Some(v) = self.resize {
            cfg.target_size = match v.to_ascii_lowercase().as_str() {
                "false" | "none" | "off" => None,
                _ => Some(parse_size(&v)?),
            };
        }
        if let Some(v) = self.order {
            cfg.order = parse_order(&v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
