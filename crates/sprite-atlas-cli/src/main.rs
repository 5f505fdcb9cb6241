use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::ImageReader;
use indicatif::{ProgressBar, ProgressStyle};
use sprite_atlas_core::export::{to_json_hash, to_plist_hash};
use sprite_atlas_core::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Parser, Debug)]
#[command(
    name = "sprite-atlas",
    about = "Pack sprites into a texture atlas",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Input files or directories (directories are walked recursively)
    #[arg(required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Also write cocos2d-style plist metadata per page
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    plist: bool,

    // Layout
    /// Max canvas dimension
    #[arg(long, default_value_t = 2048, help_heading = "Layout")]
    max_texture_size: u32,
    /// Restrict canvas dims to powers of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pow2: bool,
    /// Keep the canvas square
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    force_squared: bool,
    /// Empty pixels kept on all four canvas edges
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    texture_border: u32,
    /// Empty pixels added around each sprite
    #[arg(long, default_value_t = 2, help_heading = "Layout")]
    sprite_border: u32,

    // Image Processing
    /// Trim alpha threshold (1..=255); 0 disables trimming
    #[arg(long, default_value_t = 1, help_heading = "Image Processing")]
    trim: u8,
    /// Mask the dominant corner color before trimming
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    heuristic_mask: bool,
    /// Uniform pre-scale applied to every source image
    #[arg(long, default_value_t = 1.0, help_heading = "Image Processing")]
    scale: f32,
    /// Allow 90 degree sprite rotation (rect algorithm)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    rotate_sprites: bool,

    // Algorithm
    /// Packing algorithm: rect|polygon
    #[arg(long, default_value = "rect", help_heading = "Algorithm")]
    algorithm: String,
    /// Pack triangulated outlines instead of rectangles (needs --algorithm polygon)
    #[arg(long, default_value_t = false, help_heading = "Algorithm")]
    polygon_mode: bool,
    /// Outline simplification tolerance in pixels
    #[arg(long, default_value_t = 2.0, help_heading = "Algorithm")]
    epsilon: f32,

    // Logging/UX
    /// Show a progress spinner (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressSink for SpinnerProgress {
    fn set_text(&self, text: &str) {
        self.bar.set_message(text.to_string());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let algorithm: Algorithm = cli
        .algorithm
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown algorithm '{}' (expected rect|polygon)", cli.algorithm))?;
    let cfg = AtlasConfig {
        texture_border: cli.texture_border,
        sprite_border: cli.sprite_border,
        trim_threshold: cli.trim,
        heuristic_mask: cli.heuristic_mask,
        power_of_two: cli.pow2,
        force_squared: cli.force_squared,
        max_texture_size: cli.max_texture_size,
        scale: cli.scale,
        algorithm,
        rotate_sprites: cli.rotate_sprites,
        polygon_mode: PolygonMode {
            enable: cli.polygon_mode,
            epsilon: cli.epsilon,
        },
    };

    let include = build_globset(&cli.include).context("invalid --include pattern")?;
    let exclude = build_globset(&cli.exclude).context("invalid --exclude pattern")?;
    let files = collect_files(&cli.inputs, include.as_ref(), exclude.as_ref());
    if files.is_empty() {
        anyhow::bail!("no input images found");
    }
    info!(files = files.len(), "collected input files");

    let mut inputs: Vec<SourceImage> = Vec::with_capacity(files.len());
    for (path, name) in files {
        let image = match ImageReader::open(&path) {
            Ok(reader) => match reader.decode() {
                Ok(img) => img,
                Err(err) => {
                    warn!(path = %path.display(), %err, "skipping undecodable image");
                    continue;
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable file");
                continue;
            }
        };
        inputs.push(SourceImage { name, image });
    }
    if inputs.is_empty() {
        anyhow::bail!("none of the input images could be decoded");
    }

    let show_progress = cli.progress && !cli.quiet;
    let sink: Box<dyn ProgressSink> = if show_progress {
        Box::new(SpinnerProgress::new())
    } else {
        Box::new(NullProgress)
    };
    let pages =
        generate_atlas_with_progress(inputs, cfg, &*sink).context("atlas generation failed")?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let mut texture_names = Vec::with_capacity(pages.len());
    for (i, page) in pages.iter().enumerate() {
        let file_name = if i == 0 {
            format!("{}.png", cli.name)
        } else {
            format!("{}_{}.png", cli.name, i)
        };
        let path = cli.out_dir.join(&file_name);
        page.atlas_image
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(
            page = i,
            width = page.atlas_image.width(),
            height = page.atlas_image.height(),
            sprites = page.sprite_frames.len(),
            path = %path.display(),
            "wrote atlas page"
        );
        texture_names.push(file_name);
    }

    let json_path = cli.out_dir.join(format!("{}.json", cli.name));
    fs::write(
        &json_path,
        serde_json::to_string_pretty(&to_json_hash(&pages))?,
    )
    .with_context(|| format!("writing {}", json_path.display()))?;

    if cli.plist {
        for (i, page) in pages.iter().enumerate() {
            let plist_name = if i == 0 {
                format!("{}.plist", cli.name)
            } else {
                format!("{}_{}.plist", cli.name, i)
            };
            let path = cli.out_dir.join(&plist_name);
            fs::write(&path, to_plist_hash(page, &texture_names[i]))
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::EnvFilter;
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(Some(builder.build()?))
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|x| *x == e)
        })
        .unwrap_or(false)
}

/// Expands the input list into (absolute path, atlas sprite name) pairs.
/// Directories are walked recursively in file-name order; names are paths
/// relative to the walked root, plain files use their file name.
fn collect_files(
    inputs: &[PathBuf],
    include: Option<&GlobSet>,
    exclude: Option<&GlobSet>,
) -> Vec<(PathBuf, String)> {
    let keep = |rel: &str| -> bool {
        if let Some(inc) = include {
            if !inc.is_match(rel) {
                return false;
            }
        }
        if let Some(exc) = exclude {
            if exc.is_match(rel) {
                return false;
            }
        }
        true
    };

    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !entry.file_type().is_file() || !has_image_extension(path) {
                    continue;
                }
                let rel = path
                    .strip_prefix(input)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/");
                if keep(&rel) {
                    files.push((path.to_path_buf(), rel));
                }
            }
        } else {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.to_string_lossy().into_owned());
            if keep(&name) {
                files.push((input.clone(), name));
            }
        }
    }
    files
}
