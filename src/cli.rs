// ============================================================================
// RasterPad CLI — replay drawing scripts headlessly and export PNGs
// ============================================================================
//
// Usage examples:
//   rasterpad --script doodle.rhai --output doodle.png
//   rasterpad -s scenes/*.rhai --output-dir renders/ --width 320 --height 240
//   rasterpad -s a.rhai b.rhai --output-dir out/ --settings my.cfg -v
//
// Every script gets a fresh surface. Processing is sequential on the
// current thread.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;

use crate::logger;
use crate::ops::scripting::run_script;
use crate::settings::SurfaceSettings;
use crate::surface::DrawingSurface;
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// RasterPad headless drawing runner.
///
/// Runs Rhai drawing scripts against a blank surface and saves the result as PNG.
#[derive(Parser, Debug)]
#[command(
    name = "rasterpad",
    about = "RasterPad headless drawing script runner",
    long_about = "Run Rhai scripts that paint on a raster surface (brush, eraser,\n\
                  line, rect, circle, fill, undo/redo) and save the result as PNG.\n\n\
                  Example:\n  \
                  rasterpad --script doodle.rhai --output doodle.png\n  \
                  rasterpad -s scenes/*.rhai --output-dir renders/"
)]
pub struct CliArgs {
    /// Script file(s). Glob patterns accepted (e.g. "scenes/*.rhai").
    #[arg(short, long, required = true, num_args = 1..)]
    pub script: Vec<String>,

    /// Output PNG path. Only valid for a single script.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch runs; files keep the script's stem.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Canvas width (overrides the settings file).
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height (overrides the settings file).
    #[arg(long)]
    pub height: Option<u32>,

    /// Settings file (`key = value` lines). Defaults to the app data directory.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Write the effective settings (after --width/--height) back to the
    /// settings file before running.
    #[arg(long)]
    pub save_settings: bool,

    /// Write the session log here instead of the app data directory.
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Print script console output and per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all scripts and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.script);
    if inputs.is_empty() {
        eprintln!("error: no script files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if let Err(e) = check_outputs(inputs.len(), args.output.as_deref()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut settings = match &args.settings {
        Some(path) => SurfaceSettings::load_from(path),
        None => SurfaceSettings::load(),
    };
    if let Some(w) = args.width {
        settings.canvas_width = w;
    }
    if let Some(h) = args.height {
        settings.canvas_height = h;
    }
    if args.save_settings {
        let saved = match &args.settings {
            Some(path) => settings.save_to(path),
            None => settings.save(),
        };
        if let Err(e) = saved {
            eprintln!("warning: could not save settings: {}", e);
        }
    }
    if args.verbose
        && let Some(path) = logger::log_path()
    {
        println!("log: {}", path.display());
    }

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) =
            build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref())
        else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            any_failure = true;
            continue;
        };

        match run_one(input_path, &output_path, &settings, args.verbose) {
            Ok(()) => {
                log_info!("{} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-script pipeline
// ============================================================================

fn run_one(
    input: &Path,
    output: &Path,
    settings: &SurfaceSettings,
    verbose: bool,
) -> Result<(), String> {
    let source = std::fs::read_to_string(input)
        .map_err(|e| format!("could not read script: {}", e))?;

    let surface = Arc::new(Mutex::new(DrawingSurface::with_settings(settings)));

    let console = run_script(&source, surface.clone())
        .map_err(|e| format!("script error:\n{}", e.friendly_message()))?;

    if verbose {
        for line in &console {
            println!("  [script] {}", line);
        }
    }

    let guard = surface.lock().unwrap_or_else(|e| e.into_inner());
    guard
        .export_png(output)
        .map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// `--output` names one file, so it cannot take more than one script,
/// even when `--output-dir` is also given.
fn check_outputs(count: usize, output: Option<&Path>) -> Result<(), String> {
    match output {
        Some(out) if count > 1 => Err(format!(
            "{} scripts given but --output '{}' only accepts a single file.\n\
             Use --output-dir alone for batch runs.",
            count,
            out.display()
        )),
        _ => Ok(()),
    }
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Output path for one script:
/// 1. `--output` as given,
/// 2. `--output-dir/<stem>.png`,
/// 3. `<stem>.png` next to the script.
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.png", stem)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.png", stem));

    // Never overwrite the script itself
    if candidate == input {
        Some(parent.join(format!("{}_out.png", stem)))
    } else {
        Some(candidate)
    }
}
