//! Command-line surface and validation.
//!
//! `--icon` and `--output` are optional at the parser level so validation can
//! report every missing/invalid input in one pass instead of stopping at the
//! first clap error.

use clap::Parser;
use std::path::PathBuf;

/// Extension required on the input asset.
pub const ICON_EXTENSION: &str = "icon";

// Help advertises 14.0; the long-standing effective fallback is 10.13.
pub const MIN_TARGET_FALLBACK: &str = "10.13";

#[derive(Parser, Debug)]
#[command(name = "tauri-icontool")]
#[command(version)]
#[command(about = "Compile an Icon Composer .icon asset and wire it into a Tauri project")]
pub struct Args {
    /// Path to the .icon asset produced by Icon Composer
    #[arg(short, long)]
    pub icon: Option<PathBuf>,

    /// Output directory for the compiled Assets.car
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Icon resource name declared in the compiled asset catalog
    #[arg(short, long, default_value = "AppIcon")]
    pub name: String,

    /// Tauri project directory containing Info.plist and tauri.conf.json
    #[arg(long, default_value = "./src-tauri")]
    pub tauri_dir: PathBuf,

    /// Minimum macOS deployment target passed to actool [default: 14.0]
    #[arg(long)]
    pub min_target: Option<String>,

    /// Stray positional tokens, accepted and ignored
    #[arg(hide = true)]
    pub rest: Vec<String>,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub icon_path: PathBuf,
    pub output_dir: PathBuf,
    pub icon_name: String,
    pub tauri_dir: PathBuf,
    pub min_target: String,
}

/// Check the parsed arguments, collecting every violation rather than
/// stopping at the first.
pub fn validate(args: Args) -> Result<RunConfig, Vec<String>> {
    let mut errors = Vec::new();

    let icon_path = match args.icon {
        None => {
            errors.push("missing required option --icon <path>".to_string());
            None
        }
        Some(path) => {
            if !path.exists() {
                errors.push(format!("icon asset not found: {}", path.display()));
            }
            if path.extension().and_then(|e| e.to_str()) != Some(ICON_EXTENSION) {
                errors.push(format!(
                    "icon asset must have a .{} extension: {}",
                    ICON_EXTENSION,
                    path.display()
                ));
            }
            Some(path)
        }
    };

    let output_dir = match args.output {
        None => {
            errors.push("missing required option --output <dir>".to_string());
            None
        }
        Some(path) => Some(path),
    };

    match (icon_path, output_dir) {
        (Some(icon_path), Some(output_dir)) if errors.is_empty() => Ok(RunConfig {
            icon_path,
            output_dir,
            icon_name: args.name,
            tauri_dir: args.tauri_dir,
            min_target: args
                .min_target
                .unwrap_or_else(|| MIN_TARGET_FALLBACK.to_string()),
        }),
        _ => Err(errors),
    }
}
