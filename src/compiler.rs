//! Asset catalog compilation via Apple's `actool`.
//!
//! The child-process call sits behind [`CompilerRunner`] so the argument
//! template and failure handling can be exercised without an Xcode toolchain.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use crate::cli::RunConfig;
use crate::ui;

/// File name of the compiled asset catalog emitted into the output directory.
pub const ASSET_CATALOG_NAME: &str = "Assets.car";

/// Side-car plist fragment actool writes next to the catalog.
pub const PARTIAL_PLIST_NAME: &str = "assetcatalog_generated_info.plist";

const COMPILER_BIN: &str = "actool";

/// Captured result of one compiler invocation.
#[derive(Debug, Clone)]
pub struct CompilerOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the asset compiler as a synchronous child process.
pub trait CompilerRunner {
    fn run(&self, args: &[OsString]) -> io::Result<CompilerOutput>;
}

/// Invokes `actool` from the active Xcode toolchain.
pub struct Actool;

impl CompilerRunner for Actool {
    fn run(&self, args: &[OsString]) -> io::Result<CompilerOutput> {
        let output = Command::new(COMPILER_BIN).args(args).output()?;
        Ok(CompilerOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Errors from the compilation stage. All of these abort the run.
#[derive(Debug)]
pub enum CompileError {
    /// Failed to create the output directory.
    OutputDir(io::Error),
    /// Failed to resolve the icon or output path to absolute form.
    Resolve(io::Error),
    /// Failed to launch the compiler process.
    Spawn(io::Error),
    /// The compiler ran but exited with a failure status.
    Failed { stderr: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::OutputDir(e) => {
                write!(f, "failed to create output directory: {}", e)
            }
            CompileError::Resolve(e) => write!(f, "failed to resolve path: {}", e),
            CompileError::Spawn(e) => write!(
                f,
                "failed to run {} (is Xcode installed?): {}",
                COMPILER_BIN, e
            ),
            CompileError::Failed { stderr } => {
                write!(f, "{} failed:\n{}", COMPILER_BIN, stderr.trim_end())
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::OutputDir(e) | CompileError::Resolve(e) | CompileError::Spawn(e) => {
                Some(e)
            }
            CompileError::Failed { .. } => None,
        }
    }
}

/// Compile the icon asset into `<output_dir>/Assets.car`.
///
/// Creates the output directory if needed, resolves both paths to absolute
/// form, and runs the fixed actool argument template. Non-empty compiler
/// stdout is echoed; a failure carries the compiler's stderr text.
pub fn compile(runner: &dyn CompilerRunner, config: &RunConfig) -> Result<(), CompileError> {
    if !config.output_dir.exists() {
        fs::create_dir_all(&config.output_dir).map_err(CompileError::OutputDir)?;
        ui::info(&format!(
            "Created output directory {}",
            config.output_dir.display()
        ));
    }

    let icon_abs = fs::canonicalize(&config.icon_path).map_err(CompileError::Resolve)?;
    let output_abs = fs::canonicalize(&config.output_dir).map_err(CompileError::Resolve)?;

    let args = compiler_args(&icon_abs, &output_abs, &config.icon_name, &config.min_target);
    let output = runner.run(&args).map_err(CompileError::Spawn)?;

    if !output.stdout.trim().is_empty() {
        ui::info(output.stdout.trim_end());
    }

    if output.success {
        Ok(())
    } else {
        Err(CompileError::Failed {
            stderr: output.stderr,
        })
    }
}

/// Fixed actool argument template.
fn compiler_args(icon: &Path, output_dir: &Path, name: &str, min_target: &str) -> Vec<OsString> {
    vec![
        icon.into(),
        "--compile".into(),
        output_dir.into(),
        "--notices".into(),
        "--warnings".into(),
        "--errors".into(),
        "--output-partial-info-plist".into(),
        output_dir.join(PARTIAL_PLIST_NAME).into(),
        "--app-icon".into(),
        name.into(),
        "--include-all-app-icons".into(),
        "--enable-on-demand-resources".into(),
        "NO".into(),
        "--target-device".into(),
        "mac".into(),
        "--minimum-deployment-target".into(),
        min_target.into(),
        "--platform".into(),
        "macosx".into(),
    ]
}
