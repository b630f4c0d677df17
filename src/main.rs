//! # tauri-icontool
//!
//! Compiles an Icon Composer `.icon` asset into an `Assets.car` catalog with
//! Xcode's `actool` and wires it into a Tauri project:
//!
//! 1. Compile the asset into the output directory.
//! 2. Set `CFBundleIconName` in `src-tauri/Info.plist`.
//! 3. Add a `bundle.macOS.files` entry to `tauri.conf.json` so the catalog
//!    ships inside the app bundle.
//!
//! Only the compile step is fatal; the two patch steps degrade to warnings so
//! a partially-configured project still gets a compiled catalog.

mod cli;
mod compiler;
mod info_plist;
mod tauri_conf;
mod ui;

use clap::Parser;
use std::process;

use cli::Args;
use compiler::{Actool, CompilerRunner};
use tauri_conf::ConfOutcome;

fn main() {
    // Host check comes before argument handling; actool only exists on macOS.
    if !cfg!(target_os = "macos") {
        ui::error("this tool only runs on macOS (it drives Xcode's actool)");
        process::exit(1);
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here as well; they exit 0.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    process::exit(run(&Actool, args));
}

/// Validate, compile, and patch. Returns the process exit code.
///
/// Validation and compilation failures abort before any later stage runs;
/// the two patch stages only warn.
fn run(runner: &dyn CompilerRunner, args: Args) -> i32 {
    let config = match cli::validate(args) {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                ui::error(error);
            }
            ui::hint("run with --help for usage");
            return 1;
        }
    };

    ui::info(&format!(
        "Compiling {} with actool...",
        config.icon_path.display()
    ));
    if let Err(e) = compiler::compile(runner, &config) {
        ui::error(&e.to_string());
        return 1;
    }

    match info_plist::patch(&config.tauri_dir, &config.icon_name) {
        Ok(path) => ui::info(&format!("Updated {}", path.display())),
        Err(e) => ui::warn(&format!(
            "{}; set {} to \"{}\" in {}/Info.plist manually",
            e,
            info_plist::ICON_NAME_KEY,
            config.icon_name,
            config.tauri_dir.display()
        )),
    }

    match tauri_conf::patch(&config.tauri_dir, &config.output_dir) {
        Ok(ConfOutcome::Updated { path, entry }) => ui::info(&format!(
            "Added {} -> {} in {}",
            tauri_conf::FILES_KEY,
            entry,
            path.display()
        )),
        Ok(ConfOutcome::AlreadyPresent { path }) => ui::info(&format!(
            "{} already lists {}, leaving it as is",
            path.display(),
            tauri_conf::FILES_KEY
        )),
        Ok(ConfOutcome::NotFound) => ui::warn(
            "no tauri.conf.json or tauri.conf.json5 found; add the bundle.macOS.files entry manually",
        ),
        Ok(ConfOutcome::Unparsable { path, reason }) => ui::warn(&format!(
            "could not parse {} ({}); add the bundle.macOS.files entry manually",
            path.display(),
            reason
        )),
        Err(e) => ui::warn(&format!(
            "{}; add the bundle.macOS.files entry manually",
            e
        )),
    }

    ui::success("Icon compiled and wired into the Tauri project");
    ui::info("Next steps:");
    ui::info("  1. Run `cargo tauri build` to produce a bundle with the new icon");
    ui::info("  2. Run `killall Dock` if Finder still shows a cached icon");

    0
}
