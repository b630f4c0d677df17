//! Info.plist patching.
//!
//! Sets `CFBundleIconName` on the project manifest so macOS picks up the
//! compiled asset catalog. Pre-existing keys are preserved. Missing, empty,
//! or unparsable manifests are replaced with a minimal document rather than
//! failing; nothing in this stage aborts the run.

use plist::{Dictionary, Value};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor};
use std::path::{Path, PathBuf};

use crate::ui;

pub const MANIFEST_NAME: &str = "Info.plist";
pub const ICON_NAME_KEY: &str = "CFBundleIconName";

/// Fallback manifest used when no usable Info.plist exists.
const EMPTY_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
</dict>
</plist>
"#;

#[derive(Debug)]
pub enum PlistError {
    Read(io::Error),
    Parse(plist::Error),
    Write(io::Error),
    Serialize(plist::Error),
}

impl fmt::Display for PlistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlistError::Read(e) => write!(f, "failed to read manifest: {}", e),
            PlistError::Parse(e) => write!(f, "failed to parse manifest: {}", e),
            PlistError::Write(e) => write!(f, "failed to write manifest: {}", e),
            PlistError::Serialize(e) => write!(f, "failed to serialize manifest: {}", e),
        }
    }
}

impl std::error::Error for PlistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlistError::Read(e) | PlistError::Write(e) => Some(e),
            PlistError::Parse(e) | PlistError::Serialize(e) => Some(e),
        }
    }
}

/// Set `CFBundleIconName` in `<tauri_dir>/Info.plist`, creating the file if
/// needed. Returns the path written.
pub fn patch(tauri_dir: &Path, icon_name: &str) -> Result<PathBuf, PlistError> {
    let path = tauri_dir.join(MANIFEST_NAME);

    let content = if !path.exists() {
        ui::warn(&format!(
            "{} not found, creating a new one",
            path.display()
        ));
        EMPTY_PLIST.to_string()
    } else {
        let text = fs::read_to_string(&path).map_err(PlistError::Read)?;
        if text.trim().is_empty() {
            ui::warn(&format!("{} is empty, starting fresh", path.display()));
            EMPTY_PLIST.to_string()
        } else {
            text
        }
    };

    let mut doc = match Value::from_reader_xml(Cursor::new(content.as_bytes())) {
        Ok(value) => value,
        Err(e) => {
            ui::warn(&format!(
                "could not parse {} ({}), rewriting it from scratch",
                path.display(),
                e
            ));
            Value::from_reader_xml(Cursor::new(EMPTY_PLIST.as_bytes()))
                .map_err(PlistError::Parse)?
        }
    };

    if !matches!(doc, Value::Dictionary(_)) {
        ui::warn(&format!(
            "{} root is not a dictionary, rewriting it from scratch",
            path.display()
        ));
        doc = Value::Dictionary(Dictionary::new());
    }
    if let Some(dict) = doc.as_dictionary_mut() {
        dict.insert(
            ICON_NAME_KEY.to_string(),
            Value::String(icon_name.to_string()),
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(PlistError::Write)?;
    }
    let file = File::create(&path).map_err(PlistError::Write)?;
    doc.to_writer_xml(BufWriter::new(file))
        .map_err(PlistError::Serialize)?;

    Ok(path)
}
