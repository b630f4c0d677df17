//! tauri.conf patching.
//!
//! Adds a `bundle.macOS.files` entry mapping `Resources/Assets.car` to the
//! compiled catalog so the bundler copies it into the app. An entry that is
//! already present is never overwritten. A missing or unparsable config file
//! only skips this stage; the run as a whole still succeeds.

use regex::Regex;
use serde_json::{Map, Value};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::compiler::ASSET_CATALOG_NAME;

/// Key under `bundle.macOS.files` naming the catalog's location in the bundle.
pub const FILES_KEY: &str = "Resources/Assets.car";

/// Candidate config locations, in priority order.
const CONFIG_CANDIDATES: [&str; 4] = [
    "tauri.conf.json",
    "tauri.conf.json5",
    "../tauri.conf.json",
    "../tauri.conf.json5",
];

/// What the patch stage did. All variants are non-fatal.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfOutcome {
    /// Entry written to the given file.
    Updated { path: PathBuf, entry: String },
    /// Entry already present; file left untouched.
    AlreadyPresent { path: PathBuf },
    /// No config file found in any candidate location.
    NotFound,
    /// File found but not valid JSON; left untouched.
    Unparsable { path: PathBuf, reason: String },
}

#[derive(Debug)]
pub enum ConfError {
    Read(io::Error),
    Write(io::Error),
    CurrentDir(io::Error),
    Serialize(serde_json::Error),
}

impl fmt::Display for ConfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfError::Read(e) => write!(f, "failed to read config: {}", e),
            ConfError::Write(e) => write!(f, "failed to write config: {}", e),
            ConfError::CurrentDir(e) => write!(f, "failed to resolve working directory: {}", e),
            ConfError::Serialize(e) => write!(f, "failed to serialize config: {}", e),
        }
    }
}

impl std::error::Error for ConfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfError::Read(e) | ConfError::Write(e) | ConfError::CurrentDir(e) => Some(e),
            ConfError::Serialize(e) => Some(e),
        }
    }
}

/// Patch the first config file found near `tauri_dir` so the bundler ships
/// the catalog compiled into `output_dir`.
pub fn patch(tauri_dir: &Path, output_dir: &Path) -> Result<ConfOutcome, ConfError> {
    let Some(path) = find_config(tauri_dir) else {
        return Ok(ConfOutcome::NotFound);
    };

    let text = fs::read_to_string(&path).map_err(ConfError::Read)?;
    let is_json5 = path.extension().and_then(|e| e.to_str()) == Some("json5");
    let source = if is_json5 {
        strip_json5_comments(&text)
    } else {
        text
    };

    let mut doc: Value = match serde_json::from_str(&source) {
        Ok(doc) => doc,
        Err(e) => {
            return Ok(ConfOutcome::Unparsable {
                path,
                reason: e.to_string(),
            });
        }
    };
    let Some(root) = doc.as_object_mut() else {
        return Ok(ConfOutcome::Unparsable {
            path,
            reason: "root is not an object".to_string(),
        });
    };

    let files = ensure_object(root, "bundle")
        .and_then(|bundle| ensure_object(bundle, "macOS"))
        .and_then(|macos| ensure_object(macos, "files"));
    let Some(files) = files else {
        // ensure_object always yields an object; kept as a skip for safety
        return Ok(ConfOutcome::Unparsable {
            path,
            reason: "bundle.macOS.files is not an object".to_string(),
        });
    };

    if files.get(FILES_KEY).is_some_and(is_truthy) {
        return Ok(ConfOutcome::AlreadyPresent { path });
    }

    let entry = bundle_entry_path(tauri_dir, output_dir).map_err(ConfError::CurrentDir)?;
    files.insert(FILES_KEY.to_string(), Value::String(entry.clone()));

    let mut serialized = serde_json::to_string_pretty(&doc).map_err(ConfError::Serialize)?;
    serialized.push('\n');
    fs::write(&path, serialized).map_err(ConfError::Write)?;

    Ok(ConfOutcome::Updated { path, entry })
}

fn find_config(tauri_dir: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| tauri_dir.join(candidate))
        .find(|path| path.exists())
}

/// Strip `/* */` and `//` comments so JSON5 configs parse as strict JSON.
///
/// Best-effort text substitution: comment markers inside string literals are
/// not protected and can corrupt the document. Known limitation.
fn strip_json5_comments(text: &str) -> String {
    let block = Regex::new(r"(?s)/\*.*?\*/").expect("invalid block comment pattern");
    let line = Regex::new(r"(?m)//[^\n]*").expect("invalid line comment pattern");
    let without_blocks = block.replace_all(text, "");
    line.replace_all(&without_blocks, "").into_owned()
}

/// Get (or create) `map[key]` as an object, replacing any non-object value.
fn ensure_object<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
) -> Option<&'a mut Map<String, Value>> {
    let slot = map.entry(key).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut()
}

/// Path of the compiled catalog relative to the tauri directory, with
/// forward-slash separators.
///
/// When the output directory is not nested under the tauri directory this
/// falls back to the output directory's base name, which is wrong for
/// sibling layouts (`..` is never emitted). Known limitation.
fn bundle_entry_path(tauri_dir: &Path, output_dir: &Path) -> io::Result<String> {
    let tauri_abs = absolutize(tauri_dir)?;
    let output_abs = absolutize(output_dir)?;

    let relative = match output_abs.strip_prefix(&tauri_abs) {
        Ok(stripped) => stripped.to_path_buf(),
        Err(_) => output_abs
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };

    let joined = relative.join(ASSET_CATALOG_NAME);
    Ok(joined.to_string_lossy().replace('\\', "/"))
}

fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// JavaScript-style truthiness for the first-write-wins check.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_conf(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn inserts_entry_and_preserves_unrelated_fields() {
        let dir = TempDir::new().unwrap();
        let tauri_dir = dir.path().join("src-tauri");
        fs::create_dir(&tauri_dir).unwrap();
        let conf = write_conf(
            &tauri_dir,
            "tauri.conf.json",
            r#"{"productName":"demo","bundle":{"targets":"all"}}"#,
        );

        let outcome = patch(&tauri_dir, &tauri_dir.join("resources")).unwrap();

        assert_eq!(
            outcome,
            ConfOutcome::Updated {
                path: conf.clone(),
                entry: "resources/Assets.car".to_string(),
            }
        );
        let doc = read_json(&conf);
        assert_eq!(
            doc["bundle"]["macOS"]["files"][FILES_KEY],
            json!("resources/Assets.car")
        );
        assert_eq!(doc["bundle"]["targets"], json!("all"));
        assert_eq!(doc["productName"], json!("demo"));

        let raw = fs::read_to_string(&conf).unwrap();
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("  \"bundle\""));
    }

    #[test]
    fn existing_entry_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(
            dir.path(),
            "tauri.conf.json",
            r#"{"bundle":{"macOS":{"files":{"Resources/Assets.car":"custom/Assets.car"}}}}"#,
        );
        let before = fs::read_to_string(&conf).unwrap();

        let outcome = patch(dir.path(), &dir.path().join("resources")).unwrap();

        assert_eq!(outcome, ConfOutcome::AlreadyPresent { path: conf.clone() });
        assert_eq!(fs::read_to_string(&conf).unwrap(), before);
    }

    #[test]
    fn falsy_existing_entry_is_replaced() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(
            dir.path(),
            "tauri.conf.json",
            r#"{"bundle":{"macOS":{"files":{"Resources/Assets.car":""}}}}"#,
        );

        let outcome = patch(dir.path(), &dir.path().join("resources")).unwrap();

        assert!(matches!(outcome, ConfOutcome::Updated { .. }));
        let doc = read_json(&conf);
        assert_eq!(
            doc["bundle"]["macOS"]["files"][FILES_KEY],
            json!("resources/Assets.car")
        );
    }

    #[test]
    fn non_object_bundle_level_is_replaced() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(dir.path(), "tauri.conf.json", r#"{"bundle":"all"}"#);

        let outcome = patch(dir.path(), &dir.path().join("res")).unwrap();

        assert!(matches!(outcome, ConfOutcome::Updated { .. }));
        let doc = read_json(&conf);
        assert_eq!(doc["bundle"]["macOS"]["files"][FILES_KEY], json!("res/Assets.car"));
    }

    #[test]
    fn json5_comments_are_stripped_before_parsing() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(
            dir.path(),
            "tauri.conf.json5",
            "{\n  // product\n  \"productName\": \"demo\", /* inline */\n  \"bundle\": {}\n}\n",
        );

        let outcome = patch(dir.path(), &dir.path().join("resources")).unwrap();

        assert!(matches!(outcome, ConfOutcome::Updated { .. }));
        let doc = read_json(&conf);
        assert_eq!(doc["productName"], json!("demo"));
        // Rewritten as plain JSON; comments are gone.
        assert!(!fs::read_to_string(&conf).unwrap().contains("//"));
    }

    #[test]
    fn strip_handles_block_and_trailing_comments() {
        let stripped = strip_json5_comments("{ \"a\": 1, /* c */ \"b\": 2 } // trailing");
        let doc: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn json_variant_is_preferred_over_json5() {
        let dir = TempDir::new().unwrap();
        write_conf(dir.path(), "tauri.conf.json", r#"{"which":"json"}"#);
        write_conf(dir.path(), "tauri.conf.json5", r#"{"which":"json5"}"#);

        let found = find_config(dir.path()).unwrap();
        assert!(found.ends_with("tauri.conf.json"));
    }

    #[test]
    fn parent_directory_candidates_are_searched() {
        let dir = TempDir::new().unwrap();
        let tauri_dir = dir.path().join("src-tauri");
        fs::create_dir(&tauri_dir).unwrap();
        let conf = write_conf(dir.path(), "tauri.conf.json", r#"{}"#);

        let outcome = patch(&tauri_dir, &tauri_dir.join("gen")).unwrap();

        match outcome {
            ConfOutcome::Updated { path, entry } => {
                assert_eq!(fs::canonicalize(path).unwrap(), fs::canonicalize(conf).unwrap());
                assert_eq!(entry, "gen/Assets.car");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn missing_config_everywhere_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let tauri_dir = dir.path().join("src-tauri");
        fs::create_dir(&tauri_dir).unwrap();

        let outcome = patch(&tauri_dir, &tauri_dir.join("resources")).unwrap();
        assert_eq!(outcome, ConfOutcome::NotFound);
    }

    #[test]
    fn unparsable_config_is_skipped_and_left_untouched() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(dir.path(), "tauri.conf.json", "{ not json at all");
        let before = fs::read_to_string(&conf).unwrap();

        let outcome = patch(dir.path(), &dir.path().join("resources")).unwrap();

        assert!(matches!(outcome, ConfOutcome::Unparsable { .. }));
        assert_eq!(fs::read_to_string(&conf).unwrap(), before);
    }

    #[test]
    fn nested_output_dir_uses_path_relative_to_tauri_dir() {
        let entry = bundle_entry_path(
            Path::new("/p/src-tauri"),
            Path::new("/p/src-tauri/resources"),
        )
        .unwrap();
        assert_eq!(entry, "resources/Assets.car");
    }

    #[test]
    fn deeply_nested_output_dir_keeps_intermediate_components() {
        let entry = bundle_entry_path(
            Path::new("/p/src-tauri"),
            Path::new("/p/src-tauri/gen/icons"),
        )
        .unwrap();
        assert_eq!(entry, "gen/icons/Assets.car");
    }

    #[test]
    fn outside_output_dir_falls_back_to_base_name() {
        let entry =
            bundle_entry_path(Path::new("/p/src-tauri"), Path::new("/other/resources")).unwrap();
        assert_eq!(entry, "resources/Assets.car");
    }
}
