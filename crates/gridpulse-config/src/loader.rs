//! Format detection, file discovery and (de)serialization of
//! [`CodecOptions`].

use std::path::{Path, PathBuf};

use gridpulse_core::options::CodecOptions;

/// Base name of the options file inside a settings directory.
pub const OPTIONS_BASE_NAME: &str = "gridpulse";

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("cannot serialize options for {file}: {detail}")]
    Serialize { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file from its extension.
pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    let extension = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| Some(f.extension()) == extension)
        .ok_or_else(|| ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` and `.json` in `dir`. Returns
/// `Ok(None)` if none exists and `ConflictingFormats` if more than one does.
pub fn find_config_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, ConfigError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(ConfigError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

// ===========================================================================
// Parsing
// ===========================================================================

/// Parse options text in the given format. `file` only labels errors.
pub fn parse_options(content: &str, format: Format, file: &Path) -> Result<CodecOptions, ConfigError> {
    let parse_err = |detail: String| ConfigError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read options from `path`, choosing the parser by extension.
pub fn load_options(path: &Path) -> Result<CodecOptions, ConfigError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let options = parse_options(&content, format, path)?;
    tracing::info!(file = %path.display(), ?options, "loaded codec options");
    Ok(options)
}

/// Read `gridpulse.*` from `dir`, or the defaults when there is none.
pub fn load_options_from_dir(dir: &Path) -> Result<CodecOptions, ConfigError> {
    match find_config_file(dir, OPTIONS_BASE_NAME)? {
        Some(path) => load_options(&path),
        None => {
            tracing::info!(dir = %dir.display(), "no options file, using defaults");
            Ok(CodecOptions::default())
        }
    }
}

/// Write `options` to `path` in the format its extension names.
pub fn save_options(path: &Path, options: &CodecOptions) -> Result<(), ConfigError> {
    let format = detect_format(path)?;
    let ser_err = |detail: String| ConfigError::Serialize {
        file: path.to_path_buf(),
        detail,
    };
    let content = match format {
        Format::Ron => ron::ser::to_string_pretty(options, ron::ser::PrettyConfig::default())
            .map_err(|e| ser_err(e.to_string()))?,
        Format::Toml => toml::to_string(options).map_err(|e| ser_err(e.to_string()))?,
        Format::Json => serde_json::to_string_pretty(options).map_err(|e| ser_err(e.to_string()))?,
    };
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gridpulse_config_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_known_formats() {
        assert_eq!(detect_format(Path::new("gridpulse.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("gridpulse.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("gridpulse.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        assert!(matches!(
            detect_format(Path::new("gridpulse.yaml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("gridpulse")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // parse_options
    // -----------------------------------------------------------------------

    #[test]
    fn parse_each_format() {
        let file = Path::new("test");
        let ron = parse_options("(ignore_unlocking: true)", Format::Ron, file).unwrap();
        let toml = parse_options("ignore_unlocking = true", Format::Toml, file).unwrap();
        let json = parse_options(r#"{"ignore_unlocking": true}"#, Format::Json, file).unwrap();
        for options in [ron, toml, json] {
            assert!(options.ignore_unlocking);
            assert!(options.electric_roads_enabled, "missing key keeps default");
        }
    }

    #[test]
    fn parse_error_names_file() {
        let err = parse_options("not = [valid", Format::Toml, Path::new("bad.toml")).unwrap_err();
        match err {
            ConfigError::Parse { file, .. } => assert_eq!(file, PathBuf::from("bad.toml")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Directory loading
    // -----------------------------------------------------------------------

    #[test]
    fn missing_file_gives_defaults() {
        let dir = make_test_dir("missing");
        assert_eq!(load_options_from_dir(&dir).unwrap(), CodecOptions::default());
        cleanup(&dir);
    }

    #[test]
    fn loads_single_file() {
        let dir = make_test_dir("single");
        fs::write(dir.join("gridpulse.json"), r#"{"electric_roads_enabled": false}"#).unwrap();
        let options = load_options_from_dir(&dir).unwrap();
        assert!(!options.electric_roads_enabled);
        assert!(!options.ignore_unlocking);
        cleanup(&dir);
    }

    #[test]
    fn conflicting_formats_rejected() {
        let dir = make_test_dir("conflict");
        fs::write(dir.join("gridpulse.ron"), "()").unwrap();
        fs::write(dir.join("gridpulse.toml"), "").unwrap();
        assert!(matches!(
            load_options_from_dir(&dir),
            Err(ConfigError::ConflictingFormats { .. })
        ));
        cleanup(&dir);
    }

    #[test]
    fn save_then_load_each_format() {
        let dir = make_test_dir("save");
        let options = CodecOptions {
            ignore_unlocking: true,
            electric_roads_enabled: false,
        };
        for format in Format::ALL {
            let path = dir.join(format!("saved.{}", format.extension()));
            save_options(&path, &options).unwrap();
            assert_eq!(load_options(&path).unwrap(), options, "{format:?}");
        }
        cleanup(&dir);
    }
}
