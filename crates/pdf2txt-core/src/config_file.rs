use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub input: Option<InputConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub files: Option<Vec<String>>,
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

impl ConfigFile {
    pub fn files(&self) -> Option<&[String]> {
        self.input.as_ref().and_then(|i| i.files.as_deref())
    }

    pub fn output_dir(&self) -> Option<&str> {
        self.input.as_ref().and_then(|i| i.output_dir.as_deref())
    }

    pub fn header_exclusion(&self) -> Option<f32> {
        self.extraction.as_ref().and_then(|e| e.header_exclusion)
    }

    pub fn footer_exclusion(&self) -> Option<f32> {
        self.extraction.as_ref().and_then(|e| e.footer_exclusion)
    }
}

/// Platform config directory path: `<config_dir>/pdf2txt/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdf2txt").join("config.toml"))
}

/// Load config by cascading CWD `.pdf2txt.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".pdf2txt.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match load_explicit(path) {
        Ok(config) => Some(config),
        Err(ConfigError::Read { .. }) => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Load a config the user named explicitly. Unlike [`load_from_path`], a
/// missing or malformed file is an error.
pub fn load_explicit(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        input: Some(InputConfig {
            files: overlay
                .input
                .as_ref()
                .and_then(|i| i.files.clone())
                .or_else(|| base.input.as_ref().and_then(|i| i.files.clone())),
            output_dir: overlay
                .input
                .as_ref()
                .and_then(|i| i.output_dir.clone())
                .or_else(|| base.input.as_ref().and_then(|i| i.output_dir.clone())),
        }),
        extraction: Some(ExtractionConfig {
            header_exclusion: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.header_exclusion)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.header_exclusion)),
            footer_exclusion: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.footer_exclusion)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.footer_exclusion)),
        }),
    }
}
