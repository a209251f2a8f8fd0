//! Parameter loading from disk and caller overrides.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::parfile;
use crate::config::schema::{self, DestripeConfig, ParamDecl};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for parameter loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML parameter file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Syntax or value error in a `.cfg` parameter file.
    #[error("parameter file line {line}: {message}")]
    ParFile { line: usize, message: String },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("invalid value `{value}` for `{name}`: expected {expected}")]
    InvalidValue {
        name: String,
        expected: String,
        value: String,
    },

    #[error("parameter file belongs to task `{found}`, not `{}`", crate::TASK_NAME)]
    TaskMismatch { found: String },

    #[error("malformed override `{0}`: expected NAME=VALUE")]
    MalformedOverride(String),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl ConfigError {
    pub(crate) fn invalid(decl: &ParamDecl, value: &str) -> Self {
        ConfigError::InvalidValue {
            name: decl.name.to_string(),
            expected: decl.expected(),
            value: value.to_string(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk parameter file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParFormat {
    Toml,
    /// TEAL-style `name = value` file.
    Cfg,
}

impl ParFormat {
    /// Pick the format from the file extension; anything but `.cfg` is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("cfg") => ParFormat::Cfg,
            _ => ParFormat::Toml,
        }
    }
}

/// Load and validate parameters from a `.toml` or `.cfg` file.
pub fn load_config(path: &Path) -> Result<DestripeConfig, ConfigError> {
    ConfigLoader::new().file(path).load()
}

/// Parse a TOML parameter set without validating it.
pub fn parse_toml(content: &str) -> Result<DestripeConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply a single textual override, parsed according to the parameter's declared kind.
///
/// String values are stored verbatim.
pub fn apply_override(
    config: &mut DestripeConfig,
    name: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    let decl =
        schema::lookup(name).ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?;
    let value = decl.parse_raw(raw).ok_or_else(|| ConfigError::invalid(decl, raw))?;
    config.set(decl.name, value)
}

/// Builds a [`DestripeConfig`] from defaults, an optional parameter file, and overrides.
///
/// Overrides are applied in insertion order after the file, so later ones win.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    overrides: Vec<(String, String)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read base values from a parameter file instead of the declared defaults.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((name.into(), value.into()));
        self
    }

    /// Add an override written as `NAME=VALUE`. Whitespace around both sides is dropped.
    pub fn assignment(self, assignment: &str) -> Result<Self, ConfigError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedOverride(assignment.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::MalformedOverride(assignment.to_string()));
        }
        Ok(self.set(name, value.trim()))
    }

    /// Resolve and validate the parameter set.
    pub fn load(&self) -> Result<DestripeConfig, ConfigError> {
        let mut config = match &self.file {
            Some(path) => read_file(path)?,
            None => DestripeConfig::default(),
        };

        for (name, raw) in &self.overrides {
            apply_override(&mut config, name, raw)?;
            tracing::debug!(parameter = %name, value = %raw, "Applied override");
        }

        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<DestripeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = ParFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "Reading parameter file");

    match format {
        ParFormat::Toml => parse_toml(&content),
        ParFormat::Cfg => parfile::parse(&content),
    }
}
