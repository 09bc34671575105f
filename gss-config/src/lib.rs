//! Shared configuration loader for the gss toolchain.
//!
//! `defaults/gss.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`GssConfig`],
//! which then converts into the engine's [`ConvertOptions`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use gss_babel::options::{DecodeOptions, EncodeOptions, Limits};
use gss_babel::{Case, ConvertOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/gss.default.toml");

/// Top-level configuration consumed by gss applications.
#[derive(Debug, Clone, Deserialize)]
pub struct GssConfig {
    pub convert: ConvertConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub limits: LimitsConfig,
}

/// Key normalization applied to every conversion.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub sorted: bool,
    pub reversed: bool,
}

/// Mirrors [`DecodeOptions`]. Empty strings and zero limits mean "unset".
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub header: Vec<String>,
    pub delimiter: String,
    pub comment: String,
    pub lazy_quotes: bool,
    pub trim: bool,
    pub skip_lines: usize,
    pub drop_cr: bool,
    pub limit: usize,
    pub line_separator: String,
    pub key_value_separator: String,
}

/// Mirrors [`EncodeOptions`].
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
    pub indent: usize,
    pub header: Vec<String>,
    pub expand_header: bool,
    pub delimiter: String,
    pub limit: usize,
    pub line_separator: String,
    pub key_value_separator: String,
    pub no_data_value: String,
    pub escape_space: bool,
    pub escape_equal: bool,
    pub escape_colon: bool,
    pub escape_new_line: bool,
    pub key_case: Case,
    pub value_case: Case,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_depth: usize,
    pub max_input_bytes: usize,
}

impl TryFrom<InputConfig> for DecodeOptions {
    type Error = ConfigError;

    fn try_from(config: InputConfig) -> Result<Self, Self::Error> {
        Ok(DecodeOptions {
            header: config.header,
            delimiter: optional_delimiter("input.delimiter", &config.delimiter)?,
            comment: non_empty(config.comment),
            lazy_quotes: config.lazy_quotes,
            trim: config.trim,
            skip_lines: config.skip_lines,
            drop_cr: config.drop_cr,
            limit: non_zero(config.limit),
            line_separator: config.line_separator,
            key_value_separator: config.key_value_separator,
            ..DecodeOptions::default()
        })
    }
}

impl TryFrom<OutputConfig> for EncodeOptions {
    type Error = ConfigError;

    fn try_from(config: OutputConfig) -> Result<Self, Self::Error> {
        Ok(EncodeOptions {
            pretty: config.pretty,
            indent: config.indent,
            header: config.header,
            expand_header: config.expand_header,
            delimiter: optional_delimiter("output.delimiter", &config.delimiter)?,
            limit: non_zero(config.limit),
            line_separator: config.line_separator,
            key_value_separator: config.key_value_separator,
            no_data_value: config.no_data_value,
            escape_space: config.escape_space,
            escape_equal: config.escape_equal,
            escape_colon: config.escape_colon,
            escape_new_line: config.escape_new_line,
            key_case: config.key_case,
            value_case: config.value_case,
        })
    }
}

impl From<LimitsConfig> for Limits {
    fn from(config: LimitsConfig) -> Self {
        Limits {
            max_depth: config.max_depth,
            max_input_bytes: config.max_input_bytes,
        }
    }
}

impl TryFrom<GssConfig> for ConvertOptions {
    type Error = ConfigError;

    fn try_from(config: GssConfig) -> Result<Self, Self::Error> {
        Ok(ConvertOptions {
            sorted: config.convert.sorted,
            reversed: config.convert.reversed,
            input: config.input.try_into()?,
            output: config.output.try_into()?,
            limits: config.limits.into(),
        })
    }
}

/// Parses a delimiter spelled as a single character or an escape (`\t`).
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    match s {
        "\\t" | "\t" | "tab" => Ok('\t'),
        "\\n" => Ok('\n'),
        s if s.chars().count() == 1 => s
            .chars()
            .next()
            .ok_or_else(|| "delimiter must not be empty".to_string()),
        other => Err(format!(
            "delimiter must be a single character, got {other:?}"
        )),
    }
}

fn optional_delimiter(key: &str, raw: &str) -> Result<Option<char>, ConfigError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_delimiter(raw)
        .map(Some)
        .map_err(|message| ConfigError::Message(format!("{key}: {message}")))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn non_zero(value: usize) -> Option<usize> {
    (value > 0).then_some(value)
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<GssConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }

    /// Build and convert straight into engine options.
    pub fn build_options(self) -> Result<ConvertOptions, ConfigError> {
        self.build()?.try_into()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<GssConfig, ConfigError> {
    Loader::new().build()
}
