//! Format registry for format discovery and selection
//!
//! Formats are kept in registration order, which is also the order
//! [`FormatRegistry::list_formats`] reports. The process-wide default
//! registry is built once on first use and never mutated afterwards.

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::{
    BsonFormat, DelimitedFormat, GoFormat, HclFormat, JsonFormat, JsonlFormat, PropertiesFormat,
    TagsFormat, TomlFormat, YamlFormat,
};
use std::sync::OnceLock;

/// Registry of structured-data formats
///
/// # Examples
///
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register(MyFormat);
///
/// let format = registry.get("my-format")?;
/// let payload = format.decode(b"...", &DecodeOptions::default())?;
/// ```
pub struct FormatRegistry {
    formats: Vec<Box<dyn Format>>,
}

static DEFAULT_REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: Vec::new(),
        }
    }

    /// The shared registry holding the built-in formats.
    pub fn global() -> &'static FormatRegistry {
        DEFAULT_REGISTRY.get_or_init(|| {
            let registry = Self::with_defaults();
            tracing::trace!(formats = registry.formats.len(), "format registry initialized");
            registry
        })
    }

    /// Register a format
    ///
    /// A format with the same name is replaced in place, keeping its
    /// position in the listing.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        let boxed: Box<dyn Format> = Box::new(format);
        match self
            .formats
            .iter_mut()
            .find(|existing| existing.name() == boxed.name())
        {
            Some(slot) => *slot = boxed,
            None => self.formats.push(boxed),
        }
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .iter()
            .find(|format| format.name() == name)
            .map(|format| format.as_ref())
            .ok_or_else(|| FormatError::UnknownFormat(name.to_string()))
    }

    /// Alias of [`get`](Self::get).
    pub fn resolve(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.get(name)
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.iter().any(|format| format.name() == name)
    }

    /// List all format names in registration order
    pub fn list_formats(&self) -> Vec<String> {
        self.formats
            .iter()
            .map(|format| format.name().to_string())
            .collect()
    }

    /// Iterate over the registered formats in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Format> {
        self.formats.iter().map(|format| format.as_ref())
    }

    /// Detect format from filename based on file extension
    ///
    /// Extensions are compared case-insensitively.
    ///
    /// ```ignore
    /// let registry = FormatRegistry::default();
    /// assert_eq!(registry.detect_format_from_filename("data.yml"), Some("yaml".to_string()));
    /// assert_eq!(registry.detect_format_from_filename("data.unknown"), None);
    /// ```
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .iter()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(BsonFormat);
        registry.register(DelimitedFormat::csv());
        registry.register(GoFormat);
        registry.register(JsonFormat);
        registry.register(JsonlFormat);
        registry.register(PropertiesFormat);
        registry.register(TagsFormat);
        registry.register(TomlFormat);
        registry.register(DelimitedFormat::tsv());
        registry.register(HclFormat::v1());
        registry.register(HclFormat::v2());
        registry.register(YamlFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
