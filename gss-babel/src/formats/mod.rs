//! Format implementations
//!
//! One module per format family. CSV and TSV share [`csv::DelimitedFormat`];
//! both HCL dialects share [`hcl::HclFormat`]; JSON and JSON Lines live
//! together in [`json`].

pub mod bson;
pub mod common;
pub mod csv;
pub mod go;
pub mod hcl;
pub mod json;
pub mod properties;
pub mod tags;
pub mod toml;
pub mod yaml;

pub use self::bson::BsonFormat;
pub use self::csv::DelimitedFormat;
pub use self::go::GoFormat;
pub use self::hcl::HclFormat;
pub use self::json::{JsonFormat, JsonlFormat};
pub use self::properties::PropertiesFormat;
pub use self::tags::TagsFormat;
pub use self::toml::TomlFormat;
pub use self::yaml::YamlFormat;
