//! Format-agnostic conversion between structured-data formats
//!
//!     This crate converts a payload in one structured-data format (JSON, YAML, TOML, CSV, BSON,
//!     ...) into an equivalent payload in another. It is a pure library: no file system, no
//!     stdout, no environment variables. The gss-cli crate is the shell around it.
//!
//! Architecture
//!
//!     Formats never talk to each other. Every decoder produces the intermediate representation
//!     (./value.rs) and every encoder consumes it, so adding a format means writing one adapter
//!     and one registry entry instead of a converter per pair.
//!
//!         raw input → decoder → Payload (IR + cardinality) → sort → schema → encoder → output
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError
//!     ├── value.rs                # IR: Value, Map, ValueVisitor
//!     ├── payload.rs              # decoded values + Document/Stream cardinality
//!     ├── coerce.rs               # scalar inference for untyped text
//!     ├── options.rs              # ConvertOptions, DecodeOptions, EncodeOptions, Limits
//!     ├── schema.rs               # optional field type hints
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── convert.rs              # the conversion pipeline
//!     ├── formats
//!     │   ├── common              # line splitting and cell rendering shared by text formats
//!     │   ├── <format>
//!     │   │   └── mod.rs
//!     └── lib.rs
//!
//! Testing
//!
//!     tests
//!     └── <area>
//!         └── mod.rs
//!
//!     Rust does not discover tests in subdirectories by default, so tests/lib.rs includes them.
//!
//! Streams and documents
//!
//!     Some formats hold exactly one value (JSON, TOML), others hold a stream of records (JSONL,
//!     Tags, CSV rows). The Payload carries that distinction explicitly: a document format
//!     receiving a stream writes it as one array, and a record format receiving a document
//!     writes the elements of a top-level array as records.
//!
//! Formats
//!
//!     bson, csv, go, json, jsonl, properties, tags, toml, tsv, hcl, hcl2, yaml
//!
//!     go is encode only, hcl (the legacy dialect) is decode only. Text formats without native
//!     typing (csv, tsv, properties, tags) run every cell through coerce::infer_field, which
//!     leaves fields the schema hint marks as string untouched.

pub mod coerce;
pub mod convert;
pub mod error;
pub mod format;
pub mod formats;
pub mod options;
pub mod payload;
pub mod registry;
pub mod schema;
pub mod value;

pub use convert::{convert, convert_with, ConversionRequest, ConversionResult};
pub use error::{FormatError, Position};
pub use format::{Capabilities, Format, SerializedDocument};
pub use options::{Case, ConvertOptions, DecodeOptions, EncodeOptions, Limits};
pub use payload::{Cardinality, Payload};
pub use registry::FormatRegistry;
pub use schema::{FieldType, Schema};
pub use value::{Map, SortOrder, Value, ValueVisitor};

/// Names of the built-in formats, in registration order.
pub fn formats() -> Vec<String> {
    FormatRegistry::global().list_formats()
}
