//! Conversion orchestrator
//!
//! A conversion is a single synchronous pass over an in-memory buffer:
//!
//! 1. resolve both formats and check they can decode / encode
//! 2. bound the input size
//! 3. decode into the IR; untyped decoders see the schema hint here
//! 4. bound the nesting depth
//! 5. sort keys when asked
//! 6. coerce fields named by the schema hint, if any
//! 7. encode
//!
//! Either the whole pipeline succeeds or an error is returned; no partial
//! output is ever produced.

use crate::error::FormatError;
use crate::format::SerializedDocument;
use crate::options::ConvertOptions;
use crate::registry::FormatRegistry;
use crate::schema::Schema;
use crate::value::SortOrder;

/// Converts `input` from one registered format to another using the
/// default registry.
pub fn convert(
    input: &[u8],
    from: &str,
    to: &str,
    schema: Option<&Schema>,
    options: &ConvertOptions,
) -> Result<SerializedDocument, FormatError> {
    convert_with(FormatRegistry::global(), input, from, to, schema, options)
}

/// Same as [`convert`] against an explicit registry.
pub fn convert_with(
    registry: &FormatRegistry,
    input: &[u8],
    from: &str,
    to: &str,
    schema: Option<&Schema>,
    options: &ConvertOptions,
) -> Result<SerializedDocument, FormatError> {
    let source = registry.resolve(from)?;
    let target = registry.resolve(to)?;
    if !source.supports_decoding() {
        return Err(FormatError::NotSupported {
            format: from.to_string(),
            operation: "decoding",
        });
    }
    if !target.supports_encoding() {
        return Err(FormatError::NotSupported {
            format: to.to_string(),
            operation: "encoding",
        });
    }

    let limits = options.limits;
    if input.len() > limits.max_input_bytes {
        return Err(FormatError::LimitExceeded(format!(
            "input is {} bytes, the limit is {}",
            input.len(),
            limits.max_input_bytes
        )));
    }

    let mut decode_options = options.input.clone();
    decode_options.max_depth = limits.max_depth;
    if let Some(schema) = schema {
        decode_options.schema = Some(schema.clone());
    }

    tracing::debug!(from, to, bytes = input.len(), "decoding");
    let mut payload = source.decode(input, &decode_options)?;

    let depth = payload.depth();
    if depth > limits.max_depth {
        return Err(FormatError::LimitExceeded(format!(
            "input nests {depth} levels deep, the limit is {}",
            limits.max_depth
        )));
    }

    if options.sorted {
        let order = if options.reversed {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        for value in payload.values_mut() {
            value.sort_keys(order);
        }
    }

    if let Some(schema) = schema {
        schema.apply(&mut payload)?;
    }

    tracing::debug!(
        from,
        to,
        records = payload.record_count(),
        stream = payload.is_stream(),
        "encoding"
    );
    target.encode(&payload, &options.output)
}

/// A conversion described as data.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    pub from: String,
    pub to: String,
    pub schema: Option<Schema>,
    pub options: ConvertOptions,
}

/// Outcome of [`ConversionRequest::run`]. Exactly one field is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub output: Option<SerializedDocument>,
    pub error: Option<FormatError>,
}

impl ConversionResult {
    pub fn is_ok(&self) -> bool {
        self.output.is_some()
    }

    pub fn into_result(self) -> Result<SerializedDocument, FormatError> {
        match (self.output, self.error) {
            (Some(output), _) => Ok(output),
            (None, Some(error)) => Err(error),
            (None, None) => Err(FormatError::encode("", "conversion produced no output")),
        }
    }
}

impl From<Result<SerializedDocument, FormatError>> for ConversionResult {
    fn from(result: Result<SerializedDocument, FormatError>) -> Self {
        match result {
            Ok(output) => Self {
                output: Some(output),
                error: None,
            },
            Err(error) => Self {
                output: None,
                error: Some(error),
            },
        }
    }
}

impl ConversionRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self, input: &[u8]) -> ConversionResult {
        let result = convert(
            input,
            &self.from,
            &self.to,
            self.schema.as_ref(),
            &self.options,
        );
        if let Err(err) = &result {
            tracing::debug!(from = %self.from, to = %self.to, error = %err, "conversion failed");
        }
        result.into()
    }
}
