//! Decoded values together with their cardinality.
//!
//! Some formats hold one document (JSON, TOML), others a stream of
//! independent records (JSONL, Tags, CSV rows). The distinction is carried
//! explicitly instead of being guessed by each encoder:
//!
//! - a document format receiving a `Stream` sees it as one `Array`
//! - a record format receiving a `Document` explodes a top-level `Array`
//!   into its elements and treats anything else as a single record

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one value
    Document,
    /// Zero or more independent records
    Stream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    cardinality: Cardinality,
    values: Vec<Value>,
}

impl Payload {
    pub fn document(value: Value) -> Self {
        Self {
            cardinality: Cardinality::Document,
            values: vec![value],
        }
    }

    pub fn stream(records: Vec<Value>) -> Self {
        Self {
            cardinality: Cardinality::Stream,
            values: records,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_stream(&self) -> bool {
        self.cardinality == Cardinality::Stream
    }

    /// The raw decoded values (one for documents).
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    /// The payload viewed as a single document.
    pub fn to_document(&self) -> Value {
        match self.cardinality {
            Cardinality::Document => self.values.first().cloned().unwrap_or_default(),
            Cardinality::Stream => Value::Array(self.values.clone()),
        }
    }

    /// The payload viewed as a sequence of records.
    pub fn records(&self) -> Vec<&Value> {
        match (self.cardinality, self.values.first()) {
            (Cardinality::Stream, _) => self.values.iter().collect(),
            (Cardinality::Document, Some(Value::Array(items))) => items.iter().collect(),
            (Cardinality::Document, Some(value)) => vec![value],
            (Cardinality::Document, None) => Vec::new(),
        }
    }

    /// Number of records the payload holds.
    pub fn record_count(&self) -> usize {
        self.records().len()
    }

    /// Deepest nesting among the decoded values.
    pub fn depth(&self) -> usize {
        self.values.iter().map(Value::depth).max().unwrap_or(0)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
