//! Attribute encoding for mixed categorical and numerical records.
//!
//! Distances are only ever computed over `f64` vectors. A [`RecordEncoder`]
//! binds one [`Encoder`] per attribute position the first time it sees a
//! record and reuses those encoders for every later record, so the same
//! category always lands on the same number.

use crate::error::ClusterError;
use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;
use std::fmt;

/// Placeholder returned when a float has no known category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Declared type of an attribute position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Numerical,
    Categorical,
}

/// A raw attribute value before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{:?}", n),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Passthrough encoder for numbers
#[derive(Debug, Clone, Default)]
pub struct NumericalEncoder;

impl NumericalEncoder {
    /// Numbers pass through unchanged; text must parse as a float.
    pub fn encode(&self, value: &RawValue) -> Result<f64, ClusterError> {
        match value {
            RawValue::Number(n) => Ok(*n),
            RawValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ClusterError::NotNumeric(s.clone())),
        }
    }
}

/// Hashable identity of a category
///
/// Numbers and text never share a key, so `1.0` and `"1.0"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CategoryKey {
    Text(String),
    Number(u64),
}

impl From<&RawValue> for CategoryKey {
    fn from(value: &RawValue) -> Self {
        match value {
            RawValue::Text(s) => CategoryKey::Text(s.clone()),
            // -0.0 and 0.0 are one category
            RawValue::Number(n) => CategoryKey::Number((n + 0.0).to_bits()),
        }
    }
}

/// Append-only lookup table from category to float
///
/// Categories get `0.0, 1.0, 2.0, ...` in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct CategoricalEncoder {
    mapping: HashMap<CategoryKey, f64>,
    categories: Vec<RawValue>,
}

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a category, registering it on first sight.
    pub fn encode(&mut self, value: &RawValue) -> f64 {
        let key = CategoryKey::from(value);
        if let Some(&code) = self.mapping.get(&key) {
            return code;
        }

        let code = self.categories.len() as f64;
        self.mapping.insert(key, code);
        self.categories.push(value.clone());
        code
    }

    /// Reverse lookup; unmapped floats decode to [`UNKNOWN_CATEGORY`].
    pub fn decode(&self, code: f64) -> RawValue {
        if code < 0.0 || code.fract() != 0.0 {
            return RawValue::from(UNKNOWN_CATEGORY);
        }
        self.categories
            .get(code as usize)
            .cloned()
            .unwrap_or_else(|| RawValue::from(UNKNOWN_CATEGORY))
    }

    /// Number of distinct categories seen so far
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Encoder bound to a single attribute position
#[derive(Debug, Clone)]
pub enum Encoder {
    Numerical(NumericalEncoder),
    Categorical(CategoricalEncoder),
}

impl Encoder {
    pub fn for_kind(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Numerical => Encoder::Numerical(NumericalEncoder),
            AttributeKind::Categorical => Encoder::Categorical(CategoricalEncoder::new()),
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Encoder::Numerical(_) => AttributeKind::Numerical,
            Encoder::Categorical(_) => AttributeKind::Categorical,
        }
    }

    pub fn encode(&mut self, value: &RawValue) -> Result<f64, ClusterError> {
        match self {
            Encoder::Numerical(enc) => enc.encode(value),
            Encoder::Categorical(enc) => Ok(enc.encode(value)),
        }
    }

    pub fn decode(&self, code: f64) -> RawValue {
        match self {
            Encoder::Numerical(_) => RawValue::Number(code),
            Encoder::Categorical(enc) => enc.decode(code),
        }
    }
}

/// Per-position encoders for a stream of records
///
/// The schema (arity and kind per position) is fixed by the first record.
#[derive(Debug, Clone, Default)]
pub struct RecordEncoder {
    encoders: Vec<Encoder>,
}

impl RecordEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds fixed by the first record, empty before any record was seen
    pub fn schema(&self) -> Vec<AttributeKind> {
        self.encoders.iter().map(Encoder::kind).collect()
    }

    /// Number of attribute positions, 0 before the first record
    pub fn arity(&self) -> usize {
        self.encoders.len()
    }

    /// Encode a record into an attribute vector.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Validation`] if `values` and `kinds` differ in
    /// length or disagree with the schema, and [`ClusterError::NotNumeric`]
    /// if a numerical position receives non-numeric text. Nothing is
    /// registered when an error is returned.
    pub fn encode(
        &mut self,
        values: &[RawValue],
        kinds: &[AttributeKind],
    ) -> Result<Array1<f64>, ClusterError> {
        if values.len() != kinds.len() {
            return Err(ClusterError::Validation(format!(
                "Number of values ({}) must match number of data types ({})",
                values.len(),
                kinds.len()
            )));
        }

        if !self.encoders.is_empty() {
            let schema = self.schema();
            if schema.as_slice() != kinds {
                return Err(ClusterError::Validation(format!(
                    "Record kinds {:?} do not match schema {:?}",
                    kinds, schema
                )));
            }
        }

        // Numeric failures must not leave half-registered categories behind
        for (kind, value) in kinds.iter().zip(values) {
            if *kind == AttributeKind::Numerical {
                NumericalEncoder.encode(value)?;
            }
        }

        if self.encoders.is_empty() {
            self.encoders = kinds.iter().copied().map(Encoder::for_kind).collect();
        }

        let encoded = self
            .encoders
            .iter_mut()
            .zip(values)
            .map(|(encoder, value)| encoder.encode(value))
            .collect::<Result<Vec<f64>, ClusterError>>()?;

        Ok(Array1::from(encoded))
    }

    /// Map an encoded vector back to raw values.
    pub fn decode(&self, attributes: &ArrayView1<f64>) -> Result<Vec<RawValue>, ClusterError> {
        if attributes.len() != self.encoders.len() {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} attributes, got {}",
                self.encoders.len(),
                attributes.len()
            )));
        }

        Ok(self
            .encoders
            .iter()
            .zip(attributes.iter())
            .map(|(encoder, &code)| encoder.decode(code))
            .collect())
    }
}
