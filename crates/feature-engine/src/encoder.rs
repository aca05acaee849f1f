//! Label Encoders
//!
//! Each categorical field maps a fixed, ordered set of labels onto
//! contiguous codes starting at 0. The label order is the one fitted at
//! training time and is also the order the form offers the choices in.

use crate::error::{EncoderError, FeatureError};
use crate::field::CategoricalField;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use tracing::{debug, info};

/// Bidirectional label <-> code mapping for one field
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    field: CategoricalField,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Create an encoder whose codes are the positions in `classes`
    pub fn new(field: CategoricalField, classes: Vec<String>) -> Result<Self, EncoderError> {
        if classes.is_empty() {
            return Err(EncoderError::NoLabels(field));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if label.is_empty() {
                return Err(EncoderError::EmptyLabel(field));
            }
            if codes.insert(label.clone(), code as u32).is_some() {
                return Err(EncoderError::DuplicateLabel {
                    field,
                    label: label.clone(),
                });
            }
        }

        Ok(Self {
            field,
            classes,
            codes,
        })
    }

    /// Field this encoder belongs to
    pub fn field(&self) -> CategoricalField {
        self.field
    }

    /// Code for a label, if registered
    pub fn transform(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    /// Label for a code, if in range
    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Registered labels in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// One label encoder per categorical field
#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    /// Indexed by field ordinal; always holds every field
    encoders: Vec<LabelEncoder>,
}

impl EncoderRegistry {
    /// Build a registry from per-field label lists. Every field must be present.
    pub fn from_labels<I>(labels: I) -> Result<Self, EncoderError>
    where
        I: IntoIterator<Item = (CategoricalField, Vec<String>)>,
    {
        let mut by_field: BTreeMap<CategoricalField, Vec<String>> = labels.into_iter().collect();

        let mut encoders = Vec::with_capacity(CategoricalField::ALL.len());
        for field in CategoricalField::ALL {
            let classes = by_field
                .remove(&field)
                .ok_or(EncoderError::MissingField(field))?;
            let encoder = LabelEncoder::new(field, classes)?;
            debug!("Label encoder for {}: {} labels", field, encoder.classes().len());
            encoders.push(encoder);
        }

        info!("Loaded label encoders for {} fields", encoders.len());
        Ok(Self { encoders })
    }

    /// Parse the encoder artifact: a JSON object keyed by column name
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EncoderError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_reader(reader)?;
        Self::from_named(raw)
    }

    /// Parse the encoder artifact from a string
    pub fn from_json_str(json: &str) -> Result<Self, EncoderError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Self::from_named(raw)
    }

    fn from_named(raw: BTreeMap<String, Vec<String>>) -> Result<Self, EncoderError> {
        let labels = raw
            .into_iter()
            .map(|(name, classes)| {
                CategoricalField::from_name(&name)
                    .map(|field| (field, classes))
                    .ok_or(EncoderError::UnknownField(name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_labels(labels)
    }

    /// Encoder for a field
    pub fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        &self.encoders[field.ordinal()]
    }

    /// Encode a label, failing on anything not registered for the field
    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<u32, FeatureError> {
        self.encoder(field)
            .transform(label)
            .ok_or_else(|| FeatureError::UnknownLabel {
                field,
                label: label.to_string(),
            })
    }

    /// Decode a code back to its label
    pub fn decode(&self, field: CategoricalField, code: u32) -> Option<&str> {
        self.encoder(field).inverse_transform(code)
    }

    /// Labels for a field, in code order
    pub fn classes(&self, field: CategoricalField) -> &[String] {
        self.encoder(field).classes()
    }
}
