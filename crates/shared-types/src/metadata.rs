//! Field metadata supplied with each aggregation result

use serde::{Deserialize, Serialize};

/// Data type of a field, as reported by the aggregation definition.
///
/// The API is not consistent about casing, so parsing is case-insensitive.
/// Types this layer does not format are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    Integer,
    Float,
    String,
    Percentage,
    Other(String),
}

impl From<String> for DataType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "integer" => DataType::Integer,
            "float" => DataType::Float,
            "string" => DataType::String,
            "percentage" => DataType::Percentage,
            _ => DataType::Other(raw),
        }
    }
}

impl From<&str> for DataType {
    fn from(raw: &str) -> Self {
        DataType::from(raw.to_string())
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => "integer".to_string(),
            DataType::Float => "float".to_string(),
            DataType::String => "string".to_string(),
            DataType::Percentage => "percentage".to_string(),
            DataType::Other(raw) => raw,
        }
    }
}

/// Describes one column of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub physical_name: String,
    #[serde(default)]
    pub display_name: String,
    pub data_type: DataType,
}

impl FieldMetadata {
    pub fn new(
        physical_name: impl Into<String>,
        display_name: impl Into<String>,
        data_type: impl Into<DataType>,
    ) -> Self {
        Self {
            physical_name: physical_name.into(),
            display_name: display_name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Ordered field metadata for one rendered chart.
///
/// Lookups are by physical name; when the list carries duplicates the
/// first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMetadataSet {
    fields: Vec<FieldMetadata>,
}

impl FieldMetadataSet {
    pub fn new(fields: Vec<FieldMetadata>) -> Self {
        Self { fields }
    }

    pub fn find(&self, physical_name: &str) -> Option<&FieldMetadata> {
        self.fields
            .iter()
            .find(|field| field.physical_name == physical_name)
    }

    /// Human-readable label for a column, falling back to the physical name
    /// when no entry (or an empty display name) exists.
    pub fn display_name<'a>(&'a self, physical_name: &'a str) -> &'a str {
        match self.find(physical_name) {
            Some(field) if !field.display_name.is_empty() => &field.display_name,
            _ => physical_name,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter()
    }
}

impl From<Vec<FieldMetadata>> for FieldMetadataSet {
    fn from(fields: Vec<FieldMetadata>) -> Self {
        Self::new(fields)
    }
}

impl FromIterator<FieldMetadata> for FieldMetadataSet {
    fn from_iter<I: IntoIterator<Item = FieldMetadata>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
