use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document types the generator can fill and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Agreement,
    Clearance,
    Letter,
    Rating,
    Invoice,
    Collaboration,
    Certificate,
    FeeStatement,
}

impl DocumentKind {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Agreement,
            Self::Clearance,
            Self::Letter,
            Self::Rating,
            Self::Invoice,
            Self::Collaboration,
            Self::Certificate,
            Self::FeeStatement,
        ]
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Agreement => "agreement",
            Self::Clearance => "clearance",
            Self::Letter => "letter",
            Self::Rating => "rating",
            Self::Invoice => "invoice",
            Self::Collaboration => "collaboration",
            Self::Certificate => "certificate",
            Self::FeeStatement => "fee-statement",
        }
    }

    /// Short code used in reference numbers.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Agreement => "AGR",
            Self::Clearance => "CLR",
            Self::Letter => "LTR",
            Self::Rating => "RTG",
            Self::Invoice => "INV",
            Self::Collaboration => "COL",
            Self::Certificate => "CRT",
            Self::FeeStatement => "FEE",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DocumentKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ordered()
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| UnknownVariant {
                what: "document kind",
                value: value.to_string(),
            })
    }
}

/// Output formats offered by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Png,
    Jpg,
    /// Plain-text stand-in saved with a word-processor extension.
    Doc,
}

impl ExportFormat {
    pub const ALL: &'static [ExportFormat] = &[
        ExportFormat::Pdf,
        ExportFormat::Png,
        ExportFormat::Jpg,
        ExportFormat::Doc,
    ];

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Doc => "doc",
        }
    }

    pub fn mime(self) -> mime::Mime {
        match self {
            Self::Pdf => mime::APPLICATION_PDF,
            Self::Png => mime::IMAGE_PNG,
            Self::Jpg => mime::IMAGE_JPEG,
            Self::Doc => mime::TEXT_PLAIN_UTF_8,
        }
    }

    pub const fn is_raster(self) -> bool {
        matches!(self, Self::Png | Self::Jpg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "doc" | "word" | "txt" => Ok(Self::Doc),
            _ => Err(UnknownVariant {
                what: "export format",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what} '{value}'")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

/// Input widget semantics for a template field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Multiline,
    Date,
    Number,
    Choice(&'static [&'static str]),
}

impl FieldKind {
    /// Longest accepted value, in characters.
    pub const fn max_chars(self) -> usize {
        match self {
            Self::Multiline => 8_000,
            Self::Text | Self::Date | Self::Number | Self::Choice(_) => 240,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// User-entered values keyed by field key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
