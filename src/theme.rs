//! Theme descriptor (`theme.json`) for zEdit themes.
//!
//! The descriptor carries the theme identity (`id`, `version`) plus any number
//! of pass-through metadata fields. It is read fresh from disk by every task
//! that needs it and never mutated; the compiled stylesheet header is rendered
//! from a copy with `id` removed.

use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::ThemeError;

/// Theme identifier, used as the output file stem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThemeId(String);

impl ThemeId {
    /// Validate an id taken from the descriptor.
    /// Rejects anything that would not stay a plain file name inside `dist/`.
    pub fn validated(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("must not be empty".to_string());
        }
        if s.contains(['/', '\\']) || s == "." || s == ".." {
            return Err(format!("'{}' must be a plain file name", s));
        }
        Ok(Self(s.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed `theme.json`
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDescriptor {
    pub id: ThemeId,
    pub version: Option<String>,
    /// All descriptor fields in file order, `id` included
    fields: Map<String, Value>,
}

impl ThemeDescriptor {
    /// Read and parse a descriptor file
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let content = fs::read_to_string(path).map_err(|source| ThemeError::DescriptorRead {
            path: path.to_path_buf(),
            source,
        })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| ThemeError::DescriptorParse {
                path: path.to_path_buf(),
                source,
            })?;

        match value {
            Value::Object(fields) => Self::from_fields(fields),
            other => Err(ThemeError::InvalidField {
                field: "<root>",
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Build a descriptor from an already-parsed field map
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, ThemeError> {
        let id = match fields.get("id") {
            None | Some(Value::Null) => return Err(ThemeError::MissingField { field: "id" }),
            Some(Value::String(s)) => {
                ThemeId::validated(s).map_err(|reason| ThemeError::InvalidField {
                    field: "id",
                    reason,
                })?
            }
            Some(other) => {
                return Err(ThemeError::InvalidField {
                    field: "id",
                    reason: format!("expected a string, found {}", json_kind(other)),
                })
            }
        };

        let version = match fields.get("version") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(ThemeError::InvalidField {
                    field: "version",
                    reason: format!("expected a string, found {}", json_kind(other)),
                })
            }
        };

        Ok(Self {
            id,
            version,
            fields,
        })
    }

    /// Metadata comment placed at the top of the compiled stylesheet
    pub fn header_comment(&self) -> String {
        let mut metadata = self.fields.clone();
        metadata.shift_remove("id");
        // Serializing a map of JSON values cannot fail
        let text = serde_json::to_string_pretty(&Value::Object(metadata))
            .unwrap_or_else(|_| "{}".to_string());
        format!("/*{}*/\n\n", text)
    }

    /// File name of the build artifact: `<id>.css`
    pub fn artifact_name(&self) -> String {
        format!("{}.css", self.id)
    }

    /// File name of the release archive: `<id>-v<version>.zip`
    pub fn archive_name(&self) -> Result<String, ThemeError> {
        let version = self
            .version
            .as_deref()
            .ok_or(ThemeError::MissingField { field: "version" })?;
        Ok(format!("{}-v{}.zip", self.id, version))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
