//! Manifest entry normalization.
//!
//! Raw manifest elements arrive as JSON: either a bare URL string or an
//! object `{url, revision?, cacheBust?}`. Normalization validates each
//! element in a single pass and produces a [`ManifestEntry`] with an
//! absolute URL and a non-empty revision.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::resolve::resolve_url;
use crate::Error;

/// Wrapper field accepted around the entry array.
pub const REVISIONED_FILES_FIELD: &str = "revisionedFiles";

const URL_FIELD: &str = "url";
const REVISION_FIELD: &str = "revision";
const CACHE_BUST_FIELD: &str = "cacheBust";

/// A validated manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Absolute, canonical URL. Also the storage key.
    pub url: String,
    /// Revision marker; defaults to `url` for unrevisioned assets.
    pub revision: String,
    /// Append a revision-derived query parameter when fetching same-origin.
    pub cache_bust: bool,
}

/// Resolved `{url, revision}` pair carried by conflict errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub url: String,
    pub revision: String,
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.url, self.revision)
    }
}

impl ManifestEntry {
    /// Normalize the manifest element at `index`, resolving its URL against `base`.
    pub fn from_value(value: &Value, index: usize, base: &Url) -> Result<Self, Error> {
        match value {
            Value::String(raw) => {
                let url = normalize_url(raw, index, base)?;
                Ok(Self { revision: url.clone(), url, cache_bust: false })
            }
            Value::Object(fields) => Self::from_fields(fields, index, base),
            other => Err(Error::InvalidEntry { index, found: json_type(other).to_string() }),
        }
    }

    fn from_fields(fields: &Map<String, Value>, index: usize, base: &Url) -> Result<Self, Error> {
        let raw_url = match fields.get(URL_FIELD) {
            Some(Value::String(raw)) => raw,
            Some(other) => {
                return Err(Error::InvalidEntry { index, found: format!("object with {} 'url'", json_type(other)) });
            }
            None => return Err(Error::InvalidEntry { index, found: "object without 'url'".into() }),
        };
        let url = normalize_url(raw_url, index, base)?;

        let revision = match fields.get(REVISION_FIELD) {
            None => url.clone(),
            Some(Value::String(revision)) if revision.is_empty() => {
                return Err(Error::InvalidFieldValue {
                    index,
                    problem_param: REVISION_FIELD.into(),
                    problem_value: String::new(),
                });
            }
            Some(Value::String(revision)) => revision.clone(),
            Some(other) => return Err(wrong_type(index, REVISION_FIELD, "string", other)),
        };

        let cache_bust = match fields.get(CACHE_BUST_FIELD) {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => return Err(wrong_type(index, CACHE_BUST_FIELD, "boolean", other)),
        };

        Ok(Self { url, revision, cache_bust })
    }

    /// The `{url, revision}` pair of this entry.
    pub fn entry_ref(&self) -> EntryRef {
        EntryRef { url: self.url.clone(), revision: self.revision.clone() }
    }
}

/// Normalize a whole manifest: a JSON array or a `{revisionedFiles: [...]}` wrapper.
///
/// Fails on the first invalid element; nothing is returned for partial input.
pub fn parse_manifest(manifest: &Value, base: &Url) -> Result<Vec<ManifestEntry>, Error> {
    let items = match manifest {
        Value::Array(items) => items,
        Value::Object(fields) => match fields.get(REVISIONED_FILES_FIELD) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::InvalidManifestType {
                    found: format!("{REVISIONED_FILES_FIELD} of type {}", json_type(other)),
                });
            }
            None => {
                return Err(Error::InvalidManifestType { found: format!("object without {REVISIONED_FILES_FIELD}") });
            }
        },
        other => return Err(Error::InvalidManifestType { found: json_type(other).to_string() }),
    };

    if items.is_empty() {
        return Err(Error::InvalidManifestType { found: "empty array".into() });
    }

    items.iter().enumerate().map(|(index, value)| ManifestEntry::from_value(value, index, base)).collect()
}

fn normalize_url(raw: &str, index: usize, base: &Url) -> Result<String, Error> {
    if raw.is_empty() {
        return Err(Error::InvalidFieldValue { index, problem_param: URL_FIELD.into(), problem_value: String::new() });
    }

    resolve_url(raw, base).map(String::from).map_err(|e| {
        tracing::debug!(index, url = raw, error = %e, "rejected manifest url");
        Error::InvalidFieldValue { index, problem_param: URL_FIELD.into(), problem_value: raw.to_string() }
    })
}

fn wrong_type(index: usize, field: &str, expected: &'static str, found: &Value) -> Error {
    Error::WrongFieldType { index, field: field.to_string(), expected, found: json_type(found).to_string() }
}

/// Name of the JSON type of `value`, for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
