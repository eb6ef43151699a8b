//! Searchable document model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Kind of page a document was generated from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Project,
    /// Also used for any unrecognized type
    #[default]
    #[serde(other)]
    Post,
}

impl DocumentKind {
    /// Human readable label used in result listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Project => "Project",
        }
    }
}

/// A single searchable page.
///
/// Documents are immutable once loaded. Both the local index and the remote
/// stores hand out owned copies; nothing mutates them afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: DocumentKind,

    #[serde(default, deserialize_with = "null_as_default")]
    pub encrypted: bool,
}

impl Document {
    /// Decodes a stored JSON blob.
    pub fn from_json(blob: &str) -> Result<Self> {
        Ok(serde_json::from_str(blob)?)
    }

    /// Decodes an already parsed JSON record.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Lowercased `title content excerpt` haystack used for substring matching.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.content.as_deref().unwrap_or(""),
            self.excerpt.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }

    /// Returns true when every token occurs in the searchable text.
    ///
    /// Tokens are expected to be normalized already (see [`crate::tokenizer`]).
    pub fn matches_all(&self, tokens: &[String]) -> bool {
        let text = self.searchable_text();
        tokens.iter().all(|token| text.contains(token.as_str()))
    }
}

/// Wire shape of the pre-built local index: `{ "docs": [...] }`.
///
/// Records that cannot be decoded (no id, wrong field types) are skipped so
/// one bad entry does not make the whole index unusable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchIndex {
    #[serde(default, deserialize_with = "skip_undecodable")]
    pub docs: Vec<Document>,
}

/// Document identifier as it appears on the wire.
///
/// Stores written by different build tools emit ids either as strings or as
/// bare integers; both are normalized to `String`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Integer(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Integer(n) => n.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn skip_undecodable<'de, D>(deserializer: D) -> std::result::Result<Vec<Document>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(records
        .into_iter()
        .filter_map(|record| Document::from_value(record).ok())
        .collect())
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}
