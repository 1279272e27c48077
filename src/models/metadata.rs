use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An entry of a `[{ "name": ... }]` list (genres, keywords, cast)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedEntry {
    pub name: String,
}

impl NamedEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A crew member; only `job == "Director"` entries contribute tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewMember {
    pub name: String,
    #[serde(default)]
    pub job: String,
}

impl CrewMember {
    pub fn new(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
        }
    }
}

/// Number of leading cast entries that contribute tags
pub const TOP_CAST: usize = 3;

/// Raw metadata of one movie, as consumed by the tag extractor
///
/// Every field has an explicit default. Absent or malformed lists resolve to
/// empty vectors and individual malformed entries are dropped, so the same
/// record is produced whether the data came from the bootstrap CSV or from a
/// provider response.
///
/// `cast` holds at most [`TOP_CAST`] entries. The billing window is taken
/// from the raw list before malformed entries are dropped, so a bad entry
/// among the first three never promotes the fourth-billed actor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub genres: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub keywords: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "lenient_top_cast")]
    pub cast: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub crew: Vec<CrewMember>,
}

/// Deserializes a list, dropping entries that don't match `T`.
///
/// Anything other than an array (null, a string, an object) becomes an empty list.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(list_from_value(value))
}

/// Deserializes a cast list, keeping the valid entries among the first
/// [`TOP_CAST`] raw ones.
pub fn lenient_top_cast<'de, D>(deserializer: D) -> Result<Vec<NamedEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(leading_list_from_value(value, TOP_CAST))
}

/// Deserializes an optional string; non-string values become `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    leading_list_from_value(value, usize::MAX)
}

/// Like [`list_from_value`], but only the first `limit` raw entries are
/// considered. Malformed entries inside the window still count towards it.
pub fn leading_list_from_value<T: DeserializeOwned>(value: Value, limit: usize) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .take(limit)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parses a JSON-encoded list column such as the ones in the TMDB 5000 CSV
/// export (`[{"id": 28, "name": "Action"}, ...]`).
///
/// Unparseable text yields an empty list.
pub fn list_from_json_str<T: DeserializeOwned>(raw: &str) -> Vec<T> {
    serde_json::from_str::<Value>(raw)
        .map(list_from_value)
        .unwrap_or_default()
}

/// Parses a JSON-encoded cast column, keeping the billing window of
/// [`lenient_top_cast`].
pub fn top_cast_from_json_str(raw: &str) -> Vec<NamedEntry> {
    serde_json::from_str::<Value>(raw)
        .map(|value| leading_list_from_value(value, TOP_CAST))
        .unwrap_or_default()
}
