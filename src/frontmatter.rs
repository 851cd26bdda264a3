//! YAML frontmatter splitting and typed decoding.
//!
//! A content file may open with a metadata block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello World
//! tags: rust, web
//! ---
//! Body text in **Markdown**.
//! ```
//!
//! A file without an opening fence, or with an opening fence that is never
//! closed, has no metadata: the whole file is body. An empty block decodes to
//! the type's defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

const FENCE: &str = "---";

/// Split a source file into its raw frontmatter block (if any) and body.
pub fn split(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(first_line_end) = source.find('\n') else {
        return (None, source);
    };
    if source[..first_line_end].trim_end() != FENCE {
        return (None, source);
    }

    let block_start = first_line_end + 1;
    let mut offset = block_start;
    for line in source[block_start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let block = &source[block_start..offset];
            let body = &source[offset + line.len()..];
            return (Some(block), body.strip_prefix('\n').unwrap_or(body));
        }
        offset += line.len();
    }
    (None, source)
}

/// Split and decode a content file into typed metadata plus the Markdown body.
pub fn parse<T>(source: &str) -> Result<(T, String), serde_yaml::Error>
where
    T: DeserializeOwned + Default,
{
    let (block, body) = split(source);
    let meta = match block {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => T::default(),
    };
    Ok((meta, body.to_string()))
}

/// A list field that may be written as `a, b, c` or as a YAML sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListField {
    List(Vec<String>),
    Csv(String),
}

impl Default for ListField {
    fn default() -> Self {
        ListField::List(Vec::new())
    }
}

impl ListField {
    /// Normalize to a list of trimmed, non-empty, case-preserved entries.
    pub fn into_vec(self) -> Vec<String> {
        let raw = match self {
            ListField::List(items) => items,
            ListField::Csv(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Deserialize an optional scalar as a string.
///
/// YAML reads `title: 2024` as a number and `slug: true` as a bool;
/// both are accepted here and kept as their written form. Sequences and
/// mappings are an error.
pub fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a scalar, found {other:?}"
        ))),
    }
}

/// Deserialize a field where a blank value (`draft:` with nothing after it)
/// means the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a non-negative count, reading `"42"` as 42.
///
/// Anything that is not a whole non-negative number reads as 0.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        Some(serde_yaml::Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(serde_yaml::Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}
