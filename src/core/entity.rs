//! Entity trait - common interface for backend entities

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Common trait for entities served by the backend
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Query cache namespace (e.g., "products")
    const CACHE_KEY: &'static str;

    /// Singular name for messages (e.g., "product")
    const NAME: &'static str;

    /// Backend-assigned identity; `None` before creation
    fn id(&self) -> Option<&str>;

    /// Short human-readable label
    fn title(&self) -> &str;
}

/// Deserialize an identifier that may arrive as a JSON string or number
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Optional variant of [`string_or_number`]
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "opt_string_or_number")]
        note: Option<String>,
    }

    #[test]
    fn test_string_or_number() {
        let h: Holder = serde_json::from_str(r#"{"id": 12}"#).unwrap();
        assert_eq!(h.id, "12");
        assert_eq!(h.note, None);

        let h: Holder = serde_json::from_str(r#"{"id": "a1", "note": 3}"#).unwrap();
        assert_eq!(h.id, "a1");
        assert_eq!(h.note, Some("3".to_string()));

        let h: Holder = serde_json::from_str(r#"{"id": "a1", "note": null}"#).unwrap();
        assert_eq!(h.note, None);
    }
}
