use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Treats `""` as absent. Browsers send empty strings for unset selects.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Query-string filters: `?category=` means "no filter".
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filter {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        category: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        class_id: Option<Uuid>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let f: Filter = serde_json::from_str(r#"{"category":"  ","class_id":""}"#).unwrap();
        assert!(f.category.is_none());
        assert!(f.class_id.is_none());
    }

    #[test]
    fn test_values_are_kept() {
        let id = Uuid::new_v4();
        let f: Filter =
            serde_json::from_str(&format!(r#"{{"category":"lost","class_id":"{}"}}"#, id)).unwrap();
        assert_eq!(f.category.as_deref(), Some("lost"));
        assert_eq!(f.class_id, Some(id));
    }

    #[test]
    fn test_missing_fields_default() {
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert!(f.category.is_none());
        assert!(f.class_id.is_none());
    }
}
