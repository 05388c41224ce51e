//! Per-asset customization parsed from host metadata.
//!
//! Metadata is untrusted: anything that is not a JSON object, or fields of
//! the wrong shape, simply mean "no customization".

use crate::constants::{METADATA_IMAGE_SIZES, METADATA_UPLOAD_PATH};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customization {
    /// Normalized key prefix (no leading or trailing `/`).
    pub upload_path: Option<String>,
    /// Requested size names. `None` means the host did not ask for a subset.
    pub image_sizes: Option<Vec<String>>,
}

impl Customization {
    /// Parse the raw metadata string attached to an upload.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(Some(&value)),
            Err(_) => {
                tracing::debug!("Upload metadata is not JSON, ignoring");
                Self::default()
            }
        }
    }

    /// Parse metadata that the host persisted as JSON.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self::from_map(map),
            // Hosts sometimes persist the raw string unchanged.
            Some(Value::String(raw)) => Self::from_raw(Some(raw)),
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let upload_path = map
            .get(METADATA_UPLOAD_PATH)
            .and_then(Value::as_str)
            .and_then(normalize_upload_path);

        // Array items split like the string form; an empty list is no subset.
        let image_sizes = match map.get(METADATA_IMAGE_SIZES) {
            Some(Value::String(list)) => Some(parse_size_list(list)),
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .flat_map(parse_size_list)
                    .collect(),
            ),
            _ => None,
        }
        .filter(|sizes: &Vec<String>| !sizes.is_empty());

        Self {
            upload_path,
            image_sizes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upload_path.is_none() && self.image_sizes.is_none()
    }

    /// Metadata to persist with the asset so deletion sees the same customization.
    pub fn to_metadata(&self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let mut map = Map::new();
        if let Some(ref path) = self.upload_path {
            map.insert(METADATA_UPLOAD_PATH.to_string(), Value::String(path.clone()));
        }
        if let Some(ref sizes) = self.image_sizes {
            map.insert(
                METADATA_IMAGE_SIZES.to_string(),
                Value::String(sizes.join(",")),
            );
        }
        Some(Value::Object(map))
    }
}

fn parse_size_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_upload_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        tracing::warn!(upload_path = %raw, "Ignoring unsafe custom upload path");
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_upload_path_and_sizes() {
        let custom =
            Customization::from_raw(Some(r#"{"upload_path":"u1","imageSizes":"thumb, large"}"#));
        assert_eq!(custom.upload_path.as_deref(), Some("u1"));
        assert_eq!(
            custom.image_sizes,
            Some(vec!["thumb".to_string(), "large".to_string()])
        );
    }

    #[test]
    fn malformed_metadata_means_no_customization() {
        assert!(Customization::from_raw(Some("not json")).is_empty());
        assert!(Customization::from_raw(Some("42")).is_empty());
        assert!(Customization::from_raw(Some(r#"["u1"]"#)).is_empty());
        assert!(Customization::from_raw(None).is_empty());
        assert!(Customization::from_value(Some(&json!(null))).is_empty());
    }

    #[test]
    fn wrong_field_shapes_are_ignored() {
        let custom = Customization::from_value(Some(&json!({
            "upload_path": 7,
            "imageSizes": {"thumb": true}
        })));
        assert!(custom.is_empty());
    }

    #[test]
    fn empty_size_list_is_absent() {
        let shapes = [
            json!(""),
            json!("  "),
            json!(","),
            json!(" , ,"),
            json!([]),
            json!([""]),
            json!([" ", ","]),
        ];
        for sizes in shapes {
            let custom = Customization::from_value(Some(&json!({"imageSizes": sizes.clone()})));
            assert_eq!(custom.image_sizes, None, "{sizes} should mean no subset");
            assert_eq!(custom.to_metadata(), None);
        }
    }

    #[test]
    fn array_items_split_like_the_string_form() {
        let array = Customization::from_value(Some(&json!({"imageSizes": ["sm,2x", " md "]})));
        assert_eq!(
            array.image_sizes,
            Some(vec!["sm".to_string(), "2x".to_string(), "md".to_string()])
        );

        let stored = array.to_metadata().unwrap();
        assert_eq!(stored, json!({"imageSizes": "sm,2x,md"}));
        assert_eq!(Customization::from_value(Some(&stored)), array);
    }

    #[test]
    fn upload_path_is_normalized() {
        let custom = Customization::from_value(Some(&json!({"upload_path": "/a/b/"})));
        assert_eq!(custom.upload_path.as_deref(), Some("a/b"));

        let custom = Customization::from_value(Some(&json!({"upload_path": "a/../b"})));
        assert_eq!(custom.upload_path, None);

        let custom = Customization::from_value(Some(&json!({"upload_path": "a//b"})));
        assert_eq!(custom.upload_path, None);

        let custom = Customization::from_value(Some(&json!({"upload_path": "/"})));
        assert_eq!(custom.upload_path, None);
    }

    #[test]
    fn metadata_round_trips() {
        let custom =
            Customization::from_raw(Some(r#"{"upload_path":"u1/","imageSizes":"thumb,large"}"#));
        let stored = custom.to_metadata().unwrap();
        assert_eq!(stored, json!({"upload_path": "u1", "imageSizes": "thumb,large"}));
        assert_eq!(Customization::from_value(Some(&stored)), custom);

        assert_eq!(Customization::default().to_metadata(), None);
    }

    #[test]
    fn persisted_string_metadata_is_accepted() {
        let stored = json!(r#"{"upload_path":"u2"}"#);
        let custom = Customization::from_value(Some(&stored));
        assert_eq!(custom.upload_path.as_deref(), Some("u2"));
    }
}
