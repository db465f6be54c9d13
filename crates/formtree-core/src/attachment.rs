//! Uploaded files: a local id-to-url registry for re-display, and the
//! captioned multi-image list shape.

use crate::{
    client_id::ClientId,
    schema::{ArraySchema, FieldSchema, ObjectSchema},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// UploadedFile
///
/// The files endpoint's answer to an upload, also embedded in entity
/// responses as `*_details` objects.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UploadedFile {
    pub id: u64,
    pub file: String,
}

///
/// FileRegistry
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileRegistry {
    urls: BTreeMap<u64, String>,
}

impl FileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, url: impl Into<String>) {
        self.urls.insert(id, url.into());
    }

    pub fn register(&mut self, upload: UploadedFile) {
        self.urls.insert(upload.id, upload.file);
    }

    /// Record every `{ id, file }` object found anywhere in `value`.
    /// Returns how many were found.
    pub fn register_details(&mut self, value: &Value) -> usize {
        match value {
            Value::Object(map) => {
                let own = match (map.get("id").and_then(Value::as_u64), map.get("file")) {
                    (Some(id), Some(Value::String(url))) => {
                        self.insert(id, url.clone());
                        1
                    }
                    _ => 0,
                };
                own + map.values().map(|child| self.register_details(child)).sum::<usize>()
            }
            Value::Array(items) => items.iter().map(|item| self.register_details(item)).sum(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn url(&self, id: u64) -> Option<&str> {
        self.urls.get(&id).map(String::as_str)
    }

    pub fn remove(&mut self, id: u64) -> Option<String> {
        self.urls.remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

///
/// CaptionedImage
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptionedImage<'a> {
    pub client_id: ClientId,
    pub id: Option<u64>,
    pub caption: Option<&'a str>,
    pub url: Option<&'a str>,
}

/// Array schema for a captioned multi-image field: each row is keyed by
/// the client id in `key_field` and carries the uploaded file `id` and a
/// `caption`.
#[must_use]
pub fn captioned(key_field: &str, caption_message: impl Into<String>) -> ArraySchema {
    let member = ObjectSchema::new()
        .field(key_field, FieldSchema::new())
        .field("id", FieldSchema::new().required())
        .field("caption", FieldSchema::new().required_with(caption_message));

    ArraySchema::new(member)
}

/// Rows of a captioned image list joined with their registered urls.
#[must_use]
pub fn captioned_images<'a>(
    rows: &'a Value,
    registry: &'a FileRegistry,
    key_field: &str,
) -> Vec<CaptionedImage<'a>> {
    rows.as_array()
        .into_iter()
        .flatten()
        .filter_map(|row| {
            let client_id = ClientId::read(row, key_field)?;
            let id = row.get("id").and_then(Value::as_u64);

            Some(CaptionedImage {
                client_id,
                id,
                caption: row.get("caption").and_then(Value::as_str),
                url: id.and_then(|id| registry.url(id)),
            })
        })
        .collect()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::SchemaSource,
        test_fixtures::config,
        validate::{Validated, validate},
    };
    use serde_json::json;

    #[test]
    fn registry_collects_nested_details() {
        let mut registry = FileRegistry::new();
        let found = registry.register_details(&json!({
            "title": "Flood",
            "event_map_file_details": { "id": 3, "file": "https://files/3.png" },
            "images_file": [
                { "client_id": "a", "id": 7, "file": "https://files/7.jpg", "caption": "Bridge" }
            ]
        }));

        assert_eq!(found, 2);
        assert_eq!(registry.url(3), Some("https://files/3.png"));
        assert_eq!(registry.url(7), Some("https://files/7.jpg"));
    }

    #[test]
    fn upload_response_registers() {
        let mut registry = FileRegistry::new();
        let upload: UploadedFile =
            serde_json::from_value(json!({ "id": 9, "file": "https://files/9.pdf" }))
                .expect("upload payload");

        registry.register(upload);

        assert_eq!(registry.url(9), Some("https://files/9.pdf"));
        assert_eq!(registry.remove(9).as_deref(), Some("https://files/9.pdf"));
        assert!(registry.is_empty());
    }

    #[test]
    fn captioned_rows_require_a_caption() {
        let schema: SchemaSource = ObjectSchema::new()
            .field("images", captioned("client_id", "Add a caption"))
            .into();

        let result = validate(
            &json!({ "images": [{ "client_id": "a", "id": 7 }] }),
            &schema,
            &config(),
        )
        .expect("sound");

        let Validated::Invalid(errors) = result else {
            panic!("missing caption should fail");
        };
        assert_eq!(
            errors.to_json(),
            json!({ "images": { "a": { "caption": "Add a caption" } } })
        );
    }

    #[test]
    fn captioned_rows_keep_a_custom_key_field() {
        let mut config = config();
        config.keys.client_id = "uid".to_string();
        let schema: SchemaSource = ObjectSchema::new()
            .field("images", captioned(&config.keys.client_id, "Add a caption"))
            .into();

        let result = validate(
            &json!({ "images": [{ "uid": "a", "id": 7, "caption": "Bridge" }] }),
            &schema,
            &config,
        )
        .expect("sound");

        let Validated::Valid(value) = result else {
            panic!("captioned row should pass");
        };
        assert_eq!(
            value["images"],
            json!([{ "uid": "a", "id": 7, "caption": "Bridge" }])
        );
    }

    #[test]
    fn captioned_images_join_urls() {
        let mut registry = FileRegistry::new();
        registry.insert(7, "https://files/7.jpg");
        let rows = json!([
            { "client_id": "a", "id": 7, "caption": "Bridge" },
            { "client_id": "b", "id": 8 }
        ]);

        let images = captioned_images(&rows, &registry, "client_id");

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, Some("https://files/7.jpg"));
        assert_eq!(images[0].caption, Some("Bridge"));
        assert_eq!(images[1].url, None);
    }
}
