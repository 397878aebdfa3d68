use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A single note as persisted and as written into backup archives.
///
/// Field names follow the camelCase JSON shape so backups produced by older
/// clients (`lastEdited`, ...) load without translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Hand-edited backups may lack this; such notes sort as oldest.
    #[serde(default = "unix_epoch")]
    pub last_edited: DateTime<Utc>,
    /// Embedded images as `data:` URIs, in the order they were added.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Older clients wrote `null` for optional fields they never set.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The caller-supplied part of a note, used by `create`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub images: Vec<String>,
    pub color: Option<String>,
    pub tags: Vec<String>,
    pub pinned: Option<bool>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// No title, no content and no images once whitespace is ignored.
    ///
    /// The store accepts blank notes; callers decide whether to save them.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty() && self.images.is_empty()
    }
}

impl Note {
    pub fn new(new: NewNote, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            title: new.title,
            content: new.content,
            last_edited: now,
            images: new.images,
            pinned: new.pinned.unwrap_or(false),
            color: new.color,
            tags: dedup_tags(new.tags),
        }
    }

    /// Adds a trimmed tag unless it is empty or already present.
    /// Returns whether the tag list changed.
    pub fn add_tag(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.tags.iter().any(|t| t == label) {
            return false;
        }
        self.tags.push(label.to_string());
        true
    }

    pub fn remove_tag(&mut self, label: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != label);
        self.tags.len() != before
    }

    pub fn has_tag(&self, label: &str) -> bool {
        self.tags.iter().any(|t| t == label)
    }

    pub fn add_image(&mut self, data_uri: String) {
        self.images.push(data_uri);
    }

    /// Removes the image at `index`, or does nothing when out of range.
    pub fn remove_image(&mut self, index: usize) -> Option<String> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }

    pub fn set_color(&mut self, color: Option<String>) {
        self.color = color;
    }
}

/// Unique note id (UUID v4), stable for the note's lifetime.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keeps the first occurrence of every tag, in order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Encodes raw image bytes as a `data:` URI suitable for `Note::images`.
pub fn image_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Note {
        Note::new(NewNote::new("Title", "Body"), Utc::now())
    }

    #[test]
    fn test_new_note_defaults() {
        let note = sample();
        assert!(!note.id.is_empty());
        assert!(!note.pinned);
        assert!(note.images.is_empty());
        assert!(note.tags.is_empty());
        assert_eq!(note.color, None);
    }

    #[test]
    fn test_new_note_respects_pinned() {
        let note = Note::new(NewNote::new("a", "b").pinned(true), Utc::now());
        assert!(note.pinned);
    }

    #[test]
    fn test_new_note_dedups_tags() {
        let tags = vec!["work".to_string(), "home".to_string(), "work".to_string()];
        let note = Note::new(NewNote::new("a", "b").with_tags(tags), Utc::now());
        assert_eq!(note.tags, vec!["work", "home"]);
    }

    #[test]
    fn test_ids_are_unique_in_a_tight_loop() {
        let now = Utc::now();
        let mut ids: Vec<String> = (0..500)
            .map(|_| Note::new(NewNote::default(), now).id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_add_tag_trims_and_suppresses_duplicates() {
        let mut note = sample();
        assert!(note.add_tag("  ideas "));
        assert!(!note.add_tag("ideas"));
        assert!(!note.add_tag("   "));
        assert!(note.add_tag("later"));
        assert_eq!(note.tags, vec!["ideas", "later"]);
    }

    #[test]
    fn test_remove_tag() {
        let mut note = sample();
        note.add_tag("a");
        note.add_tag("b");
        assert!(note.remove_tag("a"));
        assert!(!note.remove_tag("missing"));
        assert_eq!(note.tags, vec!["b"]);
    }

    #[test]
    fn test_images_append_and_remove_by_position() {
        let mut note = sample();
        note.add_image("data:image/png;base64,AAA".into());
        note.add_image("data:image/png;base64,BBB".into());
        note.add_image("data:image/png;base64,CCC".into());

        assert_eq!(
            note.remove_image(1),
            Some("data:image/png;base64,BBB".to_string())
        );
        assert_eq!(note.remove_image(7), None);
        assert_eq!(
            note.images,
            vec!["data:image/png;base64,AAA", "data:image/png;base64,CCC"]
        );
    }

    #[test]
    fn test_is_blank() {
        let new = NewNote::new(" ", "\n");
        assert!(new.is_blank());
        assert!(!NewNote::new(" ", "x").is_blank());
        assert!(!new.with_images(vec!["data:image/png;base64,AAA".into()]).is_blank());
    }

    #[test]
    fn test_set_color() {
        let mut note = sample();
        note.set_color(Some("#ffcc00".into()));
        assert_eq!(note.color.as_deref(), Some("#ffcc00"));
    }

    #[test]
    fn test_image_data_uri() {
        assert_eq!(image_data_uri("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_json_shape_uses_camel_case_and_omits_empty() {
        let note = sample();
        let value = serde_json::to_value(&note).unwrap();
        assert!(value.get("lastEdited").is_some());
        assert!(value.get("images").is_none());
        assert!(value.get("color").is_none());
        assert_eq!(value["pinned"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_deserialize_minimal_foreign_note() {
        let raw = r#"{"id":"2024-05-01T10:00:00.000Z","title":"Old","content":"c","lastEdited":"2024-05-01T10:00:00.000Z"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.id, "2024-05-01T10:00:00.000Z");
        assert!(!note.pinned);
        assert!(note.tags.is_empty());
    }
}
