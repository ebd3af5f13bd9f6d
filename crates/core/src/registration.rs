//! Registration records, the cluster catalogue and form validation.

use crate::error::{CardError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A cluster and the units that belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cluster {
    pub name: &'static str,
    pub units: &'static [&'static str],
}

/// The clusters attendees can register under.
pub const CLUSTERS: &[Cluster] = &[
    Cluster {
        name: "Kunthoor",
        units: &["Kadaba", "Kunthoor", "Kalara", "Nekkare", "Kodimbala", "Korundoor"],
    },
    Cluster {
        name: "Mardala",
        units: &["Panya", "Mardala", "Sunkadakatte", "Nettana", "Kallaje"],
    },
];

/// Designations selectable on the registration form.
pub const DESIGNATION_OPTIONS: &[&str] = &[
    "Unit President",
    "Unit General Secretary",
    "Unit Treasurer",
    "Cluster President",
    "Cluster General Secretary",
    "Cluster Treasurer",
    "Sub Wing Chairman",
    "Sub Wing Convenor",
    "Zone Councilor",
];

/// Look up a cluster by name.
pub fn find_cluster(name: &str) -> Option<&'static Cluster> {
    CLUSTERS.iter().find(|c| c.name == name)
}

/// Whether `unit` is one of `cluster`'s units.
pub fn unit_belongs(cluster: &str, unit: &str) -> bool {
    find_cluster(cluster).is_some_and(|c| c.units.contains(&unit))
}

/// Split a comma-separated designation list, trimming and dropping empties.
pub fn parse_designations(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

/// A registration as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub cluster: String,
    pub unit: String,
    #[serde(default)]
    pub designations: Vec<String>,
    #[serde(rename = "photoUrl", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl Registration {
    /// Build the renderer input; `photo` is the fetched photo, if any.
    pub fn card_record(&self, photo: Option<PhotoRef>) -> CardRecord {
        CardRecord {
            name: self.name.clone(),
            cluster: self.cluster.clone(),
            unit: self.unit.clone(),
            designations: self.designations.clone(),
            photo,
        }
    }
}

/// Where a card's photo comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum PhotoRef {
    /// Raw encoded image bytes (an uploaded or fetched file).
    Bytes(Vec<u8>),
    /// A `data:` URL, as produced by a file reader.
    DataUrl(String),
    /// A remote URL; must be fetched before a capture render.
    Url(String),
}

impl PhotoRef {
    /// Classify a photo source string.
    pub fn from_source(source: &str) -> Option<Self> {
        let source = source.trim();
        if source.is_empty() {
            None
        } else if source.starts_with("data:") {
            Some(PhotoRef::DataUrl(source.to_string()))
        } else {
            Some(PhotoRef::Url(source.to_string()))
        }
    }

    /// The encoded image bytes. Remote URLs are refused.
    pub fn load_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            PhotoRef::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            PhotoRef::DataUrl(url) => {
                let (header, payload) = url
                    .split_once(',')
                    .ok_or_else(|| CardError::PhotoDecode("malformed data URL".to_string()))?;
                if !header.ends_with(";base64") {
                    return Err(CardError::PhotoDecode(
                        "data URL is not base64 encoded".to_string(),
                    ));
                }
                STANDARD
                    .decode(payload.trim())
                    .map(Cow::Owned)
                    .map_err(|e| CardError::PhotoDecode(e.to_string()))
            }
            PhotoRef::Url(url) => Err(CardError::UnresolvedPhoto(url.clone())),
        }
    }
}

impl fmt::Debug for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoRef::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            PhotoRef::DataUrl(url) => write!(f, "DataUrl({} chars)", url.len()),
            PhotoRef::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Renderer input: one card's worth of data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardRecord {
    pub name: String,
    pub cluster: String,
    pub unit: String,
    #[serde(default)]
    pub designations: Vec<String>,
    #[serde(default, alias = "photoPreview", alias = "photoUrl", deserialize_with = "photo_source")]
    pub photo: Option<PhotoRef>,
}

// The form starts with an empty preview string; treat it as "no photo".
fn photo_source<'de, D>(deserializer: D) -> std::result::Result<Option<PhotoRef>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let source: Option<String> = Option::deserialize(deserializer)?;
    Ok(source.as_deref().and_then(PhotoRef::from_source))
}

impl CardRecord {
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        unit: impl Into<String>,
        designations: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cluster: cluster.into(),
            unit: unit.into(),
            designations,
            photo: None,
        }
    }

    /// Attach a photo.
    pub fn with_photo(mut self, photo: PhotoRef) -> Self {
        self.photo = Some(photo);
        self
    }
}

/// Form and update fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Cluster,
    Unit,
    Designations,
    Photo,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Cluster => "cluster",
            Field::Unit => "unit",
            Field::Designations => "designations",
            Field::Photo => "photo",
        }
    }
}

/// Per-field validation messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn into_result<T>(self, value: T) -> std::result::Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// A photo file chosen on the form.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Wrap uploaded bytes, sniffing the content type from the image header.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = image::guess_format(&bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }
}

impl fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Unvalidated registration form contents.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub name: String,
    pub cluster: String,
    pub unit: String,
    pub designations: Vec<String>,
    pub photo: Option<PhotoUpload>,
}

impl RegistrationDraft {
    /// Check every field the way the form does and produce a submittable registration.
    pub fn validate(&self) -> std::result::Result<NewRegistration, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim();
        if name.is_empty() {
            errors.insert(Field::Name, "Name is required");
        }
        if self.cluster.is_empty() {
            errors.insert(Field::Cluster, "Cluster is required");
        } else if find_cluster(&self.cluster).is_none() {
            errors.insert(Field::Cluster, format!("Unknown cluster '{}'", self.cluster));
        }
        if self.unit.is_empty() {
            errors.insert(Field::Unit, "Unit is required");
        } else if find_cluster(&self.cluster).is_some() && !unit_belongs(&self.cluster, &self.unit)
        {
            errors.insert(
                Field::Unit,
                format!("Unit '{}' is not part of {}", self.unit, self.cluster),
            );
        }
        if self.designations.is_empty() {
            errors.insert(Field::Designations, "Select at least one designation");
        } else if let Some(unknown) = self
            .designations
            .iter()
            .find(|d| !DESIGNATION_OPTIONS.contains(&d.as_str()))
        {
            errors.insert(
                Field::Designations,
                format!("Unknown designation '{}'", unknown),
            );
        }
        let photo = match &self.photo {
            Some(photo) => Some(photo.clone()),
            None => {
                errors.insert(Field::Photo, "Photo is required");
                None
            }
        };

        match photo {
            Some(photo) if errors.is_empty() => Ok(NewRegistration {
                name: name.to_string(),
                cluster: self.cluster.clone(),
                unit: self.unit.clone(),
                designations: self.designations.clone(),
                photo,
            }),
            _ => Err(errors),
        }
    }
}

/// A validated registration ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub name: String,
    pub cluster: String,
    pub unit: String,
    pub designations: Vec<String>,
    pub photo: PhotoUpload,
}

impl NewRegistration {
    /// Designations as the backend's multipart form expects them.
    pub fn designations_csv(&self) -> String {
        self.designations.join(",")
    }

    /// The card this registration produces once confirmed.
    pub fn card_record(&self) -> CardRecord {
        CardRecord::new(
            self.name.clone(),
            self.cluster.clone(),
            self.unit.clone(),
            self.designations.clone(),
        )
        .with_photo(PhotoRef::Bytes(self.photo.bytes.clone()))
    }
}

/// An admin edit, sent as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationUpdate {
    pub name: String,
    pub cluster: String,
    pub unit: String,
    pub designations: Vec<String>,
}

impl RegistrationUpdate {
    /// Build an update from the edit dialog's text fields.
    pub fn from_form(
        name: &str,
        cluster: &str,
        unit: &str,
        designations_csv: &str,
    ) -> std::result::Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = name.trim();
        let cluster = cluster.trim();
        let unit = unit.trim();
        let designations = parse_designations(designations_csv);

        if name.is_empty() {
            errors.insert(Field::Name, "Name is required");
        }
        if cluster.is_empty() {
            errors.insert(Field::Cluster, "Cluster is required");
        } else if find_cluster(cluster).is_none() {
            errors.insert(Field::Cluster, format!("Unknown cluster '{}'", cluster));
        }
        if unit.is_empty() {
            errors.insert(Field::Unit, "Unit is required");
        } else if !unit_belongs(cluster, unit) {
            errors.insert(
                Field::Unit,
                format!("Unit '{}' is not part of {}", unit, cluster),
            );
        }
        if designations.is_empty() {
            errors.insert(Field::Designations, "Select at least one designation");
        }

        errors.into_result(Self {
            name: name.to_string(),
            cluster: cluster.to_string(),
            unit: unit.to_string(),
            designations,
        })
    }

    /// Start an edit from an existing registration.
    pub fn from_registration(registration: &Registration) -> Self {
        Self {
            name: registration.name.clone(),
            cluster: registration.cluster.clone(),
            unit: registration.unit.clone(),
            designations: registration.designations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> RegistrationDraft {
        RegistrationDraft {
            name: "  Asha ".to_string(),
            cluster: "Kunthoor".to_string(),
            unit: "Kadaba".to_string(),
            designations: vec!["Unit President".to_string()],
            photo: Some(PhotoUpload::new("asha.png", vec![1, 2, 3])),
        }
    }

    #[test]
    fn test_unit_belongs() {
        assert!(unit_belongs("Kunthoor", "Kadaba"));
        assert!(unit_belongs("Mardala", "Kallaje"));
        assert!(!unit_belongs("Mardala", "Kadaba"));
        assert!(!unit_belongs("Nowhere", "Kadaba"));
    }

    #[test]
    fn test_parse_designations() {
        assert_eq!(
            parse_designations(" Unit President, ,Zone Councilor ,"),
            vec!["Unit President".to_string(), "Zone Councilor".to_string()]
        );
        assert!(parse_designations("").is_empty());
    }

    #[test]
    fn test_valid_draft() {
        let reg = complete_draft().validate().unwrap();
        assert_eq!(reg.name, "Asha");
        assert_eq!(reg.designations_csv(), "Unit President");
        let card = reg.card_record();
        assert!(matches!(card.photo, Some(PhotoRef::Bytes(_))));
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let errors = RegistrationDraft::default().validate().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Cluster), Some("Cluster is required"));
        assert_eq!(errors.get(Field::Unit), Some("Unit is required"));
        assert_eq!(
            errors.get(Field::Designations),
            Some("Select at least one designation")
        );
        assert_eq!(errors.get(Field::Photo), Some("Photo is required"));
    }

    #[test]
    fn test_unit_outside_cluster_rejected() {
        let mut draft = complete_draft();
        draft.unit = "Panya".to_string();
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Unit).unwrap().contains("Panya"));
    }

    #[test]
    fn test_unknown_designation_rejected() {
        let mut draft = complete_draft();
        draft.designations.push("Chief Wizard".to_string());
        let errors = draft.validate().unwrap_err();
        assert!(errors
            .get(Field::Designations)
            .unwrap()
            .contains("Chief Wizard"));
    }

    #[test]
    fn test_update_from_form() {
        let update =
            RegistrationUpdate::from_form(" Ravi ", "Mardala", "Nettana", "Unit Treasurer, Zone Councilor")
                .unwrap();
        assert_eq!(update.name, "Ravi");
        assert_eq!(update.designations.len(), 2);

        let errors = RegistrationUpdate::from_form("Ravi", "Mardala", "Kadaba", "").unwrap_err();
        assert!(errors.get(Field::Unit).is_some());
        assert!(errors.get(Field::Designations).is_some());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::default();
        errors.insert(Field::Unit, "Unit is required");
        errors.insert(Field::Name, "Name is required");
        assert_eq!(
            errors.to_string(),
            "name: Name is required; unit: Unit is required"
        );
    }

    #[test]
    fn test_registration_json_shape() {
        let json = r#"{"_id":"r1","name":"Asha","cluster":"Kunthoor","unit":"Kadaba",
            "designations":["Unit President"],"photoUrl":"/uploads/asha.jpg","__v":0}"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.id, "r1");
        assert_eq!(reg.photo_url.as_deref(), Some("/uploads/asha.jpg"));

        let card = reg.card_record(None);
        assert_eq!(card.designations, vec!["Unit President".to_string()]);
        assert!(card.photo.is_none());
    }

    #[test]
    fn test_photo_ref_sources() {
        assert_eq!(PhotoRef::from_source("  "), None);
        assert!(matches!(
            PhotoRef::from_source("data:image/png;base64,AAAA"),
            Some(PhotoRef::DataUrl(_))
        ));
        assert!(matches!(
            PhotoRef::from_source("https://cdn.example.com/p.jpg"),
            Some(PhotoRef::Url(_))
        ));
    }

    #[test]
    fn test_photo_ref_load_bytes() {
        let data = PhotoRef::DataUrl("data:image/png;base64,AQID".to_string());
        assert_eq!(data.load_bytes().unwrap().as_ref(), &[1, 2, 3]);

        let remote = PhotoRef::Url("https://cdn.example.com/p.jpg".to_string());
        assert!(matches!(
            remote.load_bytes(),
            Err(CardError::UnresolvedPhoto(_))
        ));

        let plain = PhotoRef::DataUrl("data:text/plain,hello".to_string());
        assert!(matches!(plain.load_bytes(), Err(CardError::PhotoDecode(_))));
    }

    #[test]
    fn test_card_record_from_json() {
        let json = r#"{"name":"Asha","cluster":"Kunthoor","unit":"Kadaba",
            "designations":["Unit President"],"photoPreview":"data:image/png;base64,AQID"}"#;
        let record: CardRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record.photo, Some(PhotoRef::DataUrl(_))));

        let json = r#"{"name":"Asha","cluster":"Kunthoor","unit":"Kadaba","photoPreview":""}"#;
        let record: CardRecord = serde_json::from_str(json).unwrap();
        assert!(record.photo.is_none());
        assert!(record.designations.is_empty());
    }

    #[test]
    fn test_card_record_from_backend_registration() {
        let json = r#"{"_id":"r1","name":"Asha","cluster":"Kunthoor","unit":"Kadaba",
            "designations":["Unit President"],"photoUrl":"/uploads/asha.jpg"}"#;
        let record: CardRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.photo, Some(PhotoRef::Url("/uploads/asha.jpg".to_string())));
        assert!(matches!(
            record.photo.as_ref().unwrap().load_bytes(),
            Err(CardError::UnresolvedPhoto(_))
        ));
    }
}
