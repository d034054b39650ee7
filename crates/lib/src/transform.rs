//! Maps a [`FacultyRecord`] into Drupal's node-creation payload shape.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::SyncError;
use crate::source::FacultyRecord;

/// Text format applied to the profile body.
pub const BODY_TEXT_FORMAT: &str = "basic_html";

#[derive(Debug, Clone, Serialize)]
pub struct TargetId {
    pub target_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlagValue {
    pub value: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormattedText {
    pub value: String,
    pub format: String,
}

/// One node-creation request body, in Drupal's content-entity JSON shape.
///
/// Built fresh per record and never mutated after construction. Custom
/// fields live in a flattened map so only the populated ones appear on the
/// wire.
#[derive(Debug, Clone, Serialize)]
pub struct NodePayload {
    #[serde(rename = "type")]
    pub node_type: Vec<TargetId>,
    pub title: Vec<TextValue>,
    pub status: Vec<FlagValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<FormattedText>>,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, Vec<TextValue>>,
}

impl NodePayload {
    /// Minimal payload: content type, title and publish flag only.
    pub fn new(content_type: &str, title: &str, published: bool) -> Self {
        Self {
            node_type: vec![TargetId {
                target_id: content_type.to_string(),
            }],
            title: vec![TextValue {
                value: title.to_string(),
            }],
            status: vec![FlagValue { value: published }],
            body: None,
            fields: BTreeMap::new(),
        }
    }
}

/// Builds the published node payload for one record.
///
/// Records without a non-empty `name` are rejected with
/// [`SyncError::Validation`]. Optional fields are mapped only when present
/// and non-empty; an empty string means "absent", not "empty field".
pub fn build_node_payload(
    record: &FacultyRecord,
    content_type: &str,
) -> Result<NodePayload, SyncError> {
    let name = non_empty(&record.name)
        .ok_or_else(|| SyncError::Validation("record has no name".to_string()))?;

    let mut payload = NodePayload::new(content_type, name, true);

    if let Some(bio) = non_empty(&record.bio) {
        payload.body = Some(vec![FormattedText {
            value: bio.to_string(),
            format: BODY_TEXT_FORMAT.to_string(),
        }]);
    }

    for (field, value) in [
        ("field_email", &record.email),
        ("field_phone", &record.phone),
        ("field_department", &record.department),
        ("field_job_title", &record.title),
        ("field_office_location", &record.office),
    ] {
        if let Some(value) = non_empty(value) {
            payload.fields.insert(
                field,
                vec![TextValue {
                    value: value.to_string(),
                }],
            );
        }
    }

    Ok(payload)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
