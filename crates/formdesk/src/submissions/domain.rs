use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One personal-information form as submitted, camelCase on the wire.
///
/// Every field deserializes with a default so the validator can report missing
/// required fields per field instead of failing at the serde layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionForm {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub surname: String,
    pub gender: String,
    pub date_of_birth: String,
    pub academic_qualifications: Option<String>,
    pub professional_qualifications: Option<String>,
    pub skills_set: Option<String>,
    pub primary_school: Option<String>,
    pub secondary_school: Option<String>,
    pub college: Option<String>,
    pub social_group_membership: Option<String>,
    pub relationship_status: String,
    pub state_of_origin: String,
    pub local_government: String,
    pub residential_address: Option<String>,
    pub employment_status: String,
    pub phone_number: String,
    pub email: String,
    pub social_media_pages: Option<String>,
}

impl SubmissionForm {
    /// "First Middle Surname" with the middle name elided when absent.
    pub fn full_name(&self) -> String {
        match self.middle_name.as_deref().filter(|name| !name.is_empty()) {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.surname),
            None => format!("{} {}", self.first_name, self.surname),
        }
    }
}

/// A persisted submission. Never mutated or deleted once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub form: SubmissionForm,
    pub submitted_at: DateTime<Utc>,
}
