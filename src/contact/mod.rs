//! The `contacts` entity: stored shape, API payloads and response shaping.

pub mod validation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

use validation::{CITY_RE, NAME_RE, PHONE_RE, POSTAL_CODE_RE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneType {
    Work,
    Mobile,
    Home,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Phone {
    #[serde(rename = "type")]
    pub kind: PhoneType,
    #[validate(regex(path = *PHONE_RE, message = "Phone number must look like +1-555-555-5555"))]
    pub number: String,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 5, max = 100))]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    #[validate(length(min = 2, max = 50), regex(path = *CITY_RE, message = "City may only contain letters and spaces"))]
    pub city: String,
    #[validate(length(min = 2, max = 50))]
    pub state: String,
    #[validate(length(equal = 2, message = "Country must be a two-letter code"))]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(regex(path = *POSTAL_CODE_RE, message = "Postal code must be 12345 or 12345-6789"))]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Company {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50))]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 50))]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EmailInput {
    #[validate(email, length(max = 100))]
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email, length(max = 100))]
    pub secondary: Option<String>,
}

/// POST /api/contacts body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[validate(length(min = 2, max = 50), regex(path = *NAME_RE, message = "Only letters are allowed"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50), regex(path = *NAME_RE, message = "Only letters are allowed"))]
    pub last_name: String,
    #[validate(nested)]
    pub email: EmailInput,
    #[validate(length(min = 1, message = "At least one phone number is required"), nested)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    #[validate(nested)]
    pub address: Option<Address>,
    #[serde(default)]
    #[validate(nested)]
    pub company: Option<Company>,
    #[serde(default)]
    pub project_ids: Option<Vec<String>>,
    #[serde(default)]
    pub opportunity_ids: Option<Vec<String>>,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 tags are allowed"))]
    pub tags: Option<Vec<String>>,
}

/// PATCH /api/contacts/:id body. Absent fields are left untouched; the
/// nullable ones accept an explicit `null` to clear the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    #[serde(default)]
    #[validate(length(min = 2, max = 50), regex(path = *NAME_RE, message = "Only letters are allowed"))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 2, max = 50), regex(path = *NAME_RE, message = "Only letters are allowed"))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub email: Option<EmailInput>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one phone number is required"), nested)]
    pub phones: Option<Vec<Phone>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<Address>>,
    #[serde(default, deserialize_with = "nullable")]
    pub company: Option<Option<Company>>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_ids: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub opportunity_ids: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Option<Option<Vec<String>>>,
}

impl ContactPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phones.is_none()
            && self.address.is_none()
            && self.company.is_none()
            && self.project_ids.is_none()
            && self.opportunity_ids.is_none()
            && self.tags.is_none()
    }
}

/// Present-but-null becomes `Some(None)`; absence is handled by `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A contact as stored, owned by `created_by`
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_primary: String,
    pub email_secondary: Option<String>,
    pub phones: Vec<Phone>,
    pub address: Option<Address>,
    pub company: Option<Company>,
    pub project_ids: Option<Vec<String>>,
    pub opportunity_ids: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl Contact {
    /// Build a new contact for `owner` from a validated payload
    pub fn from_input(input: ContactInput, owner: &str) -> Self {
        let now = Utc::now();
        Self {
            id: generate_contact_id(),
            first_name: input.first_name,
            last_name: input.last_name,
            email_primary: input.email.primary,
            email_secondary: input.email.secondary,
            phones: input.phones,
            address: input.address,
            company: input.company,
            project_ids: input.project_ids,
            opportunity_ids: input.opportunity_ids,
            tags: input.tags,
            created_at: now,
            updated_at: now,
            created_by: owner.to_string(),
        }
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.created_by == owner
    }

    /// Apply a patch in memory, mirroring what the SQL update does
    pub fn apply(&mut self, patch: &ContactPatch) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(email) = &patch.email {
            self.email_primary = email.primary.clone();
            self.email_secondary = email.secondary.clone();
        }
        if let Some(v) = &patch.phones {
            self.phones = v.clone();
        }
        if let Some(v) = &patch.address {
            self.address = v.clone();
        }
        if let Some(v) = &patch.company {
            self.company = v.clone();
        }
        if let Some(v) = &patch.project_ids {
            self.project_ids = v.clone();
        }
        if let Some(v) = &patch.opportunity_ids {
            self.opportunity_ids = v.clone();
        }
        if let Some(v) = &patch.tags {
            self.tags = v.clone();
        }
        self.updated_at = Utc::now();
    }
}

/// Contact ids keep the historical `c` prefix
pub fn generate_contact_id() -> String {
    format!("c{}", Uuid::new_v4().simple())
}

/// Row shape of the `contacts` table
#[derive(Debug, sqlx::FromRow)]
pub struct ContactRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_primary: String,
    pub email_secondary: Option<String>,
    pub phones: Json<Vec<Phone>>,
    pub address: Option<Json<Address>>,
    pub company: Option<Json<Company>>,
    pub project_ids: Option<Vec<String>>,
    pub opportunity_ids: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email_primary: row.email_primary,
            email_secondary: row.email_secondary,
            phones: row.phones.0,
            address: row.address.map(|a| a.0),
            company: row.company.map(|c| c.0),
            project_ids: row.project_ids,
            opportunity_ids: row.opportunity_ids,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailView {
    pub primary: String,
    pub secondary: Option<String>,
}

/// Public wire format of a contact
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: EmailView,
    pub phones: Vec<Phone>,
    pub address: Option<Address>,
    pub company: Option<Company>,
    pub project_ids: Vec<String>,
    pub opportunity_ids: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Contact> for ContactView {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: EmailView {
                primary: c.email_primary,
                secondary: c.email_secondary,
            },
            phones: c.phones,
            address: c.address,
            company: c.company,
            project_ids: c.project_ids.unwrap_or_default(),
            opportunity_ids: c.opportunity_ids.unwrap_or_default(),
            tags: c.tags.unwrap_or_default(),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
