use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// Court format offered by a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourtType {
    #[serde(rename = "5A")]
    FiveASide,
    #[serde(rename = "7A")]
    SevenASide,
}

impl CourtType {
    pub fn as_str(self) -> &'static str {
        match self {
            CourtType::FiveASide => "5A",
            CourtType::SevenASide => "7A",
        }
    }
}

impl fmt::Display for CourtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourtType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5A" => Ok(CourtType::FiveASide),
            "7A" => Ok(CourtType::SevenASide),
            other => Err(format!("unknown court type: {other}")),
        }
    }
}

/// Venue form as submitted by an owner, before validation.
///
/// Every field may be missing on the wire; [`VenueInput::into_fields`] turns a
/// complete submission into [`VenueFields`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VenueInput {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub google_plus_code: String,
    #[serde(deserialize_with = "form_price")]
    #[validate(required, range(min = 1, max = 2147483647))]
    pub weekday_price: Option<i64>,
    #[serde(deserialize_with = "form_price")]
    #[validate(required, range(min = 1, max = 2147483647))]
    pub weekend_price: Option<i64>,
    #[validate(length(min = 1))]
    pub court_types: Vec<CourtType>,
    #[validate(length(min = 1))]
    pub contact: String,
    pub photo: Option<String>,
    pub description: String,
}

impl VenueInput {
    pub fn into_fields(self) -> Result<VenueFields, ValidationErrors> {
        let input = self.trimmed();
        input.validate()?;

        let mut court_types = Vec::with_capacity(input.court_types.len());
        for court_type in input.court_types {
            if !court_types.contains(&court_type) {
                court_types.push(court_type);
            }
        }

        Ok(VenueFields {
            name: input.name,
            address: input.address,
            google_plus_code: input.google_plus_code,
            weekday_price: validated_price(input.weekday_price),
            weekend_price: validated_price(input.weekend_price),
            court_types,
            contact: input.contact,
            photo: input.photo.filter(|p| !p.is_empty()),
            description: input.description,
        })
    }

    fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
            google_plus_code: self.google_plus_code.trim().to_string(),
            contact: self.contact.trim().to_string(),
            photo: self.photo.map(|p| p.trim().to_string()),
            description: self.description.trim().to_string(),
            ..self
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(i64),
    Text(String),
}

/// Reads a price as a form sends it: a number, a numeric string, or a blank
/// string or `null` for a field left empty. Unreadable text counts as empty.
fn form_price<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

// Only called after validation has bounded the price.
fn validated_price(price: Option<i64>) -> u32 {
    price.and_then(|p| u32::try_from(p).ok()).unwrap_or_default()
}

/// Validated owner-editable fields of a venue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueFields {
    pub name: String,
    pub address: String,
    pub google_plus_code: String,
    pub weekday_price: u32,
    pub weekend_price: u32,
    pub court_types: Vec<CourtType>,
    pub contact: String,
    pub photo: Option<String>,
    pub description: String,
}

/// A venue listing managed through the admin flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminVenue {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: VenueFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminVenue {
    pub fn create(fields: VenueFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields, keeping identity and creation time.
    pub fn replace_fields(&mut self, fields: VenueFields, now: DateTime<Utc>) {
        self.fields = fields;
        self.updated_at = now;
    }

    pub fn offers(&self, court_type: CourtType) -> bool {
        self.fields.court_types.contains(&court_type)
    }
}
