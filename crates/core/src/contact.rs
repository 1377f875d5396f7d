//! Contacts: the lead records everything else hangs off.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{SHOP_NAME_KEYS, UNKNOWN_CUSTOMER, UNKNOWN_SHOP};
use crate::error::CrmError;

/// Free-form attribute bag (shop name, address, city, ...).
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Pipeline status of a contact.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ContactStatus {
    /// Not yet qualified
    #[default]
    None,
    Interested,
    NotInterested,
    /// Needs another call
    FollowUp,
    Converted,
}

impl ContactStatus {
    pub const ALL: [Self; 5] =
        [Self::None, Self::Interested, Self::NotInterested, Self::FollowUp, Self::Converted];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::None => "None",
            Self::Interested => "Interested",
            Self::NotInterested => "Not Interested",
            Self::FollowUp => "Follow-up",
            Self::Converted => "Converted",
        }
    }

    /// Parse a status typed by a person or found in a spreadsheet cell.
    /// Unknown values map to [`ContactStatus::None`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::debug!(value = %raw, "unknown contact status, defaulting to None");
            Self::None
        })
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "none" | "" => Ok(Self::None),
            "interested" => Ok(Self::Interested),
            "notinterested" => Ok(Self::NotInterested),
            "followup" => Ok(Self::FollowUp),
            "converted" => Ok(Self::Converted),
            _ => Err(CrmError::invalid_value("status", s)),
        }
    }
}

impl TryFrom<String> for ContactStatus {
    type Error = CrmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContactStatus> for &'static str {
    fn from(value: ContactStatus) -> Self {
        value.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: String,
    /// Unique key
    pub phone: String,
    pub customer_name: Option<String>,
    pub status: ContactStatus,
    #[serde(default)]
    pub data: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_call_at: Option<DateTime<Utc>>,
}

/// Body of a create-contact request.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub phone: String,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub status: Option<ContactStatus>,
    #[serde(default)]
    pub data: Attributes,
}

/// Partial update; absent fields are left untouched, `data` is replaced wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    pub phone: Option<String>,
    pub customer_name: Option<String>,
    pub status: Option<ContactStatus>,
    pub data: Option<Attributes>,
}

/// Filter and paging for the contact list.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    /// Case-insensitive substring over phone, name and every attribute value.
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactCounts {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

/// Trim a phone number and reject empty ones.
pub fn normalize_phone(raw: &str) -> Result<String, CrmError> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Err(CrmError::InvalidInput("phone must not be empty".to_owned()));
    }
    Ok(phone.to_owned())
}

fn clean_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}

impl Contact {
    pub fn from_input(input: ContactInput, now: DateTime<Utc>) -> Result<Self, CrmError> {
        Ok(Self {
            id: crate::new_id(),
            phone: normalize_phone(&input.phone)?,
            customer_name: clean_name(input.customer_name),
            status: input.status.unwrap_or_default(),
            data: input.data,
            created_at: now,
            updated_at: now,
            last_call_at: None,
        })
    }

    /// Attribute as display text. Numbers are stringified, blanks ignored.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn shop_name(&self) -> Option<String> {
        SHOP_NAME_KEYS.iter().find_map(|key| self.attribute(key))
    }

    #[must_use]
    pub fn shop_label(&self) -> String {
        self.shop_name().unwrap_or_else(|| UNKNOWN_SHOP.to_owned())
    }

    #[must_use]
    pub fn customer_label(&self) -> String {
        self.customer_name.clone().unwrap_or_else(|| UNKNOWN_CUSTOMER.to_owned())
    }

    /// Best human-readable name for notifications: customer, `name` attribute, then phone.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.customer_name
            .clone()
            .or_else(|| self.attribute("name"))
            .unwrap_or_else(|| self.phone.clone())
    }

    /// Apply a patch and return the names of the fields it touched.
    pub fn apply(
        &mut self,
        patch: ContactPatch,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'static str>, CrmError> {
        let mut changed = Vec::new();
        if let Some(phone) = patch.phone {
            self.phone = normalize_phone(&phone)?;
            changed.push("phone");
        }
        if patch.customer_name.is_some() {
            self.customer_name = clean_name(patch.customer_name);
            changed.push("customer_name");
        }
        if let Some(status) = patch.status {
            self.status = status;
            changed.push("status");
        }
        if let Some(data) = patch.data {
            self.data = data;
            changed.push("data");
        }
        self.updated_at = now;
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact_with(data: serde_json::Value) -> Contact {
        let input = ContactInput {
            phone: " +15550001 ".to_owned(),
            customer_name: Some("  ".to_owned()),
            status: None,
            data: data.as_object().cloned().unwrap_or_default(),
        };
        Contact::from_input(input, Utc::now()).unwrap()
    }

    #[test]
    fn from_input_trims_phone_and_drops_blank_name() {
        let c = contact_with(json!({}));
        assert_eq!(c.phone, "+15550001");
        assert_eq!(c.customer_name, None);
        assert_eq!(c.status, ContactStatus::None);
    }

    #[test]
    fn empty_phone_is_rejected() {
        let input = ContactInput {
            phone: "   ".to_owned(),
            customer_name: None,
            status: None,
            data: Attributes::new(),
        };
        assert!(Contact::from_input(input, Utc::now()).is_err());
    }

    #[test]
    fn status_parsing_is_lenient() {
        assert_eq!("not_interested".parse::<ContactStatus>().unwrap(), ContactStatus::NotInterested);
        assert_eq!("Follow Up".parse::<ContactStatus>().unwrap(), ContactStatus::FollowUp);
        assert_eq!("FOLLOW-UP".parse::<ContactStatus>().unwrap(), ContactStatus::FollowUp);
        assert!("Maybe".parse::<ContactStatus>().is_err());
        assert_eq!(ContactStatus::parse_lenient("Maybe"), ContactStatus::None);
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&ContactStatus::NotInterested).unwrap();
        assert_eq!(json, "\"Not Interested\"");
        let back: ContactStatus = serde_json::from_str("\"interested\"").unwrap();
        assert_eq!(back, ContactStatus::Interested);
    }

    #[test]
    fn shop_name_lookup_tries_known_keys() {
        let c = contact_with(json!({"Shop Name": "Corner Store"}));
        assert_eq!(c.shop_label(), "Corner Store");
        let c = contact_with(json!({"city": "Pune"}));
        assert_eq!(c.shop_label(), UNKNOWN_SHOP);
    }

    #[test]
    fn display_name_falls_back_to_phone() {
        let c = contact_with(json!({}));
        assert_eq!(c.display_name(), "+15550001");
        let c = contact_with(json!({"name": "Asha"}));
        assert_eq!(c.display_name(), "Asha");
    }

    #[test]
    fn apply_reports_changed_fields() {
        let mut c = contact_with(json!({"city": "Pune"}));
        let patch = ContactPatch {
            status: Some(ContactStatus::Interested),
            data: Some(json!({"city": "Mumbai"}).as_object().cloned().unwrap()),
            ..ContactPatch::default()
        };
        let changed = c.apply(patch, Utc::now()).unwrap();
        assert_eq!(changed, vec!["status", "data"]);
        assert_eq!(c.attribute("city").as_deref(), Some("Mumbai"));
    }
}
