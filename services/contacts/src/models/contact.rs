//! Contact model and request payload parsing
//!
//! Payloads arrive as loose JSON objects. Text fields accept strings and are
//! also fed scalar numbers or booleans by some clients, which are stored in
//! their string form. The owner never appears here: it comes from the
//! authenticated session and stays inside the store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Contact as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub favorite: bool,
}

/// Fields of a contact about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: bool,
}

/// Partial replacement of contact fields
///
/// `None` leaves a field untouched. For the optional text fields,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub favorite: Option<bool>,
}

/// Rejected request payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Name can not be empty")]
    EmptyName,

    #[error("Data to update can not be empty")]
    EmptyUpdate,

    #[error("Invalid value for field '{0}'")]
    InvalidField(&'static str),
}

impl NewContact {
    /// Build a new contact from a create request body
    pub fn from_json(body: &Value) -> Result<Self, PayloadError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let name = match fields.get("name") {
            Some(value) if !is_falsy(value) => {
                text_value(value, "name")?.ok_or(PayloadError::EmptyName)?
            }
            _ => return Err(PayloadError::EmptyName),
        };

        Ok(Self {
            name,
            email: optional_text(fields, "email")?,
            address: optional_text(fields, "address")?,
            phone: optional_text(fields, "phone")?,
            favorite: favorite_flag(fields.get("favorite")),
        })
    }
}

impl ContactPatch {
    /// Build a patch from an update request body
    ///
    /// Unknown keys are ignored, which includes `id` and `ownerId`: neither
    /// can be changed after creation.
    pub fn from_json(body: &Value) -> Result<Self, PayloadError> {
        let fields = match body.as_object() {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Err(PayloadError::EmptyUpdate),
        };

        let name = match fields.get("name") {
            None => None,
            Some(value) if is_falsy(value) => return Err(PayloadError::EmptyName),
            Some(value) => Some(text_value(value, "name")?.ok_or(PayloadError::EmptyName)?),
        };

        let favorite = match fields.get("favorite") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Some(true),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Some(false),
            Some(_) => return Err(PayloadError::InvalidField("favorite")),
        };

        Ok(Self {
            name,
            email: patch_text(fields, "email")?,
            address: patch_text(fields, "address")?,
            phone: patch_text(fields, "phone")?,
            favorite,
        })
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
    }

    /// Apply the patch to a contact in place
    pub fn apply(&self, contact: &mut Contact) {
        if let Some(name) = &self.name {
            contact.name = name.clone();
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(address) = &self.address {
            contact.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            contact.phone = phone.clone();
        }
        if let Some(favorite) = self.favorite {
            contact.favorite = favorite;
        }
    }
}

/// Favorite flag of a create request: the lowercased string form must be "true"
fn favorite_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.to_lowercase() == "true",
        _ => false,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn text_value(value: &Value, field: &'static str) -> Result<Option<String>, PayloadError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(PayloadError::InvalidField(field)),
    }
}

fn optional_text(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, PayloadError> {
    match fields.get(field) {
        Some(value) => text_value(value, field),
        None => Ok(None),
    }
}

fn patch_text(
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Option<String>>, PayloadError> {
    fields
        .get(field)
        .map(|value| text_value(value, field))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_contact_requires_name() {
        for body in [
            json!({}),
            json!({ "name": "" }),
            json!({ "name": null }),
            json!({ "name": false }),
            json!({ "name": 0 }),
            json!({ "email": "a@x.com" }),
            json!("Ann"),
            Value::Null,
        ] {
            assert_eq!(
                NewContact::from_json(&body),
                Err(PayloadError::EmptyName),
                "{body}"
            );
        }
    }

    #[test]
    fn test_new_contact_favorite_is_case_insensitive_true() {
        for input in [json!("true"), json!("TRUE"), json!("True"), json!(true)] {
            let contact = NewContact::from_json(&json!({ "name": "Ann", "favorite": input }))
                .expect("valid payload");
            assert!(contact.favorite, "{input}");
        }

        for input in [
            json!("1"),
            json!(1),
            json!("false"),
            json!(false),
            json!("yes"),
            json!(null),
            json!(" true"),
        ] {
            let contact = NewContact::from_json(&json!({ "name": "Ann", "favorite": input }))
                .expect("valid payload");
            assert!(!contact.favorite, "{input}");
        }

        let contact = NewContact::from_json(&json!({ "name": "Ann" })).expect("valid payload");
        assert!(!contact.favorite);
    }

    #[test]
    fn test_new_contact_coerces_scalars_and_ignores_owner() {
        let contact = NewContact::from_json(&json!({
            "name": "Ann",
            "phone": 5551234,
            "address": null,
            "ownerId": "00000000-0000-0000-0000-000000000001",
        }))
        .expect("valid payload");

        assert_eq!(
            contact,
            NewContact {
                name: "Ann".to_string(),
                email: None,
                address: None,
                phone: Some("5551234".to_string()),
                favorite: false,
            }
        );
    }

    #[test]
    fn test_new_contact_rejects_structured_text() {
        let err = NewContact::from_json(&json!({ "name": "Ann", "email": ["a@x.com"] }));
        assert_eq!(err, Err(PayloadError::InvalidField("email")));
    }

    #[test]
    fn test_patch_rejects_empty_body() {
        for body in [json!({}), Value::Null, json!([]), json!("phone")] {
            assert_eq!(
                ContactPatch::from_json(&body),
                Err(PayloadError::EmptyUpdate),
                "{body}"
            );
        }
    }

    #[test]
    fn test_patch_reads_known_fields() {
        let patch = ContactPatch::from_json(&json!({
            "phone": "555",
            "email": null,
            "favorite": "TRUE",
            "ownerId": "00000000-0000-0000-0000-000000000002",
            "id": "00000000-0000-0000-0000-000000000003",
        }))
        .expect("valid patch");

        assert_eq!(
            patch,
            ContactPatch {
                name: None,
                email: Some(None),
                address: None,
                phone: Some(Some("555".to_string())),
                favorite: Some(true),
            }
        );
    }

    #[test]
    fn test_patch_with_only_unknown_keys_is_empty() {
        let patch = ContactPatch::from_json(&json!({ "ownerId": "x" })).expect("valid patch");
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_validates_name_and_favorite() {
        assert_eq!(
            ContactPatch::from_json(&json!({ "name": "" })),
            Err(PayloadError::EmptyName)
        );
        assert_eq!(
            ContactPatch::from_json(&json!({ "favorite": "maybe" })),
            Err(PayloadError::InvalidField("favorite"))
        );
    }

    #[test]
    fn test_patch_apply_replaces_only_given_fields() {
        let mut contact = Contact {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            email: Some("a@x.com".to_string()),
            address: Some("1 Main St".to_string()),
            phone: None,
            favorite: false,
        };
        let before = contact.clone();

        let patch = ContactPatch {
            phone: Some(Some("555".to_string())),
            address: Some(None),
            ..Default::default()
        };
        patch.apply(&mut contact);

        assert_eq!(contact.id, before.id);
        assert_eq!(contact.name, "Ann");
        assert_eq!(contact.email, before.email);
        assert_eq!(contact.address, None);
        assert_eq!(contact.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_contact_json_omits_unset_fields() {
        let contact = Contact {
            id: Uuid::nil(),
            name: "Ann".to_string(),
            email: Some("a@x.com".to_string()),
            address: None,
            phone: None,
            favorite: false,
        };

        let json = serde_json::to_value(&contact).expect("serializable");
        assert_eq!(
            json,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "name": "Ann",
                "email": "a@x.com",
                "favorite": false,
            })
        );
    }
}
