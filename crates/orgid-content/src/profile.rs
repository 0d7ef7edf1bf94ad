//! Strict extraction of profiles from organization documents.
//!
//! Shape of a legal entity document (unit documents carry an
//! `organizationalUnit` object instead):
//!
//! ```json
//! {
//!   "id": "did:orgid:0x...",
//!   "legalEntity": {
//!     "legalName": "Acme",
//!     "legalType": "corporation",
//!     "legalIdentifier": "US-123",
//!     "registeredAddress": { "country": "US", "locality": "Austin" },
//!     "media": { "logo": "https://..." }
//!   }
//! }
//! ```
//!
//! Required fields must be present with the right type. Optional fields may
//! be absent or `null`; when present they must have the right type. Any
//! violation rejects the whole document.

use orgid_store::{LegalEntity, OrganizationAddress, OrganizationType, OrganizationalUnit};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ProfileError;

/// A profile extracted from a document, not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Profile {
    LegalEntity(LegalEntity),
    OrganizationalUnit(OrganizationalUnit),
}

impl Profile {
    /// The DID the profile is keyed by.
    pub fn did(&self) -> &str {
        match self {
            Self::LegalEntity(p) => &p.id,
            Self::OrganizationalUnit(p) => &p.id,
        }
    }

    pub fn kind(&self) -> OrganizationType {
        match self {
            Self::LegalEntity(_) => OrganizationType::LegalEntity,
            Self::OrganizationalUnit(_) => OrganizationType::OrganizationalUnit,
        }
    }
}

/// Everything extracted from one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileDocument {
    pub profile: Profile,
    /// Registered address (legal entity) or address (unit), keyed by the DID.
    pub address: Option<OrganizationAddress>,
}

/// Validate a raw document and build the profile of the requested kind.
///
/// Pure: nothing is written anywhere, so a rejected document has no effect.
pub fn extract_profile(
    bytes: &[u8],
    kind: OrganizationType,
) -> Result<ProfileDocument, ProfileError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ProfileError::NotJson(e.to_string()))?;
    let root = match &value {
        Value::Object(map) => Fields::root(map),
        _ => return Err(ProfileError::NotAnObject),
    };

    let did = root.required_str("id")?;
    let body = root.required_object(kind.document_key())?;

    match kind {
        OrganizationType::LegalEntity => {
            let address = body
                .optional_object("registeredAddress")?
                .map(|fields| extract_address(&did, &fields))
                .transpose()?;
            let profile = LegalEntity {
                legal_name: Some(body.required_str("legalName")?),
                legal_type: Some(body.required_str("legalType")?),
                legal_identifier: body.optional_str("legalIdentifier")?,
                logo: extract_logo(&body)?,
                registered_address: address.as_ref().map(|a| a.id.clone()),
                id: did,
                organization: None,
            };
            Ok(ProfileDocument {
                profile: Profile::LegalEntity(profile),
                address,
            })
        }
        OrganizationType::OrganizationalUnit => {
            let address = body
                .optional_object("address")?
                .map(|fields| extract_address(&did, &fields))
                .transpose()?;
            let profile = OrganizationalUnit {
                name: Some(body.required_str("name")?),
                unit_type: body.optional_str_array("type")?.unwrap_or_default(),
                description: body.optional_str("description")?,
                long_description: body.optional_str("longDescription")?,
                logo: extract_logo(&body)?,
                address: address.as_ref().map(|a| a.id.clone()),
                id: did,
                organization: None,
            };
            Ok(ProfileDocument {
                profile: Profile::OrganizationalUnit(profile),
                address,
            })
        }
    }
}

fn extract_address(did: &str, fields: &Fields<'_>) -> Result<OrganizationAddress, ProfileError> {
    Ok(OrganizationAddress {
        id: did.to_string(),
        country: fields.optional_str("country")?,
        subdivision: fields.optional_str("subdivision")?,
        locality: fields.optional_str("locality")?,
        street_address: fields.optional_str("streetAddress")?,
        postal_code: fields.optional_str("postalCode")?,
    })
}

fn extract_logo(body: &Fields<'_>) -> Result<Option<String>, ProfileError> {
    match body.optional_object("media")? {
        Some(media) => media.optional_str("logo"),
        None => Ok(None),
    }
}

/// A JSON object together with its dotted path, for error reporting.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn root(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            path: String::new(),
        }
    }

    fn field_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// A present, non-null value.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key).filter(|v| !v.is_null())
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> ProfileError {
        ProfileError::WrongType {
            field: self.field_path(key),
            expected,
        }
    }

    fn required_str(&self, key: &str) -> Result<String, ProfileError> {
        self.optional_str_quiet(key)?
            .ok_or_else(|| ProfileError::MissingField(self.field_path(key)))
    }

    fn optional_str(&self, key: &str) -> Result<Option<String>, ProfileError> {
        let value = self.optional_str_quiet(key)?;
        if value.is_none() {
            warn!(field = %self.field_path(key), "optional field absent; skipped");
        }
        Ok(value)
    }

    fn optional_str_quiet(&self, key: &str) -> Result<Option<String>, ProfileError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.wrong_type(key, "a string")),
        }
    }

    fn required_object(&self, key: &str) -> Result<Fields<'a>, ProfileError> {
        match self.get(key) {
            None => Err(ProfileError::MissingField(self.field_path(key))),
            Some(Value::Object(object)) => Ok(Fields {
                object,
                path: self.field_path(key),
            }),
            Some(_) => Err(self.wrong_type(key, "an object")),
        }
    }

    fn optional_object(&self, key: &str) -> Result<Option<Fields<'a>>, ProfileError> {
        if self.get(key).is_none() {
            warn!(field = %self.field_path(key), "optional field absent; skipped");
            return Ok(None);
        }
        self.required_object(key).map(Some)
    }

    fn optional_str_array(&self, key: &str) -> Result<Option<Vec<String>>, ProfileError> {
        let items = match self.get(key) {
            None => {
                warn!(field = %self.field_path(key), "optional field absent; skipped");
                return Ok(None);
            }
            Some(Value::Array(items)) => items,
            Some(_) => return Err(self.wrong_type(key, "an array of strings")),
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(self.wrong_type(key, "an array of strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
