//! Persisted person document, one per contact in the `phoneBook` collection.
//!
//! Layout on disk:
//! `{ _id: ObjectId, name, email, phones: [{ number, type: int32 }], last_updated: { seconds, nanos } }`

use bson::{oid::ObjectId, Document};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phones: Vec<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
    #[serde(rename = "type")]
    pub kind: PhoneType,
}

/// Stored as its int32 tag: 0 mobile, 1 home, 2 work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum PhoneType {
    #[default]
    Mobile,
    Home,
    Work,
}

impl From<PhoneType> for i32 {
    fn from(t: PhoneType) -> Self {
        match t {
            PhoneType::Mobile => 0,
            PhoneType::Home => 1,
            PhoneType::Work => 2,
        }
    }
}

impl TryFrom<i32> for PhoneType {
    type Error = ModelError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(PhoneType::Mobile),
            1 => Ok(PhoneType::Home),
            2 => Ok(PhoneType::Work),
            other => Err(ModelError::Validation(format!("unknown phone type tag {}", other))),
        }
    }
}

/// Seconds + nanos since the Unix epoch, ordered by `(seconds, nanos)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn now() -> Self { Utc::now().into() }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        u32::try_from(self.nanos)
            .ok()
            .and_then(|n| Utc.timestamp_opt(self.seconds, n).single())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self { seconds: dt.timestamp(), nanos: dt.timestamp_subsec_nanos() as i32 }
    }
}

impl Model {
    /// A fresh document without an id; the store assigns one on insert.
    pub fn new(name: impl Into<String>, email: impl Into<String>, phones: Vec<PhoneNumber>) -> Self {
        Self { id: None, name: name.into(), email: email.into(), phones, last_updated: None }
    }

    pub fn to_document(&self) -> Result<Document, ModelError> {
        bson::to_document(self).map_err(|e| ModelError::Decode(e.to_string()))
    }

    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        bson::from_document(doc).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

// Documents written by older clients carry `phones: null` for an empty list.
fn null_as_empty<'de, D>(d: D) -> Result<Vec<PhoneNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PhoneNumber>>::deserialize(d)?.unwrap_or_default())
}
