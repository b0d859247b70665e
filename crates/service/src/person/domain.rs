use bson::oid::ObjectId;

pub use models::person::{PhoneNumber, PhoneType, Timestamp};

/// Persisted person as stored and returned by every operation.
pub type PersonRecord = models::person::Model;

/// Caller-supplied person. `id` is the external identifier; it is ignored on
/// create and required on update. There is no timestamp: the server sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonInput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phones: Vec<PhoneNumber>,
}

impl PersonInput {
    pub(crate) fn into_record(self, id: Option<ObjectId>, last_updated: Timestamp) -> PersonRecord {
        PersonRecord {
            id,
            name: self.name,
            email: self.email,
            phones: self.phones,
            last_updated: Some(last_updated),
        }
    }
}
