//! Wire <-> domain projection. The id travels as its 24-char hex form and
//! `last_updated` is only ever written by the server.

use service::person::{id, PersonInput, PersonRecord, PhoneNumber, PhoneType, Timestamp};
use tonic::Status;

use crate::proto;
use crate::proto::person::PhoneType as WirePhoneType;

/// Build service input from a wire person. A client-sent `last_updated` is dropped.
pub fn person_input(person: proto::Person) -> Result<PersonInput, Status> {
    let phones = person
        .phones
        .into_iter()
        .map(phone_from_proto)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PersonInput { id: person.id, name: person.name, email: person.email, phones })
}

pub fn person_to_proto(record: &PersonRecord) -> proto::Person {
    proto::Person {
        id: record.id.as_ref().map(id::encode).unwrap_or_default(),
        name: record.name.clone(),
        email: record.email.clone(),
        phones: record.phones.iter().map(phone_to_proto).collect(),
        last_updated: record.last_updated.map(timestamp_to_proto),
    }
}

fn phone_from_proto(phone: proto::person::PhoneNumber) -> Result<PhoneNumber, Status> {
    let wire = WirePhoneType::try_from(phone.r#type)
        .map_err(|_| Status::invalid_argument(format!("unknown phone type {}", phone.r#type)))?;
    let kind = match wire {
        WirePhoneType::Mobile => PhoneType::Mobile,
        WirePhoneType::Home => PhoneType::Home,
        WirePhoneType::Work => PhoneType::Work,
    };
    Ok(PhoneNumber { number: phone.number, kind })
}

fn phone_to_proto(phone: &PhoneNumber) -> proto::person::PhoneNumber {
    let wire = match phone.kind {
        PhoneType::Mobile => WirePhoneType::Mobile,
        PhoneType::Home => WirePhoneType::Home,
        PhoneType::Work => WirePhoneType::Work,
    };
    proto::person::PhoneNumber { number: phone.number.clone(), r#type: wire as i32 }
}

fn timestamp_to_proto(ts: Timestamp) -> prost_types::Timestamp {
    prost_types::Timestamp { seconds: ts.seconds, nanos: ts.nanos }
}
