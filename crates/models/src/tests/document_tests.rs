use bson::{doc, oid::ObjectId, Bson};

use crate::errors::ModelError;
use crate::person::{Model, PhoneNumber, PhoneType, Timestamp};

fn sample() -> Model {
    Model {
        id: Some(ObjectId::parse_str("605812e409be8dac8d59b5af").unwrap()),
        name: "Guga Zimmermann".into(),
        email: "guga@example.com".into(),
        phones: vec![
            PhoneNumber { number: "+55 47 98870-4247".into(), kind: PhoneType::Mobile },
            PhoneNumber { number: "+55 47 3333-0000".into(), kind: PhoneType::Home },
        ],
        last_updated: Some(Timestamp { seconds: 1_616_400_000, nanos: 42 }),
    }
}

#[test]
fn document_uses_on_disk_field_names() {
    let doc = sample().to_document().unwrap();
    let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["_id", "name", "email", "phones", "last_updated"]);

    assert!(matches!(doc.get("_id"), Some(Bson::ObjectId(_))));
    let phones = doc.get_array("phones").unwrap();
    let first = phones[0].as_document().unwrap();
    assert_eq!(first.get_str("number").unwrap(), "+55 47 98870-4247");
    assert_eq!(first.get_i32("type").unwrap(), 0);
    let second = phones[1].as_document().unwrap();
    assert_eq!(second.get_i32("type").unwrap(), 1);

    let ts = doc.get_document("last_updated").unwrap();
    assert_eq!(ts.get_i64("seconds").unwrap(), 1_616_400_000);
    assert_eq!(ts.get_i32("nanos").unwrap(), 42);
}

#[test]
fn new_model_omits_id_so_store_assigns_it() {
    let doc = Model::new("A", "a@example.com", vec![]).to_document().unwrap();
    assert!(!doc.contains_key("_id"));
    assert!(!doc.contains_key("last_updated"));
}

#[test]
fn document_round_trips_with_phone_order() {
    let model = sample();
    let back = Model::from_document(model.to_document().unwrap()).unwrap();
    assert_eq!(back, model);
}

#[test]
fn null_phones_decode_as_empty() {
    let doc = doc! {
        "_id": ObjectId::new(),
        "name": "Legacy",
        "email": "legacy@example.com",
        "phones": Bson::Null,
    };
    let model = Model::from_document(doc).unwrap();
    assert!(model.phones.is_empty());
    assert!(model.last_updated.is_none());
}

#[test]
fn unknown_phone_tag_fails_decode() {
    let doc = doc! {
        "_id": ObjectId::new(),
        "name": "Bad",
        "email": "bad@example.com",
        "phones": [ { "number": "1", "type": 7 } ],
    };
    let err = Model::from_document(doc).unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)));
}

#[test]
fn missing_name_fails_decode() {
    let doc = doc! { "_id": ObjectId::new(), "email": "x@example.com" };
    assert!(Model::from_document(doc).is_err());
}

#[test]
fn timestamp_orders_by_seconds_then_nanos() {
    let a = Timestamp { seconds: 10, nanos: 999 };
    let b = Timestamp { seconds: 11, nanos: 0 };
    let c = Timestamp { seconds: 11, nanos: 1 };
    assert!(a < b && b < c);
}

#[test]
fn timestamp_converts_to_and_from_chrono() {
    let now = Timestamp::now();
    let dt = now.to_datetime().unwrap();
    assert_eq!(Timestamp::from(dt), now);
    assert!(Timestamp { seconds: 0, nanos: -1 }.to_datetime().is_none());
}

#[test]
fn phone_type_tags() {
    assert_eq!(i32::from(PhoneType::Work), 2);
    assert_eq!(PhoneType::try_from(1).unwrap(), PhoneType::Home);
    assert!(PhoneType::try_from(-1).is_err());
}
