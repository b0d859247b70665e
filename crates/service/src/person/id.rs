//! External <-> store identifier codec.
//!
//! Callers see 24 hex characters; the store keys documents by a 12-byte ObjectId.
//! Every malformed-identifier error in the service originates here.

use bson::oid::ObjectId;

use crate::errors::ServiceError;

/// Parse an external identifier. Fails with `Validation` unless `external` is
/// exactly 24 hex digits.
pub fn decode(external: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(external)
        .map_err(|_| ServiceError::Validation(format!("cannot parse person id {:?}", external)))
}

/// Render a store identifier in its canonical lowercase hex form.
pub fn encode(id: &ObjectId) -> String {
    id.to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_is_identity() {
        for _ in 0..32 {
            let oid = ObjectId::new();
            let s = encode(&oid);
            assert_eq!(s.len(), 24);
            assert_eq!(decode(&s).unwrap(), oid);
        }
    }

    #[test]
    fn known_id_round_trips() {
        let oid = decode("605812e409be8dac8d59b5af").unwrap();
        assert_eq!(encode(&oid), "605812e409be8dac8d59b5af");
    }

    #[test]
    fn uppercase_is_accepted_and_normalized() {
        let oid = decode("605812E409BE8DAC8D59B5AF").unwrap();
        assert_eq!(encode(&oid), "605812e409be8dac8d59b5af");
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let bad = [
            "",
            "xxxx",
            "605812e409be8dac8d59b5a",   // 23 chars
            "605812e409be8dac8d59b5af0", // 25 chars
            "605812e409be8dac8d59b5ag",  // non-hex
            " 605812e409be8dac8d59b5af",
            "605812e4-09be-8dac-8d59b5af",
        ];
        for s in bad {
            match decode(s) {
                Err(ServiceError::Validation(msg)) => assert!(msg.contains("cannot parse person id")),
                other => panic!("expected validation error for {:?}, got {:?}", s, other),
            }
        }
    }
}
