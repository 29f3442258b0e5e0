//! # humandb codec
//!
//! Canonical CBOR encoding/decoding for humandb envelopes.
//!
//! Every request and response travels as one self-describing CBOR item.
//! No length prefix is used: a reader decodes from the front of its buffer
//! with [`from_cbor_prefix`] and learns how many bytes the item occupied.
//!
//! ## Canonical CBOR Rules
//!
//! - Maps are sorted by key (length-first, then bytewise on encoded keys)
//! - Integers use shortest encoding
//! - Floats are always 64-bit doubles; NaN is rejected
//! - Strings must be UTF-8
//! - No indefinite-length items
//!
//! ## Usage
//!
//! ```
//! use humandb_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let value = Value::text_map([("x", Value::Float(1.5)), ("y", Value::Integer(-3))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//!
//! let decoded = from_cbor(&bytes).unwrap();
//! assert_eq!(value, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
mod value;

pub use decoder::{from_cbor, from_cbor_prefix, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use value::Value;

/// Trait for types that can be encoded to canonical CBOR.
pub trait Encode {
    /// Encode this value to canonical CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from CBOR.
pub trait Decode: Sized {
    /// Decode this value from CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl Encode for Value {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_canonical_cbor(self)
    }
}

impl Decode for Value {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(value: &Value) -> Value {
        Value::decode(&value.encode().unwrap()).unwrap()
    }

    #[test]
    fn roundtrip_nested() {
        let value = Value::text_map([
            (
                "collection",
                Value::Array(vec![
                    Value::text_map([
                        ("name", Value::from("Alice")),
                        ("x", Value::Float(-0.5)),
                        ("car", Value::Null),
                    ]),
                    Value::text_map([
                        ("name", Value::from("Bob")),
                        ("x", Value::Float(1e300)),
                        ("car", Value::text_map([("cool", Value::Bool(true))])),
                    ]),
                ]),
            ),
            ("count", Value::Integer(2)),
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn every_strict_prefix_is_incomplete() {
        let value = Value::text_map([
            ("message", Value::from("ok")),
            ("record", Value::Float(3.25)),
        ]);
        let bytes = value.encode().unwrap();
        for cut in 0..bytes.len() {
            let err = from_cbor_prefix(&bytes[..cut]).unwrap_err();
            assert!(err.is_incomplete(), "cut at {cut}: {err:?}");
        }
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            any::<f64>()
                .prop_filter("NaN is not encodable", |f| !f.is_nan())
                .prop_map(Value::Float),
            ".{0,16}".prop_map(Value::Text),
        ];
        leaf.prop_recursive(3, 24, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..6).prop_map(|pairs| {
                    let mut pairs: Vec<(String, Value)> = pairs;
                    pairs.sort_by(|a, b| a.0.cmp(&b.0));
                    pairs.dedup_by(|a, b| a.0 == b.0);
                    Value::map(pairs.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_roundtrip(value in arb_value()) {
            prop_assert_eq!(roundtrip(&value), value);
        }
    }
}
