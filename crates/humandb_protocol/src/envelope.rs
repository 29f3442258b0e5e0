//! Request and response envelopes.
//!
//! Both travel as a single CBOR map carrying a `kind` field, so a decoder
//! can tell them apart. Optional fields are always written, as `null` when
//! absent.

use std::fmt::Write as _;

use humandb_codec::{from_cbor, Encode, Value};
use humandb_core::HumanBeing;

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::{record_from_value, record_to_value, Fields};

/// A value that can travel over a [`Channel`](crate::Channel).
pub trait Envelope: Sized {
    /// Value of the `kind` field.
    const KIND: &'static str;

    /// Convert to the wire value.
    fn to_value(&self) -> Value;

    /// Rebuild from the fields of a decoded map whose kind already matched.
    fn from_fields(fields: &Fields<'_>) -> ProtocolResult<Self>;

    /// Rebuild from a decoded wire value, checking its kind.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TypeMismatch`] for the other envelope kind
    /// and [`ProtocolError::Decode`] for anything that is not an envelope.
    fn from_value(value: &Value) -> ProtocolResult<Self> {
        let fields = Fields::new(value, Self::KIND)?;
        let kind = fields.text("kind")?;
        if kind != Self::KIND {
            return Err(ProtocolError::TypeMismatch {
                expected: Self::KIND,
                found: kind.to_string(),
            });
        }
        Self::from_fields(&fields)
    }

    /// Encode to canonical CBOR bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Codec`] if a float field is NaN.
    fn encode(&self) -> ProtocolResult<Vec<u8>> {
        Ok(self.to_value().encode()?)
    }

    /// Decode from exactly one CBOR item.
    ///
    /// # Errors
    ///
    /// Fails on malformed, truncated or mistyped bytes.
    fn decode(bytes: &[u8]) -> ProtocolResult<Self> {
        Self::from_value(&from_cbor(bytes)?)
    }
}

/// A command invocation sent by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Command name as typed.
    pub command: String,
    /// Inline integer argument (a key, or the id for `update`).
    pub argument: Option<i32>,
    /// Key collected by the form for `insert` and `update`.
    pub key: Option<i32>,
    /// Record payload.
    pub record: Option<HumanBeing>,
}

impl Request {
    /// Create a request with no arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            argument: None,
            key: None,
            record: None,
        }
    }

    /// Sets the inline argument.
    pub fn with_argument(mut self, argument: i32) -> Self {
        self.argument = Some(argument);
        self
    }

    /// Sets the key argument.
    pub fn with_key(mut self, key: i32) -> Self {
        self.key = Some(key);
        self
    }

    /// Sets the record payload.
    pub fn with_record(mut self, record: HumanBeing) -> Self {
        self.record = Some(record);
        self
    }
}

impl Envelope for Request {
    const KIND: &'static str = "request";

    fn to_value(&self) -> Value {
        Value::text_map([
            ("kind", Value::from(Self::KIND)),
            ("command", Value::from(self.command.as_str())),
            ("argument", Value::from(self.argument)),
            ("key", Value::from(self.key)),
            ("record", self.record.as_ref().map_or(Value::Null, record_to_value)),
        ])
    }

    fn from_fields(fields: &Fields<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            command: fields.text("command")?.to_string(),
            argument: fields.optional_int32("argument")?,
            key: fields.optional_int32("key")?,
            record: fields.optional("record")?.map(record_from_value).transpose()?,
        })
    }
}

/// The server's answer to one request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Human-readable text.
    pub message: Option<String>,
    /// A single record.
    pub record: Option<HumanBeing>,
    /// Key and record pairs, in the order the server chose.
    pub collection: Option<Vec<(i32, HumanBeing)>>,
}

impl Response {
    /// Response carrying only a message.
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::default()
        }
    }

    /// Sets the record payload.
    pub fn with_record(mut self, record: HumanBeing) -> Self {
        self.record = Some(record);
        self
    }

    /// Sets the collection payload.
    pub fn with_collection(mut self, entries: Vec<(i32, HumanBeing)>) -> Self {
        self.collection = Some(entries);
        self
    }

    /// Text shown to the user: the message, then the record, then one
    /// `key : record` line per collection entry.
    pub fn render(&self) -> String {
        let mut out = self.message.clone().unwrap_or_default();
        if let Some(record) = &self.record {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "{record}");
        }
        if let Some(entries) = &self.collection {
            for (key, record) in entries {
                if !out.is_empty() {
                    out.push('\n');
                }
                let _ = write!(out, "{key} : {record}");
            }
        }
        out
    }
}

fn collection_to_value(entries: &[(i32, HumanBeing)]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|(key, record)| Value::Array(vec![Value::from(*key), record_to_value(record)]))
            .collect(),
    )
}

fn collection_from_value(value: &Value) -> ProtocolResult<Vec<(i32, HumanBeing)>> {
    let items = value
        .as_array()
        .ok_or_else(|| ProtocolError::decode("collection: expected array"))?;
    items
        .iter()
        .map(|item| match item.as_array() {
            Some([key, record]) => {
                let key = key
                    .as_integer()
                    .and_then(|k| i32::try_from(k).ok())
                    .ok_or_else(|| ProtocolError::decode("collection: bad key"))?;
                Ok((key, record_from_value(record)?))
            }
            _ => Err(ProtocolError::decode("collection: expected [key, record]")),
        })
        .collect()
}

impl Envelope for Response {
    const KIND: &'static str = "response";

    fn to_value(&self) -> Value {
        Value::text_map([
            ("kind", Value::from(Self::KIND)),
            ("message", Value::from(self.message.as_deref())),
            ("record", self.record.as_ref().map_or(Value::Null, record_to_value)),
            (
                "collection",
                self.collection
                    .as_deref()
                    .map_or(Value::Null, collection_to_value),
            ),
        ])
    }

    fn from_fields(fields: &Fields<'_>) -> ProtocolResult<Self> {
        let message = match fields.optional("message")? {
            None => None,
            Some(_) => Some(fields.text("message")?.to_string()),
        };
        Ok(Self {
            message,
            record: fields.optional("record")?.map(record_from_value).transpose()?,
            collection: fields
                .optional("collection")?
                .map(collection_from_value)
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humandb_codec::{to_canonical_cbor, CodecError};
    use humandb_core::{now, Car, Coordinates, WeaponType};

    fn record(id: i32, name: &str) -> HumanBeing {
        HumanBeing {
            id,
            name: name.to_string(),
            coordinates: Coordinates { x: 3.5, y: -1 },
            creation_date: now(),
            real_hero: false,
            has_toothpick: false,
            impact_speed: 1,
            soundtrack_name: "tune".to_string(),
            minutes_of_waiting: 0.0,
            weapon_type: WeaponType::Pistol,
            car: Car {
                name: "bike".to_string(),
                cool: false,
            },
        }
    }

    #[test]
    fn request_roundtrip_every_shape() {
        let requests = [
            Request::new("show"),
            Request::new("remove_key").with_argument(5),
            Request::new("remove_lower").with_record(record(0, "x")),
            Request::new("insert").with_key(3).with_record(record(0, "y")),
            Request::new("update")
                .with_argument(7)
                .with_key(9)
                .with_record(record(7, "z")),
        ];
        for request in requests {
            let bytes = request.encode().unwrap();
            assert_eq!(Request::decode(&bytes).unwrap(), request);
        }
    }

    #[test]
    fn response_roundtrip() {
        let responses = [
            Response::default(),
            Response::message("done"),
            Response::message("one").with_record(record(1, "a")),
            Response::message("all").with_collection(vec![(2, record(1, "a")), (1, record(2, "b"))]),
            Response::message("none").with_collection(Vec::new()),
        ];
        for response in responses {
            let bytes = response.encode().unwrap();
            assert_eq!(Response::decode(&bytes).unwrap(), response);
        }
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let bytes = Response::message("hi").encode().unwrap();
        match Request::decode(&bytes) {
            Err(ProtocolError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "request");
                assert_eq!(found, "response");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = Request::new("info").encode().unwrap();
        let err = Request::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ProtocolError::Codec(CodecError::UnexpectedEof)));
    }

    #[test]
    fn non_envelope_value_is_decode_error() {
        let bytes = to_canonical_cbor(&Value::text_map([("x", Value::Integer(1))])).unwrap();
        assert!(matches!(Request::decode(&bytes), Err(ProtocolError::Decode(_))));
        let bytes = to_canonical_cbor(&Value::Integer(1)).unwrap();
        assert!(matches!(Response::decode(&bytes), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn nan_cannot_be_sent() {
        let mut bad = record(1, "nan");
        bad.minutes_of_waiting = f64::NAN;
        let err = Request::new("insert").with_record(bad).encode().unwrap_err();
        assert!(matches!(err, ProtocolError::Codec(CodecError::NaNForbidden)));
    }

    #[test]
    fn render_lists_entries() {
        let response = Response::message("Collection:")
            .with_collection(vec![(4, record(1, "a")), (2, record(2, "b"))]);
        let text = response.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Collection:");
        assert!(lines[1].starts_with("4 : HumanBeing"));
        assert!(lines[2].starts_with("2 : HumanBeing"));
        assert_eq!(Response::default().render(), "");
    }
}
