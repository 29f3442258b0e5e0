//! Mapping between records and CBOR values.

use chrono::NaiveDateTime;
use humandb_codec::Value;
use humandb_core::{Car, Coordinates, HumanBeing, WeaponType, DATE_FORMAT};

use crate::error::{ProtocolError, ProtocolResult};

/// Typed read access to the fields of a decoded map.
///
/// Every accessor reports a missing or mistyped field as
/// [`ProtocolError::Decode`].
pub struct Fields<'a> {
    map: &'a Value,
    what: &'static str,
}

impl<'a> Fields<'a> {
    /// Wrap `value`, which must be a map. `what` names it in errors.
    pub fn new(value: &'a Value, what: &'static str) -> ProtocolResult<Self> {
        if value.as_map().is_none() {
            return Err(ProtocolError::decode(format!(
                "{what}: expected map, found {}",
                value.kind()
            )));
        }
        Ok(Self { map: value, what })
    }

    fn missing(&self, name: &str) -> ProtocolError {
        ProtocolError::decode(format!("{}: missing or invalid field {name:?}", self.what))
    }

    /// Field value; `Null` counts as present.
    pub fn get(&self, name: &str) -> ProtocolResult<&'a Value> {
        self.map.get(name).ok_or_else(|| self.missing(name))
    }

    /// Field value with `Null` mapped to `None`.
    pub fn optional(&self, name: &str) -> ProtocolResult<Option<&'a Value>> {
        let value = self.get(name)?;
        Ok((!value.is_null()).then_some(value))
    }

    /// Text field.
    pub fn text(&self, name: &str) -> ProtocolResult<&'a str> {
        self.get(name)?.as_text().ok_or_else(|| self.missing(name))
    }

    /// Integer field.
    pub fn int(&self, name: &str) -> ProtocolResult<i64> {
        self.get(name)?.as_integer().ok_or_else(|| self.missing(name))
    }

    /// Integer field that must fit in an `i32`.
    pub fn int32(&self, name: &str) -> ProtocolResult<i32> {
        i32::try_from(self.int(name)?).map_err(|_| self.missing(name))
    }

    /// Nullable `i32` field.
    pub fn optional_int32(&self, name: &str) -> ProtocolResult<Option<i32>> {
        match self.optional(name)? {
            None => Ok(None),
            Some(_) => self.int32(name).map(Some),
        }
    }

    fn float(&self, name: &str) -> ProtocolResult<f64> {
        self.get(name)?.as_float().ok_or_else(|| self.missing(name))
    }

    fn flag(&self, name: &str) -> ProtocolResult<bool> {
        self.get(name)?.as_bool().ok_or_else(|| self.missing(name))
    }
}

/// Convert a record to its wire value.
pub fn record_to_value(record: &HumanBeing) -> Value {
    Value::text_map([
        ("id", Value::from(record.id)),
        ("name", Value::from(record.name.as_str())),
        (
            "coordinates",
            Value::text_map([
                ("x", Value::Float(record.coordinates.x)),
                ("y", Value::Integer(record.coordinates.y)),
            ]),
        ),
        (
            "creation_date",
            Value::Text(record.creation_date.format(DATE_FORMAT).to_string()),
        ),
        ("real_hero", Value::Bool(record.real_hero)),
        ("has_toothpick", Value::Bool(record.has_toothpick)),
        ("impact_speed", Value::Integer(record.impact_speed)),
        ("soundtrack_name", Value::from(record.soundtrack_name.as_str())),
        ("minutes_of_waiting", Value::Float(record.minutes_of_waiting)),
        ("weapon_type", Value::from(record.weapon_type.as_str())),
        (
            "car",
            Value::text_map([
                ("name", Value::from(record.car.name.as_str())),
                ("cool", Value::Bool(record.car.cool)),
            ]),
        ),
    ])
}

/// Rebuild a record from its wire value.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if a field is missing or has the wrong
/// type.
pub fn record_from_value(value: &Value) -> ProtocolResult<HumanBeing> {
    let fields = Fields::new(value, "record")?;
    let coordinates = Fields::new(fields.get("coordinates")?, "coordinates")?;
    let car = Fields::new(fields.get("car")?, "car")?;

    let date = fields.text("creation_date")?;
    let creation_date = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| ProtocolError::decode(format!("record: bad creation_date {date:?}: {e}")))?;
    let weapon_type: WeaponType = fields
        .text("weapon_type")?
        .parse()
        .map_err(|e: humandb_core::CoreError| ProtocolError::decode(e.to_string()))?;

    Ok(HumanBeing {
        id: fields.int32("id")?,
        name: fields.text("name")?.to_string(),
        coordinates: Coordinates {
            x: coordinates.float("x")?,
            y: coordinates.int("y")?,
        },
        creation_date,
        real_hero: fields.flag("real_hero")?,
        has_toothpick: fields.flag("has_toothpick")?,
        impact_speed: fields.int("impact_speed")?,
        soundtrack_name: fields.text("soundtrack_name")?.to_string(),
        minutes_of_waiting: fields.float("minutes_of_waiting")?,
        weapon_type,
        car: Car {
            name: car.text("name")?.to_string(),
            cool: car.flag("cool")?,
        },
    })
}
