//! Property-based test generators using proptest.
//!
//! Generated records are always valid for the store and encodable on the
//! wire: names are non-empty, floats are finite and dates fall between 1970
//! and 2100.

use chrono::{DateTime, NaiveDateTime};
use humandb_core::{Car, Coordinates, HumanBeing, WeaponType};
use humandb_protocol::{Request, Response};
use proptest::prelude::*;

/// Strategy for positive keys and ids.
pub fn positive_strategy() -> impl Strategy<Value = i32> {
    1..=i32::MAX
}

/// Strategy for non-empty names free of tabs and newlines.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z][A-Za-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for weapon types.
pub fn weapon_type_strategy() -> impl Strategy<Value = WeaponType> {
    prop::sample::select(WeaponType::ALL.to_vec())
}

/// Strategy for creation dates with millisecond precision.
pub fn date_strategy() -> impl Strategy<Value = NaiveDateTime> {
    // 1970-01-01 .. 2100-01-01
    (0i64..4_102_444_800, 0u32..1000).prop_map(|(secs, millis)| {
        DateTime::from_timestamp(secs, millis * 1_000_000)
            .expect("timestamp in range")
            .naive_utc()
    })
}

/// Strategy for complete records.
pub fn record_strategy() -> impl Strategy<Value = HumanBeing> {
    (
        positive_strategy(),
        name_strategy(),
        (-1.0e6f64..1.0e6, any::<i64>()),
        date_strategy(),
        any::<bool>(),
        any::<bool>(),
        any::<i64>(),
        name_strategy(),
        0.0f64..1.0e4,
        weapon_type_strategy(),
        (name_strategy(), any::<bool>()),
    )
        .prop_map(
            |(
                id,
                name,
                (x, y),
                creation_date,
                real_hero,
                has_toothpick,
                impact_speed,
                soundtrack_name,
                minutes_of_waiting,
                weapon_type,
                (car_name, cool),
            )| HumanBeing {
                id,
                name,
                coordinates: Coordinates { x, y },
                creation_date,
                real_hero,
                has_toothpick,
                impact_speed,
                soundtrack_name,
                minutes_of_waiting,
                weapon_type,
                car: Car {
                    name: car_name,
                    cool,
                },
            },
        )
}

/// Strategy for keyed records, as stored in a collection.
pub fn entry_strategy() -> impl Strategy<Value = (i32, HumanBeing)> {
    (positive_strategy(), record_strategy())
}

/// Strategy for requests of every argument shape.
pub fn request_strategy() -> impl Strategy<Value = Request> {
    let command = prop::string::string_regex("[a-z_]{1,26}").expect("Invalid regex");
    (
        command,
        prop::option::of(any::<i32>()),
        prop::option::of(any::<i32>()),
        prop::option::of(record_strategy()),
    )
        .prop_map(|(command, argument, key, record)| Request {
            command,
            argument,
            key,
            record,
        })
}

/// Strategy for responses.
pub fn response_strategy() -> impl Strategy<Value = Response> {
    (
        prop::option::of(".{0,64}"),
        prop::option::of(record_strategy()),
        prop::option::of(prop::collection::vec(entry_strategy(), 0..6)),
    )
        .prop_map(|(message, record, collection)| Response {
            message,
            record,
            collection,
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
