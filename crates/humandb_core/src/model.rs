//! The record model.
//!
//! A [`HumanBeing`] is the single entity kind the collection holds. Its `id`
//! and `creation_date` are owned by the server: whatever a client puts there
//! is overwritten when the record enters the store.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::CoreError;

/// Timestamp format used for creation dates on disk and on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Current local time, the clock every creation date is taken from.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// A point on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: i64,
}

/// The vehicle a record drives.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    /// Car name.
    pub name: String,
    /// Whether the car is cool.
    pub cool: bool,
}

/// Closed set of weapon kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponType {
    /// An axe.
    Axe,
    /// A pistol.
    Pistol,
    /// A shotgun.
    Shotgun,
    /// A knife.
    Knife,
    /// A machine gun.
    MachineGun,
}

impl WeaponType {
    /// Every variant, in declaration order.
    pub const ALL: [WeaponType; 5] = [
        WeaponType::Axe,
        WeaponType::Pistol,
        WeaponType::Shotgun,
        WeaponType::Knife,
        WeaponType::MachineGun,
    ];

    /// Upper-case name as written on disk and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            WeaponType::Axe => "AXE",
            WeaponType::Pistol => "PISTOL",
            WeaponType::Shotgun => "SHOTGUN",
            WeaponType::Knife => "KNIFE",
            WeaponType::MachineGun => "MACHINE_GUN",
        }
    }

    /// Comma-separated list of every variant name, for prompts.
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeaponType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownWeaponType(s.to_string()))
    }
}

/// A record stored in the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct HumanBeing {
    /// Server-assigned identity, unique across the store.
    pub id: i32,
    /// Non-empty name; also the natural ordering key.
    pub name: String,
    /// Position.
    pub coordinates: Coordinates,
    /// Server-assigned at insert and update time.
    pub creation_date: NaiveDateTime,
    /// Real hero flag.
    pub real_hero: bool,
    /// Toothpick flag.
    pub has_toothpick: bool,
    /// Impact speed.
    pub impact_speed: i64,
    /// Non-empty soundtrack name.
    pub soundtrack_name: String,
    /// Minutes spent waiting.
    pub minutes_of_waiting: f64,
    /// Weapon kind.
    pub weapon_type: WeaponType,
    /// Vehicle.
    pub car: Car,
}

impl HumanBeing {
    /// Natural ordering: by name, case-insensitively.
    ///
    /// Used by `remove_lower`, the ascending/descending projections and
    /// `show`.
    pub fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name.to_lowercase().cmp(&other.name.to_lowercase())
    }

    /// Returns true if this record sorts strictly before `other`.
    pub fn is_lower_than(&self, other: &Self) -> bool {
        self.cmp_by_name(other) == Ordering::Less
    }
}

impl fmt::Display for HumanBeing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HumanBeing {{ id: {}, name: {:?}, coordinates: ({}, {}), creation_date: {}, \
             real_hero: {}, has_toothpick: {}, impact_speed: {}, soundtrack_name: {:?}, \
             minutes_of_waiting: {}, weapon_type: {}, car: {{ name: {:?}, cool: {} }} }}",
            self.id,
            self.name,
            self.coordinates.x,
            self.coordinates.y,
            self.creation_date.format(DATE_FORMAT),
            self.real_hero,
            self.has_toothpick,
            self.impact_speed,
            self.soundtrack_name,
            self.minutes_of_waiting,
            self.weapon_type,
            self.car.name,
            self.car.cool,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> HumanBeing {
        HumanBeing {
            id: 1,
            name: name.to_string(),
            coordinates: Coordinates { x: 0.5, y: -2 },
            creation_date: now(),
            real_hero: false,
            has_toothpick: true,
            impact_speed: 3,
            soundtrack_name: "theme".to_string(),
            minutes_of_waiting: 1.25,
            weapon_type: WeaponType::Knife,
            car: Car {
                name: "lada".to_string(),
                cool: true,
            },
        }
    }

    #[test]
    fn ordering_ignores_case() {
        assert_eq!(named("alice").cmp_by_name(&named("ALICE")), Ordering::Equal);
        assert!(named("Alice").is_lower_than(&named("bob")));
        assert!(!named("bob").is_lower_than(&named("Alice")));
        assert!(!named("Bob").is_lower_than(&named("bob")));
    }

    #[test]
    fn weapon_type_parse() {
        assert_eq!("AXE".parse::<WeaponType>().unwrap(), WeaponType::Axe);
        assert_eq!(
            " machine_gun ".parse::<WeaponType>().unwrap(),
            WeaponType::MachineGun
        );
        assert!(matches!(
            "spoon".parse::<WeaponType>(),
            Err(CoreError::UnknownWeaponType(_))
        ));
    }

    #[test]
    fn weapon_type_names() {
        assert_eq!(
            WeaponType::names(),
            "AXE, PISTOL, SHOTGUN, KNIFE, MACHINE_GUN"
        );
        for w in WeaponType::ALL {
            assert_eq!(w.to_string().parse::<WeaponType>().unwrap(), w);
        }
    }

    #[test]
    fn display_mentions_every_field() {
        let text = named("Neo").to_string();
        for needle in ["id: 1", "\"Neo\"", "(0.5, -2)", "KNIFE", "\"lada\"", "\"theme\""] {
            assert!(text.contains(needle), "{needle} missing from {text}");
        }
    }
}
