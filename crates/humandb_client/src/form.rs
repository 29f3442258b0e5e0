//! Field-by-field record entry.
//!
//! Each field has a parse function returning the value or a message. At the
//! console a bad value is reported and asked again; inside a script it
//! aborts the record with a [`ClientError::Script`].

use std::io::Write;
use std::path::PathBuf;

use humandb_core::{now, Car, Coordinates, HumanBeing, WeaponType};
use tokio::io::AsyncBufRead;

use crate::error::{ClientError, ClientResult};
use crate::input::InputStack;

/// Prompt printed before every field value.
pub const FIELD_PROMPT: &str = "> ";

/// Non-empty text.
pub fn parse_text(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    if value.is_empty() {
        Err("The value cannot be empty.".to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Any text, possibly empty.
pub fn parse_any_text(raw: &str) -> Result<String, String> {
    Ok(raw.trim().to_string())
}

/// Finite decimal number.
pub fn parse_float(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| "The value must be a decimal number.".to_string())
}

/// 64-bit integer.
pub fn parse_integer(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| "The value must be an integer.".to_string())
}

/// Positive 32-bit integer, as used for keys and ids.
pub fn parse_positive(raw: &str) -> Result<i32, String> {
    match raw.trim().parse::<i32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err("The value must be a positive integer.".to_string()),
    }
}

/// Exactly `true` or `false`.
pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("The value must be true or false.".to_string()),
    }
}

/// Weapon type name, any case.
pub fn parse_weapon(raw: &str) -> Result<WeaponType, String> {
    raw.parse()
        .map_err(|_| format!("Unknown weapon type. Choose one of: {}.", WeaponType::names()))
}

/// Collects records and keys from an [`InputStack`], writing prompts to an
/// output.
pub struct Form<'a, R, W> {
    input: &'a mut InputStack<R>,
    output: &'a mut W,
}

impl<'a, R, W> Form<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Borrow an input stack and an output for one form.
    pub fn new(input: &'a mut InputStack<R>, output: &'a mut W) -> Self {
        Self { input, output }
    }

    async fn ask<T>(
        &mut self,
        label: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> ClientResult<T> {
        loop {
            writeln!(self.output, "{label}")?;
            write!(self.output, "{FIELD_PROMPT}")?;
            self.output.flush()?;

            let raw = self.input.next_field().await?;
            let scripted = self.input.current_script().map(PathBuf::from);
            if scripted.is_some() {
                writeln!(self.output, "{raw}")?;
            }
            match (parse(&raw), scripted) {
                (Ok(value), _) => return Ok(value),
                (Err(reason), Some(path)) => {
                    return Err(ClientError::Script {
                        path,
                        reason: format!("{label} {reason}"),
                    })
                }
                (Err(reason), None) => writeln!(self.output, "{reason}")?,
            }
        }
    }

    /// Ask for a storage key.
    ///
    /// # Errors
    ///
    /// Fails on a bad value inside a script, or when input ends.
    pub async fn collect_key(&mut self) -> ClientResult<i32> {
        self.ask("Enter the key:", parse_positive).await
    }

    /// Ask for every field of a record.
    ///
    /// The id and creation date are placeholders; the server assigns both.
    ///
    /// # Errors
    ///
    /// Fails on a bad value inside a script, or when input ends.
    pub async fn collect_record(&mut self) -> ClientResult<HumanBeing> {
        let name = self.ask("Enter name:", parse_text).await?;
        let x = self.ask("Enter coordinate x:", parse_float).await?;
        let y = self.ask("Enter coordinate y:", parse_integer).await?;
        let has_toothpick = self.ask("Enter hasToothpick (true/false):", parse_flag).await?;
        let soundtrack_name = self.ask("Enter soundtrackName:", parse_text).await?;
        let impact_speed = self.ask("Enter impactSpeed:", parse_integer).await?;
        let minutes_of_waiting = self.ask("Enter minutesOfWaiting:", parse_float).await?;
        let weapon_label = format!("Enter weaponType, one of: {}", WeaponType::names());
        let weapon_type = self.ask(&weapon_label, parse_weapon).await?;
        let real_hero = self.ask("Enter realHero (true/false):", parse_flag).await?;
        let car_name = self.ask("Enter car name:", parse_any_text).await?;
        let cool = self.ask("Enter car cool (true/false):", parse_flag).await?;

        Ok(HumanBeing {
            id: 0,
            name,
            coordinates: Coordinates { x, y },
            creation_date: now(),
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
        })
    }
}
