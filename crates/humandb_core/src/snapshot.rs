//! Tab-separated snapshot files.
//!
//! One header row, then one row per entry in insertion order:
//!
//! ```text
//! KEY ID NAME X Y CREATION_DATE REAL_HERO HAS_TOOTHPICK IMPACT_SPEED SOUNDTRACK_NAME MINUTES_OF_WAITING WEAPON_TYPE CAR_NAME CAR_COOL
//! ```
//!
//! Cells holding the literal `null` fall back to fixed defaults when read.
//! Text cells escape backslash, tab, CR and LF as `\\`, `\t`, `\r` and
//! `\n`; any other escaped character stands for itself. Text that is
//! itself `null` is written as `n\ull` so it never reads as the marker.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{now, Car, Coordinates, HumanBeing, WeaponType, DATE_FORMAT};
use crate::store::CollectionStore;

/// Column names, in file order.
pub const COLUMNS: [&str; 14] = [
    "KEY",
    "ID",
    "NAME",
    "X",
    "Y",
    "CREATION_DATE",
    "REAL_HERO",
    "HAS_TOOTHPICK",
    "IMPACT_SPEED",
    "SOUNDTRACK_NAME",
    "MINUTES_OF_WAITING",
    "WEAPON_TYPE",
    "CAR_NAME",
    "CAR_COOL",
];

const NULL: &str = "null";
const DEFAULT_NAME: &str = "standardName";
const DEFAULT_SOUNDTRACK: &str = "standardSoundtrackName";
const DEFAULT_CAR_NAME: &str = "standardCarName";

fn header() -> String {
    COLUMNS.join("\t")
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    if out == NULL {
        out.insert(1, '\\');
    }
    out
}

fn unescape_text(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Render entries as snapshot text, header included.
pub fn render_snapshot<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (i32, &'a HumanBeing)>,
{
    let mut out = header();
    out.push('\n');
    for (key, r) in entries {
        let cells = [
            key.to_string(),
            r.id.to_string(),
            escape_text(&r.name),
            r.coordinates.x.to_string(),
            r.coordinates.y.to_string(),
            r.creation_date.format(DATE_FORMAT).to_string(),
            r.real_hero.to_string(),
            r.has_toothpick.to_string(),
            r.impact_speed.to_string(),
            escape_text(&r.soundtrack_name),
            r.minutes_of_waiting.to_string(),
            r.weapon_type.to_string(),
            escape_text(&r.car.name),
            r.car.cool.to_string(),
        ];
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

/// Parse snapshot text into entries.
///
/// A first line that is not the expected header yields no entries.
///
/// # Errors
///
/// Returns [`CoreError::Snapshot`] for a row with the wrong number of cells
/// or a cell that does not parse.
pub fn parse_snapshot(text: &str) -> CoreResult<Vec<(i32, HumanBeing)>> {
    let mut lines = text.lines();
    match lines.next() {
        Some(first) if first.trim_end_matches('\r') == header() => {}
        Some(_) => {
            warn!("snapshot header does not match, starting with an empty collection");
            return Ok(Vec::new());
        }
        None => return Ok(Vec::new()),
    }

    let mut entries = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        // header is line 1
        entries.push(parse_row(idx + 2, line)?);
    }
    Ok(entries)
}

fn parse_row(line_no: usize, line: &str) -> CoreResult<(i32, HumanBeing)> {
    let cells: Vec<&str> = line.split('\t').collect();
    if cells.len() != COLUMNS.len() {
        return Err(CoreError::snapshot(
            line_no,
            format!("expected {} cells, found {}", COLUMNS.len(), cells.len()),
        ));
    }

    let parse_err = |column: &str, cell: &str| {
        CoreError::snapshot(line_no, format!("bad {column} {cell:?}"))
    };
    let text_or = |idx: usize, default: &str| -> String {
        match cells[idx] {
            NULL => default.to_string(),
            value => unescape_text(value),
        }
    };
    let flag = |idx: usize| cells[idx].eq_ignore_ascii_case("true");

    let key: i32 = parse_cell(line_no, &cells, 0)?;
    let creation_date = match cells[5] {
        NULL => now(),
        value => parse_date(value).ok_or_else(|| parse_err(COLUMNS[5], value))?,
    };
    let minutes_of_waiting = match cells[10] {
        NULL => 0.0,
        _ => parse_cell(line_no, &cells, 10)?,
    };
    let weapon_type = match cells[11] {
        NULL => WeaponType::Axe,
        value => value
            .parse()
            .map_err(|_: CoreError| parse_err(COLUMNS[11], value))?,
    };

    let record = HumanBeing {
        id: parse_cell(line_no, &cells, 1)?,
        name: text_or(2, DEFAULT_NAME),
        coordinates: Coordinates {
            x: parse_cell(line_no, &cells, 3)?,
            y: parse_cell(line_no, &cells, 4)?,
        },
        creation_date,
        real_hero: flag(6),
        has_toothpick: flag(7),
        impact_speed: parse_cell(line_no, &cells, 8)?,
        soundtrack_name: text_or(9, DEFAULT_SOUNDTRACK),
        minutes_of_waiting,
        weapon_type,
        car: Car {
            name: text_or(12, DEFAULT_CAR_NAME),
            cool: flag(13),
        },
    };
    Ok((key, record))
}

fn parse_cell<T: FromStr>(line_no: usize, cells: &[&str], idx: usize) -> CoreResult<T> {
    let cell = cells[idx];
    cell.trim()
        .parse()
        .map_err(|_| CoreError::snapshot(line_no, format!("bad {} {cell:?}", COLUMNS[idx])))
}

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    value
        .parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Read entries from a snapshot file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or a parse error.
pub fn read_snapshot(path: &Path) -> CoreResult<Vec<(i32, HumanBeing)>> {
    let text = fs::read_to_string(path)?;
    parse_snapshot(&text)
}

/// Write entries to a snapshot file, replacing it.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn write_snapshot<'a, I>(path: &Path, entries: I) -> CoreResult<()>
where
    I: IntoIterator<Item = (i32, &'a HumanBeing)>,
{
    let mut file = io::BufWriter::new(fs::File::create(path)?);
    file.write_all(render_snapshot(entries).as_bytes())?;
    file.flush()?;
    Ok(())
}

impl CollectionStore {
    /// Load a store from a snapshot file.
    ///
    /// A missing file yields an empty store. Invalid entries are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        match read_snapshot(path) {
            Ok(entries) => {
                let store = Self::from_entries(entries);
                info!(path = %path.display(), entries = store.len(), "loaded snapshot");
                Ok(store)
            }
            Err(CoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "snapshot file not found, starting empty");
                Ok(Self::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Persist the store to a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        write_snapshot(path, self.iter())?;
        info!(path = %path.display(), entries = self.len(), "saved snapshot");
        Ok(())
    }
}
