//! Command execution.
//!
//! One function per [`CommandKind`], each a plain
//! `(Request, &mut CollectionStore) -> Response` step. Validation failures
//! become message responses; nothing here touches the network.

use humandb_core::{CollectionStore, CoreError, HumanBeing};
use humandb_protocol::{CommandKind, CommandRegistry, Request, Response};
use tracing::debug;

/// Text sent for commands that need at least one element.
pub const EMPTY_COLLECTION: &str = "Collection is empty.";

type Outcome = Result<Response, String>;

/// Run `kind` against the store.
///
/// The caller holds the store lock for the whole call and has already
/// stamped a fresh id on any record payload.
pub fn execute(
    kind: CommandKind,
    request: Request,
    store: &mut CollectionStore,
    registry: &CommandRegistry,
) -> Response {
    let outcome = match kind {
        CommandKind::Help => Ok(help(registry)),
        CommandKind::Info => Ok(Response::message(store.info().to_string())),
        CommandKind::Show | CommandKind::PrintAscending => {
            listing(store, CollectionStore::sorted_ascending)
        }
        CommandKind::PrintDescending => listing(store, CollectionStore::sorted_descending),
        CommandKind::PrintFieldDescendingCar => {
            listing(store, CollectionStore::sorted_by_car_name_descending)
        }
        CommandKind::Insert => insert(request, store),
        CommandKind::Update => update(request, store),
        CommandKind::RemoveKey => remove_key(&request, store),
        CommandKind::Clear => clear(store),
        CommandKind::RemoveLower => remove_lower(&request, store),
        CommandKind::RemoveGreaterKey => remove_by_key(&request, store, Bound::Greater),
        CommandKind::RemoveLowerKey => remove_by_key(&request, store, Bound::Lower),
        CommandKind::ExecuteScript => Ok(Response::message("Executing script.")),
        CommandKind::Exit => Ok(Response::message("Disconnecting client.")),
    };
    outcome.unwrap_or_else(|message| {
        debug!(command = kind.descriptor().name, %message, "command rejected");
        Response::message(message)
    })
}

fn positive(value: Option<i32>, what: &str) -> Result<i32, String> {
    match value {
        Some(v) if v > 0 => Ok(v),
        Some(v) => Err(format!("The {what} must be a positive integer, got {v}.")),
        None => Err(format!("The {what} is missing.")),
    }
}

fn record(request: Request) -> Result<HumanBeing, String> {
    let record = request
        .record
        .ok_or_else(|| "The record is missing.".to_string())?;
    if record.name.trim().is_empty() {
        return Err("The name must not be empty.".to_string());
    }
    if record.soundtrack_name.trim().is_empty() {
        return Err("The soundtrack name must not be empty.".to_string());
    }
    Ok(record)
}

fn non_empty(store: &CollectionStore) -> Result<(), String> {
    if store.is_empty() {
        Err(EMPTY_COLLECTION.to_string())
    } else {
        Ok(())
    }
}

fn help(registry: &CommandRegistry) -> Response {
    let lines: Vec<String> = registry.iter().map(ToString::to_string).collect();
    Response::message(lines.join("\n"))
}

fn listing(
    store: &CollectionStore,
    order: fn(&CollectionStore) -> Vec<(i32, HumanBeing)>,
) -> Outcome {
    non_empty(store)?;
    Ok(Response::default().with_collection(order(store)))
}

fn insert(request: Request, store: &mut CollectionStore) -> Outcome {
    let key = positive(request.key, "key")?;
    let record = record(request)?;
    if store.contains_key(key) {
        return Err("An element with this key already exists. Insert rejected.".to_string());
    }
    let id = record.id;
    store.add(key, record).map_err(|e| e.to_string())?;
    Ok(Response::message(format!(
        "Record added to the collection with id {id}."
    )))
}

fn update(request: Request, store: &mut CollectionStore) -> Outcome {
    let id = positive(request.argument, "id")?;
    let key = positive(request.key, "key")?;
    let mut record = record(request)?;
    if !store.contains_id(id) {
        return Err(format!("No record with id {id} exists."));
    }
    record.id = id;
    match store.update(key, record) {
        Ok(()) => Ok(Response::message(format!("Record {id} updated."))),
        Err(CoreError::KeyInUse { key }) => Err(format!(
            "Key {key} belongs to another record. Record not updated."
        )),
        Err(err) => Err(err.to_string()),
    }
}

fn remove_key(request: &Request, store: &mut CollectionStore) -> Outcome {
    let key = positive(request.argument, "key")?;
    match store.remove(key) {
        Some(_) => Ok(Response::message(format!("Element with key {key} removed."))),
        None => Err(format!("No element with key {key} in the collection.")),
    }
}

fn clear(store: &mut CollectionStore) -> Outcome {
    non_empty(store)?;
    store.clear();
    Ok(Response::message("Collection cleared."))
}

fn remove_lower(request: &Request, store: &mut CollectionStore) -> Outcome {
    let threshold = request
        .record
        .as_ref()
        .ok_or_else(|| "The record is missing.".to_string())?;
    non_empty(store)?;
    let removed = store.remove_lower(threshold);
    Ok(Response::message(format!(
        "Removed {removed} element(s) lower than the given one."
    )))
}

#[derive(Clone, Copy)]
enum Bound {
    Greater,
    Lower,
}

fn remove_by_key(request: &Request, store: &mut CollectionStore, bound: Bound) -> Outcome {
    let key = positive(request.argument, "key")?;
    non_empty(store)?;
    let (removed, relation) = match bound {
        Bound::Greater => (store.remove_greater_key(key), "greater"),
        Bound::Lower => (store.remove_lower_key(key), "lower"),
    };
    Ok(Response::message(format!(
        "Removed {removed} element(s) with a key {relation} than {key}."
    )))
}
