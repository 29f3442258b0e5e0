//! Shared server state.

use humandb_core::CollectionStore;
use humandb_protocol::{CommandKind, CommandRegistry, Request, Response};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::commands::execute;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// What a connection does after a request was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Send this response and wait for the next request.
    Reply(Response),
    /// Close the connection without replying.
    Disconnect,
}

/// State shared by every connection task.
///
/// The store sits behind one lock that is held for the whole of a command,
/// so id generation and the insert that uses the id are atomic.
pub struct ServerContext {
    config: ServerConfig,
    registry: CommandRegistry,
    store: Mutex<CollectionStore>,
}

impl ServerContext {
    /// Creates a context around an existing store.
    pub fn new(config: ServerConfig, store: CollectionStore) -> Self {
        Self {
            config,
            registry: CommandRegistry::standard(),
            store: Mutex::new(store),
        }
    }

    /// Creates a context, loading the store from the configured snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read.
    pub fn load(config: ServerConfig) -> ServerResult<Self> {
        let store = match &config.storage_path {
            Some(path) => CollectionStore::load(path)?,
            None => {
                info!("no storage file configured, starting with an empty collection");
                CollectionStore::new()
            }
        };
        Ok(Self::new(config, store))
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run `f` with the store locked.
    pub fn with_store<R>(&self, f: impl FnOnce(&CollectionStore) -> R) -> R {
        f(&*self.store.lock())
    }

    /// Resolve and run one request.
    pub fn dispatch(&self, mut request: Request) -> Dispatch {
        let Some(descriptor) = self.registry.lookup(&request.command) else {
            debug!(command = %request.command, "unknown command");
            return Dispatch::Reply(Response::message(format!(
                "Unknown command {:?}. Type \"help\" for the list of commands.",
                request.command
            )));
        };
        if descriptor.kind == CommandKind::Exit {
            return Dispatch::Disconnect;
        }

        let mut store = self.store.lock();
        if descriptor.shape.carries_record() {
            if let Some(record) = request.record.as_mut() {
                record.id = store.generate_id();
            }
        }
        debug!(
            command = descriptor.name,
            argument = ?request.argument,
            key = ?request.key,
            "executing command"
        );
        Dispatch::Reply(execute(descriptor.kind, request, &mut store, &self.registry))
    }

    /// Write the store to the configured snapshot file.
    ///
    /// Returns the number of saved entries.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NoStoragePath`] if no file is configured, or
    /// the write error.
    pub fn save(&self) -> ServerResult<usize> {
        let path = self
            .config
            .storage_path
            .as_ref()
            .ok_or(ServerError::NoStoragePath)?;
        let snapshot = self.store.lock().clone();
        snapshot.save(path)?;
        Ok(snapshot.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humandb_testkit::{sample_entries, sample_record, TempSnapshot};

    fn reply(dispatch: Dispatch) -> Response {
        match dispatch {
            Dispatch::Reply(response) => response,
            Dispatch::Disconnect => panic!("unexpected disconnect"),
        }
    }

    #[test]
    fn unknown_command_gets_a_reply() {
        let ctx = ServerContext::new(ServerConfig::default(), CollectionStore::new());
        let response = reply(ctx.dispatch(Request::new("fly")));
        assert!(response.message.unwrap().starts_with("Unknown command \"fly\""));
    }

    #[test]
    fn exit_disconnects() {
        let ctx = ServerContext::new(ServerConfig::default(), CollectionStore::new());
        assert_eq!(ctx.dispatch(Request::new("EXIT")), Dispatch::Disconnect);
    }

    #[test]
    fn server_assigns_ids() {
        let ctx = ServerContext::new(ServerConfig::default(), CollectionStore::new());
        for key in 1..=3 {
            let request = Request::new("insert")
                .with_key(key)
                .with_record(sample_record(500, "client chose this"));
            reply(ctx.dispatch(request));
        }
        let ids: Vec<i32> = ctx.with_store(|s| s.iter().map(|(_, r)| r.id).collect());
        assert_eq!(ids, vec![1, 2, 3]);

        reply(ctx.dispatch(Request::new("remove_key").with_argument(1)));
        let request = Request::new("insert")
            .with_key(8)
            .with_record(sample_record(500, "reuses the gap"));
        let response = reply(ctx.dispatch(request));
        assert_eq!(
            response.message.as_deref(),
            Some("Record added to the collection with id 1.")
        );
    }

    #[test]
    fn save_requires_storage_path() {
        let ctx = ServerContext::new(ServerConfig::default(), CollectionStore::new());
        assert!(matches!(ctx.save(), Err(ServerError::NoStoragePath)));
    }

    #[test]
    fn load_and_save_roundtrip() {
        let snapshot = TempSnapshot::with_entries(&sample_entries(4));
        let config = ServerConfig::default().with_storage_path(snapshot.path());
        let ctx = ServerContext::load(config.clone()).unwrap();
        assert_eq!(ctx.with_store(CollectionStore::len), 4);

        reply(ctx.dispatch(Request::new("remove_key").with_argument(20)));
        assert_eq!(ctx.save().unwrap(), 3);
        let reloaded = ServerContext::load(config).unwrap();
        assert_eq!(reloaded.with_store(CollectionStore::len), 3);
    }

    #[test]
    fn separators_in_text_survive_save_and_reload() {
        let snapshot = TempSnapshot::empty();
        let config = ServerConfig::default().with_storage_path(snapshot.path());
        let ctx = ServerContext::load(config.clone()).unwrap();

        let mut record = sample_record(1, "Ann\tLee");
        record.soundtrack_name = "two\nlines".to_string();
        record.car.name = String::new();
        reply(ctx.dispatch(Request::new("insert").with_key(1).with_record(record)));
        assert_eq!(ctx.save().unwrap(), 1);

        let reloaded = ServerContext::load(config).unwrap();
        let stored = reloaded.with_store(|s| s.by_key(1).cloned()).unwrap();
        assert_eq!(stored.name, "Ann\tLee");
        assert_eq!(stored.soundtrack_name, "two\nlines");
        assert_eq!(stored.car.name, "");
    }

    #[test]
    fn missing_snapshot_starts_empty() {
        let snapshot = TempSnapshot::empty();
        let config = ServerConfig::default().with_storage_path(snapshot.path());
        let ctx = ServerContext::load(config).unwrap();
        assert_eq!(ctx.with_store(CollectionStore::len), 0);
    }
}
