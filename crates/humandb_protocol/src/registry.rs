//! The command registry.
//!
//! A fixed table of every command the server understands, shared by both
//! sides: the client reads argument shapes from it to build requests, the
//! server resolves request names to a [`CommandKind`] to dispatch on.

use std::fmt;

use indexmap::IndexMap;

/// Arguments a command takes, and where they come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// No arguments.
    None,
    /// One inline integer key.
    Key,
    /// A record collected by the form.
    Record,
    /// A key and a record, both collected by the form.
    RecordKey,
    /// An inline id, then a key and a record collected by the form.
    IdKeyRecord,
    /// One inline script path.
    ScriptPath,
}

impl ArgShape {
    /// Number of arguments typed on the command line itself.
    pub fn inline_args(self) -> usize {
        match self {
            ArgShape::None | ArgShape::Record | ArgShape::RecordKey => 0,
            ArgShape::Key | ArgShape::IdKeyRecord | ArgShape::ScriptPath => 1,
        }
    }

    /// Returns true if the request carries a record payload.
    pub fn carries_record(self) -> bool {
        matches!(
            self,
            ArgShape::Record | ArgShape::RecordKey | ArgShape::IdKeyRecord
        )
    }
}

/// Every command, one variant each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CommandKind {
    Help,
    Info,
    Show,
    Insert,
    Update,
    RemoveKey,
    Clear,
    ExecuteScript,
    Exit,
    RemoveLower,
    RemoveGreaterKey,
    RemoveLowerKey,
    PrintAscending,
    PrintDescending,
    PrintFieldDescendingCar,
}

impl CommandKind {
    /// Every kind, in the order `help` lists them.
    pub const ALL: [CommandKind; 15] = [
        CommandKind::Help,
        CommandKind::Info,
        CommandKind::Show,
        CommandKind::Insert,
        CommandKind::Update,
        CommandKind::RemoveKey,
        CommandKind::Clear,
        CommandKind::ExecuteScript,
        CommandKind::Exit,
        CommandKind::RemoveLower,
        CommandKind::RemoveGreaterKey,
        CommandKind::RemoveLowerKey,
        CommandKind::PrintAscending,
        CommandKind::PrintDescending,
        CommandKind::PrintFieldDescendingCar,
    ];

    /// Descriptor for this kind.
    pub fn descriptor(self) -> CommandDescriptor {
        let (name, shape, description) = match self {
            CommandKind::Help => ("help", ArgShape::None, "show help for the available commands"),
            CommandKind::Info => (
                "info",
                ArgShape::None,
                "print collection type, initialization date and size",
            ),
            CommandKind::Show => ("show", ArgShape::None, "print every element of the collection"),
            CommandKind::Insert => (
                "insert",
                ArgShape::RecordKey,
                "add a new element under the given key",
            ),
            CommandKind::Update => (
                "update",
                ArgShape::IdKeyRecord,
                "update the element whose id equals the given one",
            ),
            CommandKind::RemoveKey => (
                "remove_key",
                ArgShape::Key,
                "remove the element stored under the given key",
            ),
            CommandKind::Clear => ("clear", ArgShape::None, "remove every element"),
            CommandKind::ExecuteScript => (
                "execute_script",
                ArgShape::ScriptPath,
                "read and execute commands from the given file",
            ),
            CommandKind::Exit => ("exit", ArgShape::None, "disconnect and quit"),
            CommandKind::RemoveLower => (
                "remove_lower",
                ArgShape::Record,
                "remove every element lower than the given one",
            ),
            CommandKind::RemoveGreaterKey => (
                "remove_greater_key",
                ArgShape::Key,
                "remove every element whose key is greater than the given one",
            ),
            CommandKind::RemoveLowerKey => (
                "remove_lower_key",
                ArgShape::Key,
                "remove every element whose key is lower than the given one",
            ),
            CommandKind::PrintAscending => (
                "print_ascending",
                ArgShape::None,
                "print the elements in ascending order",
            ),
            CommandKind::PrintDescending => (
                "print_descending",
                ArgShape::None,
                "print the elements in descending order",
            ),
            CommandKind::PrintFieldDescendingCar => (
                "print_field_descending_car",
                ArgShape::None,
                "print the car field of every element in descending order",
            ),
        };
        CommandDescriptor {
            name,
            description,
            shape,
            kind: self,
        }
    }
}

/// Static metadata describing one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Lowercase command name.
    pub name: &'static str,
    /// One-line description shown by `help`.
    pub description: &'static str,
    /// Declared argument shape.
    pub shape: ArgShape,
    /// What the server runs.
    pub kind: CommandKind,
}

impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.description)
    }
}

/// Name to descriptor table, read-only once built.
///
/// `Send + Sync` with no interior mutability, so one instance can be shared
/// by every connection task behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: IndexMap<String, CommandDescriptor>,
}

impl CommandRegistry {
    /// Registry holding every [`CommandKind`].
    pub fn standard() -> Self {
        let mut commands = IndexMap::with_capacity(CommandKind::ALL.len());
        for kind in CommandKind::ALL {
            let descriptor = kind.descriptor();
            commands.insert(descriptor.name.to_lowercase(), descriptor);
        }
        Self { commands }
    }

    /// Find a command by name, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(name.trim().to_lowercase().as_str())
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
