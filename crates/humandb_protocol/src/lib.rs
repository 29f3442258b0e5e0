//! # humandb protocol
//!
//! Everything the client and the server must agree on:
//!
//! - [`Request`] and [`Response`], the two envelope kinds, encoded as
//!   canonical CBOR maps
//! - [`CommandRegistry`], the table of command names, descriptions and
//!   argument shapes
//! - [`Channel`], which moves envelopes over any async byte stream
//!
//! ```
//! use humandb_protocol::{Envelope, Request};
//!
//! let request = Request::new("remove_key").with_argument(3);
//! let bytes = request.encode().unwrap();
//! assert_eq!(Request::decode(&bytes).unwrap(), request);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod channel;
mod envelope;
mod error;
mod record;
mod registry;

pub use channel::{Channel, DEFAULT_READ_CHUNK, MAX_ENVELOPE_SIZE};
pub use envelope::{Envelope, Request, Response};
pub use error::{ProtocolError, ProtocolResult};
pub use record::{record_from_value, record_to_value, Fields};
pub use registry::{ArgShape, CommandDescriptor, CommandKind, CommandRegistry};

/// Port the server listens on when none is configured.
pub const DEFAULT_PORT: u16 = 52052;
