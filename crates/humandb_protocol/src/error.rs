//! Error types for the protocol layer.

use humandb_codec::CodecError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding, decoding or moving envelopes.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The bytes are not valid canonical CBOR, or a value could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The CBOR is well formed but does not describe an envelope.
    #[error("malformed envelope: {0}")]
    Decode(String),

    /// The envelope is of the other kind (request vs response).
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Kind the receiver asked for.
        expected: &'static str,
        /// Kind found on the wire.
        found: String,
    },

    /// Stream-level failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream.
    #[error("connection closed by peer")]
    Closed,
}

impl ProtocolError {
    /// Create a malformed envelope error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Returns true if the failure concerns one envelope only.
    ///
    /// The stream is still usable after such an error; the next receive
    /// starts on fresh bytes.
    pub fn is_envelope_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::Codec(_) | ProtocolError::Decode(_) | ProtocolError::TypeMismatch { .. }
        )
    }

    /// Returns true if the stream is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ProtocolError::Io(_) | ProtocolError::Closed)
    }
}
