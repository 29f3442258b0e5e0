//! Envelope transport over a byte stream.
//!
//! Envelopes are written back to back with no framing. The receiver keeps
//! a growable buffer, tries to decode one CBOR item from its front, and
//! reads more bytes only when the codec reports the item is incomplete.

use bytes::{Buf, BytesMut};
use humandb_codec::from_cbor_prefix;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::envelope::Envelope;
use crate::error::{ProtocolError, ProtocolResult};

/// Default number of bytes requested per read.
pub const DEFAULT_READ_CHUNK: usize = 8 * 1024;

/// Upper bound on bytes buffered for a single envelope.
pub const MAX_ENVELOPE_SIZE: usize = 32 * 1024 * 1024;

/// A bidirectional envelope stream.
#[derive(Debug)]
pub struct Channel<S> {
    stream: S,
    buffer: BytesMut,
    read_chunk: usize,
}

impl<S> Channel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a connected stream.
    pub fn new(stream: S) -> Self {
        Self::with_read_chunk(stream, DEFAULT_READ_CHUNK)
    }

    /// Wrap a stream, reading up to `read_chunk` bytes at a time.
    pub fn with_read_chunk(stream: S, read_chunk: usize) -> Self {
        let read_chunk = read_chunk.max(1);
        Self {
            stream,
            buffer: BytesMut::with_capacity(read_chunk),
            read_chunk,
        }
    }

    /// Encode and write one envelope, then flush.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Codec`] if the envelope cannot be encoded
    /// (nothing is written) or [`ProtocolError::Io`] if the stream fails.
    pub async fn send<E: Envelope>(&mut self, envelope: &E) -> ProtocolResult<()> {
        let bytes = envelope.encode()?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        trace!(kind = E::KIND, len = bytes.len(), "sent envelope");
        Ok(())
    }

    /// Wait for the next complete envelope.
    ///
    /// Bytes left over after the envelope stay buffered for the next call.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Closed`] if the peer closes the stream, including
    ///   mid-envelope
    /// - [`ProtocolError::Io`] if a read fails
    /// - an envelope error ([`ProtocolError::is_envelope_error`]) if the
    ///   bytes are malformed; buffered bytes are skipped up to the next one
    ///   that can open an envelope, so an envelope that arrived behind the
    ///   bad bytes is still delivered. The boundary is a guess: a stray map
    ///   header inside the garbage can swallow the envelope after it.
    pub async fn receive<E: Envelope>(&mut self) -> ProtocolResult<E> {
        loop {
            if !self.buffer.is_empty() {
                match from_cbor_prefix(&self.buffer) {
                    Ok((value, consumed)) => {
                        self.buffer.advance(consumed);
                        trace!(kind = E::KIND, len = consumed, "received envelope");
                        return E::from_value(&value);
                    }
                    Err(err) if err.is_incomplete() => {}
                    Err(err) => {
                        let discarded = resync_offset(&self.buffer);
                        debug!(error = %err, discarded, "malformed envelope");
                        self.buffer.advance(discarded);
                        return Err(err.into());
                    }
                }
            }

            if self.buffer.len() >= MAX_ENVELOPE_SIZE {
                let discarded = self.buffer.len();
                self.buffer.clear();
                return Err(ProtocolError::decode(format!(
                    "envelope exceeds {MAX_ENVELOPE_SIZE} bytes ({discarded} buffered)"
                )));
            }

            self.buffer.reserve(self.read_chunk);
            let read = (&mut self.stream)
                .take(self.read_chunk as u64)
                .read_buf(&mut self.buffer)
                .await?;
            if read == 0 {
                return Err(ProtocolError::Closed);
            }
        }
    }

    /// Number of received bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwrap the underlying stream, dropping buffered bytes.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Envelopes are definite-length maps with at most 23 entries.
fn opens_envelope(byte: u8) -> bool {
    (0xa0..=0xb7).contains(&byte)
}

/// Bytes to drop after a decode failure at the front of `buffer`: up to the
/// next byte that could open an envelope, or all of it.
fn resync_offset(buffer: &[u8]) -> usize {
    buffer
        .iter()
        .skip(1)
        .position(|b| opens_envelope(*b))
        .map_or(buffer.len(), |pos| pos + 1)
}
