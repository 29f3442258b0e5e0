//! The per-connection request loop.

use std::sync::Arc;

use humandb_protocol::{Channel, ProtocolError, Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::context::{Dispatch, ServerContext};
use crate::error::ServerResult;

/// Serve requests from one client until it leaves.
///
/// Returns `Ok(())` when the client sends `exit`, closes the stream, or
/// stays silent past the idle timeout. A malformed request is answered
/// with an error message and the loop goes on.
///
/// # Errors
///
/// Returns an error if the stream fails or a response cannot be sent.
pub async fn serve_connection<S>(stream: S, context: Arc<ServerContext>) -> ServerResult<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let config = context.config();
    let mut channel = Channel::with_read_chunk(stream, config.read_chunk);

    loop {
        let received = match config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, channel.receive::<Request>()).await {
                Ok(received) => received,
                Err(_) => {
                    info!(timeout = ?limit, "closing idle connection");
                    return Ok(());
                }
            },
            None => channel.receive::<Request>().await,
        };

        let request = match received {
            Ok(request) => request,
            Err(ProtocolError::Closed) => {
                debug!("client closed the connection");
                return Ok(());
            }
            Err(err) if err.is_envelope_error() => {
                warn!(error = %err, "rejecting malformed request");
                channel
                    .send(&Response::message(format!("Malformed request: {err}")))
                    .await?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        match context.dispatch(request) {
            Dispatch::Reply(response) => channel.send(&response).await?,
            Dispatch::Disconnect => {
                info!("client disconnected");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use humandb_core::CollectionStore;
    use humandb_testkit::sample_record;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncWriteExt};

    fn context(config: ServerConfig) -> Arc<ServerContext> {
        Arc::new(ServerContext::new(config, CollectionStore::new()))
    }

    #[tokio::test]
    async fn request_response_loop() {
        let ctx = context(ServerConfig::default());
        let (client, server) = duplex(4096);
        let task = tokio::spawn(serve_connection(server, Arc::clone(&ctx)));
        let mut client = Channel::new(client);

        let insert = Request::new("insert")
            .with_key(4)
            .with_record(sample_record(0, "Ada"));
        client.send(&insert).await.unwrap();
        let response: Response = client.receive().await.unwrap();
        assert_eq!(
            response.message.as_deref(),
            Some("Record added to the collection with id 1.")
        );

        client.send(&Request::new("show")).await.unwrap();
        let response: Response = client.receive().await.unwrap();
        assert_eq!(response.collection.unwrap()[0].0, 4);

        client.send(&Request::new("exit")).await.unwrap();
        task.await.unwrap().unwrap();
        assert_eq!(ctx.with_store(CollectionStore::len), 1);
    }

    #[tokio::test]
    async fn malformed_request_keeps_connection_open() {
        let ctx = context(ServerConfig::default());
        let (mut client, server) = duplex(4096);
        let task = tokio::spawn(serve_connection(server, ctx));

        client.write_all(&[0xff, 0x00]).await.unwrap();
        let mut channel = Channel::new(client);
        let response: Response = channel.receive().await.unwrap();
        assert!(response.message.unwrap().starts_with("Malformed request"));

        channel.send(&Request::new("info")).await.unwrap();
        let response: Response = channel.receive().await.unwrap();
        assert!(response.message.unwrap().contains("Number of elements: 0"));

        drop(channel);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn response_sent_as_request_is_rejected() {
        let ctx = context(ServerConfig::default());
        let (client, server) = duplex(4096);
        let task = tokio::spawn(serve_connection(server, ctx));
        let mut client = Channel::new(client);

        client.send(&Response::message("wrong way")).await.unwrap();
        let response: Response = client.receive().await.unwrap();
        assert!(response.message.unwrap().contains("type mismatch"));

        drop(client);
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn idle_connection_is_closed() {
        let ctx = context(ServerConfig::default().with_idle_timeout(Duration::from_millis(50)));
        let (_client, server) = duplex(64);
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            serve_connection(server, ctx),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
