//! Shell sessions against a live server.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use humandb_client::{run_client, ClientConfig, ClientError, RetryConfig, Shell};
use humandb_core::CollectionStore;
use humandb_server::{serve_connection, Server, ServerConfig, ServerContext};
use humandb_testkit::populated_store;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const RECORD_LINES: &str = "Rick\n1.5\n-3\ntrue\nTheme\n120\n2.25\nknife\nfalse\nDeLorean\ntrue\n";

async fn start(store: CollectionStore) -> (SocketAddr, Arc<ServerContext>, oneshot::Sender<()>) {
    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
    let server = Server::bind(ServerContext::new(config, store)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let context = server.context();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        server
            .run_until(async {
                let _ = stopped.await;
            })
            .await
            .unwrap();
    });
    (addr, context, stop)
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(addr.ip().to_string(), addr.port()).with_retry(
        RetryConfig::default()
            .with_max_attempts(2)
            .with_delay(Duration::from_millis(10)),
    )
}

async fn run(addr: SocketAddr, console: &str) -> (Result<(), ClientError>, String) {
    let mut shell = Shell::new(console.as_bytes(), Vec::new());
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        run_client(&client_config(addr), &mut shell),
    )
    .await
    .unwrap();
    (result, String::from_utf8(shell.output().clone()).unwrap())
}

#[tokio::test]
async fn interactive_session() {
    let (addr, context, _stop) = start(CollectionStore::new()).await;
    let console = format!("insert\n5\n{RECORD_LINES}show\ninfo\nexit\n");
    let (result, output) = run(addr, &console).await;

    assert!(result.is_ok(), "{result:?}");
    assert!(output.contains("Record added to the collection with id 1."));
    assert!(output.contains("5 : "));
    assert!(output.contains("Number of elements: 1"));
    assert_eq!(context.with_store(CollectionStore::len), 1);
}

#[tokio::test]
async fn script_runs_commands_and_records() {
    let (addr, context, _stop) = start(populated_store(3)).await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("batch.txt");
    fs::write(&path, format!("remove_key 10\ninsert\n40\n{RECORD_LINES}info\n")).unwrap();

    let console = format!("execute_script {}\nexit\n", path.display());
    let (result, output) = run(addr, &console).await;

    assert!(result.is_ok(), "{result:?}");
    assert!(output.contains("$ remove_key 10"));
    assert!(output.contains("Element with key 10 removed."));
    assert!(output.contains("Number of elements: 3"));
    assert!(context.with_store(|s| s.contains_key(40)));
}

#[tokio::test]
async fn server_errors_are_printed() {
    let (addr, _context, _stop) = start(CollectionStore::new()).await;
    let (result, output) = run(addr, "clear\nremove_key 3\nexit\n").await;

    assert!(result.is_ok(), "{result:?}");
    assert!(output.contains("Collection is empty."));
}

#[tokio::test]
async fn unreachable_server_gives_up() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (result, output) = run(addr, "show\n").await;
    assert!(matches!(
        result,
        Err(ClientError::ReconnectExhausted { attempts: 2 })
    ));
    assert!(output.contains("retrying"));
}

#[tokio::test]
async fn reconnects_after_connection_loss() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let context = Arc::new(ServerContext::new(
        ServerConfig::default(),
        populated_store(2),
    ));
    let serving = Arc::clone(&context);
    tokio::spawn(async move {
        let (first, _) = listener.accept().await.unwrap();
        drop(first);
        let (second, _) = listener.accept().await.unwrap();
        serve_connection(second, serving).await.unwrap();
    });

    let (result, output) = run(addr, "info\ninfo\nexit\n").await;
    assert!(result.is_ok(), "{result:?}");
    assert!(output.contains("reconnecting"));
    assert!(output.contains("Number of elements: 2"));
}
