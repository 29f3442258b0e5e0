//! End-to-end tests against a server on an ephemeral port.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use humandb_core::CollectionStore;
use humandb_protocol::{Channel, Request, Response};
use humandb_server::{Server, ServerConfig, ServerContext};
use humandb_testkit::{populated_store, sample_record};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: SocketAddr,
    context: Arc<ServerContext>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

async fn start(store: CollectionStore) -> Running {
    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
    let server = Server::bind(ServerContext::new(config, store)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let context = server.context();
    let (stop, stopped) = oneshot::channel();
    let task = tokio::spawn(async move {
        server
            .run_until(async {
                let _ = stopped.await;
            })
            .await
            .unwrap();
    });
    Running {
        addr,
        context,
        stop,
        task,
    }
}

async fn connect(addr: SocketAddr) -> Channel<TcpStream> {
    Channel::new(TcpStream::connect(addr).await.unwrap())
}

async fn call(channel: &mut Channel<TcpStream>, request: Request) -> Response {
    channel.send(&request).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), channel.receive())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn full_session() {
    let running = start(CollectionStore::new()).await;
    let mut client = connect(running.addr).await;

    let response = call(&mut client, Request::new("help")).await;
    assert_eq!(response.message.unwrap().lines().count(), 15);

    for (key, name) in [(1, "Carol"), (2, "alice"), (3, "Bob")] {
        let request = Request::new("insert")
            .with_key(key)
            .with_record(sample_record(0, name));
        let response = call(&mut client, request).await;
        assert!(response.message.unwrap().starts_with("Record added"));
    }

    let response = call(&mut client, Request::new("show")).await;
    let names: Vec<String> = response
        .collection
        .unwrap()
        .into_iter()
        .map(|(_, r)| r.name)
        .collect();
    assert_eq!(names, vec!["alice", "Bob", "Carol"]);

    let response = call(&mut client, Request::new("PRINT_DESCENDING")).await;
    let keys: Vec<i32> = response
        .collection
        .unwrap()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec![1, 3, 2]);

    let response = call(&mut client, Request::new("teleport")).await;
    assert!(response.message.unwrap().starts_with("Unknown command"));

    client.send(&Request::new("exit")).await.unwrap();
    assert!(client.receive::<Response>().await.unwrap_err().is_disconnect());

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_get_distinct_ids() {
    let running = start(CollectionStore::new()).await;

    let mut clients = Vec::new();
    for worker in 0..8 {
        let addr = running.addr;
        clients.push(tokio::spawn(async move {
            let mut channel = connect(addr).await;
            for i in 0..10 {
                let request = Request::new("insert")
                    .with_key(worker * 100 + i + 1)
                    .with_record(sample_record(1, "same id requested"));
                call(&mut channel, request).await;
            }
        }));
    }
    for client in clients {
        client.await.unwrap();
    }

    let ids: Vec<i32> = running
        .context
        .with_store(|s| s.iter().map(|(_, r)| r.id).collect());
    assert_eq!(ids.len(), 80);
    let distinct: HashSet<i32> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), 80);
    assert_eq!(distinct, (1..=80).collect());

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test]
async fn dropped_client_does_not_affect_others() {
    let running = start(populated_store(3)).await;

    let mut steady = connect(running.addr).await;
    let rude = connect(running.addr).await;
    drop(rude);

    let response = call(&mut steady, Request::new("info")).await;
    assert!(response.message.unwrap().contains("Number of elements: 3"));

    let response = call(&mut steady, Request::new("remove_greater_key").with_argument(10)).await;
    assert!(response.message.unwrap().starts_with("Removed 2"));
    assert_eq!(running.context.with_store(CollectionStore::len), 1);

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}

#[tokio::test]
async fn update_changes_storage_key() {
    let running = start(CollectionStore::new()).await;
    let mut client = connect(running.addr).await;

    let insert = Request::new("insert")
        .with_key(3)
        .with_record(sample_record(0, "before"));
    call(&mut client, insert).await;

    let update = Request::new("update")
        .with_argument(1)
        .with_key(9)
        .with_record(sample_record(0, "after"));
    let response = call(&mut client, update).await;
    assert_eq!(response.message.as_deref(), Some("Record 1 updated."));

    let (keys, ids) = running.context.with_store(|s| {
        let keys: Vec<i32> = s.iter().map(|(k, _)| k).collect();
        let ids: Vec<i32> = s.iter().map(|(_, r)| r.id).collect();
        (keys, ids)
    });
    assert_eq!(keys, vec![9]);
    assert_eq!(ids, vec![1]);

    running.stop.send(()).unwrap();
    running.task.await.unwrap();
}
