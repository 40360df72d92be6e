//! End-to-end tests against a live server on an ephemeral port.

use serde_json::{Value, json};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use disklet::server::{Server, ServerConfig, open_store};

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) {
        self.send_bytes(line.as_bytes()).await;
        self.writer.write_all(b"\n").await.unwrap();
    }

    async fn send_bytes(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    async fn call(&mut self, request: Value) -> Value {
        self.send_raw(&request.to_string()).await;
        self.recv().await
    }
}

async fn start_server(root: &std::path::Path, max_clients: usize) -> std::net::SocketAddr {
    start_with(ServerConfig {
        port: 0,
        root_dir: root.to_string_lossy().into_owned(),
        max_clients,
        max_request_length: 4096,
        ..ServerConfig::default()
    })
    .await
}

async fn start_with(config: ServerConfig) -> std::net::SocketAddr {
    let disklet = open_store(&config).unwrap();
    let server = Server::bind(config, disklet).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

#[tokio::test]
async fn data_and_text_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    let resp = client
        .call(json!({"id": 1, "op": "setData", "path": "a/b.bin", "data": "AAEC/w=="}))
        .await;
    assert_eq!(resp, json!({"id": 1, "result": null}));
    assert_eq!(std::fs::read(root.path().join("a/b.bin")).unwrap(), vec![0, 1, 2, 255]);

    let resp = client.call(json!({"id": 2, "op": "getData", "path": "a/b.bin"})).await;
    assert_eq!(resp["result"], "AAEC/w==");

    client
        .call(json!({"id": 3, "op": "setText", "path": "note.txt", "text": "line one\nline two"}))
        .await;
    let resp = client.call(json!({"id": 4, "op": "getText", "path": "note.txt"})).await;
    assert_eq!(resp["result"], "line one\nline two");

    let resp = client.call(json!({"id": 5, "op": "list"})).await;
    assert_eq!(resp["result"], json!({"a": "folder", "note.txt": "file"}));

    let resp = client.call(json!({"id": 6, "op": "deepList", "path": ""})).await;
    assert_eq!(
        resp["result"],
        json!({"a": "folder", "a/b.bin": "file", "note.txt": "file"})
    );
}

#[tokio::test]
async fn failures_are_coded() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    let resp = client.call(json!({"id": 1, "op": "getText", "path": "missing.txt"})).await;
    assert_eq!(resp["error"]["code"], "ENOENT");
    assert_eq!(resp["error"]["message"], "Cannot read 'missing.txt'");
    assert!(resp.get("result").is_none());

    let resp = client.call(json!({"id": 2, "op": "setText", "path": "../escape", "text": "x"})).await;
    assert_eq!(resp["error"]["code"], "EINVAL");
    assert!(!root.path().parent().unwrap().join("escape").exists());

    client.call(json!({"id": 3, "op": "setText", "path": "f", "text": "x"})).await;
    let resp = client.call(json!({"id": 4, "op": "list", "path": "f"})).await;
    assert_eq!(resp["error"]["code"], "ENOTDIR");

    client.call(json!({"id": 5, "op": "setText", "path": "dir/x", "text": "x"})).await;
    let resp = client.call(json!({"id": 6, "op": "setText", "path": "dir", "text": "x"})).await;
    assert_eq!(resp["error"]["code"], "EISDIR");

    let resp = client.call(json!({"id": 7, "op": "setData", "path": "b", "data": "@@"})).await;
    assert_eq!(resp["error"]["code"], "EINVAL");

    let resp = client.call(json!({"id": 8, "op": "delete", "path": "never"})).await;
    assert_eq!(resp, json!({"id": 8, "result": null}));
}

#[tokio::test]
async fn malformed_lines_get_protocol_errors() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    client.send_raw("this is not json").await;
    let resp = client.recv().await;
    assert_eq!(resp["id"], Value::Null);
    assert_eq!(resp["error"]["code"], "EPROTO");

    client.send_raw(r#"{"id": 4, "op": "rename", "path": "a"}"#).await;
    let resp = client.recv().await;
    assert_eq!(resp["id"], 4);
    assert_eq!(resp["error"]["code"], "EPROTO");

    let long = json!({"id": 5, "op": "setText", "path": "big", "text": "x".repeat(8192)});
    let resp = client.call(long).await;
    assert_eq!(resp["error"]["code"], "EPROTO");
    assert!(!root.path().join("big").exists());

    // The session survives bad input.
    let resp = client.call(json!({"id": 6, "op": "list"})).await;
    assert_eq!(resp["result"], json!({}));
}

#[tokio::test]
async fn invalid_utf8_line_keeps_session_open() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    client
        .send_bytes(b"{\"id\":1,\"op\":\"getText\",\"path\":\"\xff\"}\n{\"id\":2,\"op\":\"list\"}\n")
        .await;

    let resp = client.recv().await;
    assert_eq!(resp["id"], 1);
    assert_eq!(resp["error"]["code"], "EPROTO");

    let resp = client.recv().await;
    assert_eq!(resp, json!({"id": 2, "result": {}}));
}

#[tokio::test]
async fn unterminated_flood_is_cut_off() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    // Far past the limit, with no newline in sight.
    client.send_bytes(&vec![b'x'; 256 * 1024]).await;
    let resp = tokio::time::timeout(Duration::from_secs(5), client.recv())
        .await
        .expect("server answered before the line ended");
    assert_eq!(resp["id"], Value::Null);
    assert_eq!(resp["error"]["code"], "EPROTO");

    // The rest of the long line is dropped; the next one is served.
    client.send_bytes(b"xxxx\n").await;
    let resp = client.call(json!({"id": 2, "op": "list"})).await;
    assert_eq!(resp, json!({"id": 2, "result": {}}));
}

#[tokio::test]
async fn pipelining_past_in_flight_cap() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_with(ServerConfig {
        port: 0,
        root_dir: root.path().to_string_lossy().into_owned(),
        max_in_flight: 2,
        ..ServerConfig::default()
    })
    .await;
    let mut client = TestClient::connect(addr).await;

    for id in 0..50u64 {
        let request = json!({"id": id, "op": "setText", "path": format!("q/{}", id), "text": "x"});
        client.send_raw(&request.to_string()).await;
    }

    let mut seen: Vec<u64> = Vec::new();
    for _ in 0..50 {
        let resp = client.recv().await;
        assert_eq!(resp["result"], Value::Null);
        seen.push(resp["id"].as_u64().unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..50).collect::<Vec<_>>());
}

#[tokio::test]
async fn pipelined_requests_all_answered() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;
    let mut client = TestClient::connect(addr).await;

    for id in 0..20u64 {
        let request = json!({"id": id, "op": "setText", "path": format!("p/{}", id), "text": id.to_string()});
        client.send_raw(&request.to_string()).await;
    }

    let mut seen: Vec<u64> = Vec::new();
    for _ in 0..20 {
        let resp = client.recv().await;
        assert_eq!(resp["result"], Value::Null);
        seen.push(resp["id"].as_u64().unwrap());
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..20).collect::<Vec<_>>());

    let resp = client.call(json!({"id": 99, "op": "list", "path": "p"})).await;
    assert_eq!(resp["result"].as_object().unwrap().len(), 20);
}

#[tokio::test]
async fn concurrent_clients_on_distinct_paths() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 4).await;

    let tasks: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|path| {
            tokio::spawn(async move {
                let mut client = TestClient::connect(addr).await;
                client
                    .call(json!({"id": 1, "op": "setText", "path": path, "text": path}))
                    .await
            })
        })
        .collect();
    for task in tasks {
        let resp = task.await.unwrap();
        assert_eq!(resp["result"], Value::Null);
    }

    let mut client = TestClient::connect(addr).await;
    assert_eq!(client.call(json!({"id": 1, "op": "getText", "path": "a"})).await["result"], "a");
    assert_eq!(client.call(json!({"id": 2, "op": "getText", "path": "b"})).await["result"], "b");
}

#[tokio::test]
async fn excess_clients_are_turned_away() {
    let root = tempfile::tempdir().unwrap();
    let addr = start_server(root.path(), 1).await;

    let mut first = TestClient::connect(addr).await;
    // Make sure the first session holds its slot.
    first.call(json!({"id": 1, "op": "list"})).await;

    let mut second = TestClient::connect(addr).await;
    let resp = second.recv().await;
    assert_eq!(resp["error"]["code"], "EBUSY");
}
