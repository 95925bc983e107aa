//! The server over a real TCP socket.

use std::net::SocketAddr;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use kennel::{App, BODY_TOO_LARGE_MESSAGE, DEFAULT_BODY_LIMIT, Server};

/// Sends one HTTP/1.1 request with `connection: close` and returns the
/// status code and parsed JSON body.
async fn request(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, Value) {
    let mut raw = format!("{method} {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n");
    if let Some(body) = body {
        raw.push_str("content-type: application/json\r\n");
        raw.push_str(&format!("content-length: {}\r\n\r\n{body}", body.len()));
    } else {
        raw.push_str("\r\n");
    }
    send_raw(addr, &raw).await
}

/// Writes `raw` verbatim and reads the response until the server closes.
async fn send_raw(addr: SocketAddr, raw: &str) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    let text = String::from_utf8(buf).unwrap();

    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let status = head.split(' ').nth(1).unwrap().parse().unwrap();
    let json = serde_json::from_str(body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn serves_crud_and_shuts_down_cleanly() {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(App::new(true).router(), async {
        let _ = stopped.await;
    }));

    let (status, dogs) = request(addr, "GET", "/dogs", None).await;
    assert_eq!(status, 200);
    assert_eq!(dogs.as_array().unwrap().len(), 1);

    let (status, created) =
        request(addr, "POST", "/dogs", Some(r#"{"name":"Rex","breed":"Lab"}"#)).await;
    assert_eq!(status, 201);
    let id = created["id"].as_str().unwrap().to_owned();

    let (status, fetched) = request(addr, "GET", &format!("/dogs/{id}"), None).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["breed"], "Lab");

    let (status, missing) = request(addr, "GET", "/nowhere", None).await;
    assert_eq!(status, 404);
    assert_eq!(missing["message"], "Not found!");

    stop.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn oversized_body_is_413() {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(App::new(false).router(), async {
        let _ = stopped.await;
    }));

    // Only the headers go out: the declared length alone is refused.
    let declared = DEFAULT_BODY_LIMIT + 1;
    let raw = format!(
        "POST /hubs HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\
         content-type: application/json\r\ncontent-length: {declared}\r\n\r\n"
    );
    let (status, body) = send_raw(addr, &raw).await;
    assert_eq!(status, 413);
    assert_eq!(body["message"], BODY_TOO_LARGE_MESSAGE);

    let (status, hubs) = request(addr, "GET", "/hubs", None).await;
    assert_eq!(status, 200);
    assert_eq!(hubs.as_array().unwrap().len(), 0);

    stop.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn body_limit_is_configurable() {
    let server = Server::bind("127.0.0.1:0").await.unwrap().with_body_limit(16);
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let running = tokio::spawn(server.serve_with_shutdown(App::new(false).router(), async {
        let _ = stopped.await;
    }));

    let (status, _) = request(addr, "POST", "/hubs", Some(r#"{"a":1}"#)).await;
    assert_eq!(status, 201);

    let raw = "POST /hubs HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\
               content-type: application/json\r\ncontent-length: 17\r\n\r\n";
    let (status, _) = send_raw(addr, raw).await;
    assert_eq!(status, 413);

    stop.send(()).unwrap();
    running.await.unwrap().unwrap();
}

#[tokio::test]
async fn bind_rejects_bad_address() {
    let err = Server::bind("not an address").await.err().unwrap();
    assert!(err.to_string().contains("not an address"));
}
