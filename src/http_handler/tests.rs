use super::{ResponseError, RobotConfigPoller};
use crate::config::RemoteConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Answers a single HTTP request with `status` and `body`, returning the raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed early");
            head.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8(head).unwrap()
    });
    (base_url, handle)
}

fn remote(base_url: String) -> RemoteConfig {
    RemoteConfig {
        base_url,
        robot_id: String::from("42"),
        auth_token: String::from("s3cret"),
    }
}

#[tokio::test]
async fn test_poll_applies_battery_multiplier() {
    let (url, server) = serve_once("200 OK", r#"{"battery_multiplier": 1.25, "name": "mower"}"#).await;
    let (tx, rx) = watch::channel(1.0);
    let poller = RobotConfigPoller::new(&remote(url), tx).unwrap();
    assert_eq!(poller.poll_once().await.unwrap(), 1.25);
    assert_eq!(*rx.borrow(), 1.25);

    let head = server.await.unwrap().to_lowercase();
    assert!(head.starts_with("get /api/robot/42/?format=json http/1.1"), "{head}");
    assert!(head.contains("authorization: bearer s3cret"), "{head}");
}

#[tokio::test]
async fn test_zero_multiplier_is_ignored() {
    let (url, server) = serve_once("200 OK", r#"{"battery_multiplier": 0}"#).await;
    let (tx, rx) = watch::channel(1.1);
    let poller = RobotConfigPoller::new(&remote(url), tx).unwrap();
    assert_eq!(poller.poll_once().await.unwrap(), 1.1);
    assert_eq!(*rx.borrow(), 1.1);
    server.await.unwrap();
}

#[tokio::test]
async fn test_rejected_token_is_reported() {
    let (url, server) = serve_once("401 Unauthorized", r#"{"detail": "nope"}"#).await;
    let (tx, _rx) = watch::channel(1.0);
    let poller = RobotConfigPoller::new(&remote(url), tx).unwrap();
    assert!(matches!(poller.poll_once().await, Err(ResponseError::Unauthorized)));
    server.await.unwrap();
}
