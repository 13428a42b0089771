//! End-to-end session tests against a local TCP peer standing in for the
//! serial-to-TCP gateway.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use aqt_modbus::{
    append_checksum, build_frame, AqtError, AqtSession, ChecksumPolicy, ChecksumVerdict,
    LinkConfig, RegisterValue,
};

fn test_config(port: u16) -> LinkConfig {
    LinkConfig::new()
        .with_host("127.0.0.1")
        .with_port(port)
        .with_response_timeout(Duration::from_millis(300))
        .with_response_delay(Duration::ZERO)
}

/// Uptime response: byte count 4, payload 300 seconds.
fn uptime_reply() -> Vec<u8> {
    let mut frame = vec![0x01, 0x03, 0x04, 0x00, 0x00, 0x01, 0x2C];
    append_checksum(&mut frame);
    frame
}

/// Spawn a one-shot server that reads one request and answers with `reply`.
async fn one_shot_server(reply: Vec<u8>) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8];
        socket.read_exact(&mut request).await.unwrap();
        socket.write_all(&reply).await.unwrap();
        // Hold the socket open so the reply is not cut short.
        tokio::time::sleep(Duration::from_millis(200)).await;
    });
    port
}

#[tokio::test]
async fn uptime_read_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8];
        socket.read_exact(&mut request).await.unwrap();
        socket.write_all(&uptime_reply()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        request
    });

    let mut session = AqtSession::new(test_config(port));
    assert!(session.connect().await);
    assert!(session.is_open());

    let exchange = session.read_parameter("010300980002").await.unwrap();
    assert_eq!(exchange.value, RegisterValue::U32(300));
    assert_eq!(exchange.checksum, ChecksumVerdict::Ok);
    assert_eq!(exchange.received, uptime_reply());

    // The wire saw exactly the framed command.
    let request = server.await.unwrap();
    assert_eq!(request, build_frame("010300980002").unwrap());

    session.disconnect().await;
    assert!(!session.is_open());
}

#[tokio::test]
async fn truncated_reply_is_short_frame() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8];
        socket.read_exact(&mut request).await.unwrap();
        // Four bytes of a nine-byte frame, then close.
        socket.write_all(&[0x01, 0x03, 0x04, 0x00]).await.unwrap();
    });

    let mut session = AqtSession::new(test_config(port));
    assert!(session.connect().await);

    let err = session.read_parameter("010300980002").await.unwrap_err();
    assert_eq!(
        err,
        AqtError::ShortFrame {
            expected: 5,
            actual: 4
        }
    );
}

#[tokio::test]
async fn crc_mismatch_is_advisory_by_default() {
    let mut reply = uptime_reply();
    let last = reply.len() - 1;
    reply[last] ^= 0xFF;
    let port = one_shot_server(reply).await;

    let mut session = AqtSession::new(test_config(port));
    assert!(session.connect().await);

    let exchange = session.read_parameter("010300980002").await.unwrap();
    assert_eq!(exchange.value, RegisterValue::U32(300));
    assert!(matches!(exchange.checksum, ChecksumVerdict::Mismatch { .. }));
}

#[tokio::test]
async fn crc_mismatch_is_fatal_under_strict_policy() {
    let mut reply = uptime_reply();
    let last = reply.len() - 1;
    reply[last] ^= 0xFF;
    let port = one_shot_server(reply).await;

    let config = test_config(port).with_checksum_policy(ChecksumPolicy::Strict);
    let mut session = AqtSession::new(config);
    assert!(session.connect().await);

    let err = session.read_parameter("010300980002").await.unwrap_err();
    assert!(matches!(err, AqtError::ChecksumMismatch { .. }));
}

#[tokio::test]
async fn connect_to_closed_port_returns_false() {
    // Bind then drop a listener so the port is known-closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut session = AqtSession::new(test_config(port));
    assert!(!session.connect().await);
    assert!(!session.is_open());
}

#[tokio::test]
async fn read_before_connect_fails_fast() {
    let mut session = AqtSession::new(test_config(1));
    let err = session.read_parameter("010300000001").await.unwrap_err();
    assert_eq!(err, AqtError::NotConnected);
}

#[tokio::test]
async fn reconnect_replaces_prior_connection() {
    let port_a = one_shot_server(uptime_reply()).await;
    let port_b = one_shot_server(uptime_reply()).await;

    let mut session = AqtSession::new(test_config(port_a));
    assert!(session.connect().await);
    assert!(session.connect_to("127.0.0.1", port_b).await);

    // The read lands on the second peer.
    let exchange = session.read_parameter("010300980002").await.unwrap();
    assert_eq!(exchange.value, RegisterValue::U32(300));
    assert_eq!(session.config().port, port_b);
}

#[tokio::test]
async fn ascii_register_read_end_to_end() {
    // AQT serial register: byte count 8, NUL-padded ASCII.
    let mut reply = vec![0x01, 0x03, 0x08];
    reply.extend_from_slice(b"AQT1234\0");
    append_checksum(&mut reply);
    let port = one_shot_server(reply).await;

    let mut session = AqtSession::new(test_config(port));
    assert!(session.connect().await);

    let value = session.read_value("010300B40004").await.unwrap();
    assert_eq!(value, RegisterValue::Ascii("AQT1234".to_string()));
}
