//! Integration tests for message fan-out.
//!
//! Tests that every connected peer sees every message, in one order.

mod common;

use common::TestServer;
use std::time::Duration;

#[tokio::test]
async fn test_both_peers_receive_messages_in_send_order() {
    let server = TestServer::spawn(10).await.expect("Failed to spawn test server");

    let mut alice = server.connect().await.expect("Failed to connect alice");
    let mut bob = server.connect().await.expect("Failed to connect bob");
    server.wait_for_peers(2).await.unwrap();

    alice.send("hello").await.unwrap();
    assert_eq!(alice.recv_text().await.unwrap(), "client1: hello");
    assert_eq!(bob.recv_text().await.unwrap(), "client1: hello");

    bob.send("world").await.unwrap();
    assert_eq!(alice.recv_text().await.unwrap(), "client2: world");
    assert_eq!(bob.recv_text().await.unwrap(), "client2: world");

    let log: Vec<String> = server
        .hub()
        .session_log
        .snapshot()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(log, ["client1: hello", "client2: world"]);
}

#[tokio::test]
async fn test_concurrent_senders_share_one_order() {
    let server = TestServer::spawn(10).await.unwrap();

    let mut peers = Vec::new();
    for _ in 0..3 {
        peers.push(server.connect().await.unwrap());
    }
    server.wait_for_peers(3).await.unwrap();

    for round in 0..5 {
        for peer in peers.iter_mut() {
            peer.send(&format!("msg{round}")).await.unwrap();
        }
    }

    // Every peer sees the same 15 lines in the same order as the log.
    let mut seen = Vec::new();
    for peer in peers.iter_mut() {
        let mut lines = Vec::new();
        for _ in 0..15 {
            lines.push(peer.recv_text().await.unwrap());
        }
        seen.push(lines);
    }
    let log: Vec<String> = server
        .hub()
        .session_log
        .snapshot()
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(log.len(), 15);
    for lines in &seen {
        assert_eq!(lines, &log);
    }
}

#[tokio::test]
async fn test_late_joiner_sees_only_later_messages() {
    let server = TestServer::spawn(10).await.unwrap();

    let mut early = server.connect().await.unwrap();
    early.send("before").await.unwrap();
    assert_eq!(early.recv_text().await.unwrap(), "client1: before");

    let mut late = server.connect().await.unwrap();
    server.wait_for_peers(2).await.unwrap();
    early.send("after").await.unwrap();

    assert_eq!(late.recv_text().await.unwrap(), "client1: after");
    assert!(late.recv_timeout(Duration::from_millis(200)).await.is_err());
}

#[tokio::test]
async fn test_departed_peer_stops_receiving() {
    let server = TestServer::spawn(10).await.unwrap();

    let mut stayer = server.connect().await.unwrap();
    let leaver = server.connect().await.unwrap();
    server.wait_for_peers(2).await.unwrap();

    leaver.close().await.unwrap();
    let hub = server.hub();
    server
        .wait_until(|| async move { hub.stats.voluntary_disconnects() == 1 })
        .await
        .unwrap();
    assert_eq!(hub.registry.len().await, 1);

    stayer.send("anyone?").await.unwrap();
    assert_eq!(stayer.recv_text().await.unwrap(), "client1: anyone?");
    assert_eq!(server.hub().stats.voluntary_disconnects(), 1);
    assert_eq!(server.hub().stats.abnormal_disconnects(), 0);
}

#[tokio::test]
async fn test_binary_frame_drops_only_the_sender() {
    let server = TestServer::spawn(10).await.unwrap();

    let mut good = server.connect().await.unwrap();
    let mut bad = server.connect().await.unwrap();
    server.wait_for_peers(2).await.unwrap();

    bad.send_binary(&[0xde, 0xad]).await.unwrap();
    assert!(bad.is_closed_within(Duration::from_secs(5)).await);
    let hub = server.hub();
    server
        .wait_until(|| async move { hub.admission.outstanding() == 1 })
        .await
        .unwrap();
    assert_eq!(hub.stats.abnormal_disconnects(), 1);
    assert_eq!(hub.registry.len().await, 1);

    good.send("still fine").await.unwrap();
    assert_eq!(good.recv_text().await.unwrap(), "client1: still fine");
    assert_eq!(server.hub().session_log.len(), 1);
}

#[tokio::test]
async fn test_identities_are_never_reused() {
    let server = TestServer::spawn(10).await.unwrap();

    let first = server.connect().await.unwrap();
    first.close().await.unwrap();
    server.wait_for_peers(0).await.unwrap();

    let mut second = server.connect().await.unwrap();
    second.send("who am i").await.unwrap();
    assert_eq!(second.recv_text().await.unwrap(), "client2: who am i");
}
