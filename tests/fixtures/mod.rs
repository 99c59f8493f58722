//! Shared integration test fixtures.
//!
//! Boots a real server on an ephemeral port, seeded with a small
//! directory: Alice (member of p1 and p2) and Bob (member of p1).

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

use relay_hub::{
    domain::{MemberRole, RoomId, UserId, UserProfile},
    infrastructure::{
        collaborator::{InMemoryDirectory, StaticIdentityVerifier},
        repository::InMemoryConnectionRegistry,
    },
    ui::{serve, state::AppState},
};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    addr: SocketAddr,
}

fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

impl TestServer {
    pub async fn start() -> Self {
        let verifier = StaticIdentityVerifier::new();
        verifier
            .insert_token("tok-alice".to_string(), "sub-alice".to_string())
            .await;
        verifier
            .insert_token("tok-bob".to_string(), "sub-bob".to_string())
            .await;

        let directory = InMemoryDirectory::new();
        directory
            .add_user(
                "sub-alice".to_string(),
                UserProfile::new(
                    user("u-alice"),
                    "Alice".to_string(),
                    Some("https://example.com/alice.png".to_string()),
                ),
            )
            .await;
        directory
            .add_user(
                "sub-bob".to_string(),
                UserProfile::new(user("u-bob"), "Bob".to_string(), None),
            )
            .await;
        directory
            .add_membership(user("u-alice"), room("p1"), MemberRole::Owner)
            .await;
        directory
            .add_membership(user("u-alice"), room("p2"), MemberRole::Member)
            .await;
        directory
            .add_membership(user("u-bob"), room("p1"), MemberRole::Member)
            .await;

        let directory = Arc::new(directory);
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryConnectionRegistry::new()),
            Arc::new(verifier),
            directory.clone(),
            directory,
        ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        tokio::spawn(async move {
            let _ = serve(listener, state).await;
        });

        Self { addr }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Open a WebSocket connection to the test server.
pub async fn ws_connect(server: &TestServer) -> WsClient {
    let (socket, _response) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .expect("websocket connect");
    socket
}

/// Send one JSON message.
pub async fn send_json(socket: &mut WsClient, value: serde_json::Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("websocket send");
}

/// Receive the next text message as JSON, with a timeout.
pub async fn recv_json(socket: &mut WsClient) -> serde_json::Value {
    let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("timed out waiting for message")
        .expect("websocket stream ended")
        .expect("websocket receive");
    serde_json::from_str(message.to_text().expect("text message")).expect("valid JSON push")
}

/// Open a connection and authenticate it, consuming the `authenticated`
/// acknowledgment.
pub async fn authenticated_client(server: &TestServer, token: &str) -> WsClient {
    let mut socket = ws_connect(server).await;
    send_json(&mut socket, serde_json::json!({"type": "authenticate", "token": token})).await;
    let ack = recv_json(&mut socket).await;
    assert_eq!(ack["type"], "authenticated", "unexpected ack: {ack}");
    socket
}
