mod fixtures;

use serde_json::json;

use fixtures::{TestServer, authenticated_client, recv_json, send_json, ws_connect};

#[tokio::test]
async fn test_ping_answered_before_authentication() {
    // given
    let server = TestServer::start().await;
    let mut socket = ws_connect(&server).await;

    // when
    send_json(&mut socket, json!({"type": "ping"})).await;

    // then
    let reply = recv_json(&mut socket).await;
    assert_eq!(reply["type"], "pong");
}

#[tokio::test]
async fn test_subscribe_requires_authentication() {
    // given
    let server = TestServer::start().await;
    let mut socket = ws_connect(&server).await;

    // when
    send_json(&mut socket, json!({"type": "subscribe", "room_id": "p1"})).await;

    // then
    let reply = recv_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "authentication required");
}

#[tokio::test]
async fn test_authenticate_with_bad_token() {
    // given
    let server = TestServer::start().await;
    let mut socket = ws_connect(&server).await;

    // when
    send_json(
        &mut socket,
        json!({"type": "authenticate", "token": "tok-nobody"}),
    )
    .await;

    // then: refused, but the connection stays usable
    let reply = recv_json(&mut socket).await;
    assert_eq!(reply["type"], "auth_error");
    send_json(&mut socket, json!({"type": "ping"})).await;
    assert_eq!(recv_json(&mut socket).await["type"], "pong");
}

#[tokio::test]
async fn test_authenticate_returns_profile_snapshot() {
    // given
    let server = TestServer::start().await;
    let mut socket = ws_connect(&server).await;

    // when
    send_json(
        &mut socket,
        json!({"type": "authenticate", "token": "tok-alice"}),
    )
    .await;

    // then
    let reply = recv_json(&mut socket).await;
    assert_eq!(reply["type"], "authenticated");
    assert_eq!(reply["user"]["id"], "u-alice");
    assert_eq!(reply["user"]["display_name"], "Alice");
}

#[tokio::test]
async fn test_reauthenticate_refused_without_closing() {
    // given
    let server = TestServer::start().await;
    let mut alice = authenticated_client(&server, "tok-alice").await;

    // when: a second authenticate on the same connection
    send_json(
        &mut alice,
        json!({"type": "authenticate", "token": "tok-bob"}),
    )
    .await;

    // then: refused; the original binding still relays
    let reply = recv_json(&mut alice).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "connection is already bound to a user");
    send_json(&mut alice, json!({"type": "ping"})).await;
    assert_eq!(recv_json(&mut alice).await["type"], "pong");
}

#[tokio::test]
async fn test_peer_sees_user_come_online() {
    // given: Bob is online in p1
    let server = TestServer::start().await;
    let mut bob = authenticated_client(&server, "tok-bob").await;

    // when: Alice authenticates (memberships p1 and p2)
    let _alice = authenticated_client(&server, "tok-alice").await;

    // then: Bob, subscribed to p1, is told once
    let push = recv_json(&mut bob).await;
    assert_eq!(push["type"], "user_online");
    assert_eq!(push["user_id"], "u-alice");
    assert_eq!(push["display_name"], "Alice");
}

#[tokio::test]
async fn test_relay_reaches_room_peers_with_acting_user() {
    // given: both users online in p1
    let server = TestServer::start().await;
    let mut bob = authenticated_client(&server, "tok-bob").await;
    let mut alice = authenticated_client(&server, "tok-alice").await;
    let online = recv_json(&mut bob).await;
    assert_eq!(online["type"], "user_online");

    // when: Alice relays a task update into p1
    send_json(
        &mut alice,
        json!({
            "type": "task_updated",
            "room_id": "p1",
            "task": {"id": 7, "title": "Fix build"}
        }),
    )
    .await;

    // then: Bob receives the enriched event; Alice does not hear herself
    let push = recv_json(&mut bob).await;
    assert_eq!(push["type"], "task_updated");
    assert_eq!(push["room_id"], "p1");
    assert_eq!(push["task"]["title"], "Fix build");
    assert_eq!(push["acting_user"]["id"], "u-alice");
    assert_eq!(push["acting_user"]["display_name"], "Alice");
    assert!(push["emitted_at"].is_number());
    send_json(&mut alice, json!({"type": "ping"})).await;
    assert_eq!(recv_json(&mut alice).await["type"], "pong");
}

#[tokio::test]
async fn test_relay_to_unsubscribed_room_is_dropped() {
    // given: Bob is a member of p1 only
    let server = TestServer::start().await;
    let mut alice = authenticated_client(&server, "tok-alice").await;
    let mut bob = authenticated_client(&server, "tok-bob").await;
    let online = recv_json(&mut alice).await;
    assert_eq!(online["type"], "user_online");

    // when: Bob names p2 in a relay he is not subscribed to, then a valid one
    send_json(
        &mut bob,
        json!({"type": "typing_start", "room_id": "p2", "task_id": "t-1"}),
    )
    .await;
    send_json(
        &mut bob,
        json!({"type": "typing_start", "room_id": "p1", "task_id": "t-1"}),
    )
    .await;

    // then: Alice sees only the p1 event
    let push = recv_json(&mut alice).await;
    assert_eq!(push["type"], "typing_start");
    assert_eq!(push["room_id"], "p1");
}

#[tokio::test]
async fn test_subscribe_denied_for_non_member() {
    // given
    let server = TestServer::start().await;
    let mut bob = authenticated_client(&server, "tok-bob").await;

    // when: Bob asks for a room he is not a member of
    send_json(&mut bob, json!({"type": "subscribe", "room_id": "p2"})).await;

    // then
    let reply = recv_json(&mut bob).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "access denied to room 'p2'");
}

#[tokio::test]
async fn test_unsubscribe_notifies_room_once() {
    // given: both users online in p1
    let server = TestServer::start().await;
    let mut alice = authenticated_client(&server, "tok-alice").await;
    let mut bob = authenticated_client(&server, "tok-bob").await;
    let online = recv_json(&mut alice).await;
    assert_eq!(online["type"], "user_online");

    // when: Bob leaves p1 twice
    send_json(&mut bob, json!({"type": "unsubscribe", "room_id": "p1"})).await;
    send_json(&mut bob, json!({"type": "unsubscribe", "room_id": "p1"})).await;

    // then: Bob gets one ack, Alice one departure notice
    let ack = recv_json(&mut bob).await;
    assert_eq!(ack["type"], "left_room");
    assert_eq!(ack["room_id"], "p1");
    let push = recv_json(&mut alice).await;
    assert_eq!(push["type"], "user_left_room");
    assert_eq!(push["user_id"], "u-bob");

    // and: the second unsubscribe produced nothing for either side
    send_json(&mut bob, json!({"type": "ping"})).await;
    assert_eq!(recv_json(&mut bob).await["type"], "pong");
    send_json(&mut alice, json!({"type": "ping"})).await;
    assert_eq!(recv_json(&mut alice).await["type"], "pong");
}

#[tokio::test]
async fn test_offline_announced_after_last_connection_closes() {
    // given: Bob watches p1; Alice is online through two tabs
    let server = TestServer::start().await;
    let mut bob = authenticated_client(&server, "tok-bob").await;
    let mut alice_tab1 = authenticated_client(&server, "tok-alice").await;
    let _alice_tab2 = authenticated_client(&server, "tok-alice").await;

    // then: only the first tab made Alice newly visible
    let push = recv_json(&mut bob).await;
    assert_eq!(push["type"], "user_online");
    assert_eq!(push["user_id"], "u-alice");

    // when: the first tab closes
    alice_tab1.close(None).await.unwrap();
    send_json(&mut bob, json!({"type": "ping"})).await;

    // then: Alice is still online through the second tab
    assert_eq!(recv_json(&mut bob).await["type"], "pong");

    // when: the last tab closes
    drop(_alice_tab2);

    // then: Bob is told she went offline
    let push = recv_json(&mut bob).await;
    assert_eq!(push["type"], "user_offline");
    assert_eq!(push["user_id"], "u-alice");
}
