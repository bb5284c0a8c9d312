use super::*;
use crate::state::test_helpers::{room, test_app_state};
use frames::{ChatMessage, DrawOp, Point, Tool};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;

// =============================================================================
// HELPERS
// =============================================================================

fn connect(state: &AppState) -> (Connection, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(state.channel_capacity);
    (Connection::new(Uuid::new_v4(), tx), rx)
}

async fn send(state: &AppState, conn: &mut Connection, frame: Frame) {
    process_inbound(state, conn, Ok(frame)).await;
}

async fn recv(rx: &mut mpsc::Receiver<Frame>) -> Frame {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("frame receive timed out")
        .expect("channel closed unexpectedly")
}

async fn assert_no_frame(rx: &mut mpsc::Receiver<Frame>) {
    assert!(timeout(Duration::from_millis(80), rx.recv()).await.is_err(), "expected no frame");
}

fn drain(rx: &mut mpsc::Receiver<Frame>) {
    while rx.try_recv().is_ok() {}
}

fn red_segment() -> DrawOp {
    DrawOp::segment(Tool::Pen, Point::new(0.0, 0.0), Point::new(10.0, 10.0), "#ff0000", 4.0)
}

fn users(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_owned()).collect()
}

// =============================================================================
// JOIN / LEAVE
// =============================================================================

#[tokio::test]
async fn join_pushes_roster_to_joiner() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);

    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;

    assert_eq!(recv(&mut rx_alice).await, Frame::room_users(room("ABC123"), users(&["alice"])));
    assert_no_frame(&mut rx_alice).await;
}

#[tokio::test]
async fn join_notifies_existing_members() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;
    drain(&mut rx_alice);

    send(&state, &mut bob, Frame::join_room(room("ABC123"), "bob")).await;

    let roster = Frame::room_users(room("ABC123"), users(&["alice", "bob"]));
    assert_eq!(recv(&mut rx_alice).await, Frame::user_joined("bob"));
    assert_eq!(recv(&mut rx_alice).await, roster);
    assert_eq!(recv(&mut rx_bob).await, roster);
    assert_no_frame(&mut rx_bob).await;
}

#[tokio::test]
async fn blank_username_is_rejected() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "   ")).await;
    assert_no_frame(&mut rx_alice).await;
    assert!(state.rooms.read().await.is_empty());
}

#[tokio::test]
async fn leave_notifies_remaining_members() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ABC123"), "bob")).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    send(&state, &mut bob, Frame::leave_room(room("ABC123"))).await;

    assert_eq!(recv(&mut rx_alice).await, Frame::user_left("bob"));
    assert_eq!(recv(&mut rx_alice).await, Frame::room_users(room("ABC123"), users(&["alice"])));
    assert_no_frame(&mut rx_bob).await;
    assert!(bob.room.is_none());
}

#[tokio::test]
async fn joining_another_room_leaves_the_first() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ROOM01"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ROOM01"), "bob")).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    send(&state, &mut bob, Frame::join_room(room("ROOM02"), "bob")).await;

    assert_eq!(recv(&mut rx_alice).await, Frame::user_left("bob"));
    assert_eq!(recv(&mut rx_alice).await, Frame::room_users(room("ROOM01"), users(&["alice"])));
    assert_eq!(recv(&mut rx_bob).await, Frame::room_users(room("ROOM02"), users(&["bob"])));
    assert_eq!(services::room::roster(&state, &room("ROOM01")).await, users(&["alice"]));
}

#[tokio::test]
async fn leave_for_other_room_is_ignored() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ROOM01"), "alice")).await;
    drain(&mut rx_alice);

    send(&state, &mut alice, Frame::leave_room(room("ROOM02"))).await;

    assert_eq!(alice.room, Some(room("ROOM01")));
    assert_eq!(services::room::roster(&state, &room("ROOM01")).await, users(&["alice"]));
}

#[tokio::test]
async fn disconnect_cleanup_parts_the_room() {
    let state = test_app_state();
    let (mut alice, _rx_alice) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;

    leave_current_room(&state, &mut alice).await;

    assert!(state.rooms.read().await.is_empty());
}

// =============================================================================
// RELAY
// =============================================================================

#[tokio::test]
async fn draw_is_relayed_to_peers_but_not_sender() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ABC123"), "bob")).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    let frame = Frame::draw(room("ABC123"), red_segment());
    send(&state, &mut alice, frame.clone()).await;

    assert_eq!(recv(&mut rx_bob).await, frame);
    assert_no_frame(&mut rx_alice).await;
}

#[tokio::test]
async fn clear_and_chat_are_relayed() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ABC123"), "bob")).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    let chat = Frame::chat(room("ABC123"), ChatMessage::new("u-alice", "alice", "hello"));
    send(&state, &mut alice, Frame::clear(room("ABC123"))).await;
    send(&state, &mut alice, chat.clone()).await;

    assert_eq!(recv(&mut rx_bob).await, Frame::clear(room("ABC123")));
    assert_eq!(recv(&mut rx_bob).await, chat);
}

#[tokio::test]
async fn frames_for_unjoined_room_are_dropped() {
    let state = test_app_state();
    let (mut alice, _rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ROOM01"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ROOM02"), "bob")).await;
    drain(&mut rx_bob);

    send(&state, &mut alice, Frame::draw(room("ROOM02"), red_segment())).await;

    assert_no_frame(&mut rx_bob).await;
}

#[tokio::test]
async fn malformed_and_server_only_frames_are_ignored() {
    let state = test_app_state();
    let (mut alice, mut rx_alice) = connect(&state);
    let (mut bob, mut rx_bob) = connect(&state);
    send(&state, &mut alice, Frame::join_room(room("ABC123"), "alice")).await;
    send(&state, &mut bob, Frame::join_room(room("ABC123"), "bob")).await;
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    process_inbound(&state, &mut alice, frames::decode_frame("{not json")).await;
    send(&state, &mut alice, Frame::user_joined("mallory")).await;

    assert_no_frame(&mut rx_bob).await;
    assert_eq!(alice.room, Some(room("ABC123")));
}

// =============================================================================
// END TO END
// =============================================================================

type Client = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = crate::routes::app(test_app_state());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("ws://{addr}/ws")
}

async fn ws_connect(url: &str) -> Client {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.expect("connect");
    stream
}

async fn ws_send(client: &mut Client, frame: &Frame) {
    let text = frames::encode_frame(frame).expect("encode");
    client.send(WsMessage::text(text)).await.expect("send");
}

async fn ws_recv(client: &mut Client) -> Frame {
    loop {
        let msg = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("receive timed out")
            .expect("stream ended")
            .expect("ws error");
        if let WsMessage::Text(text) = msg {
            return frames::decode_frame(text.as_str()).expect("decode");
        }
    }
}

/// Read frames until one matches `pred`.
async fn ws_recv_until(client: &mut Client, pred: impl Fn(&Frame) -> bool) -> Frame {
    loop {
        let frame = ws_recv(client).await;
        if pred(&frame) {
            return frame;
        }
    }
}

#[tokio::test]
async fn draw_travels_between_two_websocket_clients() {
    let url = spawn_server().await;
    let mut a = ws_connect(&url).await;
    let mut b = ws_connect(&url).await;

    ws_send(&mut a, &Frame::join_room(room("ABC123"), "alice")).await;
    ws_recv_until(&mut a, |f| matches!(f, Frame::RoomUsers(_))).await;
    ws_send(&mut b, &Frame::join_room(room("abc123"), "bob")).await;
    ws_recv_until(&mut b, |f| matches!(f, Frame::RoomUsers(_))).await;
    ws_recv_until(&mut a, |f| matches!(f, Frame::RoomUsers(r) if r.users.len() == 2)).await;

    let draw = Frame::draw(room("ABC123"), red_segment());
    ws_send(&mut a, &draw).await;

    assert_eq!(ws_recv(&mut b).await, draw);
}

#[tokio::test]
async fn healthz_route_is_registered() {
    let url = spawn_server().await;
    let addr = url.trim_start_matches("ws://").trim_end_matches("/ws");
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    tokio::io::AsyncWriteExt::write_all(&mut stream, b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response).await.expect("read");
    assert!(response.starts_with("HTTP/1.1 200"), "unexpected response: {response}");
}
