use futures_util::{SinkExt, StreamExt};
use pokerfelt_client::context::AppContext;
use pokerfelt_client::events::ViewBus;
use pokerfelt_client::logging::init_test_logging;
use pokerfelt_client::session::PokerSession;
use pokerfelt_client::settings::ClientSettings;
use pokerfelt_client::transport::{ReconnectPolicy, SocketHandle, Transport, recv_event};
use pokerfelt_table::protocol::{ClientEvent, ServerEvent};
use serial_test::serial;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::Level;
use warp::Filter;
use warp::ws::{Message, WebSocket};

const TABLES: &str = r#"{"event":"pokerTablesUpdate","data":[{"tableId":"poker_1","tableName":"Late",
    "gameState":"waiting","smallBlind":10,"bigBlind":20,"minBuyIn":400,"maxBuyIn":2000,
    "playerCount":1,"maxPlayers":6}]}"#;

const LOBBY: &str = r#"{"event":"joinPokerLobby"}"#;

/// Scripted table server. Connection N announces socket id `sock-N`. With
/// `hang_up`, the first connection answers the lobby join with one table and
/// then closes.
fn spawn_server(hang_up: bool) -> (SocketAddr, mpsc::UnboundedReceiver<(usize, String)>) {
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();
    let connections = Arc::new(AtomicUsize::new(0));

    let route = warp::path("ws").and(warp::ws()).map(move |ws: warp::ws::Ws| {
        let seen = seen_tx.clone();
        let n = connections.fetch_add(1, Ordering::SeqCst) + 1;
        ws.on_upgrade(move |socket| script(socket, n, hang_up, seen))
    });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, seen_rx)
}

async fn script(
    socket: WebSocket,
    n: usize,
    hang_up: bool,
    seen: mpsc::UnboundedSender<(usize, String)>,
) {
    let (mut tx, mut rx) = socket.split();
    let hello = format!(r#"{{"event":"connect","data":{{"socketId":"sock-{}"}}}}"#, n);
    if tx.send(Message::text(hello)).await.is_err() {
        return;
    }
    while let Some(Ok(msg)) = rx.next().await {
        let Ok(text) = msg.to_str() else { continue };
        let _ = seen.send((n, text.to_string()));
        if hang_up && n == 1 && text.contains("joinPokerLobby") {
            let _ = tx.send(Message::text(TABLES)).await;
            let _ = tx.send(Message::close()).await;
            break;
        }
    }
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        initial: Duration::from_millis(20),
        max: Duration::from_millis(100),
        jitter: 0.0,
        max_attempts: Some(10),
    }
}

async fn next_seen(rx: &mut mpsc::UnboundedReceiver<(usize, String)>) -> (usize, String) {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("server heard nothing")
        .expect("server gone")
}

#[tokio::test]
#[serial]
async fn reconnect_reannounces_lobby_membership() {
    let logs = init_test_logging();
    let (addr, mut seen) = spawn_server(true);

    let socket = SocketHandle::open(&format!("ws://{}/ws", addr), fast_policy()).expect("socket");
    let mut inbound = socket.subscribe();
    let mut session = PokerSession::with_bus(socket.clone(), ViewBus::new(), None);
    socket.start().expect("runtime");

    let mut connects = 0;
    let mut lobby_seen = false;
    while connects < 2 || !lobby_seen {
        let event = timeout(Duration::from_secs(5), recv_event(&mut inbound))
            .await
            .expect("event in time")
            .expect("socket open");
        match &event {
            ServerEvent::Connect { .. } => connects += 1,
            ServerEvent::PokerTablesUpdate(_) => lobby_seen = true,
            _ => {}
        }
        session.handle(event);
    }

    assert_eq!(next_seen(&mut seen).await, (1, LOBBY.to_string()));
    assert_eq!(next_seen(&mut seen).await, (2, LOBBY.to_string()));

    assert_eq!(session.socket_id(), Some("sock-2"));
    assert_eq!(socket.socket_id().as_deref(), Some("sock-2"));
    assert_eq!(session.lobby_rows().len(), 1);
    assert_eq!(session.lobby_rows()[0].status, "Open");

    assert!(logs.matching(Level::INFO, "socket connected").len() >= 2);
    socket.shutdown();
}

#[tokio::test]
#[serial]
async fn frames_emitted_before_the_link_is_up_are_delivered() {
    let _logs = init_test_logging();
    let (addr, mut seen) = spawn_server(true);

    let mut socket =
        SocketHandle::connect(&format!("ws://{}/ws", addr), fast_policy()).expect("socket");
    socket
        .emit(ClientEvent::JoinPokerLobby)
        .expect("queued while connecting");

    let (conn, frame) = next_seen(&mut seen).await;
    assert_eq!(conn, 1);
    assert_eq!(frame, LOBBY);
    socket.shutdown();
}

#[tokio::test]
#[serial]
async fn one_socket_serves_sessions_one_after_another() {
    let _logs = init_test_logging();
    let (addr, mut seen) = spawn_server(false);
    let ctx = AppContext::new(ClientSettings {
        server_url: format!("ws://{}/ws", addr),
        ..ClientSettings::default()
    })
    .expect("context");

    let socket = ctx.socket().expect("socket");
    let mut inbound = socket.subscribe();
    socket.start().expect("runtime");

    // Subscribed before the link started, so the greeting is not missed.
    let greeting = timeout(Duration::from_secs(5), recv_event(&mut inbound))
        .await
        .expect("event in time")
        .expect("socket open");
    assert!(matches!(&greeting, ServerEvent::Connect { socket_id } if socket_id == "sock-1"));

    let mut first = PokerSession::new(socket.clone(), &ctx);
    first.handle(greeting);
    assert_eq!(first.socket_id(), Some("sock-1"));
    assert_eq!(next_seen(&mut seen).await, (1, LOBBY.to_string()));
    first.destroy();

    // A later session on the same live socket never sees that connect.
    let second = PokerSession::new(ctx.socket().expect("socket"), &ctx);
    assert_eq!(second.socket_id(), Some("sock-1"));
    assert_eq!(next_seen(&mut seen).await, (1, LOBBY.to_string()));

    ctx.teardown();
    assert!(!socket.is_connected());
}
