use pokerfelt_client::events::ViewBus;
use pokerfelt_client::logging::LogCapture;
use pokerfelt_client::session::PokerSession;
use pokerfelt_client::transport::RecordingTransport;
use pokerfelt_table::protocol::ServerEvent;
use pokerfelt_table::snapshot::TableSnapshot;
use pokerfelt_table::view::SeatView;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;

fn payload() -> Value {
    json!({
        "tableId": "T1",
        "tableName": "Broken",
        "smallBlind": 10,
        "bigBlind": 20,
        "gameState": "betting",
        "seats": [
            {"username": "me", "chips": 380},
            {"username": "bob", "chips": 390},
            {"username": "cy", "chips": 400},
            null, null, null
        ],
        "players": [
            {"socketId": "me", "username": "me", "seat": 0, "chips": 380},
            {"socketId": "bob", "username": "bob", "seat": 1, "chips": 390},
            {"socketId": "cy", "username": "cy", "seat": 2, "chips": 400}
        ],
        "currentHand": {
            "pot": 30,
            "currentBet": 20,
            "communityCards": [],
            "currentPlayerIndex": 0,
            "players": [
                {"socketId": "me", "seat": 0, "chips": 380, "totalBetThisRound": 20, "cards": ["Ah", "Ad"]},
                {"socketId": "bob", "seat": 1, "chips": 390, "totalBetThisRound": 10, "cards": ["??", "??"]},
                {"socketId": "cy", "seat": 2, "chips": 400, "cards": ["??", "??", "??"]}
            ]
        }
    })
}

fn state(value: Value) -> ServerEvent {
    ServerEvent::PokerTableState(Arc::new(
        TableSnapshot::from_value(value).expect("snapshot"),
    ))
}

fn joined_session() -> PokerSession<RecordingTransport> {
    let mut session = PokerSession::with_bus(RecordingTransport::new(), ViewBus::new(), None);
    session.set_socket_id("me");
    session.join_table("T1", 400, None).expect("join");
    session
}

#[test]
fn broken_seat_is_logged_and_the_rest_render() {
    let logs = LogCapture::new();
    let registry = Registry::default().with(logs.clone());
    let mut session = joined_session();

    tracing::subscriber::with_default(registry, || {
        session.handle(state(payload()));
    });

    let view = session.view().expect("view rendered");
    assert_eq!(view.seats[2], SeatView::Unavailable);
    assert!(matches!(view.seats[0], SeatView::Occupied { is_me: true, .. }));
    assert!(matches!(view.seats[1], SeatView::Occupied { .. }));
    assert!(matches!(view.seats[3], SeatView::Empty { .. }));
    assert!(view.actions.affordances().is_some());

    let errors = logs.matching(Level::ERROR, "failed to render seat");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("seat"), Some("2"));
    assert_eq!(errors[0].field("table_id"), Some("T1"));
}

#[test]
fn whole_table_failure_keeps_last_good_view() {
    let logs = LogCapture::new();
    let registry = Registry::default().with(logs.clone());
    let mut session = joined_session();

    let mut overfull = payload();
    overfull["currentHand"]["communityCards"] = json!(["2h", "3h", "4h", "5h", "6h", "7h"]);

    tracing::subscriber::with_default(registry, || {
        session.handle(state(payload()));
        let good = session.view().cloned().expect("first render");
        session.handle(state(overfull));
        assert_eq!(session.view(), Some(&good));
    });

    assert_eq!(
        logs.matching(Level::ERROR, "failed to render table").len(),
        1
    );
    // The newer snapshot is still kept even though it could not be drawn.
    let hand = session
        .snapshot()
        .and_then(|s| s.current_hand.as_ref())
        .expect("hand");
    assert_eq!(hand.community_cards.len(), 6);
}
