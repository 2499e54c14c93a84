use pokerfelt_client::events::{Screen, Slice, ViewBus, ViewEvent};
use pokerfelt_client::session::PokerSession;
use pokerfelt_client::transport::{RecordingTransport, SocketHandle};
use pokerfelt_table::lobby::CreateTableForm;
use pokerfelt_table::protocol::{ClientEvent, JoinTableRequest, ServerEvent, TableRef};

fn form() -> CreateTableForm {
    CreateTableForm {
        table_name: "Scenario".into(),
        small_blind: 10,
        big_blind: 20,
        min_buy_in: 400,
        max_buy_in: 2000,
        is_private: false,
    }
}

#[test]
fn created_table_is_joined_with_min_buy_in() {
    let transport = RecordingTransport::new();
    let mut session = PokerSession::with_bus(transport.clone(), ViewBus::new(), None);

    session.create_table(&form()).expect("create");
    assert_eq!(session.pending_buy_in(), Some(400));
    match transport.take().as_slice() {
        [ClientEvent::CreatePokerTable(req)] => {
            assert_eq!(req.small_blind, 10);
            assert_eq!(req.big_blind, 20);
            assert_eq!(req.min_buy_in, 400);
            assert_eq!(req.max_buy_in, 2000);
        }
        other => panic!("unexpected frames {:?}", other),
    }

    session.handle(ServerEvent::PokerTableCreated(TableRef {
        table_id: "T1".into(),
    }));

    assert_eq!(
        transport.take(),
        vec![ClientEvent::JoinPokerTable(JoinTableRequest {
            table_id: "T1".into(),
            buy_in: 400,
            seat: None,
        })]
    );
    assert_eq!(session.pending_buy_in(), None);
    assert_eq!(session.current_table(), Some("T1"));

    // The stored buy-in is consumed once.
    session.handle(ServerEvent::PokerTableCreated(TableRef {
        table_id: "T2".into(),
    }));
    assert!(transport.sent().is_empty());
}

#[test]
fn invalid_form_sends_nothing() {
    let transport = RecordingTransport::new();
    let mut session = PokerSession::with_bus(transport.clone(), ViewBus::new(), None);
    let bad = CreateTableForm {
        big_blind: 25,
        ..form()
    };
    assert!(session.create_table(&bad).is_err());
    assert!(transport.sent().is_empty());
    assert_eq!(session.pending_buy_in(), None);
}

#[tokio::test]
async fn auto_join_over_shared_socket_reaches_the_table() {
    let (socket, mut wire) = SocketHandle::detached();
    let bus = ViewBus::new();
    let mut table_slice = bus.subscribe(Slice::Table);
    let mut inbound = socket.subscribe();
    let mut session = PokerSession::with_bus(socket.clone(), bus.clone(), None);

    socket.inject(r#"{"event":"connect","data":{"socketId":"me"}}"#);
    session.handle(inbound.recv().await.expect("connect"));
    assert_eq!(wire.recv().await, Some(ClientEvent::JoinPokerLobby));

    session.create_table(&form()).expect("create");
    assert!(matches!(
        wire.recv().await,
        Some(ClientEvent::CreatePokerTable(_))
    ));

    socket.inject(r#"{"event":"pokerTableCreated","data":{"tableId":"T1"}}"#);
    session.handle(inbound.recv().await.expect("created"));
    assert_eq!(
        wire.recv().await,
        Some(ClientEvent::JoinPokerTable(JoinTableRequest {
            table_id: "T1".into(),
            buy_in: 400,
            seat: None,
        }))
    );

    socket.inject(
        r#"{"event":"pokerTableState","data":{"tableId":"T1","tableName":"Scenario",
            "smallBlind":10,"bigBlind":20,"gameState":"waiting",
            "seats":[{"username":"me","chips":400},null,null,null,null,null],
            "players":[{"socketId":"me","username":"me","seat":0,"chips":400,"isActive":true}],
            "currentHand":null}"#,
    );
    session.handle(inbound.recv().await.expect("state"));

    assert_eq!(session.screen(), Screen::Table);
    assert_eq!(session.my_seat(), Some(0));
    assert_eq!(
        table_slice.receiver.recv().await,
        Some(ViewEvent::ScreenChanged(Screen::Table))
    );
    assert!(matches!(
        table_slice.receiver.recv().await,
        Some(ViewEvent::TableRendered(_))
    ));
}
