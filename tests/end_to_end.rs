//! Chat screen flow over a mock transport.

mod common;

use akasys_client::transport::TransportEvent;
use akasys_client::{ChatSession, ConnectionState, Error, Origin};

use common::Harness;

/// Feeds every recorded manager event into `session` and clears the log.
fn pump(h: &Harness, session: &mut ChatSession) {
    for event in h.events.lock().drain(..) {
        session.apply(&event);
    }
}

#[test]
fn test_question_and_reply_round_trip() {
    let mut h = Harness::connected();
    let mut session = ChatSession::new();
    pump(&h, &mut session);
    assert!(session.input_enabled());

    let manager = &mut h.manager;
    session
        .submit("Oi", |message| manager.send(message))
        .expect("submit");
    assert!(session.is_pending());
    assert_eq!(h.writes(), [r#"{"pergunta_original":"Oi"}"#]);

    h.message(r#"{"pergunta_original":"Oi","answer":"Olá! Como posso ajudar?"}"#);
    pump(&h, &mut session);

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].origin, Origin::User);
    assert_eq!(entries[0].text, "Oi");
    assert_eq!(entries[1].origin, Origin::Bot);
    assert_eq!(entries[1].text, "Olá! Como posso ajudar?");
    assert!(!session.is_pending());
}

#[test]
fn test_submit_while_disconnected_leaves_transcript_empty() {
    let mut h = Harness::new();
    let mut session = ChatSession::new();
    assert!(!session.input_enabled());

    let manager = &mut h.manager;
    let result = session.submit("Oi", |message| manager.send(message));

    assert!(matches!(result, Err(Error::NotConnected { .. })));
    assert!(session.transcript().is_empty());
    assert!(!session.is_pending());
    assert!(h.writes().is_empty());
}

#[test]
fn test_malformed_reply_keeps_indicator_raised() {
    let mut h = Harness::connected();
    let mut session = ChatSession::new();
    pump(&h, &mut session);

    let manager = &mut h.manager;
    session
        .submit("Oi", |message| manager.send(message))
        .expect("submit");

    h.message("{broken");
    h.message(r#"{"pergunta_original":"Oi"}"#);
    pump(&h, &mut session);

    assert_eq!(session.transcript().len(), 1);
    assert!(session.is_pending());
}

#[test]
fn test_reconnect_disables_then_enables_input() {
    let mut h = Harness::connected();
    let mut session = ChatSession::new();
    pump(&h, &mut session);

    h.deliver(TransportEvent::closed(Some(1011), "server restart"));
    pump(&h, &mut session);
    assert_eq!(session.connection_state(), ConnectionState::Reconnecting);
    assert!(!session.input_enabled());

    h.fire_retry();
    h.open();
    pump(&h, &mut session);
    assert!(session.input_enabled());

    let manager = &mut h.manager;
    session
        .submit("Ainda aí?", |message| manager.send(message))
        .expect("submit after reconnect");
    assert_eq!(h.writes().len(), 1);
}

#[test]
fn test_transcript_survives_reconnect() {
    let mut h = Harness::connected();
    let mut session = ChatSession::new();

    let manager = &mut h.manager;
    session
        .submit("Oi", |message| manager.send(message))
        .expect("submit");
    h.message(r#"{"answer":"Olá!"}"#);
    h.closed();
    h.fire_retry();
    h.open();
    pump(&h, &mut session);

    assert_eq!(session.transcript().len(), 2);
    assert_eq!(
        session.transcript().last().map(|entry| entry.origin),
        Some(Origin::Bot)
    );
    assert_eq!(session.connection_state(), ConnectionState::Connected);
    assert!(h.events.lock().is_empty());
}
