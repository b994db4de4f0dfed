//! Peer sync tests over loopback TCP.
//!
//! These tests verify:
//! - Line framing and ordering across a real socket
//! - The handshake, including its timeouts
//! - Mirroring of remote plays and turn hand-over
//! - Teardown and connection-loss reporting

use std::io::Write;
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use magicwound::battle::{PlayerState, Target};
use magicwound::cards::{Card, Character, ContentIndex, ContentRegistry, Element, Rarity};
use magicwound::core::{BattleConfig, GameRng, SyncConfig};
use magicwound::deck::{Deck, DeckMode};
use magicwound::effects::EffectRegistry;
use magicwound::rules::InvalidAction;
use magicwound::sync::{MatchOutcome, NetEvent, NetMatch, PeerListener, PeerSession, SyncMessage, MAX_LINE_BYTES};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_config() -> SyncConfig {
    SyncConfig::default()
        .poll_interval(Duration::from_millis(20))
        .name_wait(Duration::from_secs(5))
        .chars_wait(Duration::from_secs(5))
}

fn listen(config: SyncConfig) -> (PeerListener, u16) {
    let listener = PeerListener::bind("127.0.0.1:0", config).unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn content() -> ContentRegistry {
    let mut registry = ContentRegistry::new();
    registry.register_card(Card::new("blaze", "Blaze", Element::Fire, 3, Rarity::Common));
    for id in ["f1", "f2", "f3"] {
        registry.register_character(Character::new(id, id, Element::Fire, 20, 10));
    }
    registry
}

fn player(name: &str, seed: u64) -> PlayerState {
    player_with(name, seed, &BattleConfig::default())
}

fn player_with(name: &str, seed: u64, config: &BattleConfig) -> PlayerState {
    let registry = content();
    let mut deck = Deck::new(name, DeckMode::Casual);
    let blaze = registry.all_cards()[0].clone();
    for _ in 0..20 {
        deck.add_card(&blaze).unwrap();
    }
    let chars: Vec<String> = ["f1", "f2", "f3"].iter().map(|s| s.to_string()).collect();
    PlayerState::build(
        name,
        &deck,
        &chars,
        &registry,
        &EffectRegistry::standard(),
        &mut GameRng::new(seed),
        config,
    )
    .unwrap()
}

/// Poll until `done` holds for the events gathered so far, or give up.
fn collect_until(net: &mut NetMatch, done: impl Fn(&[NetEvent]) -> bool) -> Vec<NetEvent> {
    let registry = content();
    let mut events = Vec::new();
    for _ in 0..250 {
        events.extend(net.wait_for_opponent(&registry));
        if done(&events) {
            break;
        }
    }
    events
}

fn connected_pair() -> (NetMatch, NetMatch) {
    connected_pair_with(player("Client", 2))
}

fn connected_pair_with(client_side: PlayerState) -> (NetMatch, NetMatch) {
    let (listener, port) = listen(fast_config());
    let host = thread::spawn(move || {
        let session = listener.accept().unwrap();
        NetMatch::handshake(session, player("Host", 1), "host-code", &content(), BattleConfig::default()).unwrap()
    });

    let session = PeerSession::connect_as_client("127.0.0.1", port, fast_config()).unwrap();
    let client =
        NetMatch::handshake(session, client_side, "client-code", &content(), BattleConfig::default()).unwrap();
    (host.join().unwrap(), client)
}

#[test]
fn test_messages_arrive_in_order() {
    init_logging();
    let (listener, port) = listen(fast_config());
    let accept = thread::spawn(move || listener.accept().unwrap());
    let mut client = PeerSession::connect_as_client("127.0.0.1", port, fast_config()).unwrap();
    let host = accept.join().unwrap();

    let sent = vec![
        SyncMessage::Name("Client".into()),
        SyncMessage::Chars(vec!["f1".into(), "f2".into(), "f3".into()]),
        SyncMessage::Play {
            card_id: "blaze".into(),
            actor: 1,
            target: Target::Character(0),
        },
        SyncMessage::Emoji("gg; wp".into()),
        SyncMessage::EndTurn,
    ];
    for message in &sent {
        client.send(message).unwrap();
    }

    let mut received = Vec::new();
    while received.len() < sent.len() {
        match host.recv_timeout(Duration::from_secs(5)) {
            Some(message) => received.push(message),
            None => break,
        }
    }
    assert_eq!(received, sent);
    assert!(host.is_host());
    assert!(!client.is_host());
}

#[test]
fn test_partial_lines_are_reassembled() {
    init_logging();
    let (listener, port) = listen(fast_config());
    let mut raw = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let host = listener.accept().unwrap();

    raw.write_all(b"PLAY;bla").unwrap();
    raw.flush().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(host.drain().is_empty());

    raw.write_all(b"ze;0;b\nBOGUS;1\nENDTURN\r\n").unwrap();
    raw.flush().unwrap();

    assert_eq!(
        host.recv_timeout(Duration::from_secs(5)),
        Some(SyncMessage::Play {
            card_id: "blaze".into(),
            actor: 0,
            target: Target::Base,
        })
    );
    assert_eq!(host.recv_timeout(Duration::from_secs(5)), Some(SyncMessage::EndTurn));
}

#[test]
fn test_oversized_lines_are_dropped() {
    init_logging();
    let (listener, port) = listen(fast_config());
    let mut raw = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let host = listener.accept().unwrap();

    let writer = thread::spawn(move || {
        raw.write_all(&vec![b'x'; MAX_LINE_BYTES * 2]).unwrap();
        raw.write_all(b"\nENDTURN\n").unwrap();
        let longest = format!("EMOJI;{}\n", "y".repeat(MAX_LINE_BYTES - 7));
        raw.write_all(longest.as_bytes()).unwrap();
        raw.flush().unwrap();
        raw
    });

    assert_eq!(host.recv_timeout(Duration::from_secs(5)), Some(SyncMessage::EndTurn));
    let Some(SyncMessage::Emoji(text)) = host.recv_timeout(Duration::from_secs(5)) else {
        panic!("expected the longest allowed line to arrive");
    };
    assert_eq!(text.len(), MAX_LINE_BYTES - 7);
    assert!(host.is_connected());
    drop(writer.join().unwrap());
}

#[test]
fn test_shutdown_joins_and_peer_notices() {
    init_logging();
    let (listener, port) = listen(fast_config());
    let accept = thread::spawn(move || listener.accept().unwrap());
    let client = PeerSession::connect_as_client("127.0.0.1", port, fast_config()).unwrap();
    let mut host = accept.join().unwrap();

    host.shutdown();
    host.shutdown();
    assert!(!host.is_connected());
    assert!(host.send(&SyncMessage::EndTurn).is_err());

    assert_eq!(client.recv_timeout(Duration::from_secs(5)), None);
    assert!(!client.is_connected());
}

#[test]
fn test_handshake_exchanges_identities() {
    init_logging();
    let (host, client) = connected_pair();

    assert_eq!(host.remote().name, "Client");
    assert_eq!(client.remote().name, "Host");
    assert_eq!(host.remote_deck_code(), Some("client-code"));
    assert_eq!(client.remote().lineup.len(), 3);

    assert!(host.is_my_turn());
    assert!(!client.is_my_turn());
    assert_eq!(host.local().hand.len(), 4);
    assert_eq!(client.local().hand.len(), 3);
}

#[test]
fn test_remote_play_is_mirrored_without_elemental_bonus() {
    init_logging();
    let (mut host, mut client) = connected_pair();

    // Arrange: the host's Fire caster matches the Fire card
    let report = host.play(0, 0, Target::Base).unwrap();
    assert!(report.elemental_match);
    assert_eq!(host.remote().base_health, 44);

    // Act
    let events = collect_until(&mut client, |e| e.iter().any(|e| matches!(e, NetEvent::RemotePlayed { .. })));

    // Assert: the receiver only knows the card, so it applies 3
    assert!(events.iter().any(|e| matches!(
        e,
        NetEvent::RemotePlayed { card_id, target: Target::Base, .. } if card_id == "blaze"
    )));
    assert_eq!(client.local().base_health, 47);
    assert_eq!(client.play(0, 0, Target::Base), Err(InvalidAction::NotYourTurn));
}

#[test]
fn test_end_turn_hands_over() {
    init_logging();
    let (mut host, mut client) = connected_pair();

    host.end_turn().unwrap();
    assert!(!host.is_my_turn());
    assert_eq!(host.end_turn(), Err(InvalidAction::NotYourTurn));

    let events = collect_until(&mut client, |e| e.iter().any(|e| matches!(e, NetEvent::TurnStarted { .. })));
    assert!(events.contains(&NetEvent::TurnStarted {
        turn: 2,
        drawn: Some("blaze".into()),
    }));
    assert!(client.is_my_turn());
    assert_eq!(client.local().hand.len(), 4);

    client.send_emoji(":)");
    let events = collect_until(&mut host, |e| !e.is_empty());
    assert_eq!(events, vec![NetEvent::Emoji(":)".into())]);
}

#[test]
fn test_turn_counter_agrees_after_alternating_end_turns() {
    init_logging();
    let (mut host, mut client) = connected_pair();
    assert_eq!((host.turn(), client.turn()), (1, 1));

    host.end_turn().unwrap();
    assert_eq!(host.turn(), 2);
    collect_until(&mut client, |e| e.iter().any(|e| matches!(e, NetEvent::TurnStarted { .. })));
    assert_eq!(client.turn(), 2);

    client.end_turn().unwrap();
    assert_eq!(client.turn(), 3);
    let events = collect_until(&mut host, |e| e.iter().any(|e| matches!(e, NetEvent::TurnStarted { .. })));
    assert!(events.iter().any(|e| matches!(e, NetEvent::TurnStarted { turn: 3, .. })));
    assert_eq!(host.turn(), 3);
    assert!(host.is_my_turn());
}

#[test]
fn test_lethal_remote_play_ends_match() {
    init_logging();
    let weak = player_with("Client", 2, &BattleConfig::default().starting_base_health(6));
    let (mut host, mut client) = connected_pair_with(weak);

    for _ in 0..3 {
        host.play(0, 0, Target::Base).unwrap();
    }
    // the host's mirror tracks its own view of the client base
    assert_eq!(host.remote().base_health, 32);
    assert_eq!(host.outcome(), None);

    let events = collect_until(&mut client, |e| {
        e.iter().filter(|e| matches!(e, NetEvent::RemotePlayed { .. })).count() == 3
    });
    assert_eq!(
        events.iter().filter(|e| **e == NetEvent::GameOver(MatchOutcome::Lost)).count(),
        1
    );
    assert_eq!(client.local().base_health, -3);
    assert_eq!(client.outcome(), Some(MatchOutcome::Lost));
    assert_eq!(client.play(0, 0, Target::Base), Err(InvalidAction::GameOver));
}

#[test]
fn test_handshake_times_out_gracefully() {
    init_logging();
    let config = SyncConfig::default()
        .name_wait(Duration::from_millis(50))
        .chars_wait(Duration::from_millis(50));
    let (listener, port) = listen(config);
    let _silent = TcpStream::connect(("127.0.0.1", port)).unwrap();
    let session = listener.accept().unwrap();

    let net = NetMatch::handshake(session, player("Host", 1), "code", &content(), BattleConfig::default()).unwrap();

    assert_eq!(net.remote().name, "Opponent");
    assert!(net.remote().lineup.is_empty());
    assert!(net.is_my_turn());
}

#[test]
fn test_unknown_cards_and_connection_loss() {
    init_logging();
    let (listener, port) = listen(fast_config());
    let mut raw = TcpStream::connect(("127.0.0.1", port)).unwrap();
    raw.write_all(b"NAME;Raw\nCHARS;f1,ghost\nPLAY;ghost;0;b\nPLAY;blaze;1;t0\n").unwrap();
    raw.flush().unwrap();
    let session = listener.accept().unwrap();

    let mut net = NetMatch::handshake(session, player("Host", 1), "code", &content(), BattleConfig::default()).unwrap();
    assert_eq!(net.remote().lineup.len(), 1);

    let events = collect_until(&mut net, |e| e.len() >= 2);
    assert_eq!(events[0], NetEvent::UnknownCard("ghost".into()));
    assert!(matches!(
        &events[1],
        NetEvent::RemotePlayed { target: Target::Character(0), damage: Some(_), .. }
    ));

    drop(raw);
    let events = collect_until(&mut net, |e| e.contains(&NetEvent::ConnectionLost));
    assert_eq!(events.iter().filter(|e| **e == NetEvent::ConnectionLost).count(), 1);
    assert!(net.wait_for_opponent(&content()).is_empty());

    // local play continues without a peer
    assert!(net.play(0, 0, Target::Base).is_ok());
}
