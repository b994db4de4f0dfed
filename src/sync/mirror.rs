//! A battle played over a `PeerSession`.
//!
//! Each instance owns its own side and keeps a mirror of the opponent built
//! from what the wire reports: name, base health and characters. The mirror
//! has no deck or hand. Remote plays are re-derived from the card id and
//! target alone, so the remote caster's elemental match is never applied
//! and neither costs nor card effects are mirrored.
//!
//! Remote plays are applied on receipt whatever the local turn state.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::battle::{Lineup, PlayerState, Target};
use crate::cards::ContentIndex;
use crate::core::{BattleConfig, Side};
use crate::rules::damage::{self, DamageReport};
use crate::rules::engine::resolve_play;
use crate::rules::{InvalidAction, PlayReport};

use super::message::SyncMessage;
use super::queue::QueueState;
use super::session::{PeerSession, SyncError};

const UNNAMED_OPPONENT: &str = "Opponent";

/// How a networked match ended, from this side's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Won,
    Lost,
}

/// Something the peer caused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetEvent {
    RemoteNamed(String),
    RemoteCharacters(Vec<String>),
    RemoteDeckCode(String),
    RemotePlayed {
        card_id: String,
        actor: usize,
        target: Target,
        /// `None` if the target slot was already empty here.
        damage: Option<DamageReport>,
    },
    /// The card id is not in the local content.
    UnknownCard(String),
    Emoji(String),
    /// The peer ended its turn; the local turn has begun.
    TurnStarted { turn: u32, drawn: Option<String> },
    GameOver(MatchOutcome),
    ConnectionLost,
}

/// A two-instance match seen from one side.
#[derive(Debug)]
pub struct NetMatch {
    session: PeerSession,
    /// Host is side A.
    side: Side,
    local: PlayerState,
    remote: PlayerState,
    config: BattleConfig,
    my_turn: bool,
    turn: u32,
    outcome: Option<MatchOutcome>,
    remote_deck_code: Option<String>,
    backlog: VecDeque<SyncMessage>,
    connection_reported: bool,
}

impl NetMatch {
    /// Exchange names, deck codes and characters, then start play.
    ///
    /// Waits for the peer's `NAME` and then its `CHARS` within the session's
    /// configured windows. A missed window is logged and play continues with
    /// a default name or an empty opposing lineup.
    pub fn handshake(
        mut session: PeerSession,
        local: PlayerState,
        deck_code: &str,
        index: &dyn ContentIndex,
        config: BattleConfig,
    ) -> Result<Self, SyncError> {
        session.send(&SyncMessage::Name(local.name.clone()))?;
        session.send(&SyncMessage::DeckCode(deck_code.to_string()))?;
        let ids = local.lineup.iter().map(|c| c.character().id.clone()).collect();
        session.send(&SyncMessage::Chars(ids))?;

        let is_host = session.is_host();
        let (name_wait, chars_wait) = (session.config().name_wait, session.config().chars_wait);
        let mut net = Self {
            session,
            side: if is_host { Side::A } else { Side::B },
            remote: PlayerState::new(UNNAMED_OPPONENT, &config),
            local,
            config,
            my_turn: is_host,
            turn: 1,
            outcome: None,
            remote_deck_code: None,
            backlog: VecDeque::new(),
            connection_reported: false,
        };

        if !net.await_handshake(name_wait, index, |m| matches!(m, SyncMessage::Name(_)))? {
            log::warn!("{}", SyncError::HandshakeTimeout("NAME"));
        }
        if !net.await_handshake(chars_wait, index, |m| matches!(m, SyncMessage::Chars(_)))? {
            log::warn!("{}", SyncError::HandshakeTimeout("CHARS"));
        }
        log::info!("{} vs {}", net.local.name, net.remote.name);

        if net.my_turn {
            net.start_turn();
        }
        Ok(net)
    }

    /// Consume messages until one matching `wanted` arrives or `wait`
    /// elapses. Handshake messages are applied as they come; anything else is
    /// kept for the first `pump`.
    fn await_handshake(
        &mut self,
        wait: Duration,
        index: &dyn ContentIndex,
        wanted: impl Fn(&SyncMessage) -> bool,
    ) -> Result<bool, SyncError> {
        let deadline = Instant::now() + wait;
        loop {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                return Ok(false);
            };
            let Some(message) = self.session.recv_timeout(left) else {
                if !self.session.is_connected() {
                    return Err(SyncError::ConnectionLost);
                }
                continue;
            };
            let found = wanted(&message);
            match message {
                SyncMessage::Name(_) | SyncMessage::Chars(_) | SyncMessage::DeckCode(_) => {
                    self.apply(message, index, &mut Vec::new());
                }
                other => self.backlog.push_back(other),
            }
            if found {
                return Ok(true);
            }
        }
    }

    #[must_use]
    pub fn local(&self) -> &PlayerState {
        &self.local
    }

    /// The opponent as last reported.
    #[must_use]
    pub fn remote(&self) -> &PlayerState {
        &self.remote
    }

    #[must_use]
    pub fn remote_deck_code(&self) -> Option<&str> {
        self.remote_deck_code.as_deref()
    }

    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        self.my_turn && self.outcome.is_none()
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Apply everything received so far without blocking.
    pub fn pump(&mut self, index: &dyn ContentIndex) -> Vec<NetEvent> {
        let mut messages: Vec<SyncMessage> = self.backlog.drain(..).collect();
        messages.extend(self.session.drain());
        self.apply_all(messages, index)
    }

    /// Wait one poll interval for the opponent, then apply what arrived.
    pub fn wait_for_opponent(&mut self, index: &dyn ContentIndex) -> Vec<NetEvent> {
        if self.backlog.is_empty() {
            if let Some(first) = self.session.poll() {
                self.backlog.push_back(first);
            }
        }
        self.pump(index)
    }

    fn apply_all(&mut self, messages: Vec<SyncMessage>, index: &dyn ContentIndex) -> Vec<NetEvent> {
        let mut events = Vec::new();
        for message in messages {
            self.apply(message, index, &mut events);
        }
        if self.session.inbound().state() == QueueState::Disconnected && !self.connection_reported {
            log::warn!("{}", SyncError::ConnectionLost);
            self.connection_reported = true;
            events.push(NetEvent::ConnectionLost);
        }
        events
    }

    fn apply(&mut self, message: SyncMessage, index: &dyn ContentIndex, events: &mut Vec<NetEvent>) {
        let event = match message {
            SyncMessage::Name(name) => {
                self.remote.name = name.clone();
                NetEvent::RemoteNamed(name)
            }
            SyncMessage::DeckCode(token) => {
                self.remote_deck_code = Some(token.clone());
                NetEvent::RemoteDeckCode(token)
            }
            SyncMessage::Chars(ids) => {
                self.remote.lineup = Lineup::new(ids.iter().filter_map(|id| {
                    let found = index.find_character_by_id(id);
                    if found.is_none() {
                        log::warn!("peer announced unknown character {id:?}");
                    }
                    found
                }));
                NetEvent::RemoteCharacters(ids)
            }
            SyncMessage::Play { card_id, actor, target } => {
                let event = self.apply_remote_play(card_id, actor, target, index);
                let was_over = self.outcome.is_some();
                if !was_over && self.local.is_defeated() {
                    log::info!("{}'s base falls", self.local.name);
                    self.outcome = Some(MatchOutcome::Lost);
                    events.push(event);
                    NetEvent::GameOver(MatchOutcome::Lost)
                } else {
                    event
                }
            }
            SyncMessage::Emoji(text) => NetEvent::Emoji(text),
            SyncMessage::EndTurn => {
                if self.outcome.is_some() {
                    return;
                }
                self.my_turn = true;
                self.turn += 1;
                let drawn = self.start_turn();
                NetEvent::TurnStarted { turn: self.turn, drawn }
            }
        };
        events.push(event);
    }

    fn apply_remote_play(&mut self, card_id: String, actor: usize, target: Target, index: &dyn ContentIndex) -> NetEvent {
        let Some(card) = index.find_card_by_id(&card_id) else {
            log::warn!("peer played unknown card {card_id:?}");
            return NetEvent::UnknownCard(card_id);
        };

        let report = damage::apply_damage(
            &mut self.local.base_health,
            &mut self.local.lineup,
            target,
            damage::base_damage(&card, false),
            card.is_magic(),
        );
        log::debug!("{} plays {card_id} at {target}", self.remote.name);

        NetEvent::RemotePlayed {
            card_id,
            actor,
            target,
            damage: report,
        }
    }

    /// Play a card locally and announce it.
    ///
    /// The play stands even if the announcement cannot be sent.
    pub fn play(&mut self, hand_index: usize, actor: usize, target: Target) -> Result<PlayReport, InvalidAction> {
        if self.outcome.is_some() {
            return Err(InvalidAction::GameOver);
        }
        if !self.my_turn {
            return Err(InvalidAction::NotYourTurn);
        }

        let report = resolve_play(self.side, &mut self.local, &mut self.remote, hand_index, actor, target)?;
        self.announce(SyncMessage::Play {
            card_id: report.card_id.clone(),
            actor,
            target,
        });

        if self.local.is_defeated() {
            self.outcome = Some(MatchOutcome::Lost);
        } else if self.remote.is_defeated() {
            self.outcome = Some(MatchOutcome::Won);
        }
        Ok(report)
    }

    /// Hand the turn to the peer. The turn counter moves on at once, so
    /// both peers agree on it.
    pub fn end_turn(&mut self) -> Result<(), InvalidAction> {
        if self.outcome.is_some() {
            return Err(InvalidAction::GameOver);
        }
        if !self.my_turn {
            return Err(InvalidAction::NotYourTurn);
        }
        self.announce(SyncMessage::EndTurn);
        self.my_turn = false;
        self.turn += 1;
        Ok(())
    }

    pub fn send_emoji(&mut self, text: &str) {
        self.announce(SyncMessage::Emoji(text.to_string()));
    }

    /// Close the connection. Local state stays readable.
    pub fn quit(&mut self) {
        self.session.shutdown();
    }

    fn announce(&mut self, message: SyncMessage) {
        if let Err(err) = self.session.send(&message) {
            log::warn!("could not send {message}: {err}");
        }
    }

    fn start_turn(&mut self) -> Option<String> {
        let drawn = if self.local.draw(1) == 1 {
            self.local.hand.back().map(|c| c.id().to_string())
        } else {
            None
        };
        self.local.regenerate(&self.config);
        drawn
    }
}
