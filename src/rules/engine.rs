//! The turn state machine.
//!
//! ## Phases
//!
//! ```text
//! TurnStart -> DrawPhase -> ResourceRegen -> ActionLoop -> TurnEnd
//!     ^                                                      |
//!     +---------------- other side, turn + 1 ----------------+
//! ```
//!
//! `GameOver(winner)` is terminal. The engine parks in `ActionLoop` between
//! calls to [`TurnEngine::step`]; the other phases run inside a single call.
//!
//! ## Resolving a play
//!
//! 1. Validate the card, actor and target. Non-mages may only play Physical
//!    cards. A rejected action changes nothing.
//! 2. Pay the cost from the actor's energy, then base mana, then the actor's
//!    health.
//! 3. Base damage is `max(1, cost)`, doubled on an elemental match.
//! 4. Run the card's effect.
//! 5. Apply damage, promote the reserve, push overflow to the base.
//! 6. Discard the card and check both bases, the acting side first.

use crate::battle::{PlayerState, Target, FRONT_SLOTS};
use crate::core::{BattleConfig, Side, SidePair};
use crate::effects::{EffectContext, EffectOutcome};

use super::action::{Action, ActionRecord};
use super::damage::{self, DamageReport, Payment};

use thiserror::Error;

/// Where the state machine is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    TurnStart,
    DrawPhase,
    ResourceRegen,
    ActionLoop,
    TurnEnd,
    GameOver(Side),
}

/// Why an action was refused. The battle is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAction {
    #[error("the game is over")]
    GameOver,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("no card at hand index {0}")]
    NoSuchCard(usize),
    #[error("no character in front slot {0}")]
    NoSuchActor(usize),
    #[error("nothing to hit at {0}")]
    NoSuchTarget(Target),
    #[error("{character} cannot play the magic card {card}")]
    PhysicalOnly { character: String, card: String },
}

/// Everything that happened during one play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayReport {
    pub side: Side,
    pub card_id: String,
    pub actor: usize,
    pub payment: Payment,
    pub elemental_match: bool,
    /// Damage, magic flag and target after the card's effect.
    pub outcome: EffectOutcome,
    /// `None` if the target slot was empty by the time damage landed.
    pub damage: Option<DamageReport>,
}

/// The hand-over at the end of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    /// Side now on turn.
    pub active: Side,
    pub turn: u32,
    /// Card drawn in the new side's draw phase.
    pub drawn: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverCause {
    BaseDestroyed,
    Forfeit,
    DeckOut,
}

/// Result of a successful [`TurnEngine::step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    Played(PlayReport),
    TurnEnded(TurnReport),
    GameOver {
        winner: Side,
        cause: GameOverCause,
        /// The play that ended the game, if one did.
        play: Option<PlayReport>,
    },
}

/// Drives a two-sided battle.
#[derive(Clone, Debug)]
pub struct TurnEngine {
    players: SidePair<PlayerState>,
    config: BattleConfig,
    active: Side,
    turn: u32,
    phase: Phase,
    history: Vec<ActionRecord>,
}

impl TurnEngine {
    /// Start a battle between two prepared sides. Side A takes turn 1, which
    /// runs its draw and regeneration immediately.
    #[must_use]
    pub fn new(players: SidePair<PlayerState>, config: BattleConfig) -> Self {
        let mut engine = Self {
            players,
            config,
            active: Side::A,
            turn: 1,
            phase: Phase::TurnStart,
            history: Vec::new(),
        };
        engine.begin_turn();
        engine
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active(&self) -> Side {
        self.active
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    #[must_use]
    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side]
    }

    /// Direct access to one side, for scripted setups.
    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        &mut self.players[side]
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::GameOver(winner) => Some(winner),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }

    /// Accepted actions, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// Every action the active side may take right now.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.phase != Phase::ActionLoop {
            return Vec::new();
        }
        let (me, opponent) = (&self.players[self.active], &self.players[self.active.opponent()]);

        let mut targets = vec![Target::Base];
        targets.extend((0..FRONT_SLOTS).filter(|&s| opponent.lineup.front(s).is_some()).map(Target::Character));

        let mut actions = Vec::new();
        for (hand_index, card) in me.hand.iter().enumerate() {
            for actor in 0..FRONT_SLOTS {
                let Some(state) = me.lineup.front(actor) else {
                    continue;
                };
                if card.card.is_magic() && !state.is_mage() {
                    continue;
                }
                actions.extend(targets.iter().map(|&target| Action::play(hand_index, actor, target)));
            }
        }
        actions.push(Action::EndTurn);
        actions.push(Action::Forfeit);
        actions
    }

    /// Apply one action for the active side.
    pub fn step(&mut self, action: Action) -> Result<EngineEvent, InvalidAction> {
        if self.is_over() {
            return Err(InvalidAction::GameOver);
        }

        match action {
            Action::Play {
                hand_index,
                actor,
                target,
            } => self.play(hand_index, actor, target),
            Action::EndTurn => {
                self.history.push(ActionRecord::new(self.active, action, self.turn));
                Ok(self.end_turn())
            }
            Action::Forfeit => {
                self.history.push(ActionRecord::new(self.active, action, self.turn));
                let winner = self.active.opponent();
                log::info!("{} forfeits", self.players[self.active].name);
                self.phase = Phase::GameOver(winner);
                Ok(EngineEvent::GameOver {
                    winner,
                    cause: GameOverCause::Forfeit,
                    play: None,
                })
            }
        }
    }

    fn play(&mut self, hand_index: usize, actor: usize, target: Target) -> Result<EngineEvent, InvalidAction> {
        let side = self.active;
        let (me, opponent) = self.players.split_mut(side);
        let play = match resolve_play(side, me, opponent, hand_index, actor, target) {
            Ok(play) => play,
            Err(rejected) => {
                log::debug!("rejected play: {rejected}");
                return Err(rejected);
            }
        };

        self.history.push(
            ActionRecord::new(side, Action::play(hand_index, actor, target), self.turn)
                .with_card(play.card_id.clone()),
        );

        match self.check_bases() {
            Some(winner) => Ok(EngineEvent::GameOver {
                winner,
                cause: GameOverCause::BaseDestroyed,
                play: Some(play),
            }),
            None => Ok(EngineEvent::Played(play)),
        }
    }

    /// The acting side's own base is checked first.
    fn check_bases(&mut self) -> Option<Side> {
        let loser = [self.active, self.active.opponent()]
            .into_iter()
            .find(|&side| self.players[side].is_defeated())?;
        let winner = loser.opponent();
        log::info!("{}'s base falls, {} wins", self.players[loser].name, self.players[winner].name);
        self.phase = Phase::GameOver(winner);
        Some(winner)
    }

    fn end_turn(&mut self) -> EngineEvent {
        self.phase = Phase::TurnEnd;
        self.active = self.active.opponent();
        self.turn += 1;

        let drawn = self.begin_turn();
        if let Phase::GameOver(winner) = self.phase {
            return EngineEvent::GameOver {
                winner,
                cause: GameOverCause::DeckOut,
                play: None,
            };
        }
        EngineEvent::TurnEnded(TurnReport {
            active: self.active,
            turn: self.turn,
            drawn,
        })
    }

    /// Run TurnStart, DrawPhase and ResourceRegen for the active side.
    fn begin_turn(&mut self) -> Option<String> {
        self.phase = Phase::TurnStart;
        log::debug!("turn {} for {}", self.turn, self.players[self.active].name);

        self.phase = Phase::DrawPhase;
        let player = &mut self.players[self.active];
        let drawn = if player.draw(1) == 1 {
            player.hand.back().map(|c| c.id().to_string())
        } else {
            None
        };
        if drawn.is_none() && self.config.deck_out_loses {
            log::info!("{} cannot draw and loses", player.name);
            self.phase = Phase::GameOver(self.active.opponent());
            return None;
        }

        self.phase = Phase::ResourceRegen;
        player.regenerate(&self.config);

        self.phase = Phase::ActionLoop;
        drawn
    }
}

fn validate(
    me: &PlayerState,
    opponent: &PlayerState,
    hand_index: usize,
    actor: usize,
    target: Target,
) -> Result<(), InvalidAction> {
    let card = me.hand.get(hand_index).ok_or(InvalidAction::NoSuchCard(hand_index))?;
    let caster = me.lineup.front(actor).ok_or(InvalidAction::NoSuchActor(actor))?;
    if let Target::Character(slot) = target {
        if opponent.lineup.front(slot).is_none() {
            return Err(InvalidAction::NoSuchTarget(target));
        }
    }
    if card.card.is_magic() && !caster.is_mage() {
        return Err(InvalidAction::PhysicalOnly {
            character: caster.character().name.clone(),
            card: card.card.name.clone(),
        });
    }
    Ok(())
}

/// Validate and resolve one play by `me` against `opponent`.
///
/// Does not check for a winner; callers inspect both bases afterwards.
pub(crate) fn resolve_play(
    side: Side,
    me: &mut PlayerState,
    opponent: &mut PlayerState,
    hand_index: usize,
    actor: usize,
    target: Target,
) -> Result<PlayReport, InvalidAction> {
    validate(me, opponent, hand_index, actor, target)?;

    let played = me.hand.remove(hand_index);
    let card = &played.card;
    let matched = me
        .lineup
        .front(actor)
        .is_some_and(|caster| damage::elemental_match(card, caster.character()));

    let payment = damage::pay_cost(me, actor, damage::play_cost(card));
    let pending = EffectOutcome {
        damage: damage::base_damage(card, matched),
        magic: card.is_magic(),
        target,
    };

    let outcome = match played.effect {
        Some(effect) => effect.resolve(&mut EffectContext {
            owner: &mut *me,
            opponent: &mut *opponent,
            actor,
            card,
            pending,
        }),
        None => pending,
    };

    let report = damage::apply_damage(
        &mut opponent.base_health,
        &mut opponent.lineup,
        outcome.target,
        outcome.damage,
        outcome.magic,
    );
    if report.is_none() {
        log::debug!("{} fizzled: {} is empty", card.id, outcome.target);
    }

    let card_id = card.id.clone();
    me.discard.push_back(played);
    log::debug!(
        "{} plays {card_id} for {} ({} {})",
        me.name,
        outcome.damage,
        if outcome.magic { "magic" } else { "physical" },
        outcome.target
    );

    Ok(PlayReport {
        side,
        card_id,
        actor,
        payment,
        elemental_match: matched,
        outcome,
        damage: report,
    })
}
