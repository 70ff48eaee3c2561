//! Turn orchestration: one session from first card to ending.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::{COMPETITOR_OFFER_CARD_ID, COUNTER_OFFER_CARD_ID};
use crate::data::{Card, DeckData};
use crate::followup::FollowupQueues;
use crate::outcome::{Ending, ResultSummary, select_ending};
use crate::requirements::evaluate;
use crate::resources::{EffectReport, Resources};
use crate::selection::{DeckState, SelectionContext, select_next};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("deck contains no cards")]
    EmptyDeck,
}

/// The competitor-offer storyline as an explicit state machine. Two cards
/// drive it: accepting the offer wins outright unless a counter-offer is
/// queued for the same turn, and walking out despite the counter wins too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum NarrativeArc {
    #[default]
    Idle,
    /// The offer card is on the table.
    Offered,
    /// The offer was accepted but an immediate counter-offer intervened.
    Countered,
    /// The arc has played out, as a win or a return to normal play.
    Resolved,
}

impl NarrativeArc {
    fn offer_presented(&mut self) {
        if matches!(self, Self::Idle) {
            *self = Self::Offered;
        }
    }

    /// Returns true when accepting the offer ends the game in a win.
    fn offer_accepted(&mut self, countered: bool) -> bool {
        *self = if countered {
            Self::Countered
        } else {
            Self::Resolved
        };
        !countered
    }

    fn offer_declined(&mut self) {
        *self = Self::Resolved;
    }

    /// Returns true when the player leaves despite the counter-offer.
    fn counter_resolved(&mut self, leaving: bool) -> bool {
        *self = Self::Resolved;
        leaving
    }
}

/// One game session: owns all mutable state and the seeded generator.
///
/// The presentation layer drives it through [`GameSession::begin`],
/// [`GameSession::current_card`] and [`GameSession::apply_choice`]; for an
/// info card the choice value is just an acknowledgment.
#[derive(Debug, Clone)]
pub struct GameSession {
    resources: Resources,
    deck: DeckState,
    queues: FollowupQueues,
    played: HashSet<String>,
    current: Option<Card>,
    previous_was_info: bool,
    arc: NarrativeArc,
    ending: Option<Ending>,
    last_report: EffectReport,
    seed: u64,
    rng: ChaCha20Rng,
}

impl GameSession {
    /// Construct a session over a loaded deck.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyDeck`] when the deck has no cards; a
    /// session cannot start without one.
    pub fn new(data: &DeckData, seed: u64) -> Result<Self, SessionError> {
        if data.is_empty() {
            return Err(SessionError::EmptyDeck);
        }
        Ok(Self {
            resources: Resources::default(),
            deck: DeckState::new(data),
            queues: FollowupQueues::new(),
            played: HashSet::new(),
            current: None,
            previous_was_info: false,
            arc: NarrativeArc::Idle,
            ending: None,
            last_report: EffectReport::default(),
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    /// Draw the opening card. Idempotent once a card is up.
    pub fn begin(&mut self) -> Option<&Card> {
        if self.ending.is_none() && self.current.is_none() {
            let card = self.next_card();
            self.set_current(card);
        }
        self.current.as_ref()
    }

    #[must_use]
    pub const fn current_card(&self) -> Option<&Card> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn resources(&self) -> &Resources {
        &self.resources
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.ending.is_some()
    }

    #[must_use]
    pub const fn ending(&self) -> Option<Ending> {
        self.ending
    }

    /// Post-clamp meter deltas from the most recent turn, for host feedback.
    #[must_use]
    pub const fn last_effect_report(&self) -> &EffectReport {
        &self.last_report
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Days survived so far; the day a run ends on does not count.
    #[must_use]
    pub const fn days_survived(&self) -> u32 {
        self.resources.day.saturating_sub(1)
    }

    #[must_use]
    pub const fn summary(&self) -> Option<ResultSummary> {
        match self.ending {
            Some(ending) => Some(ResultSummary {
                ending,
                days: self.days_survived(),
            }),
            None => None,
        }
    }

    /// Resolve the current card with the player's decision and advance one
    /// full turn. Returns the next card, or `None` when the game ended or
    /// the day turned out calm. No-op once the game is over.
    pub fn apply_choice(&mut self, is_yes: bool) -> Option<&Card> {
        if self.ending.is_some() {
            return None;
        }

        let Some(card) = self.current.take() else {
            // Calm day: the day still passes, then the selection engine is
            // re-queried directly.
            self.last_report = self.resources.apply_effects(None, &mut self.rng);
            let next = self.engine_draw();
            self.set_current(next);
            return self.current.as_ref();
        };

        // Walking out despite the counter-offer ends the game before any
        // effects apply.
        if card.id_is(COUNTER_OFFER_CARD_ID) && self.arc.counter_resolved(is_yes) {
            self.ending = Some(Ending::Victory);
            return None;
        }

        let report = self
            .resources
            .apply_effects(card.branch_effects(is_yes), &mut self.rng);
        self.last_report = report;

        let spec = if card.is_info_only {
            card.followup_spec()
        } else {
            card.branch_followup_spec(is_yes)
        };
        if let Some(spec) = spec {
            self.queues.queue(
                spec,
                None,
                card.id.as_deref(),
                self.resources.day,
                &mut self.rng,
            );
        }

        if card.id_is(COMPETITOR_OFFER_CARD_ID) {
            if is_yes {
                let countered = self
                    .queues
                    .immediate
                    .iter()
                    .any(|queued| queued.id_is(COUNTER_OFFER_CARD_ID));
                if self.arc.offer_accepted(countered) {
                    self.ending = Some(Ending::Victory);
                    return None;
                }
            } else {
                self.arc.offer_declined();
            }
        }

        if let Some(id) = card.id.clone() {
            self.played.insert(id);
        }

        if report.terminal {
            self.ending = select_ending(&self.resources);
            return None;
        }

        self.previous_was_info = card.is_info_only;
        let next = self.next_card();
        self.set_current(next);
        self.current.as_ref()
    }

    /// Reset every piece of run state, replaying the same seed.
    pub fn restart(&mut self) {
        self.resources = Resources::default();
        self.deck.reset();
        self.queues.clear();
        self.played.clear();
        self.current = None;
        self.previous_was_info = false;
        self.arc = NarrativeArc::Idle;
        self.ending = None;
        self.last_report = EffectReport::default();
        self.rng = ChaCha20Rng::seed_from_u64(self.seed);
    }

    /// Deterministically reseed the session for the next restart.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }

    /// Next-card precedence: eligible immediate follow-ups, then due
    /// delayed entries, then the selection engine's regular draw.
    fn next_card(&mut self) -> Option<Card> {
        if let Some(idx) = self.queues.immediate.iter().position(|card| {
            card.parent_card_id
                .as_ref()
                .is_none_or(|parent| self.played.contains(parent))
                && evaluate(card.requirements.as_ref(), &self.resources)
        }) {
            return Some(self.queues.immediate.remove(idx));
        }

        if let Some(idx) = self.queues.delayed.iter().position(|entry| {
            entry.show_on_day <= self.resources.day
                && entry
                    .parent_card_id
                    .as_ref()
                    .is_none_or(|parent| self.played.contains(parent))
                && evaluate(entry.card.requirements.as_ref(), &self.resources)
        }) {
            return Some(self.queues.delayed.remove(idx).card);
        }

        self.engine_draw()
    }

    fn engine_draw(&mut self) -> Option<Card> {
        let ctx = SelectionContext {
            resources: &self.resources,
            played: &self.played,
            previous_was_info: self.previous_was_info,
        };
        select_next(&ctx, &mut self.deck, &mut self.queues, &mut self.rng)
    }

    fn set_current(&mut self, card: Option<Card>) {
        if card
            .as_ref()
            .is_some_and(|card| card.id_is(COMPETITOR_OFFER_CARD_ID))
        {
            self.arc.offer_presented();
        }
        self.current = card;
    }
}
