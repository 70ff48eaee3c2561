//! Next-card selection.
//!
//! Selection runs a fixed precedence: the hard-coded win-chance injection,
//! then ready delayed follow-ups, then a filtered draw from the regular
//! pool with reshuffle and relaxation fallbacks. Returning `None` is a
//! valid outcome (a calm day), never an error.

use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

use crate::constants::{COMPETITOR_OFFER_CARD_ID, WIN_GATE_DAY, WIN_GATE_FLOOR};
use crate::data::{Card, DeckData};
use crate::followup::{DelayedCard, FollowupQueues};
use crate::requirements::evaluate;
use crate::resources::{ResourceKey, Resources};

/// Runtime draw-pool state over the loaded deck: per-card use counts, the
/// indices still available this cycle, and the one-shot win-card flag.
#[derive(Debug, Clone)]
pub struct DeckState {
    cards: Vec<Card>,
    uses: Vec<u32>,
    available: Vec<usize>,
    win_card_shown: bool,
}

impl DeckState {
    #[must_use]
    pub fn new(data: &DeckData) -> Self {
        let cards = data.cards.clone();
        let uses = vec![0; cards.len()];
        let available = (0..cards.len()).collect();
        Self {
            cards,
            uses,
            available,
            win_card_shown: false,
        }
    }

    /// Full reshuffle: zero every use count, refill the pool from the whole
    /// deck, clear the win-card flag. Also used on restart.
    pub fn reset(&mut self) {
        for uses in &mut self.uses {
            *uses = 0;
        }
        self.available = (0..self.cards.len()).collect();
        self.win_card_shown = false;
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn uses_of(&self, id: &str) -> Option<u32> {
        let idx = self.cards.iter().position(|card| card.id_is(id))?;
        Some(self.uses[idx])
    }
}

/// Read-only session facts the selection pass needs.
pub struct SelectionContext<'a> {
    pub resources: &'a Resources,
    pub played: &'a HashSet<String>,
    pub previous_was_info: bool,
}

/// Produce the next card to present, or `None` for a calm day. The caller
/// must still advance the day with a no-op effect and re-query.
pub fn select_next<R: Rng>(
    ctx: &SelectionContext<'_>,
    deck: &mut DeckState,
    queues: &mut FollowupQueues,
    rng: &mut R,
) -> Option<Card> {
    if let Some(card) = try_win_chance(ctx, deck) {
        return Some(card);
    }
    if let Some(card) = try_ready_delayed(ctx, queues) {
        return Some(card);
    }
    draw_from_pool(ctx, deck, rng)
}

fn win_gate_open(resources: &Resources) -> bool {
    resources.day >= WIN_GATE_DAY
        && ResourceKey::METERS
            .iter()
            .all(|&key| resources.get(key) >= WIN_GATE_FLOOR)
}

fn try_win_chance(ctx: &SelectionContext<'_>, deck: &mut DeckState) -> Option<Card> {
    if deck.win_card_shown || !win_gate_open(ctx.resources) {
        return None;
    }
    let Some(idx) = deck
        .cards
        .iter()
        .position(|card| card.id_is(COMPETITOR_OFFER_CARD_ID))
    else {
        warn!("win gate open but the deck has no {COMPETITOR_OFFER_CARD_ID} card");
        return None;
    };
    if deck.uses[idx] >= deck.cards[idx].effective_max_uses() {
        debug!("win gate open but the win-chance card is spent this cycle");
        return None;
    }
    deck.uses[idx] += 1;
    deck.available.retain(|&i| i != idx);
    deck.win_card_shown = true;
    Some(deck.cards[idx].clone())
}

fn try_ready_delayed(ctx: &SelectionContext<'_>, queues: &mut FollowupQueues) -> Option<Card> {
    let day = ctx.resources.day;
    let ready = |entry: &DelayedCard| entry.show_on_day <= day;
    let parent_played = |entry: &DelayedCard| {
        entry
            .parent_card_id
            .as_ref()
            .is_some_and(|parent| ctx.played.contains(parent))
    };
    let parent_ok = |entry: &DelayedCard| {
        entry
            .parent_card_id
            .as_ref()
            .is_none_or(|parent| ctx.played.contains(parent))
    };

    // Follow-ups whose parent has been played come first.
    if let Some(idx) = queues
        .delayed
        .iter()
        .position(|entry| ready(entry) && parent_played(entry))
        && evaluate(queues.delayed[idx].card.requirements.as_ref(), ctx.resources)
    {
        return Some(queues.delayed.remove(idx).card);
    }

    if ctx.previous_was_info {
        // Avoid back-to-back info cards: prefer the first non-info entry.
        if let Some(idx) = queues
            .delayed
            .iter()
            .position(|entry| ready(entry) && !entry.card.is_info_only && parent_ok(entry))
            && evaluate(queues.delayed[idx].card.requirements.as_ref(), ctx.resources)
        {
            return Some(queues.delayed.remove(idx).card);
        }
    } else if let Some(idx) = queues
        .delayed
        .iter()
        .position(|entry| ready(entry) && parent_ok(entry))
        && evaluate(queues.delayed[idx].card.requirements.as_ref(), ctx.resources)
    {
        return Some(queues.delayed.remove(idx).card);
    }

    None
}

fn base_eligible(ctx: &SelectionContext<'_>, deck: &DeckState, idx: usize) -> bool {
    let card = &deck.cards[idx];
    deck.uses[idx] < card.effective_max_uses()
        && evaluate(card.requirements.as_ref(), ctx.resources)
        && card
            .parent_card_id
            .as_ref()
            .is_none_or(|parent| ctx.played.contains(parent))
}

fn draw_from_pool<R: Rng>(
    ctx: &SelectionContext<'_>,
    deck: &mut DeckState,
    rng: &mut R,
) -> Option<Card> {
    if deck.available.is_empty() {
        debug!("draw pool exhausted on day {}, reshuffling", ctx.resources.day);
        deck.reset();
    }

    let mut valid: Vec<usize> = deck
        .available
        .iter()
        .copied()
        .filter(|&idx| {
            base_eligible(ctx, deck, idx)
                && !(ctx.previous_was_info && deck.cards[idx].is_info_only)
        })
        .collect();

    if valid.is_empty() {
        debug!(
            "no eligible cards on day {}, reshuffling with relaxed info spacing",
            ctx.resources.day
        );
        deck.reset();
        let non_info_exists = deck
            .available
            .iter()
            .any(|&idx| base_eligible(ctx, deck, idx) && !deck.cards[idx].is_info_only);
        valid = deck
            .available
            .iter()
            .copied()
            .filter(|&idx| {
                base_eligible(ctx, deck, idx)
                    && (!ctx.previous_was_info
                        || !deck.cards[idx].is_info_only
                        || !non_info_exists)
            })
            .collect();
        if valid.is_empty() {
            return None;
        }
    }

    if ctx.previous_was_info && valid.iter().any(|&idx| !deck.cards[idx].is_info_only) {
        valid.retain(|&idx| !deck.cards[idx].is_info_only);
    }

    // Eligible follow-ups always win over fresh root-deck cards.
    let satisfied_followup = |idx: usize| {
        deck.cards[idx]
            .parent_card_id
            .as_ref()
            .is_some_and(|parent| ctx.played.contains(parent))
    };
    if valid.iter().any(|&idx| satisfied_followup(idx)) {
        valid.retain(|&idx| satisfied_followup(idx));
    }

    let pick = valid[rng.gen_range(0..valid.len())];
    deck.available.retain(|&idx| idx != pick);
    deck.uses[pick] += 1;
    Some(deck.cards[pick].clone())
}
