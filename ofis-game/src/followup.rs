//! Follow-up resolution and scheduling.
//!
//! Resolving a card can declare a reaction: a single follow-up card or a
//! weighted list of candidates, surfacing either the same turn (delay 0)
//! or on a future day. Queued cards are fresh clones of their templates so
//! each scheduled appearance carries its own parent stamp and use budget.

use rand::Rng;
use smallvec::SmallVec;

use crate::constants::{DEFAULT_FOLLOWUP_DELAY, DEFAULT_FOLLOWUP_MAX_USES};
use crate::data::{Card, FollowupSpec};

/// A scheduled future appearance, kept sorted ascending by `show_on_day`.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedCard {
    pub card: Card,
    pub show_on_day: u32,
    pub parent_card_id: Option<String>,
}

/// The two follow-up pools: same-turn candidates and day-scheduled cards.
#[derive(Debug, Clone, Default)]
pub struct FollowupQueues {
    pub delayed: Vec<DelayedCard>,
    pub immediate: SmallVec<[Card; 2]>,
}

impl FollowupQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.delayed.clear();
        self.immediate.clear();
    }

    /// Resolve a follow-up spec into one concrete queued card.
    ///
    /// The winner is stamped with `parent_id`, gets the follow-up use
    /// budget if it has none, and is scheduled per its resolved delay:
    /// its own `delay` field, else `explicit_delay`, else one day. A
    /// nested `followup`/`followups` chain on the winner is queued
    /// recursively under the winner's own id.
    pub fn queue<R: Rng>(
        &mut self,
        spec: FollowupSpec<'_>,
        explicit_delay: Option<u32>,
        parent_id: Option<&str>,
        current_day: u32,
        rng: &mut R,
    ) {
        let Some(mut instance) = pick_candidate(spec, rng) else {
            return;
        };
        instance.parent_card_id = parent_id.map(str::to_string);
        if instance.max_uses.is_none() {
            instance.max_uses = Some(DEFAULT_FOLLOWUP_MAX_USES);
        }

        // Recurse before scheduling the winner itself, as the original
        // engine does; the chain is gated on the winner's id anyway.
        let nested_delay = instance.delay.or(explicit_delay);
        let nested_parent = instance.id.clone();
        if let Some(single) = instance.followup.take() {
            self.queue(
                FollowupSpec::One(&single),
                nested_delay,
                nested_parent.as_deref().or(parent_id),
                current_day,
                rng,
            );
        } else if let Some(list) = instance.followups.take() {
            self.queue(
                FollowupSpec::Many(&list),
                nested_delay,
                nested_parent.as_deref().or(parent_id),
                current_day,
                rng,
            );
        }
        // The taken fields stay cleared: the chain is scheduled now, so
        // resolving this instance later must not queue it a second time.

        let delay = instance.delay.or(explicit_delay).unwrap_or(DEFAULT_FOLLOWUP_DELAY);
        if delay == 0 {
            self.immediate.push(instance);
        } else {
            let parent_card_id = instance.parent_card_id.clone();
            self.delayed.push(DelayedCard {
                show_on_day: current_day + delay,
                parent_card_id,
                card: instance,
            });
            // stable sort: same-day entries keep insertion order
            self.delayed.sort_by_key(|entry| entry.show_on_day);
        }
    }
}

/// Pick one candidate from the spec: a weighted cumulative-sum draw when
/// the probabilities sum above zero, a uniform pick otherwise.
fn pick_candidate<R: Rng>(spec: FollowupSpec<'_>, rng: &mut R) -> Option<Card> {
    match spec {
        FollowupSpec::One(card) => Some(card.clone()),
        FollowupSpec::Many(cards) => {
            if cards.is_empty() {
                return None;
            }
            let weight = |card: &Card| card.probability.unwrap_or(0.0).max(0.0);
            let total: f32 = cards.iter().map(weight).sum();
            if total > 0.0 {
                let roll = rng.gen_range(0.0..total);
                let mut cumulative = 0.0;
                for card in cards {
                    cumulative += weight(card);
                    if roll < cumulative {
                        return Some(card.clone());
                    }
                }
            }
            let index = rng.gen_range(0..cards.len());
            Some(cards[index].clone())
        }
    }
}
