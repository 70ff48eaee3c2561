use serde::{Deserialize, Serialize};

use crate::requirements::RequirementNode;

/// Base effect magnitudes applied when a card is resolved.
///
/// These are pre-jitter values straight from the deck; the ledger scales
/// each one by a per-meter random multiplier before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Effects {
    #[serde(default)]
    pub motivation: i32,
    #[serde(default)]
    pub performance: i32,
    #[serde(default)]
    pub colleagues: i32,
    #[serde(default)]
    pub boss: i32,
}

impl Effects {
    /// True when every base magnitude is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.motivation == 0 && self.performance == 0 && self.colleagues == 0 && self.boss == 0
    }
}

/// One unit of narrative content: either an info card (acknowledge only,
/// single `effects`/`followup` path) or a decision card (`yesEffects` /
/// `noEffects` with independent follow-up chains).
///
/// Field names follow the external `deck.json` schema, hence camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Required for any card that participates in follow-up gating or the
    /// win path; plain filler cards may omit it.
    #[serde(default)]
    pub id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub yes_text: Option<String>,
    #[serde(default)]
    pub no_text: Option<String>,
    #[serde(default)]
    pub is_info_only: bool,
    #[serde(default)]
    pub effects: Option<Effects>,
    #[serde(default)]
    pub yes_effects: Option<Effects>,
    #[serde(default)]
    pub no_effects: Option<Effects>,
    #[serde(default)]
    pub requirements: Option<RequirementNode>,
    /// Draw budget per reshuffle cycle. Missing means unlimited for root
    /// deck cards; follow-up instances default to 1 when queued.
    #[serde(default)]
    pub max_uses: Option<u32>,
    /// Weight used when this card sits in a follow-up candidate list.
    #[serde(default)]
    pub probability: Option<f32>,
    /// Days until this card surfaces once queued. 0 means same turn.
    #[serde(default)]
    pub delay: Option<u32>,
    /// Stamped onto follow-up instances; may also be authored directly to
    /// gate a root deck card on another card having been played.
    #[serde(default)]
    pub parent_card_id: Option<String>,
    #[serde(default)]
    pub followup: Option<Box<Card>>,
    #[serde(default)]
    pub followups: Option<Vec<Card>>,
    #[serde(default)]
    pub yes_followup: Option<Box<Card>>,
    #[serde(default)]
    pub yes_followups: Option<Vec<Card>>,
    #[serde(default)]
    pub no_followup: Option<Box<Card>>,
    #[serde(default)]
    pub no_followups: Option<Vec<Card>>,
}

/// A card's declared follow-up specification: one concrete card, or a list
/// of candidates carrying optional `probability` weights.
#[derive(Debug, Clone, Copy)]
pub enum FollowupSpec<'a> {
    One(&'a Card),
    Many(&'a [Card]),
}

impl Card {
    /// Draw budget with the root-card default applied.
    #[must_use]
    pub fn effective_max_uses(&self) -> u32 {
        self.max_uses.unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn id_is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    /// Follow-up spec for an info card's single chain.
    #[must_use]
    pub fn followup_spec(&self) -> Option<FollowupSpec<'_>> {
        match (&self.followup, &self.followups) {
            (Some(card), _) => Some(FollowupSpec::One(card)),
            (None, Some(cards)) => Some(FollowupSpec::Many(cards)),
            (None, None) => None,
        }
    }

    /// Follow-up spec for the chosen branch of a decision card.
    #[must_use]
    pub fn branch_followup_spec(&self, is_yes: bool) -> Option<FollowupSpec<'_>> {
        let (single, list) = if is_yes {
            (&self.yes_followup, &self.yes_followups)
        } else {
            (&self.no_followup, &self.no_followups)
        };
        match (single, list) {
            (Some(card), _) => Some(FollowupSpec::One(card)),
            (None, Some(cards)) => Some(FollowupSpec::Many(cards)),
            (None, None) => None,
        }
    }

    /// Base effects for the resolved branch.
    #[must_use]
    pub fn branch_effects(&self, is_yes: bool) -> Option<&Effects> {
        if self.is_info_only {
            self.effects.as_ref()
        } else if is_yes {
            self.yes_effects.as_ref()
        } else {
            self.no_effects.as_ref()
        }
    }
}

/// Container for the full card deck as loaded from an external source.
/// The on-disk format is a bare JSON array of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DeckData {
    pub cards: Vec<Card>,
}

impl DeckData {
    /// Create an empty deck (useful for tests)
    #[must_use]
    pub const fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// Load deck data from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid card data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create deck data from pre-parsed cards
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id_is(id))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_parses_decision_card_from_json() {
        let json = r#"[
            {
                "id": "OVERTIME_REQUEST",
                "text": "Your boss asks you to stay late again.",
                "yesEffects": { "boss": 8, "motivation": -6 },
                "noEffects": { "boss": -8, "colleagues": 3 }
            }
        ]"#;

        let deck = DeckData::from_json(json).unwrap();
        assert_eq!(deck.len(), 1);
        let card = deck.find("OVERTIME_REQUEST").unwrap();
        assert!(!card.is_info_only);
        assert_eq!(card.yes_effects.unwrap().boss, 8);
        assert_eq!(card.no_effects.unwrap().colleagues, 3);
        assert_eq!(card.effective_max_uses(), u32::MAX);
    }

    #[test]
    fn deck_parses_info_card_with_nested_followup() {
        let json = r#"[
            {
                "id": "REORG_RUMOR",
                "text": "Word spreads of a reorg.",
                "isInfoOnly": true,
                "effects": { "colleagues": -4 },
                "followup": {
                    "id": "REORG_ANNOUNCED",
                    "text": "The reorg is official.",
                    "isInfoOnly": true,
                    "delay": 3,
                    "effects": { "motivation": -5 }
                }
            }
        ]"#;

        let deck = DeckData::from_json(json).unwrap();
        let card = deck.find("REORG_RUMOR").unwrap();
        assert!(card.is_info_only);
        let Some(FollowupSpec::One(followup)) = card.followup_spec() else {
            panic!("expected single followup");
        };
        assert_eq!(followup.delay, Some(3));
    }

    #[test]
    fn branch_spec_prefers_single_over_list() {
        let mut card = Card {
            yes_followup: Some(Box::new(Card::default())),
            yes_followups: Some(vec![Card::default(), Card::default()]),
            ..Card::default()
        };
        assert!(matches!(
            card.branch_followup_spec(true),
            Some(FollowupSpec::One(_))
        ));
        card.yes_followup = None;
        assert!(matches!(
            card.branch_followup_spec(true),
            Some(FollowupSpec::Many(cards)) if cards.len() == 2
        ));
        assert!(card.branch_followup_spec(false).is_none());
    }

    #[test]
    fn branch_effects_follow_card_kind() {
        let info = Card {
            is_info_only: true,
            effects: Some(Effects {
                motivation: 2,
                ..Effects::default()
            }),
            ..Card::default()
        };
        assert_eq!(info.branch_effects(false).unwrap().motivation, 2);

        let decision = Card {
            yes_effects: Some(Effects {
                boss: 5,
                ..Effects::default()
            }),
            ..Card::default()
        };
        assert_eq!(decision.branch_effects(true).unwrap().boss, 5);
        assert!(decision.branch_effects(false).is_none());
    }
}
