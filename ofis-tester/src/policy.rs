use std::fmt;

use ofis_game::{Card, Effects, Resources};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Policy interface for automated play strategies.
pub trait DecisionPolicy {
    /// Name used for logging/report output.
    fn name(&self) -> &'static str;

    /// Decide the swipe for the presented card. Info cards take the value
    /// as an acknowledgment.
    fn decide(&mut self, resources: &Resources, card: &Card) -> bool;
}

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum PolicyKind {
    /// Swipe yes on everything
    Yes,
    /// Swipe no on everything
    No,
    /// Alternate yes and no
    Alternate,
    /// Seeded coin flip per card
    Random,
    /// Pick the branch projected to keep meters farthest from the bounds
    Careful,
}

impl PolicyKind {
    pub const ALL: [Self; 5] = [
        Self::Yes,
        Self::No,
        Self::Alternate,
        Self::Random,
        Self::Careful,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "always-yes",
            Self::No => "always-no",
            Self::Alternate => "alternate",
            Self::Random => "random",
            Self::Careful => "careful",
        }
    }

    #[must_use]
    pub fn create(self, seed: u64) -> Box<dyn DecisionPolicy> {
        match self {
            Self::Yes => Box::new(AlwaysPolicy(true)),
            Self::No => Box::new(AlwaysPolicy(false)),
            Self::Alternate => Box::new(AlternatePolicy { next_yes: true }),
            Self::Random => Box::new(RandomPolicy {
                rng: ChaCha20Rng::seed_from_u64(seed),
            }),
            Self::Careful => Box::new(CarefulPolicy),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct AlwaysPolicy(bool);

impl DecisionPolicy for AlwaysPolicy {
    fn name(&self) -> &'static str {
        if self.0 { "always-yes" } else { "always-no" }
    }

    fn decide(&mut self, _resources: &Resources, _card: &Card) -> bool {
        self.0
    }
}

struct AlternatePolicy {
    next_yes: bool,
}

impl DecisionPolicy for AlternatePolicy {
    fn name(&self) -> &'static str {
        "alternate"
    }

    fn decide(&mut self, _resources: &Resources, _card: &Card) -> bool {
        let choice = self.next_yes;
        self.next_yes = !self.next_yes;
        choice
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl DecisionPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, _resources: &Resources, _card: &Card) -> bool {
        self.rng.gen_bool(0.5)
    }
}

struct CarefulPolicy;

impl DecisionPolicy for CarefulPolicy {
    fn name(&self) -> &'static str {
        "careful"
    }

    fn decide(&mut self, resources: &Resources, card: &Card) -> bool {
        if card.is_info_only {
            return true;
        }
        let yes_risk = branch_risk(resources, card.yes_effects.as_ref());
        let no_risk = branch_risk(resources, card.no_effects.as_ref());
        yes_risk <= no_risk
    }
}

// Projected with the midpoint of the jitter ranges; close enough to rank
// two branches without simulating the draw.
const PROJECTION_SCALE: f32 = 0.575;
const PROJECTION_SCALE_COLLEAGUES: f32 = 0.425;
const DANGER_ZONE: f32 = 15.0;

fn branch_risk(resources: &Resources, effects: Option<&Effects>) -> f32 {
    let effects = effects.copied().unwrap_or_default();
    let projected = [
        (
            resources.motivation,
            effects.motivation,
            PROJECTION_SCALE,
        ),
        (
            resources.performance,
            effects.performance,
            PROJECTION_SCALE,
        ),
        (
            resources.colleagues,
            effects.colleagues,
            PROJECTION_SCALE_COLLEAGUES,
        ),
        (resources.boss, effects.boss, PROJECTION_SCALE),
    ];
    let mut risk = 0.0;
    for (current, base, scale) in projected {
        #[allow(clippy::cast_precision_loss)]
        let next = current + base as f32 * scale;
        let margin = next.min(100.0 - next);
        if margin < DANGER_ZONE {
            risk += DANGER_ZONE - margin;
        }
    }
    risk
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(yes: Effects, no: Effects) -> Card {
        Card {
            id: Some("TEST".to_string()),
            text: "test".to_string(),
            yes_effects: Some(yes),
            no_effects: Some(no),
            ..Card::default()
        }
    }

    #[test]
    fn alternate_flips_every_call() {
        let mut policy = PolicyKind::Alternate.create(0);
        let card = decision(Effects::default(), Effects::default());
        let resources = Resources::default();
        assert!(policy.decide(&resources, &card));
        assert!(!policy.decide(&resources, &card));
        assert!(policy.decide(&resources, &card));
    }

    #[test]
    fn random_policy_is_seed_deterministic() {
        let card = decision(Effects::default(), Effects::default());
        let resources = Resources::default();
        let mut left = PolicyKind::Random.create(42);
        let mut right = PolicyKind::Random.create(42);
        for _ in 0..32 {
            assert_eq!(
                left.decide(&resources, &card),
                right.decide(&resources, &card)
            );
        }
    }

    #[test]
    fn careful_policy_avoids_the_dangerous_branch() {
        let mut policy = PolicyKind::Careful.create(0);
        let resources = Resources {
            motivation: 12.0,
            ..Resources::default()
        };
        // yes pushes motivation toward the floor, no leaves it alone
        let card = decision(
            Effects {
                motivation: -10,
                ..Effects::default()
            },
            Effects::default(),
        );
        assert!(!policy.decide(&resources, &card));

        // with no danger either way the tie goes to yes
        let card = decision(Effects::default(), Effects::default());
        assert!(policy.decide(&Resources::default(), &card));
    }
}
