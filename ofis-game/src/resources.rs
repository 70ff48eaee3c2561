//! Resource ledger: four bounded meters plus the day counter.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    JITTER_RANGE_COLLEAGUES, JITTER_RANGE_DEFAULT, METER_MAX, METER_MIN, METER_START,
};
use crate::data::Effects;

/// Names a value a requirement leaf can compare against: one of the four
/// meters, or the day counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKey {
    Motivation,
    Performance,
    Colleagues,
    Boss,
    Day,
}

impl ResourceKey {
    pub const METERS: [Self; 4] = [
        Self::Motivation,
        Self::Performance,
        Self::Colleagues,
        Self::Boss,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Motivation => "motivation",
            Self::Performance => "performance",
            Self::Colleagues => "colleagues",
            Self::Boss => "boss",
            Self::Day => "day",
        }
    }

    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "motivation" => Some(Self::Motivation),
            "performance" => Some(Self::Performance),
            "colleagues" => Some(Self::Colleagues),
            "boss" => Some(Self::Boss),
            "day" => Some(Self::Day),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed post-clamp change per meter for one effect application, plus the
/// terminal flag. The host reads the deltas for stat-change feedback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectReport {
    pub motivation: f32,
    pub performance: f32,
    pub colleagues: f32,
    pub boss: f32,
    pub terminal: bool,
}

/// The four bounded meters and the day counter. Mutated only through
/// [`Resources::apply_effects`]; every meter stays in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub motivation: f32,
    pub performance: f32,
    pub colleagues: f32,
    pub boss: f32,
    pub day: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            motivation: METER_START,
            performance: METER_START,
            colleagues: METER_START,
            boss: METER_START,
            day: 1,
        }
    }
}

impl Resources {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get(&self, key: ResourceKey) -> f32 {
        match key {
            ResourceKey::Motivation => self.motivation,
            ResourceKey::Performance => self.performance,
            ResourceKey::Colleagues => self.colleagues,
            ResourceKey::Boss => self.boss,
            ResourceKey::Day => self.day as f32,
        }
    }

    /// True once any meter sits at its floor or ceiling.
    #[must_use]
    pub fn at_bound(&self) -> bool {
        ResourceKey::METERS.iter().any(|&key| {
            let value = self.get(key);
            value <= METER_MIN || value >= METER_MAX
        })
    }

    /// Apply one card's base effects. Each nonzero base magnitude is scaled
    /// by an independent uniform draw from its meter's jitter range, added,
    /// and clamped. The day advances by exactly 1 per call, effects or not.
    pub fn apply_effects<R: Rng>(&mut self, effects: Option<&Effects>, rng: &mut R) -> EffectReport {
        let mut report = EffectReport::default();
        if let Some(effects) = effects {
            report.motivation =
                nudge(&mut self.motivation, effects.motivation, JITTER_RANGE_DEFAULT, rng);
            report.performance =
                nudge(&mut self.performance, effects.performance, JITTER_RANGE_DEFAULT, rng);
            report.colleagues =
                nudge(&mut self.colleagues, effects.colleagues, JITTER_RANGE_COLLEAGUES, rng);
            report.boss = nudge(&mut self.boss, effects.boss, JITTER_RANGE_DEFAULT, rng);
        }
        self.day += 1;
        report.terminal = self.at_bound();
        report
    }
}

#[allow(clippy::cast_precision_loss)]
fn nudge<R: Rng>(meter: &mut f32, base: i32, range: (f32, f32), rng: &mut R) -> f32 {
    if base == 0 {
        return 0.0;
    }
    let delta = base as f32 * rng.gen_range(range.0..range.1);
    let old = *meter;
    *meter = (old + delta).clamp(METER_MIN, METER_MAX);
    *meter - old
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn meters_stay_clamped_under_any_sequence() {
        let mut state = Resources::default();
        let mut rng = rng();
        let swings = [
            Effects {
                motivation: -200,
                performance: 150,
                colleagues: -80,
                boss: 120,
            },
            Effects {
                motivation: 300,
                performance: -300,
                colleagues: 90,
                boss: -90,
            },
        ];
        for _ in 0..50 {
            for effects in &swings {
                state.apply_effects(Some(effects), &mut rng);
                for key in ResourceKey::METERS {
                    let value = state.get(key);
                    assert!((METER_MIN..=METER_MAX).contains(&value), "{key} = {value}");
                }
            }
        }
    }

    #[test]
    fn day_advances_once_per_application() {
        let mut state = Resources::default();
        let mut rng = rng();
        assert_eq!(state.day, 1);
        state.apply_effects(None, &mut rng);
        assert_eq!(state.day, 2);
        state.apply_effects(Some(&Effects::default()), &mut rng);
        assert_eq!(state.day, 3);
    }

    #[test]
    fn absent_effects_leave_meters_untouched() {
        let mut state = Resources::default();
        let mut rng = rng();
        let report = state.apply_effects(None, &mut rng);
        assert_eq!(report.motivation, 0.0);
        assert!(!report.terminal);
        assert_eq!(state.motivation, METER_START);
    }

    #[test]
    fn jitter_scales_within_the_declared_range() {
        let mut rng = rng();
        for _ in 0..200 {
            let mut state = Resources::default();
            let report = state.apply_effects(
                Some(&Effects {
                    motivation: -10,
                    colleagues: 10,
                    ..Effects::default()
                }),
                &mut rng,
            );
            assert!(report.motivation <= -10.0 * JITTER_RANGE_DEFAULT.0);
            assert!(report.motivation >= -10.0 * JITTER_RANGE_DEFAULT.1);
            assert!(report.colleagues >= 10.0 * JITTER_RANGE_COLLEAGUES.0);
            assert!(report.colleagues <= 10.0 * JITTER_RANGE_COLLEAGUES.1);
        }
    }

    #[test]
    fn identical_base_effects_produce_varying_deltas() {
        let mut state = Resources::default();
        let mut rng = rng();
        let effects = Effects {
            performance: 10,
            ..Effects::default()
        };
        let first = state.apply_effects(Some(&effects), &mut rng).performance;
        let second = state.apply_effects(Some(&effects), &mut rng).performance;
        assert_ne!(first, second);
    }

    #[test]
    fn crash_to_floor_reports_terminal() {
        let mut state = Resources::default();
        let mut rng = rng();
        let report = state.apply_effects(
            Some(&Effects {
                motivation: -100,
                ..Effects::default()
            }),
            &mut rng,
        );
        assert_eq!(state.motivation, METER_MIN);
        assert!(report.terminal);
        assert_eq!(state.day, 2);
        // actual delta is post-clamp
        assert_eq!(report.motivation, -METER_START);
    }
}
