//! End-of-session outcome selection.

use serde::{Deserialize, Serialize};

use crate::constants::{METER_MAX, METER_MIN};
use crate::resources::Resources;

/// How a session ended. Every meter boundary has its own ending; the
/// narrative arc contributes the single victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Motivation hit the floor: the player quit.
    Resignation,
    /// Motivation hit the ceiling: workaholic burnout.
    Burnout,
    /// Performance hit the floor: fired for underdelivering.
    Dismissal,
    /// Performance hit the ceiling: worked into exhaustion.
    Exhaustion,
    /// Colleagues hit the floor: isolated, resigned.
    Isolation,
    /// Colleagues hit the ceiling: the office became a social club.
    SocialClub,
    /// Boss hit the floor: fired after one clash too many.
    BossConflict,
    /// Boss hit the ceiling: favoritism backlash cost the job.
    Favoritism,
    /// The competitor-offer arc resolved into a new beginning.
    Victory,
}

impl Ending {
    #[must_use]
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Victory)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resignation => "resignation",
            Self::Burnout => "burnout",
            Self::Dismissal => "dismissal",
            Self::Exhaustion => "exhaustion",
            Self::Isolation => "isolation",
            Self::SocialClub => "social_club",
            Self::BossConflict => "boss_conflict",
            Self::Favoritism => "favoritism",
            Self::Victory => "victory",
        }
    }
}

impl std::fmt::Display for Ending {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select the loss ending for the first meter sitting at a bound, in the
/// fixed priority order motivation, performance, colleagues, boss (floor
/// before ceiling per meter). `None` while every meter is interior.
#[must_use]
pub fn select_ending(resources: &Resources) -> Option<Ending> {
    let checks = [
        (resources.motivation, Ending::Resignation, Ending::Burnout),
        (resources.performance, Ending::Dismissal, Ending::Exhaustion),
        (resources.colleagues, Ending::Isolation, Ending::SocialClub),
        (resources.boss, Ending::BossConflict, Ending::Favoritism),
    ];
    for (value, floor_ending, ceiling_ending) in checks {
        if value <= METER_MIN {
            return Some(floor_ending);
        }
        if value >= METER_MAX {
            return Some(ceiling_ending);
        }
    }
    None
}

/// Summary of a finished run for the host's result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: Ending,
    /// Days survived: the day counter minus the day the run ended on.
    pub days: u32,
}
