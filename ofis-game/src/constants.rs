//! Centralized balance and tuning constants for the Ofis engine.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Meter bounds ---------------------------------------------------------------
pub(crate) const METER_MIN: f32 = 0.0;
pub(crate) const METER_MAX: f32 = 100.0;
pub(crate) const METER_START: f32 = 40.0;

// Effect jitter --------------------------------------------------------------
// Each nonzero base effect is scaled by a uniform draw from these ranges.
// Colleagues swings lower than the other meters.
pub(crate) const JITTER_RANGE_DEFAULT: (f32, f32) = (0.50, 0.65);
pub(crate) const JITTER_RANGE_COLLEAGUES: (f32, f32) = (0.35, 0.50);

// Win-chance gate ------------------------------------------------------------
pub(crate) const WIN_GATE_DAY: u32 = 70;
pub(crate) const WIN_GATE_FLOOR: f32 = 50.0;

// Narrative arc card ids -----------------------------------------------------
pub(crate) const COMPETITOR_OFFER_CARD_ID: &str = "COMPETITOR_JOB_OFFER";
pub(crate) const COUNTER_OFFER_CARD_ID: &str = "COUNTEROFFER";

// Follow-up scheduling -------------------------------------------------------
pub(crate) const DEFAULT_FOLLOWUP_DELAY: u32 = 1;
pub(crate) const DEFAULT_FOLLOWUP_MAX_USES: u32 = 1;
