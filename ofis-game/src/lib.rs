//! Ofis Game Engine
//!
//! Platform-agnostic core logic for Ofis, a workplace card-swipe survival
//! game. The player swipes through narrative cards; every decision nudges
//! four bounded meters (motivation, performance, colleagues, boss) until
//! one hits a bound or the competitor-offer storyline resolves into a win.
//! This crate provides deck loading, requirement evaluation, the resource
//! ledger, follow-up scheduling, card selection and the session controller,
//! without UI or platform-specific dependencies.

pub mod constants;
pub mod data;
pub mod followup;
pub mod outcome;
pub mod requirements;
pub mod resources;
pub mod seed;
pub mod selection;
pub mod session;

// Re-export commonly used types
pub use data::{Card, DeckData, Effects, FollowupSpec};
pub use followup::{DelayedCard, FollowupQueues};
pub use outcome::{Ending, ResultSummary, select_ending};
pub use requirements::{Comparison, GroupOp, RequirementNode, evaluate};
pub use resources::{EffectReport, ResourceKey, Resources};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use selection::{DeckState, SelectionContext, select_next};
pub use session::{GameSession, SessionError};

/// Trait for abstracting deck loading operations.
/// Platform-specific implementations should provide this.
pub trait DeckLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the card deck from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot be loaded or parsed. The engine
    /// treats this as fatal: a session never starts on an empty deck.
    fn load_deck(&self) -> Result<DeckData, Self::Error>;
}

/// Trait for abstracting personal-best persistence.
/// The engine only reports days survived; the host owns storage.
pub trait HighScoreStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the recorded personal best, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load_best(&self) -> Result<Option<u32>, Self::Error>;

    /// Persist a new personal best
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save_best(&self, days: u32) -> Result<(), Self::Error>;
}

/// Main game engine for managing game sessions
pub struct GameEngine<L, S>
where
    L: DeckLoader,
    S: HighScoreStore,
{
    deck_loader: L,
    store: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DeckLoader,
    S: HighScoreStore,
{
    /// Create a new game engine with the provided deck loader and store
    pub const fn new(deck_loader: L, store: S) -> Self {
        Self { deck_loader, store }
    }

    /// Load the deck and construct a fresh session for the given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the deck cannot be loaded or is empty.
    pub fn create_session(&self, seed: u64) -> Result<GameSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let data = self.deck_loader.load_deck().map_err(Into::into)?;
        GameSession::new(&data, seed).map_err(Into::into)
    }

    /// Record a finished session's days-survived against the personal best.
    /// Returns the new best when the run improved on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn finish_session(&self, session: &GameSession) -> Result<Option<u32>, anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let days = session.days_survived();
        let best = self.store.load_best().map_err(Into::into)?;
        if days > 0 && best.is_none_or(|best| days > best) {
            self.store.save_best(days).map_err(Into::into)?;
            return Ok(Some(days));
        }
        Ok(None)
    }
}
