//! One game's worth of belief tracking around a shared search engine.

use crate::search::{SearchEngine, SearchError};
use fogfour_core::belief::{BeliefError, BeliefState, OpponentModel};
use fogfour_core::model::board::Board;
use fogfour_core::model::player::Player;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("observation after ply {plies} matches no predicted world")]
    UnexpectedObservation { plies: usize },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Belief(#[from] BeliefError),
}

/// Plays the agent's side. Only the revealed part of any board passed in is used.
#[derive(Debug)]
pub struct Agent {
    engine: SearchEngine,
    belief: BeliefState,
}

impl Agent {
    pub fn new(engine: SearchEngine) -> Self {
        Self {
            engine,
            belief: BeliefState::initial(Player::Agent),
        }
    }

    pub fn from_env() -> Self {
        Self::new(SearchEngine::from_env())
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    /// Starts a new game. Memos and the search counter carry over.
    pub fn reset(&mut self, first_to_move: Player) {
        self.belief = BeliefState::initial(first_to_move);
    }

    pub fn choose_column(&mut self) -> Result<usize, AgentError> {
        Ok(self.engine.find_next_move(&self.belief)?)
    }

    /// Narrows the belief to what the agent saw after dropping into `col`.
    pub fn observe_own_move(&mut self, col: usize, actual: &Board) -> Result<(), AgentError> {
        let outcomes = self.belief.apply_own_move(col)?;
        self.belief = outcomes
            .resolve(actual)
            .ok_or(AgentError::UnexpectedObservation {
                plies: self.belief.plies(),
            })?;
        Ok(())
    }

    /// Narrows the belief after the opponent's reply.
    ///
    /// The engine's opponent model may rule the real reply out; the update is then redone
    /// assuming every column was possible.
    pub fn observe_opponent_move(&mut self, actual: &Board) -> Result<(), AgentError> {
        let predicted = self.belief.predict_with(self.engine.model())?;
        if let Some(belief) = predicted.resolve(actual) {
            self.belief = belief;
            return Ok(());
        }

        if tracing::enabled!(Level::DEBUG) {
            event!(
                target: "fogfour_bot::agent",
                Level::DEBUG,
                plies = self.belief.plies(),
                worlds = self.belief.len(),
                "opponent reply was not predicted; retrying with uniform replies"
            );
        }
        let fallback = self.belief.predict_with(&OpponentModel::Uniform)?;
        self.belief = fallback
            .resolve(actual)
            .ok_or(AgentError::UnexpectedObservation {
                plies: self.belief.plies(),
            })?;
        Ok(())
    }
}
