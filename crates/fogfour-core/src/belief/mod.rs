//! Belief tracking for the partially observed board.
//!
//! This module is composed of:
//! - `mask`: which cells the agent has seen.
//! - `observation`: the key that separates indistinguishable successor worlds.
//! - `state`: weighted sets of candidate boards and the agent's own move update.
//! - `outcomes`: successor belief states bucketed by observation.
//! - `predict`: the opponent model and the belief update it drives.

mod mask;
mod observation;
mod outcomes;
mod predict;
mod state;

pub use mask::{MASK_BYTES, VisibilityMask};
pub use observation::ObservationKey;
pub use outcomes::Outcomes;
pub use predict::OpponentModel;
pub use state::{BeliefError, BeliefState, CanonicalOrder, PROBABILITY_EPSILON};
