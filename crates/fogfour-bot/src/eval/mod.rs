mod belief;
mod params;
mod position;

pub use belief::{NEGLIGIBLE_WEIGHT, belief_value, terminal_value};
pub use params::HeuristicParams;
pub use position::{has_double_threat, has_win_threat, position_value};
