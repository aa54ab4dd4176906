use fogfour_core::model::board::{CELL_WEIGHTS, COLUMNS, ROWS};

/// Tunable constants of the position and belief evaluators.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicParams {
    /// Added when the evaluated side can complete four on its next move.
    pub win_threat_bonus: f64,
    /// Added when one playable cell opens two separate two-disc lines.
    pub double_threat_bonus: f64,
    /// Interpolation constant; empty neighbours of a disc count `1 / alpha` each.
    pub alpha: f64,
    /// Weight of each same-colour neighbour of a disc.
    pub neighbour_weight: f64,
    /// Magnitude of a finished game, scaled by the world's probability.
    pub terminal_value: f64,
    pub cell_weights: [[f64; COLUMNS]; ROWS],
}

impl Default for HeuristicParams {
    fn default() -> Self {
        let mut cell_weights = [[0.0; COLUMNS]; ROWS];
        for (row, weights) in CELL_WEIGHTS.iter().enumerate() {
            for (col, weight) in weights.iter().enumerate() {
                cell_weights[row][col] = f64::from(*weight);
            }
        }
        Self {
            win_threat_bonus: 50.0,
            double_threat_bonus: 25.0,
            alpha: 0.5,
            neighbour_weight: 2.0,
            terminal_value: 100.0,
            cell_weights,
        }
    }
}

impl HeuristicParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut parse = |key: &str, default: f64, min: f64, max: f64| {
            read(key)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
                .map(|value| value.clamp(min, max))
                .unwrap_or(default)
        };

        Self {
            win_threat_bonus: parse("FOG_EVAL_WIN_BONUS", defaults.win_threat_bonus, 0.0, 1000.0),
            double_threat_bonus: parse(
                "FOG_EVAL_DOUBLE_BONUS",
                defaults.double_threat_bonus,
                0.0,
                1000.0,
            ),
            alpha: parse("FOG_EVAL_ALPHA", defaults.alpha, 0.05, 1.0),
            neighbour_weight: parse(
                "FOG_EVAL_NEIGHBOUR_WEIGHT",
                defaults.neighbour_weight,
                0.0,
                10.0,
            ),
            terminal_value: parse("FOG_EVAL_TERMINAL", defaults.terminal_value, 1.0, 10_000.0),
            cell_weights: defaults.cell_weights,
        }
    }

    pub fn empty_neighbour_weight(&self) -> f64 {
        1.0 / self.alpha
    }
}
