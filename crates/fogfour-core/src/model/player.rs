use core::fmt;
use serde::{Deserialize, Serialize};

/// The two sides of a game. `Agent` is the deciding player whose belief is tracked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Player {
    Opponent = 1,
    Agent = 2,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::Opponent, Player::Agent];

    pub const fn other(self) -> Player {
        match self {
            Player::Opponent => Player::Agent,
            Player::Agent => Player::Opponent,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Player::Opponent => 0,
            Player::Agent => 1,
        }
    }

    /// Single-character glyph used by board fixtures and `Display`.
    pub const fn glyph(self) -> char {
        match self {
            Player::Opponent => 'O',
            Player::Agent => 'X',
        }
    }

    pub const fn from_glyph(glyph: char) -> Option<Player> {
        match glyph {
            'O' | 'o' => Some(Player::Opponent),
            'X' | 'x' => Some(Player::Agent),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Player::Opponent => "Opponent",
            Player::Agent => "Agent",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::Player;

    #[test]
    fn other_flips_side() {
        assert_eq!(Player::Agent.other(), Player::Opponent);
        assert_eq!(Player::Opponent.other(), Player::Agent);
    }

    #[test]
    fn glyph_roundtrip() {
        for player in Player::BOTH {
            assert_eq!(Player::from_glyph(player.glyph()), Some(player));
        }
        assert_eq!(Player::from_glyph('.'), None);
    }

    #[test]
    fn index_is_dense() {
        assert_eq!(Player::Opponent.index(), 0);
        assert_eq!(Player::Agent.index(), 1);
    }
}
