use fogfour_core::belief::{BeliefState, ObservationKey, OpponentModel, VisibilityMask};
use fogfour_core::model::board::{Board, COLUMNS, ROWS};
use fogfour_core::model::distribution::WeightedDistribution;
use fogfour_core::model::player::Player;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Revealed cells must hold identical content in every member board.
fn assert_consistent(belief: &BeliefState) {
    let mask = belief.mask();
    let boards: Vec<&Board> = belief.worlds().map(|(board, _)| board).collect();
    let Some(first) = boards.first() else {
        return;
    };
    for board in &boards {
        assert_eq!(board.plies(), belief.plies());
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                if mask.is_visible(row, col) {
                    assert_eq!(board.content(row, col), first.content(row, col));
                }
            }
        }
    }
}

fn play_tracked_game(seed: u64, first: Player) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let model = OpponentModel::default();
    let mut actual = Board::new(first);
    let mut belief = BeliefState::initial(first);

    while !actual.is_game_over() {
        let next_belief = match actual.to_move() {
            Player::Agent => {
                let legal = belief.legal_columns();
                let weights = vec![1.0; legal.len()];
                let pick = WeightedDistribution::new(&weights)
                    .sample(&mut rng)
                    .expect("agent has a legal column");
                let col = legal[pick];
                let outcomes = belief.apply_own_move(col).unwrap();
                actual.put_piece(col).unwrap();
                outcomes.resolve(&actual)
            }
            Player::Opponent => {
                let distribution = model.move_distribution(&actual);
                let probabilities: Vec<f64> = distribution.iter().map(|(_, p)| *p).collect();
                let pick = WeightedDistribution::new(&probabilities)
                    .sample(&mut rng)
                    .expect("opponent has a legal column");
                let outcomes = belief.predict_with(&model).unwrap();
                actual.put_piece(distribution[pick].0).unwrap();
                outcomes.resolve(&actual)
            }
        };

        belief = next_belief.expect("the true board is always among the predictions");
        assert!(belief.contains(&actual), "seed {seed}: lost track of\n{actual}");
        assert_eq!(belief.mask(), VisibilityMask::observe(&actual));
        assert!((belief.total_weight() - 1.0).abs() < 1e-9);
        assert_consistent(&belief);
    }

    assert!(belief.mask().is_fully_revealed());
    assert_eq!(belief.len(), 1);
}

#[test]
fn belief_tracks_the_true_board_through_whole_games() {
    for seed in 0..12 {
        let first = if seed % 2 == 0 { Player::Agent } else { Player::Opponent };
        play_tracked_game(seed, first);
    }
}

#[test]
fn opponent_prediction_splits_on_revealed_content() {
    // Only cells at or below an agent disc are revealed, so none of the replies show.
    let mut board = Board::new(Player::Agent);
    board.put_piece(3).unwrap();
    let belief = BeliefState::from_board(board);
    let outcomes = belief.predict_opponent_moves().unwrap();
    assert_eq!(outcomes.len(), 1);
    let (key, successor) = outcomes.iter().next().unwrap();
    assert_eq!(key.mask(), belief.mask());
    assert_eq!(successor.len(), COLUMNS);

    // Stacking on column 3 reveals whether the opponent answered there.
    let mut outcomes = successor.apply_own_move(3).unwrap().into_iter();
    let after = outcomes.next().unwrap();
    assert!(outcomes.next().is_some());
    assert!(after.len() < COLUMNS);
    let keys: Vec<ObservationKey> = successor
        .apply_own_move(3)
        .unwrap()
        .iter()
        .map(|(key, _)| *key)
        .collect();
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn game_ending_reply_collapses_the_belief() {
    let board = Board::from_rows(
        &[
            ".......",
            ".......",
            ".......",
            "O......",
            "O......",
            "OXX.X..",
        ],
        Player::Opponent,
    )
    .unwrap();
    let belief = BeliefState::from_board(board.clone());
    let outcomes = belief.predict_opponent_moves().unwrap();
    assert_eq!(outcomes.len(), 1);

    let mut actual = board;
    actual.put_piece(0).unwrap();
    let resolved = outcomes.resolve(&actual).unwrap();
    assert!(resolved.is_game_over());
    assert!(resolved.mask().is_fully_revealed());
    assert_eq!(actual.winner(), Some(Player::Opponent));
    assert!(resolved.legal_columns().is_empty());
}
