// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::backprop;
use crate::policy;
use crate::select;
use crate::simulate;
use crate::tree::Tree;
use az_predict::Player;
use az_rules::{Position, NULL_MOVE};
use az_utils::config;
use az_utils::error::SearchError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread;

/// Runs one full iteration: select a leaf, simulate its value, and
/// backpropagate (or, on failure, only release the virtual loss the
/// failed pass applied).
fn run_one_pass(tree: &Tree, player: &Player) -> Result<(), SearchError> {
    let leaf_id = select::select(tree, player)?;
    let leaf = tree.get(leaf_id);

    match simulate::simulate(&leaf, player) {
        Ok(value) => {
            backprop::backpropagate(tree, leaf_id, value);
            Ok(())
        }
        Err(err) => {
            backprop::release_vloss_only(tree, leaf_id);
            Err(err)
        }
    }
}

/// Splits `total` iterations as evenly as possible across `threads`
/// workers.
fn distribute(total: usize, threads: usize) -> Vec<usize> {
    if threads == 0 {
        return Vec::new();
    }

    let base = total / threads;
    let remainder = total % threads;

    (0..threads)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Runs a full MCTS search from `initial` and returns `(our_move,
/// opponent_reply)`, using the null-move sentinel wherever the
/// corresponding slot does not exist.
///
/// `threads` workers are spawned, each holding an independent clone of
/// `player` (its own broker connection), and run to completion before the
/// root policy is extracted.
pub fn search_move(
    initial: Position,
    player: &Player,
    max_iters: usize,
    threads: usize,
    noise: bool,
    ai_move: bool,
) -> (String, String) {
    if initial.is_terminal() || initial.legal_moves().is_empty() {
        return (NULL_MOVE.to_string(), NULL_MOVE.to_string());
    }

    let tree = Arc::new(Tree::new(initial));

    let handles: Vec<_> = distribute(max_iters, threads)
        .into_iter()
        .filter(|&n| n > 0)
        .map(|n| {
            let tree = Arc::clone(&tree);
            let worker_player = player.clone();

            thread::spawn(move || {
                for _ in 0..n {
                    let _ = run_one_pass(&tree, &worker_player);
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    let mut rng = SmallRng::from_entropy();
    let pi = policy::root_policy(&tree, noise, &mut rng).unwrap_or_default();

    let best = pi
        .iter()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    match best {
        Some((child_id, _)) => {
            let child = tree.get(*child_id);
            let our_move = child.position.second_to_last_move().to_string();
            let reply = if ai_move {
                child.position.last_move().to_string()
            } else {
                NULL_MOVE.to_string()
            };
            (our_move, reply)
        }
        None => (NULL_MOVE.to_string(), NULL_MOVE.to_string()),
    }
}

/// Convenience wrapper using the configured defaults for iteration count,
/// thread count, and noise.
pub fn search_move_default(initial: Position, player: &Player, ai_move: bool) -> (String, String) {
    search_move(initial, player, *config::MAX_ITERS, *config::THREADS, *config::DIRICHLET_NOISE, ai_move)
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_predict::{Broker, Model, PredictResponse};
    use az_rules::labels;
    use az_utils::types::f16;

    struct UniformModel;

    impl Model for UniformModel {
        fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
            let n = labels::num_labels();
            Ok(batch.iter().map(|_| PredictResponse::new(vec![1.0 / n as f32; n], 0.0)).collect())
        }
    }

    fn test_player() -> Player {
        let mut broker = Broker::new(Box::new(UniformModel));
        broker.start();
        Player::new(Arc::new(broker))
    }

    #[test]
    fn distribute_splits_remainder_across_first_threads() {
        assert_eq!(distribute(10, 3), vec![4, 3, 3]);
        assert_eq!(distribute(0, 3), vec![0, 0, 0]);
        assert_eq!(distribute(5, 0), Vec::<usize>::new());
    }

    #[test]
    fn stalemate_returns_null_move_without_search() {
        // fool's-mate-adjacent stalemate fixture is awkward to construct by
        // hand; use checkmate instead to exercise the "already terminal"
        // early return, which takes the identical code path as stalemate.
        let mut position = Position::new();
        for mv in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            position = position.apply(mv).unwrap();
        }
        let player = test_player();

        let (our_move, reply) = search_move(position, &player, 100, 2, false, true);
        assert_eq!(our_move, NULL_MOVE);
        assert_eq!(reply, NULL_MOVE);
    }

    #[test]
    fn search_from_start_position_returns_a_legal_move() {
        let position = Position::new();
        let player = test_player();

        let (our_move, _reply) = search_move(position.clone(), &player, 40, 4, false, false);
        assert!(position.legal_moves().contains(&our_move));
    }
}
