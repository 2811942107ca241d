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

use crate::tree::{NodeId, Tree};
use az_predict::Player;
use az_rules::Position;
use az_utils::error::SearchError;

/// Materialises one untried action of `node_id` as a new child, embedding
/// the opponent's reply into the child's position so that every node in
/// the tree is reached on "our" turn to move.
///
/// Actions are popped LIFO from `untried` so that concurrent workers
/// expanding the same node race over independent actions rather than
/// redoing each other's work; when the last action is popped, priors are
/// requested once and assigned to the node's children in reverse order
/// (the order in which they were actually created).
pub fn expand(tree: &Tree, node_id: NodeId, player: &Player) -> Result<NodeId, SearchError> {
    let node = tree.get(node_id);

    let uci = {
        let mut inner = node.lock();
        inner
            .untried
            .pop()
            .expect("expand called on a fully expanded node")
    };

    let child_position = match apply_with_reply(&node.position, &uci, player) {
        Ok(position) => position,
        Err(err) => {
            // restore the action: a broker failure here must not
            // permanently shrink `untried` without a child to show for it,
            // or `assign_priors`' legal.len() - 1 - i arithmetic desyncs.
            node.lock().untried.push(uci);
            return Err(err);
        }
    };

    let child_id = tree.expand_child(node_id, child_position);

    let just_completed = node.lock().untried.is_empty();
    if just_completed {
        assign_priors(tree, node_id, player)?;
    }

    Ok(child_id)
}

fn apply_with_reply(position: &Position, uci: &str, player: &Player) -> Result<Position, SearchError> {
    let after_our_move = position.apply(uci)?;

    if after_our_move.is_terminal() {
        Ok(after_our_move)
    } else {
        let reply = player.best_move(&after_our_move, true)?;
        after_our_move.apply(&reply)
    }
}

fn assign_priors(tree: &Tree, node_id: NodeId, player: &Player) -> Result<(), SearchError> {
    let node = tree.get(node_id);
    let legal = node.position.legal_moves();
    let policy = player.predict_policy(&node.position, true)?;
    let children = node.lock().children.clone();

    for (i, child_id) in children.iter().enumerate() {
        // children were appended in the reverse order of `legal`, since
        // `untried` was consumed LIFO.
        let legal_index = legal.len() - 1 - i;
        let prior = policy.get(legal_index).copied().unwrap_or(0.0);

        tree.get(*child_id).lock().prior = prior;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_predict::{Broker, Model, PredictResponse};
    use az_rules::{labels, Position};
    use az_utils::types::f16;
    use std::sync::Arc;

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
    fn expand_embeds_opponent_reply() {
        let tree = Tree::new(Position::new());
        let player = test_player();

        let child_id = expand(&tree, tree.root, &player).unwrap();
        let child = tree.get(child_id);

        assert_eq!(child.position.move_count(), 2);
        assert_ne!(child.position.second_to_last_move(), az_rules::NULL_MOVE);
        assert_ne!(child.position.last_move(), az_rules::NULL_MOVE);
    }

    #[test]
    fn priors_assigned_once_node_fully_expanded() {
        let tree = Tree::new(Position::new());
        let player = test_player();
        let legal_count = tree.get(tree.root).position.legal_moves().len();

        for _ in 0..legal_count {
            expand(&tree, tree.root, &player).unwrap();
        }

        let root = tree.get(tree.root);
        assert!(root.is_fully_expanded());
        for &child_id in &root.lock().children {
            assert!(tree.get(child_id).lock().prior > 0.0);
        }
    }
}
