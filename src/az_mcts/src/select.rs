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

use crate::expand;
use crate::puct;
use crate::tree::{NodeId, Tree};
use az_predict::Player;
use az_utils::error::SearchError;

/// Descends from the root to a leaf: a terminal node, or a newly expanded
/// child. Applies one virtual loss to the leaf before returning, so that
/// other concurrent workers are steered away from it until this pass
/// backpropagates.
pub fn select(tree: &Tree, player: &Player) -> Result<NodeId, SearchError> {
    let mut current = tree.root;

    loop {
        let node = tree.get(current);

        if node.position.is_terminal() {
            break;
        }

        if !node.is_fully_expanded() {
            current = expand::expand(tree, current, player)?;
            break;
        }

        match puct::best_child(tree, current) {
            Some(child_id) => current = child_id,
            None => break,
        }
    }

    tree.get(current).lock().vloss += 1;
    Ok(current)
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
    fn select_on_fresh_tree_expands_and_applies_vloss() {
        let tree = Tree::new(Position::new());
        let player = test_player();

        let leaf_id = select(&tree, &player).unwrap();
        assert_ne!(leaf_id, tree.root);
        assert_eq!(tree.get(leaf_id).lock().vloss, 1);
    }
}
