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

use crate::tree::Node;
use az_predict::Player;
use az_utils::error::SearchError;

/// The value estimate for `leaf`, from the perspective of whoever is to
/// move there. Terminal leaves short-circuit to their recorded result
/// without consulting the evaluator.
pub fn simulate(leaf: &Node, player: &Player) -> Result<f32, SearchError> {
    if let Some(result) = leaf.position.result() {
        Ok(result.value_for(leaf.position.side_to_move()))
    } else {
        player.predict_value(&leaf.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Tree;
    use az_predict::{Broker, Model, PredictResponse};
    use az_rules::{labels, Position};
    use az_utils::types::f16;
    use std::sync::Arc;

    struct ConstantModel(f32);

    impl Model for ConstantModel {
        fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
            let n = labels::num_labels();
            Ok(batch.iter().map(|_| PredictResponse::new(vec![1.0 / n as f32; n], self.0)).collect())
        }
    }

    #[test]
    fn terminal_leaf_never_calls_the_model() {
        let mut position = Position::new();
        for mv in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            position = position.apply(mv).unwrap();
        }

        let tree = Tree::new(position);
        let leaf = tree.get(tree.root);

        // a model that always panics would fail this test if called.
        struct PanicModel;
        impl Model for PanicModel {
            fn predict(&self, _batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
                panic!("model should not be called for a terminal leaf");
            }
        }

        let mut broker = Broker::new(Box::new(PanicModel));
        broker.start();
        let player = Player::new(Arc::new(broker));

        let value = simulate(&leaf, &player).unwrap();
        assert_eq!(value, -1.0); // black is checkmated
    }

    #[test]
    fn non_terminal_leaf_uses_model_value() {
        let tree = Tree::new(Position::new());
        let leaf = tree.get(tree.root);

        let mut broker = Broker::new(Box::new(ConstantModel(0.25)));
        broker.start();
        let player = Player::new(Arc::new(broker));

        assert_eq!(simulate(&leaf, &player).unwrap(), 0.25);
    }
}
