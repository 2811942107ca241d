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

use crate::broker::{Broker, ClientHandle};
use crate::model::PredictResponse;
use az_rules::{encoding, labels, Position};
use az_utils::config;
use az_utils::error::SearchError;
use az_utils::types::f16;
use std::sync::Arc;

/// The narrow interface the search consumes: ask for a value estimate, a
/// policy over legal moves, or a one-shot best move, all backed by a
/// shared `Broker`.
///
/// Each `Player` owns its own `ClientHandle`, so cloning a `Player` (one
/// per search worker) never serialises broker traffic behind a shared
/// lock; it requests a fresh connection from the broker instead.
pub struct Player {
    broker: Arc<Broker>,
    handle: ClientHandle,
}

impl Player {
    pub fn new(broker: Arc<Broker>) -> Self {
        let handle = broker.client_handle();
        Self { broker, handle }
    }

    fn raw_predict(&self, position: &Position) -> Result<PredictResponse, SearchError> {
        let tensor = encoding::encode(position, *config::HISTORY_DEPTH);
        let tensor: Vec<f16> = tensor.into_iter().map(f16::from_f32).collect();

        self.handle.predict(tensor)
    }

    /// Scalar value estimate for `position`, from the perspective of the
    /// side to move.
    pub fn predict_value(&self, position: &Position) -> Result<f32, SearchError> {
        self.raw_predict(position).map(|response| response.value())
    }

    /// Policy over `position`'s legal moves. When `mask_legal` is true the
    /// result has one entry per legal move, in the same order as
    /// `position.legal_moves()`, renormalised to sum to 1; otherwise the
    /// full catalogue-length vector is returned unmasked.
    pub fn predict_policy(&self, position: &Position, mask_legal: bool) -> Result<Vec<f32>, SearchError> {
        let response = self.raw_predict(position)?;
        let full = response.policy();

        if !mask_legal {
            return Ok(full.to_vec());
        }

        let legal = position.legal_moves();
        let mut masked: Vec<f32> = legal
            .iter()
            .map(|uci| {
                labels::UCI_LABEL_INDEX
                    .get(uci)
                    .and_then(|&index| full.get(index))
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();

        let total: f32 = masked.iter().sum();
        if total > 0.0 {
            for p in masked.iter_mut() {
                *p /= total;
            }
        } else if !masked.is_empty() {
            let uniform = 1.0 / masked.len() as f32;
            masked.iter_mut().for_each(|p| *p = uniform);
        }

        Ok(masked)
    }

    /// The argmax of the masked policy; used both as a one-shot "play the
    /// network's favourite move" query and, with `real_game = true`, as
    /// the opponent-reply step embedded in tree expansion.
    pub fn best_move(&self, position: &Position, real_game: bool) -> Result<String, SearchError> {
        let legal = position.legal_moves();
        if legal.is_empty() {
            return Ok(az_rules::NULL_MOVE.to_string());
        }

        let policy = self.predict_policy(position, true)?;
        let _ = real_game; // the search itself supplies exploration; this query is always greedy

        // argmax, ties broken by first legal index: fold instead of
        // `max_by`, which keeps the *last* maximal element on a tie.
        let best_index = policy
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (index, &p)| match best {
                Some((_, b)) if p <= b => best,
                _ => Some((index, p)),
            })
            .map(|(index, _)| index)
            .unwrap_or(0);

        Ok(legal[best_index].clone())
    }

    /// An independent handle to the same broker, for use by another search
    /// worker thread.
    pub fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.broker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    struct UniformModel;

    impl Model for UniformModel {
        fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
            let n = labels::num_labels();
            Ok(batch
                .iter()
                .map(|_| PredictResponse::new(vec![1.0 / n as f32; n], 0.0))
                .collect())
        }
    }

    #[test]
    fn best_move_on_start_position_is_legal() {
        let mut broker = Broker::new(Box::new(UniformModel));
        broker.start();
        let broker = Arc::new(broker);

        let player = Player::new(Arc::clone(&broker));
        let position = Position::new();
        let mv = player.best_move(&position, false).unwrap();

        assert!(position.legal_moves().contains(&mv));
    }

    #[test]
    fn predict_policy_masked_sums_to_one() {
        let mut broker = Broker::new(Box::new(UniformModel));
        broker.start();
        let broker = Arc::new(broker);

        let player = Player::new(Arc::clone(&broker));
        let position = Position::new();
        let policy = player.predict_policy(&position, true).unwrap();

        let total: f32 = policy.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }
}
