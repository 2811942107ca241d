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

//! Thin demonstration driver: runs one `search_move` against a position
//! and prints the chosen move. Not a UCI engine -- no protocol loop, no
//! time management, just a single search for inspection and manual
//! testing of the core against a stand-in model.

use az_mcts::search_move_default;
use az_predict::{Broker, Model, PredictResponse};
use az_rules::{labels, Position};
use az_utils::error::SearchError;
use az_utils::types::f16;
use std::env;
use std::process;
use std::sync::Arc;

/// A placeholder evaluator returning a uniform policy and a zero value
/// for every position. Real weights are out of scope for this crate; an
/// embedder supplies their own `Model` by linking a real inference
/// library behind this trait.
struct UniformModel;

impl Model for UniformModel {
    fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
        let n = labels::num_labels();
        let uniform = vec![1.0 / n as f32; n];

        Ok(batch.iter().map(|_| PredictResponse::new(uniform.clone(), 0.0)).collect())
    }
}

fn main() {
    let fen = env::args().nth(1);

    let position = match fen {
        Some(fen) => Position::from_fen(&fen).unwrap_or_else(|err| {
            eprintln!("invalid FEN: {}", err);
            process::exit(1);
        }),
        None => Position::new(),
    };

    let mut broker = Broker::new(Box::new(UniformModel));
    broker.start();
    let broker = Arc::new(broker);

    let player = az_predict::Player::new(Arc::clone(&broker));
    let (our_move, reply) = search_move_default(position, &player, true);

    println!("best move: {}", our_move);
    if reply != az_rules::NULL_MOVE {
        println!("anticipated reply: {}", reply);
    }

    if let Ok(mut broker) = Arc::try_unwrap(broker) {
        broker.stop();
    }
}
