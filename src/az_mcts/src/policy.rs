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

use crate::dirichlet;
use crate::tree::{NodeId, Tree};
use az_utils::config;
use az_utils::error::SearchError;
use rand::Rng;

/// The root's visit-based policy: one `(child, probability)` pair per
/// root child, optionally mixed with Dirichlet noise. Empty if the root
/// has no children (nothing was ever expanded).
pub fn root_policy(tree: &Tree, noise: bool, rng: &mut impl Rng) -> Result<Vec<(NodeId, f32)>, SearchError> {
    let root = tree.get(tree.root);
    let (children, root_visits) = {
        let inner = root.lock();
        (inner.children.clone(), inner.visits)
    };

    if children.is_empty() {
        return Ok(Vec::new());
    }

    let tau = temperature(root.position.move_count());
    let root_visits = (root_visits as f64).powf(1.0 / tau);

    let mut probabilities: Vec<f32> = children
        .iter()
        .map(|&child_id| {
            let visits = tree.get(child_id).lock().visits as f64;
            if root_visits > 0.0 {
                (visits.powf(1.0 / tau) / root_visits) as f32
            } else {
                0.0
            }
        })
        .collect();

    if noise {
        let noise_sample = dirichlet::sample(*config::DIRICHLET_ALPHA, children.len(), rng)?;
        let epsilon = *config::DIRICHLET_EPSILON;

        for (p, n) in probabilities.iter_mut().zip(noise_sample.iter()) {
            *p = (1.0 - epsilon) * *p + epsilon * (*n as f32);
        }
    }

    Ok(children.into_iter().zip(probabilities).collect())
}

fn temperature(move_count: usize) -> f64 {
    if move_count < *config::TAU_SWITCH_PLY {
        1.0
    } else {
        let mc = move_count as f64;
        mc / (1.0 + mc.powf(1.3))
    }
}
