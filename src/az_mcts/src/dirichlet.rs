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

use az_utils::error::SearchError;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

/// Draws one sample from `Dirichlet(alpha, alpha, ..., alpha)` with `k`
/// components, for mixing into the root policy.
pub fn sample(alpha: f64, k: usize, rng: &mut impl Rng) -> Result<Vec<f64>, SearchError> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let dirichlet = Dirichlet::new(&vec![alpha; k])
        .map_err(|e| SearchError::ModelFailure(format!("dirichlet noise: {}", e)))?;

    Ok(dirichlet.sample(rng))
}
