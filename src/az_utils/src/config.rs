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

use std::env;
use std::str::FromStr;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

lazy_static! {
    /// The maximum number of MCTS iterations to perform for a single call
    /// to `search_move`.
    pub static ref MAX_ITERS: usize = env_or("MAX_ITERS", 900);

    /// The number of worker threads to spawn per search.
    pub static ref THREADS: usize = env_or("THREADS", 6);

    /// Whether to mix Dirichlet noise into the root policy.
    pub static ref DIRICHLET_NOISE: bool = env_or("DIRICHLET_NOISE", true);

    /// The exploration constant used by the PUCT formula.
    pub static ref PUCT_C: f32 = env_or("PUCT_C", 10.0);

    /// The number of previous positions included in the encoded tensor, in
    /// addition to the current position.
    pub static ref HISTORY_DEPTH: usize = env_or("HISTORY_DEPTH", 8);

    /// The ply at which the root policy temperature switches from 1 to the
    /// decaying schedule.
    pub static ref TAU_SWITCH_PLY: usize = env_or("TAU_SWITCH_PLY", 30);

    /// The concentration parameter of the Dirichlet noise distribution.
    pub static ref DIRICHLET_ALPHA: f64 = env_or("DIRICHLET_ALPHA", 0.03);

    /// The mixing weight given to Dirichlet noise in the root policy.
    pub static ref DIRICHLET_EPSILON: f32 = env_or("DIRICHLET_EPSILON", 0.25);

    /// The maximum number of pending requests the predictor will stack into
    /// a single model invocation per drain cycle.
    pub static ref BATCH_SIZE: usize = env_or("BATCH_SIZE", 16);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_reasonable() {
        assert!(*MAX_ITERS > 0);
        assert!(*THREADS > 0);
        assert!(*PUCT_C > 0.0);
        assert!(*HISTORY_DEPTH > 0);
        assert!(*BATCH_SIZE > 0);
    }
}
