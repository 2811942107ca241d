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
use az_utils::types::f16;

/// One evaluation result: a policy over the full UCI label catalogue, and
/// a scalar value in `[-1, 1]` from the perspective of the side to move.
#[derive(Debug, Clone)]
pub struct PredictResponse {
    policy: Vec<f32>,
    value: f32,
}

impl PredictResponse {
    pub fn new(policy: Vec<f32>, value: f32) -> Self {
        Self { policy, value }
    }

    pub fn policy(&self) -> &[f32] {
        &self.policy
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// The evaluator boundary: anything that can turn a batch of encoded
/// position tensors into a batch of `(policy, value)` predictions, one per
/// input, in the same order.
///
/// Implementations are expected to be cheap to share across threads (the
/// broker calls `predict` from a single dedicated thread, but the trait
/// object itself is held behind an `Arc`).
pub trait Model: Send + Sync {
    fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError>;
}
