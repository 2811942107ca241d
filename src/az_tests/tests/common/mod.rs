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

use az_predict::{Broker, Model, PredictResponse};
use az_rules::labels;
use az_utils::error::SearchError;
use az_utils::types::f16;
use std::sync::Arc;
use std::time::Duration;

/// Always returns a uniform policy over every label and a fixed value.
pub struct UniformModel {
    pub value: f32,
}

impl Model for UniformModel {
    fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
        let n = labels::num_labels();
        let uniform = vec![1.0 / n as f32; n];

        Ok(batch.iter().map(|_| PredictResponse::new(uniform.clone(), self.value)).collect())
    }
}

/// Mimics a slower model, so that several workers are in flight
/// concurrently before any of them gets a reply.
pub struct SlowUniformModel {
    pub value: f32,
    pub delay: Duration,
}

impl Model for SlowUniformModel {
    fn predict(&self, batch: &[Vec<f16>]) -> Result<Vec<PredictResponse>, SearchError> {
        std::thread::sleep(self.delay);
        let n = labels::num_labels();
        let uniform = vec![1.0 / n as f32; n];

        Ok(batch.iter().map(|_| PredictResponse::new(uniform.clone(), self.value)).collect())
    }
}

pub fn started_broker(model: Box<dyn Model>) -> Arc<Broker> {
    let mut broker = Broker::new(model);
    broker.start();
    Arc::new(broker)
}
