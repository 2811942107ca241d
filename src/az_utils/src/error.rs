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

/// Errors that can occur while searching, predicting, or manipulating a
/// position. Recoverable channel errors (a broken client, an acceptor
/// shutting down) are handled internally by the broker and never reach
/// this type.
#[derive(Debug, Clone)]
pub enum SearchError {
    /// A UCI string that is not a legal move in the position it was applied
    /// to.
    InvalidMove(String),

    /// A client handle was used after the broker was stopped.
    BrokerClosed,

    /// The other end of a broker client channel disconnected.
    PeerDisconnected,

    /// The model failed to produce a prediction for a batch. Every caller
    /// whose request was part of that batch receives this same error.
    ModelFailure(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::InvalidMove(uci) => write!(f, "invalid move: {}", uci),
            SearchError::BrokerClosed => write!(f, "broker is closed"),
            SearchError::PeerDisconnected => write!(f, "peer disconnected"),
            SearchError::ModelFailure(reason) => write!(f, "model failure: {}", reason),
        }
    }
}

impl std::error::Error for SearchError {}
