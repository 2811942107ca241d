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

use crate::tree::{NodeId, Tree};

/// Walks from `leaf_id` to the root, adding one visit and `value` to
/// every node along the way, and releasing the virtual loss that was
/// applied to `leaf_id` by `select`.
///
/// Every tree edge already embeds our move and the opponent's reply, so
/// every node is reached on the same player's turn to move; `value` is
/// therefore added unchanged at every ancestor, with no sign flip.
pub fn backpropagate(tree: &Tree, leaf_id: NodeId, value: f32) {
    let v = value as f64;
    let mut current = Some(leaf_id);
    let mut first = true;

    while let Some(id) = current {
        let node = tree.get(id);
        let mut inner = node.lock();

        inner.visits += 1;
        inner.value += v;
        if first {
            inner.vloss = inner.vloss.saturating_sub(1);
            first = false;
        }

        current = node.parent;
    }
}

/// Releases the virtual loss a failed pass applied to `leaf_id`, without
/// touching visits or value. Ancestors never carry per-pass virtual loss
/// (see `select`), so only the leaf itself needs adjusting.
pub fn release_vloss_only(tree: &Tree, leaf_id: NodeId) {
    let node = tree.get(leaf_id);
    let mut inner = node.lock();
    inner.vloss = inner.vloss.saturating_sub(1);
}
