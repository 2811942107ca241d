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
use az_utils::config;
use ordered_float::OrderedFloat;

/// `Q(n) + U(n) - vloss(n)`, with `U` driven by `n`'s prior and the
/// parent's visit count (not the sum of `n`'s own children, despite some
/// phrasing of this formula elsewhere using that wording loosely -- see
/// DESIGN.md).
fn score(child_value: f64, child_visits: u32, child_vloss: u32, child_prior: f32, parent_visits: u32) -> f64 {
    let c = *config::PUCT_C as f64;
    let q = child_value / (1.0 + child_visits as f64);
    let u = c * (child_prior as f64) * (parent_visits as f64).sqrt() / (1.0 + child_visits as f64);

    q + u - (child_vloss as f64)
}

/// Selects the child of `node_id` with the highest PUCT score, breaking
/// ties by the lowest child index. Returns `None` if `node_id` has no
/// children (i.e. is not fully expanded, or is a childless terminal).
pub fn best_child(tree: &Tree, node_id: NodeId) -> Option<NodeId> {
    let node = tree.get(node_id);
    let (children, parent_visits) = {
        let inner = node.lock();
        (inner.children.clone(), inner.visits)
    };

    children
        .into_iter()
        .map(|child_id| {
            let child = tree.get(child_id);
            let inner = child.lock();
            let s = score(inner.value, inner.visits, inner.vloss, inner.prior, parent_visits);
            (child_id, s)
        })
        .max_by_key(|(_, s)| OrderedFloat(*s))
        .map(|(child_id, _)| child_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use az_rules::Position;

    #[test]
    fn unvisited_child_beats_heavily_visited_sibling_with_lower_prior() {
        let tree = Tree::new(Position::new());
        let a = tree.expand_child(tree.root, Position::new().apply("e2e4").unwrap());
        let b = tree.expand_child(tree.root, Position::new().apply("d2d4").unwrap());

        {
            let node_a = tree.get(a);
            let mut inner = node_a.lock();
            inner.visits = 50;
            inner.value = 10.0;
            inner.prior = 0.01;
        }
        {
            let node_b = tree.get(b);
            let mut inner = node_b.lock();
            inner.prior = 0.5;
        }
        tree.get(tree.root).lock().visits = 51;

        assert_eq!(best_child(&tree, tree.root), Some(b));
    }

    #[test]
    fn no_children_returns_none() {
        let tree = Tree::new(Position::new());
        assert_eq!(best_child(&tree, tree.root), None);
    }
}
