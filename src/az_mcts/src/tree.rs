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

use az_rules::Position;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// An index into a `Tree`'s node arena. Stable for the lifetime of the
/// `Tree` it was produced from; never reused.
pub type NodeId = usize;

/// The mutable part of a node, all guarded by one mutex so that a visit
/// count update, a children append, and a prior assignment are never
/// observed half-applied by a concurrent reader.
pub struct NodeInner {
    pub visits: u32,
    pub value: f64,
    pub vloss: u32,
    pub prior: f32,
    pub children: Vec<NodeId>,
    pub untried: Vec<String>,
}

pub struct Node {
    pub position: Position,
    pub parent: Option<NodeId>,
    inner: Mutex<NodeInner>,
}

impl Node {
    fn new(position: Position, parent: Option<NodeId>, prior: f32) -> Self {
        let untried = position.legal_moves();

        Self {
            position,
            parent,
            inner: Mutex::new(NodeInner {
                visits: 0,
                value: 0.0,
                vloss: 0,
                prior,
                children: Vec::new(),
                untried,
            }),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, NodeInner> {
        self.inner.lock().unwrap()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.lock().untried.is_empty()
    }
}

/// The search tree for a single `search_move` call: an append-only arena
/// of nodes reachable from `root`. Nodes are never removed; the whole
/// arena is freed at once when the `Tree` is dropped.
pub struct Tree {
    nodes: RwLock<Vec<Arc<Node>>>,
    pub root: NodeId,
}

impl Tree {
    pub fn new(root_position: Position) -> Self {
        let root = Node::new(root_position, None, 1.0);
        root.lock().visits = 1;

        Self { nodes: RwLock::new(vec![Arc::new(root)]), root: 0 }
    }

    /// Returns the node at `id`. Panics if `id` is out of range, which
    /// would indicate a bug in tree construction (ids are only ever
    /// handed out by `push`).
    pub fn get(&self, id: NodeId) -> Arc<Node> {
        Arc::clone(&self.nodes.read().unwrap()[id])
    }

    fn push(&self, node: Node) -> NodeId {
        let mut nodes = self.nodes.write().unwrap();
        nodes.push(Arc::new(node));
        nodes.len() - 1
    }

    /// Creates a new node as a child of `parent`, appends it to `parent`'s
    /// children list under `parent`'s own lock, and returns its id. If
    /// this was the last untried action on `parent`, `parent` becomes
    /// fully expanded as a side effect of the caller having already popped
    /// it from `untried`.
    pub fn expand_child(&self, parent: NodeId, child_position: Position) -> NodeId {
        let child = Node::new(child_position, Some(parent), 1.0);
        let child_id = self.push(child);

        self.get(parent).lock().children.push(child_id);

        child_id
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tree_has_one_bootstrap_visit() {
        let tree = Tree::new(Position::new());
        assert_eq!(tree.get(tree.root).lock().visits, 1);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn expand_child_appends_to_parent() {
        let tree = Tree::new(Position::new());
        let child_position = Position::new().apply("e2e4").unwrap();
        let child_id = tree.expand_child(tree.root, child_position);

        assert_eq!(tree.get(tree.root).lock().children, vec![child_id]);
        assert_eq!(tree.get(child_id).parent, Some(tree.root));
    }
}
