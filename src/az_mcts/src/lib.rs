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

pub mod backprop;
pub mod dirichlet;
pub mod expand;
pub mod policy;
pub mod puct;
pub mod search;
pub mod select;
pub mod simulate;
pub mod tree;

pub use search::{search_move, search_move_default};
pub use tree::{Node, NodeId, Tree};
