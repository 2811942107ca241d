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

//! The fixed catalogue of every UCI move label the policy head can emit:
//! all queen-line destinations, all knight-jump destinations, and every
//! pawn-promotion move (including diagonal captures), for every origin
//! square. The generation order below must stay bit-for-bit stable since
//! the index of a label in this table is the index of its probability in
//! the policy vector.

use std::collections::HashMap;

const LETTERS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
const PROMOTED_TO: [char; 4] = ['q', 'r', 'b', 'n'];

fn generate_uci_labels() -> Vec<String> {
    let mut labels = Vec::with_capacity(1968);

    for l1 in 0..8i32 {
        for n1 in 0..8i32 {
            let mut destinations: Vec<(i32, i32)> = Vec::with_capacity(8 * 4 + 8);

            for t in 0..8 {
                destinations.push((t, n1));
            }
            for t in 0..8 {
                destinations.push((l1, t));
            }
            for t in -7..8 {
                destinations.push((l1 + t, n1 + t));
            }
            for t in -7..8 {
                destinations.push((l1 + t, n1 - t));
            }
            for (a, b) in [(-2, -1), (-1, -2), (-2, 1), (1, -2), (2, -1), (-1, 2), (2, 1), (1, 2)] {
                destinations.push((l1 + a, n1 + b));
            }

            for (l2, n2) in destinations {
                if (l1, n1) != (l2, n2) && (0..8).contains(&l2) && (0..8).contains(&n2) {
                    labels.push(format!(
                        "{}{}{}{}",
                        LETTERS[l1 as usize],
                        n1 + 1,
                        LETTERS[l2 as usize],
                        n2 + 1
                    ));
                }
            }
        }
    }

    for l1 in 0..8usize {
        let letter = LETTERS[l1];
        for p in PROMOTED_TO {
            labels.push(format!("{}2{}1{}", letter, letter, p));
            labels.push(format!("{}7{}8{}", letter, letter, p));

            if l1 > 0 {
                let l_l = LETTERS[l1 - 1];
                labels.push(format!("{}2{}1{}", letter, l_l, p));
                labels.push(format!("{}7{}8{}", letter, l_l, p));
            }
            if l1 < 7 {
                let l_r = LETTERS[l1 + 1];
                labels.push(format!("{}2{}1{}", letter, l_r, p));
                labels.push(format!("{}7{}8{}", letter, l_r, p));
            }
        }
    }

    labels
}

lazy_static! {
    /// The full, order-stable UCI move label catalogue (1968 entries).
    pub static ref UCI_LABELS: Vec<String> = generate_uci_labels();

    /// Label to index into `UCI_LABELS`, for building policy vectors.
    pub static ref UCI_LABEL_INDEX: HashMap<String, usize> = UCI_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| (label.clone(), i))
        .collect();
}

/// Number of entries in the label catalogue.
pub fn num_labels() -> usize {
    UCI_LABELS.len()
}
