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

//! Encodes a `Position` into the fixed-shape tensor the evaluator consumes.
//!
//! The tensor is `8 x 8 x (14 * (H + 1) + 1)`, laid out channel-last as a
//! flat `Vec<f32>`. Channels `[0, 14)` describe the current position,
//! channels `[14 * i, 14 * (i + 1))` for `i` in `[1, H]` describe the
//! position `i` plies back (zero-filled once history runs out), and the
//! final single channel is filled with `1.0` when White is to move and
//! `0.0` otherwise.
//!
//! Each 14-channel block is two 7-channel sub-blocks, black then white.
//! Within a sub-block, channel 0 is "no piece of this colour here" and
//! channels `[1, 7)` are one-hot by role in the fixed order pawn, knight,
//! bishop, rook, queen, king. This ordering, and the black-before-white
//! convention (rather than an own-colour/opponent-colour convention), is
//! carried over unchanged from the reference encoder this was ported from.

use crate::position::Position;
use shakmaty::{Board, Color, Role, Square};

const ROLES: [Role; 6] = [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen, Role::King];

fn channel_index(row: usize, col: usize, channel: usize, num_channels: usize) -> usize {
    (row * 8 + col) * num_channels + channel
}

fn write_board_block(board: &Board, out: &mut [f32], block_offset: usize, num_channels: usize) {
    for rank in 0..8u32 {
        for file in 0..8u32 {
            let square = Square::from_coords(
                shakmaty::File::new(file),
                shakmaty::Rank::new(rank),
            );
            let piece = board.piece_at(square);

            for (color_slot, color) in [(0usize, Color::Black), (7usize, Color::White)] {
                let base = block_offset + color_slot;
                let has_own_piece = piece.map(|p| p.color == color).unwrap_or(false);

                if !has_own_piece {
                    out[channel_index(rank as usize, file as usize, base, num_channels)] = 1.0;
                }

                if let Some(p) = piece {
                    if p.color == color {
                        if let Some(role_slot) = ROLES.iter().position(|r| *r == p.role) {
                            out[channel_index(
                                rank as usize,
                                file as usize,
                                base + 1 + role_slot,
                                num_channels,
                            )] = 1.0;
                        }
                    }
                }
            }
        }
    }
}

/// Encodes `position` with `history_depth` plies of history in addition to
/// the current position, as a flat row-major (rank, file, channel) tensor.
pub fn encode(position: &Position, history_depth: usize) -> Vec<f32> {
    let num_channels = 14 * (history_depth + 1) + 1;
    let mut out = vec![0.0f32; 8 * 8 * num_channels];

    for step in 0..=history_depth {
        if let Some(board) = position.board_at(step) {
            write_board_block(board, &mut out, step * 14, num_channels);
        }
    }

    let turn_channel = 14 * (history_depth + 1);
    if position.side_to_move() == Color::White {
        for rank in 0..8 {
            for file in 0..8 {
                out[channel_index(rank, file, turn_channel, num_channels)] = 1.0;
            }
        }
    }

    out
}

/// The number of elements a tensor produced by [`encode`] with the given
/// history depth will contain.
pub fn tensor_len(history_depth: usize) -> usize {
    8 * 8 * (14 * (history_depth + 1) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_has_expected_length() {
        let position = Position::new();
        let tensor = encode(&position, 8);

        assert_eq!(tensor.len(), tensor_len(8));
        assert_eq!(tensor.len(), 64 * (14 * 9 + 1));
    }

    #[test]
    fn turn_plane_reflects_side_to_move() {
        let white_to_move = Position::new();
        let black_to_move = white_to_move.apply("e2e4").unwrap();

        let num_channels = 14 * 9 + 1;
        let turn_channel = num_channels - 1;

        let white_tensor = encode(&white_to_move, 8);
        let black_tensor = encode(&black_to_move, 8);

        assert_eq!(white_tensor[channel_index(0, 0, turn_channel, num_channels)], 1.0);
        assert_eq!(black_tensor[channel_index(0, 0, turn_channel, num_channels)], 0.0);
    }

    #[test]
    fn history_blocks_beyond_recorded_moves_are_zero() {
        let position = Position::new();
        let tensor = encode(&position, 8);
        let num_channels = 14 * 9 + 1;

        // the oldest history block (steps = 8) has no recorded position yet
        let block_offset = 8 * 14;
        for channel in block_offset..(block_offset + 14) {
            assert_eq!(tensor[channel_index(0, 0, channel, num_channels)], 0.0);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let position = Position::new().apply("e2e4").unwrap();

        assert_eq!(encode(&position, 8), encode(&position, 8));
    }
}
