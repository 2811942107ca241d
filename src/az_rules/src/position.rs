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
use shakmaty::fen::Fen;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, Color, Outcome, Position as ShakmatyPosition};

/// The sentinel UCI string returned wherever no move is applicable: no
/// legal moves exist, or a requested history slot has no move in it.
pub const NULL_MOVE: &str = "0000";

/// The outcome of a finished game, from White's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    /// The scalar value of this result from the perspective of `color`.
    pub fn value_for(&self, color: Color) -> f32 {
        match (self, color) {
            (GameResult::WhiteWin, Color::White) => 1.0,
            (GameResult::WhiteWin, Color::Black) => -1.0,
            (GameResult::BlackWin, Color::White) => -1.0,
            (GameResult::BlackWin, Color::Black) => 1.0,
            (GameResult::Draw, _) => 0.0,
        }
    }
}

/// A chess position together with enough move history to encode a game
/// state tensor and to recover the last two plies played into a node.
///
/// Rules legality is entirely delegated to `shakmaty::Chess`; this type
/// only adds the history bookkeeping the encoder and the tree need.
#[derive(Clone)]
pub struct Position {
    current: Chess,
    /// `history[i]` is the position immediately before `moves[i]` was
    /// played, so `history.last()` is one ply behind `current`.
    history: Vec<Chess>,
    moves: Vec<String>,
}

impl Position {
    pub fn new() -> Self {
        Self { current: Chess::default(), history: Vec::new(), moves: Vec::new() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, SearchError> {
        let fen: Fen = fen
            .parse()
            .map_err(|_| SearchError::InvalidMove(fen.to_string()))?;
        let current: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|_| SearchError::InvalidMove(fen.to_string()))?;

        // no played-move history is recoverable from a FEN, but the ply
        // depth is: pad `moves` with null-move sentinels so `move_count`
        // still reflects how deep into the game this position really is.
        let ply = (current.fullmoves().get() as usize - 1) * 2
            + if current.turn() == Color::Black { 1 } else { 0 };
        let moves = vec![NULL_MOVE.to_string(); ply];

        Ok(Self { current, history: Vec::new(), moves })
    }

    pub fn side_to_move(&self) -> Color {
        self.current.turn()
    }

    pub fn board(&self) -> &shakmaty::Board {
        self.current.board()
    }

    /// All legal moves from this position, as UCI strings, in the order
    /// `shakmaty` enumerates them.
    pub fn legal_moves(&self) -> Vec<String> {
        self.current
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// Applies `uci` and returns the resulting position. Fails only if
    /// `uci` is not a legal move here.
    pub fn apply(&self, uci: &str) -> Result<Position, SearchError> {
        let parsed: Uci = uci
            .parse()
            .map_err(|_| SearchError::InvalidMove(uci.to_string()))?;
        let mv = parsed
            .to_move(&self.current)
            .map_err(|_| SearchError::InvalidMove(uci.to_string()))?;
        let next = self
            .current
            .clone()
            .play(&mv)
            .map_err(|_| SearchError::InvalidMove(uci.to_string()))?;

        let mut history = self.history.clone();
        history.push(self.current.clone());
        let mut moves = self.moves.clone();
        moves.push(uci.to_string());

        Ok(Position { current: next, history, moves })
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_game_over()
    }

    /// The game result, or `None` while the game is still in progress.
    pub fn result(&self) -> Option<GameResult> {
        self.current.outcome().map(|outcome| match outcome {
            Outcome::Decisive { winner: Color::White } => GameResult::WhiteWin,
            Outcome::Decisive { winner: Color::Black } => GameResult::BlackWin,
            Outcome::Draw => GameResult::Draw,
        })
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// The most recent move, or the null-move sentinel if none has been
    /// played yet.
    pub fn last_move(&self) -> &str {
        self.moves.last().map(String::as_str).unwrap_or(NULL_MOVE)
    }

    /// The move played before the most recent one, or the null-move
    /// sentinel if fewer than two moves have been played.
    pub fn second_to_last_move(&self) -> &str {
        if self.moves.len() >= 2 {
            &self.moves[self.moves.len() - 2]
        } else {
            NULL_MOVE
        }
    }

    /// The board state `steps` plies before `current`, if that far back is
    /// within recorded history. `steps == 0` returns `current` itself.
    pub(crate) fn board_at(&self, steps: usize) -> Option<&shakmaty::Board> {
        if steps == 0 {
            Some(self.current.board())
        } else if steps <= self.history.len() {
            Some(self.history[self.history.len() - steps].board())
        } else {
            None
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}
