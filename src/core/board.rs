use super::piece::{Piece, PieceKind};
use super::r#move::CastleSide;
use super::types::{Color, Position, Variant};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// キャスリング権
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_king: bool,
    pub white_queen: bool,
    pub black_king: bool,
    pub black_queen: bool,
}

impl CastlingRights {
    pub fn all() -> Self {
        CastlingRights {
            white_king: true,
            white_queen: true,
            black_king: true,
            black_queen: true,
        }
    }

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::King) => self.white_king,
            (Color::White, CastleSide::Queen) => self.white_queen,
            (Color::Black, CastleSide::King) => self.black_king,
            (Color::Black, CastleSide::Queen) => self.black_queen,
        }
    }

    pub fn revoke(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_king = false;
                self.white_queen = false;
            }
            Color::Black => {
                self.black_king = false;
                self.black_queen = false;
            }
        }
    }

    /// ルークの初期位置が動いた/取られた時の権利消失
    pub fn revoke_rook_square(&mut self, pos: Position) {
        match (pos.x, pos.y) {
            (0, 7) => self.white_queen = false,
            (7, 7) => self.white_king = false,
            (0, 0) => self.black_queen = false,
            (7, 0) => self.black_king = false,
            _ => {}
        }
    }
}

/// 盤面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// 駒の位置
    #[serde(with = "crate::core::serialization")]
    pub pieces: HashMap<Position, Piece>,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Position>,
    pub halfmove_clock: u32,
    /// 開始局面からの手数 (half-move)
    pub ply: u32,
    pub variant: Variant,
    pub last_move: Option<crate::core::Move>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            pieces: HashMap::new(),
            side_to_move: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
            halfmove_clock: 0,
            ply: 0,
            variant: Variant::Normal,
            last_move: None,
        }
    }

    pub fn place_piece(&mut self, pos: Position, piece: Piece) {
        self.pieces.insert(pos, piece);
    }

    pub fn get_piece(&self, pos: Position) -> Option<&Piece> {
        self.pieces.get(&pos)
    }

    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        self.pieces.remove(&pos)
    }

    pub fn find_king(&self, player: Color) -> Option<Position> {
        self.pieces
            .iter()
            .find(|(_, p)| p.owner == player && p.kind == PieceKind::King)
            .map(|(pos, _)| *pos)
    }

    /// FEN の fullmove 番号
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
