use crate::core::{Board, CastlingRights, Color, Piece, Position};
use once_cell::sync::Lazy;
use thiserror::Error;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

static START_BOARD: Lazy<Board> =
    Lazy::new(|| setup_from_fen(START_FEN).expect("START_FEN is a valid position"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, got {0}")]
    MissingFields(usize),
    #[error("FEN board must have 8 ranks, got {0}")]
    RankCount(usize),
    #[error("invalid piece placement in rank `{0}`")]
    Placement(String),
    #[error("invalid side to move `{0}`")]
    SideToMove(String),
    #[error("invalid castling field `{0}`")]
    Castling(String),
    #[error("invalid en passant square `{0}`")]
    EnPassant(String),
    #[error("invalid move counter `{0}`")]
    Counter(String),
}

/// FEN 文字列から盤面を初期化する
pub fn setup_from_fen(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::MissingFields(fields.len()));
    }

    let mut board = Board::new();

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }
    for (y, rank) in ranks.iter().enumerate() {
        let mut x = 0usize;
        for ch in rank.chars() {
            if let Some(skip) = ch.to_digit(10) {
                x += skip as usize;
            } else {
                let piece =
                    Piece::from_fen_char(ch).ok_or_else(|| FenError::Placement(rank.to_string()))?;
                if x >= 8 {
                    return Err(FenError::Placement(rank.to_string()));
                }
                board.place_piece(Position::new(x, y), piece);
                x += 1;
            }
        }
        if x != 8 {
            return Err(FenError::Placement(rank.to_string()));
        }
    }

    board.side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::SideToMove(other.to_string())),
    };

    let mut castling = CastlingRights::default();
    if fields[2] != "-" {
        for ch in fields[2].chars() {
            match ch {
                'K' => castling.white_king = true,
                'Q' => castling.white_queen = true,
                'k' => castling.black_king = true,
                'q' => castling.black_queen = true,
                _ => return Err(FenError::Castling(fields[2].to_string())),
            }
        }
    }
    board.castling = castling;

    board.en_passant = match fields[3] {
        "-" => None,
        sq => Some(
            Position::from_algebraic(sq).ok_or_else(|| FenError::EnPassant(sq.to_string()))?,
        ),
    };

    // 手数フィールドは省略可能
    board.halfmove_clock = match fields.get(4) {
        Some(s) => s.parse().map_err(|_| FenError::Counter(s.to_string()))?,
        None => 0,
    };
    let fullmove: u32 = match fields.get(5) {
        Some(s) => s.parse().map_err(|_| FenError::Counter(s.to_string()))?,
        None => 1,
    };
    board.ply = fullmove.max(1).saturating_sub(1) * 2
        + if board.side_to_move == Color::Black { 1 } else { 0 };

    Ok(board)
}

impl Board {
    /// 通常の初期配置
    pub fn standard() -> Board {
        START_BOARD.clone()
    }

    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        setup_from_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for y in 0..8 {
            let mut empty = 0;
            for x in 0..8 {
                match self.get_piece(Position::new(x, y)) {
                    Some(piece) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if y < 7 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.castling.white_king {
            castling.push('K');
        }
        if self.castling.white_queen {
            castling.push('Q');
        }
        if self.castling.black_king {
            castling.push('k');
        }
        if self.castling.black_queen {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .en_passant
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            placement,
            side,
            castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PieceKind;

    #[test]
    fn standard_position_round_trips_through_fen() {
        let board = Board::standard();
        assert_eq!(board.pieces.len(), 32);
        assert_eq!(board.ply, 0);
        assert_eq!(board.to_fen(), START_FEN);
    }

    #[test]
    fn fen_sets_ply_from_move_number_and_side() {
        let board =
            setup_from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(board.ply, 1);
        assert_eq!(board.side_to_move, Color::Black);
        assert_eq!(board.en_passant, Position::from_algebraic("e3"));
        assert_eq!(
            board.get_piece(Position::from_algebraic("e4").unwrap()),
            Some(&Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn malformed_fen_is_rejected() {
        assert_eq!(
            setup_from_fen("8/8/8 w - -").unwrap_err(),
            FenError::RankCount(3)
        );
        assert!(matches!(
            setup_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq -"),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            setup_from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Err(FenError::Placement(_))
        ));
    }
}
