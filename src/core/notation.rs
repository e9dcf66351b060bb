//! 指し手の表記 (SAN / 座標表記) の読み書き

use crate::core::{Board, CastleSide, Move, PieceKind, Position, Variant};
use crate::logic::{apply_move, is_in_check, legal_moves};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty move notation")]
    Empty,
    #[error("malformed move notation `{0}`")]
    Malformed(String),
    #[error("no legal move matches `{0}`")]
    NoMatch(String),
    #[error("ambiguous move notation `{0}`")]
    Ambiguous(String),
}

/// 座標表記でのキャスリングの書き方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleNotation {
    /// キングの移動元と移動先 (e1g1)
    KingKing,
    /// O-O / O-O-O
    San,
}

impl CastleNotation {
    pub fn for_variant(variant: Variant) -> CastleNotation {
        match variant {
            Variant::FischerRandom => CastleNotation::San,
            Variant::Normal => CastleNotation::KingKing,
        }
    }
}

fn castle_side(text: &str) -> Option<CastleSide> {
    match text {
        "O-O" | "0-0" => Some(CastleSide::King),
        "O-O-O" | "0-0-0" => Some(CastleSide::Queen),
        _ => None,
    }
}

fn find_castle(board: &Board, side: CastleSide, text: &str) -> Result<Move, ParseError> {
    legal_moves(board)
        .into_iter()
        .find(|mv| matches!(mv, Move::Castle { side: s, .. } if *s == side))
        .ok_or_else(|| ParseError::NoMatch(text.to_string()))
}

fn moved_kind(board: &Board, mv: &Move) -> Option<PieceKind> {
    board.get_piece(mv.from()).map(|p| p.kind)
}

/// SAN を盤面に照らして構造化された指し手にする
pub fn parse_san(board: &Board, san: &str) -> Result<Move, ParseError> {
    let text = san
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(side) = castle_side(text) {
        return find_castle(board, side, san);
    }

    let malformed = || ParseError::Malformed(san.to_string());
    let mut body: Vec<char> = text.chars().filter(|&c| c != 'x' && c != '-').collect();

    let kind = match body.first() {
        Some(c) if c.is_ascii_uppercase() => {
            let kind = PieceKind::from_char(*c).ok_or_else(malformed)?;
            body.remove(0);
            kind
        }
        Some(_) => PieceKind::Pawn,
        None => return Err(malformed()),
    };

    // 末尾のプロモーション指定 (e8=Q / e8Q)
    let mut promote = None;
    if let Some(last) = body.last().copied() {
        if last.is_ascii_uppercase() && body.len() > 2 {
            promote = Some(PieceKind::from_char(last).ok_or_else(malformed)?);
            body.pop();
            if body.last() == Some(&'=') {
                body.pop();
            }
        }
    }

    if body.len() < 2 {
        return Err(malformed());
    }
    let dest_chars = body.split_off(body.len() - 2);
    let dest = Position::from_file_rank(dest_chars[0], dest_chars[1]).ok_or_else(malformed)?;

    let mut from_file = None;
    let mut from_rank = None;
    for c in body {
        match c {
            'a'..='h' => from_file = Some(c),
            '1'..='8' => from_rank = Some(c),
            _ => return Err(malformed()),
        }
    }

    let candidates: Vec<Move> = legal_moves(board)
        .into_iter()
        .filter(|mv| !matches!(mv, Move::Castle { .. }))
        .filter(|mv| mv.to() == dest && moved_kind(board, mv) == Some(kind))
        .filter(|mv| from_file.map_or(true, |f| mv.from().file_char() == f))
        .filter(|mv| from_rank.map_or(true, |r| mv.from().rank_char() == r))
        .filter(|mv| match (mv.promotion(), promote) {
            (None, None) => true,
            (Some(p), Some(q)) => p == q,
            // 省略時はクイーン
            (Some(p), None) => p == PieceKind::Queen,
            (None, Some(_)) => false,
        })
        .collect();

    match candidates.len() {
        0 => Err(ParseError::NoMatch(san.to_string())),
        1 => Ok(candidates.into_iter().next().ok_or_else(malformed)?),
        _ => Err(ParseError::Ambiguous(san.to_string())),
    }
}

/// 指し手を SAN で書く
pub fn to_san(board: &Board, mv: &Move) -> String {
    let mut san = String::new();
    match mv {
        Move::Castle { side, .. } => {
            san.push_str(match side {
                CastleSide::King => "O-O",
                CastleSide::Queen => "O-O-O",
            });
        }
        _ => {
            let from = mv.from();
            let to = mv.to();
            let kind = moved_kind(board, mv).unwrap_or(PieceKind::Pawn);
            let capture =
                board.get_piece(to).is_some() || matches!(mv, Move::EnPassant { .. });

            match kind.san_char() {
                None => {
                    if capture {
                        san.push(from.file_char());
                    }
                }
                Some(letter) => {
                    san.push(letter);
                    let rivals: Vec<Position> = legal_moves(board)
                        .into_iter()
                        .filter(|other| {
                            other.to() == to
                                && other.from() != from
                                && moved_kind(board, other) == Some(kind)
                        })
                        .map(|other| other.from())
                        .collect();
                    if !rivals.is_empty() {
                        if rivals.iter().all(|p| p.x != from.x) {
                            san.push(from.file_char());
                        } else if rivals.iter().all(|p| p.y != from.y) {
                            san.push(from.rank_char());
                        } else {
                            san.push(from.file_char());
                            san.push(from.rank_char());
                        }
                    }
                }
            }
            if capture {
                san.push('x');
            }
            san.push_str(&to.to_string());
            if let Some(kind) = mv.promotion() {
                san.push('=');
                san.push(kind.san_char().unwrap_or('Q'));
            }
        }
    }

    let next = apply_move(board, mv);
    if is_in_check(&next, next.side_to_move) {
        if legal_moves(&next).is_empty() {
            san.push('#');
        } else {
            san.push('+');
        }
    }
    san
}

/// 指し手を座標表記 (e2e4) で書く
pub fn to_an(mv: &Move, castle: CastleNotation) -> String {
    match (mv, castle) {
        (Move::Castle { side, .. }, CastleNotation::San) => match side {
            CastleSide::King => "O-O".to_string(),
            CastleSide::Queen => "O-O-O".to_string(),
        },
        _ => {
            let mut an = format!("{}{}", mv.from(), mv.to());
            if let Some(kind) = mv.promotion() {
                an.push(kind.san_char().unwrap_or('Q').to_ascii_lowercase());
            }
            an
        }
    }
}

/// 座標表記を盤面に照らして構造化された指し手にする
pub fn parse_an(board: &Board, an: &str) -> Result<Move, ParseError> {
    let text = an.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if let Some(side) = castle_side(text) {
        return find_castle(board, side, an);
    }

    let malformed = || ParseError::Malformed(an.to_string());
    let chars: Vec<char> = text.chars().filter(|&c| c != '=' && c != '-').collect();
    if chars.len() != 4 && chars.len() != 5 {
        return Err(malformed());
    }
    let from = Position::from_file_rank(chars[0], chars[1]).ok_or_else(malformed)?;
    let to = Position::from_file_rank(chars[2], chars[3]).ok_or_else(malformed)?;
    let promote = match chars.get(4) {
        Some(c) => Some(PieceKind::from_char(*c).ok_or_else(malformed)?),
        None => None,
    };

    // キングで自分のルークを取る形のキャスリング (e1h1)
    let king_takes_rook = matches!(
        (board.get_piece(from), board.get_piece(to)),
        (Some(k), Some(r)) if k.kind == PieceKind::King && r.kind == PieceKind::Rook && k.owner == r.owner
    );
    if king_takes_rook {
        let side = if to.x > from.x {
            CastleSide::King
        } else {
            CastleSide::Queen
        };
        return find_castle(board, side, an);
    }

    legal_moves(board)
        .into_iter()
        .find(|mv| {
            mv.from() == from
                && mv.to() == to
                && match (mv.promotion(), promote) {
                    (None, None) => true,
                    (Some(p), Some(q)) => p == q,
                    (Some(p), None) => p == PieceKind::Queen,
                    (None, Some(_)) => false,
                }
        })
        .ok_or_else(|| ParseError::NoMatch(an.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    #[test]
    fn parses_knight_move_from_start() {
        let board = Board::standard();
        let mv = parse_san(&board, "Nf3").unwrap();
        assert_eq!(
            mv,
            Move::Normal {
                from: sq("g1"),
                to: sq("f3"),
                promote: None
            }
        );
    }

    #[test]
    fn rejects_moves_that_do_not_fit_the_board() {
        let board = Board::standard();
        assert_eq!(
            parse_san(&board, "Nf6"),
            Err(ParseError::NoMatch("Nf6".to_string()))
        );
        assert_eq!(parse_san(&board, "  "), Err(ParseError::Empty));
        assert!(matches!(parse_san(&board, "Zz9"), Err(ParseError::Malformed(_))));
    }

    #[test]
    fn disambiguates_by_file() {
        // 2つのナイトが d2 に利いている
        let board = Board::from_fen("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1").unwrap();
        assert!(matches!(
            parse_san(&board, "Nd2"),
            Err(ParseError::Ambiguous(_))
        ));
        let mv = parse_san(&board, "Nbd2").unwrap();
        assert_eq!(mv.from(), sq("b1"));
        assert_eq!(to_san(&board, &mv), "Nbd2");
    }

    #[test]
    fn castling_and_promotion_notation() {
        let board = Board::from_fen("4k3/P7/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();

        let castle = parse_san(&board, "O-O-O").unwrap();
        assert_eq!(to_an(&castle, CastleNotation::KingKing), "e1c1");
        assert_eq!(to_an(&castle, CastleNotation::San), "O-O-O");
        assert_eq!(parse_an(&board, "e1g1").unwrap(), parse_san(&board, "O-O").unwrap());
        assert_eq!(parse_an(&board, "e1h1").unwrap(), parse_san(&board, "O-O").unwrap());

        let promo = parse_san(&board, "a8=N").unwrap();
        assert_eq!(promo.promotion(), Some(PieceKind::Knight));
        assert_eq!(to_an(&promo, CastleNotation::KingKing), "a7a8n");
        assert_eq!(to_san(&board, &promo), "a8=N");
        assert_eq!(parse_an(&board, "a7a8n").unwrap(), promo);
    }

    #[test]
    fn san_marks_check_and_mate() {
        let board =
            Board::from_fen("rnbqkbnr/ppppp2p/5p2/6p1/4P3/8/PPPP1PPP/RNBQKBNR w KQkq g6 0 3")
                .unwrap();
        let mate = parse_san(&board, "Qh5#").unwrap();
        assert_eq!(to_san(&board, &mate), "Qh5#");
        assert_eq!(
            CastleNotation::for_variant(Variant::FischerRandom),
            CastleNotation::San
        );
    }
}
