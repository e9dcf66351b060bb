use super::types::Color;
use serde::{Deserialize, Serialize};

/// 駒の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// SAN で使う大文字表記 (ポーンは表記なし)
    pub fn san_char(&self) -> Option<char> {
        match self {
            PieceKind::King => Some('K'),
            PieceKind::Queen => Some('Q'),
            PieceKind::Rook => Some('R'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Knight => Some('N'),
            PieceKind::Pawn => None,
        }
    }

    pub fn from_char(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_uppercase() {
            'K' => Some(PieceKind::King),
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            'P' => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// 成れる駒 (プロモーション先)
    pub fn promotion_targets() -> [PieceKind; 4] {
        [
            PieceKind::Queen,
            PieceKind::Rook,
            PieceKind::Bishop,
            PieceKind::Knight,
        ]
    }
}

/// 移動の特性
#[derive(Debug, Clone)]
pub enum MoveStep {
    Step(i32, i32),  // 指定した相対座標へ1マス移動
    Slide(i32, i32), // 指定した方向へ障害物があるまで移動
}

/// 駒の定義
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: Color,
}

impl Piece {
    pub fn new(kind: PieceKind, owner: Color) -> Self {
        Piece { kind, owner }
    }

    /// FEN の1文字から駒を作る (大文字 = 白)
    pub fn from_fen_char(ch: char) -> Option<Piece> {
        let kind = PieceKind::from_char(ch)?;
        let owner = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, owner))
    }

    pub fn fen_char(&self) -> char {
        let ch = self.kind.san_char().unwrap_or('P');
        match self.owner {
            Color::White => ch,
            Color::Black => ch.to_ascii_lowercase(),
        }
    }

    /// その駒が本来持っている「動きの定義」を返す
    pub fn movement_rules(&self) -> Vec<MoveStep> {
        match self.kind {
            PieceKind::King => vec![
                MoveStep::Step(-1, -1),
                MoveStep::Step(0, -1),
                MoveStep::Step(1, -1),
                MoveStep::Step(-1, 0),
                MoveStep::Step(1, 0),
                MoveStep::Step(-1, 1),
                MoveStep::Step(0, 1),
                MoveStep::Step(1, 1),
            ],
            PieceKind::Rook => vec![
                MoveStep::Slide(0, -1),
                MoveStep::Slide(0, 1),
                MoveStep::Slide(-1, 0),
                MoveStep::Slide(1, 0),
            ],
            PieceKind::Bishop => vec![
                MoveStep::Slide(-1, -1),
                MoveStep::Slide(-1, 1),
                MoveStep::Slide(1, -1),
                MoveStep::Slide(1, 1),
            ],
            PieceKind::Queen => vec![
                MoveStep::Slide(0, -1),
                MoveStep::Slide(0, 1),
                MoveStep::Slide(-1, 0),
                MoveStep::Slide(1, 0),
                MoveStep::Slide(-1, -1),
                MoveStep::Slide(-1, 1),
                MoveStep::Slide(1, -1),
                MoveStep::Slide(1, 1),
            ],
            PieceKind::Knight => vec![
                MoveStep::Step(-2, -1),
                MoveStep::Step(-2, 1),
                MoveStep::Step(2, -1),
                MoveStep::Step(2, 1),
                MoveStep::Step(-1, -2),
                MoveStep::Step(-1, 2),
                MoveStep::Step(1, -2),
                MoveStep::Step(1, 2),
            ],
            PieceKind::Pawn => {
                // ポーンは「移動」と「取り」が違うため、合法手生成側で特殊処理する
                vec![]
            }
        }
    }
}
