use super::piece::PieceKind;
use super::types::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    King,
    Queen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Normal {
        from: Position,
        to: Position,
        promote: Option<PieceKind>,
    },
    EnPassant {
        from: Position,
        to: Position,
    },
    /// キングの移動元・移動先で表す
    Castle {
        from: Position,
        to: Position,
        side: CastleSide,
    },
}

impl Move {
    pub fn from(&self) -> Position {
        match self {
            Move::Normal { from, .. } | Move::EnPassant { from, .. } | Move::Castle { from, .. } => {
                *from
            }
        }
    }

    pub fn to(&self) -> Position {
        match self {
            Move::Normal { to, .. } | Move::EnPassant { to, .. } | Move::Castle { to, .. } => *to,
        }
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        match self {
            Move::Normal { promote, .. } => *promote,
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Move::Normal { from, to, promote } => match promote {
                Some(kind) => write!(f, "{} -> {} (={:?})", from, to, kind),
                None => write!(f, "{} -> {}", from, to),
            },
            Move::EnPassant { from, to } => write!(f, "{} -> {} (e.p.)", from, to),
            Move::Castle { side, .. } => match side {
                CastleSide::King => write!(f, "O-O"),
                CastleSide::Queen => write!(f, "O-O-O"),
            },
        }
    }
}
