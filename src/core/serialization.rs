//! 駒配置を `{"e1": 'K', ...}` 形式で読み書きする serde ヘルパー

use super::piece::Piece;
use super::types::Position;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

pub fn serialize<S>(map: &HashMap<Position, Piece>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let squares: BTreeMap<String, char> = map
        .iter()
        .map(|(pos, piece)| (pos.to_string(), piece.fen_char()))
        .collect();
    squares.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<Position, Piece>, D::Error>
where
    D: Deserializer<'de>,
{
    let squares: BTreeMap<String, char> = BTreeMap::deserialize(deserializer)?;
    let mut pieces = HashMap::with_capacity(squares.len());
    for (square, ch) in squares {
        let pos = Position::from_algebraic(&square)
            .ok_or_else(|| D::Error::custom(format!("invalid square `{}`", square)))?;
        let piece = Piece::from_fen_char(ch)
            .ok_or_else(|| D::Error::custom(format!("invalid piece `{}`", ch)))?;
        pieces.insert(pos, piece);
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use crate::core::Board;

    #[test]
    fn board_serializes_pieces_by_square() {
        let board = Board::standard();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.contains("\"e1\":\"K\""));
        assert!(json.contains("\"d8\":\"q\""));

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pieces, board.pieces);
        assert_eq!(back.side_to_move, board.side_to_move);
    }
}
