pub mod board;
pub mod r#move;
pub mod notation;
pub mod piece;
pub mod serialization;
pub mod setup;
pub mod types;

pub use board::{Board, CastlingRights};
pub use notation::{parse_an, parse_san, to_an, to_san, CastleNotation, ParseError};
pub use piece::{MoveStep, Piece, PieceKind};
pub use r#move::{CastleSide, Move};
pub use setup::{setup_from_fen, FenError, START_FEN};
pub use types::{Color, GameStatus, Position, Variant};
