#[cfg(test)]
mod tests {
    use crate::core::{Board, CastleSide, Color, GameStatus, Move, PieceKind, Position};
    use crate::logic::{apply_move, is_checkmate, is_stalemate, legal_moves, terminal_status};

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    #[test]
    fn test_start_position_has_twenty_moves() {
        let board = Board::standard();
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn test_en_passant_capture_removes_pawn() {
        // 黒が d7-d5 と突いた直後
        let board =
            Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let moves = legal_moves(&board);
        let ep = moves
            .iter()
            .find(|m| matches!(m, Move::EnPassant { .. }))
            .expect("en passant should be legal");
        assert_eq!(ep.to(), sq("d6"));

        let next = apply_move(&board, ep);
        assert!(next.get_piece(sq("d5")).is_none());
        assert_eq!(next.get_piece(sq("d6")).map(|p| p.kind), Some(PieceKind::Pawn));
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.ply, board.ply + 1);
    }

    #[test]
    fn test_double_step_sets_en_passant_square() {
        let board = Board::standard();
        let mv = Move::Normal {
            from: sq("e2"),
            to: sq("e4"),
            promote: None,
        };
        let next = apply_move(&board, &mv);
        assert_eq!(next.en_passant, Some(sq("e3")));
        assert_eq!(next.ply, 1);
    }

    #[test]
    fn test_cannot_castle_through_attacked_square() {
        // f1 に黒ルークが利いている
        let board = Board::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<CastleSide> = legal_moves(&board)
            .into_iter()
            .filter_map(|m| match m {
                Move::Castle { side, .. } => Some(side),
                _ => None,
            })
            .collect();
        assert_eq!(castles, vec![CastleSide::Queen]);
    }

    #[test]
    fn test_castling_moves_rook_and_revokes_rights() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castle = legal_moves(&board)
            .into_iter()
            .find(|m| matches!(m, Move::Castle { side: CastleSide::King, .. }))
            .unwrap();
        let next = apply_move(&board, &castle);
        assert_eq!(next.get_piece(sq("g1")).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(next.get_piece(sq("f1")).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(!next.castling.white_king && !next.castling.white_queen);
    }

    #[test]
    fn test_promotion_offers_four_pieces() {
        let board = Board::from_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let promotions = legal_moves(&board)
            .into_iter()
            .filter(|m| m.promotion().is_some())
            .count();
        assert_eq!(promotions, 4);
    }

    #[test]
    fn test_checkmate_and_stalemate() {
        let mate = Board::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(is_checkmate(&mate));
        assert_eq!(terminal_status(&mate), Some(GameStatus::WhiteWon));

        let stale = Board::from_fen("7k/8/6QK/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(is_stalemate(&stale));
        assert_eq!(terminal_status(&stale), Some(GameStatus::Draw));

        assert_eq!(terminal_status(&Board::standard()), None);
    }
}
