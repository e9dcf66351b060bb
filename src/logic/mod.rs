use crate::core::{
    Board, CastleSide, Color, GameStatus, Move, MoveStep, Piece, PieceKind, Position,
};

/// 合法手生成 (自殺手を排除)
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let player = board.side_to_move;
    let pseudo = pseudo_legal_moves(board, player);
    pseudo
        .into_iter()
        .filter(|mv| {
            let next_board = apply_move(board, mv);
            !is_in_check(&next_board, player)
        })
        .collect()
}

/// 疑似合法手生成 (王手放置などは考慮しない)
pub fn pseudo_legal_moves(board: &Board, player: Color) -> Vec<Move> {
    let mut moves = Vec::new();

    for (&pos, piece) in board.pieces.iter() {
        if piece.owner == player {
            moves.extend(get_piece_moves(board, pos, piece));
        }
    }
    moves.extend(castling_moves(board, player));

    moves
}

/// 王が取られる状態か判定
pub fn is_in_check(board: &Board, player: Color) -> bool {
    match board.find_king(player) {
        Some(king_pos) => is_square_attacked(board, king_pos, player.opponent()),
        None => false, // 王がいない局面 (通常は起こらない)
    }
}

/// `by` 側の駒が `target` に利いているか
pub fn is_square_attacked(board: &Board, target: Position, by: Color) -> bool {
    for (&pos, piece) in board.pieces.iter() {
        if piece.owner != by {
            continue;
        }
        if piece.kind == PieceKind::Pawn {
            let dy = by.forward();
            if pos.offset(-1, dy) == Some(target) || pos.offset(1, dy) == Some(target) {
                return true;
            }
            continue;
        }
        for step in piece.movement_rules() {
            match step {
                MoveStep::Step(dx, dy) => {
                    if pos.offset(dx, dy) == Some(target) {
                        return true;
                    }
                }
                MoveStep::Slide(dx, dy) => {
                    let mut curr = pos;
                    while let Some(next) = curr.offset(dx, dy) {
                        if next == target {
                            return true;
                        }
                        if board.get_piece(next).is_some() {
                            break;
                        }
                        curr = next;
                    }
                }
            }
        }
    }
    false
}

/// 詰み判定
pub fn is_checkmate(board: &Board) -> bool {
    is_in_check(board, board.side_to_move) && legal_moves(board).is_empty()
}

/// ステイルメイト判定
pub fn is_stalemate(board: &Board) -> bool {
    !is_in_check(board, board.side_to_move) && legal_moves(board).is_empty()
}

/// 指し手が無い局面の結果。まだ指せるなら None
pub fn terminal_status(board: &Board) -> Option<GameStatus> {
    if !legal_moves(board).is_empty() {
        return None;
    }
    if is_in_check(board, board.side_to_move) {
        Some(GameStatus::won_by(board.side_to_move.opponent()))
    } else {
        Some(GameStatus::Draw)
    }
}

fn get_piece_moves(board: &Board, from: Position, piece: &Piece) -> Vec<Move> {
    if piece.kind == PieceKind::Pawn {
        return get_pawn_moves(board, from, piece);
    }

    let mut moves = Vec::new();
    for step in piece.movement_rules() {
        match step {
            MoveStep::Step(dx, dy) => {
                if let Some(to) = from.offset(dx, dy) {
                    match board.get_piece(to) {
                        Some(target) if target.owner == piece.owner => {}
                        _ => moves.push(Move::Normal {
                            from,
                            to,
                            promote: None,
                        }),
                    }
                }
            }
            MoveStep::Slide(dx, dy) => {
                let mut curr = from;
                while let Some(to) = curr.offset(dx, dy) {
                    if let Some(target) = board.get_piece(to) {
                        if target.owner != piece.owner {
                            moves.push(Move::Normal {
                                from,
                                to,
                                promote: None,
                            });
                        }
                        break;
                    }
                    moves.push(Move::Normal {
                        from,
                        to,
                        promote: None,
                    });
                    curr = to;
                }
            }
        }
    }
    moves
}

fn add_pawn_moves(moves: &mut Vec<Move>, from: Position, to: Position, promo_y: usize) {
    if to.y == promo_y {
        for kind in PieceKind::promotion_targets() {
            moves.push(Move::Normal {
                from,
                to,
                promote: Some(kind),
            });
        }
    } else {
        moves.push(Move::Normal {
            from,
            to,
            promote: None,
        });
    }
}

fn get_pawn_moves(board: &Board, from: Position, piece: &Piece) -> Vec<Move> {
    let mut moves = Vec::new();
    let forward = piece.owner.forward();
    let (start_y, promo_y) = match piece.owner {
        Color::White => (6, 0),
        Color::Black => (1, 7),
    };

    if let Some(to) = from.offset(0, forward) {
        if board.get_piece(to).is_none() {
            add_pawn_moves(&mut moves, from, to, promo_y);
            if from.y == start_y {
                if let Some(to2) = from.offset(0, forward * 2) {
                    if board.get_piece(to2).is_none() {
                        moves.push(Move::Normal {
                            from,
                            to: to2,
                            promote: None,
                        });
                    }
                }
            }
        }
    }

    for dx in [-1, 1] {
        if let Some(to) = from.offset(dx, forward) {
            if let Some(target) = board.get_piece(to) {
                if target.owner != piece.owner {
                    add_pawn_moves(&mut moves, from, to, promo_y);
                }
            } else if board.en_passant == Some(to) {
                moves.push(Move::EnPassant { from, to });
            }
        }
    }
    moves
}

fn castling_moves(board: &Board, player: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    let y = match player {
        Color::White => 7,
        Color::Black => 0,
    };
    let king_from = Position::new(4, y);
    match board.get_piece(king_from) {
        Some(p) if p.owner == player && p.kind == PieceKind::King => {}
        _ => return moves,
    }
    let enemy = player.opponent();
    if is_square_attacked(board, king_from, enemy) {
        return moves;
    }

    for side in [CastleSide::King, CastleSide::Queen] {
        if !board.castling.has(player, side) {
            continue;
        }
        // (ルーク位置, 空いているべき升, キングが通過する升, キング移動先)
        let (rook_x, empty, passing, king_to_x) = match side {
            CastleSide::King => (7, vec![5, 6], [5, 6], 6),
            CastleSide::Queen => (0, vec![1, 2, 3], [3, 2], 2),
        };
        match board.get_piece(Position::new(rook_x, y)) {
            Some(p) if p.owner == player && p.kind == PieceKind::Rook => {}
            _ => continue,
        }
        if empty
            .iter()
            .any(|&x| board.get_piece(Position::new(x, y)).is_some())
        {
            continue;
        }
        if passing
            .iter()
            .any(|&x| is_square_attacked(board, Position::new(x, y), enemy))
        {
            continue;
        }
        moves.push(Move::Castle {
            from: king_from,
            to: Position::new(king_to_x, y),
            side,
        });
    }
    moves
}

/// 移動適用
pub fn apply_move(board: &Board, mv: &Move) -> Board {
    let mut next = board.clone();
    let player = board.side_to_move;
    next.last_move = Some(mv.clone());
    next.en_passant = None;
    next.halfmove_clock += 1;

    match mv {
        Move::Normal { from, to, promote } => {
            if let Some(mut piece) = next.remove_piece(*from) {
                if next.remove_piece(*to).is_some() {
                    next.halfmove_clock = 0;
                    next.castling.revoke_rook_square(*to);
                }

                match piece.kind {
                    PieceKind::King => next.castling.revoke(piece.owner),
                    PieceKind::Rook => next.castling.revoke_rook_square(*from),
                    PieceKind::Pawn => {
                        next.halfmove_clock = 0;
                        if from.y.abs_diff(to.y) == 2 {
                            next.en_passant = Some(Position::new(from.x, (from.y + to.y) / 2));
                        }
                    }
                    _ => {}
                }

                if let Some(kind) = promote {
                    piece.kind = *kind;
                }

                next.place_piece(*to, piece);
            }
        }
        Move::EnPassant { from, to } => {
            if let Some(pawn) = next.remove_piece(*from) {
                next.remove_piece(Position::new(to.x, from.y));
                next.place_piece(*to, pawn);
                next.halfmove_clock = 0;
            }
        }
        Move::Castle { from, to, side } => {
            if let Some(king) = next.remove_piece(*from) {
                let (rook_from, rook_to) = match side {
                    CastleSide::King => (Position::new(7, from.y), Position::new(5, from.y)),
                    CastleSide::Queen => (Position::new(0, from.y), Position::new(3, from.y)),
                };
                if let Some(rook) = next.remove_piece(rook_from) {
                    next.place_piece(rook_to, rook);
                }
                next.place_piece(*to, king);
                next.castling.revoke(player);
            }
        }
    }

    next.side_to_move = player.opponent();
    next.ply += 1;
    next
}
