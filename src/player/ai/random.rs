use crate::core::{Board, Move};
use crate::logic::legal_moves;
use crate::player::{PlayerController, PlayerError};
use rand::seq::SliceRandom;

/// 合法手から一様に選ぶだけのローカルプレイヤー
pub struct RandomAI {
    pub name: String,
}

impl RandomAI {
    pub fn new(name: &str) -> Self {
        RandomAI {
            name: name.to_string(),
        }
    }
}

impl PlayerController for RandomAI {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_local(&self) -> bool {
        true
    }

    fn request_move(
        &self,
        board: &Board,
        _last_move: Option<(&Board, &Move)>,
    ) -> Result<Move, PlayerError> {
        let mut rng = rand::thread_rng();
        // 指せる手が無ければ投了扱い
        legal_moves(board)
            .choose(&mut rng)
            .cloned()
            .ok_or(PlayerError::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::apply_move;

    #[test]
    fn picks_a_legal_move() {
        let ai = RandomAI::new("Random AI");
        let board = Board::standard();
        let mv = ai.request_move(&board, None).unwrap();
        assert!(legal_moves(&board).contains(&mv));
        let next = apply_move(&board, &mv);
        assert_eq!(next.ply, 1);
    }

    #[test]
    fn gives_up_without_legal_moves() {
        // 黒番でステイルメイト
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let ai = RandomAI::new("Random AI");
        assert!(matches!(
            ai.request_move(&board, None),
            Err(PlayerError::Terminated)
        ));
    }
}
