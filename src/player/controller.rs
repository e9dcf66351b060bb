use crate::core::{Board, GameStatus, Move};
use crate::game::GameModel;
use crate::network::protocol::Offer;
use crate::player::PlayerError;

/// プレイヤー操作のtrait
///
/// ターンループは `request_move` を手番ごとに1回呼ぶ。`last_move` は相手側が直前に
/// 指した手とその手を指す前の局面で、リモートプレイヤーはこれをサーバーへ送る。
pub trait PlayerController: Send + Sync {
    fn name(&self) -> &str;
    fn is_local(&self) -> bool;

    fn request_move(
        &self,
        board: &Board,
        last_move: Option<(&Board, &Move)>,
    ) -> Result<Move, PlayerError>;

    fn pause(&self) {}
    fn resume(&self) {}
    fn set_board(&self, _fen: &str) {}

    /// `move_count` 手戻された後に呼ばれる (モデルは既に巻き戻し済み)
    fn notify_undo(&self, _move_count: usize, _model: &GameModel) {}

    fn put_message(&self, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn offer(&self, _offer: &Offer) -> anyhow::Result<()> {
        Ok(())
    }
    fn offer_declined(&self, _offer: &Offer) -> anyhow::Result<()> {
        Ok(())
    }
    fn offer_withdrawn(&self, _offer: &Offer) {}
    fn offer_error(&self, _offer: &Offer, _error: &str) {}

    fn end(&self, _status: GameStatus, _reason: &str) {}
    fn kill(&self, _reason: &str) {}
}
