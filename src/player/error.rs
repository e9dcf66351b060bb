use crate::core::ParseError;
use crate::network::protocol::Offer;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// 対局終了または強制終了済み。このプレイヤーはもう指さない
    #[error("player has been terminated")]
    Terminated,
    /// 外部要因で手番が変わった。呼び出し側はこの手番を破棄してやり直す
    #[error("turn was interrupted")]
    Interrupted,
    #[error("could not parse remote move: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Connection(#[from] anyhow::Error),
}

/// プレイヤーからゲーム側へ通知されるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Offer(Offer),
    Decline(Offer),
    Withdraw(Offer),
}
