use crate::network::connection::Outbound;
use crate::network::protocol::Offer;
use serde::{Deserialize, Serialize};
use std::sync::{mpsc, Mutex};

/// 送信されたはずの操作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutboundAction {
    SendMove(String),
    Challenge {
        handle: String,
        game_type: String,
        minutes: u32,
        increment: u32,
        rated: bool,
    },
    Offer {
        offer: Offer,
        ply: u32,
    },
    Decline(Offer),
    TellPlayer {
        handle: String,
        text: String,
    },
}

/// 送信操作をチャネルに流すだけの `Outbound`。テストやデモのサーバー役が受け取る
pub struct ChannelOutbound {
    tx: Mutex<mpsc::Sender<OutboundAction>>,
}

impl ChannelOutbound {
    pub fn new() -> (Self, mpsc::Receiver<OutboundAction>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }

    fn push(&self, action: OutboundAction) -> anyhow::Result<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|_| anyhow::anyhow!("outbound channel lock poisoned"))?;
        tx.send(action)
            .map_err(|e| anyhow::anyhow!("server side hung up: {:?}", e.0))
    }
}

impl Outbound for ChannelOutbound {
    fn send_move(&self, notation: &str) -> anyhow::Result<()> {
        self.push(OutboundAction::SendMove(notation.to_string()))
    }

    fn challenge(
        &self,
        handle: &str,
        game_type: &str,
        minutes: u32,
        increment: u32,
        rated: bool,
    ) -> anyhow::Result<()> {
        self.push(OutboundAction::Challenge {
            handle: handle.to_string(),
            game_type: game_type.to_string(),
            minutes,
            increment,
            rated,
        })
    }

    fn offer(&self, offer: &Offer, ply: u32) -> anyhow::Result<()> {
        self.push(OutboundAction::Offer {
            offer: offer.clone(),
            ply,
        })
    }

    fn decline(&self, offer: &Offer) -> anyhow::Result<()> {
        self.push(OutboundAction::Decline(offer.clone()))
    }

    fn tell_player(&self, handle: &str, text: &str) -> anyhow::Result<()> {
        self.push(OutboundAction::TellPlayer {
            handle: handle.to_string(),
            text: text.to_string(),
        })
    }
}
