use crate::network::protocol::{BoardUpdate, Offer, PrivateMessage};
use crate::network::signal::Signal;
use std::sync::Arc;

/// サーバーへの送信操作
pub trait Outbound: Send + Sync {
    fn send_move(&self, notation: &str) -> anyhow::Result<()>;
    fn challenge(
        &self,
        handle: &str,
        game_type: &str,
        minutes: u32,
        increment: u32,
        rated: bool,
    ) -> anyhow::Result<()>;
    fn offer(&self, offer: &Offer, ply: u32) -> anyhow::Result<()>;
    fn decline(&self, offer: &Offer) -> anyhow::Result<()>;
    fn tell_player(&self, handle: &str, text: &str) -> anyhow::Result<()>;
}

/// 盤面系シグナル
pub struct BoardManager {
    pub board_update: Arc<Signal<BoardUpdate>>,
}

/// 申し入れ系シグナル
pub struct OfferManager {
    pub offer_add: Arc<Signal<Offer>>,
    pub offer_remove: Arc<Signal<Offer>>,
    pub offer_declined: Arc<Signal<Offer>>,
}

/// チャット系シグナル
pub struct ChatManager {
    pub private_message: Arc<Signal<PrivateMessage>>,
}

/// サーバー接続。受信イベントはシグナルで配り、送信は `Outbound` に委ねる
pub struct Connection {
    pub bm: BoardManager,
    pub om: OfferManager,
    pub cm: ChatManager,
    outbound: Arc<dyn Outbound>,
}

impl Connection {
    pub fn new(outbound: Arc<dyn Outbound>) -> Self {
        Self {
            bm: BoardManager {
                board_update: Arc::new(Signal::new("board_update")),
            },
            om: OfferManager {
                offer_add: Arc::new(Signal::new("offer_add")),
                offer_remove: Arc::new(Signal::new("offer_remove")),
                offer_declined: Arc::new(Signal::new("offer_declined")),
            },
            cm: ChatManager {
                private_message: Arc::new(Signal::new("private_message")),
            },
            outbound,
        }
    }

    pub fn send_move(&self, notation: &str) -> anyhow::Result<()> {
        self.outbound.send_move(notation)
    }

    pub fn challenge(
        &self,
        handle: &str,
        game_type: &str,
        minutes: u32,
        increment: u32,
        rated: bool,
    ) -> anyhow::Result<()> {
        self.outbound
            .challenge(handle, game_type, minutes, increment, rated)
    }

    pub fn offer(&self, offer: &Offer, ply: u32) -> anyhow::Result<()> {
        self.outbound.offer(offer, ply)
    }

    pub fn decline(&self, offer: &Offer) -> anyhow::Result<()> {
        self.outbound.decline(offer)
    }

    pub fn tell_player(&self, handle: &str, text: &str) -> anyhow::Result<()> {
        self.outbound.tell_player(handle, text)
    }
}
