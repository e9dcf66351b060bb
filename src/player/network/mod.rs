//! サーバー越しの相手をローカルのプレイヤーとして扱うアダプタ

pub mod offers;
pub mod relay;
pub mod subscriptions;

pub use offers::OfferTracker;
pub use relay::{Delivery, MoveEnvelope, MoveRelay, PendingMove};
pub use subscriptions::SubscriptionSet;

use crate::config::SessionConfig;
use crate::core::{parse_san, to_an, Board, CastleNotation, Color, GameStatus, Move};
use crate::game::GameModel;
use crate::network::protocol::{BoardUpdate, Offer, PrivateMessage};
use crate::network::Connection;
use crate::player::{PlayerController, PlayerError, PlayerEvent};
use log::{debug, info, warn};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, Weak};

/// リモート側の席の情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub handle: String,
    pub name: String,
    pub rating: Option<u32>,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Ending,
    Killed,
    TornDown,
}

pub struct RemotePlayer {
    seat: Seat,
    game_no: u32,
    model: Arc<GameModel>,
    connection: Arc<Connection>,
    relay: MoveRelay,
    offers: OfferTracker,
    subscriptions: SubscriptionSet,
    listeners: Mutex<Vec<mpsc::Sender<PlayerEvent>>>,
    lifecycle: Mutex<Lifecycle>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl RemotePlayer {
    pub fn new(
        model: Arc<GameModel>,
        connection: Arc<Connection>,
        seat: Seat,
        config: &SessionConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<RemotePlayer>| {
            let player = RemotePlayer {
                game_no: model.game_no(),
                seat,
                relay: MoveRelay::new(config.ack_timeout()),
                offers: OfferTracker::new(),
                subscriptions: SubscriptionSet::new(),
                listeners: Mutex::new(Vec::new()),
                lifecycle: Mutex::new(Lifecycle::Active),
                model,
                connection,
            };
            player.connect_signals(weak);
            player
        })
    }

    fn connect_signals(&self, weak: &Weak<RemotePlayer>) {
        let conn = &self.connection;

        // 盤面モデル側のハンドラが先に局面を更新してから見る
        let w = weak.clone();
        self.subscriptions
            .subscribe_after("bm", &conn.bm.board_update, move |update| {
                if let Some(player) = w.upgrade() {
                    player.on_board_update(update);
                }
            });

        let w = weak.clone();
        self.subscriptions
            .subscribe("om", &conn.om.offer_add, move |offer| {
                if let Some(player) = w.upgrade() {
                    player.on_offer_add(offer);
                }
            });
        let w = weak.clone();
        self.subscriptions
            .subscribe("om", &conn.om.offer_remove, move |offer| {
                if let Some(player) = w.upgrade() {
                    player.on_offer_remove(offer);
                }
            });
        let w = weak.clone();
        self.subscriptions
            .subscribe("om", &conn.om.offer_declined, move |offer| {
                if let Some(player) = w.upgrade() {
                    player.on_offer_declined(offer);
                }
            });

        let w = weak.clone();
        self.subscriptions
            .subscribe("cm", &conn.cm.private_message, move |msg| {
                if let Some(player) = w.upgrade() {
                    player.on_private_message(msg);
                }
            });
    }

    /// ハンドル・表示名・レーティング
    pub fn identity(&self) -> &Seat {
        &self.seat
    }

    pub fn handle(&self) -> &str {
        &self.seat.handle
    }

    pub fn rating(&self) -> Option<u32> {
        self.seat.rating
    }

    pub fn color(&self) -> Color {
        self.seat.color
    }

    pub fn game_no(&self) -> u32 {
        self.game_no
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *lock(&self.lifecycle)
    }

    pub fn subscriptions(&self) -> &SubscriptionSet {
        &self.subscriptions
    }

    pub fn offers(&self) -> &OfferTracker {
        &self.offers
    }

    /// offer / decline / withdraw を受け取るチャネルを作る
    pub fn events(&self) -> mpsc::Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel();
        lock(&self.listeners).push(tx);
        rx
    }

    fn emit(&self, event: PlayerEvent) {
        lock(&self.listeners).retain(|tx| tx.send(event.clone()).is_ok());
    }

    // ---------------------------------------------------------------
    // サーバーからのシグナル (イベントスレッド上で呼ばれる)
    // ---------------------------------------------------------------

    fn is_this_game(&self, update: &BoardUpdate) -> bool {
        if update.game_no != self.game_no {
            return false;
        }
        let handles = self.model.player_handles();
        handles.len() >= 2 && update.white == handles[0] && update.black == handles[1]
    }

    pub fn on_board_update(&self, update: &BoardUpdate) {
        if self.subscriptions.is_torn_down() {
            return;
        }
        debug!(
            "{}: board update game={} ply={} to_move={} last={} fen={} {} {} {}ms {}ms",
            self.seat.handle,
            update.game_no,
            update.ply,
            update.side_to_move,
            update.last_move,
            update.fen,
            update.white,
            update.black,
            update.white_ms,
            update.black_ms
        );

        if !self.is_this_game(update) {
            return;
        }

        // 時間切れなどで直前の手が再送されることがある
        if update.ply <= self.model.ply() {
            debug!("{}: ply {} already known, ignoring", self.seat.handle, update.ply);
            return;
        }

        self.reconcile_clock(update);

        if update.side_to_move.opponent() == self.seat.color {
            debug!(
                "{}: ply {} putting {} in queue",
                self.seat.handle, update.ply, update.last_move
            );
            // ターンループが手を受け取るまでここで止まる。
            // 受け取る前に終局処理で殺されないようにするため
            match self.relay.deliver(update.ply, &update.last_move) {
                Delivery::Acknowledged => {}
                other => debug!("{}: ply {} delivery {:?}", self.seat.handle, update.ply, other),
            }
        }
    }

    /// 終局が最後の手より先に届いた場合、持ち時間を自前で進める
    fn reconcile_clock(&self, update: &BoardUpdate) {
        if !self.model.status().is_decided() {
            return;
        }
        self.model.with_time(|time| {
            if time.ply >= update.ply {
                return;
            }
            debug!("{}: updating clocks from ply {}", self.seat.handle, update.ply);
            time.set_paused(false);
            time.tap();
            time.set_paused(true);
            time.update_player(Color::White, update.white_ms as f64 / 1000.0);
            time.update_player(Color::Black, update.black_ms as f64 / 1000.0);
        });
    }

    fn on_offer_add(&self, offer: &Offer) {
        if self.subscriptions.is_torn_down() {
            return;
        }
        let event =
            self.offers
                .on_add(offer, self.model.status(), self.model.is_observation());
        if let Some(event) = event {
            debug!("{}: game {} emitting offer {}", self.seat.handle, self.game_no, offer);
            self.emit(event);
        }
    }

    fn on_offer_remove(&self, offer: &Offer) {
        if self.subscriptions.is_torn_down() {
            return;
        }
        if let Some(event) = self.offers.on_remove(offer) {
            debug!("{}: game {} emitting withdraw {}", self.seat.handle, self.game_no, offer);
            self.emit(event);
        }
    }

    fn on_offer_declined(&self, offer: &Offer) {
        if self.subscriptions.is_torn_down() {
            return;
        }
        let event = self.offers.on_decline(offer, &self.model.offers());
        debug!("{}: emitting decline for {}", self.seat.handle, offer);
        self.emit(event);
    }

    fn on_private_message(&self, msg: &PrivateMessage) {
        if self.subscriptions.is_torn_down() || msg.sender != self.seat.handle {
            return;
        }
        self.emit(PlayerEvent::Offer(Offer::chat(&msg.text)));
    }

    // ---------------------------------------------------------------
    // ターンループ・ゲーム側からの操作
    // ---------------------------------------------------------------

    /// 再戦を申し込む。持ち時間が無い対局なら 0 分 0 秒
    pub fn offer_rematch(&self) -> anyhow::Result<()> {
        let (minutes, increment) = self
            .model
            .with_time(|time| (time.initial_minutes(), time.gain as u32))
            .unwrap_or((0, 0));
        let info = self.model.info();
        self.connection.challenge(
            &self.seat.handle,
            &info.game_type,
            minutes,
            increment,
            info.rated,
        )
    }

    fn shut_down(&self, next: Lifecycle, reason: &str) {
        {
            let mut lifecycle = lock(&self.lifecycle);
            if *lifecycle == Lifecycle::Active {
                *lifecycle = next;
            }
        }
        let removed = self.subscriptions.teardown_all();
        info!(
            "{}: {:?} ({}), {} handlers disconnected",
            self.seat.handle, next, reason, removed
        );
        self.relay.terminate();
        *lock(&self.lifecycle) = Lifecycle::TornDown;
    }
}

impl PlayerController for RemotePlayer {
    fn name(&self) -> &str {
        &self.seat.name
    }

    fn is_local(&self) -> bool {
        false
    }

    fn request_move(
        &self,
        board: &Board,
        last_move: Option<(&Board, &Move)>,
    ) -> Result<Move, PlayerError> {
        if let Some((before, mv)) = last_move {
            if !self.model.is_observation() {
                let notation = to_an(mv, CastleNotation::for_variant(before.variant));
                debug!("{}: sending {}", self.seat.handle, notation);
                self.connection.send_move(&notation)?;
            }
        }

        // ここから先はどの経路で抜けても pending の drop で ack が返る
        let pending = self.relay.take()?;
        debug!(
            "{}: from queue got ply={} move={}",
            self.seat.handle, pending.ply, pending.notation
        );

        let rebased;
        let base = if pending.ply < board.ply {
            // 観戦中にしか起こらない
            match self.model.board_at_ply(pending.ply.saturating_sub(1)) {
                Some(historic) => {
                    rebased = historic;
                    &rebased
                }
                None => {
                    warn!("{}: no board for ply {}", self.seat.handle, pending.ply);
                    board
                }
            }
        } else {
            board
        };

        let mv = parse_san(base, &pending.notation)?;
        debug!("{}: parsed move {}", self.seat.handle, mv);
        Ok(mv)
    }

    // 盤面と時計はサーバー側が正
    fn pause(&self) {}
    fn resume(&self) {}
    fn set_board(&self, _fen: &str) {}

    fn notify_undo(&self, move_count: usize, model: &GameModel) {
        debug!("{}: undoing {} moves", self.seat.handle, move_count);
        self.relay.rewind(model.ply());
        // 手番が自分でなくなったら待機中の request_move を抜けさせる
        if move_count % 2 == 1 && model.side_to_move() != self.seat.color {
            self.relay.interrupt();
        }
    }

    fn put_message(&self, text: &str) -> anyhow::Result<()> {
        self.connection.tell_player(&self.seat.handle, text)
    }

    fn offer(&self, offer: &Offer) -> anyhow::Result<()> {
        debug!("{}: offer {}", self.seat.handle, offer);
        self.offers.prepare_submit(offer);
        self.connection.offer(offer, self.model.ply())
    }

    fn offer_declined(&self, offer: &Offer) -> anyhow::Result<()> {
        debug!("{}: sending decline for {}", self.seat.handle, offer);
        self.connection.decline(offer)
    }

    fn offer_withdrawn(&self, _offer: &Offer) {}

    fn offer_error(&self, _offer: &Offer, _error: &str) {}

    fn end(&self, status: GameStatus, reason: &str) {
        self.shut_down(Lifecycle::Ending, &format!("{:?}: {}", status, reason));
    }

    fn kill(&self, reason: &str) {
        self.shut_down(Lifecycle::Killed, reason);
    }
}

impl Drop for RemotePlayer {
    fn drop(&mut self) {
        self.subscriptions.teardown_all();
    }
}
